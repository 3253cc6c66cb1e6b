//! Default backend built on `quick-xml`.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::backend::{MarkupBuilder, Node, XmlBackend};
use crate::budget::BudgetEnforcer;
use crate::entities::EntityTable;
use crate::error::{Error, Location};

/// Parser and builder backed by `quick-xml`. Registered as `"quick-xml"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuickXml;

impl XmlBackend for QuickXml {
    fn name(&self) -> &str {
        "quick-xml"
    }

    fn parse(&self, text: &str, budget: &mut BudgetEnforcer) -> Result<Option<Node>, Error> {
        parse_document(text, budget)
    }

    fn builder(&self, indent: usize) -> Box<dyn MarkupBuilder> {
        Box::new(QuickXmlBuilder::new(indent))
    }
}

/// Element under construction.
struct Open {
    node: Node,
    text: String,
    has_text: bool,
}

impl Open {
    fn finish(self) -> Node {
        let Open {
            mut node,
            text,
            has_text,
        } = self;
        if has_text {
            node.text = Some(text);
        } else if !text.is_empty() {
            node.whitespace = Some(text);
        }
        node
    }
}

fn parse_document(input: &str, budget: &mut BudgetEnforcer) -> Result<Option<Node>, Error> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(false);

    let mut entities = EntityTable::default();
    let mut stack: Vec<Open> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::syntax(e.to_string())
                .with_location(Location::from_offset(input, reader.error_position() as usize))
        })?;
        let here = Location::from_offset(input, reader.buffer_position() as usize);

        match event {
            Event::Start(e) => {
                let node = open_element(&e, &entities, budget, stack.is_empty() && root.is_some())
                    .map_err(|err| err.with_location(here))?;
                stack.push(Open {
                    node,
                    text: String::new(),
                    has_text: false,
                });
            }
            Event::Empty(e) => {
                let node = open_element(&e, &entities, budget, stack.is_empty() && root.is_some())
                    .map_err(|err| err.with_location(here))?;
                budget.leave_element();
                attach(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                let open = stack
                    .pop()
                    .ok_or_else(|| Error::syntax("unexpected closing tag").with_location(here))?;
                budget.leave_element();
                attach(&mut stack, &mut root, open.finish());
            }
            Event::Text(e) => {
                let raw = String::from_utf8_lossy(&e);
                match stack.last_mut() {
                    Some(open) => {
                        let text = entities
                            .expand(&raw, budget)
                            .map_err(|err| err.with_location(here))?;
                        if !text.trim().is_empty() {
                            open.has_text = true;
                        }
                        open.text.push_str(&text);
                    }
                    None if raw.trim().is_empty() => {}
                    None => {
                        return Err(Error::syntax("text outside the root element").with_location(here));
                    }
                }
            }
            Event::CData(e) => {
                let open = stack.last_mut().ok_or_else(|| {
                    Error::syntax("CDATA section outside the root element").with_location(here)
                })?;
                open.text.push_str(&String::from_utf8_lossy(&e));
                open.has_text = true;
            }
            Event::DocType(e) => {
                entities
                    .declare(&String::from_utf8_lossy(&e), budget)
                    .map_err(|err| err.with_location(here))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::syntax(format!("unclosed element <{}>", open.node.name))
            .with_location(Location::from_offset(input, input.len())));
    }
    Ok(root)
}

fn open_element(
    e: &BytesStart<'_>,
    entities: &EntityTable,
    budget: &mut BudgetEnforcer,
    after_root: bool,
) -> Result<Node, Error> {
    let mut node = Node::new(String::from_utf8_lossy(e.name().as_ref()));
    if after_root {
        return Err(Error::syntax(format!(
            "second root element <{}>",
            node.name
        )));
    }
    budget.enter_element().map_err(Error::budget)?;
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::syntax(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = entities.expand(&raw, budget)?.into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn attach(stack: &mut [Open], root: &mut Option<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.node.children.push(node),
        None => *root = Some(node),
    }
}

/// [`MarkupBuilder`] writing through a `quick_xml::Writer`.
pub struct QuickXmlBuilder {
    writer: Writer<Vec<u8>>,
}

impl QuickXmlBuilder {
    pub fn new(indent: usize) -> Self {
        let writer = if indent > 0 {
            Writer::new_with_indent(Vec::new(), b' ', indent)
        } else {
            Writer::new(Vec::new())
        };
        Self { writer }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), Error> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::encode(e.to_string()))
    }
}

fn start<'a>(name: &'a str, attributes: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for &(key, value) in attributes {
        start.push_attribute((key, value));
    }
    start
}

impl MarkupBuilder for QuickXmlBuilder {
    fn declaration(&mut self) -> Result<(), Error> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn open_tag(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), Error> {
        self.write(Event::Start(start(name, attributes)))
    }

    fn empty_tag(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), Error> {
        self.write(Event::Empty(start(name, attributes)))
    }

    fn write_text(&mut self, text: &str) -> Result<(), Error> {
        if text.is_empty() {
            return Ok(());
        }
        self.write(Event::Text(BytesText::new(text)))
    }

    fn close_tag(&mut self, name: &str) -> Result<(), Error> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn finish(self: Box<Self>) -> Result<String, Error> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| Error::encode(e.to_string()))
    }
}
