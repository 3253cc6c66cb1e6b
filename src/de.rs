//! XML to [`Value`] decoder.
//!
//! The active backend turns the document into a [`Node`] tree under a [`BudgetEnforcer`];
//! this module then folds the tree into nested values, applying the type policy from
//! [`Options`] and coercing typed leaves.

use std::io::{BufReader, Read};

use ahash::AHashMap;
use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::backend::{Node, backend};
use crate::budget::BudgetEnforcer;
use crate::error::Error;
use crate::guard::check_type;
use crate::keys::canonical_key;
use crate::options::Options;
use crate::parse_scalars::{attribute, coerce};
use crate::tags::TypeTag;
use crate::value::{Mapping, Value};

/// Result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Decode an XML document with default [`Options`].
///
/// The result is a mapping with a single entry, the root element's canonical name
/// (dashes replaced by underscores). A blank document yields an empty mapping.
///
/// ```rust
/// use xml_mini::Value;
///
/// let xml = r#"
/// <topic>
///   <title>The First Topic</title>
///   <replies-count type="integer">1</replies-count>
///   <approved type="boolean">false</approved>
///   <parent-id nil="true"/>
/// </topic>
/// "#;
/// let value = xml_mini::from_str(xml).unwrap();
/// let topic = &value["topic"];
/// assert_eq!(topic["title"], Value::from("The First Topic"));
/// assert_eq!(topic["replies_count"], Value::Integer(1));
/// assert_eq!(topic["approved"], Value::Boolean(false));
/// assert!(topic["parent_id"].is_null());
/// ```
pub fn from_str(input: &str) -> Result<Value> {
    from_str_with_options(input, Options::default())
}

/// Decode an XML document with the given options.
///
/// The budget report callbacks in `options` run both on success and when a budget
/// ceiling was crossed.
///
/// ```rust
/// let xml = r#"<config type="yaml">retries: 3</config>"#;
/// assert!(xml_mini::from_str(xml).is_err());
///
/// # #[cfg(feature = "yaml")]
/// # {
/// let value = xml_mini::from_str_with_options(xml, xml_mini::Options::trusted()).unwrap();
/// assert_eq!(value["config"]["retries"], xml_mini::Value::Integer(3));
/// # }
/// ```
pub fn from_str_with_options(input: &str, options: Options) -> Result<Value> {
    let backend = backend();
    log::debug!(
        "decoding {} bytes with backend {} (trusted: {})",
        input.len(),
        backend.name(),
        options.trusted
    );

    let mut budget = BudgetEnforcer::new(options.budget.clone());
    let result = backend
        .parse(input, &mut budget)
        .and_then(|root| decode_root(root, &options, &mut budget));

    if let Err(Error::ExpansionLimitExceeded { breach, location }) = &result {
        log::warn!("decode budget exceeded at {location:?}: {breach}");
    }
    options.report(&budget.into_report());
    result
}

/// Decode from bytes. The encoding is detected from a byte order mark, UTF-8 otherwise.
pub fn from_slice(bytes: &[u8]) -> Result<Value> {
    from_slice_with_options(bytes, Options::default())
}

pub fn from_slice_with_options(bytes: &[u8], options: Options) -> Result<Value> {
    from_reader_with_options(bytes, options)
}

/// Decode from any [`Read`] source, detecting UTF-16 and UTF-8 byte order marks.
///
/// ```rust
/// let bytes: &[u8] = b"\xEF\xBB\xBF<n type=\"integer\">5</n>";
/// let value = xml_mini::from_reader(bytes).unwrap();
/// assert_eq!(value["n"], xml_mini::Value::Integer(5));
/// ```
pub fn from_reader<R: Read>(reader: R) -> Result<Value> {
    from_reader_with_options(reader, Options::default())
}

pub fn from_reader_with_options<R: Read>(reader: R, options: Options) -> Result<Value> {
    let decoder = DecodeReaderBytesBuilder::new().encoding(None).build(reader);
    let mut input = String::new();
    BufReader::new(decoder).read_to_string(&mut input)?;
    from_str_with_options(&input, options)
}

fn decode_root(root: Option<Node>, options: &Options, budget: &mut BudgetEnforcer) -> Result<Value> {
    let mut document = Mapping::new();
    if let Some(root) = root {
        let value = decode_node(&root, options, budget)?;
        document.insert(canonical_key(&root.name), value);
    }
    Ok(Value::Mapping(document))
}

fn decode_node(node: &Node, options: &Options, budget: &mut BudgetEnforcer) -> Result<Value> {
    let attributes: Vec<(String, String)> = node
        .attributes
        .iter()
        .map(|(k, v)| (canonical_key(k), v.clone()))
        .collect();
    let type_name = attribute(&attributes, "type");
    if let Some(type_name) = type_name {
        check_type(type_name, &node.name, options)?;
    }
    let tag = type_name.map(TypeTag::parse);

    if attribute(&attributes, "nil") == Some("true") {
        return Ok(Value::Null);
    }

    match tag {
        Some(TypeTag::Array) => {
            return node
                .children
                .iter()
                .map(|child| decode_node(child, options, budget))
                .collect::<Result<Vec<_>>>()
                .map(Value::Sequence);
        }
        Some(TypeTag::File) => {
            let text = node.text.as_deref().unwrap_or_default();
            return coerce(text, &TypeTag::File, &attributes, &node.name, budget);
        }
        _ => {}
    }

    // Attribute names other than a recognized type annotation.
    let fields = || {
        attributes.iter().filter(|(k, v)| {
            !(k == "type" && TypeTag::parse(v).is_recognized())
        })
    };

    if !node.children.is_empty() {
        return decode_children(node, fields(), options, budget);
    }

    if let Some(text) = &node.text {
        if !text.is_empty() || fields().next().is_none() {
            let tag = tag.unwrap_or(TypeTag::String);
            return coerce(text, &tag, &attributes, &node.name, budget);
        }
    }

    match tag {
        Some(TypeTag::String) => Ok(Value::String(node.whitespace.clone().unwrap_or_default())),
        Some(_) if attributes.len() == 1 => Ok(Value::Null),
        _ if attributes.is_empty() => Ok(Value::Null),
        _ => Ok(Value::Mapping(
            fields()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )),
    }
}

/// Children grouped by canonical name in order of first appearance. Attributes come
/// first and share the namespace; a repeated name turns into a sequence.
fn decode_children<'a>(
    node: &Node,
    fields: impl Iterator<Item = &'a (String, String)>,
    options: &Options,
    budget: &mut BudgetEnforcer,
) -> Result<Value> {
    let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
    let mut positions: AHashMap<String, usize> = AHashMap::new();
    let mut push = |key: String, value: Value| match positions.get(&key) {
        Some(&at) => groups[at].1.push(value),
        None => {
            positions.insert(key.clone(), groups.len());
            groups.push((key, vec![value]));
        }
    };

    for (k, v) in fields {
        push(k.clone(), Value::String(v.clone()));
    }
    for child in &node.children {
        let value = decode_node(child, options, budget)?;
        push(canonical_key(&child.name), value);
    }

    let mut mapping = Mapping::with_capacity(groups.len());
    for (key, mut values) in groups {
        let value = if values.len() == 1 {
            values.remove(0)
        } else {
            Value::Sequence(values)
        };
        mapping.insert(key, value);
    }
    Ok(Value::Mapping(mapping))
}
