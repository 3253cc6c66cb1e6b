//! Value to XML encoder.
//!
//! Walks a [`Value`] and drives the active backend's [`MarkupBuilder`]. Mappings become
//! elements named after their (renamed) keys, sequences become `type="array"` elements
//! with one child per item, and scalars become leaves carrying the `type` attribute chosen
//! by [`render_from_value`].
//!
//! ```rust
//! use xml_mini::{Value, mapping};
//!
//! let value = Value::from(mapping! {
//!     "title" => "Hello",
//!     "post_ids" => vec![1, 2],
//! });
//! let xml = xml_mini::to_string_with_options(
//!     &value,
//!     xml_mini::encode_options! { root: Some("topic".into()), skip_instruct: true },
//! )
//! .unwrap();
//! assert_eq!(
//!     xml,
//!     "<topic>\n  <title>Hello</title>\n  <post-ids type=\"array\">\n    <post-id type=\"integer\">1</post-id>\n    <post-id type=\"integer\">2</post-id>\n  </post-ids>\n</topic>"
//! );
//! ```

use std::io::Write;

use crate::backend::{MarkupBuilder, backend};
use crate::encode_options::EncodeOptions;
use crate::error::Error;
use crate::format_scalars::render_from_value;
use crate::inflector::Inflector;
use crate::keys::rename_key_with;
use crate::value::{Custom, Mapping, Value};

/// Result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Value that writes its own markup.
///
/// The encoder calls [`Renderable::render`] with options whose `root` is the renamed key
/// the value is stored under; the renderer decides the element name from it. Closures with
/// the matching signature implement this trait.
///
/// ```rust
/// use xml_mini::{EncodeOptions, MarkupBuilder, Value, mapping};
///
/// let money = Value::custom(|b: &mut dyn MarkupBuilder, o: &EncodeOptions| {
///     let name = o.root.as_deref().unwrap_or("money");
///     b.open_tag(name, &[("currency", "EUR")])?;
///     b.write_text("12.50")?;
///     b.close_tag(name)
/// });
/// let value = Value::from(mapping! { "price" => money });
/// let xml = xml_mini::to_string_with_options(
///     &value,
///     xml_mini::encode_options! { root: Some("item".into()), skip_instruct: true, indent: 0 },
/// )
/// .unwrap();
/// assert_eq!(xml, r#"<item><price currency="EUR">12.50</price></item>"#);
/// ```
pub trait Renderable {
    fn render(&self, builder: &mut dyn MarkupBuilder, options: &EncodeOptions) -> Result<()>;
}

impl<F> Renderable for F
where
    F: Fn(&mut dyn MarkupBuilder, &EncodeOptions) -> Result<()>,
{
    fn render(&self, builder: &mut dyn MarkupBuilder, options: &EncodeOptions) -> Result<()> {
        self(builder, options)
    }
}

type Hook<'h> = Box<dyn FnOnce(&mut dyn MarkupBuilder) -> Result<()> + 'h>;

/// Encode `value` with default [`EncodeOptions`].
pub fn to_string(value: &Value) -> Result<String> {
    to_string_with_options(value, EncodeOptions::default())
}

/// Encode `value` with the given options.
pub fn to_string_with_options(value: &Value, options: EncodeOptions) -> Result<String> {
    encode_document(value, &options, None)
}

/// Encode `value` and let `hook` append extra content just before the root element closes.
///
/// ```rust
/// use xml_mini::{MarkupBuilder, Value, mapping};
///
/// let value = Value::from(mapping! { "name" => "David" });
/// let xml = xml_mini::to_string_with_hook(
///     &value,
///     xml_mini::encode_options! { root: Some("person".into()), skip_instruct: true, indent: 0 },
///     |b: &mut dyn MarkupBuilder| b.element("creator", "Rails"),
/// )
/// .unwrap();
/// assert_eq!(xml, "<person><name>David</name><creator>Rails</creator></person>");
/// ```
pub fn to_string_with_hook<F>(value: &Value, options: EncodeOptions, hook: F) -> Result<String>
where
    F: FnOnce(&mut dyn MarkupBuilder) -> Result<()>,
{
    encode_document(value, &options, Some(Box::new(hook)))
}

/// Encode `value` into `writer`.
pub fn to_writer_with_options<W: Write>(
    mut writer: W,
    value: &Value,
    options: EncodeOptions,
) -> Result<()> {
    let xml = to_string_with_options(value, options)?;
    writer.write_all(xml.as_bytes())?;
    Ok(())
}

fn encode_document(value: &Value, options: &EncodeOptions, hook: Option<Hook<'_>>) -> Result<String> {
    let backend = backend();
    log::debug!(
        "encoding {} with backend {}",
        value.kind_name(),
        backend.name()
    );
    let mut builder = backend.builder(options.indent);
    if !options.skip_instruct {
        builder.declaration()?;
    }
    let root = match &options.root {
        Some(root) => root.clone(),
        None => default_root(value, options.inflector),
    };

    let mut encoder = Encoder {
        builder: builder.as_mut(),
        options,
    };
    match value {
        Value::Mapping(mapping) => encoder.mapping(&root, mapping, hook)?,
        Value::Sequence(items) => {
            encoder.sequence(&root, items, options.children.as_deref(), hook)?
        }
        Value::Custom(custom) => {
            encoder.custom(&root, custom)?;
            if let Some(hook) = hook {
                hook(encoder.builder)?;
            }
        }
        scalar => encoder.scalar(&root, scalar, hook)?,
    }
    builder.finish()
}

/// Root element name when none is given: `hash` for a mapping; for a sequence the
/// pluralized kind of its items if they all share one non-mapping kind, `objects`
/// otherwise (`nil_classes` when empty); a scalar uses its kind name.
pub(crate) fn default_root(value: &Value, inflector: &dyn Inflector) -> String {
    match value {
        Value::Sequence(items) => match items.first() {
            None => inflector.pluralize(Value::Null.kind_name()).into_owned(),
            Some(first)
                if !matches!(first, Value::Mapping(_))
                    && items.iter().all(|i| i.kind_name() == first.kind_name()) =>
            {
                inflector.pluralize(first.kind_name()).into_owned()
            }
            Some(_) => "objects".to_owned(),
        },
        other => other.kind_name().to_owned(),
    }
}

struct Encoder<'b> {
    builder: &'b mut dyn MarkupBuilder,
    options: &'b EncodeOptions,
}

impl Encoder<'_> {
    fn rename(&self, key: &str) -> String {
        rename_key_with(key, self.options.key_style(), self.options.inflector)
    }

    fn value(&mut self, key: &str, value: &Value) -> Result<()> {
        match value {
            Value::Mapping(mapping) => self.mapping(key, mapping, None),
            Value::Sequence(items) => self.sequence(key, items, None, None),
            Value::Custom(custom) => self.custom(key, custom),
            scalar => self.scalar(key, scalar, None),
        }
    }

    fn mapping(&mut self, key: &str, mapping: &Mapping, hook: Option<Hook<'_>>) -> Result<()> {
        let name = self.rename(key);
        self.builder.open_tag(&name, &[])?;
        for (k, v) in mapping {
            self.value(k, v)?;
        }
        if let Some(hook) = hook {
            hook(self.builder)?;
        }
        self.builder.close_tag(&name)
    }

    fn sequence(
        &mut self,
        key: &str,
        items: &[Value],
        children: Option<&str>,
        hook: Option<Hook<'_>>,
    ) -> Result<()> {
        let name = self.rename(key);
        let attributes: &[(&str, &str)] = if self.options.skip_types {
            &[]
        } else {
            &[("type", "array")]
        };
        if items.is_empty() && hook.is_none() {
            return self.builder.empty_tag(&name, attributes);
        }
        let child = match children {
            Some(child) => child.to_owned(),
            None => self.options.inflector.singularize(&name).into_owned(),
        };
        self.builder.open_tag(&name, attributes)?;
        for item in items {
            self.value(&child, item)?;
        }
        if let Some(hook) = hook {
            hook(self.builder)?;
        }
        self.builder.close_tag(&name)
    }

    fn custom(&mut self, key: &str, custom: &Custom) -> Result<()> {
        let options = EncodeOptions {
            root: Some(self.rename(key)),
            children: None,
            skip_instruct: true,
            ..self.options.clone()
        };
        custom.renderer().render(self.builder, &options)
    }

    fn scalar(&mut self, key: &str, value: &Value, hook: Option<Hook<'_>>) -> Result<()> {
        let rendered = render_from_value(value)
            .ok_or_else(|| Error::encode(format!("{} is not a scalar", value.kind_name())))?;
        let name = self.rename(key);

        let mut attributes: Vec<(&str, &str)> = Vec::with_capacity(rendered.attributes.len() + 1);
        if let Some(tag) = rendered.tag.as_ref().filter(|_| !self.options.skip_types) {
            attributes.push(("type", tag.as_str()));
        }
        attributes.extend(rendered.attributes.iter().map(|(k, v)| (*k, v.as_str())));

        if rendered.text.is_empty() && hook.is_none() {
            return self.builder.empty_tag(&name, &attributes);
        }
        self.builder.open_tag(&name, &attributes)?;
        self.builder.write_text(&rendered.text)?;
        if let Some(hook) = hook {
            hook(self.builder)?;
        }
        self.builder.close_tag(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inflector::DEFAULT_ENGLISH_INFLECTOR;
    use crate::mapping;

    fn compact(root: &str) -> EncodeOptions {
        EncodeOptions {
            root: Some(root.to_owned()),
            skip_instruct: true,
            indent: 0,
            ..EncodeOptions::default()
        }
    }

    #[test]
    fn default_roots() {
        let i = &DEFAULT_ENGLISH_INFLECTOR;
        assert_eq!(default_root(&Value::Mapping(Mapping::new()), i), "hash");
        assert_eq!(default_root(&Value::Sequence(vec![]), i), "nil_classes");
        assert_eq!(default_root(&Value::from(vec![1, 2]), i), "integers");
        assert_eq!(
            default_root(&Value::Sequence(vec![Value::from(1), Value::from("a")]), i),
            "objects"
        );
        let hashes = Value::Sequence(vec![Value::Mapping(Mapping::new())]);
        assert_eq!(default_root(&hashes, i), "objects");
        assert_eq!(default_root(&Value::from(true), i), "boolean");
    }

    #[test]
    fn escapes_text_once() {
        let value = Value::from(mapping! {
            "bare_string" => "First & Last Name",
            "pre_escaped_string" => "First &amp; Last Name",
        });
        let xml = to_string_with_options(&value, compact("person")).unwrap();
        assert_eq!(
            xml,
            "<person><bare-string>First &amp; Last Name</bare-string><pre-escaped-string>First &amp;amp; Last Name</pre-escaped-string></person>"
        );
    }

    #[test]
    fn nulls_and_empty_strings() {
        let value = Value::from(mapping! { "a" => Value::Null, "b" => "" });
        let xml = to_string_with_options(&value, compact("r")).unwrap();
        assert_eq!(xml, r#"<r><a nil="true"/><b type="string"/></r>"#);

        let opts = EncodeOptions {
            skip_types: true,
            ..compact("r")
        };
        let xml = to_string_with_options(&value, opts).unwrap();
        assert_eq!(xml, r#"<r><a nil="true"/><b/></r>"#);
    }

    #[test]
    fn root_sequence_uses_children_option() {
        let value = Value::from(vec!["a", "b"]);
        let opts = EncodeOptions {
            children: Some("item".into()),
            ..compact("list")
        };
        let xml = to_string_with_options(&value, opts).unwrap();
        assert_eq!(xml, r#"<list type="array"><item>a</item><item>b</item></list>"#);
    }

    #[test]
    fn empty_sequence_is_self_closing() {
        let value = Value::from(mapping! { "posts" => Value::Sequence(vec![]) });
        let xml = to_string_with_options(&value, compact("blog")).unwrap();
        assert_eq!(xml, r#"<blog><posts type="array"/></blog>"#);
    }

    #[test]
    fn hook_runs_before_root_closes() {
        let value = Value::from(vec![1]);
        let xml = to_string_with_hook(&value, compact("numbers"), |b: &mut dyn MarkupBuilder| {
            b.empty_tag("extra", &[])
        })
        .unwrap();
        assert_eq!(
            xml,
            r#"<numbers type="array"><number type="integer">1</number><extra/></numbers>"#
        );
    }

    #[test]
    fn renderer_errors_propagate() {
        let value = Value::from(mapping! {
            "bad" => Value::custom(|_: &mut dyn MarkupBuilder, _: &EncodeOptions| {
                Err::<(), Error>(Error::encode("refused"))
            }),
        });
        let err = to_string_with_options(&value, compact("r")).unwrap_err();
        assert_eq!(err.to_string(), "encoding failed: refused");
    }

    #[test]
    fn declaration_and_indent() {
        let value = Value::from(mapping! { "id" => 1 });
        let xml = to_string(&value).unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<hash>\n  <id type=\"integer\">1</id>\n</hash>"
        );
    }

    #[test]
    fn writer_receives_document() {
        let mut out = Vec::new();
        to_writer_with_options(&mut out, &Value::from(5), compact("n")).unwrap();
        assert_eq!(out, br#"<n type="integer">5</n>"#);
    }
}
