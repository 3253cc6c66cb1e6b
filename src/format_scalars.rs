//! Typed value to text, the inverse of [`crate::coerce_to_value`].

use crate::base64::encode_base64;
use crate::tags::TypeTag;
use crate::value::Value;
use crate::zmij_format::push_float_string;

/// Wire form of a scalar: the `type` attribute to emit (if any), the element text, and
/// extra attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    pub tag: Option<TypeTag>,
    pub text: String,
    pub attributes: Vec<(&'static str, String)>,
}

impl Rendered {
    fn new(tag: Option<TypeTag>, text: String) -> Self {
        Self {
            tag,
            text,
            attributes: Vec::new(),
        }
    }

    /// `true` for [`Value::Null`], which is written as `nil="true"` with no text.
    pub fn is_nil(&self) -> bool {
        self.attributes.iter().any(|(k, v)| *k == "nil" && v == "true")
    }
}

/// Pick the minimal type tag and text that decode back to `value`.
///
/// Returns `None` for containers and custom renderers; those are walked by the encoder.
///
/// ```rust
/// use xml_mini::{TypeTag, Value, render_from_value};
///
/// let r = render_from_value(&Value::Float(135.0)).unwrap();
/// assert_eq!(r.tag, Some(TypeTag::Float));
/// assert_eq!(r.text, "135.0");
///
/// let r = render_from_value(&Value::from("plain")).unwrap();
/// assert_eq!(r.tag, None);
/// ```
pub fn render_from_value(value: &Value) -> Option<Rendered> {
    let rendered = match value {
        Value::Null => Rendered {
            tag: None,
            text: String::new(),
            attributes: vec![("nil", "true".to_owned())],
        },
        Value::String(s) if s.trim().is_empty() => Rendered::new(Some(TypeTag::String), s.clone()),
        Value::String(s) => Rendered::new(None, s.clone()),
        Value::Integer(i) => Rendered::new(Some(TypeTag::Integer), i.to_string()),
        Value::Float(f) => {
            let mut text = String::new();
            push_float_string(&mut text, *f);
            Rendered::new(Some(TypeTag::Float), text)
        }
        Value::Decimal(d) => Rendered::new(Some(TypeTag::Decimal), d.to_string()),
        Value::Boolean(b) => Rendered::new(Some(TypeTag::Boolean), b.to_string()),
        Value::Date(d) => Rendered::new(Some(TypeTag::Date), d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => Rendered::new(
            Some(TypeTag::DateTime),
            dt.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
        ),
        Value::Symbol(s) => Rendered::new(Some(TypeTag::Symbol), s.clone()),
        Value::Binary(bytes) => Rendered {
            tag: Some(TypeTag::Binary),
            text: encode_base64(bytes),
            attributes: vec![("encoding", "base64".to_owned())],
        },
        Value::File(file) => Rendered {
            tag: Some(TypeTag::File),
            text: encode_base64(&file.content),
            attributes: vec![
                ("name", file.filename.clone()),
                ("content_type", file.content_type.clone()),
            ],
        },
        Value::Sequence(_) | Value::Mapping(_) | Value::Custom(_) => return None,
    };
    Some(rendered)
}
