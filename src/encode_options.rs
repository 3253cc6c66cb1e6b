//! Options for XML emission.
//!
//! Controls the root and child element names, type annotations, key renaming and
//! indentation.
//!
//! ```rust
//! use xml_mini::{Camelize, Value, mapping};
//!
//! let value = Value::from(mapping! { "first_name" => "Ada" });
//! let opts = xml_mini::encode_options! {
//!     root: Some("person".into()),
//!     camelize: Camelize::Lower,
//!     skip_instruct: true,
//!     indent: 0,
//! };
//! let xml = xml_mini::to_string_with_options(&value, opts).unwrap();
//! assert_eq!(xml, "<person><firstName>Ada</firstName></person>");
//! ```

use std::fmt;

use crate::inflector::{DEFAULT_ENGLISH_INFLECTOR, Inflector};
use crate::keys::{Camelize, KeyStyle};

/// Encoder options.
///
/// Construct `EncodeOptions` using the [`encode_options!`](crate::encode_options!)
/// macro to stay compatible when fields are added.
#[derive(Clone)]
pub struct EncodeOptions {
    /// Name of the root element. Default: derived from the value (`hash` for a mapping,
    /// the pluralized element kind for a uniform sequence, `objects` otherwise).
    pub root: Option<String>,
    /// Element name for the items of a root sequence. Default: the singularized root.
    pub children: Option<String>,
    /// Omit `type` attributes. `nil="true"` is still written. Off by default.
    pub skip_types: bool,
    /// Omit the `<?xml ...?>` declaration. Off by default.
    pub skip_instruct: bool,
    /// Turn interior underscores of keys into dashes (on by default).
    pub dasherize: bool,
    /// Camel-case keys instead; overrides `dasherize`.
    pub camelize: Camelize,
    /// Spaces per nesting level, `0` for compact output (2 by default).
    pub indent: usize,
    /// Word rules for pluralizing and singularizing element names.
    pub inflector: &'static (dyn Inflector + Sync),
}

impl EncodeOptions {
    pub fn key_style(&self) -> KeyStyle {
        KeyStyle {
            dasherize: self.dasherize,
            camelize: self.camelize,
        }
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            root: None,
            children: None,
            skip_types: false,
            skip_instruct: false,
            dasherize: true,
            camelize: Camelize::No,
            indent: 2,
            inflector: &DEFAULT_ENGLISH_INFLECTOR,
        }
    }
}

impl fmt::Debug for EncodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodeOptions")
            .field("root", &self.root)
            .field("children", &self.children)
            .field("skip_types", &self.skip_types)
            .field("skip_instruct", &self.skip_instruct)
            .field("dasherize", &self.dasherize)
            .field("camelize", &self.camelize)
            .field("indent", &self.indent)
            .finish_non_exhaustive()
    }
}
