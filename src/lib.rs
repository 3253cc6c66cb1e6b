//! Convert XML documents to nested loosely typed values and back.
//!
//! Elements become mappings keyed by canonical (underscored) names, `type` attributes
//! drive scalar coercion, and `type="array"` or repeated siblings become sequences. The
//! encoder runs the other way, annotating scalars with their type.
//!
//! ```rust
//! use xml_mini::Value;
//!
//! let value = xml_mini::from_str(r#"<post><id type="integer">1</id></post>"#).unwrap();
//! assert_eq!(value["post"]["id"], Value::Integer(1));
//!
//! let xml = xml_mini::to_string_with_options(
//!     &value["post"],
//!     xml_mini::encode_options! { root: Some("post".into()), skip_instruct: true, indent: 0 },
//! )
//! .unwrap();
//! assert_eq!(xml, r#"<post><id type="integer">1</id></post>"#);
//! ```

pub use backend::{
    Backend, MarkupBuilder, Node, XmlBackend, backend, default_backend, set_backend,
    set_default_backend, with_backend,
};
pub use budget::Budget;
pub use de::{
    from_reader, from_reader_with_options, from_slice, from_slice_with_options, from_str,
    from_str_with_options,
};
pub use encode_options::EncodeOptions;
pub use error::{Error, Location};
pub use format_scalars::{Rendered, render_from_value};
pub use keys::{Camelize, KeyStyle, canonical_key, rename_key};
pub use options::Options;
pub use parse_scalars::coerce_to_value;
pub use quick::QuickXml;
pub use ser::{Renderable, to_string, to_string_with_hook, to_string_with_options, to_writer_with_options};
pub use tags::TypeTag;
pub use value::{Custom, FileRef, Mapping, Value};

mod backend;
mod base64;
pub mod budget;
mod de;
mod encode_options;
mod entities;
mod error;
mod format_scalars;
mod guard;
pub mod inflector;
mod keys;
mod macros;
mod options;
mod parse_scalars;
mod quick;
mod ser;
mod tags;
mod value;
#[cfg(feature = "yaml")]
mod yaml;
mod zmij_format;
