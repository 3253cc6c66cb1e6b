use std::fmt;

use serde::{Deserialize, Serialize};

pub(crate) const TAG_INTEGER: &str = "integer";
pub(crate) const TAG_FLOAT: &str = "float";
pub(crate) const TAG_FLOAT_DOUBLE: &str = "double";
pub(crate) const TAG_DECIMAL: &str = "decimal";
pub(crate) const TAG_BOOLEAN: &str = "boolean";
pub(crate) const TAG_DATE: &str = "date";
pub(crate) const TAG_DATETIME: &str = "datetime";
pub(crate) const TAG_DATETIME_CAMEL: &str = "dateTime";
pub(crate) const TAG_BINARY: &str = "binary";
pub(crate) const TAG_BINARY_BASE64: &str = "base64Binary";
pub(crate) const TAG_FILE: &str = "file";
pub(crate) const TAG_SYMBOL: &str = "symbol";
pub(crate) const TAG_YAML: &str = "yaml";
pub(crate) const TAG_ARRAY: &str = "array";
pub(crate) const TAG_STRING: &str = "string";

/// Types whose reconstruction is refused unless trusted mode is on.
pub(crate) const UNSAFE_TAGS: &[&str] = &[TAG_SYMBOL, TAG_YAML];

/// Value of a `type="..."` attribute.
///
/// The set is closed; anything unrecognized is kept verbatim in [`TypeTag::Other`] so
/// documents from foreign schemas still decode.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TypeTag {
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Binary,
    File,
    Symbol,
    Yaml,
    Array,
    String,
    /// Unrecognized tag, carried as written.
    Other(String),
}

impl TypeTag {
    /// Interpret a `type` attribute value. Never fails.
    pub fn parse(tag: &str) -> Self {
        match tag {
            TAG_INTEGER => TypeTag::Integer,
            TAG_FLOAT | TAG_FLOAT_DOUBLE => TypeTag::Float,
            TAG_DECIMAL => TypeTag::Decimal,
            TAG_BOOLEAN => TypeTag::Boolean,
            TAG_DATE => TypeTag::Date,
            TAG_DATETIME | TAG_DATETIME_CAMEL => TypeTag::DateTime,
            TAG_BINARY | TAG_BINARY_BASE64 => TypeTag::Binary,
            TAG_FILE => TypeTag::File,
            TAG_SYMBOL => TypeTag::Symbol,
            TAG_YAML => TypeTag::Yaml,
            TAG_ARRAY => TypeTag::Array,
            TAG_STRING => TypeTag::String,
            other => TypeTag::Other(other.to_owned()),
        }
    }

    /// Canonical wire spelling.
    pub fn as_str(&self) -> &str {
        match self {
            TypeTag::Integer => TAG_INTEGER,
            TypeTag::Float => TAG_FLOAT,
            TypeTag::Decimal => TAG_DECIMAL,
            TypeTag::Boolean => TAG_BOOLEAN,
            TypeTag::Date => TAG_DATE,
            TypeTag::DateTime => TAG_DATETIME,
            TypeTag::Binary => TAG_BINARY,
            TypeTag::File => TAG_FILE,
            TypeTag::Symbol => TAG_SYMBOL,
            TypeTag::Yaml => TAG_YAML,
            TypeTag::Array => TAG_ARRAY,
            TypeTag::String => TAG_STRING,
            TypeTag::Other(tag) => tag,
        }
    }

    /// `true` for every tag except [`TypeTag::Other`].
    pub fn is_recognized(&self) -> bool {
        !matches!(self, TypeTag::Other(_))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TypeTag {
    fn from(tag: String) -> Self {
        TypeTag::parse(&tag)
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.as_str().to_owned()
    }
}
