//! Defines error and its location
use std::fmt;

use crate::budget::BudgetBreach;

/// Row/column location within the source XML document (1-indexed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    /// 1-indexed row number in the input.
    pub(crate) row: u32,
    /// 1-indexed column number in the input, counted in characters.
    pub(crate) column: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    pub const UNKNOWN: Self = Self { row: 0, column: 0 };

    /// Line number (1-indexed).
    pub fn line(&self) -> u64 {
        self.row as u64
    }

    /// Column number (1-indexed).
    pub fn column(&self) -> u64 {
        self.column as u64
    }

    pub(crate) const fn new(row: usize, column: usize) -> Self {
        Self {
            row: row as u32,
            column: column as u32,
        }
    }

    /// Translate a byte offset reported by the reader into row and column.
    ///
    /// Offsets past the end of `input` are clamped; offsets inside a multi-byte
    /// character are moved back to its start.
    pub(crate) fn from_offset(input: &str, offset: usize) -> Self {
        let mut end = offset.min(input.len());
        while !input.is_char_boundary(end) {
            end -= 1;
        }
        let before = &input[..end];
        let row = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self::new(row, column)
    }
}

/// Error returned by decoding and encoding.
///
/// Every variant aborts the whole call; there are no partial results.
#[derive(Debug)]
pub enum Error {
    /// Malformed markup, or an entity reference that cannot be resolved
    /// (undeclared, external, or recursive).
    Syntax { msg: String, location: Location },
    /// A decode budget ceiling was crossed (entity expansions, expansion bytes,
    /// entity nesting, element depth or element count).
    ExpansionLimitExceeded {
        breach: BudgetBreach,
        location: Location,
    },
    /// A `type` attribute that the active policy rejects.
    DisallowedType { type_name: String, node: String },
    /// Text that does not match the lexical form of its declared type.
    Coercion {
        type_name: String,
        text: String,
        node: String,
    },
    /// The builder failed, or a caller supplied renderer reported an error.
    Encode { msg: String },
    /// I/O error while reading input or writing output.
    IOError { cause: std::io::Error },
}

impl Error {
    pub(crate) fn syntax<S: Into<String>>(msg: S) -> Self {
        Error::Syntax {
            msg: msg.into(),
            location: Location::UNKNOWN,
        }
    }

    /// Error for custom renderers and hooks.
    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Error::Encode { msg: msg.into() }
    }

    pub(crate) fn budget(breach: BudgetBreach) -> Self {
        Error::ExpansionLimitExceeded {
            breach,
            location: Location::UNKNOWN,
        }
    }

    pub(crate) fn coercion(type_name: &str, text: &str, node: &str) -> Self {
        Error::Coercion {
            type_name: type_name.to_owned(),
            text: text.to_owned(),
            node: node.to_owned(),
        }
    }

    /// Attach/override a concrete location to this error and return it.
    ///
    /// Variants that do not carry a location are returned unchanged.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        match &mut self {
            Error::Syntax { location, .. } | Error::ExpansionLimitExceeded { location, .. } => {
                *location = set_location;
            }
            Error::DisallowedType { .. }
            | Error::Coercion { .. }
            | Error::Encode { .. }
            | Error::IOError { .. } => {}
        }
        self
    }

    /// If the error has a known location, return it.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Syntax { location, .. } | Error::ExpansionLimitExceeded { location, .. } => {
                if location != &Location::UNKNOWN {
                    Some(*location)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax { msg, location } => fmt_with_location(f, msg, location),
            Error::ExpansionLimitExceeded { breach, location } => fmt_with_location(
                f,
                &format!("expansion limit exceeded: {breach}"),
                location,
            ),
            Error::DisallowedType { type_name, node } => {
                write!(f, "disallowed type attribute \"{type_name}\" on <{node}>")
            }
            Error::Coercion {
                type_name,
                text,
                node,
            } => write!(f, "invalid {type_name} value {text:?} in <{node}>"),
            Error::Encode { msg } => write!(f, "encoding failed: {msg}"),
            Error::IOError { cause } => write!(f, "IO error: {cause}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError { cause } => Some(cause),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(cause: std::io::Error) -> Self {
        Error::IOError { cause }
    }
}

/// Print a message optionally suffixed with "at line X, column Y".
fn fmt_with_location(f: &mut fmt::Formatter<'_>, msg: &str, location: &Location) -> fmt::Result {
    if location != &Location::UNKNOWN {
        write!(
            f,
            "{msg} at line {}, column {}",
            location.row, location.column
        )
    } else {
        write!(f, "{msg}")
    }
}
