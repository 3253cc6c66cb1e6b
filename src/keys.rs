//! Renaming between canonical keys (`my_key`) and wire element names (`my-key`, `MyKey`).

use serde::{Deserialize, Serialize};

use crate::inflector::{DEFAULT_ENGLISH_INFLECTOR, Inflector};

/// Camel-casing mode for element names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Camelize {
    /// Keep underscores (or dasherize them).
    #[default]
    No,
    /// `my_key` → `MyKey`.
    Upper,
    /// `my_key` → `myKey`.
    Lower,
}

/// How canonical keys are turned into element names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStyle {
    /// Turn interior underscores and whitespace into dashes. Default: `true`.
    pub dasherize: bool,
    /// Camel-case the key; when set, `dasherize` is ignored. Default: [`Camelize::No`].
    pub camelize: Camelize,
}

impl Default for KeyStyle {
    fn default() -> Self {
        Self {
            dasherize: true,
            camelize: Camelize::No,
        }
    }
}

/// Rename a canonical key into its wire form with the English inflector.
///
/// ```rust
/// use xml_mini::{Camelize, KeyStyle, rename_key};
///
/// assert_eq!(rename_key("my_key", KeyStyle::default()), "my-key");
/// assert_eq!(rename_key("_my_key", KeyStyle::default()), "_my-key");
/// assert_eq!(rename_key("id_", KeyStyle::default()), "id_");
///
/// let lower = KeyStyle { camelize: Camelize::Lower, ..KeyStyle::default() };
/// assert_eq!(rename_key("my_key", lower), "myKey");
/// ```
pub fn rename_key(key: &str, style: KeyStyle) -> String {
    rename_key_with(key, style, &DEFAULT_ENGLISH_INFLECTOR)
}

pub(crate) fn rename_key_with(key: &str, style: KeyStyle, inflector: &dyn Inflector) -> String {
    if style.camelize != Camelize::No {
        return inflector.camelize(key, style.camelize).into_owned();
    }
    if !style.dasherize {
        return key.to_owned();
    }
    dasherize(key.trim())
}

/// Replace interior underscore runs with a single dash and each interior whitespace
/// character with a dash. Leading and trailing underscores stay.
fn dasherize(key: &str) -> String {
    let start = key.len() - key.trim_start_matches('_').len();
    let end = key.trim_end_matches('_').len().max(start);
    let (head, middle, tail) = (&key[..start], &key[start..end], &key[end..]);

    let mut out = String::with_capacity(key.len());
    out.push_str(head);
    let mut in_underscores = false;
    for c in middle.chars() {
        if c == '_' {
            if !in_underscores {
                out.push('-');
            }
            in_underscores = true;
        } else {
            in_underscores = false;
            out.push(if c.is_whitespace() { '-' } else { c });
        }
    }
    out.push_str(tail);
    out
}

/// Inverse rename used on decode: every `-` becomes `_`.
pub fn canonical_key(wire: &str) -> String {
    wire.replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(dasherize: bool, camelize: Camelize) -> KeyStyle {
        KeyStyle {
            dasherize,
            camelize,
        }
    }

    #[test]
    fn dasherizes_by_default() {
        let d = KeyStyle::default();
        assert_eq!(rename_key("my_key", d), "my-key");
        assert_eq!(rename_key("_id", d), "_id");
        assert_eq!(rename_key("id_", d), "id_");
        assert_eq!(rename_key("_my_key", d), "_my-key");
        assert_eq!(rename_key("my_key_", d), "my-key_");
        assert_eq!(rename_key("__my__key__", d), "__my-key__");
        assert_eq!(rename_key("___", d), "___");
    }

    #[test]
    fn whitespace_becomes_dashes() {
        let d = KeyStyle::default();
        assert_eq!(rename_key("New York", d), "New-York");
        assert_eq!(rename_key("New   York", d), "New---York");
        assert_eq!(rename_key(" padded ", d), "padded");
        assert_eq!(rename_key("already-dashed", d), "already-dashed");
    }

    #[test]
    fn dasherize_off_keeps_key() {
        assert_eq!(rename_key("my_key", style(false, Camelize::No)), "my_key");
    }

    #[test]
    fn camelize_ignores_dasherize() {
        assert_eq!(rename_key("my_key", style(true, Camelize::Upper)), "MyKey");
        assert_eq!(rename_key("my_key", style(false, Camelize::Lower)), "myKey");
    }

    #[test]
    fn canonical_form_undoes_dashes() {
        assert_eq!(canonical_key("my-key"), "my_key");
        assert_eq!(canonical_key("_my-key"), "_my_key");
        assert_eq!(canonical_key("plain"), "plain");
    }
}
