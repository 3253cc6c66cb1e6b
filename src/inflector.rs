//! Word inflection used for element naming.
//!
//! The [`Inflector`] trait is the hook for customizing how root and child element names
//! are derived. Every method has an English default, so an implementation only overrides
//! what it needs.
//!
//! ## Example: keep the defaults, add one irregular word
//!
//! ```rust
//! use std::borrow::Cow;
//! use xml_mini::inflector::{Inflector, DEFAULT_ENGLISH_INFLECTOR};
//!
//! struct Latin;
//!
//! impl Inflector for Latin {
//!     fn singularize<'a>(&self, word: &'a str) -> Cow<'a, str> {
//!         match word {
//!             "corpora" => Cow::Borrowed("corpus"),
//!             _ => DEFAULT_ENGLISH_INFLECTOR.singularize(word),
//!         }
//!     }
//! }
//!
//! assert_eq!(Latin.singularize("corpora"), "corpus");
//! assert_eq!(Latin.singularize("posts"), "post");
//! assert_eq!(Latin.pluralize("person"), "people");
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::keys::Camelize;

/// Pure string transforms consumed by name inference and key renaming.
pub trait Inflector {
    /// `post` → `posts`, `person` → `people`, `sheep` → `sheep`.
    fn pluralize<'a>(&self, word: &'a str) -> Cow<'a, str> {
        inflect(word, &PLURALS, |(singular, plural)| (singular, plural))
    }

    /// `posts` → `post`, `octopi` → `octopus`.
    fn singularize<'a>(&self, word: &'a str) -> Cow<'a, str> {
        inflect(word, &SINGULARS, |(singular, plural)| (plural, singular))
    }

    /// `ActiveModel` → `active_model`, `my-key` → `my_key`.
    fn underscore<'a>(&self, word: &'a str) -> Cow<'a, str> {
        if !word.bytes().any(|b| b.is_ascii_uppercase() || b == b'-') {
            return Cow::Borrowed(word);
        }
        let word = ACRONYM_BOUNDARY.replace_all(word, "${1}_${2}");
        let word = CASE_BOUNDARY.replace_all(&word, "${1}_${2}");
        Cow::Owned(word.replace('-', "_").to_lowercase())
    }

    /// `my_key` → `MyKey` (upper) or `myKey` (lower). [`Camelize::No`] returns the word.
    fn camelize<'a>(&self, word: &'a str, mode: Camelize) -> Cow<'a, str> {
        if mode == Camelize::No {
            return Cow::Borrowed(word);
        }
        let mut out = String::with_capacity(word.len());
        for segment in word.split('_') {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
        if mode == Camelize::Lower {
            if let Some(first) = out.chars().next() {
                let lower: String = first.to_lowercase().collect();
                out.replace_range(..first.len_utf8(), &lower);
            }
        }
        Cow::Owned(out)
    }
}

/// English rule set.
#[derive(Debug, Default, Clone, Copy)]
pub struct English;

impl Inflector for English {}

/// A single shared instance of the English inflector.
pub static DEFAULT_ENGLISH_INFLECTOR: English = English;

static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("valid regex"));
static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid regex"));

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("zombie", "zombies"),
];

// Later rules take precedence, as in the rule tables they mirror.
const PLURAL_RULES: &[(&str, &str)] = &[
    (r"$", "s"),
    (r"(?i)s$", "s"),
    (r"(?i)^(ax|test)is$", "${1}es"),
    (r"(?i)(octop|vir)us$", "${1}i"),
    (r"(?i)(octop|vir)i$", "${1}i"),
    (r"(?i)(alias|status)$", "${1}es"),
    (r"(?i)(bu)s$", "${1}ses"),
    (r"(?i)(buffal|tomat)o$", "${1}oes"),
    (r"(?i)([ti])um$", "${1}a"),
    (r"(?i)([ti])a$", "${1}a"),
    (r"(?i)sis$", "ses"),
    (r"(?i)(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
    (r"(?i)(hive)$", "${1}s"),
    (r"(?i)([^aeiouy]|qu)y$", "${1}ies"),
    (r"(?i)(x|ch|ss|sh)$", "${1}es"),
    (r"(?i)(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
    (r"(?i)^(m|l)ouse$", "${1}ice"),
    (r"(?i)^(m|l)ice$", "${1}ice"),
    (r"(?i)^(ox)$", "${1}en"),
    (r"(?i)^(oxen)$", "${1}"),
    (r"(?i)(quiz)$", "${1}zes"),
];

const SINGULAR_RULES: &[(&str, &str)] = &[
    (r"(?i)s$", ""),
    (r"(?i)(ss)$", "${1}"),
    (r"(?i)(n)ews$", "${1}ews"),
    (r"(?i)([ti])a$", "${1}um"),
    (
        r"(?i)((a)naly|(b)a|(d)iagno|(p)arenthe|(p)rogno|(s)ynop|(t)he)(sis|ses)$",
        "${1}sis",
    ),
    (r"(?i)(^analy)(sis|ses)$", "${1}sis"),
    (r"(?i)([^f])ves$", "${1}fe"),
    (r"(?i)(hive)s$", "${1}"),
    (r"(?i)(tive)s$", "${1}"),
    (r"(?i)([lr])ves$", "${1}f"),
    (r"(?i)([^aeiouy]|qu)ies$", "${1}y"),
    (r"(?i)(s)eries$", "${1}eries"),
    (r"(?i)(m)ovies$", "${1}ovie"),
    (r"(?i)(x|ch|ss|sh)es$", "${1}"),
    (r"(?i)^(m|l)ice$", "${1}ouse"),
    (r"(?i)(bus)(es)?$", "${1}"),
    (r"(?i)(o)es$", "${1}"),
    (r"(?i)(shoe)s$", "${1}"),
    (r"(?i)(cris|test)(is|es)$", "${1}is"),
    (r"(?i)^(a)x[ie]s$", "${1}xis"),
    (r"(?i)(octop|vir)(us|i)$", "${1}us"),
    (r"(?i)(alias|status)(es)?$", "${1}"),
    (r"(?i)^(ox)en", "${1}"),
    (r"(?i)(vert|ind)ices$", "${1}ex"),
    (r"(?i)(matr)ices$", "${1}ix"),
    (r"(?i)(quiz)zes$", "${1}"),
    (r"(?i)(database)s$", "${1}"),
];

static PLURALS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| compile(PLURAL_RULES));
static SINGULARS: LazyLock<Vec<(Regex, &'static str)>> =
    LazyLock::new(|| compile(SINGULAR_RULES));

fn compile(rules: &'static [(&'static str, &'static str)]) -> Vec<(Regex, &'static str)> {
    rules
        .iter()
        .rev()
        .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid regex"), *replacement))
        .collect()
}

/// Apply the first matching rule. `direction` picks (from, to) out of each irregular pair.
fn inflect<'a>(
    word: &'a str,
    rules: &[(Regex, &'static str)],
    direction: fn((&'static str, &'static str)) -> (&'static str, &'static str),
) -> Cow<'a, str> {
    if word.is_empty() {
        return Cow::Borrowed(word);
    }
    let lower = word.to_lowercase();
    let last_word = lower
        .rsplit(|c: char| c.is_whitespace() || c == '-')
        .next()
        .unwrap_or(&lower);
    if UNCOUNTABLE.contains(&last_word) {
        return Cow::Borrowed(word);
    }
    for &pair in IRREGULAR {
        let (from, to) = direction(pair);
        let Some(prefix_len) = word.len().checked_sub(from.len()) else {
            continue;
        };
        if !word.is_char_boundary(prefix_len) || !word[prefix_len..].eq_ignore_ascii_case(from) {
            continue;
        }
        let mut out = String::with_capacity(prefix_len + to.len());
        out.push_str(&word[..prefix_len]);
        // keep the case of the first letter
        if word.as_bytes()[prefix_len].is_ascii_uppercase() {
            out.push_str(&to[..1].to_ascii_uppercase());
        } else {
            out.push_str(&to[..1]);
        }
        out.push_str(&to[1..]);
        return Cow::Owned(out);
    }
    for (regex, replacement) in rules {
        if regex.is_match(word) {
            return Cow::Owned(regex.replace(word, *replacement).into_owned());
        }
    }
    Cow::Borrowed(word)
}
