//! `type="yaml"` payloads, only reachable in trusted mode.
//!
//! The text is parsed with `saphyr-parser` and folded into a [`Value`]. Aliases are
//! replayed by cloning the anchored value; each replay is charged to the decode budget as
//! one entity expansion so that alias bombs hit the same ceiling as entity bombs.

use ahash::AHashMap;
use saphyr_parser::{Event, Parser, ScalarStyle};

use crate::budget::BudgetEnforcer;
use crate::error::Error;
use crate::parse_scalars::{parse_float, parse_int};
use crate::value::{Mapping, Value};

enum Frame {
    Sequence {
        anchor: usize,
        items: Vec<Value>,
    },
    Mapping {
        anchor: usize,
        mapping: Mapping,
        key: Option<String>,
    },
}

/// Parse the first YAML document in `raw`. An empty payload is [`Value::Null`].
pub(crate) fn parse_yaml(raw: &str, node: &str, budget: &mut BudgetEnforcer) -> Result<Value, Error> {
    let invalid = |msg: &str| Error::syntax(format!("invalid yaml in <{node}>: {msg}"));

    let mut anchors: AHashMap<usize, Value> = AHashMap::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    for item in Parser::new_from_str(raw) {
        let (event, _span) = item.map_err(|err| invalid(err.info()))?;
        let (value, text) = match event {
            Event::DocumentEnd if root.is_some() => break,
            Event::Scalar(text, style, anchor, tag) => {
                let verbatim = !matches!(style, ScalarStyle::Plain)
                    || tag.is_some_and(|t| t.to_string().ends_with("str"));
                let value = if verbatim {
                    Value::String(text.to_string())
                } else {
                    plain_scalar(&text)
                };
                if anchor != 0 {
                    anchors.insert(anchor, value.clone());
                }
                (value, Some(text.into_owned()))
            }
            Event::SequenceStart(anchor, _) => {
                stack.push(Frame::Sequence {
                    anchor,
                    items: Vec::new(),
                });
                continue;
            }
            Event::MappingStart(anchor, _) => {
                stack.push(Frame::Mapping {
                    anchor,
                    mapping: Mapping::new(),
                    key: None,
                });
                continue;
            }
            Event::SequenceEnd | Event::MappingEnd => {
                let (anchor, value) = match stack.pop() {
                    Some(Frame::Sequence { anchor, items }) => (anchor, Value::Sequence(items)),
                    Some(Frame::Mapping { anchor, mapping, .. }) => {
                        (anchor, Value::Mapping(mapping))
                    }
                    None => return Err(invalid("unbalanced collection end")),
                };
                if anchor != 0 {
                    anchors.insert(anchor, value.clone());
                }
                (value, None)
            }
            Event::Alias(anchor) => {
                let value = anchors
                    .get(&anchor)
                    .cloned()
                    .ok_or_else(|| invalid("alias to an unknown anchor"))?;
                budget
                    .expand_reference(weight(&value), 1)
                    .map_err(Error::budget)?;
                let text = value.as_str().map(str::to_owned);
                (value, text)
            }
            _ => continue,
        };

        match stack.last_mut() {
            None => root = Some(value),
            Some(Frame::Sequence { items, .. }) => items.push(value),
            Some(Frame::Mapping { mapping, key, .. }) => match key.take() {
                Some(k) => {
                    mapping.insert(k, value);
                }
                None => *key = Some(text.ok_or_else(|| invalid("only scalar keys are supported"))?),
            },
        }
    }

    Ok(root.unwrap_or_default())
}

/// YAML core schema typing for untagged plain scalars.
fn plain_scalar(text: &str) -> Value {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => Value::Null,
        "true" | "True" | "TRUE" => Value::Boolean(true),
        "false" | "False" | "FALSE" => Value::Boolean(false),
        ".nan" | ".NaN" | ".NAN" => Value::Float(f64::NAN),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Value::Float(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Value::Float(f64::NEG_INFINITY),
        _ => {
            if let Some(i) = parse_int(text) {
                Value::Integer(i)
            } else if let Some(f) = parse_float(text).filter(|f| f.is_finite()) {
                Value::Float(f)
            } else {
                Value::String(text.to_owned())
            }
        }
    }
}

/// Rough byte size of a replayed value.
fn weight(value: &Value) -> usize {
    match value {
        Value::String(s) | Value::Symbol(s) => s.len(),
        Value::Sequence(items) => items.iter().map(weight).sum::<usize>() + 1,
        Value::Mapping(m) => m.iter().map(|(k, v)| k.len() + weight(v)).sum::<usize>() + 1,
        _ => 8,
    }
}
