//! Internal DTD subset: entity declarations and budgeted reference expansion.

use std::borrow::Cow;

use ahash::AHashMap;
use quick_xml::escape::{resolve_predefined_entity, unescape};

use crate::budget::BudgetEnforcer;
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entity {
    Internal(String),
    /// SYSTEM or PUBLIC; never fetched.
    External,
}

/// General entities declared in a document's `<!DOCTYPE ... [ ... ]>`.
#[derive(Debug, Default)]
pub(crate) struct EntityTable {
    entities: AHashMap<String, Entity>,
}

impl EntityTable {
    /// Record the `<!ENTITY ...>` declarations found in the text of a DOCTYPE.
    /// Parameter entities are skipped. The first declaration of a name wins. Comments,
    /// processing instructions and quoted literals of other declarations are never
    /// searched for declarations.
    pub(crate) fn declare(&mut self, doctype: &str, budget: &mut BudgetEnforcer) -> Result<(), Error> {
        let mut rest = doctype;
        while let Some(pos) = rest.find('<') {
            rest = &rest[pos..];
            if let Some(comment) = rest.strip_prefix("<!--") {
                let close = comment
                    .find("-->")
                    .ok_or_else(|| Error::syntax("unterminated comment in DOCTYPE"))?;
                rest = &comment[close + 3..];
            } else if let Some(pi) = rest.strip_prefix("<?") {
                let close = pi
                    .find("?>")
                    .ok_or_else(|| Error::syntax("unterminated processing instruction in DOCTYPE"))?;
                rest = &pi[close + 2..];
            } else if let Some(declaration) = rest.strip_prefix("<!ENTITY") {
                rest = self.declare_entity(declaration, budget)?;
            } else {
                rest = skip_declaration(&rest[1..])?;
            }
        }
        Ok(())
    }

    /// Parse one entity declaration after `<!ENTITY`, returning the text after its `>`.
    fn declare_entity<'d>(&mut self, declaration: &'d str, budget: &mut BudgetEnforcer) -> Result<&'d str, Error> {
        let mut rest = declaration.trim_start();
        let parameter = rest.starts_with('%');
        if parameter {
            rest = rest[1..].trim_start();
        }
        let name_end = rest
            .find(|c: char| c.is_whitespace())
            .ok_or_else(|| Error::syntax("malformed entity declaration"))?;
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let entity = if rest.starts_with("SYSTEM") || rest.starts_with("PUBLIC") {
            Entity::External
        } else {
            let (value, after) = quoted(rest)
                .ok_or_else(|| Error::syntax(format!("malformed declaration of entity {name}")))?;
            rest = after;
            Entity::Internal(value.to_owned())
        };
        if !parameter {
            budget.declare_entity();
            self.entities.entry(name.to_owned()).or_insert(entity);
        }
        skip_declaration(rest)
    }

    /// Expand entity and character references in `text` once. Replacement text of
    /// declared entities is expanded recursively; every declared reference is charged to
    /// `budget`.
    pub(crate) fn expand<'t>(
        &self,
        text: &'t str,
        budget: &mut BudgetEnforcer,
    ) -> Result<Cow<'t, str>, Error> {
        if !text.contains('&') {
            return Ok(Cow::Borrowed(text));
        }
        let mut out = String::with_capacity(text.len());
        let mut stack = Vec::new();
        self.expand_into(text, &mut out, &mut stack, budget)?;
        Ok(Cow::Owned(out))
    }

    fn expand_into<'s>(
        &'s self,
        text: &str,
        out: &mut String,
        stack: &mut Vec<&'s str>,
        budget: &mut BudgetEnforcer,
    ) -> Result<(), Error> {
        let mut rest = text;
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let after = &rest[amp + 1..];
            let semi = after
                .find(';')
                .ok_or_else(|| Error::syntax("unterminated entity reference"))?;
            let name = &after[..semi];
            let reference = &rest[amp..amp + semi + 2];
            rest = &after[semi + 1..];

            if name.starts_with('#') {
                let resolved = unescape(reference)
                    .map_err(|e| Error::syntax(format!("invalid character reference &{name};: {e}")))?;
                out.push_str(&resolved);
            } else if let Some(predefined) = resolve_predefined_entity(name) {
                out.push_str(predefined);
            } else {
                match self.entities.get_key_value(name) {
                    Some((key, Entity::Internal(value))) => {
                        if stack.contains(&key.as_str()) {
                            return Err(Error::syntax(format!("recursive entity reference &{name};")));
                        }
                        budget
                            .expand_reference(value.len(), stack.len() + 1)
                            .map_err(Error::budget)?;
                        stack.push(key);
                        self.expand_into(value, out, stack, budget)?;
                        stack.pop();
                    }
                    Some((_, Entity::External)) => {
                        return Err(Error::syntax(format!(
                            "external entity &{name}; is not resolved"
                        )));
                    }
                    None => {
                        return Err(Error::syntax(format!("undeclared entity &{name};")));
                    }
                }
            }
        }
        out.push_str(rest);
        Ok(())
    }
}

/// Split a leading `"..."` or `'...'` literal off `text`: (contents, remainder).
fn quoted(text: &str) -> Option<(&str, &str)> {
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &text[1..];
    let close = body.find(quote)?;
    Some((&body[..close], &body[close + 1..]))
}

/// Skip to just past the `>` closing the current declaration, stepping over quoted literals.
fn skip_declaration(text: &str) -> Result<&str, Error> {
    let mut rest = text;
    loop {
        let at = rest
            .find(['>', '"', '\''])
            .ok_or_else(|| Error::syntax("unterminated declaration in DOCTYPE"))?;
        if rest.as_bytes()[at] == b'>' {
            return Ok(&rest[at + 1..]);
        }
        let (_, after) = quoted(&rest[at..])
            .ok_or_else(|| Error::syntax("unterminated literal in DOCTYPE"))?;
        rest = after;
    }
}
