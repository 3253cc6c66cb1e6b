//! Type-attribute policy applied to every decoded element.

use crate::error::Error;
use crate::options::Options;
use crate::tags::UNSAFE_TAGS;

/// Reject `type_name` on element `node` if the policy in `options` forbids it.
///
/// In order: an explicit allow-list must contain the type; the caller's deny-list must not;
/// `symbol` and `yaml` need trusted mode. Anything else, including unknown types, passes.
pub(crate) fn check_type(type_name: &str, node: &str, options: &Options) -> Result<(), Error> {
    let allowed = options
        .allowed_types
        .as_ref()
        .is_none_or(|allowed| allowed.iter().any(|t| t == type_name));
    let denied = options.disallowed_types.iter().any(|t| t == type_name)
        || (!options.trusted && UNSAFE_TAGS.contains(&type_name));
    if allowed && !denied {
        Ok(())
    } else {
        Err(Error::DisallowedType {
            type_name: type_name.to_owned(),
            node: node.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsafe_types_need_trust() {
        let untrusted = Options::default();
        assert!(check_type("symbol", "name", &untrusted).is_err());
        assert!(check_type("yaml", "name", &untrusted).is_err());
        assert!(check_type("integer", "id", &untrusted).is_ok());
        assert!(check_type("ProductImage", "image", &untrusted).is_ok());

        let trusted = Options::trusted();
        assert!(check_type("symbol", "name", &trusted).is_ok());
        assert!(check_type("yaml", "name", &trusted).is_ok());
    }

    #[test]
    fn allow_list_is_exclusive() {
        let options = Options {
            allowed_types: Some(vec!["integer".into(), "array".into()]),
            ..Options::default()
        };
        assert!(check_type("integer", "id", &options).is_ok());
        assert!(check_type("array", "ids", &options).is_ok());
        let err = check_type("boolean", "approved", &options).unwrap_err();
        assert_eq!(err.to_string(), "disallowed type attribute \"boolean\" on <approved>");
    }

    #[test]
    fn allow_list_does_not_override_trust() {
        let options = Options {
            allowed_types: Some(vec!["yaml".into()]),
            ..Options::default()
        };
        assert!(check_type("yaml", "config", &options).is_err());
    }

    #[test]
    fn deny_list_applies_even_when_trusted() {
        let options = Options {
            disallowed_types: vec!["file".into()],
            ..Options::trusted()
        };
        assert!(check_type("file", "upload", &options).is_err());
        assert!(check_type("symbol", "name", &options).is_ok());
    }
}
