//! Public macros for constructing option structs without relying on struct literal syntax.
//!
//! These macros keep call sites working when fields are added to the option structs.

/// Construct [`crate::Options`] from `Default` and a list of field assignments.
///
/// Example:
///
/// ```rust
/// let options = xml_mini::options! {
///     trusted: true,
///     disallowed_types: vec!["file".into()],
/// };
/// assert!(options.trusted);
/// ```
#[macro_export]
macro_rules! options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::Options::default();
        $(
            #[allow(deprecated)]
            {
                opt.$field = $value;
            }
        )*
        opt
    }};
}

/// Construct [`crate::budget::Budget`] from `Default` and a list of field assignments.
///
/// ```rust
/// let budget = xml_mini::budget! {
///     max_entity_expansions: 100,
///     max_depth: 16,
/// };
/// assert_eq!(budget.max_nodes, xml_mini::Budget::default().max_nodes);
/// ```
#[macro_export]
macro_rules! budget {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut budget = $crate::budget::Budget::default();
        $(
            #[allow(deprecated)]
            {
                budget.$field = $value;
            }
        )*
        budget
    }};
}

/// Construct [`crate::EncodeOptions`] from `Default` and a list of field assignments.
///
/// Example:
///
/// ```rust
/// let opts = xml_mini::encode_options! {
///     indent: 4,
///     skip_types: true,
/// };
/// assert_eq!(opts.indent, 4);
/// ```
#[macro_export]
macro_rules! encode_options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::EncodeOptions::default();
        $(
            #[allow(deprecated)]
            {
                opt.$field = $value;
            }
        )*
        opt
    }};
}

/// Short alias for [`encode_options!`].
#[macro_export]
macro_rules! ser_options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        $crate::encode_options! { $( $field : $value ),* }
    }};
}

/// Build a [`crate::Mapping`] from `key => value` pairs, in order.
///
/// ```rust
/// use xml_mini::{Value, mapping};
///
/// let m = mapping! { "id" => 1, "name" => "David" };
/// assert_eq!(m.len(), 2);
/// assert_eq!(m["name"], Value::from("David"));
/// ```
#[macro_export]
macro_rules! mapping {
    ( $( $key:expr => $value:expr ),* $(,)? ) => {{
        #[allow(unused_mut)]
        let mut map = $crate::Mapping::new();
        $(
            map.insert($key, $value);
        )*
        map
    }};
}
