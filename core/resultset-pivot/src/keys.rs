//! FILENAME: core/resultset-pivot/src/keys.rs
//! Composite keys shared by pivoted rows and header leaves.
//!
//! A key joins the string form of each axis coordinate with `.`; a measure
//! coordinate contributes its id. Separators inside values are not escaped,
//! so `"a.b"` and the two levels `"a"`, `"b"` produce the same key.

use std::borrow::Cow;

use crate::cache::AxisValue;
use crate::definition::{QueryShape, MEASURES_MARKER};

pub const KEY_SEPARATOR: &str = ".";

/// Row field holding the measure id when measures sit on the x axis.
pub const MEASURES_KEY: &str = MEASURES_MARKER;

/// Key of the single value column when the y axis has no fields.
pub const VALUE_KEY: &str = "value";

/// The string form of one coordinate.
pub fn axis_segment<'a>(value: &'a AxisValue, shape: &'a QueryShape) -> Cow<'a, str> {
    match value {
        AxisValue::Value(v) => Cow::Owned(v.to_string()),
        AxisValue::Measure(index) => Cow::Borrowed(measure_id(shape, *index)),
    }
}

pub fn measure_id(shape: &QueryShape, index: usize) -> &str {
    shape.measures.get(index).map_or("", String::as_str)
}

pub fn composite_key(path: &[AxisValue], shape: &QueryShape) -> String {
    path.iter()
        .map(|v| axis_segment(v, shape))
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

/// The row key of a header leaf at `path`.
pub fn leaf_key(path: &[AxisValue], shape: &QueryShape) -> String {
    if path.is_empty() {
        VALUE_KEY.to_string()
    } else {
        composite_key(path, shape)
    }
}

/// Upper-cases the first character, leaving the rest as is.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheValue;

    #[test]
    fn test_composite_key_joins_values_and_measure_ids() {
        let shape = QueryShape::new(["Orders.count"], ["Users.country"]);
        let path = [
            AxisValue::Value(CacheValue::text("Germany")),
            AxisValue::Value(CacheValue::number(2.0)),
            AxisValue::Measure(0),
        ];
        assert_eq!(composite_key(&path, &shape), "Germany.2.Orders.count");
        assert_eq!(composite_key(&[], &shape), "");
        assert_eq!(leaf_key(&path, &shape), "Germany.2.Orders.count");
        assert_eq!(leaf_key(&[], &shape), VALUE_KEY);
    }

    #[test]
    fn test_separator_in_value_is_not_escaped() {
        let shape = QueryShape::new(["m"], ["d1", "d2"]);
        let joined = [AxisValue::Value(CacheValue::text("a.b"))];
        let split = [
            AxisValue::Value(CacheValue::text("a")),
            AxisValue::Value(CacheValue::text("b")),
        ];
        assert_eq!(composite_key(&joined, &shape), composite_key(&split, &shape));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("male"), "Male");
        assert_eq!(capitalize("US"), "US");
        assert_eq!(capitalize("élan vital"), "Élan vital");
        assert_eq!(capitalize(""), "");
    }
}
