//! FILENAME: core/resultset-pivot/src/cache.rs
//! Row values and x-axis grouping.
//!
//! Architecture:
//! - Every scalar is a `CacheValue`, hashable so it can be part of a key
//! - Rows keep their field order and read a missing field as `Empty`
//! - Groups are keyed structurally (tuples of values), never by joined strings
//! - Group order is first appearance in the input, enforced by `IndexMap`

use std::fmt;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::axis::ResolvedAxes;
use crate::definition::{FieldRef, QueryShape};

// ============================================================================
// SCALAR VALUES
// ============================================================================

/// A normalized, hashable scalar from a result row.
/// `Empty` covers both a stored null and a field the row does not have.
///
/// JSON integers stay integers: `Integer` holds everything that fits an
/// `i64`, `Unsigned` the rest of the `u64` range. Only values written with a
/// fraction or exponent become `Number`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum CacheValue {
    #[default]
    Empty,
    Boolean(bool),
    Integer(i64),
    Unsigned(u64),
    Number(OrderedFloat<f64>),
    Text(String),
}

impl CacheValue {
    pub fn text(s: impl Into<String>) -> Self {
        CacheValue::Text(s.into())
    }

    pub fn number(n: f64) -> Self {
        CacheValue::Number(OrderedFloat(n))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CacheValue::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CacheValue::Integer(i) => Some(*i as f64),
            CacheValue::Unsigned(u) => Some(*u as f64),
            CacheValue::Number(n) => Some(n.into_inner()),
            _ => None,
        }
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::Text(value.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::Text(value)
    }
}

impl From<f64> for CacheValue {
    fn from(value: f64) -> Self {
        CacheValue::number(value)
    }
}

impl From<i64> for CacheValue {
    fn from(value: i64) -> Self {
        CacheValue::Integer(value)
    }
}

impl From<u64> for CacheValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(CacheValue::Unsigned(value), CacheValue::Integer)
    }
}

impl From<bool> for CacheValue {
    fn from(value: bool) -> Self {
        CacheValue::Boolean(value)
    }
}

impl From<Value> for CacheValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CacheValue::Empty,
            Value::Bool(b) => CacheValue::Boolean(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CacheValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    CacheValue::Unsigned(u)
                } else {
                    n.as_f64().map_or(CacheValue::Empty, CacheValue::number)
                }
            }
            Value::String(s) => CacheValue::Text(s),
            // Nested values are not pivotable; keep their JSON text as the label.
            other @ (Value::Array(_) | Value::Object(_)) => CacheValue::Text(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for CacheValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(CacheValue::from)
    }
}

/// The display string used for keys and header labels.
impl fmt::Display for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheValue::Empty => Ok(()),
            CacheValue::Boolean(b) => write!(f, "{}", b),
            CacheValue::Integer(i) => write!(f, "{}", i),
            CacheValue::Unsigned(u) => write!(f, "{}", u),
            CacheValue::Number(n) => {
                let v = n.into_inner();
                if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(f, "{}", v as i64)
                } else {
                    write!(f, "{}", v)
                }
            }
            CacheValue::Text(s) => f.write_str(s),
        }
    }
}

static EMPTY: CacheValue = CacheValue::Empty;

// ============================================================================
// RAW ROWS
// ============================================================================

/// One result record: field id to value, in the order the fields arrived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    values: IndexMap<String, CacheValue>,
}

impl RawRow {
    pub fn new() -> Self {
        RawRow::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<CacheValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<CacheValue>) {
        self.values.insert(field.into(), value.into());
    }

    /// The value of `field`; a field the row does not carry reads as `Empty`.
    pub fn get(&self, field: &str) -> &CacheValue {
        self.values.get(field).unwrap_or(&EMPTY)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The structural key of this row over `fields`, in field order.
    pub fn key_for(&self, fields: &[&str]) -> GroupKey {
        fields.iter().map(|f| self.get(f).clone()).collect()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<CacheValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawRow {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// ============================================================================
// AXIS COORDINATES
// ============================================================================

/// Values of several dimension fields of one row, in field order.
pub type GroupKey = SmallVec<[CacheValue; 4]>;

/// One coordinate on an axis: an observed value, or a measure (by its
/// index in the query's measure list) where the measures marker sits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum AxisValue {
    Value(CacheValue),
    Measure(usize),
}

/// Coordinates for every field of one axis, in axis order.
pub type AxisPath = SmallVec<[AxisValue; 4]>;

/// Builds the axis path for `fields` from the dimension values in `key`
/// (same order as the dimension fields), placing `measure` at the marker.
pub fn axis_path(fields: &[FieldRef], key: &[CacheValue], measure: Option<usize>) -> AxisPath {
    let mut values = key.iter();
    fields
        .iter()
        .filter_map(|field| match field {
            FieldRef::Dimension(_) => values.next().cloned().map(AxisValue::Value),
            FieldRef::MeasuresMarker => measure.map(AxisValue::Measure),
        })
        .collect()
}

// ============================================================================
// ROW GROUPING
// ============================================================================

/// The source rows sharing one x-axis key.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup<'a> {
    /// The measure this group reads, when measures sit on the x axis.
    pub measure: Option<usize>,
    pub rows: Vec<&'a RawRow>,
}

/// Groups `rows` by their x-axis key, in order of first appearance.
///
/// With the measures marker on x, every group is repeated once per measure
/// (query order), with the measure placed in the key at the marker position.
pub fn group_rows<'a>(
    rows: &'a [RawRow],
    axes: &ResolvedAxes,
    shape: &QueryShape,
) -> IndexMap<AxisPath, RowGroup<'a>> {
    let x_dimensions: Vec<&str> = axes.x_dimensions().collect();

    let mut by_key: IndexMap<GroupKey, Vec<&'a RawRow>> = IndexMap::new();
    for row in rows {
        by_key.entry(row.key_for(&x_dimensions)).or_default().push(row);
    }

    let mut groups = IndexMap::with_capacity(by_key.len());
    if axes.measures_on_x() {
        for (key, members) in by_key {
            for measure in 0..shape.measures.len() {
                groups.insert(
                    axis_path(&axes.x, &key, Some(measure)),
                    RowGroup {
                        measure: Some(measure),
                        rows: members.clone(),
                    },
                );
            }
        }
    } else {
        for (key, members) in by_key {
            groups.insert(
                axis_path(&axes.x, &key, None),
                RowGroup {
                    measure: None,
                    rows: members,
                },
            );
        }
    }

    crate::log_debug!("PIVOT", "grouped {} rows into {} x-groups", rows.len(), groups.len());
    groups
}
