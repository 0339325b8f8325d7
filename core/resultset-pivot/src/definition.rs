//! FILENAME: core/resultset-pivot/src/definition.rs
//! Pivot Definition - The serializable inputs.
//!
//! This module contains all the types needed to DESCRIBE a pivot request:
//! - `QueryShape`: which measures and dimensions the query returned
//! - `PivotConfig`: which fields go on which axis
//! - `Annotation`: display metadata for every field
//!
//! All of them deserialize from the JSON a query service hands out and are
//! treated as immutable snapshots by the engine.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved axis entry standing for the whole set of measures.
pub const MEASURES_MARKER: &str = "measures";

// ============================================================================
// QUERY SHAPE
// ============================================================================

/// A time dimension of the query. Only members with a granularity produce
/// a column in the result rows (`"<dimension>.<granularity>"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeDimension {
    pub dimension: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<String>,

    /// Date range and any other query-side settings, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TimeDimension {
    pub fn new(dimension: impl Into<String>, granularity: Option<&str>) -> Self {
        TimeDimension {
            dimension: dimension.into(),
            granularity: granularity.map(str::to_string),
            extra: Map::new(),
        }
    }

    /// The row field id of this time dimension, if it has a granularity.
    pub fn member(&self) -> Option<String> {
        self.granularity
            .as_ref()
            .map(|g| format!("{}.{}", self.dimension, g))
    }
}

/// The measures and dimensions a query produced, in query order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryShape {
    #[serde(default)]
    pub measures: Vec<String>,

    #[serde(default)]
    pub dimensions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_dimensions: Vec<TimeDimension>,

    /// Filters, limits and other query options. Not interpreted here.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueryShape {
    pub fn new<M, D>(measures: M, dimensions: D) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        QueryShape {
            measures: measures.into_iter().map(Into::into).collect(),
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            time_dimensions: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_time_dimension(mut self, dimension: impl Into<String>, granularity: Option<&str>) -> Self {
        self.time_dimensions.push(TimeDimension::new(dimension, granularity));
        self
    }

    /// All dimension ids usable on an axis: time dimension members first,
    /// then plain dimensions.
    pub fn dimension_ids(&self) -> Vec<String> {
        self.time_dimensions
            .iter()
            .filter_map(TimeDimension::member)
            .chain(self.dimensions.iter().cloned())
            .collect()
    }

    pub fn measure_index(&self, id: &str) -> Option<usize> {
        self.measures.iter().position(|m| m == id)
    }
}

// ============================================================================
// FIELD REFERENCES & PIVOT CONFIG
// ============================================================================

/// An entry of a pivot axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldRef {
    /// A dimension (or time dimension member) by id.
    Dimension(String),
    /// The whole set of measures, treated as one more dimension.
    MeasuresMarker,
}

impl FieldRef {
    pub fn dimension(id: impl Into<String>) -> Self {
        FieldRef::Dimension(id.into())
    }

    pub fn is_measures(&self) -> bool {
        matches!(self, FieldRef::MeasuresMarker)
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldRef::Dimension(id) => id,
            FieldRef::MeasuresMarker => MEASURES_MARKER,
        }
    }
}

impl From<String> for FieldRef {
    fn from(value: String) -> Self {
        if value == MEASURES_MARKER {
            FieldRef::MeasuresMarker
        } else {
            FieldRef::Dimension(value)
        }
    }
}

impl From<&str> for FieldRef {
    fn from(value: &str) -> Self {
        FieldRef::from(value.to_string())
    }
}

impl From<FieldRef> for String {
    fn from(value: FieldRef) -> Self {
        match value {
            FieldRef::Dimension(id) => id,
            FieldRef::MeasuresMarker => MEASURES_MARKER.to_string(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which fields go on which axis.
///
/// A missing axis is filled in by the resolver. Keys other than `x` and `y`
/// are presentation hints (e.g. `fillMissingDates`); they are carried along
/// untouched and never change the pivot result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Vec<FieldRef>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<FieldRef>>,

    #[serde(flatten)]
    pub hints: Map<String, Value>,
}

impl PivotConfig {
    /// Creates a config with both axes given.
    pub fn new<X, Y>(x: X, y: Y) -> Self
    where
        X: IntoIterator,
        X::Item: Into<FieldRef>,
        Y: IntoIterator,
        Y::Item: Into<FieldRef>,
    {
        PivotConfig {
            x: Some(x.into_iter().map(Into::into).collect()),
            y: Some(y.into_iter().map(Into::into).collect()),
            hints: Map::new(),
        }
    }

    pub fn with_x<X>(mut self, x: X) -> Self
    where
        X: IntoIterator,
        X::Item: Into<FieldRef>,
    {
        self.x = Some(x.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_y<Y>(mut self, y: Y) -> Self
    where
        Y: IntoIterator,
        Y::Item: Into<FieldRef>,
    {
        self.y = Some(y.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_hint(mut self, key: impl Into<String>, value: Value) -> Self {
        self.hints.insert(key.into(), value);
        self
    }
}

// ============================================================================
// ANNOTATION
// ============================================================================

/// Display metadata for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAnnotation {
    pub title: String,

    #[serde(default)]
    pub short_title: String,

    /// Semantic type: "number", "string", "time", "boolean", ...
    #[serde(rename = "type", default)]
    pub semantic_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl FieldAnnotation {
    pub fn new(title: impl Into<String>, short_title: impl Into<String>, semantic_type: impl Into<String>) -> Self {
        FieldAnnotation {
            title: title.into(),
            short_title: short_title.into(),
            semantic_type: semantic_type.into(),
            format: None,
            meta: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Stand-in for a field the annotation does not describe.
    fn fallback(id: &str, semantic_type: &str) -> Self {
        FieldAnnotation::new(id, id, semantic_type)
    }
}

/// Per-field display metadata, grouped the way query services return it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(default)]
    pub measures: IndexMap<String, FieldAnnotation>,

    #[serde(default)]
    pub dimensions: IndexMap<String, FieldAnnotation>,

    #[serde(default)]
    pub segments: IndexMap<String, FieldAnnotation>,

    #[serde(default)]
    pub time_dimensions: IndexMap<String, FieldAnnotation>,
}

impl Annotation {
    pub fn with_measure(mut self, id: impl Into<String>, annotation: FieldAnnotation) -> Self {
        self.measures.insert(id.into(), annotation);
        self
    }

    pub fn with_dimension(mut self, id: impl Into<String>, annotation: FieldAnnotation) -> Self {
        self.dimensions.insert(id.into(), annotation);
        self
    }

    pub fn with_time_dimension(mut self, id: impl Into<String>, annotation: FieldAnnotation) -> Self {
        self.time_dimensions.insert(id.into(), annotation);
        self
    }

    /// Looks a field up in measures, dimensions, time dimensions, then segments.
    pub fn field(&self, id: &str) -> Option<&FieldAnnotation> {
        self.measures
            .get(id)
            .or_else(|| self.dimensions.get(id))
            .or_else(|| self.time_dimensions.get(id))
            .or_else(|| self.segments.get(id))
    }

    /// Annotation of a measure, or a numeric stand-in titled by its id.
    pub fn measure(&self, id: &str) -> Cow<'_, FieldAnnotation> {
        self.lookup_or_fallback(id, "number")
    }

    /// Annotation of a dimension, or a string stand-in titled by its id.
    pub fn dimension(&self, id: &str) -> Cow<'_, FieldAnnotation> {
        self.lookup_or_fallback(id, "string")
    }

    fn lookup_or_fallback(&self, id: &str, semantic_type: &str) -> Cow<'_, FieldAnnotation> {
        match self.field(id) {
            Some(annotation) => Cow::Borrowed(annotation),
            None => {
                crate::log_warn!("PIVOT", "no annotation for field '{}', using its id as title", id);
                Cow::Owned(FieldAnnotation::fallback(id, semantic_type))
            }
        }
    }
}
