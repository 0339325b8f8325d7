//! FILENAME: core/resultset-pivot/src/view.rs
//! Pivot View - Renderable output for the frontend.
//!
//! Two projections of the same pivot:
//! - `PivotedRow`: one grid row, keyed by composite column key
//! - `ColumnDescriptor`: the header tree whose leaves name those keys
//!
//! Both serialize to the camelCase JSON a table renderer consumes.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::cache::{AxisPath, CacheValue};

// ============================================================================
// CELLS & ROWS
// ============================================================================

/// The content of one pivoted cell.
///
/// `Absent` means no source row matched the cell's coordinates. It is not
/// the same as `Value(CacheValue::Empty)`, which is a null the query returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum PivotCell {
    #[default]
    Absent,
    Value(CacheValue),
}

impl PivotCell {
    pub fn is_absent(&self) -> bool {
        matches!(self, PivotCell::Absent)
    }

    pub fn value(&self) -> Option<&CacheValue> {
        match self {
            PivotCell::Absent => None,
            PivotCell::Value(v) => Some(v),
        }
    }
}

impl From<CacheValue> for PivotCell {
    fn from(value: CacheValue) -> Self {
        PivotCell::Value(value)
    }
}

impl Serialize for PivotCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PivotCell::Absent => serializer.serialize_none(),
            PivotCell::Value(v) => v.serialize(serializer),
        }
    }
}

/// One row of the pivoted table.
///
/// Every row produced by one pivot call carries the same keys in the same
/// order: the x-axis fields first, then one key per header leaf.
#[derive(Debug, Clone, Default)]
pub struct PivotedRow {
    cells: IndexMap<String, PivotCell>,
}

/// Rows are equal only when their cells match in the same column order.
impl PartialEq for PivotedRow {
    fn eq(&self, other: &Self) -> bool {
        self.cells.iter().eq(other.cells.iter())
    }
}

impl PivotedRow {
    pub fn new() -> Self {
        PivotedRow::default()
    }

    /// Adds a cell. When two coordinates render to the same key the first
    /// cell is kept.
    pub fn push(&mut self, key: String, cell: PivotCell) {
        self.cells.entry(key).or_insert(cell);
    }

    /// The cell at `key`, or `None` if the key is not a column of this row.
    pub fn get(&self, key: &str) -> Option<&PivotCell> {
        self.cells.get(key)
    }

    /// The stored value at `key`; `None` for absent cells and unknown keys.
    pub fn value(&self, key: &str) -> Option<&CacheValue> {
        self.get(key).and_then(PivotCell::value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.cells.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PivotCell)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Absent cells are left out, the way a renderer expects missing values.
impl Serialize for PivotedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present = self.cells.iter().filter(|(_, c)| !c.is_absent());
        let mut map = serializer.serialize_map(None)?;
        for (key, cell) in present {
            map.serialize_entry(key, cell)?;
        }
        map.end()
    }
}

/// The raw pivot of one x-axis group, before keys are rendered to strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotGroup {
    pub x_values: AxisPath,
    #[serde(rename = "yValuesArray")]
    pub y_values: Vec<(AxisPath, PivotCell)>,
}

// ============================================================================
// COLUMN DESCRIPTORS
// ============================================================================

/// A node of the column header tree.
/// Leaves carry `data_index` (a key of every `PivotedRow`); inner nodes
/// carry `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub key: String,
    pub title: String,
    pub short_title: String,

    #[serde(rename = "type")]
    pub semantic_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ColumnDescriptor>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_index: Option<String>,
}

impl ColumnDescriptor {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Data indexes of all leaves below (or at) this node, left to right.
    pub fn data_indexes(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_data_indexes(&mut out);
        out
    }

    fn collect_data_indexes<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.children {
            Some(children) => {
                for child in children {
                    child.collect_data_indexes(out);
                }
            }
            None => out.extend(self.data_index.as_deref()),
        }
    }

    /// Number of header rows this node spans (1 for a leaf).
    pub fn depth(&self) -> usize {
        match &self.children {
            Some(children) => 1 + children.iter().map(ColumnDescriptor::depth).max().unwrap_or(0),
            None => 1,
        }
    }
}

/// Both projections of one pivot call, built from the same resolved axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotOutput {
    pub rows: Vec<PivotedRow>,
    pub columns: Vec<ColumnDescriptor>,
}

impl PivotOutput {
    /// Data indexes of every header leaf, left to right.
    pub fn leaf_keys(&self) -> Vec<&str> {
        self.columns.iter().flat_map(ColumnDescriptor::data_indexes).collect()
    }
}
