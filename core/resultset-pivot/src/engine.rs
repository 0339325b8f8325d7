//! FILENAME: core/resultset-pivot/src/engine.rs
//! Pivot Engine - The calculation core that turns result rows into a view.
//!
//! This module takes a QueryShape, the raw result rows and a PivotConfig
//! and produces pivoted rows plus the matching column header tree.
//!
//! Algorithm:
//! 1. Resolve the config into complete x/y axes (fails before reading rows)
//! 2. Build the y-axis tree from every observed y coordinate, first-seen order
//! 3. Group rows by their x-axis key, first-seen order
//! 4. For each group, read one cell per y-axis leaf (absent when no row matches)
//! 5. Render cells under composite keys; build headers from the same tree

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;

use crate::axis::{resolve_axes, ResolvedAxes};
use crate::cache::{axis_path, group_rows, AxisPath, AxisValue, CacheValue, GroupKey, RawRow, RowGroup};
use crate::definition::{Annotation, FieldRef, PivotConfig, QueryShape};
use crate::error::ConfigError;
use crate::header::build_columns;
use crate::keys::{leaf_key, measure_id, MEASURES_KEY};
use crate::view::{ColumnDescriptor, PivotCell, PivotGroup, PivotOutput, PivotedRow};
use crate::{log_debug, log_enter, log_exit};

// ============================================================================
// AXIS TREE STRUCTURES
// ============================================================================

/// A node in the y-axis tree.
/// Each node is one coordinate at one axis level, below its ancestors.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisNode {
    /// The coordinate at this level.
    pub value: AxisValue,

    /// Coordinates from the root down to and including this node.
    pub path: AxisPath,

    /// Next level, in order of first appearance under this node.
    pub children: Vec<AxisNode>,
}

impl AxisNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Insertion-ordered trie used while collecting paths.
#[derive(Default)]
struct TreeLevel {
    children: IndexMap<AxisValue, TreeLevel>,
}

impl TreeLevel {
    fn insert(&mut self, path: &[AxisValue]) {
        if let Some((head, rest)) = path.split_first() {
            self.children.entry(head.clone()).or_default().insert(rest);
        }
    }

    fn into_nodes(self, prefix: &AxisPath) -> Vec<AxisNode> {
        self.children
            .into_iter()
            .map(|(value, level)| {
                let mut path = prefix.clone();
                path.push(value.clone());
                let children = level.into_nodes(&path);
                AxisNode {
                    value,
                    path,
                    children,
                }
            })
            .collect()
    }
}

/// The y axis of one pivot: its header tree and its leaves in
/// depth-first order. The leaves are the value columns of every row.
#[derive(Debug, Clone, PartialEq)]
pub struct YAxis {
    pub tree: Vec<AxisNode>,
    pub leaves: Vec<AxisPath>,
}

impl YAxis {
    /// Collects every y coordinate observed in `rows`.
    fn build(rows: &[RawRow], axes: &ResolvedAxes, shape: &QueryShape) -> Self {
        let y_dimensions: Vec<&str> = axes.y_dimensions().collect();
        let measures_on_y = axes.y.iter().any(FieldRef::is_measures);

        let mut paths: IndexSet<AxisPath> = IndexSet::new();
        for row in rows {
            let key = row.key_for(&y_dimensions);
            if measures_on_y {
                for measure in 0..shape.measures.len() {
                    paths.insert(axis_path(&axes.y, &key, Some(measure)));
                }
            } else {
                paths.insert(axis_path(&axes.y, &key, None));
            }
        }

        let mut root = TreeLevel::default();
        for path in &paths {
            root.insert(path);
        }
        let tree = root.into_nodes(&AxisPath::new());

        // An empty y axis has no tree, only the single value column.
        let leaves = if axes.y.is_empty() {
            paths.into_iter().collect()
        } else {
            let mut leaves = Vec::new();
            collect_leaves(&tree, &mut leaves);
            leaves
        };

        YAxis { tree, leaves }
    }
}

fn collect_leaves(nodes: &[AxisNode], out: &mut Vec<AxisPath>) {
    for node in nodes {
        if node.is_leaf() {
            out.push(node.path.clone());
        } else {
            collect_leaves(&node.children, out);
        }
    }
}

// ============================================================================
// PIVOT CALCULATOR
// ============================================================================

/// The calculation engine for one pivot call over one set of rows.
/// Nothing is shared between calculators; inputs are only read.
pub struct PivotCalculator<'a> {
    shape: &'a QueryShape,
    rows: &'a [RawRow],
    axes: ResolvedAxes,
    y_axis: YAxis,
}

impl<'a> PivotCalculator<'a> {
    /// Resolves the axes and collects the y axis. Config errors surface here,
    /// before any grouping.
    pub fn new(shape: &'a QueryShape, rows: &'a [RawRow], config: &PivotConfig) -> Result<Self, ConfigError> {
        let axes = resolve_axes(config, shape)?;
        let y_axis = YAxis::build(rows, &axes, shape);
        log_debug!(
            "PIVOT",
            "y axis: {} top-level nodes, {} leaves",
            y_axis.tree.len(),
            y_axis.leaves.len()
        );
        Ok(PivotCalculator {
            shape,
            rows,
            axes,
            y_axis,
        })
    }

    pub fn axes(&self) -> &ResolvedAxes {
        &self.axes
    }

    pub fn y_axis(&self) -> &YAxis {
        &self.y_axis
    }

    /// The raw pivot: one group per x key, one cell per y leaf.
    pub fn groups(&self) -> Vec<PivotGroup> {
        let y_dimensions: Vec<&str> = self.axes.y_dimensions().collect();
        group_rows(self.rows, &self.axes, self.shape)
            .iter()
            .map(|(x_values, group)| self.assemble_group(x_values, group, &y_dimensions))
            .collect()
    }

    /// Pivoted table rows.
    pub fn rows(&self) -> Vec<PivotedRow> {
        self.groups()
            .iter()
            .map(|group| self.render_row(group))
            .collect()
    }

    /// Column header tree matching `rows()`.
    pub fn columns(&self, annotation: &Annotation) -> Vec<ColumnDescriptor> {
        build_columns(&self.axes, &self.y_axis, annotation, self.shape)
    }

    /// Reads one cell per y leaf from the rows of one x group.
    fn assemble_group(&self, x_values: &AxisPath, group: &RowGroup<'_>, y_dimensions: &[&str]) -> PivotGroup {
        // First row wins when several rows share the same y coordinates.
        let mut by_y: FxHashMap<GroupKey, &RawRow> = FxHashMap::default();
        for &row in &group.rows {
            by_y.entry(row.key_for(y_dimensions)).or_insert(row);
        }

        let y_values = self
            .y_axis
            .leaves
            .iter()
            .map(|path| (path.clone(), self.lookup(path, group.measure, &by_y)))
            .collect();

        PivotGroup {
            x_values: x_values.clone(),
            y_values,
        }
    }

    fn lookup(&self, path: &AxisPath, group_measure: Option<usize>, by_y: &FxHashMap<GroupKey, &RawRow>) -> PivotCell {
        let mut key = GroupKey::new();
        let mut measure = group_measure;
        for coordinate in path {
            match coordinate {
                AxisValue::Value(v) => key.push(v.clone()),
                AxisValue::Measure(index) => measure = Some(*index),
            }
        }

        let measure = measure.and_then(|index| self.shape.measures.get(index));
        match (by_y.get(&key), measure) {
            (Some(row), Some(measure)) => PivotCell::Value(row.get(measure).clone()),
            _ => PivotCell::Absent,
        }
    }

    /// Renders a group under string keys: x fields first, then y leaves.
    fn render_row(&self, group: &PivotGroup) -> PivotedRow {
        let mut row = PivotedRow::new();
        for (field, value) in self.axes.x.iter().zip(group.x_values.iter()) {
            match (field, value) {
                (FieldRef::Dimension(id), AxisValue::Value(v)) => {
                    row.push(id.clone(), PivotCell::Value(v.clone()));
                }
                (FieldRef::MeasuresMarker, AxisValue::Measure(index)) => {
                    let id = measure_id(self.shape, *index);
                    row.push(MEASURES_KEY.to_string(), PivotCell::Value(CacheValue::text(id)));
                }
                // x paths are built from these same fields, so kinds always line up.
                _ => {}
            }
        }
        for (path, cell) in &group.y_values {
            row.push(leaf_key(path, self.shape), cell.clone());
        }
        row
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Pivots `rows` and builds the matching header tree in one pass.
pub fn calculate_pivot(
    shape: &QueryShape,
    annotation: &Annotation,
    rows: &[RawRow],
    config: &PivotConfig,
) -> Result<PivotOutput, ConfigError> {
    log_enter!("PIVOT", "calculate_pivot", "rows={}", rows.len());
    let calculator = PivotCalculator::new(shape, rows, config)?;
    let output = PivotOutput {
        rows: calculator.rows(),
        columns: calculator.columns(annotation),
    };
    log_exit!(
        "PIVOT",
        "calculate_pivot",
        "pivoted_rows={} columns={}",
        output.rows.len(),
        output.columns.len()
    );
    Ok(output)
}

/// The raw pivot groups, before keys are rendered.
pub fn pivot(shape: &QueryShape, rows: &[RawRow], config: &PivotConfig) -> Result<Vec<PivotGroup>, ConfigError> {
    Ok(PivotCalculator::new(shape, rows, config)?.groups())
}

pub fn table_pivot(shape: &QueryShape, rows: &[RawRow], config: &PivotConfig) -> Result<Vec<PivotedRow>, ConfigError> {
    Ok(PivotCalculator::new(shape, rows, config)?.rows())
}

pub fn table_columns(
    shape: &QueryShape,
    annotation: &Annotation,
    rows: &[RawRow],
    config: &PivotConfig,
) -> Result<Vec<ColumnDescriptor>, ConfigError> {
    Ok(PivotCalculator::new(shape, rows, config)?.columns(annotation))
}
