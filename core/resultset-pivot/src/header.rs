//! FILENAME: core/resultset-pivot/src/header.rs
//! Column header tree.
//!
//! Built from the same resolved axes and y-axis tree as the pivoted rows, so
//! every leaf `data_index` is a key of every row.
//!
//! - Nested mode (measures on y): one header level per y field.
//! - Flat mode (measures on x): one column per y value combination.

use std::borrow::Cow;

use crate::axis::ResolvedAxes;
use crate::cache::AxisValue;
use crate::definition::{Annotation, FieldAnnotation, FieldRef, QueryShape};
use crate::engine::{AxisNode, YAxis};
use crate::keys::{capitalize, leaf_key, measure_id, MEASURES_KEY};
use crate::view::ColumnDescriptor;

/// Builds the header for one pivot: x-axis field columns first, then the
/// y-axis columns.
pub fn build_columns(
    axes: &ResolvedAxes,
    y_axis: &YAxis,
    annotation: &Annotation,
    shape: &QueryShape,
) -> Vec<ColumnDescriptor> {
    let mut columns: Vec<ColumnDescriptor> = axes
        .x
        .iter()
        .map(|field| match field {
            FieldRef::Dimension(id) => field_column(id, &annotation.dimension(id)),
            FieldRef::MeasuresMarker => measures_column(),
        })
        .collect();

    let labels = HeaderLabels::new(axes, annotation, shape);
    if axes.measures_on_x() {
        columns.extend(y_axis.leaves.iter().map(|path| labels.flat_column(path)));
    } else {
        columns.extend(y_axis.tree.iter().map(|node| labels.nested_column(node)));
    }
    columns
}

fn descriptor(key: String, annotation: &FieldAnnotation) -> ColumnDescriptor {
    ColumnDescriptor {
        key,
        title: annotation.title.clone(),
        short_title: annotation.short_title.clone(),
        semantic_type: annotation.semantic_type.clone(),
        format: annotation.format.clone(),
        meta: annotation.meta.clone(),
        children: None,
        data_index: None,
    }
}

/// Leaf column showing a field's own value.
fn field_column(id: &str, annotation: &FieldAnnotation) -> ColumnDescriptor {
    ColumnDescriptor {
        data_index: Some(id.to_string()),
        ..descriptor(id.to_string(), annotation)
    }
}

/// Leaf column naming the measure of each row in flat mode.
fn measures_column() -> ColumnDescriptor {
    ColumnDescriptor {
        key: MEASURES_KEY.to_string(),
        title: "Measures".to_string(),
        short_title: "Measures".to_string(),
        semantic_type: "string".to_string(),
        format: None,
        meta: None,
        children: None,
        data_index: Some(MEASURES_KEY.to_string()),
    }
}

/// Annotations of the y fields and the measures, looked up once per call.
struct HeaderLabels<'a> {
    shape: &'a QueryShape,
    /// One entry per y field; `None` at the measures marker.
    levels: Vec<Option<Cow<'a, FieldAnnotation>>>,
    measures: Vec<Cow<'a, FieldAnnotation>>,
}

impl<'a> HeaderLabels<'a> {
    fn new(axes: &ResolvedAxes, annotation: &'a Annotation, shape: &'a QueryShape) -> Self {
        let levels = axes
            .y
            .iter()
            .map(|field| match field {
                FieldRef::Dimension(id) => Some(annotation.dimension(id)),
                FieldRef::MeasuresMarker => None,
            })
            .collect();
        let measures = shape.measures.iter().map(|m| annotation.measure(m)).collect();
        HeaderLabels {
            shape,
            levels,
            measures,
        }
    }

    fn level(&self, depth: usize) -> Option<&FieldAnnotation> {
        self.levels.get(depth).and_then(|level| level.as_deref())
    }

    /// Title pair for a value at `depth`: "<dimension title> <Value>", "<Value>".
    fn value_titles(&self, value: &impl ToString, depth: usize) -> (String, String) {
        let label = capitalize(&value.to_string());
        let title = match self.level(depth) {
            Some(level) => format!("{} {}", level.title, label),
            None => label.clone(),
        };
        (title, label)
    }

    fn nested_column(&self, node: &AxisNode) -> ColumnDescriptor {
        let depth = node.path.len() - 1;
        let mut column = match &node.value {
            AxisValue::Measure(index) => {
                let id = measure_id(self.shape, *index).to_string();
                match self.measures.get(*index) {
                    Some(annotation) => descriptor(id, annotation),
                    None => descriptor(id.clone(), &FieldAnnotation::new(id.as_str(), id.as_str(), "number")),
                }
            }
            AxisValue::Value(value) => {
                let (title, short_title) = self.value_titles(value, depth);
                let (semantic_type, format, meta) = match self.level(depth) {
                    Some(level) => (level.semantic_type.clone(), level.format.clone(), level.meta.clone()),
                    None => ("string".to_string(), None, None),
                };
                ColumnDescriptor {
                    key: value.to_string(),
                    title,
                    short_title,
                    semantic_type,
                    format,
                    meta,
                    children: None,
                    data_index: None,
                }
            }
        };

        if node.is_leaf() {
            column.data_index = Some(leaf_key(&node.path, self.shape));
        } else {
            column.children = Some(node.children.iter().map(|child| self.nested_column(child)).collect());
        }
        column
    }

    fn flat_column(&self, path: &[AxisValue]) -> ColumnDescriptor {
        let mut titles = Vec::with_capacity(path.len());
        let mut short_titles = Vec::with_capacity(path.len());
        for (depth, coordinate) in path.iter().enumerate() {
            if let AxisValue::Value(value) = coordinate {
                let (title, short_title) = self.value_titles(value, depth);
                titles.push(title);
                short_titles.push(short_title);
            }
        }

        let key = leaf_key(path, self.shape);
        let (semantic_type, format) = self.shared_measure_type();
        ColumnDescriptor {
            key: key.clone(),
            title: if titles.is_empty() { "Value".to_string() } else { titles.join(", ") },
            short_title: if short_titles.is_empty() { "Value".to_string() } else { short_titles.join(", ") },
            semantic_type,
            format,
            meta: None,
            children: None,
            data_index: Some(key),
        }
    }

    /// A flat column holds every measure in turn: use their common type and
    /// format when they agree.
    fn shared_measure_type(&self) -> (String, Option<String>) {
        let mut measures = self.measures.iter();
        let Some(first) = measures.next() else {
            return ("number".to_string(), None);
        };
        let rest: Vec<&Cow<'_, FieldAnnotation>> = measures.collect();
        let semantic_type = if rest.iter().all(|m| m.semantic_type == first.semantic_type) {
            first.semantic_type.clone()
        } else {
            "number".to_string()
        };
        let format = if rest.iter().all(|m| m.format == first.format) {
            first.format.clone()
        } else {
            None
        };
        (semantic_type, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PivotCalculator;
    use crate::{PivotConfig, RawRow};
    use serde_json::json;

    fn shape() -> QueryShape {
        QueryShape::new(["Orders.count", "Orders.amount"], ["Users.country", "Users.gender"])
    }

    fn annotation() -> Annotation {
        Annotation::default()
            .with_measure(
                "Orders.count",
                FieldAnnotation::new("Orders Count", "Count", "number").with_format("integer"),
            )
            .with_measure(
                "Orders.amount",
                FieldAnnotation::new("Orders Amount", "Amount", "number").with_format("currency"),
            )
            .with_dimension(
                "Users.country",
                FieldAnnotation::new("Users Country", "Country", "string").with_meta(json!({ "geo": true })),
            )
            .with_dimension("Users.gender", FieldAnnotation::new("Users Gender", "Gender", "string"))
    }

    fn rows() -> Vec<RawRow> {
        vec![
            RawRow::new().with("Users.country", "Germany").with("Users.gender", "male").with("Orders.count", 10.0),
            RawRow::new().with("Users.country", "US").with("Users.gender", "female").with("Orders.count", 7.0),
        ]
    }

    fn columns(config: PivotConfig) -> Vec<ColumnDescriptor> {
        let shape = shape();
        let rows = rows();
        let calculator = PivotCalculator::new(&shape, &rows, &config).unwrap();
        calculator.columns(&annotation())
    }

    #[test]
    fn test_nested_value_node_copies_dimension_annotation() {
        let columns = columns(PivotConfig::new(["Users.gender"], ["Users.country", "measures"]));

        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].data_index.as_deref(), Some("Users.gender"));

        let germany = &columns[1];
        assert_eq!(germany.key, "Germany");
        assert_eq!(germany.title, "Users Country Germany");
        assert_eq!(germany.short_title, "Germany");
        assert_eq!(germany.meta, Some(json!({ "geo": true })));
        assert_eq!(germany.data_index, None);

        let leaves = germany.children.as_ref().unwrap();
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[1].key, "Orders.amount");
        assert_eq!(leaves[1].short_title, "Amount");
        assert_eq!(leaves[1].format.as_deref(), Some("currency"));
        assert_eq!(leaves[1].data_index.as_deref(), Some("Germany.Orders.amount"));
    }

    #[test]
    fn test_measures_first_nests_values_under_measures() {
        let columns = columns(PivotConfig::new(["Users.gender"], ["measures", "Users.country"]));

        let count = &columns[1];
        assert_eq!(count.key, "Orders.count");
        assert_eq!(count.title, "Orders Count");
        let children = count.children.as_ref().unwrap();
        assert_eq!(children[0].title, "Users Country Germany");
        assert_eq!(children[0].data_index.as_deref(), Some("Orders.count.Germany"));
    }

    #[test]
    fn test_flat_columns_for_measures_on_x() {
        let columns = columns(PivotConfig::new(["measures"], ["Users.country", "Users.gender"]));

        let keys: Vec<&str> = columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["measures", "Germany.male", "US.female"]);
        assert!(columns.iter().all(ColumnDescriptor::is_leaf));

        assert_eq!(columns[0].title, "Measures");
        assert_eq!(columns[1].title, "Users Country Germany, Users Gender Male");
        assert_eq!(columns[1].short_title, "Germany, Male");
        assert_eq!(columns[1].semantic_type, "number");
        // Formats differ between the measures.
        assert_eq!(columns[1].format, None);
    }

    #[test]
    fn test_missing_annotation_falls_back_to_ids() {
        let shape = shape();
        let rows = rows();
        let config = PivotConfig::new(["Users.country"], ["Users.gender", "measures"]);
        let calculator = PivotCalculator::new(&shape, &rows, &config).unwrap();
        let columns = calculator.columns(&Annotation::default());

        assert_eq!(columns[0].title, "Users.country");
        assert_eq!(columns[1].title, "Users.gender Male");
        let leaf = &columns[1].children.as_ref().unwrap()[0];
        assert_eq!(leaf.title, "Orders.count");
        assert_eq!(leaf.semantic_type, "number");
    }
}
