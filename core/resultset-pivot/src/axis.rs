//! FILENAME: core/resultset-pivot/src/axis.rs
//! Axis resolution: turns a (possibly partial) `PivotConfig` into complete,
//! validated x and y field lists for one query.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::definition::{FieldRef, PivotConfig, QueryShape};
use crate::error::{Axis, ConfigError};

/// The complete axes of one pivot call.
///
/// Every dimension of the query appears exactly once across `x` and `y`, and
/// the measures marker appears on exactly one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAxes {
    pub x: Vec<FieldRef>,
    pub y: Vec<FieldRef>,
}

impl ResolvedAxes {
    pub fn measures_on_x(&self) -> bool {
        self.x.iter().any(FieldRef::is_measures)
    }

    pub fn x_dimensions(&self) -> impl Iterator<Item = &str> {
        dimensions_of(&self.x)
    }

    pub fn y_dimensions(&self) -> impl Iterator<Item = &str> {
        dimensions_of(&self.y)
    }
}

fn dimensions_of(fields: &[FieldRef]) -> impl Iterator<Item = &str> {
    fields.iter().filter_map(|f| match f {
        FieldRef::Dimension(id) => Some(id.as_str()),
        FieldRef::MeasuresMarker => None,
    })
}

/// Resolves `config` against `shape`.
///
/// An omitted `x` takes every dimension that `y` does not use; an omitted `y`
/// is `[measures]` unless the measures are already on `x`. Dimensions used on
/// neither axis are appended to `x`, and the measures marker is appended to
/// `y` when neither axis has it. Caller-given order is kept as is.
pub fn resolve_axes(config: &PivotConfig, shape: &QueryShape) -> Result<ResolvedAxes, ConfigError> {
    let dimension_ids = shape.dimension_ids();
    let known: FxHashSet<&str> = dimension_ids.iter().map(String::as_str).collect();

    let mut seen: FxHashSet<&FieldRef> = FxHashSet::default();
    let mut marker_axis: Option<Axis> = None;

    let given = [(Axis::X, config.x.as_deref()), (Axis::Y, config.y.as_deref())];
    for (axis, fields) in given {
        for field in fields.unwrap_or_default() {
            match field {
                FieldRef::Dimension(id) => {
                    if !known.contains(id.as_str()) {
                        return Err(ConfigError::UnknownField {
                            axis,
                            field: id.clone(),
                        });
                    }
                }
                FieldRef::MeasuresMarker => match marker_axis {
                    Some(other) if other != axis => return Err(ConfigError::MeasuresOnBothAxes),
                    _ => marker_axis = Some(axis),
                },
            }
            if !seen.insert(field) {
                return Err(ConfigError::DuplicateField {
                    field: field.to_string(),
                });
            }
        }
    }

    let mut y = match &config.y {
        Some(y) => y.clone(),
        None if marker_axis == Some(Axis::X) => Vec::new(),
        None => vec![FieldRef::MeasuresMarker],
    };

    let mut x = match &config.x {
        Some(x) => x.clone(),
        None => dimension_ids
            .iter()
            .map(|id| FieldRef::Dimension(id.clone()))
            .filter(|f| !y.contains(f))
            .collect(),
    };

    for id in &dimension_ids {
        let field = FieldRef::Dimension(id.clone());
        if !x.contains(&field) && !y.contains(&field) {
            x.push(field);
        }
    }

    if !x.iter().chain(y.iter()).any(FieldRef::is_measures) {
        y.push(FieldRef::MeasuresMarker);
    }

    crate::log_debug!(
        "PIVOT",
        "resolved axes x=[{}] y=[{}]",
        join_refs(&x),
        join_refs(&y)
    );

    Ok(ResolvedAxes { x, y })
}

fn join_refs(fields: &[FieldRef]) -> String {
    fields
        .iter()
        .map(FieldRef::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> QueryShape {
        QueryShape::new(["Orders.count"], ["Users.country", "Users.gender"])
    }

    fn dim(id: &str) -> FieldRef {
        FieldRef::dimension(id)
    }

    #[test]
    fn test_defaults_when_config_is_empty() {
        let axes = resolve_axes(&PivotConfig::default(), &shape()).unwrap();
        assert_eq!(axes.x, vec![dim("Users.country"), dim("Users.gender")]);
        assert_eq!(axes.y, vec![FieldRef::MeasuresMarker]);
        assert!(!axes.measures_on_x());
    }

    #[test]
    fn test_caller_order_is_preserved() {
        let config = PivotConfig::new(["Users.gender"], ["measures", "Users.country"]);
        let axes = resolve_axes(&config, &shape()).unwrap();
        assert_eq!(axes.x, vec![dim("Users.gender")]);
        assert_eq!(axes.y, vec![FieldRef::MeasuresMarker, dim("Users.country")]);
    }

    #[test]
    fn test_omitted_x_skips_dimensions_used_on_y() {
        let config = PivotConfig::default().with_y(["Users.gender", "measures"]);
        let axes = resolve_axes(&config, &shape()).unwrap();
        assert_eq!(axes.x, vec![dim("Users.country")]);
        assert_eq!(axes.y, vec![dim("Users.gender"), FieldRef::MeasuresMarker]);
    }

    #[test]
    fn test_omitted_y_is_empty_when_measures_on_x() {
        let config = PivotConfig::default().with_x(["Users.gender", "measures"]);
        let axes = resolve_axes(&config, &shape()).unwrap();
        assert_eq!(axes.x, vec![dim("Users.gender"), FieldRef::MeasuresMarker, dim("Users.country")]);
        assert!(axes.y.is_empty());
        assert!(axes.measures_on_x());
    }

    #[test]
    fn test_unreferenced_fields_are_completed() {
        let config = PivotConfig::new(Vec::<&str>::new(), ["Users.gender"]);
        let axes = resolve_axes(&config, &shape()).unwrap();
        assert_eq!(axes.x, vec![dim("Users.country")]);
        assert_eq!(axes.y, vec![dim("Users.gender"), FieldRef::MeasuresMarker]);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let config = PivotConfig::new(["Users.city"], ["measures"]);
        assert_eq!(
            resolve_axes(&config, &shape()),
            Err(ConfigError::UnknownField {
                axis: Axis::X,
                field: "Users.city".to_string()
            })
        );

        // Measures are not axis entries on their own.
        let config = PivotConfig::new(["Users.country"], ["Orders.count"]);
        assert!(matches!(
            resolve_axes(&config, &shape()),
            Err(ConfigError::UnknownField { axis: Axis::Y, .. })
        ));
    }

    #[test]
    fn test_duplicate_fields_are_rejected() {
        let across = PivotConfig::new(["Users.country"], ["Users.country", "measures"]);
        assert_eq!(
            resolve_axes(&across, &shape()),
            Err(ConfigError::DuplicateField {
                field: "Users.country".to_string()
            })
        );

        let within = PivotConfig::new(["Users.gender", "Users.gender"], ["measures"]);
        assert!(matches!(
            resolve_axes(&within, &shape()),
            Err(ConfigError::DuplicateField { .. })
        ));

        let marker_twice = PivotConfig::new(["Users.gender"], ["measures", "measures"]);
        assert_eq!(
            resolve_axes(&marker_twice, &shape()),
            Err(ConfigError::DuplicateField {
                field: "measures".to_string()
            })
        );
    }

    #[test]
    fn test_measures_on_both_axes_is_rejected() {
        let config = PivotConfig::new(["measures"], ["Users.gender", "measures"]);
        assert_eq!(
            resolve_axes(&config, &shape()),
            Err(ConfigError::MeasuresOnBothAxes)
        );
    }

    #[test]
    fn test_time_dimension_members_are_valid_fields() {
        let shape = shape().with_time_dimension("Orders.createdAt", Some("day"));
        let config = PivotConfig::default().with_y(["Orders.createdAt.day", "measures"]);
        let axes = resolve_axes(&config, &shape).unwrap();
        assert_eq!(axes.x, vec![dim("Users.country"), dim("Users.gender")]);
        assert_eq!(axes.y_dimensions().collect::<Vec<_>>(), vec!["Orders.createdAt.day"]);
    }
}
