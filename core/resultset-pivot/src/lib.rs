//! FILENAME: core/resultset-pivot/src/lib.rs
//! Result-set pivoting for analytical query results.
//!
//! This crate turns the flat rows of an analytical query (measures and
//! dimensions) into two projections that always agree with each other:
//! pivoted table rows for a grid, and a nested column-header tree.
//!
//! Layers:
//! - `definition`: Serializable inputs (query shape, pivot config, annotation)
//! - `axis`: Resolves a pivot config into complete x/y axes
//! - `cache`: Scalar values, raw rows and x-axis grouping
//! - `keys`: Composite key derivation shared by rows and headers
//! - `view`: Renderable output (pivoted rows, column descriptors)
//! - `engine`: Calculation engine (HOW we pivot)
//! - `header`: Column header tree
//! - `result_set`: Facade over a query load response

pub mod logging;

pub mod error;
pub mod definition;
pub mod axis;
pub mod cache;
pub mod keys;
pub mod view;
pub mod engine;
pub mod header;
pub mod result_set;

pub use error::{Axis, ConfigError, PivotError};
pub use definition::*;
pub use axis::{resolve_axes, ResolvedAxes};
pub use cache::{group_rows, AxisPath, AxisValue, CacheValue, GroupKey, RawRow, RowGroup};
pub use view::*;
pub use engine::{calculate_pivot, pivot, table_columns, table_pivot, AxisNode, PivotCalculator, YAxis};
pub use header::build_columns;
pub use keys::{composite_key, KEY_SEPARATOR, MEASURES_KEY, VALUE_KEY};
pub use result_set::{LoadResponse, ResultSet};
