//! FILENAME: core/resultset-pivot/src/result_set.rs
//! ResultSet - a loaded query result and its pivot views.
//!
//! Wraps the load response a query service returns (`query`, `data`,
//! `annotation`) and exposes table-oriented pivots of it. Every call resolves
//! its own config and recomputes from the rows; nothing is cached.

use serde::{Deserialize, Serialize};

use crate::axis::{resolve_axes, ResolvedAxes};
use crate::cache::RawRow;
use crate::definition::{Annotation, PivotConfig, QueryShape};
use crate::engine::PivotCalculator;
use crate::error::{ConfigError, PivotError};
use crate::view::{ColumnDescriptor, PivotGroup, PivotOutput, PivotedRow};

/// The serialized form of a query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    pub query: QueryShape,

    #[serde(default)]
    pub data: Vec<RawRow>,

    #[serde(default)]
    pub annotation: Annotation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    response: LoadResponse,
}

impl ResultSet {
    pub fn new(query: QueryShape, data: Vec<RawRow>, annotation: Annotation) -> Self {
        ResultSet {
            response: LoadResponse {
                query,
                data,
                annotation,
            },
        }
    }

    pub fn from_response(response: LoadResponse) -> Self {
        ResultSet { response }
    }

    pub fn from_json(json: &str) -> Result<Self, PivotError> {
        let response: LoadResponse = serde_json::from_str(json)?;
        crate::log_debug!(
            "RESULTSET",
            "loaded {} rows, {} measures, {} dimensions",
            response.data.len(),
            response.query.measures.len(),
            response.query.dimensions.len()
        );
        Ok(ResultSet { response })
    }

    /// Serializes the load response so it can be restored with `from_json`.
    pub fn to_json(&self) -> Result<String, PivotError> {
        Ok(serde_json::to_string(&self.response)?)
    }

    pub fn query(&self) -> &QueryShape {
        &self.response.query
    }

    pub fn raw_data(&self) -> &[RawRow] {
        &self.response.data
    }

    pub fn annotation(&self) -> &Annotation {
        &self.response.annotation
    }

    pub fn into_response(self) -> LoadResponse {
        self.response
    }

    /// The complete axes `config` resolves to for this query.
    pub fn normalize_pivot_config(&self, config: &PivotConfig) -> Result<ResolvedAxes, ConfigError> {
        resolve_axes(config, self.query())
    }

    /// Raw pivot groups: x coordinates and one (y coordinates, cell) pair per column.
    pub fn pivot(&self, config: &PivotConfig) -> Result<Vec<PivotGroup>, ConfigError> {
        Ok(self.calculator(config)?.groups())
    }

    pub fn table_pivot(&self, config: &PivotConfig) -> Result<Vec<PivotedRow>, ConfigError> {
        Ok(self.calculator(config)?.rows())
    }

    pub fn table_columns(&self, config: &PivotConfig) -> Result<Vec<ColumnDescriptor>, ConfigError> {
        Ok(self.calculator(config)?.columns(self.annotation()))
    }

    /// Rows and columns from a single resolution of `config`.
    pub fn table(&self, config: &PivotConfig) -> Result<PivotOutput, ConfigError> {
        let calculator = self.calculator(config)?;
        Ok(PivotOutput {
            rows: calculator.rows(),
            columns: calculator.columns(self.annotation()),
        })
    }

    fn calculator(&self, config: &PivotConfig) -> Result<PivotCalculator<'_>, ConfigError> {
        PivotCalculator::new(self.query(), self.raw_data(), config)
    }
}

impl From<LoadResponse> for ResultSet {
    fn from(response: LoadResponse) -> Self {
        ResultSet::from_response(response)
    }
}
