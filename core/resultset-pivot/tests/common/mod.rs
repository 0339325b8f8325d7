//! FILENAME: tests/common/mod.rs
//! Shared fixtures for pivot integration tests.

#![allow(dead_code)]

use resultset_pivot::{LoadResponse, PivotConfig, ResultSet};
use serde_json::{json, Value};

/// Orders by country and gender: 2 countries x 2 genders, with count and amount.
pub struct OrdersFixture;

impl OrdersFixture {
    pub fn data() -> Value {
        json!([
            { "Users.country": "Germany", "Users.gender": "male",   "Orders.count": 10, "Orders.amount": 11 },
            { "Users.country": "Germany", "Users.gender": "female", "Orders.count": 12, "Orders.amount": 13 },
            { "Users.country": "US",      "Users.gender": "male",   "Orders.count": 5,  "Orders.amount": 6 },
            { "Users.country": "US",      "Users.gender": "female", "Orders.count": 7,  "Orders.amount": 8 }
        ])
    }

    pub fn annotation() -> Value {
        json!({
            "measures": {
                "Orders.count": { "title": "Orders Count", "shortTitle": "Count", "type": "number" },
                "Orders.amount": { "title": "Orders Amount", "shortTitle": "Amount", "type": "number" }
            },
            "dimensions": {
                "Users.country": { "title": "Users Country", "shortTitle": "Country", "type": "string" },
                "Users.gender": { "title": "Users Gender", "shortTitle": "Gender", "type": "string" }
            },
            "segments": {},
            "timeDimensions": {}
        })
    }

    /// Result set querying only `measures` (data rows still carry both).
    pub fn result_set(measures: &[&str]) -> ResultSet {
        let response: LoadResponse = serde_json::from_value(json!({
            "query": {
                "measures": measures,
                "dimensions": ["Users.country", "Users.gender"]
            },
            "data": Self::data(),
            "annotation": Self::annotation()
        }))
        .expect("fixture deserializes");
        ResultSet::from(response)
    }

    pub fn one_measure() -> ResultSet {
        Self::result_set(&["Orders.count"])
    }

    pub fn two_measures() -> ResultSet {
        Self::result_set(&["Orders.count", "Orders.amount"])
    }
}

pub fn config(value: Value) -> PivotConfig {
    serde_json::from_value(value).expect("pivot config deserializes")
}

/// Serialized table rows, as a renderer would receive them.
pub fn rows_json(result_set: &ResultSet, config: &PivotConfig) -> Value {
    serde_json::to_value(result_set.table_pivot(config).expect("pivot succeeds")).expect("rows serialize")
}

/// Serialized header tree, as a renderer would receive it.
pub fn columns_json(result_set: &ResultSet, config: &PivotConfig) -> Value {
    serde_json::to_value(result_set.table_columns(config).expect("pivot succeeds")).expect("columns serialize")
}
