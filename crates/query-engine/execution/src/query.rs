//! The result of running a list plan, and the data sources that produce it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use query_engine_translation::translation::plan::ListPlan;

use crate::error::Error;

/// A single record. Included relationships are nested under their name.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A page of records, and how many records match the filters regardless of pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "data")]
    pub rows: Vec<Record>,
    #[serde(rename = "totalRecords")]
    pub total_count: u64,
}

/// Something a list plan can be run against.
///
/// The total is counted over the filtered records before pagination applies, so it never
/// depends on `offset` or `limit`.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn execute(&self, plan: &ListPlan) -> Result<QueryResult, Error>;

    /// Check that the data source can be reached.
    async fn health_check(&self) -> Result<(), Error> {
        Ok(())
    }
}
