use async_trait::async_trait;
use serde_json::Value;

use crate::error::DataError;
use crate::query::{Filter, Select};

/// Table-scoped row storage.
///
/// Every method is one round trip. Writes return the affected rows as stored,
/// so callers can decode the representation without a second read.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Run a read, expanding any embedded relations.
    async fn select(&self, query: &Select) -> Result<Vec<Value>, DataError>;

    /// Insert one row and return it as stored.
    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, DataError>;

    /// Apply `patch` to every row matching `filters`; returns the updated rows.
    async fn update(
        &self,
        table: &str,
        patch: Value,
        filters: &[Filter],
    ) -> Result<Vec<Value>, DataError>;

    /// Delete every row matching `filters`.
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), DataError>;
}
