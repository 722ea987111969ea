//! `DataStore` over the PostgREST API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;

use scribe_core::error::DataError;
use scribe_core::ports::DataStore;
use scribe_core::query::{Filter, Select};

use super::{SharedSession, SupabaseConfig};

/// Unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Table access through `{url}/rest/v1/{table}`. Requests carry the signed-in
/// user's token when there is one, the anon key otherwise.
pub struct PostgrestStore {
    http: Client,
    base: String,
    api_key: String,
    session: SharedSession,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl PostgrestStore {
    pub(crate) fn new(http: Client, config: &SupabaseConfig, session: SharedSession) -> Self {
        Self {
            http,
            base: config.rest_url(),
            api_key: config.anon_key.clone(),
            session,
        }
    }

    async fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.api_key.clone());

        self.http
            .request(method, format!("{}/{table}", self.base))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Vec<Value>, DataError> {
        let response = request
            .send()
            .await
            .map_err(|e| DataError::Connection(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DataError::Connection(e.to_string()))?;

        if !status.is_success() {
            let error = map_error(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), error = %error, "PostgREST request failed");
            return Err(error);
        }
        parse_rows(&body)
    }
}

/// Query string for a read: the rendered selection, filters and ordering.
pub(crate) fn select_params(query: &Select) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), query.selection.render())];
    params.extend(filter_params(&query.filters));
    if let Some(order) = &query.order {
        params.push(("order".to_string(), order.to_postgrest()));
    }
    params
}

pub(crate) fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| (f.column.clone(), f.to_postgrest()))
        .collect()
}

/// Rows from a response body. Empty bodies (e.g. deletes) yield no rows.
pub(crate) fn parse_rows(body: &str) -> Result<Vec<Value>, DataError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str(body).map_err(|e| DataError::Decode(e.to_string()))? {
        Value::Array(rows) => Ok(rows),
        row @ Value::Object(_) => Ok(vec![row]),
        other => Err(DataError::Decode(format!("expected rows, got {other}"))),
    }
}

pub(crate) fn map_error(status: u16, body: &str) -> DataError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .clone()
        .or_else(|| parsed.details.clone())
        .unwrap_or_else(|| format!("HTTP {status}"));

    if parsed.code.as_deref() == Some(UNIQUE_VIOLATION) || status == 409 {
        return DataError::Constraint(message);
    }
    if let Some(hint) = &parsed.hint {
        tracing::debug!(hint = %hint, "PostgREST hint");
    }
    DataError::Remote {
        code: parsed.code.or_else(|| Some(status.to_string())),
        message,
    }
}

#[async_trait]
impl DataStore for PostgrestStore {
    async fn select(&self, query: &Select) -> Result<Vec<Value>, DataError> {
        tracing::debug!(table = %query.table, "select");
        let request = self
            .request(Method::GET, &query.table)
            .await
            .query(&select_params(query));
        self.execute(request).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, DataError> {
        tracing::debug!(table, "insert");
        let request = self
            .request(Method::POST, table)
            .await
            .header("Prefer", "return=representation")
            .json(&row);
        self.execute(request).await
    }

    async fn update(
        &self,
        table: &str,
        patch: Value,
        filters: &[Filter],
    ) -> Result<Vec<Value>, DataError> {
        tracing::debug!(table, filters = filters.len(), "update");
        let request = self
            .request(Method::PATCH, table)
            .await
            .header("Prefer", "return=representation")
            .query(&filter_params(filters))
            .json(&patch);
        self.execute(request).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), DataError> {
        tracing::debug!(table, filters = filters.len(), "delete");
        let request = self
            .request(Method::DELETE, table)
            .await
            .query(&filter_params(filters));
        self.execute(request).await.map(|_| ())
    }
}
