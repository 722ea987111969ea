//! Resource services - one per entity, plus the auth wrapper.
//!
//! Every public operation makes one call to a port and returns either a typed
//! value or a `ServiceError`. Failures are logged here and never re-raised in
//! their original form.

mod auth;
mod blog;
mod category;
mod comment;
mod like;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::AuthService;
pub use blog::BlogService;
pub use category::CategoryService;
pub use comment::CommentService;
pub use like::LikeService;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DataError, ServiceError, ServiceFailure};
use crate::query;

fn decode<T: DeserializeOwned>(row: Value) -> Result<T, DataError> {
    serde_json::from_value(row).map_err(|e| DataError::Decode(e.to_string()))
}

fn decode_all<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, DataError> {
    rows.into_iter().map(decode).collect()
}

/// Exactly one row; no row becomes a not-found failure carrying `missing`.
fn expect_one(rows: Vec<Value>, missing: &str) -> Result<Value, ServiceFailure> {
    query::single(rows).map_err(|e| match e {
        DataError::NotFound => ServiceFailure::NotFound(missing.to_string()),
        other => ServiceFailure::Data(other),
    })
}

fn require(present: bool, message: &str) -> Result<(), ServiceFailure> {
    if present {
        Ok(())
    } else {
        Err(ServiceFailure::Validation(message.to_string()))
    }
}

/// Log the failure and pass its message through.
fn normalize(context: &str, failure: ServiceFailure) -> ServiceError {
    tracing::error!(kind = failure.kind(), error = %failure, "{context}");
    ServiceError::new(failure.to_string())
}

/// Log the failure; backend failures are reported with the fixed `message`.
fn normalize_as(context: &str, failure: ServiceFailure, message: &str) -> ServiceError {
    tracing::error!(kind = failure.kind(), error = %failure, "{context}");
    match failure {
        ServiceFailure::Data(_) => ServiceError::new(message),
        other => ServiceError::new(other.to_string()),
    }
}
