//! # Scribe Shared
//!
//! Request and response shapes shared by the services and their callers.
//! Everything here is plain serde data so a UI (native or WASM) can use it as-is.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorBody};
