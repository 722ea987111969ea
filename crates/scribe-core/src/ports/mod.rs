//! Ports - trait definitions for the remote backends.
//! Infrastructure adapters implement these; services only see the traits.

mod auth;
mod data;

pub use auth::{AuthError, AuthProvider};
pub use data::DataStore;
