//! In-memory adapters - used when no backend is configured, and by tests.

mod auth;
mod store;

pub use auth::InMemoryAuth;
pub use store::InMemoryDataStore;
