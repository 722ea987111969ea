//! # Scribe Infrastructure
//!
//! Concrete implementations of the ports defined in `scribe-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `supabase` - PostgREST data store and GoTrue auth over HTTP via reqwest

pub mod memory;

#[cfg(feature = "supabase")]
pub mod supabase;

// Re-exports - In-Memory
pub use memory::{InMemoryAuth, InMemoryDataStore};

// Re-exports - Supabase
#[cfg(feature = "supabase")]
pub use supabase::{GoTrueAuth, PostgrestStore, SupabaseClient, SupabaseConfig};
