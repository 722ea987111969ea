//! HTTP adapters for a Supabase project: PostgREST for data, GoTrue for auth.

mod auth;
mod config;
mod rest;

use std::sync::Arc;

use tokio::sync::RwLock;

use scribe_core::domain::Session;

pub use auth::GoTrueAuth;
pub use config::SupabaseConfig;
pub use rest::PostgrestStore;

/// Current session, shared so data requests run as the signed-in user.
pub(crate) type SharedSession = Arc<RwLock<Option<Session>>>;

/// Both adapters for one project, sharing an HTTP client and the session.
pub struct SupabaseClient {
    pub auth: GoTrueAuth,
    pub data: PostgrestStore,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let session = SharedSession::default();

        tracing::info!(url = %config.url, "Supabase client configured");
        Ok(Self {
            auth: GoTrueAuth::new(http.clone(), &config, session.clone()),
            data: PostgrestStore::new(http, &config, session),
        })
    }
}
