//! Application state - the services every command runs against.

use std::sync::Arc;

use scribe_core::ports::{AuthProvider, DataStore};
use scribe_core::{
    AuthService, BlogService, CategoryService, CommentService, GuardConfig, LikeService,
    RouteTable, SessionGuard,
};
use scribe_infra::{InMemoryAuth, InMemoryDataStore};

use crate::config::AppConfig;
use crate::demo;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub backend: &'static str,
    pub blogs: BlogService,
    pub comments: CommentService,
    pub likes: LikeService,
    pub categories: CategoryService,
    pub auth: AuthService,
    pub guard: SessionGuard,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        if let Some((auth, store)) = remote_ports(config) {
            return Self::from_ports("supabase", auth, store, config);
        }

        let auth = Arc::new(InMemoryAuth::new());
        let store = Arc::new(InMemoryDataStore::new());
        if config.demo_data {
            demo::seed(&auth, &store).await;
        }
        Self::from_ports("memory", auth, store, config)
    }

    pub fn from_ports(
        backend: &'static str,
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DataStore>,
        config: &AppConfig,
    ) -> Self {
        let guard_config = GuardConfig {
            authenticated_home: config.auth_home.clone(),
            ..GuardConfig::default()
        };

        tracing::debug!(backend, "Application state initialized");
        Self {
            backend,
            blogs: BlogService::new(store.clone()),
            comments: CommentService::new(store.clone()),
            likes: LikeService::new(store.clone()),
            categories: CategoryService::new(store),
            auth: AuthService::new(auth.clone(), config.site_url.clone()),
            guard: SessionGuard::new(auth, RouteTable::standard(), guard_config),
        }
    }
}

type Ports = (Arc<dyn AuthProvider>, Arc<dyn DataStore>);

#[cfg(feature = "supabase")]
fn remote_ports(config: &AppConfig) -> Option<Ports> {
    let Some(supabase) = &config.supabase else {
        tracing::warn!("SUPABASE_URL not set. Running with in-memory backend.");
        return None;
    };

    match scribe_infra::SupabaseClient::new(supabase.clone()) {
        Ok(client) => Some((Arc::new(client.auth), Arc::new(client.data))),
        Err(e) => {
            tracing::error!(
                "Failed to build Supabase client: {}. Using in-memory fallback.",
                e
            );
            None
        }
    }
}

#[cfg(not(feature = "supabase"))]
fn remote_ports(_config: &AppConfig) -> Option<Ports> {
    tracing::info!("Running without supabase feature - using in-memory backend");
    None
}
