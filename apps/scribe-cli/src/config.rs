//! Application configuration loaded from environment variables.

use std::env;

#[cfg(feature = "supabase")]
use scribe_infra::SupabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Public origin of the web app; auth emails link back into it.
    pub site_url: String,
    /// Where signed-in users land when they open a guest-only page.
    pub auth_home: String,
    /// Seed sample data into the in-memory fallback.
    pub demo_data: bool,
    #[cfg(feature = "supabase")]
    pub supabase: Option<SupabaseConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            site_url: env::var("SCRIBE_SITE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            auth_home: env::var("SCRIBE_AUTH_HOME").unwrap_or_else(|_| "/dashboard".to_string()),
            demo_data: env::var("SCRIBE_DEMO_DATA")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            #[cfg(feature = "supabase")]
            supabase: SupabaseConfig::from_env(),
        }
    }
}
