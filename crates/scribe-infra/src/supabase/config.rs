use std::time::Duration;

/// Connection settings for a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL (e.g., https://xyz.supabase.co)
    pub url: String,
    /// Public anon key, sent as `apikey` on every request
    pub anon_key: String,
    /// Service role key, needed only for admin operations
    pub service_role_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_role_key: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Returns `None` when `SUPABASE_URL` is not set.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("SUPABASE_URL").ok().filter(|v| !v.is_empty())?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY").unwrap_or_default();

        let mut config = Self::new(url, anon_key);
        config.service_role_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .ok()
            .filter(|v| !v.is_empty());
        config.timeout = Duration::from_secs(
            std::env::var("SUPABASE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        );
        Some(config)
    }

    pub(crate) fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }

    pub(crate) fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url)
    }
}
