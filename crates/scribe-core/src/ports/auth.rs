//! Authentication port.

use async_trait::async_trait;
use serde_json::Value;

use scribe_shared::dto::UserUpdate;

use crate::domain::{OAuthProvider, Session, SignUp, User};

/// Auth backend: sessions, accounts and sign-in flows.
///
/// Implementations keep the current session themselves (the way a browser SDK
/// keeps it in storage); callers never pass tokens around.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<Session, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &Value,
        redirect_to: &str,
    ) -> Result<SignUp, AuthError>;

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str)
    -> Result<(), AuthError>;

    /// The signed-in user, if any.
    async fn current_user(&self) -> Result<Option<User>, AuthError>;

    async fn update_user(&self, update: &UserUpdate) -> Result<User, AuthError>;

    /// Remove an account. Requires admin credentials on the backend.
    async fn admin_delete_user(&self, user_id: &str) -> Result<(), AuthError>;

    /// Send a one-time sign-in link.
    async fn sign_in_with_otp(&self, email: &str, redirect_to: &str) -> Result<(), AuthError>;

    /// The current session, refreshed first if it has expired.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    /// URL the browser should visit to start an OAuth sign-in.
    async fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        scopes: Option<&str>,
    ) -> Result<String, AuthError>;

    async fn refresh_session(&self) -> Result<Option<Session>, AuthError>;
}

/// Authentication errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Auth session missing")]
    NoSession,

    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Service role key required for admin operations")]
    MissingServiceKey,
}
