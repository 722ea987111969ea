//! Auth service - the auth backend behind normalized `AuthError` results.

use std::sync::Arc;

use serde_json::Value;

use scribe_shared::dto::{LoginRequest, RegisterRequest, UserUpdate};

use crate::domain::{OAuthProvider, Session, SignUp, User};
use crate::error::ServiceError;
use crate::ports::{AuthError, AuthProvider};

/// Wraps an `AuthProvider`. Every failure comes back as a `ServiceError` named
/// `AuthError`; the cause is logged first.
#[derive(Clone)]
pub struct AuthService {
    auth: Arc<dyn AuthProvider>,
    site_url: String,
}

fn fail(context: &str, err: AuthError) -> ServiceError {
    tracing::error!(error = %err, "{context}");
    ServiceError::auth(err.to_string())
}

impl AuthService {
    /// `site_url` is the public origin of the app; email and OAuth redirects
    /// point back into it.
    pub fn new(auth: Arc<dyn AuthProvider>, site_url: impl Into<String>) -> Self {
        let site_url = site_url.into().trim_end_matches('/').to_string();
        Self { auth, site_url }
    }

    fn callback_url(&self) -> String {
        format!("{}/auth/callback", self.site_url)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Session, ServiceError> {
        self.auth
            .sign_in_with_password(&request.email, &request.password)
            .await
            .map_err(|e| fail("Login error", e))
    }

    pub async fn logout(&self) -> Result<(), ServiceError> {
        self.auth.sign_out().await.map_err(|e| fail("Logout error", e))
    }

    /// Create an account. An empty identity list in the reply means the email
    /// already belongs to an account. Null metadata is sent as an empty object.
    pub async fn register(&self, request: &RegisterRequest) -> Result<SignUp, ServiceError> {
        let metadata = match &request.metadata {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other.clone(),
        };
        let outcome = self
            .auth
            .sign_up(&request.email, &request.password, &metadata, &self.callback_url())
            .await
            .map_err(|e| fail("Registration error", e))?;

        if outcome.user.as_ref().is_some_and(User::has_no_identities) {
            tracing::warn!("User already registered");
            return Err(ServiceError::auth("User already registered"));
        }

        Ok(outcome)
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), ServiceError> {
        let redirect = format!("{}/auth/reset-password", self.site_url);
        self.auth
            .reset_password_for_email(email, &redirect)
            .await
            .map_err(|e| fail("Password reset error", e))
    }

    /// Never fails: lookup errors are logged and read as "not signed in".
    pub async fn is_authenticated(&self) -> bool {
        match self.auth.current_session().await {
            Ok(session) => session.is_some(),
            Err(e) => {
                tracing::error!(error = %e, "Authentication check error");
                false
            }
        }
    }

    pub async fn get_user(&self) -> Result<User, ServiceError> {
        match self.auth.current_user().await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                tracing::warn!("No user found");
                Err(ServiceError::auth("No user found"))
            }
            Err(e) => Err(fail("Get user error", e)),
        }
    }

    pub async fn update_user(&self, update: &UserUpdate) -> Result<User, ServiceError> {
        self.auth
            .update_user(update)
            .await
            .map_err(|e| fail("Update user error", e))
    }

    /// Delete the signed-in user's account.
    pub async fn delete_user(&self) -> Result<(), ServiceError> {
        let user = match self.auth.current_user().await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::error!("Get user for deletion error: no user");
                return Err(ServiceError::auth("User not found"));
            }
            Err(e) => return Err(fail("Get user for deletion error", e)),
        };

        self.auth
            .admin_delete_user(&user.id)
            .await
            .map_err(|e| fail("Delete user error", e))
    }

    pub async fn send_magic_link(&self, email: &str) -> Result<(), ServiceError> {
        self.auth
            .sign_in_with_otp(email, &self.callback_url())
            .await
            .map_err(|e| fail("Magic link error", e))
    }

    pub async fn get_session(&self) -> Result<Option<Session>, ServiceError> {
        self.auth
            .current_session()
            .await
            .map_err(|e| fail("Get session error", e))
    }

    /// Start a social login; returns the URL to send the browser to.
    pub async fn login_with_social(&self, provider: OAuthProvider) -> Result<String, ServiceError> {
        self.auth
            .authorize_url(provider, &self.callback_url(), provider.scopes())
            .await
            .map_err(|e| fail(&format!("{provider} login error"), e))
    }

    pub async fn refresh_session(&self) -> Result<Option<Session>, ServiceError> {
        self.auth
            .refresh_session()
            .await
            .map_err(|e| fail("Refresh session error", e))
    }
}
