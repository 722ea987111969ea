//! `AuthProvider` over the GoTrue API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Deserialize;
use serde_json::{Value, json};

use scribe_core::domain::{OAuthProvider, Session, SignUp, User};
use scribe_core::ports::{AuthError, AuthProvider};
use scribe_shared::dto::UserUpdate;

use super::{SharedSession, SupabaseConfig};

/// GoTrue client at `{url}/auth/v1`. Keeps the session it obtained, the way a
/// browser SDK keeps it in local storage.
pub struct GoTrueAuth {
    http: Client,
    base: String,
    api_key: String,
    service_role_key: Option<String>,
    session: SharedSession,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl GoTrueAuth {
    pub(crate) fn new(http: Client, config: &SupabaseConfig, session: SharedSession) -> Self {
        Self {
            http,
            base: config.auth_url(),
            api_key: config.anon_key.clone(),
            service_role_key: config.service_role_key.clone(),
            session,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base))
            .header("apikey", &self.api_key)
    }

    async fn access_token(&self) -> Result<String, AuthError> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or(AuthError::NoSession)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Value, AuthError> {
        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Connection(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Connection(e.to_string()))?;

        if !status.is_success() {
            let error = map_auth_error(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), error = %error, "GoTrue request failed");
            return Err(error);
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| AuthError::Decode(e.to_string()))
    }

    async fn store(&self, session: Option<Session>) {
        *self.session.write().await = session;
    }
}

/// Decode a token response, deriving `expires_at` from `expires_in` when the
/// backend left it out.
pub(crate) fn parse_session(body: Value, now: DateTime<Utc>) -> Result<Session, AuthError> {
    let mut session: Session =
        serde_json::from_value(body).map_err(|e| AuthError::Decode(e.to_string()))?;
    if session.expires_at.is_none() {
        session.expires_at = session.expires_in.map(|secs| now.timestamp() + secs);
    }
    Ok(session)
}

/// A sign-up reply is either a full session (auto-confirm) or a bare user
/// awaiting email confirmation.
pub(crate) fn parse_sign_up(body: Value, now: DateTime<Utc>) -> Result<SignUp, AuthError> {
    if body.get("access_token").is_some() {
        let session = parse_session(body, now)?;
        return Ok(SignUp {
            user: Some(session.user.clone()),
            session: Some(session),
        });
    }

    let user = match body.get("user") {
        Some(user) => user.clone(),
        None => body,
    };
    let user: User = serde_json::from_value(user).map_err(|e| AuthError::Decode(e.to_string()))?;
    Ok(SignUp {
        user: Some(user),
        session: None,
    })
}

pub(crate) fn map_auth_error(status: u16, body: &str) -> AuthError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    if parsed.error.as_deref() == Some("invalid_grant")
        || parsed.error_code.as_deref() == Some("invalid_credentials")
    {
        return AuthError::InvalidCredentials;
    }

    let message = parsed
        .msg
        .or(parsed.message)
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| format!("HTTP {status}"));
    AuthError::Remote { status, message }
}

/// Whether a refresh failure means the stored session is dead.
fn is_rejection(error: &AuthError) -> bool {
    match error {
        AuthError::InvalidCredentials => true,
        AuthError::Remote { status, .. } => (400..500).contains(status),
        _ => false,
    }
}

#[async_trait]
impl AuthProvider for GoTrueAuth {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        tracing::debug!(email, "Password sign-in");
        let body = self
            .execute(
                self.request(Method::POST, "/token")
                    .query(&[("grant_type", "password")])
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        let session = parse_session(body, Utc::now())?;
        self.store(Some(session.clone())).await;
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Ok(token) = self.access_token().await else {
            return Ok(());
        };
        let result = self
            .execute(self.request(Method::POST, "/logout").bearer_auth(token))
            .await;
        // The local session is dropped even if the server call fails.
        self.store(None).await;
        result.map(|_| ())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &Value,
        redirect_to: &str,
    ) -> Result<SignUp, AuthError> {
        tracing::debug!(email, "Sign-up");
        let body = self
            .execute(
                self.request(Method::POST, "/signup")
                    .query(&[("redirect_to", redirect_to)])
                    .json(&json!({ "email": email, "password": password, "data": metadata })),
            )
            .await?;
        let outcome = parse_sign_up(body, Utc::now())?;
        if outcome.session.is_some() {
            self.store(outcome.session.clone()).await;
        }
        Ok(outcome)
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AuthError> {
        self.execute(
            self.request(Method::POST, "/recover")
                .query(&[("redirect_to", redirect_to)])
                .json(&json!({ "email": email })),
        )
        .await
        .map(|_| ())
    }

    async fn current_user(&self) -> Result<Option<User>, AuthError> {
        let Ok(token) = self.access_token().await else {
            return Ok(None);
        };
        let body = self
            .execute(self.request(Method::GET, "/user").bearer_auth(token))
            .await?;
        let user = serde_json::from_value(body).map_err(|e| AuthError::Decode(e.to_string()))?;
        Ok(Some(user))
    }

    async fn update_user(&self, update: &UserUpdate) -> Result<User, AuthError> {
        let token = self.access_token().await?;
        let body = self
            .execute(
                self.request(Method::PUT, "/user")
                    .bearer_auth(token)
                    .json(update),
            )
            .await?;
        let user: User =
            serde_json::from_value(body).map_err(|e| AuthError::Decode(e.to_string()))?;

        if let Some(session) = self.session.write().await.as_mut() {
            session.user = user.clone();
        }
        Ok(user)
    }

    async fn admin_delete_user(&self, user_id: &str) -> Result<(), AuthError> {
        let key = self
            .service_role_key
            .as_deref()
            .ok_or(AuthError::MissingServiceKey)?;
        tracing::info!(user_id, "Deleting user");
        self.execute(
            self.request(Method::DELETE, &format!("/admin/users/{user_id}"))
                .header("apikey", key)
                .bearer_auth(key),
        )
        .await?;

        let mut session = self.session.write().await;
        if session.as_ref().is_some_and(|s| s.user.id == user_id) {
            *session = None;
        }
        Ok(())
    }

    async fn sign_in_with_otp(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        self.execute(
            self.request(Method::POST, "/otp")
                .query(&[("redirect_to", redirect_to)])
                .json(&json!({ "email": email, "create_user": true })),
        )
        .await
        .map(|_| ())
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let session = self.session.read().await.clone();
        match session {
            Some(s) if s.is_expired_at(Utc::now()) => {
                tracing::debug!("Session expired, refreshing");
                self.refresh_session().await
            }
            other => Ok(other),
        }
    }

    async fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        scopes: Option<&str>,
    ) -> Result<String, AuthError> {
        let mut params = vec![("provider", provider.as_str()), ("redirect_to", redirect_to)];
        if let Some(scopes) = scopes {
            params.push(("scopes", scopes));
        }
        Url::parse_with_params(&format!("{}/authorize", self.base), &params)
            .map(String::from)
            .map_err(|e| AuthError::Decode(e.to_string()))
    }

    async fn refresh_session(&self) -> Result<Option<Session>, AuthError> {
        let refresh_token = match self.session.read().await.as_ref() {
            Some(s) => s.refresh_token.clone(),
            None => return Ok(None),
        };

        let result = self
            .execute(
                self.request(Method::POST, "/token")
                    .query(&[("grant_type", "refresh_token")])
                    .json(&json!({ "refresh_token": refresh_token })),
            )
            .await
            .and_then(|body| parse_session(body, Utc::now()));

        match result {
            Ok(session) => {
                self.store(Some(session.clone())).await;
                Ok(Some(session))
            }
            Err(e) => {
                if is_rejection(&e) {
                    self.store(None).await;
                }
                Err(e)
            }
        }
    }
}
