//! In-memory auth backend with local accounts and a single current session.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use scribe_core::domain::{Identity, OAuthProvider, Session, SignUp, User};
use scribe_core::ports::{AuthError, AuthProvider};
use scribe_shared::dto::UserUpdate;

const SESSION_TTL_SECS: i64 = 3600;

struct Account {
    user: User,
    password: String,
}

/// Accounts keyed by email. Sign-up signs the new account in right away, as a
/// backend without email confirmation would.
/// Note: Data is lost on process restart.
pub struct InMemoryAuth {
    accounts: RwLock<HashMap<String, Account>>,
    session: RwLock<Option<Session>>,
    outbox: RwLock<Vec<(String, String)>>,
}

impl InMemoryAuth {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            session: RwLock::new(None),
            outbox: RwLock::new(Vec::new()),
        }
    }

    /// Emails "sent" so far, as (recipient, link) pairs.
    pub async fn outbox(&self) -> Vec<(String, String)> {
        self.outbox.read().await.clone()
    }

    /// Register an account directly, without a sign-up email or a session.
    pub async fn add_account(&self, id: &str, email: &str, password: &str, metadata: Value) -> User {
        let user = new_user(id, email, metadata);
        self.accounts.write().await.insert(
            email.to_string(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        user
    }

    /// Replace the current session, e.g. to simulate an expired token.
    pub async fn set_session(&self, session: Option<Session>) {
        *self.session.write().await = session;
    }

    fn issue(user: User) -> Session {
        let expires_at = Utc::now() + Duration::seconds(SESSION_TTL_SECS);
        Session {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: Uuid::new_v4().to_string(),
            token_type: "bearer".to_string(),
            expires_in: Some(SESSION_TTL_SECS),
            expires_at: Some(expires_at.timestamp()),
            user,
        }
    }

    async fn send(&self, email: &str, link: String) {
        tracing::debug!(email, link = %link, "Queued auth email");
        self.outbox.write().await.push((email.to_string(), link));
    }

    async fn signed_in_email(&self) -> Result<String, AuthError> {
        self.session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.user.email.clone())
            .ok_or(AuthError::NoSession)
    }
}

fn new_user(id: &str, email: &str, metadata: Value) -> User {
    User {
        id: id.to_string(),
        email: Some(email.to_string()),
        user_metadata: metadata,
        identities: Some(vec![Identity {
            id: Some(id.to_string()),
            provider: "email".to_string(),
        }]),
        created_at: Some(Utc::now()),
    }
}

impl Default for InMemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuth {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(email)
            .filter(|a| a.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        let session = Self::issue(account.user.clone());
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.session.write().await = None;
        Ok(())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &Value,
        redirect_to: &str,
    ) -> Result<SignUp, AuthError> {
        let mut accounts = self.accounts.write().await;

        // Existing email: obfuscated user with no identities, no session.
        if let Some(existing) = accounts.get(email) {
            let user = User {
                identities: Some(Vec::new()),
                ..existing.user.clone()
            };
            return Ok(SignUp {
                user: Some(user),
                session: None,
            });
        }

        let user = new_user(&Uuid::new_v4().to_string(), email, metadata.clone());
        accounts.insert(
            email.to_string(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        drop(accounts);

        self.send(email, format!("{redirect_to}?type=signup")).await;
        let session = Self::issue(user.clone());
        *self.session.write().await = Some(session.clone());

        Ok(SignUp {
            user: Some(user),
            session: Some(session),
        })
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AuthError> {
        // Unknown addresses succeed silently so accounts can't be probed.
        if self.accounts.read().await.contains_key(email) {
            self.send(email, format!("{redirect_to}?type=recovery")).await;
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self.session.read().await.as_ref().map(|s| s.user.clone()))
    }

    async fn update_user(&self, update: &UserUpdate) -> Result<User, AuthError> {
        let email = self.signed_in_email().await?;
        let mut accounts = self.accounts.write().await;
        let mut account = accounts.remove(&email).ok_or(AuthError::NoSession)?;

        if let Some(password) = &update.password {
            account.password = password.clone();
        }
        if let Some(data) = &update.data {
            match (&mut account.user.user_metadata, data) {
                (Value::Object(current), Value::Object(incoming)) => {
                    current.extend(incoming.clone());
                }
                (current, incoming) => *current = incoming.clone(),
            }
        }
        if let Some(new_email) = &update.email {
            if new_email != &email && accounts.contains_key(new_email) {
                accounts.insert(email, account);
                return Err(AuthError::Remote {
                    status: 422,
                    message: "A user with this email address has already been registered"
                        .to_string(),
                });
            }
            account.user.email = Some(new_email.clone());
        }

        let user = account.user.clone();
        let key = user.email.clone().unwrap_or(email);
        accounts.insert(key, account);
        drop(accounts);

        if let Some(session) = self.session.write().await.as_mut() {
            session.user = user.clone();
        }
        Ok(user)
    }

    async fn admin_delete_user(&self, user_id: &str) -> Result<(), AuthError> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|_, a| a.user.id != user_id);
        if accounts.len() == before {
            return Err(AuthError::Remote {
                status: 404,
                message: "User not found".to_string(),
            });
        }
        drop(accounts);

        let mut session = self.session.write().await;
        if session.as_ref().is_some_and(|s| s.user.id == user_id) {
            *session = None;
        }
        Ok(())
    }

    async fn sign_in_with_otp(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        self.send(email, format!("{redirect_to}?type=magiclink")).await;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let expired = self
            .session
            .read()
            .await
            .as_ref()
            .is_some_and(|s| s.is_expired_at(Utc::now()));
        if expired {
            return self.refresh_session().await;
        }
        Ok(self.session.read().await.clone())
    }

    async fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        scopes: Option<&str>,
    ) -> Result<String, AuthError> {
        let mut url = format!(
            "memory://auth/authorize?provider={}&redirect_to={redirect_to}",
            provider.as_str()
        );
        if let Some(scopes) = scopes {
            url.push_str("&scopes=");
            url.push_str(scopes);
        }
        Ok(url)
    }

    async fn refresh_session(&self) -> Result<Option<Session>, AuthError> {
        let mut session = self.session.write().await;
        let Some(current) = session.take() else {
            return Ok(None);
        };
        let refreshed = Self::issue(current.user);
        *session = Some(refreshed.clone());
        Ok(Some(refreshed))
    }
}
