//! Test doubles for the ports.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use scribe_shared::dto::UserUpdate;

use crate::domain::{OAuthProvider, Session, SignUp, User};
use crate::error::DataError;
use crate::ports::{AuthError, AuthProvider, DataStore};
use crate::query::{Filter, Select};

pub const AUTHOR_ID: &str = "0b7f3c5e-8a1d-4c3e-9f2a-6d5b4a3c2e1f";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Select(Select),
    Insert {
        table: String,
        row: Value,
    },
    Update {
        table: String,
        patch: Value,
        filters: Vec<Filter>,
    },
    Delete {
        table: String,
        filters: Vec<Filter>,
    },
}

/// Store that replays scripted responses in order and records every call.
/// Once the script runs out, calls succeed with no rows.
#[derive(Default)]
pub struct RecordingStore {
    responses: Mutex<VecDeque<Result<Vec<Value>, DataError>>>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, rows: Vec<Value>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(rows));
        self
    }

    pub fn fail(self, error: DataError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: Call) -> Result<Vec<Value>, DataError> {
        self.calls.lock().unwrap().push(call);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl DataStore for RecordingStore {
    async fn select(&self, query: &Select) -> Result<Vec<Value>, DataError> {
        self.record(Call::Select(query.clone()))
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, DataError> {
        self.record(Call::Insert {
            table: table.to_string(),
            row,
        })
    }

    async fn update(
        &self,
        table: &str,
        patch: Value,
        filters: &[Filter],
    ) -> Result<Vec<Value>, DataError> {
        self.record(Call::Update {
            table: table.to_string(),
            patch,
            filters: filters.to_vec(),
        })
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), DataError> {
        self.record(Call::Delete {
            table: table.to_string(),
            filters: filters.to_vec(),
        })
        .map(|_| ())
    }
}

pub fn post_row(id: &str) -> Value {
    json!({
        "id": id,
        "title": "Hello",
        "main_content": "Body",
        "slug": "hello",
        "author_id": AUTHOR_ID,
        "is_published": false,
        "status": "draft",
        "published_at": null,
        "created_at": "2024-03-01T10:00:00+00:00",
        "updated_at": "2024-03-01T10:00:00+00:00"
    })
}

pub fn comment_row(id: &str, parent: Option<&str>) -> Value {
    json!({
        "id": id,
        "blog_id": "p1",
        "user_id": "u1",
        "content": format!("comment {id}"),
        "parent_comment_id": parent,
        "created_at": "2024-03-01T10:00:00+00:00"
    })
}

pub fn like_row(user_id: &str) -> Value {
    json!({
        "blog_id": "p1",
        "user_id": user_id,
        "created_at": "2024-03-01T10:00:00+00:00"
    })
}

pub fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        email: Some(format!("{id}@example.com")),
        user_metadata: Value::Null,
        identities: Some(vec![crate::domain::Identity {
            id: Some(id.to_string()),
            provider: "email".to_string(),
        }]),
        created_at: None,
    }
}

pub fn session(user_id: &str) -> Session {
    Session {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        token_type: "bearer".to_string(),
        expires_in: Some(3600),
        expires_at: None,
        user: user(user_id),
    }
}

/// Auth backend with fixed answers. `failure`, when set, is returned by every
/// call.
pub struct StubAuth {
    pub session: Option<Session>,
    pub user: Option<User>,
    pub sign_up: SignUp,
    pub failure: Option<AuthError>,
    pub calls: Mutex<Vec<String>>,
}

impl StubAuth {
    pub fn signed_out() -> Self {
        Self {
            session: None,
            user: None,
            sign_up: SignUp {
                user: Some(user("new")),
                session: None,
            },
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn signed_in(user_id: &str) -> Self {
        Self {
            session: Some(session(user_id)),
            user: Some(user(user_id)),
            ..Self::signed_out()
        }
    }

    pub fn failing(error: AuthError) -> Self {
        Self {
            failure: Some(error),
            ..Self::signed_out()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer<T>(&self, call: impl Into<String>, value: T) -> Result<T, AuthError> {
        self.calls.lock().unwrap().push(call.into());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(value),
        }
    }
}

#[async_trait]
impl AuthProvider for StubAuth {
    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<Session, AuthError> {
        self.answer(format!("sign_in {email}"), session("u1"))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.answer("sign_out", ())
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _metadata: &Value,
        redirect_to: &str,
    ) -> Result<SignUp, AuthError> {
        self.answer(format!("sign_up {email} {redirect_to}"), self.sign_up.clone())
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), AuthError> {
        self.answer(format!("recover {email} {redirect_to}"), ())
    }

    async fn current_user(&self) -> Result<Option<User>, AuthError> {
        self.answer("current_user", self.user.clone())
    }

    async fn update_user(&self, update: &UserUpdate) -> Result<User, AuthError> {
        let mut updated = self.user.clone().ok_or(AuthError::NoSession)?;
        if let Some(email) = &update.email {
            updated.email = Some(email.clone());
        }
        self.answer("update_user", updated)
    }

    async fn admin_delete_user(&self, user_id: &str) -> Result<(), AuthError> {
        self.answer(format!("admin_delete {user_id}"), ())
    }

    async fn sign_in_with_otp(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        self.answer(format!("otp {email} {redirect_to}"), ())
    }

    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        self.answer("current_session", self.session.clone())
    }

    async fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        scopes: Option<&str>,
    ) -> Result<String, AuthError> {
        let url = format!(
            "https://auth.test/authorize?provider={provider}&redirect_to={redirect_to}&scopes={}",
            scopes.unwrap_or("")
        );
        self.answer(format!("authorize {provider}"), url)
    }

    async fn refresh_session(&self) -> Result<Option<Session>, AuthError> {
        self.answer("refresh_session", self.session.clone())
    }
}
