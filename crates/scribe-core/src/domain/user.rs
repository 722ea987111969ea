use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Account as reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
    /// Linked sign-in identities. An empty list on sign-up means the email is
    /// already registered.
    #[serde(default)]
    pub identities: Option<Vec<Identity>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn has_no_identities(&self) -> bool {
        self.identities.as_ref().is_some_and(Vec::is_empty)
    }
}

/// One sign-in method linked to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub id: Option<String>,
    pub provider: String,
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix timestamp (seconds) after which the access token is invalid.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now.timestamp())
    }
}

/// Outcome of a sign-up. `session` is absent when the backend requires email
/// confirmation first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUp {
    pub user: Option<User>,
    pub session: Option<Session>,
}

/// External identity vendors accepted for social login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Github,
    Google,
    Facebook,
    Twitter,
    Discord,
    Azure,
    Gitlab,
    Bitbucket,
    Apple,
}

impl OAuthProvider {
    pub const ALL: [OAuthProvider; 9] = [
        OAuthProvider::Github,
        OAuthProvider::Google,
        OAuthProvider::Facebook,
        OAuthProvider::Twitter,
        OAuthProvider::Discord,
        OAuthProvider::Azure,
        OAuthProvider::Gitlab,
        OAuthProvider::Bitbucket,
        OAuthProvider::Apple,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Github => "github",
            OAuthProvider::Google => "google",
            OAuthProvider::Facebook => "facebook",
            OAuthProvider::Twitter => "twitter",
            OAuthProvider::Discord => "discord",
            OAuthProvider::Azure => "azure",
            OAuthProvider::Gitlab => "gitlab",
            OAuthProvider::Bitbucket => "bitbucket",
            OAuthProvider::Apple => "apple",
        }
    }

    /// Extra OAuth scopes requested from the vendor.
    pub fn scopes(self) -> Option<&'static str> {
        match self {
            OAuthProvider::Github => Some("repo,user"),
            _ => None,
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| format!("unsupported provider: {s}"))
    }
}
