use serde::{Deserialize, Serialize};

/// Public profile fields embedded next to posts, comments and likes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Short name some queries select instead of `full_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl AuthorSummary {
    /// `full_name` when present, otherwise `name`.
    pub fn display_name(&self) -> Option<&str> {
        self.full_name.as_deref().or(self.name.as_deref())
    }
}
