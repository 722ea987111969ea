use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AuthorSummary, Category, Comment, Like, PostStatus, PostTag};

/// Post entity - a blog post together with whatever relations the query embedded.
///
/// Relations that were not requested deserialize as empty/`None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub main_content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub cover_image_credit: Option<String>,
    #[serde(default)]
    pub reading_time_minutes: Option<u32>,

    pub author_id: String,
    #[serde(default)]
    pub author: Option<AuthorSummary>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub tag_id: Option<String>,
    #[serde(default)]
    pub blog_tags: Vec<PostTag>,

    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub likes: Vec<Like>,

    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    /// Computed from `likes` at read time, not stored.
    #[serde(default)]
    pub like_count: usize,
    /// Computed from `comments` at read time, not stored.
    #[serde(default)]
    pub comment_count: usize,
}

impl Post {
    /// Fill the denormalized counters from the embedded relation lengths.
    pub fn with_counts(mut self) -> Self {
        self.like_count = self.likes.len();
        self.comment_count = self.comments.len();
        self
    }

    /// Whether the publication fields agree with each other.
    pub fn publication_is_consistent(&self) -> bool {
        if self.is_published {
            self.status == PostStatus::Published && self.published_at.is_some()
        } else {
            self.status != PostStatus::Published && self.published_at.is_none()
        }
    }
}

/// URL slug derived from a title: lowercased alphanumeric runs joined by `-`.
/// Letters outside ASCII are kept, so the result is empty only for titles with
/// no letters or digits at all.
pub fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
