use serde::{Deserialize, Serialize};

/// A free-form tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

/// Association row linking a tag to a post and the user who applied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTag {
    pub blog_id: String,
    pub tag_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub tag: Option<Tag>,
}
