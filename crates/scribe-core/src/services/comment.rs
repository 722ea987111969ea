//! Comment service.

use std::sync::Arc;

use serde_json::json;

use scribe_shared::dto::CommentParams;

use crate::domain::{Comment, CommentThread};
use crate::error::{ServiceError, ServiceFailure};
use crate::ports::DataStore;
use crate::query::{Direction, Select};
use crate::schema::{self, COMMENTS};
use crate::validation;

use super::{decode, decode_all, expect_one, normalize, normalize_as, require};

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn DataStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Add a comment, or a reply when `parent_comment_id` is set.
    pub async fn add_comment(&self, params: CommentParams) -> Result<Comment, ServiceError> {
        async {
            require(
                validation::all_present(&[&params.blog_id, &params.user_id]),
                "Blog ID and user ID are required",
            )?;
            require(
                !validation::is_blank(&params.content),
                "Comment content is required",
            )?;

            let row = json!({
                "blog_id": params.blog_id,
                "user_id": params.user_id,
                "content": params.content,
                "parent_comment_id": params.parent_comment_id,
            });
            let rows = self.store.insert(COMMENTS, row).await?;
            Ok::<_, ServiceFailure>(decode(expect_one(rows, "No data returned from comment creation")?)?)
        }
        .await
        .map_err(|e| normalize_as("Error adding comment", e, "Failed to add comment"))
    }

    /// Comments on a post with their authors, oldest first.
    pub async fn list_comments(&self, blog_id: &str) -> Result<Vec<Comment>, ServiceError> {
        async {
            require(!validation::is_blank(blog_id), "Blog ID is required")?;
            let query = Select::from(COMMENTS)
                .select(schema::comment_with_author())
                .eq("blog_id", blog_id)
                .order("created_at", Direction::Asc);
            let rows = self.store.select(&query).await?;
            Ok::<_, ServiceFailure>(decode_all(rows)?)
        }
        .await
        .map_err(|e| normalize(&format!("Error fetching comments for blog {blog_id}"), e))
    }

    /// Comments on a post indexed into reply threads.
    pub async fn thread(&self, blog_id: &str) -> Result<CommentThread, ServiceError> {
        self.list_comments(blog_id).await.map(CommentThread::build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use crate::query::Filter;
    use crate::services::testing::{Call, RecordingStore, comment_row};

    fn params(content: &str, parent: Option<&str>) -> CommentParams {
        CommentParams {
            blog_id: "p1".to_string(),
            user_id: "u1".to_string(),
            content: content.to_string(),
            parent_comment_id: parent.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_add_reply_sends_parent() {
        let store = Arc::new(RecordingStore::new().respond(vec![comment_row("c2", Some("c1"))]));
        let service = CommentService::new(store.clone());

        let comment = service.add_comment(params("hi", Some("c1"))).await.unwrap();

        assert!(comment.is_reply());
        let calls = store.calls();
        let Call::Insert { table, row } = &calls[0] else {
            panic!("expected insert");
        };
        assert_eq!(table, "comments");
        assert_eq!(row["parent_comment_id"], json!("c1"));
    }

    #[tokio::test]
    async fn test_top_level_comment_has_null_parent() {
        let store = Arc::new(RecordingStore::new().respond(vec![comment_row("c1", None)]));
        let service = CommentService::new(store.clone());

        service.add_comment(params("hi", None)).await.unwrap();

        let calls = store.calls();
        let Call::Insert { row, .. } = &calls[0] else {
            panic!("expected insert");
        };
        assert!(row["parent_comment_id"].is_null());
    }

    #[tokio::test]
    async fn test_blank_content_is_rejected_locally() {
        let store = Arc::new(RecordingStore::new());
        let service = CommentService::new(store.clone());

        let err = service.add_comment(params("   ", None)).await.unwrap_err();

        assert_eq!(err.message, "Comment content is required");
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_uses_fixed_message() {
        let store = Arc::new(
            RecordingStore::new().fail(DataError::Constraint("fk violation".to_string())),
        );
        let service = CommentService::new(store);

        let err = service.add_comment(params("hi", None)).await.unwrap_err();

        assert_eq!(err.message, "Failed to add comment");
    }

    #[tokio::test]
    async fn test_thread_builds_reply_tree() {
        let store = Arc::new(RecordingStore::new().respond(vec![
            comment_row("c1", None),
            comment_row("c2", Some("c1")),
            comment_row("c3", None),
        ]));
        let service = CommentService::new(store.clone());

        let thread = service.thread("p1").await.unwrap();

        assert_eq!(thread.roots().count(), 2);
        assert_eq!(thread.replies("c1").count(), 1);
        let calls = store.calls();
        let Call::Select(query) = &calls[0] else {
            panic!("expected select");
        };
        assert_eq!(query.filters, vec![Filter::eq("blog_id", "p1")]);
    }
}
