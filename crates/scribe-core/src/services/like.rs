//! Like service.

use std::sync::Arc;

use serde_json::json;

use scribe_shared::dto::LikeParams;

use crate::domain::Like;
use crate::error::{ServiceError, ServiceFailure};
use crate::ports::DataStore;
use crate::query::{self, Filter, Select};
use crate::schema::LIKES;
use crate::validation;

use super::{decode, expect_one, normalize_as, require};

/// Likes are keyed by `(blog_id, user_id)`. Uniqueness of that pair is enforced
/// by the backend: a second `like` for the same pair fails.
#[derive(Clone)]
pub struct LikeService {
    store: Arc<dyn DataStore>,
}

impl LikeService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// The user's like on a post, if there is one.
    pub async fn find_like(&self, params: &LikeParams) -> Result<Option<Like>, ServiceError> {
        async {
            check(params)?;
            let query = Select::from(LIKES)
                .eq("blog_id", params.blog_id.as_str())
                .eq("user_id", params.user_id.as_str());
            let row = query::maybe_single(self.store.select(&query).await?)?;
            Ok::<_, ServiceFailure>(row.map(decode::<Like>).transpose()?)
        }
        .await
        .map_err(|e| normalize_as("Error checking user like", e, "Failed to check user like"))
    }

    pub async fn like(&self, params: &LikeParams) -> Result<Like, ServiceError> {
        async {
            check(params)?;
            let row = json!({ "blog_id": params.blog_id, "user_id": params.user_id });
            let rows = self.store.insert(LIKES, row).await?;
            Ok::<_, ServiceFailure>(decode(expect_one(rows, "No data returned from like")?)?)
        }
        .await
        .map_err(|e| normalize_as("Error liking blog", e, "Failed to like blog"))
    }

    pub async fn unlike(&self, params: &LikeParams) -> Result<(), ServiceError> {
        async {
            check(params)?;
            self.store.delete(LIKES, &filters(params)).await?;
            Ok::<_, ServiceFailure>(())
        }
        .await
        .map_err(|e| normalize_as("Error unliking blog", e, "Failed to unlike blog"))
    }

    /// Flip the user's like and return whether the post is now liked.
    ///
    /// Two round trips (check, then write); not atomic.
    pub async fn toggle(&self, params: &LikeParams) -> Result<bool, ServiceError> {
        if self.find_like(params).await?.is_some() {
            self.unlike(params).await?;
            Ok(false)
        } else {
            self.like(params).await?;
            Ok(true)
        }
    }
}

fn check(params: &LikeParams) -> Result<(), ServiceFailure> {
    require(
        validation::all_present(&[&params.blog_id, &params.user_id]),
        "Blog ID and user ID are required",
    )
}

fn filters(params: &LikeParams) -> [Filter; 2] {
    [
        Filter::eq("blog_id", params.blog_id.as_str()),
        Filter::eq("user_id", params.user_id.as_str()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use crate::services::testing::{Call, RecordingStore, like_row};

    fn params() -> LikeParams {
        LikeParams {
            blog_id: "p1".to_string(),
            user_id: "u1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_like_absent() {
        let store = Arc::new(RecordingStore::new().respond(vec![]));
        let service = LikeService::new(store);

        assert_eq!(service.find_like(&params()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_like_present() {
        let store = Arc::new(RecordingStore::new().respond(vec![like_row("u1")]));
        let service = LikeService::new(store);

        let like = service.find_like(&params()).await.unwrap().unwrap();
        assert_eq!(like.user_id, "u1");
    }

    #[tokio::test]
    async fn test_duplicate_like_surfaces_normalized_failure() {
        let store = Arc::new(
            RecordingStore::new()
                .respond(vec![like_row("u1")])
                .fail(DataError::Constraint(
                    "duplicate key value violates unique constraint \"likes_pkey\"".to_string(),
                )),
        );
        let service = LikeService::new(store.clone());

        service.like(&params()).await.unwrap();
        let err = service.like(&params()).await.unwrap_err();

        assert_eq!(err.message, "Failed to like blog");
        assert_eq!(store.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unlike_filters_by_pair() {
        let store = Arc::new(RecordingStore::new());
        let service = LikeService::new(store.clone());

        service.unlike(&params()).await.unwrap();

        assert_eq!(
            store.calls(),
            vec![Call::Delete {
                table: "likes".to_string(),
                filters: filters(&params()).to_vec(),
            }]
        );
    }

    #[tokio::test]
    async fn test_toggle_likes_then_unlikes() {
        let store = Arc::new(
            RecordingStore::new()
                .respond(vec![])
                .respond(vec![like_row("u1")])
                .respond(vec![like_row("u1")]),
        );
        let service = LikeService::new(store.clone());

        assert!(service.toggle(&params()).await.unwrap());
        assert!(!service.toggle(&params()).await.unwrap());
        assert_eq!(store.call_count(), 4);
        assert!(matches!(store.calls()[3], Call::Delete { .. }));
    }

    #[tokio::test]
    async fn test_missing_ids_rejected_before_call() {
        let store = Arc::new(RecordingStore::new());
        let service = LikeService::new(store.clone());
        let params = LikeParams {
            blog_id: String::new(),
            user_id: "u1".to_string(),
        };

        let err = service.like(&params).await.unwrap_err();

        assert_eq!(err.message, "Blog ID and user ID are required");
        assert_eq!(store.call_count(), 0);
    }
}
