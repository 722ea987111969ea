//! Blog post service.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};

use scribe_shared::dto::{NewPost, PostPatch, PostStatus};

use crate::domain::{Post, slugify};
use crate::error::{DataError, ServiceError, ServiceFailure};
use crate::ports::DataStore;
use crate::query::{Direction, Filter, Select};
use crate::schema::{self, BLOGS};
use crate::validation;

use super::{decode, decode_all, expect_one, normalize, require};

/// CRUD and publication for blog posts.
#[derive(Clone)]
pub struct BlogService {
    store: Arc<dyn DataStore>,
}

impl BlogService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Every post with author, comments, likes, tags and category.
    pub async fn list_posts(&self) -> Result<Vec<Post>, ServiceError> {
        let query = Select::from(BLOGS).select(schema::post_detail());
        self.fetch_all(&query)
            .await
            .map_err(|e| normalize("Error fetching blogs", e))
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, ServiceError> {
        async {
            require(!validation::is_blank(id), "Blog ID is required")?;
            let query = Select::from(BLOGS)
                .select(schema::post_detail())
                .eq("id", id);
            self.fetch_one(&query).await
        }
        .await
        .map_err(|e| normalize(&format!("Error fetching blog with ID {id}"), e))
    }

    /// Create a post. Title, content and a v4 UUID author id are checked before
    /// anything is sent.
    pub async fn create_post(&self, post: NewPost) -> Result<Post, ServiceError> {
        async {
            require(
                validation::all_present(&[&post.title, &post.main_content, &post.author_id]),
                "Title, content, and author ID are required",
            )?;
            require(
                validation::is_uuid_v4(&post.author_id),
                "Invalid author ID format",
            )?;
            let slug = if validation::is_blank(&post.slug) {
                slugify(&post.title)
            } else {
                post.slug.trim().to_string()
            };
            require(
                !slug.is_empty(),
                "Slug is required when the title has no letters or digits",
            )?;

            let rows = self.store.insert(BLOGS, new_post_row(post, slug)?).await?;
            let row = expect_one(rows, "No data returned from blog creation")?;
            Ok::<_, ServiceFailure>(decode(row)?)
        }
        .await
        .map_err(|e| normalize("Error in create_post", e))
    }

    pub async fn update_post(&self, id: &str, patch: PostPatch) -> Result<Post, ServiceError> {
        async {
            require(!validation::is_blank(id), "Blog ID is required")?;
            require(!patch.is_empty(), "No changes to apply")?;
            let patch = serde_json::to_value(&patch).map_err(|e| DataError::Decode(e.to_string()))?;
            self.update_one(id, patch).await
        }
        .await
        .map_err(|e| normalize(&format!("Error updating blog with ID {id}"), e))
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), ServiceError> {
        async {
            require(!validation::is_blank(id), "Blog ID is required")?;
            self.store.delete(BLOGS, &[Filter::eq("id", id)]).await?;
            Ok::<_, ServiceFailure>(())
        }
        .await
        .map_err(|e| normalize(&format!("Error deleting blog with ID {id}"), e))
    }

    /// Look a post up by slug and fill `like_count` / `comment_count` from the
    /// embedded rows.
    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Post, ServiceError> {
        async {
            require(!validation::is_blank(slug), "Slug is required")?;
            let query = Select::from(BLOGS)
                .select(schema::post_by_slug())
                .eq("slug", slug);
            Ok::<_, ServiceFailure>(self.fetch_one(&query).await?.with_counts())
        }
        .await
        .map_err(|e| normalize(&format!("Error fetching blog with slug {slug}"), e))
    }

    /// Mark published, stamp `published_at` with now, in one update.
    pub async fn publish_post(&self, id: &str) -> Result<Post, ServiceError> {
        let patch = json!({
            "is_published": true,
            "published_at": Utc::now().to_rfc3339(),
            "status": PostStatus::Published,
        });
        async {
            require(!validation::is_blank(id), "Blog ID is required")?;
            self.update_one(id, patch).await
        }
        .await
        .map_err(|e| normalize("Error publishing blog", e))
    }

    /// Exact inverse of `publish_post`.
    pub async fn unpublish_post(&self, id: &str) -> Result<Post, ServiceError> {
        let patch = json!({
            "is_published": false,
            "published_at": null,
            "status": PostStatus::Draft,
        });
        async {
            require(!validation::is_blank(id), "Blog ID is required")?;
            self.update_one(id, patch).await
        }
        .await
        .map_err(|e| normalize("Error unpublishing blog", e))
    }

    /// Published posts, newest first.
    pub async fn list_published(&self) -> Result<Vec<Post>, ServiceError> {
        let query = Select::from(BLOGS)
            .select(schema::post_summary())
            .eq("is_published", true)
            .order("published_at", Direction::Desc);
        self.fetch_all(&query)
            .await
            .map_err(|e| normalize("Error fetching published blogs", e))
    }

    /// All posts in a category. An empty category is an error.
    pub async fn list_by_category(&self, category_id: &str) -> Result<Vec<Post>, ServiceError> {
        async {
            require(!validation::is_blank(category_id), "Category ID is required")?;
            let query = Select::from(BLOGS)
                .select(schema::post_summary())
                .eq("category_id", category_id);
            let posts = self.fetch_all(&query).await?;
            if posts.is_empty() {
                return Err(ServiceFailure::NotFound(
                    "No blogs found for this category".to_string(),
                ));
            }
            Ok::<_, ServiceFailure>(posts)
        }
        .await
        .map_err(|e| normalize("Error fetching blogs by category", e))
    }

    /// Published posts in a category, newest first.
    pub async fn list_published_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<Post>, ServiceError> {
        async {
            require(!validation::is_blank(category_id), "Category ID is required")?;
            let query = Select::from(BLOGS)
                .select(schema::post_summary())
                .eq("category_id", category_id)
                .eq("is_published", true)
                .order("published_at", Direction::Desc);
            self.fetch_all(&query).await
        }
        .await
        .map_err(|e| normalize("Error fetching published blogs by category", e))
    }

    async fn fetch_all(&self, query: &Select) -> Result<Vec<Post>, ServiceFailure> {
        let rows = self.store.select(query).await?;
        Ok(decode_all(rows)?)
    }

    async fn fetch_one(&self, query: &Select) -> Result<Post, ServiceFailure> {
        let rows = self.store.select(query).await?;
        Ok(decode(expect_one(rows, "Blog not found")?)?)
    }

    async fn update_one(&self, id: &str, patch: Value) -> Result<Post, ServiceFailure> {
        let rows = self
            .store
            .update(BLOGS, patch, &[Filter::eq("id", id)])
            .await?;
        Ok(decode(expect_one(rows, "Blog not found")?)?)
    }
}

/// Insert payload with defaults applied and publication fields kept consistent.
fn new_post_row(post: NewPost, slug: String) -> Result<Value, DataError> {
    let published = post.is_published.unwrap_or(false) || post.status == Some(PostStatus::Published);
    let status = match post.status {
        _ if published => PostStatus::Published,
        Some(status) => status,
        None => PostStatus::Draft,
    };
    let reading_time = post.reading_time_minutes.unwrap_or(0);

    let mut row = serde_json::to_value(&post).map_err(|e| DataError::Decode(e.to_string()))?;
    row["slug"] = json!(slug);
    row["is_published"] = json!(published);
    row["status"] = json!(status);
    row["reading_time_minutes"] = json!(reading_time);
    row["published_at"] = if published {
        json!(Utc::now().to_rfc3339())
    } else {
        Value::Null
    };
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{AUTHOR_ID, Call, RecordingStore, comment_row, like_row, post_row};

    fn service(store: &Arc<RecordingStore>) -> BlogService {
        BlogService::new(store.clone())
    }

    fn new_post() -> NewPost {
        NewPost {
            title: "Hello".to_string(),
            main_content: "Body".to_string(),
            author_id: AUTHOR_ID.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_with_empty_title_makes_no_remote_call() {
        let store = Arc::new(RecordingStore::new());
        let post = NewPost {
            title: String::new(),
            ..new_post()
        };

        let err = service(&store).create_post(post).await.unwrap_err();

        assert_eq!(err.message, "Title, content, and author ID are required");
        assert_eq!(err.name, "Error");
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_author_id() {
        let store = Arc::new(RecordingStore::new());
        let post = NewPost {
            author_id: "not-a-uuid".to_string(),
            ..new_post()
        };

        let err = service(&store).create_post(post).await.unwrap_err();

        assert_eq!(err.message, "Invalid author ID format");
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_title_without_slug_characters() {
        let store = Arc::new(RecordingStore::new());
        let post = NewPost {
            title: "???".to_string(),
            ..new_post()
        };

        let err = service(&store).create_post(post).await.unwrap_err();

        assert_eq!(err.message, "Slug is required when the title has no letters or digits");
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_derives_slug_from_non_ascii_title() {
        let store = Arc::new(RecordingStore::new().respond(vec![post_row("p1")]));
        let post = NewPost {
            title: "Привет мир".to_string(),
            ..new_post()
        };

        service(&store).create_post(post).await.unwrap();

        let calls = store.calls();
        let Call::Insert { row, .. } = &calls[0] else {
            panic!("expected insert, got {calls:?}");
        };
        assert_eq!(row["slug"], json!("привет-мир"));
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let store = Arc::new(RecordingStore::new().respond(vec![post_row("p1")]));

        let created = service(&store).create_post(new_post()).await.unwrap();
        assert_eq!(created.id, "p1");

        let calls = store.calls();
        let Call::Insert { table, row } = &calls[0] else {
            panic!("expected insert, got {calls:?}");
        };
        assert_eq!(table, "blogs");
        assert_eq!(row["is_published"], json!(false));
        assert_eq!(row["status"], json!("draft"));
        assert_eq!(row["reading_time_minutes"], json!(0));
        assert_eq!(row["cover_image"], Value::Null);
        assert_eq!(row["published_at"], Value::Null);
        assert_eq!(row["slug"], json!("hello"));
    }

    #[tokio::test]
    async fn test_create_published_post_stamps_publication() {
        let store = Arc::new(RecordingStore::new().respond(vec![post_row("p1")]));
        let post = NewPost {
            is_published: Some(true),
            ..new_post()
        };

        service(&store).create_post(post).await.unwrap();

        let calls = store.calls();
        let Call::Insert { row, .. } = &calls[0] else {
            panic!("expected insert");
        };
        assert_eq!(row["status"], json!("published"));
        assert!(row["published_at"].is_string());
    }

    #[tokio::test]
    async fn test_get_post_not_found() {
        let store = Arc::new(RecordingStore::new().respond(vec![]));

        let err = service(&store).get_post("missing").await.unwrap_err();

        assert_eq!(err.message, "Blog not found");
    }

    #[tokio::test]
    async fn test_get_post_requests_detail_shape() {
        let store = Arc::new(RecordingStore::new().respond(vec![post_row("p1")]));

        service(&store).get_post("p1").await.unwrap();

        let calls = store.calls();
        let Call::Select(query) = &calls[0] else {
            panic!("expected select");
        };
        assert_eq!(query.table, "blogs");
        assert_eq!(query.filters, vec![Filter::eq("id", "p1")]);
        assert_eq!(query.selection, schema::post_detail());
    }

    #[tokio::test]
    async fn test_remote_failure_is_normalized() {
        let store = Arc::new(RecordingStore::new().fail(DataError::Remote {
            code: Some("42501".to_string()),
            message: "permission denied for table blogs".to_string(),
        }));

        let err = service(&store).list_posts().await.unwrap_err();

        assert_eq!(err, ServiceError::new("permission denied for table blogs"));
    }

    #[tokio::test]
    async fn test_slug_lookup_counts_relations() {
        let mut row = post_row("p1");
        row["comments"] = json!([comment_row("c1", None), comment_row("c2", Some("c1")), comment_row("c3", None)]);
        row["likes"] = json!([like_row("u1"), like_row("u2")]);
        let store = Arc::new(RecordingStore::new().respond(vec![row]));

        let post = service(&store).get_post_by_slug("hello").await.unwrap();

        assert_eq!(post.comment_count, 3);
        assert_eq!(post.like_count, 2);
        assert_eq!(post.comment_count, post.comments.len());
        assert_eq!(post.like_count, post.likes.len());
    }

    #[tokio::test]
    async fn test_publish_sends_one_combined_update() {
        let mut published = post_row("p1");
        published["is_published"] = json!(true);
        published["status"] = json!("published");
        published["published_at"] = json!("2024-03-02T10:00:00+00:00");
        let store = Arc::new(RecordingStore::new().respond(vec![published]));

        let post = service(&store).publish_post("p1").await.unwrap();

        assert!(post.is_published);
        assert!(post.publication_is_consistent());
        assert_eq!(store.call_count(), 1);
        let calls = store.calls();
        let Call::Update { table, patch, filters } = &calls[0] else {
            panic!("expected update");
        };
        assert_eq!(table, "blogs");
        assert_eq!(filters, &vec![Filter::eq("id", "p1")]);
        assert_eq!(patch["is_published"], json!(true));
        assert_eq!(patch["status"], json!("published"));
        assert!(patch["published_at"].is_string());
    }

    #[tokio::test]
    async fn test_unpublish_is_inverse() {
        let store = Arc::new(RecordingStore::new().respond(vec![post_row("p1")]));

        let post = service(&store).unpublish_post("p1").await.unwrap();

        assert!(!post.is_published);
        let calls = store.calls();
        let Call::Update { patch, .. } = &calls[0] else {
            panic!("expected update");
        };
        assert_eq!(
            patch,
            &json!({ "is_published": false, "published_at": null, "status": "draft" })
        );
    }

    #[tokio::test]
    async fn test_list_published_orders_newest_first() {
        let store = Arc::new(RecordingStore::new().respond(vec![]));

        let posts = service(&store).list_published().await.unwrap();
        assert!(posts.is_empty());

        let calls = store.calls();
        let Call::Select(query) = &calls[0] else {
            panic!("expected select");
        };
        assert_eq!(query.filters, vec![Filter::eq("is_published", true)]);
        assert_eq!(query.order.as_ref().unwrap().to_postgrest(), "published_at.desc");
    }

    #[tokio::test]
    async fn test_empty_category_is_an_error() {
        let store = Arc::new(RecordingStore::new().respond(vec![]));

        let err = service(&store).list_by_category("c1").await.unwrap_err();

        assert_eq!(err.message, "No blogs found for this category");
    }

    #[tokio::test]
    async fn test_empty_published_category_is_fine() {
        let store = Arc::new(RecordingStore::new().respond(vec![]));

        let posts = service(&store).list_published_by_category("c1").await.unwrap();

        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_update_with_empty_patch_is_rejected() {
        let store = Arc::new(RecordingStore::new());

        let err = service(&store)
            .update_post("p1", PostPatch::default())
            .await
            .unwrap_err();

        assert_eq!(err.message, "No changes to apply");
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_filters_by_id() {
        let store = Arc::new(RecordingStore::new());

        service(&store).delete_post("p1").await.unwrap();

        assert_eq!(
            store.calls(),
            vec![Call::Delete {
                table: "blogs".to_string(),
                filters: vec![Filter::eq("id", "p1")],
            }]
        );
    }
}
