//! Sample content for the in-memory backend, so a fresh run has something to
//! list.

use serde_json::json;

use scribe_core::schema;
use scribe_infra::{InMemoryAuth, InMemoryDataStore};

pub const DEMO_EMAIL: &str = "demo@scribe.dev";
pub const DEMO_PASSWORD: &str = "scribe-demo";

const DEMO_USER_ID: &str = "3f8a9c1e-2b4d-4e6f-8a1b-9c2d3e4f5a6b";
const READER_ID: &str = "7d6c5b4a-3e2f-4a1b-9c8d-0e1f2a3b4c5d";

pub async fn seed(auth: &InMemoryAuth, store: &InMemoryDataStore) {
    auth.add_account(
        DEMO_USER_ID,
        DEMO_EMAIL,
        DEMO_PASSWORD,
        json!({ "full_name": "Demo Author" }),
    )
    .await;

    store
        .seed(
            schema::PROFILES,
            vec![
                json!({ "id": DEMO_USER_ID, "full_name": "Demo Author", "avatar_url": null }),
                json!({ "id": READER_ID, "full_name": "Curious Reader", "avatar_url": null }),
            ],
        )
        .await;
    store
        .seed(
            schema::CATEGORY,
            vec![
                json!({ "id": "engineering", "name": "Engineering", "description": "How things are built", "created_at": "2024-01-01T00:00:00Z" }),
                json!({ "id": "notes", "name": "Notes", "description": null, "created_at": "2024-01-01T00:00:00Z" }),
            ],
        )
        .await;
    store
        .seed(
            schema::TAGS,
            vec![json!({ "id": "rust", "name": "Rust" })],
        )
        .await;
    store
        .seed(
            schema::BLOGS,
            vec![
                json!({
                    "id": "post-welcome",
                    "title": "Welcome to Scribe",
                    "main_content": "A first post, published.",
                    "excerpt": "A first post",
                    "slug": "welcome-to-scribe",
                    "author_id": DEMO_USER_ID,
                    "category_id": "engineering",
                    "reading_time_minutes": 1,
                    "is_published": true,
                    "status": "published",
                    "published_at": "2024-02-01T09:00:00Z",
                    "created_at": "2024-02-01T08:00:00Z",
                }),
                json!({
                    "id": "post-draft",
                    "title": "Work in progress",
                    "main_content": "Not ready yet.",
                    "slug": "work-in-progress",
                    "author_id": DEMO_USER_ID,
                    "category_id": "notes",
                    "reading_time_minutes": 0,
                    "is_published": false,
                    "status": "draft",
                    "published_at": null,
                    "created_at": "2024-02-03T08:00:00Z",
                }),
            ],
        )
        .await;
    store
        .seed(
            schema::BLOG_TAGS,
            vec![json!({ "blog_id": "post-welcome", "tag_id": "rust", "user_id": DEMO_USER_ID })],
        )
        .await;
    store
        .seed(
            schema::COMMENTS,
            vec![
                json!({
                    "id": "comment-1",
                    "blog_id": "post-welcome",
                    "user_id": READER_ID,
                    "content": "Great start!",
                    "parent_comment_id": null,
                    "created_at": "2024-02-02T10:00:00Z",
                }),
                json!({
                    "id": "comment-2",
                    "blog_id": "post-welcome",
                    "user_id": DEMO_USER_ID,
                    "content": "Thanks for reading.",
                    "parent_comment_id": "comment-1",
                    "created_at": "2024-02-02T11:00:00Z",
                }),
            ],
        )
        .await;
    store
        .seed(
            schema::LIKES,
            vec![json!({ "blog_id": "post-welcome", "user_id": READER_ID, "created_at": "2024-02-02T12:00:00Z" })],
        )
        .await;

    tracing::debug!("Seeded demo content");
}
