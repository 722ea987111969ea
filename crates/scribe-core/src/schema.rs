//! Table names and the nested shapes the services request.

use crate::query::Selection;

pub const BLOGS: &str = "blogs";
pub const COMMENTS: &str = "comments";
pub const LIKES: &str = "likes";
pub const CATEGORY: &str = "category";
pub const BLOG_TAGS: &str = "blog_tags";
pub const TAGS: &str = "tags";
pub const PROFILES: &str = "profiles";

fn with_user() -> Selection {
    Selection::all().belongs_to("user", "user_id", PROFILES, Selection::all())
}

/// Post with author, threaded comments and likes (each with their author),
/// tags and category.
pub fn post_detail() -> Selection {
    Selection::all()
        .belongs_to("author", "author_id", PROFILES, Selection::all())
        .has_many("comments", COMMENTS, "blog_id", with_user())
        .has_many("likes", LIKES, "blog_id", with_user())
        .has_many(
            "blog_tags",
            BLOG_TAGS,
            "blog_id",
            Selection::all().belongs_to("tag", "tag_id", TAGS, Selection::all()),
        )
        .belongs_to("category", "category_id", CATEGORY, Selection::all())
}

/// Same as `post_detail` but the author is trimmed to public fields.
pub fn post_by_slug() -> Selection {
    Selection::all()
        .belongs_to(
            "author",
            "author_id",
            PROFILES,
            Selection::columns(&["id", "full_name", "avatar_url"]),
        )
        .has_many("comments", COMMENTS, "blog_id", with_user())
        .has_many("likes", LIKES, "blog_id", with_user())
        .has_many(
            "blog_tags",
            BLOG_TAGS,
            "blog_id",
            Selection::all().belongs_to("tag", "tag_id", TAGS, Selection::all()),
        )
        .belongs_to("category", "category_id", CATEGORY, Selection::all())
}

/// Listing shape: author plus raw comment and like rows for counting.
pub fn post_summary() -> Selection {
    Selection::all()
        .belongs_to("author", "author_id", PROFILES, Selection::all())
        .has_many("comments", COMMENTS, "blog_id", Selection::all())
        .has_many("likes", LIKES, "blog_id", Selection::all())
}

pub fn comment_with_author() -> Selection {
    with_user()
}
