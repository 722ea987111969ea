use clap::{Args, Subcommand};

use scribe_shared::dto::{NewPost, PostPatch, PostStatus};

use super::{Output, user_or_current};
use crate::state::AppState;

#[derive(Args, Debug)]
pub struct PostsCommand {
    #[command(subcommand)]
    pub command: PostsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PostsSubcommand {
    /// List posts, optionally only published ones or one category
    List {
        #[arg(long)]
        published: bool,
        #[arg(long)]
        category: Option<String>,
    },
    /// Fetch a post by id
    Get { id: String },
    /// Fetch a post by slug, with like and comment counts
    Show { slug: String },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Defaults to the signed-in user
        #[arg(long)]
        author: Option<String>,
        /// Derived from the title when omitted
        #[arg(long, default_value = "")]
        slug: String,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        subtitle: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        reading_time: Option<u32>,
        #[arg(long, value_parser = parse_status)]
        status: Option<PostStatus>,
        #[arg(long)]
        publish: bool,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        subtitle: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        reading_time: Option<u32>,
    },
    Delete { id: String },
    Publish { id: String },
    Unpublish { id: String },
}

fn parse_status(raw: &str) -> Result<PostStatus, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_ascii_lowercase()))
        .map_err(|_| format!("unknown status `{raw}` (draft, published, scheduled)"))
}

pub async fn run(state: &AppState, command: PostsSubcommand) -> anyhow::Result<Output> {
    let blogs = &state.blogs;
    match command {
        PostsSubcommand::List {
            published,
            category,
        } => {
            let result = match (published, category) {
                (false, None) => blogs.list_posts().await,
                (true, None) => blogs.list_published().await,
                (false, Some(id)) => blogs.list_by_category(&id).await,
                (true, Some(id)) => blogs.list_published_by_category(&id).await,
            };
            Output::envelope(result)
        }
        PostsSubcommand::Get { id } => Output::envelope(blogs.get_post(&id).await),
        PostsSubcommand::Show { slug } => Output::envelope(blogs.get_post_by_slug(&slug).await),
        PostsSubcommand::Create {
            title,
            content,
            author,
            slug,
            excerpt,
            subtitle,
            category,
            reading_time,
            status,
            publish,
        } => {
            let author_id = match user_or_current(state, author).await {
                Ok(id) => id,
                Err(e) => return Output::envelope::<()>(Err(e)),
            };
            let post = NewPost {
                title,
                main_content: content,
                author_id,
                slug,
                excerpt,
                subtitle,
                category_id: category,
                reading_time_minutes: reading_time,
                is_published: publish.then_some(true),
                status,
                ..NewPost::default()
            };
            Output::envelope(blogs.create_post(post).await)
        }
        PostsSubcommand::Update {
            id,
            title,
            content,
            excerpt,
            subtitle,
            slug,
            category,
            reading_time,
        } => {
            let patch = PostPatch {
                title,
                main_content: content,
                excerpt,
                subtitle,
                slug,
                category_id: category,
                reading_time_minutes: reading_time,
                ..PostPatch::default()
            };
            Output::envelope(blogs.update_post(&id, patch).await)
        }
        PostsSubcommand::Delete { id } => Output::envelope(blogs.delete_post(&id).await),
        PostsSubcommand::Publish { id } => Output::envelope(blogs.publish_post(&id).await),
        PostsSubcommand::Unpublish { id } => Output::envelope(blogs.unpublish_post(&id).await),
    }
}
