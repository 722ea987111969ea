use clap::{Args, Subcommand};
use serde_json::json;

use scribe_shared::dto::CommentParams;

use super::{Output, user_or_current};
use crate::state::AppState;

#[derive(Args, Debug)]
pub struct CommentsCommand {
    #[command(subcommand)]
    pub command: CommentsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CommentsSubcommand {
    /// Comments on a post, oldest first
    List {
        blog_id: String,
        /// Print as an indented reply tree
        #[arg(long)]
        thread: bool,
    },
    Add {
        blog_id: String,
        #[arg(long)]
        content: String,
        /// Defaults to the signed-in user
        #[arg(long)]
        user: Option<String>,
        /// Id of the comment being replied to
        #[arg(long)]
        reply_to: Option<String>,
    },
}

pub async fn run(state: &AppState, command: CommentsSubcommand) -> anyhow::Result<Output> {
    match command {
        CommentsSubcommand::List {
            blog_id,
            thread: false,
        } => Output::envelope(state.comments.list_comments(&blog_id).await),
        CommentsSubcommand::List {
            blog_id,
            thread: true,
        } => {
            let result = state.comments.thread(&blog_id).await.map(|thread| {
                thread
                    .walk()
                    .into_iter()
                    .map(|(depth, comment)| json!({ "depth": depth, "comment": comment }))
                    .collect::<Vec<_>>()
            });
            Output::envelope(result)
        }
        CommentsSubcommand::Add {
            blog_id,
            content,
            user,
            reply_to,
        } => {
            let user_id = match user_or_current(state, user).await {
                Ok(id) => id,
                Err(e) => return Output::envelope::<()>(Err(e)),
            };
            let params = CommentParams {
                blog_id,
                user_id,
                content,
                parent_comment_id: reply_to,
            };
            Output::envelope(state.comments.add_comment(params).await)
        }
    }
}
