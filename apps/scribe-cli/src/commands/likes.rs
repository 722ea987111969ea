use clap::{Args, Subcommand};
use serde_json::json;

use scribe_shared::dto::LikeParams;

use super::{Output, user_or_current};
use crate::state::AppState;

#[derive(Args, Debug)]
pub struct LikesCommand {
    #[command(subcommand)]
    pub command: LikesSubcommand,

    /// Acting user; defaults to the signed-in user
    #[arg(long, global = true)]
    pub user: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum LikesSubcommand {
    /// Whether the user likes the post
    Status { blog_id: String },
    Add { blog_id: String },
    Remove { blog_id: String },
    /// Flip the like and report the new state
    Toggle { blog_id: String },
}

impl LikesSubcommand {
    fn blog_id(&self) -> &str {
        match self {
            Self::Status { blog_id }
            | Self::Add { blog_id }
            | Self::Remove { blog_id }
            | Self::Toggle { blog_id } => blog_id,
        }
    }
}

pub async fn run(state: &AppState, cmd: LikesCommand) -> anyhow::Result<Output> {
    let user_id = match user_or_current(state, cmd.user).await {
        Ok(id) => id,
        Err(e) => return Output::envelope::<()>(Err(e)),
    };
    let params = LikeParams {
        blog_id: cmd.command.blog_id().to_string(),
        user_id,
    };

    let likes = &state.likes;
    match cmd.command {
        LikesSubcommand::Status { .. } => Output::envelope(
            likes
                .find_like(&params)
                .await
                .map(|like| json!({ "liked": like.is_some(), "like": like })),
        ),
        LikesSubcommand::Add { .. } => Output::envelope(likes.like(&params).await),
        LikesSubcommand::Remove { .. } => Output::envelope(likes.unlike(&params).await),
        LikesSubcommand::Toggle { .. } => Output::envelope(
            likes
                .toggle(&params)
                .await
                .map(|liked| json!({ "liked": liked })),
        ),
    }
}
