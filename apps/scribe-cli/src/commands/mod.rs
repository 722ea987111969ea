//! Subcommands. Each one calls a service and prints its result envelope.

mod auth;
mod comments;
mod likes;
mod navigate;
mod posts;

use clap::Subcommand;
use serde::Serialize;
use serde_json::Value;

use scribe_core::ServiceError;
use scribe_shared::ApiResponse;

use crate::state::AppState;

pub use auth::AuthCommand;
pub use comments::CommentsCommand;
pub use likes::LikesCommand;
pub use posts::PostsCommand;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Blog posts
    Posts(PostsCommand),
    /// Comments and reply threads
    Comments(CommentsCommand),
    /// Likes on posts
    Likes(LikesCommand),
    /// List categories
    Categories,
    /// Sign-in, accounts and sessions
    Auth(AuthCommand),
    /// Run the session guard for a navigation to PATH
    Navigate { path: String },
    /// List the named routes and their auth attributes
    Routes,
}

/// A finished command: the printed envelope and whether it carries data.
#[derive(Debug)]
pub struct Output {
    pub body: Value,
    pub ok: bool,
}

impl Output {
    pub fn envelope<T: Serialize>(result: Result<T, ServiceError>) -> anyhow::Result<Self> {
        let response = ApiResponse::from(result);
        Ok(Self {
            ok: response.is_ok(),
            body: serde_json::to_value(&response)?,
        })
    }
}

pub async fn run(state: &AppState, command: Command) -> anyhow::Result<Output> {
    match command {
        Command::Posts(cmd) => posts::run(state, cmd.command).await,
        Command::Comments(cmd) => comments::run(state, cmd.command).await,
        Command::Likes(cmd) => likes::run(state, cmd).await,
        Command::Categories => Output::envelope(state.categories.list_categories().await),
        Command::Auth(cmd) => auth::run(state, cmd.command).await,
        Command::Navigate { path } => navigate::check(state, &path).await,
        Command::Routes => navigate::routes(state),
    }
}

/// The given user id, or the signed-in user's.
async fn user_or_current(state: &AppState, user: Option<String>) -> Result<String, ServiceError> {
    match user {
        Some(id) => Ok(id),
        None => state.auth.get_user().await.map(|u| u.id),
    }
}

/// Parse a JSON argument; anything that isn't JSON is taken as a plain string.
fn json_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests;
