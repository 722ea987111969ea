use clap::{Args, Subcommand};
use serde_json::json;

use scribe_core::domain::OAuthProvider;
use scribe_shared::dto::{LoginRequest, RegisterRequest, UserUpdate};

use super::{Output, json_arg};
use crate::state::AppState;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// JSON object stored as user metadata
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Send a password reset email
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    /// Send a one-time sign-in link
    MagicLink {
        #[arg(long)]
        email: String,
    },
    /// Print the signed-in user
    Whoami,
    /// Print the current session
    Session,
    /// Whether anyone is signed in
    Status,
    Refresh,
    /// Change the signed-in user's email, password or metadata
    Update {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// JSON object merged into user metadata
        #[arg(long)]
        data: Option<String>,
    },
    /// Delete the signed-in user's account
    DeleteAccount,
    /// Print the URL that starts a social login
    Oauth { provider: OAuthProvider },
}

pub async fn run(state: &AppState, command: AuthSubcommand) -> anyhow::Result<Output> {
    let auth = &state.auth;
    match command {
        AuthSubcommand::Login { email, password } => {
            let request = LoginRequest { email, password };
            Output::envelope(auth.login(&request).await)
        }
        AuthSubcommand::Logout => Output::envelope(auth.logout().await),
        AuthSubcommand::Register {
            email,
            password,
            metadata,
        } => {
            let request = RegisterRequest {
                email,
                password,
                metadata: metadata.as_deref().map(json_arg).unwrap_or_default(),
            };
            Output::envelope(auth.register(&request).await)
        }
        AuthSubcommand::ResetPassword { email } => {
            Output::envelope(auth.reset_password(&email).await)
        }
        AuthSubcommand::MagicLink { email } => Output::envelope(auth.send_magic_link(&email).await),
        AuthSubcommand::Whoami => Output::envelope(auth.get_user().await),
        AuthSubcommand::Session => Output::envelope(auth.get_session().await),
        AuthSubcommand::Status => Output::envelope::<serde_json::Value>(Ok(
            json!({ "authenticated": auth.is_authenticated().await }),
        )),
        AuthSubcommand::Refresh => Output::envelope(auth.refresh_session().await),
        AuthSubcommand::Update {
            email,
            password,
            data,
        } => {
            let update = UserUpdate {
                email,
                password,
                data: data.as_deref().map(json_arg),
            };
            Output::envelope(auth.update_user(&update).await)
        }
        AuthSubcommand::DeleteAccount => Output::envelope(auth.delete_user().await),
        AuthSubcommand::Oauth { provider } => Output::envelope(
            auth.login_with_social(provider)
                .await
                .map(|url| json!({ "provider": provider, "url": url })),
        ),
    }
}
