//! # Scribe CLI
//!
//! Command-line front-end for the Scribe blog client. Every command prints a
//! `{data}` or `{error}` JSON envelope on stdout.

use std::process::ExitCode;

use clap::Parser;
use scribe_shared::dto::LoginRequest;

mod commands;
mod config;
mod demo;
mod state;
mod telemetry;

use commands::{Command, Output};
use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[derive(Parser, Debug)]
#[command(name = "scribe", version, about = "Scribe blog client")]
struct Cli {
    /// Sign in with this email before running the command
    #[arg(long, global = true, env = "SCRIBE_EMAIL")]
    login_email: Option<String>,

    #[arg(long, global = true, env = "SCRIBE_PASSWORD", hide_env_values = true)]
    login_password: Option<String>,

    /// Print the envelope on one line
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();
    let state = AppState::new(&config).await;
    tracing::debug!(backend = state.backend, "Backend selected");

    if let (Some(email), Some(password)) = (cli.login_email, cli.login_password) {
        let request = LoginRequest { email, password };
        if let Err(e) = state.auth.login(&request).await {
            print(&Output::envelope::<()>(Err(e))?, cli.compact)?;
            return Ok(ExitCode::FAILURE);
        }
    }

    let output = commands::run(&state, cli.command).await?;
    print(&output, cli.compact)?;

    Ok(if output.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print(output: &Output, compact: bool) -> anyhow::Result<()> {
    let text = if compact {
        serde_json::to_string(&output.body)?
    } else {
        serde_json::to_string_pretty(&output.body)?
    };
    println!("{text}");
    Ok(())
}
