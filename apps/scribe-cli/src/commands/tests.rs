use clap::Parser;

use super::*;
use crate::Cli;
use crate::config::AppConfig;
use crate::demo::{DEMO_EMAIL, DEMO_PASSWORD};

async fn demo_state() -> AppState {
    let config = AppConfig {
        site_url: "http://localhost:5173".to_string(),
        auth_home: "/dashboard".to_string(),
        demo_data: true,
        #[cfg(feature = "supabase")]
        supabase: None,
    };
    AppState::new(&config).await
}

fn parse(args: &[&str]) -> Command {
    let mut argv = vec!["scribe"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap().command
}

async fn exec(state: &AppState, args: &[&str]) -> Output {
    run(state, parse(args)).await.unwrap()
}

#[tokio::test]
async fn test_published_listing() {
    let state = demo_state().await;
    assert_eq!(state.backend, "memory");

    let output = exec(&state, &["posts", "list", "--published"]).await;
    assert!(output.ok);
    let posts = output.body["data"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Welcome to Scribe");
    assert!(output.body.get("error").is_none());
}

#[tokio::test]
async fn test_show_by_slug_counts() {
    let state = demo_state().await;
    let output = exec(&state, &["posts", "show", "welcome-to-scribe"]).await;

    assert_eq!(output.body["data"]["comment_count"], 2);
    assert_eq!(output.body["data"]["like_count"], 1);
    assert_eq!(output.body["data"]["author"]["full_name"], "Demo Author");
}

#[tokio::test]
async fn test_missing_post_is_error_envelope() {
    let state = demo_state().await;
    let output = exec(&state, &["posts", "get", "nope"]).await;

    assert!(!output.ok);
    assert_eq!(output.body["error"]["name"], "Error");
    assert_eq!(output.body["error"]["message"], "Blog not found");
}

#[tokio::test]
async fn test_thread_output() {
    let state = demo_state().await;
    let output = exec(&state, &["comments", "list", "post-welcome", "--thread"]).await;

    let entries = output.body["data"].as_array().unwrap();
    let depths: Vec<_> = entries.iter().map(|e| e["depth"].as_u64().unwrap()).collect();
    assert_eq!(depths, [0, 1]);
    assert_eq!(entries[1]["comment"]["content"], "Thanks for reading.");
}

#[tokio::test]
async fn test_like_needs_a_user() {
    let state = demo_state().await;
    let output = exec(&state, &["likes", "toggle", "post-welcome"]).await;

    assert!(!output.ok);
    assert_eq!(output.body["error"]["name"], "AuthError");
    assert_eq!(output.body["error"]["message"], "No user found");
}

#[tokio::test]
async fn test_signed_in_user_acts() {
    let state = demo_state().await;
    let login = exec(
        &state,
        &["auth", "login", "--email", DEMO_EMAIL, "--password", DEMO_PASSWORD],
    )
    .await;
    assert!(login.ok);

    let toggled = exec(&state, &["likes", "toggle", "post-welcome"]).await;
    assert_eq!(toggled.body["data"]["liked"], true);

    let created = exec(
        &state,
        &["posts", "create", "--title", "From the CLI", "--content", "Hi", "--publish"],
    )
    .await;
    assert!(created.ok);
    assert_eq!(created.body["data"]["slug"], "from-the-cli");
    assert_eq!(created.body["data"]["status"], "published");

    let whoami = exec(&state, &["auth", "whoami"]).await;
    assert_eq!(created.body["data"]["author_id"], whoami.body["data"]["id"]);
}

#[tokio::test]
async fn test_navigation_decisions() {
    let state = demo_state().await;

    let denied = exec(&state, &["navigate", "/dashboard/stats"]).await;
    assert_eq!(denied.body["data"]["route"], "dashboard-stats");
    assert_eq!(denied.body["data"]["decision"]["outcome"], "redirect_login");
    assert_eq!(
        denied.body["data"]["decision"]["location"],
        "/login?redirect=%2Fdashboard%2Fstats"
    );

    exec(
        &state,
        &["auth", "login", "--email", DEMO_EMAIL, "--password", DEMO_PASSWORD],
    )
    .await;
    let bounced = exec(&state, &["navigate", "/login"]).await;
    assert_eq!(bounced.body["data"]["decision"]["outcome"], "redirect_home");
    assert_eq!(bounced.body["data"]["decision"]["location"], "/dashboard");
}

#[tokio::test]
async fn test_routes_listing() {
    let state = demo_state().await;
    let output = exec(&state, &["routes"]).await;
    assert_eq!(output.body["data"].as_array().unwrap().len(), 15);
}

#[test]
fn test_status_and_provider_parsing() {
    assert!(Cli::try_parse_from(["scribe", "posts", "create", "--title", "t", "--content", "c", "--status", "bogus"]).is_err());
    assert!(matches!(
        parse(&["posts", "create", "--title", "t", "--content", "c", "--status", "Scheduled"]),
        Command::Posts(_)
    ));
    assert!(Cli::try_parse_from(["scribe", "auth", "oauth", "myspace"]).is_err());
    assert!(matches!(parse(&["auth", "oauth", "GitHub"]), Command::Auth(_)));
}
