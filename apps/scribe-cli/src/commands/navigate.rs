use serde_json::json;

use scribe_core::GuardState;
use scribe_core::ServiceError;

use super::Output;
use crate::state::AppState;

pub async fn check(state: &AppState, path: &str) -> anyhow::Result<Output> {
    let route = state.guard.routes().resolve(path);
    let decision = match state.guard.check(path).await {
        GuardState::Allowed => json!({ "outcome": "allowed" }),
        GuardState::RedirectLogin { location } => {
            json!({ "outcome": "redirect_login", "location": location })
        }
        GuardState::RedirectHome { location } => {
            json!({ "outcome": "redirect_home", "location": location })
        }
        unsettled => {
            return Output::envelope::<()>(Err(ServiceError::new(format!(
                "Navigation did not settle: {unsettled:?}"
            ))));
        }
    };

    Output::envelope::<serde_json::Value>(Ok(json!({
        "path": path,
        "route": route.map(|r| r.name),
        "decision": decision,
    })))
}

pub fn routes(state: &AppState) -> anyhow::Result<Output> {
    let routes: Vec<_> = state
        .guard
        .routes()
        .entries()
        .map(|(name, path, meta)| {
            json!({
                "name": name,
                "path": path,
                "requires_auth": meta.requires_auth,
                "redirect_if_authenticated": meta.redirect_if_authenticated,
            })
        })
        .collect();
    Output::envelope::<Vec<serde_json::Value>>(Ok(routes))
}
