//! Route table and the pre-navigation session guard.

mod guard;
mod routes;

pub use guard::{GuardConfig, GuardState, SessionGuard, SessionLookup};
pub use routes::{Route, RouteMatch, RouteMeta, RouteTable};
