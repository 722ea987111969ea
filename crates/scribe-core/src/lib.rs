//! # Scribe Core
//!
//! The domain layer of the Scribe blog client.
//! Entities, the ports to the auth and data backends, the resource services and
//! the navigation guard. Nothing in this crate performs I/O on its own.

pub mod domain;
pub mod error;
pub mod ports;
pub mod query;
pub mod routing;
pub mod schema;
pub mod services;
pub mod validation;

pub use error::{DataError, ServiceError};
pub use routing::{GuardConfig, GuardState, RouteTable, SessionGuard};
pub use services::{AuthService, BlogService, CategoryService, CommentService, LikeService};
