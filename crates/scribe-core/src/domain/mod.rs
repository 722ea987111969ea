//! Domain entities - the rows the services hand back to callers.

mod category;
mod comment;
mod like;
mod post;
mod profile;
mod tag;
mod thread;
mod user;

pub use category::Category;
pub use comment::Comment;
pub use like::Like;
pub use post::{Post, slugify};
pub use profile::AuthorSummary;
pub use scribe_shared::dto::PostStatus;
pub use tag::{PostTag, Tag};
pub use thread::CommentThread;
pub use user::{Identity, OAuthProvider, Session, SignUp, User};
