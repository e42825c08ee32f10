//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod ownership;
mod post;
mod user;

pub use category::Category;
pub use comment::{Comment, CommentEntry};
pub use location::Location;
pub use ownership::{Authored, ensure_author};
pub use post::{AuthorRef, CategoryRef, LocationRef, Post, PostContent, PostListing};
pub use user::User;
