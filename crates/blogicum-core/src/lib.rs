//! # Blogicum Core
//!
//! The domain layer of Blogicum: entities, the visibility and ownership
//! rules, pagination, and the ports infrastructure has to implement.
//! This crate has no infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;

pub use error::{DomainError, RepoError};
pub use pagination::{POSTS_PER_PAGE, Page, PageError, PageRequest};
