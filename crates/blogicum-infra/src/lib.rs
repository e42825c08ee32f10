//! # Blogicum Infrastructure
//!
//! Concrete implementations of the ports defined in `blogicum-core`:
//! PostgreSQL repositories through SeaORM, an in-memory store used when no
//! database is configured, and JWT/Argon2 authentication.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No database support, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM

pub mod auth;
pub mod database;
pub mod memory;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::DatabaseConnections;
pub use memory::InMemoryStore;
