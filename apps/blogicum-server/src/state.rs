//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PasswordService, PostRepository,
    TokenService, UserRepository,
};
use blogicum_infra::database::DatabaseConnections;
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
use blogicum_infra::database::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state, falling back to the in-memory store
    /// when no database is configured or reachable.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match DatabaseConnections::init(db_config).await {
                    Ok(connections) => {
                        tracing::info!("Application state initialized (postgres)");
                        return Self::postgres(Arc::new(connections), config.jwt.clone());
                    }
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            "Failed to connect to database. Using in-memory fallback."
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory store");

        tracing::info!("Application state initialized (memory)");
        Self::in_memory(&InMemoryStore::new(), config.jwt.clone())
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: Arc<DatabaseConnections>, jwt: JwtConfig) -> Self {
        let conn = &connections.main;
        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
            locations: Arc::new(PostgresLocationRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn.clone())),
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::default()),
            db: Some(connections),
        }
    }

    /// State over an in-memory store; every repository shares its tables.
    pub fn in_memory(store: &InMemoryStore, jwt: JwtConfig) -> Self {
        Self {
            users: Arc::new(store.users()),
            categories: Arc::new(store.categories()),
            locations: Arc::new(store.locations()),
            posts: Arc::new(store.posts()),
            comments: Arc::new(store.comments()),
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::default()),
            db: None,
        }
    }

    /// Name of the storage backend in use.
    pub fn backend(&self) -> &'static str {
        if self.db.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }
}
