//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// `postgres` or `memory`.
    pub storage: &'static str,
}

/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let healthy = match &state.db {
        Some(db) => db.ping().await,
        None => true,
    };
    let status = if healthy { "ok" } else { "degraded" };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        storage: state.backend(),
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
