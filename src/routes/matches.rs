use actix_web::{web, HttpResponse};
use std::sync::Arc;
use crate::core::Matcher;
use crate::models::{FindMatchesQuery, FindMatchesResponse, HealthResponse, ScoringWeights, UserId};
use crate::routes::errors::ApiError;
use crate::services::UserStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub matcher: Matcher,
    /// Weights given to created users that do not set their own
    pub default_weights: ScoringWeights,
    pub default_max_distance_km: u32,
}

/// Configure health and match routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/users/{user_id}/matches", web::get().to(find_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let store_healthy = match state.store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            false
        }
    };

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// GET /api/v1/users/{user_id}/matches?limit=10
///
/// The limit defaults to 10 and is clamped to [1, max_limit]. An unknown
/// user gets an empty match list rather than a 404.
async fn find_matches(
    state: web::Data<AppState>,
    path: web::Path<UserId>,
    query: web::Query<FindMatchesQuery>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let limit = state.matcher.resolve_limit(query.limit);

    tracing::info!("Finding matches for user: {}, limit: {}", user_id, limit);

    let matches = state
        .matcher
        .find_matches(state.store.as_ref(), user_id, limit)
        .await?;

    tracing::info!("Returning {} matches for user {}", matches.len(), user_id);

    Ok(HttpResponse::Ok().json(FindMatchesResponse { user_id, matches }))
}
