//! API route definitions

use super::auth_handlers;
use super::handlers;
use crate::auth::middleware::require_auth;
use crate::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// CORS policy: configured origins, or any origin when none are set.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim_end_matches('/')).ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    let public = Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // ====================================================================
        // GitHub login flow
        // ====================================================================
        .route("/auth/github/start", get(auth_handlers::start))
        .route("/auth/github/callback", get(auth_handlers::callback));

    let protected = Router::new()
        .route("/me", get(auth_handlers::me))
        .layer(from_fn_with_state(state.clone(), require_auth));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
