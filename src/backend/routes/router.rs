/**
 * Router Configuration
 *
 * Assembles the API routes behind the auth middleware, adds the public
 * health check and wraps everything in a request trace layer.
 */

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::backend::middleware::auth_middleware;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// - `GET /health` - liveness, no authentication
/// - `/api/...` - document routes, bearer token required
///
/// Unknown paths fall through to a JSON 404.
pub fn create_router(app_state: AppState) -> Router<()> {
    let api = configure_api_routes(Router::new()).route_layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(api)
        .fallback(|| async {
            crate::backend::error::BackendError::not_found("Not found.")
        })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
