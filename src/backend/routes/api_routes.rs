/**
 * API Routes
 *
 * ## Documents
 * - `GET|POST /api/canvas/{story_id}`
 * - `GET|POST /api/character/{story_id}`
 * - `GET|POST /api/timeline/{story_id}`
 *
 * ## User
 * - `POST /api/user/migrate-to-google`
 *
 * All of them require a bearer token; `create_router` applies the auth
 * middleware to this group.
 */

use axum::{
    routing::{get, post},
    Router,
};
use crate::backend::documents::{
    get_canvas, get_character, get_timeline, migrate_to_google, save_canvas, save_character, save_timeline,
};
use crate::backend::server::state::AppState;

/// Add the document and user routes to `router`
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/canvas/{story_id}", get(get_canvas).post(save_canvas))
        .route("/api/character/{story_id}", get(get_character).post(save_character))
        .route("/api/timeline/{story_id}", get(get_timeline).post(save_timeline))
        .route("/api/user/migrate-to-google", post(migrate_to_google))
}
