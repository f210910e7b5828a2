/**
 * Server Initialization
 *
 * Loads the optional services, picks PostgreSQL or in-memory stores and
 * builds the router. Missing services never abort startup.
 */

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, load_spreadsheet_store};
use crate::backend::server::state::{AppState, StorageServices};

/// Build application state from the environment
pub async fn create_state() -> AppState {
    let db_pool = load_database().await;
    let spreadsheet = load_spreadsheet_store();

    let services = match &db_pool {
        Some(pool) => StorageServices::postgres(pool.clone(), spreadsheet),
        None => {
            tracing::warn!("No database configured. Documents will not survive a restart.");
            StorageServices::in_memory(spreadsheet)
        }
    };

    AppState::new(services, db_pool)
}

/// Create and configure the Axum application
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing storyvault backend server");

    let app_state = create_state().await;
    tracing::info!(
        database = app_state.db_pool.is_some(),
        spreadsheet = app_state.storage.factory().has_spreadsheet(),
        "Storage configured"
    );

    create_router(app_state)
}
