/**
 * Server Configuration
 *
 * Everything is read from environment variables. Optional services that are
 * missing or fail to initialize are logged and left out; the server still
 * starts.
 *
 * | Variable | Default |
 * |---|---|
 * | `SERVER_PORT` | `3000` |
 * | `DATABASE_URL` | none, in-memory stores |
 * | `GOOGLE_SHEETS_CREDENTIALS_PATH` | none, spreadsheet backend disabled |
 * | `GOOGLE_SHEETS_SPREADSHEET_ID` | required with credentials |
 * | `GOOGLE_SHEETS_CANVAS_SHEET` | `Canvas` |
 * | `GOOGLE_SHEETS_CHARACTER_SHEET` | `Character` |
 * | `GOOGLE_SHEETS_TIMELINE_SHEET` | `Timeline` |
 */

use std::sync::Arc;

use sqlx::PgPool;

use crate::backend::storage::sheets::{
    GoogleSheetsClient, ServiceAccountKey, ServiceAccountTokenSource, SpreadsheetDocumentStore,
};
use crate::shared::config::{ConfigError, SheetsConfig};

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Database configuration result
pub type DatabaseConfig = Option<PgPool>;

/// Listen address settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("SERVER_PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                name: "SERVER_PORT",
                message: e.to_string(),
            })?,
            Err(_) => DEFAULT_PORT,
        };
        Ok(Self { port })
    }
}

/// Where the spreadsheet backend writes, and with which key
#[derive(Debug, Clone)]
pub struct SpreadsheetSettings {
    pub credentials_path: String,
    pub sheets: SheetsConfig,
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Spreadsheet settings from the environment
///
/// `Ok(None)` when no credentials path is set.
pub fn sheets_settings_from_env() -> Result<Option<SpreadsheetSettings>, ConfigError> {
    let Some(credentials_path) = env_opt("GOOGLE_SHEETS_CREDENTIALS_PATH") else {
        return Ok(None);
    };

    let mut builder = SheetsConfig::builder();
    if let Some(id) = env_opt("GOOGLE_SHEETS_SPREADSHEET_ID") {
        builder = builder.spreadsheet_id(id);
    }
    if let Some(name) = env_opt("GOOGLE_SHEETS_CANVAS_SHEET") {
        builder = builder.canvas_sheet(name);
    }
    if let Some(name) = env_opt("GOOGLE_SHEETS_CHARACTER_SHEET") {
        builder = builder.character_sheet(name);
    }
    if let Some(name) = env_opt("GOOGLE_SHEETS_TIMELINE_SHEET") {
        builder = builder.timeline_sheet(name);
    }

    Ok(Some(SpreadsheetSettings {
        credentials_path,
        sheets: builder.build()?,
    }))
}

/// Load and initialize database connection pool
///
/// Reads `DATABASE_URL`, connects and runs migrations. Returns `None` when
/// the variable is unset or the connection fails.
pub async fn load_database() -> DatabaseConfig {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set. Using in-memory stores.");
            return None;
        }
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Using in-memory stores.");
            return None;
        }
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => {
            tracing::info!("Database migrations completed successfully");
        }
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}

/// Build the spreadsheet store from the environment
///
/// Returns `None` when spreadsheet storage is not configured or the key
/// cannot be loaded. Google-bound users then get 501 responses.
pub fn load_spreadsheet_store() -> Option<Arc<SpreadsheetDocumentStore>> {
    let settings = match sheets_settings_from_env() {
        Ok(Some(settings)) => settings,
        Ok(None) => {
            tracing::warn!("GOOGLE_SHEETS_CREDENTIALS_PATH not set. Spreadsheet storage disabled.");
            return None;
        }
        Err(e) => {
            tracing::error!("Invalid spreadsheet configuration: {}", e);
            return None;
        }
    };

    let key = match ServiceAccountKey::from_file(&settings.credentials_path) {
        Ok(key) => key,
        Err(e) => {
            tracing::error!("Failed to load service account key: {}", e);
            return None;
        }
    };

    tracing::info!(
        spreadsheet = %settings.sheets.spreadsheet_id,
        account = %key.client_email,
        "Spreadsheet storage enabled"
    );

    let client = GoogleSheetsClient::new(
        reqwest::Client::new(),
        settings.sheets.spreadsheet_id.clone(),
        Arc::new(ServiceAccountTokenSource::new(key)),
    );
    Some(Arc::new(SpreadsheetDocumentStore::new(Arc::new(client), settings.sheets)))
}
