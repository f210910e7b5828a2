/**
 * Service Account Credentials
 *
 * Access tokens for the Sheets API come from the OAuth 2.0 JWT bearer grant:
 * a short-lived assertion signed RS256 with the service account's private
 * key is exchanged at the key's `token_uri`. Tokens are cached until one
 * minute before they expire.
 */

use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::backend::storage::error::{StorageError, StorageResult};

/// OAuth scope granting read/write access to spreadsheets
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Fields of a service-account key file the token exchange needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parse a key from its JSON text
    pub fn from_json(json: &str) -> StorageResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| StorageError::credentials(format!("invalid service account key: {}", e)))
    }

    /// Read and parse a key file
    pub fn from_file(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            StorageError::credentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

/// Claims of the signed assertion
#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_after: Instant,
}

enum TokenMode {
    ServiceAccount(ServiceAccountKey),
    /// Fixed token, for emulators and tests
    Static(String),
}

/// Produces bearer tokens for Sheets API calls
pub struct ServiceAccountTokenSource {
    mode: TokenMode,
    cached: RwLock<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            mode: TokenMode::ServiceAccount(key),
            cached: RwLock::new(None),
        }
    }

    /// Always hand out the same token
    pub fn from_static_token(token: impl Into<String>) -> Self {
        Self {
            mode: TokenMode::Static(token.into()),
            cached: RwLock::new(None),
        }
    }

    /// A valid access token, exchanging a fresh assertion when needed
    pub async fn access_token(&self, http: &Client) -> StorageResult<String> {
        let key = match &self.mode {
            TokenMode::Static(token) => return Ok(token.clone()),
            TokenMode::ServiceAccount(key) => key,
        };

        if let Some(cached) = self.cached.read().await.as_ref() {
            if Instant::now() < cached.refresh_after {
                return Ok(cached.value.clone());
            }
        }

        let mut cached = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_after {
                return Ok(token.value.clone());
            }
        }

        let assertion = sign_assertion(key, unix_now())?;
        let response = http
            .post(key.token_uri.as_str())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Token exchange failed: {}", body);
            return Err(StorageError::credentials(format!(
                "token exchange returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
        tracing::debug!(expires_in = token.expires_in, "Obtained Sheets access token");

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_after: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Sign the JWT bearer assertion for `key` issued at `now`
fn sign_assertion(key: &ServiceAccountKey, now: u64) -> StorageResult<String> {
    let claims = AssertionClaims {
        iss: key.client_email.clone(),
        scope: SPREADSHEETS_SCOPE.to_string(),
        aud: key.token_uri.clone(),
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| StorageError::credentials(format!("invalid private key: {}", e)))?;

    encode(&header, &claims, &encoding_key)
        .map_err(|e| StorageError::credentials(format!("cannot sign assertion: {}", e)))
}
