/**
 * Request and response bodies of the document endpoints
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `GET /api/{kind}/{story_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub json: Value,
    /// Stored stamp, `null` when the default document was returned
    #[serde(rename = "lastModified")]
    pub last_modified: Option<String>,
}

/// Body of `POST /api/{kind}/{story_id}`
///
/// `json` is either the document itself or the document already serialized
/// to a string.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveDocumentRequest {
    pub json: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDocumentResponse {
    pub message: String,
}

/// Body of `POST /api/user/migrate-to-google`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationResponse {
    pub success: bool,
}
