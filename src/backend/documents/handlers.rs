/**
 * Document Handlers
 *
 * `GET` and `POST` for canvas, character and timeline documents, plus the
 * migration endpoint. Every document request checks, in order, that the story
 * exists (404) and that the caller owns it or has it shared (403) before the
 * storage router is consulted.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::backend::documents::normalize::{normalize_character, parse_stored, payload_to_text, prepare_timeline};
use crate::backend::documents::types::{DocumentResponse, MigrationResponse, SaveDocumentRequest, SaveDocumentResponse};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::document::{DocumentKind, StoryId, UserId};

/// 404 for missing or deleted stories, 403 without access
async fn ensure_story_access(state: &AppState, user_id: UserId, story_id: StoryId) -> Result<(), BackendError> {
    if !state.stories.story_exists(story_id).await? {
        return Err(BackendError::not_found("Story not found."));
    }
    if !state.stories.has_access(user_id, story_id).await? {
        tracing::warn!(user_id, story_id, "story access denied");
        return Err(BackendError::forbidden("You do not have access to this story."));
    }
    Ok(())
}

fn display_name(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Canvas => "Canvas",
        DocumentKind::Character => "Character",
        DocumentKind::Timeline => "Timeline",
    }
}

/// Read a document for the caller, falling back to the kind's default
pub async fn load_document(
    state: &AppState,
    user_id: UserId,
    story_id: StoryId,
    kind: DocumentKind,
) -> Result<DocumentResponse, BackendError> {
    ensure_story_access(state, user_id, story_id).await?;

    let stored = state
        .storage
        .get_with_last_modified(kind, story_id, user_id)
        .await?;

    let Some(stored) = stored else {
        return match kind.default_document() {
            Some(json) => Ok(DocumentResponse {
                json,
                last_modified: None,
            }),
            None => Err(BackendError::not_found(format!(
                "{} data not found.",
                display_name(kind)
            ))),
        };
    };

    let mut json = parse_stored(kind, &stored.json)?;
    if kind == DocumentKind::Character {
        json = normalize_character(json);
    }

    Ok(DocumentResponse {
        json,
        last_modified: Some(stored.last_modified_raw),
    })
}

/// Store a document for the caller, stamped with the current time
pub async fn store_document(
    state: &AppState,
    user_id: UserId,
    story_id: StoryId,
    kind: DocumentKind,
    request: SaveDocumentRequest,
) -> Result<SaveDocumentResponse, BackendError> {
    ensure_story_access(state, user_id, story_id).await?;

    let mut text = payload_to_text(request.json)?;
    if kind == DocumentKind::Timeline {
        text = prepare_timeline(text)?;
    }

    state
        .storage
        .save(kind, story_id, user_id, &text, Utc::now())
        .await?;

    tracing::info!(user_id, story_id, kind = %kind, bytes = text.len(), "document saved");
    Ok(SaveDocumentResponse {
        message: format!("{} saved.", display_name(kind)),
    })
}

pub async fn get_canvas(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(story_id): Path<StoryId>,
) -> Result<Json<DocumentResponse>, BackendError> {
    load_document(&state, user.user_id, story_id, DocumentKind::Canvas)
        .await
        .map(Json)
}

pub async fn save_canvas(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(story_id): Path<StoryId>,
    Json(request): Json<SaveDocumentRequest>,
) -> Result<Json<SaveDocumentResponse>, BackendError> {
    store_document(&state, user.user_id, story_id, DocumentKind::Canvas, request)
        .await
        .map(Json)
}

pub async fn get_character(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(story_id): Path<StoryId>,
) -> Result<Json<DocumentResponse>, BackendError> {
    load_document(&state, user.user_id, story_id, DocumentKind::Character)
        .await
        .map(Json)
}

pub async fn save_character(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(story_id): Path<StoryId>,
    Json(request): Json<SaveDocumentRequest>,
) -> Result<Json<SaveDocumentResponse>, BackendError> {
    store_document(&state, user.user_id, story_id, DocumentKind::Character, request)
        .await
        .map(Json)
}

pub async fn get_timeline(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(story_id): Path<StoryId>,
) -> Result<Json<DocumentResponse>, BackendError> {
    load_document(&state, user.user_id, story_id, DocumentKind::Timeline)
        .await
        .map(Json)
}

pub async fn save_timeline(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(story_id): Path<StoryId>,
    Json(request): Json<SaveDocumentRequest>,
) -> Result<Json<SaveDocumentResponse>, BackendError> {
    store_document(&state, user.user_id, story_id, DocumentKind::Timeline, request)
        .await
        .map(Json)
}

/// Copy the caller's relational documents to the spreadsheet
///
/// Answers 500 with `success: false` when any document fails; the caller can
/// retry since each copy overwrites.
pub async fn migrate_to_google(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<MigrationResponse>) {
    match state.migration.migrate_all_to_spreadsheet(user.user_id).await {
        Ok(_) => (StatusCode::OK, Json(MigrationResponse { success: true })),
        Err(e) => {
            tracing::error!(user_id = user.user_id, "Migration failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MigrationResponse { success: false }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::server::state::StorageServices;
    use crate::backend::stories::MemoryStoryDirectory;
    use crate::backend::storage::MemoryStoryDataStore;
    use crate::backend::auth::MemoryProviderLookup;
    use crate::shared::document::{default_timeline, LAST_MODIFIED_SENTINEL};
    use serde_json::json;
    use std::sync::Arc;

    async fn state() -> (AppState, Arc<MemoryStoryDirectory>) {
        let stories = Arc::new(MemoryStoryDirectory::new());
        stories.add_story(42, 7).await;
        let services = StorageServices {
            relational: Arc::new(MemoryStoryDataStore::new()),
            providers: Arc::new(MemoryProviderLookup::new()),
            stories: stories.clone(),
            spreadsheet: None,
        };
        (AppState::new(services, None), stories)
    }

    #[tokio::test]
    async fn test_default_timeline_without_stamp() {
        let (state, _) = state().await;
        let doc = load_document(&state, 7, 42, DocumentKind::Timeline).await.unwrap();
        assert_eq!(doc.json, default_timeline());
        assert_eq!(doc.last_modified, None);
    }

    #[tokio::test]
    async fn test_missing_character_is_404() {
        let (state, _) = state().await;
        let err = load_document(&state, 7, 42, DocumentKind::Character).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_save_then_load_canvas() {
        let (state, _) = state().await;
        let saved = store_document(
            &state,
            7,
            42,
            DocumentKind::Canvas,
            SaveDocumentRequest { json: json!({"strokes": [1]}) },
        )
        .await
        .unwrap();
        assert_eq!(saved.message, "Canvas saved.");

        let doc = load_document(&state, 7, 42, DocumentKind::Canvas).await.unwrap();
        assert_eq!(doc.json, json!({"strokes": [1]}));
        assert_eq!(doc.last_modified.as_deref(), Some(LAST_MODIFIED_SENTINEL));
    }

    #[tokio::test]
    async fn test_access_checks_run_before_storage() {
        let (state, stories) = state().await;
        let err = load_document(&state, 9, 42, DocumentKind::Canvas).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = load_document(&state, 7, 1000, DocumentKind::Canvas).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        stories.soft_delete(42).await;
        let err = load_document(&state, 7, 42, DocumentKind::Canvas).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_stored_document_is_500() {
        let (state, _) = state().await;
        store_document(
            &state,
            7,
            42,
            DocumentKind::Canvas,
            SaveDocumentRequest { json: json!("{broken") },
        )
        .await
        .unwrap();

        let err = load_document(&state, 7, 42, DocumentKind::Canvas).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().contains("line 1"));
    }
}
