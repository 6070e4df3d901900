//! Routes for the Event Authoring bounded context.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::{Json, Router, routing::get, routing::post};
use fieldday_authoring::application::command_handlers::{self, AuthoringCommandResult};
use fieldday_authoring::application::query_handlers::{self, EditorView};
use fieldday_authoring::domain::commands;
use fieldday_authoring::domain::lifecycle::Transition;
use fieldday_authoring::domain::record::EventRecord;
use fieldday_core::identity::EditorIdentity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Header naming the editor's user id.
pub const EDITOR_ID_HEADER: &str = "x-editor-id";
/// Header naming the editor's display name.
pub const EDITOR_NAME_HEADER: &str = "x-editor-name";

/// Request body for POST /.
#[derive(Debug, Default, Deserialize)]
pub struct CreateEventRequest {
    /// Initial field values.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Request body for POST /{id}/save.
#[derive(Debug, Deserialize)]
pub struct SaveDraftRequest {
    /// Field name to new value.
    pub updates: Map<String, Value>,
}

/// Response body returned after a command is handled.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub record_id: String,
    pub transition: Transition,
    pub view: EditorView,
}

impl From<AuthoringCommandResult> for CommandResponse {
    fn from(result: AuthoringCommandResult) -> Self {
        Self {
            record_id: result.record_id,
            transition: result.transition,
            view: result.view,
        }
    }
}

/// Resolves the acting editor from request headers, falling back to the
/// configured default.
fn editor_from(headers: &HeaderMap, state: &AppState) -> EditorIdentity {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    };
    match (header(EDITOR_ID_HEADER), header(EDITOR_NAME_HEADER)) {
        (Some(id), Some(name)) => EditorIdentity::new(id, name),
        (Some(id), None) => EditorIdentity::new(id.clone(), id),
        (None, _) => state.default_editor.clone(),
    }
}

/// POST /
#[instrument(skip(state, headers, request))]
async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Option<Json<CreateEventRequest>>,
) -> Result<Json<CommandResponse>, ApiError> {
    let Json(request) = request.unwrap_or_default();
    let command = commands::CreateEvent {
        correlation_id: Uuid::new_v4(),
        fields: request.fields,
    };

    info!(correlation_id = %command.correlation_id, "handling create_event command");

    let editor = editor_from(&headers, &state);
    let result = command_handlers::handle_create_event(
        &command,
        state.clock.as_ref(),
        &editor,
        &*state.event_store,
    )
    .await?;

    Ok(Json(result.into()))
}

/// GET /{id}
#[instrument(skip(state, headers))]
async fn get_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(record_id): Path<String>,
) -> Result<Json<EditorView>, ApiError> {
    let editor = editor_from(&headers, &state);
    let view = query_handlers::get_editor_view(
        &record_id,
        state.clock.as_ref(),
        &editor,
        &*state.event_store,
    )
    .await?;
    Ok(Json(view))
}

/// GET /{id}/published
#[instrument(skip(state))]
async fn get_published(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<Json<EventRecord>, ApiError> {
    let record = query_handlers::get_published_event(&record_id, &*state.event_store).await?;
    Ok(Json(record))
}

/// POST /{id}/save
#[instrument(skip(state, headers, request), fields(fields = request.updates.len()))]
async fn save_draft(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(record_id): Path<String>,
    Json(request): Json<SaveDraftRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::SaveDraft {
        correlation_id: Uuid::new_v4(),
        record_id,
        updates: request.updates,
    };

    info!(correlation_id = %command.correlation_id, "handling save_draft command");

    let editor = editor_from(&headers, &state);
    let result = command_handlers::handle_save_draft(
        &command,
        state.clock.as_ref(),
        &editor,
        &*state.event_store,
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /{id}/publish
#[instrument(skip(state, headers))]
async fn publish_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(record_id): Path<String>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::PublishEvent {
        correlation_id: Uuid::new_v4(),
        record_id,
    };

    info!(correlation_id = %command.correlation_id, "handling publish_event command");

    let editor = editor_from(&headers, &state);
    let result = command_handlers::handle_publish_event(
        &command,
        state.clock.as_ref(),
        &editor,
        &*state.event_store,
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /{id}/unpublish
#[instrument(skip(state, headers))]
async fn unpublish_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(record_id): Path<String>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::UnpublishEvent {
        correlation_id: Uuid::new_v4(),
        record_id,
    };

    info!(correlation_id = %command.correlation_id, "handling unpublish_event command");

    let editor = editor_from(&headers, &state);
    let result = command_handlers::handle_unpublish_event(
        &command,
        state.clock.as_ref(),
        &editor,
        &*state.event_store,
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /{id}/cancel
#[instrument(skip(state, headers))]
async fn cancel_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(record_id): Path<String>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::CancelEvent {
        correlation_id: Uuid::new_v4(),
        record_id,
    };

    info!(correlation_id = %command.correlation_id, "handling cancel_event command");

    let editor = editor_from(&headers, &state);
    let result = command_handlers::handle_cancel_event(
        &command,
        state.clock.as_ref(),
        &editor,
        &*state.event_store,
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /{id}/delete
#[instrument(skip(state, headers))]
async fn delete_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(record_id): Path<String>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::DeleteEvent {
        correlation_id: Uuid::new_v4(),
        record_id,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_event command");

    let editor = editor_from(&headers, &state);
    let result = command_handlers::handle_delete_event(
        &command,
        state.clock.as_ref(),
        &editor,
        &*state.event_store,
    )
    .await?;

    Ok(Json(result.into()))
}

/// POST /{id}/discard
#[instrument(skip(state, headers))]
async fn discard_changes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(record_id): Path<String>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::DiscardChanges {
        correlation_id: Uuid::new_v4(),
        record_id,
    };

    info!(correlation_id = %command.correlation_id, "handling discard_changes command");

    let editor = editor_from(&headers, &state);
    let result = command_handlers::handle_discard_changes(
        &command,
        state.clock.as_ref(),
        &editor,
        &*state.event_store,
    )
    .await?;

    Ok(Json(result.into()))
}

/// Returns the router for the events context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_event))
        .route("/{id}", get(get_event))
        .route("/{id}/published", get(get_published))
        .route("/{id}/save", post(save_draft))
        .route("/{id}/publish", post(publish_event))
        .route("/{id}/unpublish", post(unpublish_event))
        .route("/{id}/cancel", post(cancel_event))
        .route("/{id}/delete", post(delete_event))
        .route("/{id}/discard", post(discard_changes))
}
