//! services/api/src/web/chat.rs
//!
//! Endpoints for server-side chat sessions. Each session keeps its own message
//! history and the recommendations produced for each user turn.

use crate::web::{
    rest::{error_response, parse_body, ErrorBody, HandlerError},
    state::{AppState, ChatSessionHandle},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use course_advisor_core::{ChatSession, TurnOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct ChatMessageRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub recommendation_id: Uuid,
    pub positive: bool,
}

/// A session snapshot, plus the outcome of the turn that produced it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    #[serde(flatten)]
    session: ChatSession,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<TurnOutcome>,
    /// The recommendation produced by this turn, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    recommendation_id: Option<Uuid>,
}

fn session_not_found(id: Uuid) -> HandlerError {
    error_response(
        StatusCode::NOT_FOUND,
        &format!("Chat session {} not found", id),
    )
}

fn find_session(app_state: &AppState, id: Uuid) -> Result<Arc<ChatSessionHandle>, HandlerError> {
    app_state.chats.get(id).ok_or_else(|| session_not_found(id))
}

/// Start a new chat session with the welcome message.
#[utoipa::path(
    post,
    path = "/api/chat/sessions",
    responses(
        (status = 201, description = "The new session: id, messages, recommendations")
    )
)]
pub async fn create_chat_session_handler(
    State(app_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let handle = app_state.chats.create();
    let session = handle.session.lock().await.clone();
    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session,
            outcome: None,
            recommendation_id: None,
        }),
    )
}

/// Fetch the current state of a chat session.
#[utoipa::path(
    get,
    path = "/api/chat/sessions/{id}",
    params(("id" = Uuid, Path, description = "The chat session id")),
    responses(
        (status = 200, description = "The session"),
        (status = 404, description = "Unknown session", body = ErrorBody)
    )
)]
pub async fn get_chat_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let session = find_session(&app_state, id)?.session.lock().await.clone();
    Ok(Json(SessionResponse {
        session,
        outcome: None,
        recommendation_id: None,
    }))
}

/// Submit a user turn. Vague prompts are declined without calling the model.
///
/// The session stays readable while recommendations are generated; a second
/// message on the same session waits for the first turn to finish.
#[utoipa::path(
    post,
    path = "/api/chat/sessions/{id}/messages",
    params(("id" = Uuid, Path, description = "The chat session id")),
    request_body = ChatMessageRequest,
    responses(
        (status = 200, description = "The session after the turn, with its outcome"),
        (status = 400, description = "Empty message", body = ErrorBody),
        (status = 404, description = "Unknown session", body = ErrorBody)
    )
)]
pub async fn post_chat_message_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ChatMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = parse_body(payload)?;
    if request.content.trim().is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "Message is required"));
    }

    let handle = find_session(&app_state, id)?;
    let _turn = handle.turn.lock().await;

    let pending = handle.session.lock().await.begin(&request.content);
    let Some(turn) = pending else {
        let session = handle.session.lock().await.clone();
        return Ok(Json(SessionResponse {
            session,
            outcome: Some(TurnOutcome::Declined),
            recommendation_id: None,
        }));
    };

    let request_id = turn.request_id();
    let result = app_state.advisor.recommend(turn.query()).await;

    let mut session = handle.session.lock().await;
    let outcome = session.complete(turn, result);
    let recommendation_id = session.recommendation_for(request_id).map(|rec| rec.id);
    Ok(Json(SessionResponse {
        session: session.clone(),
        outcome: Some(outcome),
        recommendation_id,
    }))
}

/// Give feedback on a recommendation. Negative feedback discards it.
#[utoipa::path(
    post,
    path = "/api/chat/sessions/{id}/feedback",
    params(("id" = Uuid, Path, description = "The chat session id")),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "The session after the feedback"),
        (status = 404, description = "Unknown session or recommendation", body = ErrorBody)
    )
)]
pub async fn post_chat_feedback_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = parse_body(payload)?;
    let handle = find_session(&app_state, id)?;
    let mut session = handle.session.lock().await;

    if !session.feedback(request.recommendation_id, request.positive) {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            &format!("Recommendation {} not found", request.recommendation_id),
        ));
    }

    Ok(Json(SessionResponse {
        session: session.clone(),
        outcome: None,
        recommendation_id: None,
    }))
}

/// End a chat session and drop its history.
#[utoipa::path(
    delete,
    path = "/api/chat/sessions/{id}",
    params(("id" = Uuid, Path, description = "The chat session id")),
    responses(
        (status = 204, description = "Session removed"),
        (status = 404, description = "Unknown session", body = ErrorBody)
    )
)]
pub async fn delete_chat_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    if app_state.chats.remove(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(id))
    }
}
