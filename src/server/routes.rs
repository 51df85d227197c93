//! HTTP route handlers for the chat relay API.

use std::iter;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::conversation::{ConversationId, Message};

use super::error::{AppError, INVALID_MESSAGES};
use super::state::AppState;

/// Confirmation text returned after a conversation reset.
pub const CONVERSATION_CLEARED: &str = "Conversation cleared";

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/chat", post(chat_turn))
        .route("/clear-conversation", post(clear_conversation))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "chat-relay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Chat turn request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// New messages for this turn, in order.
    pub messages: Option<Vec<Message>>,
    /// Conversation to continue; `"default"` when absent.
    pub conversation_id: Option<ConversationId>,
}

/// Successful chat turn response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Always `true`.
    pub success: bool,
    /// Reply produced by the completion provider.
    pub message: Message,
    /// Conversation the turn was recorded under.
    pub conversation_id: ConversationId,
}

/// Conversation reset request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearRequest {
    /// Conversation to reset; `"default"` when absent.
    pub conversation_id: Option<ConversationId>,
}

/// Conversation reset response.
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation text.
    pub message: String,
}

/// Forward one chat turn to the completion provider.
///
/// History is only updated once the provider has answered, so a failed turn
/// leaves the conversation exactly as it was.
async fn chat_turn(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected chat request: {}", rejection.body_text());
        AppError::Validation(INVALID_MESSAGES.to_string())
    })?;
    let messages = request.messages.ok_or_else(|| {
        warn!("Rejected chat request: missing messages");
        AppError::Validation(INVALID_MESSAGES.to_string())
    })?;
    let conversation_id = request.conversation_id.unwrap_or_default();

    let _turn = state.locks.acquire(&conversation_id).await;

    let history = state.store.retrieve(&conversation_id);
    let context = build_context(state.system_prompt.as_deref(), history, &messages);
    debug!(
        "Chat turn for {conversation_id}: {} new messages, {} in context",
        messages.len(),
        context.len()
    );

    let reply = state
        .provider
        .complete(&state.model, &context)
        .await
        .map_err(|e| {
            error!("Completion provider error for {conversation_id}: {e}");
            AppError::from(e)
        })?;

    state
        .store
        .append_all(&conversation_id, messages.into_iter().chain(iter::once(reply.clone())));

    Ok(Json(ChatResponse {
        success: true,
        message: reply,
        conversation_id,
    }))
}

/// Reset a conversation's history.
async fn clear_conversation(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ClearResponse>, AppError> {
    let request = parse_clear_request(&body)?;
    let conversation_id = request.conversation_id.unwrap_or_default();

    let _turn = state.locks.acquire(&conversation_id).await;
    state.store.clear(&conversation_id);

    Ok(Json(ClearResponse {
        success: true,
        message: CONVERSATION_CLEARED.to_string(),
    }))
}

/// An empty body resets the default conversation.
fn parse_clear_request(body: &[u8]) -> Result<ClearRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ClearRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected clear request: {e}");
        AppError::Validation("Invalid request body".to_string())
    })
}

/// Context window: optional system prompt, stored history, then the new messages.
fn build_context(
    system_prompt: Option<&str>,
    history: Vec<Message>,
    messages: &[Message],
) -> Vec<Message> {
    let mut context = Vec::with_capacity(1 + history.len() + messages.len());
    if let Some(prompt) = system_prompt {
        context.push(Message::system(prompt));
    }
    context.extend(history);
    context.extend_from_slice(messages);
    context
}
