//! Axum route handlers for mentor chat.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::extract::MaybeAuthUser;
use crate::chat::service::{converse, ChatTurn};
use crate::chat::verticals::Vertical;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub thread_id: String,
}

#[derive(Debug, Serialize)]
pub struct MentorSummary {
    pub vertical: Vertical,
    pub name: &'static str,
}

/// POST /api/chat/:vertical
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    user: MaybeAuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let vertical = Vertical::from_slug(&slug)
        .ok_or_else(|| AppError::NotFound(format!("No mentor for '{slug}'")))?;
    chat_with(&state, vertical, user, req).await
}

/// POST /api/chat-cs
pub async fn handle_chat_cs(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    chat_with(&state, Vertical::Cs, user, req).await
}

/// POST /api/chat-health
pub async fn handle_chat_health(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    chat_with(&state, Vertical::Health, user, req).await
}

/// POST /api/chat-finance
pub async fn handle_chat_finance(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    chat_with(&state, Vertical::Finance, user, req).await
}

/// GET /api/mentors
/// Lists the verticals that have an assistant configured.
pub async fn handle_list_mentors(State(state): State<AppState>) -> Json<Vec<MentorSummary>> {
    Json(
        state
            .config
            .assistants
            .configured()
            .into_iter()
            .map(|vertical| MentorSummary {
                vertical,
                name: vertical.display_name(),
            })
            .collect(),
    )
}

async fn chat_with(
    state: &AppState,
    vertical: Vertical,
    user: MaybeAuthUser,
    req: ChatRequest,
) -> Result<Json<ChatResponse>, AppError> {
    let binding = state.config.assistants.get(vertical).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "{} assistant ID not configured",
            vertical.display_name()
        ))
    })?;

    let user_id = user.0.as_ref().map(|u| u.user.id.as_str());
    let reply = converse(
        state.assistants.as_ref(),
        state.threads.as_ref(),
        &state.config.chat,
        ChatTurn {
            vertical,
            assistant_id: &binding.assistant_id,
            message: &req.message,
            thread_id: req.thread_id.as_deref(),
            user_id,
        },
    )
    .await?;

    Ok(Json(ChatResponse {
        message: reply.message,
        thread_id: reply.thread_id,
    }))
}
