use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::domain::DomainError;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// `User: ...` / `Assistant: ...` transcript kept by the client.
    #[serde(default)]
    pub conversation_history: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

const INVALID_BODY: &str = "Error: Invalid request body";

fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ChatResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(stage = "http", error = %rejection.body_text(), "rejected chat body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ChatResponse {
                    response: INVALID_BODY.to_string(),
                }),
            );
        }
    };

    let result = state
        .chat
        .answer_within(
            &request.message,
            &request.conversation_history,
            state.request_deadline(),
        )
        .await;

    match result {
        Ok(answer) => (
            StatusCode::OK,
            Json(ChatResponse {
                response: answer.response,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "chat request failed");
            (
                status_for(&e),
                Json(ChatResponse {
                    response: e.user_message().to_string(),
                }),
            )
        }
    }
}
