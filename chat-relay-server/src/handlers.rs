use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::ChatError;
use crate::session::SessionContext;
use crate::state::{AppState, ChatRequest, ChatResponse, ClearResponse, HistoryResponse, ModelList};

pub async fn chat_handler(
    State(state): State<AppState>,
    session: SessionContext,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return session.attach(body_rejection(rejection)),
    };

    let result = state
        .gateway
        .send(
            session.id(),
            request.message.as_deref(),
            request.model.as_deref(),
            request.temperature,
            request.max_tokens,
        )
        .await;

    match result {
        Ok(outcome) => session.attach(Json(ChatResponse {
            success: true,
            response: outcome.assistant.content().to_string(),
            model: outcome.model,
        })),
        Err(e) => session.attach(e),
    }
}

/// A body that is absent reads as a missing message; one that fails to parse is reported as such.
fn body_rejection(rejection: JsonRejection) -> ChatError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ChatError::Validation("Message is required".to_string())
        }
        other => ChatError::Validation(format!("Invalid request body: {}", other.body_text())),
    }
}

pub async fn clear_handler(State(state): State<AppState>, session: SessionContext) -> Response {
    state.gateway.clear(session.id());
    session.attach(Json(ClearResponse {
        success: true,
        message: "Chat history cleared".to_string(),
    }))
}

pub async fn history_handler(State(state): State<AppState>, session: SessionContext) -> Response {
    let history = state.gateway.history(session.id());
    session.attach(Json(HistoryResponse {
        success: true,
        history,
    }))
}

pub async fn models_handler(State(state): State<AppState>) -> Json<ModelList> {
    Json(ModelList {
        object: "list".to_string(),
        data: state.gateway.catalog().descriptors().to_vec(),
    })
}

pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let provider = state.gateway.provider_display_name();
    Json(json!({
        "status": "OK",
        "message": format!("chat-relay is running with {}", provider),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn test_handler(State(state): State<AppState>) -> Json<Value> {
    let provider = state.gateway.provider_display_name();
    Json(json!({
        "status": "OK",
        "message": format!("chat-relay is working correctly with {}", provider),
        "timestamp": Utc::now().to_rfc3339(),
        "models": state.gateway.catalog().ids(),
        "api_base": state.info.api_base,
        "api_key_set": state.info.api_key_set,
        "provider": provider,
    }))
}
