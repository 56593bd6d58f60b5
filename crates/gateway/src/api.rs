//! `/api` handlers: query processing and chat history.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use locas_agent::{NO_LOCATION_MESSAGE, NO_LOCATION_RESULT, TurnOutcome};
use locas_core::message::ChatEntry;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::SharedState;

#[derive(Debug, Deserialize)]
pub struct ProcessQueryRequest {
    #[serde(default)]
    pub query: Option<String>,

    #[serde(default, rename = "sessionId", alias = "session_id")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessQueryResponse {
    pub status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ProcessQueryResponse {
    fn error(message: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            status: "error",
            message: Some(message.into()),
            result: None,
            session_id,
        }
    }
}

pub async fn process_query(
    State(state): State<SharedState>,
    payload: Result<Json<ProcessQueryRequest>, JsonRejection>,
) -> (StatusCode, Json<ProcessQueryResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ProcessQueryResponse::error(
                    format!("Invalid request body: {}", rejection.body_text()),
                    None,
                )),
            );
        }
    };

    let Some(query) = request.query.filter(|q| !q.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ProcessQueryResponse::error("No query provided", request.session_id)),
        );
    };

    info!(query_len = query.len(), has_session = request.session_id.is_some(), "Query received");

    match state.assistant.handle(&query, request.session_id).await {
        Ok(reply) => {
            let body = match reply.outcome {
                TurnOutcome::Answered { answer, .. } => ProcessQueryResponse {
                    status: "success",
                    message: None,
                    result: Some(answer),
                    session_id: Some(reply.session_id),
                },
                TurnOutcome::NoLocation => ProcessQueryResponse {
                    status: "warning",
                    message: Some(NO_LOCATION_MESSAGE.to_string()),
                    result: Some(NO_LOCATION_RESULT.to_string()),
                    session_id: Some(reply.session_id),
                },
            };
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            error!(session_id = %e.session_id, error = %e, "Query processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProcessQueryResponse::error(
                    format!("Error processing query: {e}"),
                    Some(e.session_id),
                )),
            )
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryResponse {
    pub status: &'static str,
    pub session_id: String,
    pub history: Vec<ChatEntry>,
}

pub async fn chat_history(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
) -> Result<Json<ChatHistoryResponse>, (StatusCode, Json<ProcessQueryResponse>)> {
    match state.assistant.history(&session_id).await {
        Ok(history) => Ok(Json(ChatHistoryResponse {
            status: "success",
            session_id,
            history,
        })),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "History read failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProcessQueryResponse::error(
                    format!("Error retrieving chat history: {e}"),
                    Some(session_id),
                )),
            ))
        }
    }
}
