//! Request and error bodies of the HTTP API.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use crate::error::ChatError;
use crate::models::{ChatMessage, Conversation};

pub const NO_TRANSCRIPT_MESSAGE: &str = "No transcript available yet.";

/// `POST /chat` body.
///
/// `message` stays untyped so a non-string value is reported as invalid input
/// instead of a deserialization failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<Value>,

    #[serde(default)]
    pub history: Option<Conversation>,

    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// The message text, if it is a non-blank string.
    pub fn message_text(&self) -> Result<&str, ChatError> {
        match &self.message {
            Some(Value::String(text)) if !text.trim().is_empty() => Ok(text),
            _ => Err(ChatError::InvalidInput("message is required".to_string())),
        }
    }

    /// Prior turns; an absent or `null` history is empty.
    pub fn history(&self) -> &[ChatMessage] {
        self.history.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by a handler. Downstream details are logged, never sent.
#[derive(Debug)]
pub enum ApiError {
    Chat(ChatError),
    MalformedBody(JsonRejection),
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        ApiError::Chat(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::MalformedBody(_) => (
                StatusCode::BAD_REQUEST,
                "request body must be a JSON object".to_string(),
            ),
            ApiError::Chat(ChatError::InvalidInput(message)) => {
                (StatusCode::BAD_REQUEST, message.clone())
            }
            ApiError::Chat(ChatError::NoTranscript) => {
                (StatusCode::NOT_FOUND, NO_TRANSCRIPT_MESSAGE.to_string())
            }
            ApiError::Chat(ChatError::EmbeddingUnavailable(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Jarvis could not process your question right now.".to_string(),
            ),
            ApiError::Chat(ChatError::IndexUnavailable(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Jarvis could not search the knowledge base right now.".to_string(),
            ),
            ApiError::Chat(ChatError::LlmUnavailable(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Jarvis could not generate an answer right now.".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        match &self {
            ApiError::MalformedBody(rejection) => {
                warn!(error = %rejection.body_text(), "Rejected malformed request body");
            }
            ApiError::Chat(err) if status.is_server_error() => {
                error!(error = %err, "Chat turn failed");
            }
            ApiError::Chat(_) => {}
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
