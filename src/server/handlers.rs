use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use super::AppState;
use super::protocol::{ApiError, ChatRequest, TranscriptQuery};
use crate::error::ChatError;
use crate::models::{ChatReply, HealthStatus};
use crate::services::DEFAULT_SESSION;

pub const BANNER: &str = "Jarvis backend is running ✅";
pub const TRANSCRIPT_FILENAME: &str = "jarvis-transcript.txt";
pub const MAX_SESSION_ID_LEN: usize = 128;

pub async fn banner() -> &'static str {
    BANNER
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = payload?;
    let message = request.message_text()?;
    let session = session_or_default(request.session_id.as_deref())?;

    let turn = state.chat.answer(message, request.history()).await?;
    let turns = turn.conversation.len();
    state.transcripts.record(session, turn.conversation).await;
    let sessions = state.transcripts.len().await;
    debug!(session, turns, sessions, "Recorded transcript");

    Ok(Json(turn.reply))
}

/// Always 200; an unreachable dependency is reported as offline.
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.chat.health().await)
}

pub async fn transcript(
    State(state): State<AppState>,
    Query(query): Query<TranscriptQuery>,
) -> Result<Response, ApiError> {
    let session = session_or_default(query.session_id.as_deref())?;
    let text = state.transcripts.render(session).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{TRANSCRIPT_FILENAME}\""),
            ),
        ],
        text,
    )
        .into_response())
}

fn session_or_default(session: Option<&str>) -> Result<&str, ChatError> {
    let session = session
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SESSION);
    if session.len() > MAX_SESSION_ID_LEN {
        return Err(ChatError::InvalidInput(format!(
            "sessionId must be at most {MAX_SESSION_ID_LEN} bytes"
        )));
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_or_default() {
        assert_eq!(session_or_default(None).unwrap(), DEFAULT_SESSION);
        assert_eq!(session_or_default(Some("  ")).unwrap(), DEFAULT_SESSION);
        assert_eq!(session_or_default(Some("tab-7")).unwrap(), "tab-7");
    }

    #[test]
    fn test_overlong_session_id_is_rejected() {
        let at_limit = "s".repeat(MAX_SESSION_ID_LEN);
        assert_eq!(session_or_default(Some(&at_limit)).unwrap(), at_limit);

        let too_long = "s".repeat(MAX_SESSION_ID_LEN + 1);
        assert!(matches!(
            session_or_default(Some(&too_long)),
            Err(ChatError::InvalidInput(_))
        ));
    }
}
