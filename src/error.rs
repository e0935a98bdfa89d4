use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T, E = GameError> = std::result::Result<T, E>;

/// Errors surfaced by the game core and its stores
#[derive(Debug, Error)]
pub enum GameError {
    /// Bad input: out-of-range rounds, malformed coordinate, empty name or image
    #[error("validation failed: {0}")]
    Validation(String),

    /// State machine called out of order
    #[error("cannot {operation} while session is {state}")]
    InvalidTransition {
        state: &'static str,
        operation: &'static str,
    },

    /// The catalog is empty, so a session cannot start
    #[error("no places available to start a session")]
    NoPlacesAvailable,

    /// History commit of a session that is not (or no longer) committable
    #[error("invalid session state: {0}")]
    InvalidState(String),

    /// Unknown live session handle
    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    /// No completed session with this id in history
    #[error("history entry {0} not found")]
    HistoryNotFound(Uuid),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl GameError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GameError::Validation(_) => StatusCode::BAD_REQUEST,
            GameError::SessionNotFound(_) | GameError::HistoryNotFound(_) => StatusCode::NOT_FOUND,
            GameError::InvalidTransition { .. }
            | GameError::NoPlacesAvailable
            | GameError::InvalidState(_) => StatusCode::CONFLICT,
            GameError::Storage(_) | GameError::Migration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
