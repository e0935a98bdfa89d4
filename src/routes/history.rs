use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db,
    error::{GameError, Result},
    models::{GameSession, SessionSummary, SortKey},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub sort: SortKey,
}

pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<SessionSummary>>> {
    let sessions = db::history::list_sessions(&state.db, query.sort).await?;
    Ok(Json(sessions))
}

pub async fn get_history_entry(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GameSession>> {
    let session = db::history::get_session(&state.db, session_id)
        .await?
        .ok_or(GameError::HistoryNotFound(session_id))?;
    Ok(Json(session))
}

/// Deleting an unknown session is not an error
pub async fn delete_history_entry(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode> {
    db::history::delete_session(&state.db, session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
