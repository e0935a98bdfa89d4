use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::places::ImageResponse;
use crate::{
    db,
    error::{GameError, Result},
    game::{self, GuessOutcome, RoundAdvance, RoundState, RoundView},
    models::{Coordinate, GameSession},
    AppState,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct RoundResponse {
    pub round: usize,
    pub total_rounds: usize,
    pub place_id: Uuid,
    pub image: Option<ImageResponse>,
}

impl From<RoundView> for RoundResponse {
    fn from(view: RoundView) -> Self {
        Self {
            round: view.round,
            total_rounds: view.total_rounds,
            place_id: view.place_id,
            image: view.image.map(ImageResponse::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: Uuid,
    pub state: RoundState,
    pub round: Option<RoundResponse>,
}

#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<RoundResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<GameSession>,
}

/// Start a new session from the current settings
pub async fn start_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionStatusResponse>)> {
    let engine = game::start_session(&state.db).await?;
    let response = SessionStatusResponse {
        session_id: engine.session_id(),
        state: engine.state(),
        round: engine.round_view().map(RoundResponse::from),
    };
    state.sessions.insert(engine.session_id(), engine);

    Ok((StatusCode::CREATED, Json(response)))
}

/// Current round of a live session
pub async fn current_round(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionStatusResponse>> {
    let mut engine = state
        .sessions
        .get_mut(&session_id)
        .ok_or(GameError::SessionNotFound(session_id))?;
    engine.touch();

    Ok(Json(SessionStatusResponse {
        session_id,
        state: engine.state(),
        round: engine.round_view().map(RoundResponse::from),
    }))
}

pub async fn submit_guess(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<GuessRequest>,
) -> Result<Json<GuessOutcome>> {
    let mut engine = state
        .sessions
        .get_mut(&session_id)
        .ok_or(GameError::SessionNotFound(session_id))?;

    let outcome = engine.submit_guess(Coordinate {
        latitude: payload.latitude,
        longitude: payload.longitude,
    })?;
    Ok(Json(outcome))
}

/// Move on to the next round. After the last round the session is
/// committed to history and released. If the commit fails the session stays
/// live and completed, and the next call retries the commit.
pub async fn advance_round(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AdvanceResponse>> {
    // The map guard must not be held across the history write below
    let advance = {
        let mut engine = state
            .sessions
            .get_mut(&session_id)
            .ok_or(GameError::SessionNotFound(session_id))?;
        engine.advance_round()?
    };

    match advance {
        RoundAdvance::NextRound(view) => Ok(Json(AdvanceResponse {
            completed: false,
            round: Some(RoundResponse::from(view)),
            session: None,
        })),
        RoundAdvance::Completed(session) => {
            db::history::record_completed_session(&state.db, &session).await?;
            if let Some(mut engine) = state.sessions.get_mut(&session_id) {
                engine.mark_recorded();
            }
            state.sessions.remove(&session_id);

            Ok(Json(AdvanceResponse {
                completed: true,
                round: None,
                session: Some(session),
            }))
        }
    }
}
