use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{db, error::Result, models::Settings, AppState};

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub rounds_per_session: i32,
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> Result<Json<Settings>> {
    let settings = db::settings::current_settings(&state.db).await?;
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<Settings>> {
    let settings = db::settings::update_rounds(&state.db, payload.rounds_per_session).await?;
    Ok(Json(settings))
}
