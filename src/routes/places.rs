use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db,
    error::{GameError, Result},
    models::{Coordinate, NewPlace, Place, PlaceImage, PlaceSource},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct AddPlaceRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Image bytes, base64 encoded
    pub image_base64: String,
}

/// Image as sent to clients: asset name or base64 payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageResponse {
    Asset { name: String },
    Inline { data_base64: String },
}

impl From<PlaceImage> for ImageResponse {
    fn from(image: PlaceImage) -> Self {
        match image {
            PlaceImage::Asset(name) => ImageResponse::Asset { name },
            PlaceImage::Inline(data) => ImageResponse::Inline {
                data_base64: STANDARD.encode(data),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceResponse {
    pub place_id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub image: Option<ImageResponse>,
    pub source: PlaceSource,
    pub created_at: DateTime<Utc>,
}

impl From<Place> for PlaceResponse {
    fn from(place: Place) -> Self {
        let image = place.image().map(ImageResponse::from);
        Self {
            place_id: place.place_id,
            name: place.name,
            latitude: place.latitude,
            longitude: place.longitude,
            image,
            source: place.source,
            created_at: place.created_at,
        }
    }
}

pub async fn list_places(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PlaceResponse>>> {
    let places = db::places::all_places(&state.db).await?;
    Ok(Json(places.into_iter().map(PlaceResponse::from).collect()))
}

pub async fn add_place(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddPlaceRequest>,
) -> Result<(StatusCode, Json<PlaceResponse>)> {
    let image = STANDARD
        .decode(payload.image_base64.trim())
        .map_err(|e| GameError::validation(format!("image is not valid base64: {}", e)))?;

    let new_place = NewPlace {
        name: payload.name,
        coordinate: Coordinate::new(payload.latitude, payload.longitude)?,
        image,
    };
    let place = db::places::add_place(&state.db, new_place).await?;

    Ok((StatusCode::CREATED, Json(PlaceResponse::from(place))))
}
