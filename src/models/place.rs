use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{GameError, Result};

/// A point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(GameError::validation(format!(
                "coordinate ({}, {}) is out of range",
                self.latitude, self.longitude
            )))
        }
    }
}

/// Where a place came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlaceSource {
    /// Built-in catalog loaded at startup
    Seed,
    /// Submitted through the add-place flow
    User,
}

/// Reference image of a place: either a bundled asset or an inline payload
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceImage {
    Asset(String),
    Inline(Vec<u8>),
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Place {
    pub place_id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Bundled asset name, set for seeded places
    pub image_name: Option<String>,
    /// Raw image bytes, set for user-submitted places
    #[serde(skip)]
    pub image_data: Option<Vec<u8>>,
    pub source: PlaceSource,
    pub created_at: DateTime<Utc>,
}

impl Place {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Inline payload wins over the asset name when both are present
    pub fn image(&self) -> Option<PlaceImage> {
        match (&self.image_data, &self.image_name) {
            (Some(data), _) if !data.is_empty() => Some(PlaceImage::Inline(data.clone())),
            (_, Some(name)) => Some(PlaceImage::Asset(name.clone())),
            _ => None,
        }
    }
}

/// Input to the add-place flow
#[derive(Debug, Clone)]
pub struct NewPlace {
    pub name: String,
    pub coordinate: Coordinate,
    pub image: Vec<u8>,
}

/// Entry of the built-in catalog
#[derive(Debug, Clone, Copy)]
pub struct SeedPlace {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub image_name: &'static str,
}
