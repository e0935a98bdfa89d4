use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Coordinate;

/// One submitted guess, scored against the round's target place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Guess {
    pub guess_id: Uuid,
    pub session_id: Uuid,
    /// 1-based round this guess was made in
    pub round_number: i32,
    pub place_id: Uuid,
    pub settings_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
    pub created_at: DateTime<Utc>,
}

impl Guess {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A play-through of several rounds. Owns its guesses in round order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub configured_rounds: i32,
    pub guesses: Vec<Guess>,
    /// Mean guess distance in km, set once the session completes
    pub score: Option<f64>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub fn new(configured_rounds: i32) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            created_at: Utc::now(),
            configured_rounds,
            guesses: Vec::new(),
            score: None,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.score.is_some() && self.completed_at.is_some()
    }

    pub fn rounds_played(&self) -> usize {
        self.guesses.len()
    }

    /// Arithmetic mean of guess distances; 0 when nothing was guessed
    pub fn average_distance(&self) -> f64 {
        if self.guesses.is_empty() {
            return 0.0;
        }
        let total: f64 = self.guesses.iter().map(|g| g.distance_km).sum();
        total / self.guesses.len() as f64
    }
}

/// Row of the `game_sessions` table
#[derive(Debug, Clone, FromRow)]
pub struct GameSessionRecord {
    pub seq: i64,
    pub session_id: Uuid,
    pub configured_rounds: i32,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl GameSessionRecord {
    pub fn into_session(self, guesses: Vec<Guess>) -> GameSession {
        GameSession {
            session_id: self.session_id,
            created_at: self.created_at,
            configured_rounds: self.configured_rounds,
            guesses,
            score: Some(self.score),
            completed_at: Some(self.completed_at),
        }
    }
}

/// History list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SessionSummary {
    #[serde(skip)]
    pub seq: i64,
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub score: f64,
    pub rounds_played: i64,
}

/// Ordering of the history list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Most recent first
    #[default]
    DateDescending,
    /// Best (lowest) average distance first
    ScoreAscending,
}
