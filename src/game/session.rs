use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::geo;
use crate::{
    db,
    error::{GameError, Result},
    models::{Coordinate, GameSession, Guess, Place, PlaceImage, Settings},
};

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    /// Built but no places drawn yet
    Created,
    /// Waiting for the player's guess for the current round
    InRound,
    /// Guess scored, waiting for the player to move on
    AwaitingNext,
    /// All rounds played; terminal
    Completed,
}

impl RoundState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundState::Created => "created",
            RoundState::InRound => "in round",
            RoundState::AwaitingNext => "awaiting next round",
            RoundState::Completed => "completed",
        }
    }
}

/// What the player gets to see of the current round.
/// The target coordinate and name stay hidden until a guess is in.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundView {
    pub round: usize,
    pub total_rounds: usize,
    pub place_id: Uuid,
    pub image: Option<PlaceImage>,
}

/// Result of scoring a guess
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessOutcome {
    pub round: usize,
    pub distance_km: f64,
    pub is_last_round: bool,
    pub target_name: String,
    pub target: Coordinate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundAdvance {
    NextRound(RoundView),
    Completed(GameSession),
}

/// Round/session state machine for one play-through.
///
/// Places are drawn once at start; each round is an index into that
/// sequence. The engine holds the settings snapshot that every guess
/// references.
#[derive(Debug)]
pub struct SessionEngine {
    session: GameSession,
    settings: Settings,
    places: Vec<Place>,
    current_round_index: usize,
    state: RoundState,
    recorded: bool,
    last_activity: Instant,
}

impl SessionEngine {
    pub fn new(settings: Settings) -> Self {
        Self {
            session: GameSession::new(settings.rounds_per_session),
            settings,
            places: Vec::new(),
            current_round_index: 0,
            state: RoundState::Created,
            recorded: false,
            last_activity: Instant::now(),
        }
    }

    /// Load the sampled places and enter round 1
    pub fn start(&mut self, places: Vec<Place>) -> Result<()> {
        self.expect_state(RoundState::Created, "start the session")?;
        if places.is_empty() {
            return Err(GameError::NoPlacesAvailable);
        }

        self.places = places;
        self.current_round_index = 0;
        self.state = RoundState::InRound;
        self.touch();

        tracing::info!(
            "Session {} started with {} rounds ({} configured)",
            self.session.session_id,
            self.places.len(),
            self.settings.rounds_per_session
        );
        Ok(())
    }

    pub fn session_id(&self) -> Uuid {
        self.session.session_id
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// 1-based round number; 0 before the session starts
    pub fn current_round(&self) -> usize {
        match self.state {
            RoundState::Created => 0,
            _ => self.current_round_index + 1,
        }
    }

    /// Number of rounds actually played: configured rounds capped by the catalog
    pub fn total_rounds(&self) -> usize {
        self.places.len()
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Whether the completed session has been committed to history
    pub fn is_recorded(&self) -> bool {
        self.recorded
    }

    pub fn mark_recorded(&mut self) {
        self.recorded = true;
    }

    /// Reset the idle clock for a client that is only reading the session
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Current target as shown to the player, while a round is open
    pub fn round_view(&self) -> Option<RoundView> {
        match self.state {
            RoundState::InRound | RoundState::AwaitingNext => {
                let place = self.places.get(self.current_round_index)?;
                Some(RoundView {
                    round: self.current_round(),
                    total_rounds: self.total_rounds(),
                    place_id: place.place_id,
                    image: place.image(),
                })
            }
            RoundState::Created | RoundState::Completed => None,
        }
    }

    /// Score a guess for the current round and record it on the session
    pub fn submit_guess(&mut self, coordinate: Coordinate) -> Result<GuessOutcome> {
        self.expect_state(RoundState::InRound, "submit a guess")?;
        coordinate.validate()?;

        let target = self
            .places
            .get(self.current_round_index)
            .ok_or_else(|| GameError::InvalidState("current round has no target place".into()))?;

        let distance_km = geo::distance_km(coordinate, target.coordinate());
        let guess = Guess {
            guess_id: Uuid::new_v4(),
            session_id: self.session.session_id,
            round_number: self.current_round() as i32,
            place_id: target.place_id,
            settings_id: self.settings.settings_id,
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            distance_km,
            created_at: Utc::now(),
        };

        let outcome = GuessOutcome {
            round: self.current_round(),
            distance_km,
            is_last_round: self.current_round() == self.total_rounds(),
            target_name: target.name.clone(),
            target: target.coordinate(),
        };

        self.session.guesses.push(guess);
        self.state = RoundState::AwaitingNext;
        self.touch();

        tracing::debug!(
            "Session {} round {}: guess {:.2} km from {}",
            self.session.session_id,
            outcome.round,
            distance_km,
            outcome.target_name
        );
        Ok(outcome)
    }

    /// Move to the next round, or complete the session after the last one.
    ///
    /// A completed session that has not been marked recorded is handed back
    /// again unchanged, so a failed history commit can be retried.
    pub fn advance_round(&mut self) -> Result<RoundAdvance> {
        if self.state == RoundState::Completed && !self.recorded {
            self.touch();
            tracing::debug!(
                "Session {} already completed, returning it for commit",
                self.session.session_id
            );
            return Ok(RoundAdvance::Completed(self.session.clone()));
        }

        self.expect_state(RoundState::AwaitingNext, "advance to the next round")?;
        self.touch();

        if self.current_round() >= self.total_rounds() {
            self.session.score = Some(self.session.average_distance());
            self.session.completed_at = Some(Utc::now());
            self.state = RoundState::Completed;

            tracing::info!(
                "Session {} completed after {} rounds, average distance {:.2} km",
                self.session.session_id,
                self.session.rounds_played(),
                self.session.average_distance()
            );
            return Ok(RoundAdvance::Completed(self.session.clone()));
        }

        self.current_round_index += 1;
        self.state = RoundState::InRound;
        tracing::debug!(
            "Session {} advanced to round {}/{}",
            self.session.session_id,
            self.current_round(),
            self.total_rounds()
        );

        self.round_view()
            .map(RoundAdvance::NextRound)
            .ok_or_else(|| GameError::InvalidState("next round has no target place".into()))
    }

    fn expect_state(&self, expected: RoundState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GameError::InvalidTransition {
                state: self.state.as_str(),
                operation,
            })
        }
    }
}

/// Draw places for a new session according to the current settings and start it
pub async fn start_session(pool: &SqlitePool) -> Result<SessionEngine> {
    let settings = db::settings::current_settings(pool).await?;
    let places = db::places::sample_for_session(pool, settings.rounds()).await?;

    let mut engine = SessionEngine::new(settings);
    engine.start(places)?;
    Ok(engine)
}
