use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{GameError, Result};

pub const MIN_ROUNDS: i32 = 2;
pub const MAX_ROUNDS: i32 = 5;
pub const DEFAULT_ROUNDS: i32 = 5;

/// The single game configuration record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Settings {
    pub settings_id: Uuid,
    pub rounds_per_session: i32,
    pub updated_at: DateTime<Utc>,
}

impl Settings {
    pub fn validate_rounds(rounds: i32) -> Result<()> {
        if (MIN_ROUNDS..=MAX_ROUNDS).contains(&rounds) {
            Ok(())
        } else {
            Err(GameError::validation(format!(
                "rounds per session must be between {} and {}, got {}",
                MIN_ROUNDS, MAX_ROUNDS, rounds
            )))
        }
    }

    pub fn rounds(&self) -> usize {
        self.rounds_per_session.max(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rounds_range() {
        for n in MIN_ROUNDS..=MAX_ROUNDS {
            assert!(Settings::validate_rounds(n).is_ok(), "{} should be valid", n);
        }
        assert!(Settings::validate_rounds(1).is_err());
        assert!(Settings::validate_rounds(6).is_err());
        assert!(Settings::validate_rounds(-3).is_err());
    }
}
