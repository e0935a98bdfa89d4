use std::cmp::Ordering;

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    error::{GameError, Result},
    models::{GameSession, GameSessionRecord, Guess, SessionSummary, SortKey},
};

/// Persist a completed session and all of its guesses in one transaction
pub async fn record_completed_session(pool: &SqlitePool, session: &GameSession) -> Result<()> {
    let (score, completed_at) = match (session.score, session.completed_at) {
        (Some(score), Some(completed_at)) => (score, completed_at),
        _ => {
            return Err(GameError::InvalidState(format!(
                "session {} has not completed",
                session.session_id
            )))
        }
    };

    let mut tx = pool.begin().await?;

    let already_recorded: Option<i64> =
        sqlx::query_scalar("SELECT seq FROM game_sessions WHERE session_id = ?")
            .bind(session.session_id)
            .fetch_optional(&mut *tx)
            .await?;
    if already_recorded.is_some() {
        return Err(GameError::InvalidState(format!(
            "session {} is already recorded",
            session.session_id
        )));
    }

    sqlx::query(
        r#"
        INSERT INTO game_sessions (session_id, configured_rounds, score, created_at, completed_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(session.session_id)
    .bind(session.configured_rounds)
    .bind(score)
    .bind(session.created_at)
    .bind(completed_at)
    .execute(&mut *tx)
    .await?;

    for guess in &session.guesses {
        sqlx::query(
            r#"
            INSERT INTO guesses (
                guess_id, session_id, round_number, place_id, settings_id,
                latitude, longitude, distance_km, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(guess.guess_id)
        .bind(session.session_id)
        .bind(guess.round_number)
        .bind(guess.place_id)
        .bind(guess.settings_id)
        .bind(guess.latitude)
        .bind(guess.longitude)
        .bind(guess.distance_km)
        .bind(guess.created_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        "Recorded session {} ({} guesses, score {:.2} km)",
        session.session_id,
        session.guesses.len(),
        score
    );
    Ok(())
}

/// Completed sessions in the requested order
pub async fn list_sessions(pool: &SqlitePool, sort_key: SortKey) -> Result<Vec<SessionSummary>> {
    let mut summaries = sqlx::query_as::<_, SessionSummary>(
        r#"
        SELECT s.seq, s.session_id, s.created_at, s.score,
               (SELECT COUNT(*) FROM guesses g WHERE g.session_id = s.session_id) AS rounds_played
        FROM game_sessions s
        ORDER BY s.seq
        "#,
    )
    .fetch_all(pool)
    .await?;

    sort_summaries(&mut summaries, sort_key);
    Ok(summaries)
}

/// Stable sort over rows already in insertion order
pub fn sort_summaries(summaries: &mut [SessionSummary], sort_key: SortKey) {
    match sort_key {
        SortKey::DateDescending => summaries.sort_by(by_date_descending),
        SortKey::ScoreAscending => summaries.sort_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| by_date_descending(a, b))
        }),
    }
}

fn by_date_descending(a: &SessionSummary, b: &SessionSummary) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.seq.cmp(&b.seq))
}

pub async fn get_session(pool: &SqlitePool, session_id: Uuid) -> Result<Option<GameSession>> {
    let record = sqlx::query_as::<_, GameSessionRecord>(
        r#"
        SELECT seq, session_id, configured_rounds, score, created_at, completed_at
        FROM game_sessions
        WHERE session_id = ?
        "#,
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    match record {
        Some(record) => {
            let guesses = guesses_for_session(pool, session_id).await?;
            Ok(Some(record.into_session(guesses)))
        }
        None => Ok(None),
    }
}

/// Guesses of a session in round order
pub async fn guesses_for_session(pool: &SqlitePool, session_id: Uuid) -> Result<Vec<Guess>> {
    let guesses = sqlx::query_as::<_, Guess>(
        r#"
        SELECT guess_id, session_id, round_number, place_id, settings_id,
               latitude, longitude, distance_km, created_at
        FROM guesses
        WHERE session_id = ?
        ORDER BY round_number
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(guesses)
}

/// Remove a session and, through the foreign key cascade, its guesses.
/// Returns whether anything was deleted; a missing id is not an error.
pub async fn delete_session(pool: &SqlitePool, session_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM game_sessions WHERE session_id = ?")
        .bind(session_id)
        .execute(pool)
        .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        tracing::info!("Deleted session {}", session_id);
    } else {
        tracing::debug!("Delete of unknown session {} ignored", session_id);
    }
    Ok(deleted)
}
