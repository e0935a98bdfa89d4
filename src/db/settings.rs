use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{Settings, DEFAULT_ROUNDS},
};

/// Return the settings singleton, creating it with the default round count if absent.
///
/// The insert is conditional on the singleton key, so concurrent first reads
/// leave exactly one record and all observe the same one.
pub async fn current_settings(pool: &SqlitePool) -> Result<Settings> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO settings (singleton, settings_id, rounds_per_session, updated_at)
        VALUES (1, ?, ?, ?)
        ON CONFLICT (singleton) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(DEFAULT_ROUNDS)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    if inserted.rows_affected() > 0 {
        tracing::info!("Created default settings ({} rounds)", DEFAULT_ROUNDS);
    }

    let settings = sqlx::query_as::<_, Settings>(
        "SELECT settings_id, rounds_per_session, updated_at FROM settings WHERE singleton = 1",
    )
    .fetch_one(pool)
    .await?;

    Ok(settings)
}

/// Overwrite the rounds-per-session value of the singleton in place
pub async fn update_rounds(pool: &SqlitePool, rounds: i32) -> Result<Settings> {
    Settings::validate_rounds(rounds)?;

    let settings = sqlx::query_as::<_, Settings>(
        r#"
        INSERT INTO settings (singleton, settings_id, rounds_per_session, updated_at)
        VALUES (1, ?, ?, ?)
        ON CONFLICT (singleton) DO UPDATE SET
            rounds_per_session = excluded.rounds_per_session,
            updated_at = excluded.updated_at
        RETURNING settings_id, rounds_per_session, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(rounds)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::info!("Rounds per session set to {}", settings.rounds_per_session);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{remove_test_file_pool, test_file_pool, test_pool},
        error::GameError,
    };
    use std::sync::Arc;
    use tokio::sync::Barrier;
    use tokio_test::assert_err;

    async fn settings_row_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM settings")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_current_settings_creates_default() {
        let pool = test_pool().await;
        let settings = current_settings(&pool).await.unwrap();
        assert_eq!(settings.rounds_per_session, DEFAULT_ROUNDS);
        assert_eq!(settings_row_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_current_settings_is_idempotent() {
        let pool = test_pool().await;
        let first = current_settings(&pool).await.unwrap();
        let second = current_settings(&pool).await.unwrap();
        assert_eq!(first.settings_id, second.settings_id);
        assert_eq!(settings_row_count(&pool).await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_reads_create_one_record() {
        const READERS: usize = 8;
        let (pool, path) = test_file_pool(READERS as u32).await;

        // Open every connection up front so the first reads really overlap
        let mut held = Vec::new();
        for _ in 0..READERS {
            held.push(pool.acquire().await.unwrap());
        }
        assert_eq!(pool.size(), READERS as u32);
        drop(held);

        let barrier = Arc::new(Barrier::new(READERS));
        let handles: Vec<_> = (0..READERS)
            .map(|_| {
                let pool = pool.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    current_settings(&pool).await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().settings_id);
        }

        assert_eq!(ids.len(), READERS);
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(settings_row_count(&pool).await, 1);

        remove_test_file_pool(pool, path).await;
    }

    #[tokio::test]
    async fn test_update_rounds_round_trips() {
        let pool = test_pool().await;
        let original = current_settings(&pool).await.unwrap();

        for n in 2..=5 {
            update_rounds(&pool, n).await.unwrap();
            let settings = current_settings(&pool).await.unwrap();
            assert_eq!(settings.rounds_per_session, n);
            // Same record, updated in place
            assert_eq!(settings.settings_id, original.settings_id);
        }
        assert_eq!(settings_row_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_update_rounds_rejects_out_of_range() {
        let pool = test_pool().await;
        update_rounds(&pool, 3).await.unwrap();

        for n in [1, 6] {
            assert_err!(update_rounds(&pool, n).await);
            let result = update_rounds(&pool, n).await;
            assert!(matches!(result, Err(GameError::Validation(_))));
        }

        let settings = current_settings(&pool).await.unwrap();
        assert_eq!(settings.rounds_per_session, 3);
    }

    #[tokio::test]
    async fn test_update_rounds_before_first_read_creates_singleton() {
        let pool = test_pool().await;
        let updated = update_rounds(&pool, 2).await.unwrap();
        let current = current_settings(&pool).await.unwrap();
        assert_eq!(updated, current);
        assert_eq!(settings_row_count(&pool).await, 1);
    }
}
