pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod game;
pub mod models;
pub mod routes;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use config::Config;
use dashmap::DashMap;
use game::SessionEngine;
use sqlx::SqlitePool;
use uuid::Uuid;

/// How often the idle-session sweep runs
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub db: SqlitePool,
    /// Sessions being played, keyed by session handle
    pub sessions: DashMap<Uuid, SessionEngine>,
}

impl AppState {
    pub fn new(config: Config, db: SqlitePool) -> Self {
        Self {
            config,
            db,
            sessions: DashMap::new(),
        }
    }

    /// Drop live sessions that saw no activity within `idle_timeout`.
    /// Returns the number of sessions evicted.
    pub fn evict_idle_sessions(&self, now: Instant, idle_timeout: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|session_id, engine| {
            let idle = now.saturating_duration_since(engine.last_activity());
            if idle > idle_timeout {
                tracing::info!(
                    "Evicting session {} (idle for {}s)",
                    session_id,
                    idle.as_secs()
                );
                false
            } else {
                true
            }
        });
        before.saturating_sub(self.sessions.len())
    }
}

/// Background task that periodically evicts abandoned sessions
pub async fn session_cleanup_task(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    let idle_timeout = state.config.session_idle_timeout();

    loop {
        interval.tick().await;
        let evicted = state.evict_idle_sessions(Instant::now(), idle_timeout);
        if evicted > 0 {
            tracing::info!("Evicted {} idle sessions", evicted);
        }
    }
}
