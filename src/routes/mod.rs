pub mod health;
pub mod history;
pub mod places;
pub mod sessions;
pub mod settings;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/places", get(places::list_places).post(places::add_place))
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/sessions", post(sessions::start_session))
        .route("/sessions/{session_id}/round", get(sessions::current_round))
        .route("/sessions/{session_id}/guess", post(sessions::submit_guess))
        .route("/sessions/{session_id}/advance", post(sessions::advance_round))
        .route("/history", get(history::list_history))
        .route(
            "/history/{session_id}",
            get(history::get_history_entry).delete(history::delete_history_entry),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::BUILTIN_CATALOG, db, test_support::test_state};
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(
        state: &Arc<AppState>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let app = create_routes().with_state(state.clone());
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = test_state().await;
        let (status, body) = send(&state, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_settings_endpoints() {
        let state = test_state().await;

        let (status, body) = send(&state, Method::GET, "/api/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rounds_per_session"], 5);

        let (status, body) = send(
            &state,
            Method::PUT,
            "/api/settings",
            Some(json!({ "rounds_per_session": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rounds_per_session"], 3);

        let (status, _) = send(
            &state,
            Method::PUT,
            "/api/settings",
            Some(json!({ "rounds_per_session": 6 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_place_endpoint() {
        let state = test_state().await;

        let (status, body) = send(
            &state,
            Method::POST,
            "/api/places",
            Some(json!({
                "name": "Wawel Castle",
                "latitude": 50.054,
                "longitude": 19.935,
                "image_base64": "aW1hZ2U="
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["source"], "user");
        assert_eq!(body["image"]["kind"], "inline");
        assert_eq!(body["image"]["data_base64"], "aW1hZ2U=");

        let (status, _) = send(
            &state,
            Method::POST,
            "/api/places",
            Some(json!({
                "name": "Nowhere",
                "latitude": 120.0,
                "longitude": 0.0,
                "image_base64": "aW1hZ2U="
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&state, Method::GET, "/api/places", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_start_session_without_places_conflicts() {
        let state = test_state().await;
        let (status, _) = send(&state, Method::POST, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let state = test_state().await;
        let uri = format!("/api/sessions/{}/round", uuid::Uuid::new_v4());
        let (status, _) = send(&state, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_full_game_flow() {
        let state = test_state().await;
        db::places::seed_if_empty(&state.db, BUILTIN_CATALOG).await.unwrap();
        db::settings::update_rounds(&state.db, 2).await.unwrap();

        let (status, body) = send(&state, Method::POST, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["state"], "in_round");
        assert_eq!(body["round"]["total_rounds"], 2);
        assert!(body["round"].get("latitude").is_none());
        let session_id = body["session_id"].as_str().unwrap().to_string();

        let guess_uri = format!("/api/sessions/{}/guess", session_id);
        let advance_uri = format!("/api/sessions/{}/advance", session_id);
        let guess = json!({ "latitude": 0.0, "longitude": 0.0 });

        let (status, body) = send(&state, Method::POST, &guess_uri, Some(guess.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_last_round"], false);
        assert!(body["distance_km"].as_f64().unwrap() > 0.0);

        // A second guess in the same round is out of order
        let (status, _) = send(&state, Method::POST, &guess_uri, Some(guess.clone())).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&state, Method::POST, &advance_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completed"], false);
        assert_eq!(body["round"]["round"], 2);

        let (_, body) = send(&state, Method::POST, &guess_uri, Some(guess)).await;
        assert_eq!(body["is_last_round"], true);

        let (status, body) = send(&state, Method::POST, &advance_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completed"], true);
        assert_eq!(body["session"]["guesses"].as_array().unwrap().len(), 2);
        assert!(state.sessions.is_empty());

        let (_, body) = send(&state, Method::GET, "/api/history?sort=score_ascending", None).await;
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["session_id"], session_id.as_str());
        assert_eq!(entries[0]["rounds_played"], 2);

        let history_uri = format!("/api/history/{}", session_id);
        let (status, _) = send(&state, Method::DELETE, &history_uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&state, Method::DELETE, &history_uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&state, Method::GET, &history_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    /// Play a two-round session up to the final advance, returning its id
    async fn play_to_last_advance(state: &Arc<AppState>) -> String {
        db::places::seed_if_empty(&state.db, BUILTIN_CATALOG).await.unwrap();
        db::settings::update_rounds(&state.db, 2).await.unwrap();

        let (_, body) = send(state, Method::POST, "/api/sessions", None).await;
        let session_id = body["session_id"].as_str().unwrap().to_string();
        let guess_uri = format!("/api/sessions/{}/guess", session_id);
        let advance_uri = format!("/api/sessions/{}/advance", session_id);
        let guess = json!({ "latitude": 10.0, "longitude": 10.0 });

        send(state, Method::POST, &guess_uri, Some(guess.clone())).await;
        send(state, Method::POST, &advance_uri, None).await;
        let (status, _) = send(state, Method::POST, &guess_uri, Some(guess)).await;
        assert_eq!(status, StatusCode::OK);
        session_id
    }

    #[tokio::test]
    async fn test_failed_history_commit_can_be_retried() {
        let state = test_state().await;
        let session_id = play_to_last_advance(&state).await;
        let advance_uri = format!("/api/sessions/{}/advance", session_id);

        sqlx::query("ALTER TABLE game_sessions RENAME TO game_sessions_offline")
            .execute(&state.db)
            .await
            .unwrap();
        let (status, body) = send(&state, Method::POST, &advance_uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
        assert_eq!(state.sessions.len(), 1);

        sqlx::query("ALTER TABLE game_sessions_offline RENAME TO game_sessions")
            .execute(&state.db)
            .await
            .unwrap();
        let (status, body) = send(&state, Method::POST, &advance_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completed"], true);
        assert_eq!(body["session"]["guesses"].as_array().unwrap().len(), 2);
        assert!(state.sessions.is_empty());

        let (_, body) = send(&state, Method::GET, "/api/history", None).await;
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["session_id"], session_id.as_str());
        assert_eq!(entries[0]["rounds_played"], 2);

        // Once committed the handle is released
        let (status, _) = send(&state, Method::POST, &advance_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_history_entry_has_error_body() {
        let state = test_state().await;
        let uri = format!("/api/history/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&state, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_polling_round_keeps_session_alive() {
        let state = test_state().await;
        db::places::seed_if_empty(&state.db, BUILTIN_CATALOG).await.unwrap();

        let (_, body) = send(&state, Method::POST, "/api/sessions", None).await;
        let session_id: uuid::Uuid = body["session_id"].as_str().unwrap().parse().unwrap();
        let before = state.sessions.get(&session_id).unwrap().last_activity();

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let uri = format!("/api/sessions/{}/round", session_id);
        let (status, _) = send(&state, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let after = state.sessions.get(&session_id).unwrap().last_activity();
        assert!(after > before);
    }
}
