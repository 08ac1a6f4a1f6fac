//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; `/health`,
//! `/api-docs/openapi.json` and `/ws` live at the root.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the served application: REST, WebSocket, docs and HTTP layers.
pub fn build_app(state: AppState) -> Router {
    let router = build_router().route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/swagger.json", <openapi::ApiDoc as utoipa::OpenApi>::openapi()),
    );

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::TrackerConfig;
    use crate::persistence::MemoryStore;

    fn app() -> Router {
        let state = AppState::new(Arc::new(MemoryStore::new()), &TrackerConfig::default());
        build_app(state)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        };
        let Ok(request) = request else {
            panic!("request should build");
        };
        let Ok(response) = app.clone().oneshot(request).await else {
            panic!("router is infallible");
        };
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body should read");
        };
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_version() {
        let app = app();
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn buy_in_seats_the_player() {
        let app = app();
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/players",
            Some(json!({"name": "Alice", "buy_in": 100.0})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["seat"], 1);
        assert_eq!(body["table_full"], false);
        assert_eq!(body["player"]["buy_in"], 100.0);

        let (status, body) = call(&app, Method::GET, "/api/v1/seats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["name"], "Alice");
        assert_eq!(body["free_seats"].as_array().map(Vec::len), Some(11));
    }

    #[tokio::test]
    async fn blank_name_is_bad_request() {
        let app = app();
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/players",
            Some(json!({"name": "  ", "buy_in": 50.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn destructive_routes_require_confirmation() {
        let app = app();
        let (status, _) = call(&app, Method::DELETE, "/api/v1/history", None).await;
        assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);
        let (status, body) = call(&app, Method::DELETE, "/api/v1/history?confirm=true", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["removed"], 0);
    }

    #[tokio::test]
    async fn finishing_an_empty_table_is_unprocessable() {
        let app = app();
        let (status, body) =
            call(&app, Method::POST, "/api/v1/session/finish?confirm=true", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["message"], "Nada para salvar.");
    }

    #[tokio::test]
    async fn empty_table_is_reported_before_asking_for_confirmation() {
        let app = app();
        let (status, body) = call(&app, Method::POST, "/api/v1/session/finish", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], 2201);

        call(
            &app,
            Method::POST,
            "/api/v1/players",
            Some(json!({"name": "Alice", "buy_in": 50.0})),
        )
        .await;
        let (status, _) = call(&app, Method::POST, "/api/v1/session/finish", None).await;
        assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);
    }

    #[tokio::test]
    async fn seat_out_of_range_is_rejected() {
        let app = app();
        let (_, body) = call(
            &app,
            Method::POST,
            "/api/v1/players",
            Some(json!({"name": "Bob", "buy_in": 20.0})),
        )
        .await;
        let Some(id) = body["player"]["player_id"].as_i64() else {
            panic!("player id should be numeric");
        };
        let (status, _) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/seats/{id}"),
            Some(json!({"seat": 13})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sound_preference_round_trips() {
        let app = app();
        let (_, body) = call(&app, Method::GET, "/api/v1/preferences/sound", None).await;
        assert_eq!(body["enabled"], true);
        let (status, _) = call(
            &app,
            Method::PUT,
            "/api/v1/preferences/sound",
            Some(json!({"enabled": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&app, Method::GET, "/api/v1/preferences/sound", None).await;
        assert_eq!(body["enabled"], false);
    }
}
