//! Login, registration and presence.
//!
//! Accounts only label who is at the keyboard; they gate nothing on the
//! REST surface.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{ActorDto, CredentialsRequest, PresenceResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, TrackerError};

/// `POST /auth/login`
///
/// # Errors
///
/// Returns [`TrackerError::InvalidCredentials`] on a username/password
/// mismatch.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Accounts",
    summary = "Log in",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Logged-in user", body = ActorDto),
        (status = 401, description = "Unknown user or wrong password", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let actor = state
        .session_service
        .login(&req.username, &req.password)
        .await?;
    Ok(Json(ActorDto::from(&actor)))
}

/// `POST /auth/register`
///
/// # Errors
///
/// Returns [`TrackerError::InvalidRequest`] for blank fields or
/// [`TrackerError::DuplicateUsername`] when the name is taken.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Accounts",
    summary = "Create an account",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Registered user", body = ActorDto),
        (status = 400, description = "Blank username or password", body = ErrorResponse),
        (status = 409, description = "Username taken", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, TrackerError> {
    let actor = state
        .session_service
        .register(&req.username, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(ActorDto::from(&actor))))
}

/// `GET /presence`: Connected realtime clients.
#[utoipa::path(
    get,
    path = "/api/v1/presence",
    tag = "Accounts",
    summary = "Who is online",
    responses(
        (status = 200, description = "Connected clients", body = PresenceResponse),
    )
)]
pub async fn presence(State(state): State<AppState>) -> impl IntoResponse {
    let clients = state.session_service.presence().await;
    Json(PresenceResponse {
        online: clients.len(),
        clients,
    })
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/presence", get(presence))
}
