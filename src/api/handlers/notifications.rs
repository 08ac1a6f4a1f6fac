//! Notification log, toast and sound preference handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::dto::{
    NotificationDto, NotificationListResponse, RemovedResponse, SoundPreference, ToastDto,
    ToastListResponse,
};
use crate::app_state::AppState;
use crate::domain::{Collection, EntityId};
use crate::error::{ErrorResponse, TrackerError};

/// `GET /notifications`: Notification log, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "Notifications",
    summary = "List notifications",
    responses(
        (status = 200, description = "Notification log with unread count", body = NotificationListResponse),
    )
)]
pub async fn list_notifications(State(state): State<AppState>) -> impl IntoResponse {
    let data: Vec<NotificationDto> = state
        .notifier
        .notifications()
        .await
        .iter()
        .map(NotificationDto::from)
        .collect();
    let unread = data.iter().filter(|n| !n.read).count();
    Json(NotificationListResponse { data, unread })
}

/// `POST /notifications/read`: Mark every notification read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read",
    tag = "Notifications",
    summary = "Mark all notifications read",
    responses(
        (status = 200, description = "Number of notifications that were unread", body = RemovedResponse),
    )
)]
pub async fn mark_all_read(State(state): State<AppState>) -> impl IntoResponse {
    let removed = state.notifier.mark_all_read().await;
    Json(RemovedResponse { removed })
}

/// `DELETE /notifications`: Empty the notification log.
#[utoipa::path(
    delete,
    path = "/api/v1/notifications",
    tag = "Notifications",
    summary = "Clear notifications",
    responses(
        (status = 200, description = "Number of notifications removed", body = RemovedResponse),
    )
)]
pub async fn clear_notifications(State(state): State<AppState>) -> impl IntoResponse {
    let removed = state.notifier.clear().await;
    Json(RemovedResponse { removed })
}

/// `GET /toasts`: Toasts still on screen.
#[utoipa::path(
    get,
    path = "/api/v1/toasts",
    tag = "Notifications",
    summary = "List live toasts",
    responses(
        (status = 200, description = "Unexpired toasts", body = ToastListResponse),
    )
)]
pub async fn list_toasts(State(state): State<AppState>) -> impl IntoResponse {
    let data = state
        .notifier
        .toasts()
        .await
        .iter()
        .map(ToastDto::from)
        .collect();
    Json(ToastListResponse { data })
}

/// `DELETE /toasts/{id}`: Dismiss a toast early.
///
/// # Errors
///
/// Returns [`TrackerError::NotFound`] when the toast already expired.
#[utoipa::path(
    delete,
    path = "/api/v1/toasts/{id}",
    tag = "Notifications",
    summary = "Dismiss a toast",
    params(("id" = i64, Path, description = "Toast id")),
    responses(
        (status = 204, description = "Toast dismissed"),
        (status = 404, description = "No such toast", body = ErrorResponse),
    )
)]
pub async fn dismiss_toast(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<impl IntoResponse, TrackerError> {
    if state.notifier.dismiss_toast(id).await {
        Ok(axum::http::StatusCode::NO_CONTENT)
    } else {
        Err(TrackerError::NotFound {
            collection: Collection::Notifications,
            id,
        })
    }
}

/// `GET /preferences/sound`
#[utoipa::path(
    get,
    path = "/api/v1/preferences/sound",
    tag = "Notifications",
    summary = "Get the sound preference",
    responses(
        (status = 200, description = "Whether notifications chime", body = SoundPreference),
    )
)]
pub async fn get_sound(State(state): State<AppState>) -> impl IntoResponse {
    Json(SoundPreference {
        enabled: state.notifier.sound_enabled().await,
    })
}

/// `PUT /preferences/sound`
#[utoipa::path(
    put,
    path = "/api/v1/preferences/sound",
    tag = "Notifications",
    summary = "Set the sound preference",
    request_body = SoundPreference,
    responses(
        (status = 200, description = "Stored preference", body = SoundPreference),
    )
)]
pub async fn put_sound(
    State(state): State<AppState>,
    Json(pref): Json<SoundPreference>,
) -> impl IntoResponse {
    state.notifier.set_sound_enabled(pref.enabled).await;
    Json(pref)
}

/// Notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(list_notifications).delete(clear_notifications),
        )
        .route("/notifications/read", post(mark_all_read))
        .route("/toasts", get(list_toasts))
        .route("/toasts/{id}", delete(dismiss_toast))
        .route("/preferences/sound", get(get_sound).put(put_sound))
}
