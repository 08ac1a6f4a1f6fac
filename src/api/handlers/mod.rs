//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod notifications;
pub mod players;
pub mod schedule;
pub mod seats;
pub mod session;
pub mod system;
pub mod visitors;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(players::routes())
        .merge(seats::routes())
        .merge(session::routes())
        .merge(schedule::routes())
        .merge(visitors::routes())
        .merge(notifications::routes())
        .merge(auth::routes())
}
