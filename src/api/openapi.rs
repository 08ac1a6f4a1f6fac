//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use crate::api::dto;
use crate::api::handlers::{auth, notifications, players, schedule, seats, session, system, visitors};
use crate::domain;
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI description, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "homegame-gateway",
        description = "Session tracker for home poker games: buy-ins, seats, sessions and notifications."
    ),
    paths(
        system::health_handler,
        players::create_player,
        players::list_players,
        players::get_player,
        players::rebuy,
        players::checkout,
        players::cancel_entry,
        players::list_history,
        players::delete_history_item,
        players::clear_history,
        seats::list_seats,
        seats::move_seat,
        seats::swap_seats,
        seats::remove_seat,
        session::finish_session,
        session::list_sessions,
        session::clear_sessions,
        session::stats,
        schedule::list_schedule,
        schedule::create_schedule,
        schedule::delete_schedule,
        visitors::list_visitors,
        visitors::create_visitor,
        visitors::delete_visitor,
        notifications::list_notifications,
        notifications::mark_all_read,
        notifications::clear_notifications,
        notifications::list_toasts,
        notifications::dismiss_toast,
        notifications::get_sound,
        notifications::put_sound,
        auth::login,
        auth::register,
        auth::presence,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        system::HealthResponse,
        dto::CreatePlayerRequest,
        dto::RebuyRequest,
        dto::CheckoutRequest,
        dto::PlayerDto,
        dto::AdmissionResponse,
        dto::PlayerListResponse,
        dto::SeatDto,
        dto::MoveSeatRequest,
        dto::SwapSeatsRequest,
        dto::SwapSeatsResponse,
        dto::SeatListResponse,
        dto::SessionDto,
        dto::SessionListResponse,
        dto::StatsDto,
        dto::CreateScheduleRequest,
        dto::ScheduleDto,
        dto::ScheduleListResponse,
        dto::CreateVisitorRequest,
        dto::VisitorDto,
        dto::VisitorListResponse,
        dto::NotificationDto,
        dto::NotificationListResponse,
        dto::ToastDto,
        dto::ToastListResponse,
        dto::SoundPreference,
        dto::CredentialsRequest,
        dto::ActorDto,
        dto::PresenceResponse,
        dto::RemovedResponse,
        domain::EntityId,
        domain::Money,
        domain::SeatNumber,
        domain::PlayerStatus,
        domain::Severity,
        domain::PresenceEntry,
    )),
    tags(
        (name = "Players", description = "Buy-ins, rebuys and checkouts"),
        (name = "History", description = "Players who left the table"),
        (name = "Seats", description = "The 12-seat table layout"),
        (name = "Sessions", description = "Finished nights and live totals"),
        (name = "Schedule", description = "Upcoming games"),
        (name = "Visitors", description = "Non-playing guests"),
        (name = "Notifications", description = "Notification log, toasts and sound"),
        (name = "Accounts", description = "Login, registration and presence"),
        (name = "System", description = "Health and documentation"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/players",
            "/api/v1/players/{id}/checkout",
            "/api/v1/seats/swap",
            "/api/v1/session/finish",
            "/api/v1/schedule",
            "/api/v1/visitors",
            "/api/v1/preferences/sound",
            "/api/v1/auth/login",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
