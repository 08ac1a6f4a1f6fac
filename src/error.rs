//! Tracker error types with HTTP status code mapping.
//!
//! [`TrackerError`] is the central error type of the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Conflicts and backend failures additionally produce an "alert"
//! notification for the user (see [`TrackerError::alert_notice`]).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Collection, EntityId, Notice};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2101,
///     "message": "seat 3 is occupied by Bob",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 / 428                    |
/// | 2000–2999 | State / Not Found | 404 / 409 / 422              |
/// | 3000–3999 | Server            | 500 Internal Server Error    |
/// | 4000–4999 | Access            | 401 / 403                    |
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Request validation failed (missing or malformed field).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A destructive action was attempted without confirmation.
    #[error("confirmation required: {0}")]
    ConfirmationRequired(String),

    /// Record with the given id does not exist in the collection.
    #[error("{collection} record {id} not found")]
    NotFound {
        /// Collection searched.
        collection: Collection,
        /// Missing id.
        id: EntityId,
    },

    /// The target seat belongs to someone else.
    #[error("seat {seat} is occupied by {occupant}")]
    SeatOccupied {
        /// Requested seat.
        seat: u8,
        /// Name of the current occupant.
        occupant: String,
    },

    /// The player has no seat at the table.
    #[error("player {0} has no seat")]
    SeatNotHeld(EntityId),

    /// Finishing a session with no player records.
    #[error("Nada para salvar.")]
    NothingToSave,

    /// Registration with a username that already exists.
    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    /// Login with unknown username or wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Gesture refused by the access policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::ConfirmationRequired(_) => 1002,
            Self::NotFound { .. } => 2001,
            Self::SeatNotHeld(_) => 2002,
            Self::SeatOccupied { .. } => 2101,
            Self::DuplicateUsername(_) => 2102,
            Self::NothingToSave => 2201,
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
            Self::InvalidCredentials => 4001,
            Self::Forbidden(_) => 4003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::ConfirmationRequired(_) => StatusCode::PRECONDITION_REQUIRED,
            Self::NotFound { .. } | Self::SeatNotHeld(_) => StatusCode::NOT_FOUND,
            Self::SeatOccupied { .. } | Self::DuplicateUsername(_) => StatusCode::CONFLICT,
            Self::NothingToSave => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Alert to log and toast for errors the user must be told about.
    ///
    /// Validation failures, missing records and refused gestures stay
    /// silent; seat conflicts and backend failures are announced.
    #[must_use]
    pub fn alert_notice(&self) -> Option<Notice> {
        match self {
            Self::SeatOccupied { seat, occupant } => Some(Notice::alert(format!(
                "Cadeira {seat} já está ocupada por {occupant}"
            ))),
            Self::PersistenceError(_) | Self::Internal(_) => {
                Some(Notice::alert("Erro ao salvar. Tente novamente."))
            }
            _ => None,
        }
    }
}

impl From<sqlx::Error> for TrackerError {
    fn from(e: sqlx::Error) -> Self {
        Self::PersistenceError(e.to_string())
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(e: std::io::Error) -> Self {
        Self::PersistenceError(e.to_string())
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_map_to_409_with_alert() {
        let err = TrackerError::SeatOccupied {
            seat: 3,
            occupant: "Bob".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), 2101);
        let notice = err.alert_notice();
        assert!(notice.is_some_and(|n| n.message.contains("Bob")));
    }

    #[test]
    fn validation_failures_are_silent() {
        let err = TrackerError::InvalidRequest("name is required".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.alert_notice().is_none());
    }

    #[test]
    fn nothing_to_save_keeps_user_message() {
        assert_eq!(TrackerError::NothingToSave.to_string(), "Nada para salvar.");
        assert_eq!(
            TrackerError::NothingToSave.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn not_found_names_collection() {
        let err = TrackerError::NotFound {
            collection: Collection::Schedule,
            id: EntityId::new(4),
        };
        assert_eq!(err.to_string(), "schedule record 4 not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
