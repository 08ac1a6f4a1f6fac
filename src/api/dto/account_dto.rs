//! Login and presence DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Actor, PresenceEntry};

/// Request body for `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    /// Login name.
    pub username: String,
    /// Password, compared as plaintext.
    pub password: String,
}

/// The authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActorDto {
    /// Login name.
    pub username: String,
    /// Whether the user may move every seat.
    pub is_admin: bool,
}

impl From<&Actor> for ActorDto {
    fn from(a: &Actor) -> Self {
        Self {
            username: a.username.clone(),
            is_admin: a.is_admin,
        }
    }
}

/// Connected clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct PresenceResponse {
    /// Number of connected clients.
    pub online: usize,
    /// Connected clients, oldest first.
    pub clients: Vec<PresenceEntry>,
}
