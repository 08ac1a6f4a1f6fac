//! Spectators present at the game.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EntityId;

/// Someone watching the game without playing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Visitor {
    /// Creation-time id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Arrival time.
    pub since: DateTime<Utc>,
}
