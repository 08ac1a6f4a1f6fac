//! Schedule and visitor DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EntityId, ScheduleEntry, Visitor};

/// Request body for `POST /schedule`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateScheduleRequest {
    /// Title, e.g. "Sexta no Beto".
    pub title: String,
    /// Planned date (ISO-8601).
    pub date: DateTime<Utc>,
}

/// A planned game.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScheduleDto {
    /// Entry id.
    pub schedule_id: EntityId,
    /// Title.
    pub title: String,
    /// Planned date.
    pub date: DateTime<Utc>,
}

impl From<&ScheduleEntry> for ScheduleDto {
    fn from(s: &ScheduleEntry) -> Self {
        Self {
            schedule_id: s.id,
            title: s.title.clone(),
            date: s.date,
        }
    }
}

/// List of planned games.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleListResponse {
    /// Entries in insertion order.
    pub data: Vec<ScheduleDto>,
}

/// Request body for `POST /visitors`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVisitorRequest {
    /// Display name.
    pub name: String,
}

/// A visitor at the venue.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VisitorDto {
    /// Visitor id.
    pub visitor_id: EntityId,
    /// Display name.
    pub name: String,
    /// Arrival time.
    pub since: DateTime<Utc>,
}

impl From<&Visitor> for VisitorDto {
    fn from(v: &Visitor) -> Self {
        Self {
            visitor_id: v.id,
            name: v.name.clone(),
            since: v.since,
        }
    }
}

/// List of visitors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VisitorListResponse {
    /// Visitors in arrival order.
    pub data: Vec<VisitorDto>,
}
