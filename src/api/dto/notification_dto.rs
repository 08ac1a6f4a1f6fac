//! Notification, toast and preference DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EntityId, Notification, Severity, Toast};

/// A notification log entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationDto {
    /// Entry id.
    pub notification_id: EntityId,
    /// Message text.
    pub message: String,
    /// `info`, `success` or `alert`.
    pub severity: Severity,
    /// Whether it has been seen.
    pub read: bool,
    /// Creation time.
    pub date: DateTime<Utc>,
}

impl From<&Notification> for NotificationDto {
    fn from(n: &Notification) -> Self {
        Self {
            notification_id: n.id,
            message: n.message.clone(),
            severity: n.severity,
            read: n.read,
            date: n.date,
        }
    }
}

/// The notification log.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationListResponse {
    /// Entries, newest first.
    pub data: Vec<NotificationDto>,
    /// Number of unread entries.
    pub unread: usize,
}

/// A live toast.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToastDto {
    /// Same id as the notification it mirrors.
    pub toast_id: EntityId,
    /// Message text.
    pub message: String,
    /// `info`, `success` or `alert`.
    pub severity: Severity,
    /// When it disappears.
    pub expires_at: DateTime<Utc>,
}

impl From<&Toast> for ToastDto {
    fn from(t: &Toast) -> Self {
        Self {
            toast_id: t.id,
            message: t.message.clone(),
            severity: t.severity,
            expires_at: t.expires_at,
        }
    }
}

/// Live toasts.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToastListResponse {
    /// Toasts, oldest first.
    pub data: Vec<ToastDto>,
}

/// Body of `GET|PUT /preferences/sound`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct SoundPreference {
    /// Whether notifications carry a chime.
    pub enabled: bool,
}
