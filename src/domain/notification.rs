//! Notification log records and transient toasts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EntityId;

/// Presentation tag of a notification. Only drives color on the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Neutral information.
    #[default]
    Info,
    /// A completed action worth celebrating.
    Success,
    /// A rejected action or a failure.
    Alert,
}

impl Severity {
    /// Column text for the `notification.kind` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Alert => "alert",
        }
    }

    /// Parses stored column text, falling back to [`Severity::Info`].
    #[must_use]
    pub fn parse_lossy(raw: &str) -> Self {
        match raw {
            "success" => Self::Success,
            "alert" => Self::Alert,
            _ => Self::Info,
        }
    }
}

/// Message produced by a state transition, before it becomes a logged
/// [`Notification`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Text shown to the user.
    pub message: String,
    /// Presentation tag.
    pub severity: Severity,
}

impl Notice {
    /// Creates a notice.
    #[must_use]
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    /// Shorthand for an [`Severity::Info`] notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    /// Shorthand for a [`Severity::Success`] notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    /// Shorthand for an [`Severity::Alert`] notice.
    #[must_use]
    pub fn alert(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Alert)
    }
}

/// Durable notification log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    /// Creation-time id.
    pub id: EntityId,
    /// Text shown to the user.
    pub message: String,
    /// Presentation tag.
    #[serde(rename = "type")]
    pub severity: Severity,
    /// Whether the user has seen it.
    #[serde(default)]
    pub read: bool,
    /// When it was emitted.
    pub date: DateTime<Utc>,
}

/// On-screen popup mirroring a notification for a short time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Toast {
    /// Same id as the notification it mirrors.
    pub id: EntityId,
    /// Text shown to the user.
    pub message: String,
    /// Presentation tag.
    #[serde(rename = "type")]
    pub severity: Severity,
    /// When the toast disappears.
    pub expires_at: DateTime<Utc>,
}

impl Toast {
    /// Returns `true` once `now` has reached the expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Oscillator shape of a [`Chime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    /// Pure sine tone.
    Sine,
}

/// Audio cue a client synthesizes when a notification arrives.
///
/// A sine tone sweeping down from `start_hz` to `end_hz` over `sweep_ms`,
/// with `gain` decaying to silence over `duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Chime {
    /// Oscillator waveform.
    pub waveform: Waveform,
    /// Starting frequency.
    pub start_hz: f32,
    /// Frequency reached at the end of the sweep.
    pub end_hz: f32,
    /// Sweep length.
    pub sweep_ms: u32,
    /// Initial gain.
    pub gain: f32,
    /// Total tone length.
    pub duration_ms: u32,
}

impl Chime {
    /// The bell-like cue played for every notification.
    pub const BELL: Self = Self {
        waveform: Waveform::Sine,
        start_hz: 800.0,
        end_hz: 400.0,
        sweep_ms: 300,
        gain: 0.1,
        duration_ms: 500,
    };
}
