//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams change events, notifications
//! and presence counts, and carries the seat-click protocol and presence
//! announcements.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
