//! # homegame-gateway
//!
//! REST API and WebSocket gateway that tracks a home poker game: who bought
//! in and for how much, who sits where at the 12-seat table, who cashed
//! out, and the totals of each finished night.
//!
//! Every mutation is applied to the in-memory [`domain::SessionState`],
//! persisted row by row through a [`persistence::Store`], and broadcast to
//! WebSocket clients over the [`domain::EventBus`]. With the PostgreSQL
//! backend, changes made by other writers arrive on the
//! [`persistence::change_feed::ChangeFeed`] and trigger a reload of the
//! affected collection.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── SessionService (service/)   ── Notifier (notify/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── SessionState (domain/)
//!     │
//!     └── Store: memory | local JSON | PostgreSQL + NOTIFY
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod service;
pub mod ws;
