//! Service layer: business logic orchestration.
//!
//! [`SessionService`] applies session state transitions, replays their row
//! writes against the [`crate::persistence::Store`], and emits change
//! events through the [`super::domain::EventBus`] and notifications
//! through the [`crate::notify::Notifier`].

pub mod session_service;

pub use session_service::SessionService;
