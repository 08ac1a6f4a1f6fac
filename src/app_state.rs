//! Shared application state injected into all Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AccessMode, TrackerConfig};
use crate::domain::{AccessPolicy, EventBus, IdGenerator, OpenAccess, OwnerOrAdmin};
use crate::notify::Notifier;
use crate::persistence::Store;
use crate::service::SessionService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session service for all business logic.
    pub session_service: Arc<SessionService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Notification log, toasts and sound preference.
    pub notifier: Arc<Notifier>,
}

impl AppState {
    /// Wires the notifier and session service over `store`.
    ///
    /// The returned state is empty; call
    /// [`SessionService::load_all`] before serving.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: &TrackerConfig) -> Self {
        let event_bus = EventBus::new(config.event_bus_capacity);
        let ids = Arc::new(IdGenerator::new());
        let notifier = Arc::new(Notifier::new(
            Arc::clone(&store),
            event_bus.clone(),
            Arc::clone(&ids),
            Duration::from_millis(config.toast_ttl_ms),
        ));
        let access: Arc<dyn AccessPolicy> = match config.access_mode {
            AccessMode::Open => Arc::new(OpenAccess),
            AccessMode::OwnerOrAdmin => Arc::new(OwnerOrAdmin),
        };
        let session_service = Arc::new(SessionService::new(
            store,
            event_bus.clone(),
            Arc::clone(&notifier),
            ids,
            access,
            config.admin_usernames.clone(),
        ));
        Self {
            session_service,
            event_bus,
            notifier,
        }
    }
}
