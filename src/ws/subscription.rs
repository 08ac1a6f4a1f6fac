//! Per-connection subscription manager.
//!
//! Tracks which collections a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::{Collection, TableEvent};

/// Manages the set of collection subscriptions for a single WebSocket
/// connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed collections. If `subscribe_all` is true, this set is ignored.
    collections: HashSet<Collection>,
    /// Whether the client subscribes to all collections (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds collections to the subscription set; `wildcard` enables all.
    pub fn subscribe(&mut self, collections: &[Collection], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.collections.extend(collections.iter().copied());
    }

    /// Removes collections from the subscription set. `wildcard` turns the
    /// catch-all off.
    pub fn unsubscribe(&mut self, collections: &[Collection], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for collection in collections {
            self.collections.remove(collection);
        }
    }

    /// Returns `true` if the event passes the filter. Events outside any
    /// collection (presence) always pass.
    #[must_use]
    pub fn matches(&self, event: &TableEvent) -> bool {
        match event.collection() {
            None => true,
            Some(collection) => self.subscribe_all || self.collections.contains(&collection),
        }
    }

    /// Subscribed collections in a stable order.
    #[must_use]
    pub fn collections(&self) -> Vec<Collection> {
        Collection::ALL
            .into_iter()
            .filter(|c| self.subscribe_all || self.collections.contains(c))
            .collect()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

/// Splits raw collection names into known collections and the wildcard
/// flag. Unknown names are returned separately.
#[must_use]
pub fn parse_collections(names: &[String]) -> (Vec<Collection>, bool, Vec<String>) {
    let mut collections = Vec::new();
    let mut wildcard = false;
    let mut unknown = Vec::new();
    for name in names {
        if name == "*" {
            wildcard = true;
        } else if let Some(collection) = Collection::parse(name) {
            collections.push(collection);
        } else {
            unknown.push(name.clone());
        }
    }
    (collections, wildcard, unknown)
}
