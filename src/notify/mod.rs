//! User-facing notifications: the durable log, transient toasts and the
//! chime cue.

pub mod notifier;

pub use notifier::Notifier;
