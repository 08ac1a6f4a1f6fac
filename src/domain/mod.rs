//! Domain layer: records, session state, seat protocol and event system.
//!
//! This module contains the server-side model of a home game: the record
//! types stored per collection, the in-memory [`SessionState`] with its
//! transitions, the per-client [`SeatPicker`], the advisory
//! [`AccessPolicy`], presence tracking, and the [`EventBus`] broadcasting
//! every change.

pub mod access;
pub mod collection;
pub mod entity_id;
pub mod event_bus;
pub mod money;
pub mod notification;
pub mod player;
pub mod presence;
pub mod schedule;
pub mod seat;
pub mod seat_picker;
pub mod session_record;
pub mod session_state;
pub mod table_event;
pub mod visitor;

pub use access::{AccessPolicy, Actor, OpenAccess, OwnerOrAdmin};
pub use collection::Collection;
pub use entity_id::{EntityId, IdGenerator};
pub use event_bus::EventBus;
pub use money::Money;
pub use notification::{Chime, Notice, Notification, Severity, Toast, Waveform};
pub use player::{Player, PlayerStatus};
pub use presence::{PresenceEntry, PresenceTracker};
pub use schedule::ScheduleEntry;
pub use seat::{SeatAssignment, SeatNumber, TABLE_SEATS};
pub use seat_picker::{SeatAction, SeatPicker};
pub use session_record::{SessionRecord, SessionSummary, TableStats};
pub use session_state::{Admission, NewPlayer, RowWrite, SessionState, Transition};
pub use table_event::{ChangeKind, TableEvent};
pub use visitor::Visitor;
