//! Data Transfer Objects for REST request/response serialization.
//!
//! Money amounts travel as decimal reais (`12.5` is R$ 12,50); inside the
//! service they are integer centavos.

pub mod account_dto;
pub mod common_dto;
pub mod notification_dto;
pub mod player_dto;
pub mod schedule_dto;
pub mod seat_dto;
pub mod session_dto;

pub use account_dto::*;
pub use common_dto::*;
pub use notification_dto::*;
pub use player_dto::*;
pub use schedule_dto::*;
pub use seat_dto::*;
pub use session_dto::*;
