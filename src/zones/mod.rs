//! Zone model: every card-sized slot on the table.
//!
//! ## Key Types
//!
//! - `ZoneKey`: deck, discard, crib, or a player's hand
//! - `Slot`: empty, placeholder, or an occupied card with a face state
//! - `ZoneManager`: ordered slot containers plus the crib count
//! - `ZonePosition`: position specifier for inserts

pub mod manager;
pub mod slot;

pub use manager::{ZoneManager, ZonePosition};
pub use slot::{FaceState, Slot, SlotCard, ZoneKey, ZoneKind};
