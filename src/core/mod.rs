//! Core types: node ids, players, session state, actions, RNG, configuration.
//!
//! These are shared by every other module. Nothing here knows about
//! animation; the zone model and the timeline build on top of it.

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::TableAction;
pub use config::{AnimationConfig, GameKind, LayoutConfig, TableConfig};
pub use entity::NodeId;
pub use error::TableError;
pub use player::{seat_layout, LivesDisplay, Player, Roster, Tally, SEAT_CLOCKWISE, SEAT_FILL};
pub use rng::{SelectionRng, SelectionRngState};
pub use state::{Mode, RoomSessionState};
