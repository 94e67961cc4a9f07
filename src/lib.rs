//! # card-table
//!
//! Client-side table engine for multiplayer card games (thirty-one and
//! cribbage) played against an authoritative server.
//!
//! ## Design Principles
//!
//! 1. **Server Is the Truth**: The client never decides game outcomes. Each
//!    board update carries a full snapshot; the engine only chooses how to
//!    get from what is on screen to what the snapshot says.
//!
//! 2. **Zones Own Slots**: Every card-sized slot on the table lives in exactly
//!    one zone of the `ZoneManager`. Moves change zones only when their
//!    animation settles.
//!
//! 3. **Host-Driven Clock**: Animation runs on a virtual millisecond clock the
//!    host advances with `tick`. Nothing here sleeps, spawns or reads a
//!    rendered view.
//!
//! ## Architecture
//!
//! - **Replay or Reconcile**: An update with an action log is replayed as
//!   queued card moves; one without is applied directly to every zone.
//!
//! - **Per-Zone Queues**: Jobs touching the same zone run in log order; jobs
//!   on disjoint zones overlap.
//!
//! - **Seeded Hidden Picks**: Which face-down slot an opponent's hidden card
//!   leaves from is chosen with a seedable `ChaCha8Rng`.
//!
//! ## Modules
//!
//! - `core`: Node ids, players, session state, actions, RNG, configuration
//! - `cards`: Card codes and the face registry
//! - `zones`: Zone keys, slots and the zone manager
//! - `animation`: Geometry, easing, clone sprites, layout probes, timeline
//! - `protocol`: Inbound server messages and outbound move requests
//! - `replay`: Action replayer and snapshot reconciler
//! - `board`: Board controller, controls and scene projection

pub mod core;
pub mod cards;
pub mod zones;
pub mod animation;
pub mod protocol;
pub mod replay;
pub mod board;

// Re-export commonly used types
pub use crate::core::{
    NodeId, Mode, GameKind,
    SelectionRng, SelectionRngState,
    TableConfig, AnimationConfig, LayoutConfig,
    TableAction, TableError,
    Player, Roster, RoomSessionState,
};

pub use crate::cards::{Card, Rank, Suit, CardFace, CardRegistry};

pub use crate::zones::{FaceState, Slot, SlotCard, ZoneKey, ZoneKind, ZoneManager, ZonePosition};

pub use crate::animation::{
    AnimationError, AnimationTimeline, CloneSprite, Completion, CubicBezier,
    GridLayout, LayoutProbe, Rect,
};

pub use crate::protocol::{MoveKind, MoveRequest, ServerAction, ServerMessage, Snapshot};

pub use crate::replay::{reconcile, replay, ReplayReport, ReplayState};

pub use crate::board::{BoardController, ClickTarget, Control, Controls, Scene, UpdateOutcome};
