//! Applying board updates to the zone model.
//!
//! - `replayer`: animate an action log as queued timeline jobs
//! - `reconciler`: overwrite every zone from a snapshot, no animation

pub mod reconciler;
pub mod replayer;

pub use reconciler::{departed_hands, hand_slots, reconcile};
pub use replayer::{replay, ActionReplayer, ReplayReport, ReplayState};
