//! Card move animation.
//!
//! ## Key Types
//!
//! - `Rect`, `Delta`: viewport geometry
//! - `CubicBezier`: easing curves
//! - `CloneSprite`, `FaceTransition`: one card move and its keyframes
//! - `LayoutProbe`, `GridLayout`: zone and slot measurement
//! - `AnimationTimeline`: per-zone job queues with exactly-once settle

pub mod easing;
pub mod geometry;
pub mod layout;
pub mod primitives;
pub mod timeline;

pub use easing::CubicBezier;
pub use geometry::{Delta, Rect};
pub use layout::{GridLayout, LayoutProbe, BOARD_CELL};
pub use primitives::{animate_move, AnimationError, CloneSprite, FaceTransition, Keyframe};
pub use timeline::{
    AnimationJob, AnimationTimeline, Completion, CompletionOutcome, JobId, JobRequest, JobState,
    Motion, SettlePlan, SourceSelector,
};
