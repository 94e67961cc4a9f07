//! Board layer: the controller hosts talk to, control affordances, and the
//! renderable scene.
//!
//! ## Key Types
//!
//! - `BoardController`: owns all table state, handles messages, clicks, presses
//! - `Controls`: which buttons and click targets are live
//! - `Scene`: what to draw at a given instant

pub mod controller;
pub mod controls;
pub mod scene;

pub use controller::{BoardController, ClickTarget, UpdateOutcome};
pub use controls::{derive_controls, Affordance, Control, ControlInputs, Controls};
pub use scene::{CardView, PlayerView, Scene, SceneSource, SpriteView, ZoneView};
