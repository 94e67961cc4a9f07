//! Card move primitives.
//!
//! A move is drawn as a disposable *clone sprite*: a copy of the card pinned
//! at the source rect that translates by the source→destination delta while
//! rotating about Y between face states. The real node is already at its
//! destination, hidden, and is revealed when the move completes.
//!
//! Keyframes compose `translate(dx, dy)` before `rotateY(deg)`. Because the
//! translation is outermost, a flip never mirrors the screen-space delta.
//!
//! ```
//! use card_table::animation::{animate_move, CubicBezier, Rect};
//! use card_table::zones::FaceState;
//!
//! let deck = Rect::new(300.0, 200.0, 70.0, 100.0);
//! let hand = Rect::new(250.0, 500.0, 70.0, 100.0);
//! let sprite = animate_move(
//!     Some(deck),
//!     Some(hand),
//!     FaceState::Down,
//!     FaceState::Up,
//!     1000,
//!     CubicBezier::EASE_OUT_QUART,
//! )
//! .unwrap();
//!
//! assert_eq!(sprite.keyframes()[1].css(), "translate(-50px, 300px) rotateY(0deg)");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::easing::CubicBezier;
use super::geometry::{Delta, Rect};
use crate::zones::FaceState;

/// Errors starting a card move.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AnimationError {
    #[error("source slot has no measured rect")]
    UnmeasuredSource,

    #[error("destination has no measured rect")]
    UnmeasuredDestination,

    #[error("no source slot for move: {what}")]
    SourceMissing { what: String },
}

/// Rotation path of a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceTransition {
    StayUp,
    StayDown,
    /// 180° → 0°
    FlipUp,
    /// 0° → 180°
    FlipDown,
}

impl FaceTransition {
    #[must_use]
    pub const fn between(start: FaceState, end: FaceState) -> Self {
        match (start, end) {
            (FaceState::Up, FaceState::Up) => FaceTransition::StayUp,
            (FaceState::Down, FaceState::Down) => FaceTransition::StayDown,
            (FaceState::Down, FaceState::Up) => FaceTransition::FlipUp,
            (FaceState::Up, FaceState::Down) => FaceTransition::FlipDown,
        }
    }

    #[must_use]
    pub const fn start_face(self) -> FaceState {
        match self {
            FaceTransition::StayUp | FaceTransition::FlipDown => FaceState::Up,
            FaceTransition::StayDown | FaceTransition::FlipUp => FaceState::Down,
        }
    }

    #[must_use]
    pub const fn end_face(self) -> FaceState {
        match self {
            FaceTransition::StayUp | FaceTransition::FlipUp => FaceState::Up,
            FaceTransition::StayDown | FaceTransition::FlipDown => FaceState::Down,
        }
    }

    #[must_use]
    pub const fn flips(self) -> bool {
        matches!(self, FaceTransition::FlipUp | FaceTransition::FlipDown)
    }
}

/// One animation frame: a translation followed by a Y rotation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub dx: f64,
    pub dy: f64,
    pub rotate_y_deg: f64,
}

impl Keyframe {
    /// CSS transform text.
    #[must_use]
    pub fn css(&self) -> String {
        format!(
            "translate({}px, {}px) rotateY({}deg)",
            self.dx, self.dy, self.rotate_y_deg
        )
    }
}

/// A disposable sprite animating one card move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CloneSprite {
    /// Fixed position of the sprite: the source rect.
    pub origin: Rect,
    pub delta: Delta,
    pub transition: FaceTransition,
    pub easing: CubicBezier,
    pub duration_ms: u32,
}

impl CloneSprite {
    /// First and last keyframes.
    #[must_use]
    pub fn keyframes(&self) -> [Keyframe; 2] {
        [
            Keyframe {
                dx: 0.0,
                dy: 0.0,
                rotate_y_deg: self.transition.start_face().rotation_deg(),
            },
            Keyframe {
                dx: self.delta.dx,
                dy: self.delta.dy,
                rotate_y_deg: self.transition.end_face().rotation_deg(),
            },
        ]
    }

    /// Interpolated frame `elapsed_ms` after the move started.
    #[must_use]
    pub fn frame_at(&self, elapsed_ms: u64) -> Keyframe {
        let t = if self.duration_ms == 0 {
            1.0
        } else {
            (elapsed_ms as f64 / f64::from(self.duration_ms)).min(1.0)
        };
        let p = self.easing.progress(t);
        let [from, to] = self.keyframes();
        Keyframe {
            dx: from.dx + (to.dx - from.dx) * p,
            dy: from.dy + (to.dy - from.dy) * p,
            rotate_y_deg: from.rotate_y_deg + (to.rotate_y_deg - from.rotate_y_deg) * p,
        }
    }

    #[must_use]
    pub fn is_finished(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= u64::from(self.duration_ms)
    }
}

/// Build the clone sprite for moving a card between two measured rects.
///
/// A missing rect is an error; a zero delta is a legal move that still runs
/// for the full duration.
pub fn animate_move(
    from: Option<Rect>,
    to: Option<Rect>,
    start_face: FaceState,
    end_face: FaceState,
    duration_ms: u32,
    easing: CubicBezier,
) -> Result<CloneSprite, AnimationError> {
    let origin = from.ok_or(AnimationError::UnmeasuredSource)?;
    let dest = to.ok_or(AnimationError::UnmeasuredDestination)?;
    Ok(CloneSprite {
        origin,
        delta: origin.delta_to(&dest),
        transition: FaceTransition::between(start_face, end_face),
        easing,
        duration_ms,
    })
}
