//! Which controls are live.
//!
//! Affordances are a pure function of six inputs taken from the session; no
//! other state (animation, selection, click history) enables or hides a
//! control.

use serde::{Deserialize, Serialize};

use crate::core::config::GameKind;
use crate::core::state::{Mode, RoomSessionState};

/// Buttons and clickable zones the local player can use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Draw,
    Pickup,
    Knock,
    DiscardConfirm,
    Continue,
    Start,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affordance {
    pub enabled: bool,
    pub visible: bool,
}

impl Affordance {
    const fn new(enabled: bool, visible: bool) -> Self {
        Self { enabled, visible }
    }

    /// Shown exactly when usable.
    const fn only_when(enabled: bool) -> Self {
        Self::new(enabled, enabled)
    }
}

/// Everything controls depend on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlInputs {
    pub game: GameKind,
    pub mode: Mode,
    pub in_progress: bool,
    pub local_is_current: bool,
    pub num_to_discard: u32,
    /// Someone has knocked this round.
    pub knocked: bool,
}

impl ControlInputs {
    #[must_use]
    pub fn from_session(session: &RoomSessionState) -> Self {
        Self {
            game: session.game,
            mode: session.mode,
            in_progress: session.in_progress,
            local_is_current: session.local_is_current(),
            num_to_discard: session.num_to_discard,
            knocked: session.knocked.is_some(),
        }
    }
}

/// Derived control state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub draw: Affordance,
    pub pickup: Affordance,
    pub knock: Affordance,
    pub discard_confirm: Affordance,
    #[serde(rename = "continue")]
    pub continue_: Affordance,
    pub start: Affordance,
    /// Cards in the local hand can be clicked.
    pub hand_cards: Affordance,
}

impl Controls {
    #[must_use]
    pub fn get(&self, control: Control) -> Affordance {
        match control {
            Control::Draw => self.draw,
            Control::Pickup => self.pickup,
            Control::Knock => self.knock,
            Control::DiscardConfirm => self.discard_confirm,
            Control::Continue => self.continue_,
            Control::Start => self.start,
        }
    }
}

/// Derive every affordance.
///
/// ```
/// use card_table::board::{derive_controls, ControlInputs};
/// use card_table::core::{GameKind, Mode};
///
/// let controls = derive_controls(ControlInputs {
///     game: GameKind::ThirtyOne,
///     mode: Mode::MainPhase,
///     in_progress: true,
///     local_is_current: true,
///     num_to_discard: 0,
///     knocked: true,
/// });
/// assert!(controls.draw.enabled);
/// assert!(!controls.knock.enabled);
/// assert!(!controls.start.visible);
/// ```
#[must_use]
pub fn derive_controls(inputs: ControlInputs) -> Controls {
    let thirty_one = inputs.game == GameKind::ThirtyOne;
    let cribbage = inputs.game == GameKind::Cribbage;
    let my_main_phase = thirty_one
        && inputs.in_progress
        && inputs.local_is_current
        && inputs.mode == Mode::MainPhase;
    let crib_discard = cribbage && inputs.mode == Mode::Discard;
    let my_discard =
        thirty_one && inputs.in_progress && inputs.local_is_current && inputs.mode == Mode::Discard;

    Controls {
        draw: Affordance::new(my_main_phase, thirty_one),
        pickup: Affordance::new(my_main_phase, thirty_one),
        knock: Affordance::new(my_main_phase && !inputs.knocked, thirty_one),
        discard_confirm: Affordance::new(crib_discard && inputs.num_to_discard > 0, crib_discard),
        continue_: Affordance::only_when(inputs.mode == Mode::EndRound),
        start: Affordance::only_when(!inputs.in_progress),
        hand_cards: Affordance::only_when(
            my_discard || (crib_discard && inputs.num_to_discard > 0),
        ),
    }
}
