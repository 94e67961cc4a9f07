//! Room session state.
//!
//! ## Mode
//!
//! The server's phase string. The client never computes it; it only decides
//! which controls are live and how hands are shown.
//!
//! ## RoomSessionState
//!
//! Everything about the current room that isn't a card slot or a player:
//! room name, game, local username, mode, turn markers and the log buffer.
//! Transitions are pure (`&self -> Self`) and backed by `im` vectors, so
//! keeping the previous state around for an aborted update costs nothing.

use im::Vector;
use serde::{Deserialize, Deserializer, Serialize};

use super::config::GameKind;
use crate::protocol::Snapshot;

/// Server game phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Start,
    MainPhase,
    Discard,
    Play,
    Show,
    EndRound,
    EndGame,
    /// Empty or unrecognised.
    #[default]
    Idle,
}

impl Mode {
    #[must_use]
    pub fn from_wire(text: &str) -> Self {
        match text {
            "start" => Mode::Start,
            "main_phase" => Mode::MainPhase,
            "discard" => Mode::Discard,
            "play" => Mode::Play,
            "show" => Mode::Show,
            "end_round" => Mode::EndRound,
            "end_game" => Mode::EndGame,
            _ => Mode::Idle,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Start => "start",
            Mode::MainPhase => "main_phase",
            Mode::Discard => "discard",
            Mode::Play => "play",
            Mode::Show => "show",
            Mode::EndRound => "end_round",
            Mode::EndGame => "end_game",
            Mode::Idle => "",
        }
    }

    /// Modes in which the server sends every hand to every player.
    #[must_use]
    pub const fn reveals_hands(self) -> bool {
        matches!(self, Mode::EndRound | Mode::EndGame | Mode::Show)
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        Ok(text.as_deref().map_or(Mode::Idle, Mode::from_wire))
    }
}

/// Session state for the room this client is in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSessionState {
    /// `None` until `setup_room`.
    pub room: Option<String>,
    pub game: GameKind,
    pub username: String,
    pub mode: Mode,
    pub in_progress: bool,
    pub current_player: Option<String>,
    pub dealer: Option<String>,
    /// Player who knocked this round, if any.
    pub knocked: Option<String>,
    pub player_order: Vector<String>,
    /// Cards the local player must still send to the crib.
    pub num_to_discard: u32,
    /// Most recent log lines, oldest first.
    pub log: Vector<String>,
    pub log_capacity: usize,
}

impl Default for RoomSessionState {
    fn default() -> Self {
        Self {
            room: None,
            game: GameKind::ThirtyOne,
            username: String::new(),
            mode: Mode::Idle,
            in_progress: false,
            current_player: None,
            dealer: None,
            knocked: None,
            player_order: Vector::new(),
            num_to_discard: 0,
            log: Vector::new(),
            log_capacity: 200,
        }
    }
}

impl RoomSessionState {
    /// State for a freshly joined room.
    #[must_use]
    pub fn setup(room: &str, username: &str, game: GameKind, log_capacity: usize) -> Self {
        Self {
            room: Some(room.to_string()),
            game,
            username: username.to_string(),
            log_capacity,
            ..Self::default()
        }
    }

    /// State after leaving the room. The username survives.
    #[must_use]
    pub fn teardown(&self) -> Self {
        Self {
            username: self.username.clone(),
            log_capacity: self.log_capacity,
            ..Self::default()
        }
    }

    /// State after a validated board update.
    #[must_use]
    pub fn apply_snapshot(&self, snapshot: &Snapshot) -> Self {
        let mut log = self.log.clone();
        for line in &snapshot.log {
            log.push_back(line.clone());
        }
        while log.len() > self.log_capacity {
            log.pop_front();
        }

        Self {
            room: self.room.clone(),
            game: snapshot.game.unwrap_or(self.game),
            username: self.username.clone(),
            mode: snapshot.mode,
            in_progress: snapshot.in_progress,
            current_player: snapshot.current_player.clone(),
            dealer: snapshot.dealer.clone(),
            knocked: snapshot.knocked.clone(),
            player_order: snapshot.order().iter().cloned().collect(),
            num_to_discard: snapshot.num_to_discard,
            log,
            log_capacity: self.log_capacity,
        }
    }

    #[must_use]
    pub fn in_room(&self) -> bool {
        self.room.is_some()
    }

    #[must_use]
    pub fn is_local(&self, name: &str) -> bool {
        self.username == name
    }

    #[must_use]
    pub fn local_is_current(&self) -> bool {
        self.current_player.as_deref() == Some(self.username.as_str())
    }

    /// Index of the local player in the turn order.
    #[must_use]
    pub fn local_index(&self) -> Option<usize> {
        self.player_order.index_of(&self.username)
    }
}
