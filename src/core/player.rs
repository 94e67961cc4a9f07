//! Players at the table and where they sit.
//!
//! ## Player
//!
//! Per-player presentation state: hand size, lives or score, connection,
//! turn markers. Everything except `connected` is overwritten from each board
//! update; nothing here is computed from game rules.
//!
//! ## Roster
//!
//! The players known to the room, in join order, plus their grid seats.
//!
//! ## Seats
//!
//! The table is a 3x3 grid with the board in the centre cell. The local
//! player always sits bottom centre (cell 8); the others follow clockwise in
//! turn order.

use serde::{Deserialize, Serialize};

use super::config::GameKind;
use crate::protocol::Snapshot;

/// Cells used for `n` players are the first `n` of this list.
pub const SEAT_FILL: [u8; 8] = [8, 2, 4, 6, 1, 3, 7, 9];

/// Clockwise order of grid cells, starting bottom centre.
pub const SEAT_CLOCKWISE: [u8; 8] = [8, 7, 4, 1, 2, 3, 6, 9];

/// A player's running total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tally {
    /// Thirty-one: extra lives left. 0 is "on the bike", -1 is out.
    Lives(i32),
    /// Cribbage: total score.
    Score(i32),
}

impl Default for Tally {
    fn default() -> Self {
        Tally::Lives(0)
    }
}

/// How remaining lives are shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LivesDisplay {
    Stars(u32),
    OnTheBike,
    KnockedOut,
}

impl LivesDisplay {
    #[must_use]
    pub fn from_lives(lives: i32) -> Self {
        match lives {
            n if n > 0 => LivesDisplay::Stars(n.unsigned_abs()),
            0 => LivesDisplay::OnTheBike,
            _ => LivesDisplay::KnockedOut,
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        match self {
            LivesDisplay::Stars(n) => "\u{2605}".repeat(*n as usize),
            LivesDisplay::OnTheBike => "on the bike".to_string(),
            LivesDisplay::KnockedOut => "Knocked out".to_string(),
        }
    }
}

/// Presentation state for one player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Index in the current turn order, `None` when not in the round.
    pub order: Option<usize>,
    pub hand_size: usize,
    pub tally: Tally,
    pub connected: bool,
    pub is_current: bool,
    pub is_dealer: bool,
    pub has_knocked: bool,
    /// In the room but no longer in the turn order.
    pub knocked_out: bool,
    /// Only known for the local player.
    pub hand_score: Option<i32>,
    pub grid_cell: Option<u8>,
}

impl Player {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connected: true,
            ..Self::default()
        }
    }

    /// Lives display for thirty-one; `None` when the tally is a score.
    #[must_use]
    pub fn lives_display(&self) -> Option<LivesDisplay> {
        match self.tally {
            Tally::Lives(lives) => Some(LivesDisplay::from_lives(lives)),
            Tally::Score(_) => None,
        }
    }
}

/// Assign grid cells: `order` rotated so `local` comes first, seated clockwise.
///
/// ```
/// use card_table::core::seat_layout;
///
/// let order = vec!["p1".to_string(), "me".to_string(), "p3".to_string()];
/// let seats = seat_layout(&order, "me");
/// assert_eq!(
///     seats,
///     vec![("me".to_string(), 8), ("p3".to_string(), 4), ("p1".to_string(), 2)]
/// );
/// ```
#[must_use]
pub fn seat_layout(order: &[String], local: &str) -> Vec<(String, u8)> {
    let n = order.len().min(SEAT_FILL.len());
    let used = &SEAT_FILL[..n];
    let cells = SEAT_CLOCKWISE.iter().copied().filter(|cell| used.contains(cell));

    let start = order.iter().position(|name| name == local).unwrap_or(0);
    let rotated = order.iter().cycle().skip(start).take(n);

    rotated.cloned().zip(cells).collect()
}

/// Players known to the room, in join order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player. Returns `false` if the name is already present.
    pub fn add(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.players.push(Player::new(name));
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.name == name)?;
        Some(self.players.remove(idx))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }

    /// Current seat assignments.
    #[must_use]
    pub fn seats(&self) -> Vec<(String, u8)> {
        self.players
            .iter()
            .filter_map(|p| Some((p.name.clone(), p.grid_cell?)))
            .collect()
    }

    /// Re-seat everyone from a turn order. Players outside it lose their seat.
    pub fn assign_seats(&mut self, order: &[String], local: &str) {
        let seats = seat_layout(order, local);
        for player in &mut self.players {
            player.grid_cell = seats
                .iter()
                .find(|(name, _)| *name == player.name)
                .map(|&(_, cell)| cell);
        }
    }

    /// Mark players connected or disconnected. Returns names not in the roster.
    pub fn set_connected(&mut self, names: &[String], connected: bool) -> Vec<String> {
        let mut unknown = Vec::new();
        for name in names {
            match self.get_mut(name) {
                Some(player) => player.connected = connected,
                None => unknown.push(name.clone()),
            }
        }
        unknown
    }

    /// Overwrite per-player state from a validated snapshot.
    ///
    /// Players in the turn order are added if missing. Players in the room but
    /// absent from the order are knocked out with empty hands.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot, local: &str, game: GameKind) {
        let order = snapshot.order();
        for name in order {
            self.add(name);
        }

        for player in &mut self.players {
            let Some(idx) = order.iter().position(|name| *name == player.name) else {
                player.order = None;
                player.hand_size = 0;
                player.knocked_out = true;
                player.is_current = false;
                player.has_knocked = false;
                player.is_dealer = false;
                continue;
            };

            player.order = Some(idx);
            player.knocked_out = false;
            player.hand_size = snapshot.hand_size(idx);
            player.tally = match game {
                GameKind::ThirtyOne => Tally::Lives(snapshot.lives.get(idx).copied().unwrap_or(0)),
                GameKind::Cribbage => {
                    Tally::Score(snapshot.total_scores.get(idx).copied().unwrap_or(0))
                }
            };
            player.is_current = snapshot.current_player.as_deref() == Some(player.name.as_str());
            player.is_dealer = snapshot.dealer.as_deref() == Some(player.name.as_str());
            player.has_knocked = snapshot.knocked.as_deref() == Some(player.name.as_str());
            player.hand_score = if player.name == local {
                snapshot.hand_score
            } else {
                None
            };
        }

        self.assign_seats(order, local);
    }
}
