//! Client → server move requests.

use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// Move the client asks the server to make.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Draw,
    Pickup,
    Discard,
    Knock,
    Start,
    Continue,
}

/// A `move` event payload.
///
/// ```
/// use card_table::protocol::{MoveKind, MoveRequest};
///
/// let request = MoveRequest::new(MoveKind::Draw, "den", "p1");
/// assert_eq!(
///     request.to_json().unwrap(),
///     r#"{"action":"draw","room":"den","username":"p1"}"#
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub action: MoveKind,
    pub room: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Card>>,
}

impl MoveRequest {
    #[must_use]
    pub fn new(action: MoveKind, room: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            action,
            room: room.into(),
            username: username.into(),
            card: None,
            cards: None,
        }
    }

    #[must_use]
    pub fn with_card(mut self, card: Card) -> Self {
        self.card = Some(card);
        self
    }

    #[must_use]
    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = Some(cards);
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
