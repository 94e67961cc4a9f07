//! Zone keys and slot contents.

use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// Which side of a card faces the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceState {
    Up,
    Down,
}

impl FaceState {
    /// Rotation about the Y axis for this face, in degrees.
    #[must_use]
    pub const fn rotation_deg(self) -> f64 {
        match self {
            FaceState::Up => 0.0,
            FaceState::Down => 180.0,
        }
    }
}

/// What the client knows about the card in a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotCard {
    Known(Card),
    /// A real card whose identity is hidden from this client.
    Unknown,
}

impl SlotCard {
    #[must_use]
    pub const fn known(self) -> Option<Card> {
        match self {
            SlotCard::Known(card) => Some(card),
            SlotCard::Unknown => None,
        }
    }
}

impl From<Option<Card>> for SlotCard {
    fn from(card: Option<Card>) -> Self {
        card.map_or(SlotCard::Unknown, SlotCard::Known)
    }
}

/// Contents of one card-sized slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Nothing to draw.
    Empty,
    /// An outline marking where cards go (empty discard, deck back, empty crib).
    Placeholder,
    Occupied { card: SlotCard, face: FaceState },
}

impl Slot {
    /// A known card, face up.
    #[must_use]
    pub const fn up(card: Card) -> Self {
        Slot::Occupied {
            card: SlotCard::Known(card),
            face: FaceState::Up,
        }
    }

    /// A known card, face down.
    #[must_use]
    pub const fn down(card: Card) -> Self {
        Slot::Occupied {
            card: SlotCard::Known(card),
            face: FaceState::Down,
        }
    }

    /// A hidden card, face down.
    #[must_use]
    pub const fn hidden() -> Self {
        Slot::Occupied {
            card: SlotCard::Unknown,
            face: FaceState::Down,
        }
    }

    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    /// The card, when occupied by a known card.
    #[must_use]
    pub const fn card(&self) -> Option<Card> {
        match self {
            Slot::Occupied { card, .. } => card.known(),
            _ => None,
        }
    }

    #[must_use]
    pub const fn face(&self) -> Option<FaceState> {
        match self {
            Slot::Occupied { face, .. } => Some(*face),
            _ => None,
        }
    }

    /// Whether this slot holds exactly `card`.
    #[must_use]
    pub fn holds(&self, card: Card) -> bool {
        self.card() == Some(card)
    }
}

/// Kind of a table zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Deck,
    Discard,
    Crib,
    Hand,
}

/// Key of a zone: shared zones have no owner, hands are keyed by player name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneKey {
    pub kind: ZoneKind,
    pub player: Option<String>,
}

impl ZoneKey {
    #[must_use]
    pub const fn deck() -> Self {
        Self {
            kind: ZoneKind::Deck,
            player: None,
        }
    }

    #[must_use]
    pub const fn discard() -> Self {
        Self {
            kind: ZoneKind::Discard,
            player: None,
        }
    }

    #[must_use]
    pub const fn crib() -> Self {
        Self {
            kind: ZoneKind::Crib,
            player: None,
        }
    }

    #[must_use]
    pub fn hand(player: impl Into<String>) -> Self {
        Self {
            kind: ZoneKind::Hand,
            player: Some(player.into()),
        }
    }

    /// The owning player of a hand zone.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.player.as_deref()
    }
}

impl std::fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.player) {
            (ZoneKind::Hand, Some(name)) => write!(f, "hand:{name}"),
            (ZoneKind::Hand, None) => f.write_str("hand"),
            (ZoneKind::Deck, _) => f.write_str("deck"),
            (ZoneKind::Discard, _) => f.write_str("discard"),
            (ZoneKind::Crib, _) => f.write_str("crib"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(code: &str) -> Card {
        code.parse().unwrap()
    }

    #[test]
    fn test_slot_helpers() {
        let slot = Slot::up(card("AS"));
        assert!(slot.is_occupied());
        assert!(slot.holds(card("AS")));
        assert_eq!(slot.face(), Some(FaceState::Up));

        let hidden = Slot::hidden();
        assert!(hidden.is_occupied());
        assert_eq!(hidden.card(), None);
        assert_eq!(hidden.face(), Some(FaceState::Down));

        assert!(!Slot::Placeholder.is_occupied());
        assert_eq!(Slot::Empty.face(), None);
    }

    #[test]
    fn test_face_rotation() {
        assert_eq!(FaceState::Up.rotation_deg(), 0.0);
        assert_eq!(FaceState::Down.rotation_deg(), 180.0);
    }

    #[test]
    fn test_zone_key_display() {
        assert_eq!(ZoneKey::hand("alice").to_string(), "hand:alice");
        assert_eq!(ZoneKey::deck().to_string(), "deck");
        assert_eq!(ZoneKey::crib().to_string(), "crib");
        assert_eq!(ZoneKey::hand("bob").owner(), Some("bob"));
        assert_eq!(ZoneKey::discard().owner(), None);
    }

    #[test]
    fn test_slot_card_from_option() {
        assert_eq!(SlotCard::from(Some(card("2D"))), SlotCard::Known(card("2D")));
        assert_eq!(SlotCard::from(None), SlotCard::Unknown);
    }
}
