//! Server → client messages.
//!
//! Everything the server pushes is a JSON object tagged by `action`. Board
//! updates carry a full `Snapshot` of the table as this client may see it,
//! plus the `action_log` of moves made since the previous update.
//!
//! Decoding is lenient where the server is loose: absent fields default,
//! blank strings stand in for "nobody", a move's cards may arrive as an
//! array, as the bare string `"unknown"`, or as a single `card`. A malformed
//! card code decodes as `CardToken::Unknown` and is logged, never fatal.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use tracing::warn;

use crate::cards::Card;
use crate::core::config::GameKind;
use crate::core::error::TableError;
use crate::core::state::Mode;

/// Wire marker for a card the server hides from this client.
pub const UNKNOWN_CARD: &str = "unknown";

/// A card as it appears on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardToken {
    Known(Card),
    Unknown,
}

impl CardToken {
    #[must_use]
    pub const fn card(self) -> Option<Card> {
        match self {
            CardToken::Known(card) => Some(card),
            CardToken::Unknown => None,
        }
    }

    /// Decode a wire string, degrading malformed codes to `Unknown`.
    #[must_use]
    pub fn parse_lenient(code: &str) -> Self {
        if code == UNKNOWN_CARD {
            return CardToken::Unknown;
        }
        match code.parse::<Card>() {
            Ok(card) => CardToken::Known(card),
            Err(err) => {
                warn!(code, error = %err, "malformed card code");
                CardToken::Unknown
            }
        }
    }
}

impl From<Card> for CardToken {
    fn from(card: Card) -> Self {
        CardToken::Known(card)
    }
}

impl Serialize for CardToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CardToken::Known(card) => card.serialize(serializer),
            CardToken::Unknown => serializer.serialize_str(UNKNOWN_CARD),
        }
    }
}

impl<'de> Deserialize<'de> for CardToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(CardToken::parse_lenient(&code))
    }
}

/// What a logged move did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Deal,
    Draw,
    /// Thirty-one: hand → discard pile. Cribbage: hand → crib.
    Discard,
    Pickup,
    Starter,
    DiscardToCrib,
    PlayCard,
    StartShow,
    Score,
    Other(String),
}

impl ActionKind {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "deal" => ActionKind::Deal,
            "draw" => ActionKind::Draw,
            "discard" => ActionKind::Discard,
            "pickup" => ActionKind::Pickup,
            "starter" => ActionKind::Starter,
            "discard_to_crib" => ActionKind::DiscardToCrib,
            "play_card" => ActionKind::PlayCard,
            "start_show" => ActionKind::StartShow,
            "score" => ActionKind::Score,
            other => ActionKind::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            ActionKind::Deal => "deal",
            ActionKind::Draw => "draw",
            ActionKind::Discard => "discard",
            ActionKind::Pickup => "pickup",
            ActionKind::Starter => "starter",
            ActionKind::DiscardToCrib => "discard_to_crib",
            ActionKind::PlayCard => "play_card",
            ActionKind::StartShow => "start_show",
            ActionKind::Score => "score",
            ActionKind::Other(tag) => tag,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCards {
    Many(Vec<CardToken>),
    One(CardToken),
}

#[derive(Deserialize)]
struct RawAction {
    action: String,
    #[serde(default)]
    player: Option<String>,
    #[serde(default)]
    cards: Option<RawCards>,
    #[serde(default)]
    card: Option<CardToken>,
    #[serde(default)]
    num_to_discard: Option<u32>,
}

/// One entry of the action log.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAction")]
pub struct ServerAction {
    pub kind: ActionKind,
    /// Acting player; `"all"` for table-wide actions.
    pub player: Option<String>,
    pub cards: SmallVec<[CardToken; 3]>,
    pub num_to_discard: Option<u32>,
}

impl From<RawAction> for ServerAction {
    fn from(raw: RawAction) -> Self {
        let mut cards: SmallVec<[CardToken; 3]> = match raw.cards {
            Some(RawCards::Many(many)) => many.into_iter().collect(),
            Some(RawCards::One(one)) => SmallVec::from_slice(&[one]),
            None => SmallVec::new(),
        };
        if let Some(card) = raw.card {
            cards.push(card);
        }
        Self {
            kind: ActionKind::from_tag(&raw.action),
            player: raw.player,
            cards,
            num_to_discard: raw.num_to_discard,
        }
    }
}

impl ServerAction {
    #[must_use]
    pub fn new(kind: ActionKind, player: impl Into<String>) -> Self {
        Self {
            kind,
            player: Some(player.into()),
            cards: SmallVec::new(),
            num_to_discard: None,
        }
    }

    #[must_use]
    pub fn with_cards(mut self, cards: impl IntoIterator<Item = CardToken>) -> Self {
        self.cards = cards.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_num_to_discard(mut self, n: u32) -> Self {
        self.num_to_discard = Some(n);
        self
    }

    /// The first payload card, if known.
    #[must_use]
    pub fn first_card(&self) -> Option<Card> {
        self.cards.first().and_then(|token| token.card())
    }

    #[must_use]
    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Full table state as one client may see it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub game: Option<GameKind>,
    #[serde(deserialize_with = "null_as_default")]
    pub action_log: Vec<ServerAction>,
    pub mode: Mode,
    #[serde(deserialize_with = "null_as_default")]
    pub in_progress: bool,
    pub player_order: Option<Vec<String>>,
    #[serde(deserialize_with = "blank_as_none")]
    pub current_player: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub hand_sizes: Vec<usize>,
    #[serde(deserialize_with = "null_as_default")]
    pub hand: Vec<CardToken>,
    pub hand_score: Option<i32>,
    pub discard: Option<CardToken>,
    #[serde(deserialize_with = "null_as_default")]
    pub crib_size: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub lives: Vec<i32>,
    #[serde(deserialize_with = "null_as_default")]
    pub total_scores: Vec<i32>,
    #[serde(deserialize_with = "blank_as_none")]
    pub dealer: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub knocked: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub final_hands: Vec<Vec<CardToken>>,
    #[serde(deserialize_with = "null_as_default")]
    pub num_to_discard: u32,
    pub starter: Option<CardToken>,
    #[serde(deserialize_with = "null_as_default")]
    pub log: Vec<String>,
}

impl Snapshot {
    /// Check the fields every update needs, returning the player order.
    ///
    /// Per-player lists must either be empty or match `player_order` in length.
    pub fn validate(&self) -> Result<&[String], TableError> {
        let order = self
            .player_order
            .as_deref()
            .ok_or(TableError::MissingField {
                field: "player_order",
            })?;
        let expected = order.len();
        let lists = [
            ("hand_sizes", self.hand_sizes.len()),
            ("lives", self.lives.len()),
            ("total_scores", self.total_scores.len()),
            ("final_hands", self.final_hands.len()),
        ];
        for (field, got) in lists {
            if got != 0 && got != expected {
                return Err(TableError::LengthMismatch {
                    field,
                    expected,
                    got,
                });
            }
        }
        Ok(order)
    }

    #[must_use]
    pub fn order(&self) -> &[String] {
        self.player_order.as_deref().unwrap_or(&[])
    }

    /// Reported hand size of the player at `index` in the order; 0 when unreported.
    #[must_use]
    pub fn hand_size(&self, index: usize) -> usize {
        self.hand_sizes.get(index).copied().unwrap_or(0)
    }

    /// Known cards of the local hand, in server order.
    #[must_use]
    pub fn hand_cards(&self) -> Vec<Option<Card>> {
        self.hand.iter().map(|token| token.card()).collect()
    }

    #[must_use]
    pub fn discard_card(&self) -> Option<Card> {
        self.discard.and_then(CardToken::card)
    }

    #[must_use]
    pub fn starter_card(&self) -> Option<Card> {
        self.starter.and_then(CardToken::card)
    }

    /// Whether every hand is revealed to everyone.
    #[must_use]
    pub fn reveals_hands(&self) -> bool {
        self.mode.reveals_hands()
    }
}

/// Inbound message, tagged by `action`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerMessage {
    SetupRoom {
        room: String,
        username: String,
        game: GameKind,
    },
    TeardownRoom,
    AddPlayers {
        players: Vec<String>,
    },
    RemovePlayers {
        players: Vec<String>,
    },
    ConnStatus {
        players: Vec<String>,
        connected: bool,
    },
    UpdateBoard(Snapshot),
}

impl ServerMessage {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
