//! Card registry for face lookup.
//!
//! The `CardRegistry` maps each of the 52 cards to the visual attributes a
//! renderer puts on its node: element id, stored rank/suit attributes and the
//! front text. Lookups never fail loudly: a missing or malformed code renders
//! as [`BLANK_GLYPH`], since opponents' cards are routinely unknown.

use rustc_hash::FxHashMap;

use super::card::{Card, Rank, Suit};

/// Text rendered for a null, unknown or malformed card.
pub const BLANK_GLYPH: &str = "-";

/// Visual attributes for one card face.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardFace {
    /// Node id, e.g. `card-AS`. Prefixed so it never starts with a digit.
    pub element_id: String,
    /// Rank character stored on the node (`T` for ten).
    pub rank_attr: char,
    /// Suit character stored on the node.
    pub suit_attr: char,
    /// Text shown on the card front, e.g. `10♥`.
    pub front_text: String,
}

impl CardFace {
    fn new(card: Card) -> Self {
        Self {
            element_id: format!("card-{}", card.code()),
            rank_attr: card.rank.code_char(),
            suit_attr: card.suit.code_char(),
            front_text: card.glyph(),
        }
    }
}

/// Registry of card faces.
///
/// ## Example
///
/// ```
/// use card_table::cards::CardRegistry;
///
/// let registry = CardRegistry::new();
/// assert_eq!(registry.code_to_glyph(Some("TH")), "10\u{2665}");
/// assert_eq!(registry.code_to_glyph(None), "-");
/// assert_eq!(registry.face_for_code("AS").unwrap().element_id, "card-AS");
/// ```
#[derive(Clone, Debug)]
pub struct CardRegistry {
    faces: FxHashMap<Card, CardFace>,
}

impl Default for CardRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CardRegistry {
    /// Build the registry for a standard 52-card deck.
    #[must_use]
    pub fn new() -> Self {
        let faces = Card::all().map(|card| (card, CardFace::new(card))).collect();
        Self { faces }
    }

    /// Get the face for a card.
    #[must_use]
    pub fn face(&self, card: Card) -> Option<&CardFace> {
        self.faces.get(&card)
    }

    /// Get the face for a wire code. `None` for malformed codes.
    #[must_use]
    pub fn face_for_code(&self, code: &str) -> Option<&CardFace> {
        let card = code.parse::<Card>().ok()?;
        self.faces.get(&card)
    }

    /// Render a wire code as face text, or [`BLANK_GLYPH`] when absent or malformed.
    #[must_use]
    pub fn code_to_glyph(&self, code: Option<&str>) -> String {
        code.and_then(|c| self.face_for_code(c))
            .map_or_else(|| BLANK_GLYPH.to_string(), |face| face.front_text.clone())
    }

    /// Recover a card from the rank/suit attributes stored on a node.
    #[must_use]
    pub fn card_from_attrs(&self, rank_attr: char, suit_attr: char) -> Option<Card> {
        Some(Card::new(
            Rank::from_code_char(rank_attr)?,
            Suit::from_code_char(suit_attr)?,
        ))
    }

    /// Number of registered faces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Whether `code` is a valid two-character card code.
#[must_use]
pub fn is_valid_code(code: &str) -> bool {
    code.parse::<Card>().is_ok()
}

/// Render a wire code as face text without a registry.
#[must_use]
pub fn code_to_glyph(code: Option<&str>) -> String {
    code.and_then(|c| c.parse::<Card>().ok())
        .map_or_else(|| BLANK_GLYPH.to_string(), |card| card.glyph())
}
