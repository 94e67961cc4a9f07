//! Table actions: what a logged server move means for the table.
//!
//! A `ServerAction` is the loose wire form. `TableAction::interpret` resolves
//! it against the game being played into one of the moves the replayer knows
//! how to animate, or `Skipped`. For example, cribbage logs its crib discard
//! as a plain `discard`, which is not the thirty-one discard-pile move.

use smallvec::SmallVec;

use super::config::GameKind;
use crate::cards::Card;
use crate::protocol::{ActionKind, ServerAction};

/// A logged move, resolved for one game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableAction {
    /// Fresh hands for everyone.
    Deal,
    /// Deck → hand. `card` is known only to its recipient.
    Draw { player: String, card: Option<Card> },
    /// Hand → discard pile.
    Discard { player: String, card: Option<Card> },
    /// Discard pile → hand.
    Pickup { player: String, card: Option<Card> },
    /// Starter cut, shown on the deck.
    Starter { card: Option<Card> },
    /// Hand → crib, `count` cards. `cards` holds whichever are known.
    DiscardToCrib {
        player: String,
        cards: SmallVec<[Option<Card>; 3]>,
        count: usize,
    },
    /// Recognised but not animated, or not recognised at all.
    Skipped { tag: String },
}

impl TableAction {
    /// Resolve a wire action for `game`.
    #[must_use]
    pub fn interpret(action: &ServerAction, game: GameKind) -> Self {
        let skipped = || TableAction::Skipped {
            tag: action.kind.tag().to_string(),
        };
        let player = action.player().map(str::to_string);
        let card = action.first_card();

        match (&action.kind, player) {
            (ActionKind::Deal, _) => TableAction::Deal,
            (ActionKind::Starter, _) => TableAction::Starter { card },
            (ActionKind::Draw, Some(player)) => TableAction::Draw { player, card },
            (ActionKind::Pickup, Some(player)) => TableAction::Pickup { player, card },
            (ActionKind::Discard, Some(player)) if game.has_discard_pile() => {
                TableAction::Discard { player, card }
            }
            (ActionKind::Discard | ActionKind::DiscardToCrib, Some(player)) => {
                let cards: SmallVec<[Option<Card>; 3]> =
                    action.cards.iter().map(|token| token.card()).collect();
                let count = action.num_to_discard.map_or(cards.len(), |n| n as usize);
                TableAction::DiscardToCrib {
                    player,
                    cards,
                    count,
                }
            }
            _ => skipped(),
        }
    }

    /// The acting player, for per-player moves.
    #[must_use]
    pub fn player(&self) -> Option<&str> {
        match self {
            TableAction::Draw { player, .. }
            | TableAction::Discard { player, .. }
            | TableAction::Pickup { player, .. }
            | TableAction::DiscardToCrib { player, .. } => Some(player),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, TableAction::Skipped { .. })
    }
}
