//! Snapshot reconciler: overwrite the zone model from a full snapshot.
//!
//! Used for board updates with an empty action log (a rejoin, a spectator
//! refresh, a mode change). No animation; every zone is rebuilt from what
//! the snapshot says this client may see.

use tracing::debug;

use crate::core::player::Roster;
use crate::core::state::RoomSessionState;
use crate::protocol::{CardToken, Snapshot};
use crate::zones::{Slot, ZoneKey, ZoneKind, ZoneManager};

fn token_slot(token: &CardToken) -> Slot {
    token.card().map_or_else(Slot::hidden, Slot::up)
}

/// Slots a player's hand should show.
#[must_use]
pub fn hand_slots(snapshot: &Snapshot, session: &RoomSessionState, index: usize, player: &str) -> Vec<Slot> {
    if session.is_local(player) {
        return snapshot.hand.iter().map(token_slot).collect();
    }
    if snapshot.reveals_hands() {
        if let Some(cards) = snapshot.final_hands.get(index).filter(|cards| !cards.is_empty()) {
            return cards.iter().map(token_slot).collect();
        }
    }
    vec![Slot::hidden(); snapshot.hand_size(index)]
}

/// Hands on the table whose owner is knocked out or no longer in `order`.
#[must_use]
pub fn departed_hands(order: &[String], roster: &Roster, zones: &ZoneManager) -> Vec<ZoneKey> {
    zones
        .zones()
        .into_iter()
        .filter(|zone| zone.kind == ZoneKind::Hand)
        .filter(|zone| {
            zone.owner().is_some_and(|owner| {
                !order.iter().any(|p| p == owner)
                    || roster.get(owner).is_some_and(|player| player.knocked_out)
            })
        })
        .cloned()
        .collect()
}

/// Rebuild every zone from `snapshot`.
///
/// `session` and `roster` must already reflect the snapshot.
pub fn reconcile(
    snapshot: &Snapshot,
    session: &RoomSessionState,
    roster: &Roster,
    zones: &mut ZoneManager,
) {
    let order = snapshot.order();

    for (i, player) in order.iter().enumerate() {
        let slots = hand_slots(snapshot, session, i, player);
        zones.replace_all(&ZoneKey::hand(player.as_str()), slots);
    }

    for zone in departed_hands(order, roster, zones) {
        debug!(%zone, "emptying hand of player outside the turn order");
        zones.drop_zone(&zone);
    }

    if session.game.has_discard_pile() {
        let discard = snapshot.discard_card().map_or(Slot::Placeholder, Slot::up);
        zones.replace_all(&ZoneKey::discard(), [discard]);
        zones.drop_zone(&ZoneKey::crib());
        zones.set_crib_count(0);
    } else {
        zones.set_crib_count(snapshot.crib_size);
        let crib = if snapshot.crib_size > 0 {
            Slot::hidden()
        } else {
            Slot::Placeholder
        };
        zones.replace_all(&ZoneKey::crib(), [crib]);
        zones.drop_zone(&ZoneKey::discard());
    }

    let deck = snapshot.starter_card().map_or(Slot::Placeholder, Slot::up);
    zones.replace_all(&ZoneKey::deck(), [deck]);
}
