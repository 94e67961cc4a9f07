//! Zone manager for table slots.
//!
//! The `ZoneManager` is the authoritative model of every card-sized slot on
//! the table. It tracks:
//! - Which zone each node is in (`locations`)
//! - The left-to-right order of nodes within each zone (`zone_order`)
//! - What each slot shows (`slots`)
//! - The cumulative crib count, which is independent of the single visible crib slot
//!
//! The visual tree is a projection of this model; nothing is ever read back
//! from the rendered view.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::slot::{Slot, ZoneKey};
use crate::core::entity::NodeId;
use crate::core::rng::SelectionRng;

/// Position for inserting a slot into a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Append at the right end.
    Top,
    /// Insert at the left end.
    Bottom,
    /// Insert at a specific index (0 = leftmost), clamped to the zone length.
    Index(usize),
}

/// Manages slot locations and contents across zones.
///
/// ## Usage
///
/// ```
/// use card_table::zones::{Slot, ZoneKey, ZoneManager, ZonePosition};
///
/// let mut zones = ZoneManager::new();
/// let hand = ZoneKey::hand("alice");
///
/// zones.insert(&hand, Slot::hidden(), ZonePosition::Top);
/// let first = zones.insert(&hand, Slot::hidden(), ZonePosition::Bottom);
///
/// assert_eq!(zones.count(&hand), 2);
/// assert_eq!(zones.index_of(first), Some(0));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    /// Node locations: node -> zone
    locations: FxHashMap<NodeId, ZoneKey>,

    /// Ordered node lists, index 0 leftmost.
    zone_order: FxHashMap<ZoneKey, Vec<NodeId>>,

    slots: FxHashMap<NodeId, Slot>,

    crib_count: u32,

    next_node: NodeId,
}

impl ZoneManager {
    /// Create a new empty zone manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> NodeId {
        let id = self.next_node;
        self.next_node = id.next();
        id
    }

    fn place(&mut self, node: NodeId, zone: &ZoneKey, position: ZonePosition) {
        let order = self.zone_order.entry(zone.clone()).or_default();
        match position {
            ZonePosition::Top => order.push(node),
            ZonePosition::Bottom => order.insert(0, node),
            ZonePosition::Index(i) => {
                let idx = i.min(order.len());
                order.insert(idx, node);
            }
        }
        self.locations.insert(node, zone.clone());
    }

    /// Add a new slot to a zone, returning its node id.
    pub fn insert(&mut self, zone: &ZoneKey, slot: Slot, position: ZonePosition) -> NodeId {
        let node = self.allocate();
        self.slots.insert(node, slot);
        self.place(node, zone, position);
        node
    }

    /// Move an existing node to another zone, keeping its id and slot.
    ///
    /// Returns the old zone, or `None` if the node wasn't found.
    pub fn move_node(
        &mut self,
        node: NodeId,
        to: &ZoneKey,
        position: ZonePosition,
    ) -> Option<ZoneKey> {
        let from = self.locations.get(&node)?.clone();
        if let Some(order) = self.zone_order.get_mut(&from) {
            order.retain(|&n| n != node);
        }
        self.place(node, to, position);
        Some(from)
    }

    /// Remove a node entirely.
    ///
    /// Returns the zone it was in and its slot, or `None` if not found.
    pub fn remove_node(&mut self, node: NodeId) -> Option<(ZoneKey, Slot)> {
        let zone = self.locations.remove(&node)?;
        if let Some(order) = self.zone_order.get_mut(&zone) {
            order.retain(|&n| n != node);
        }
        let slot = self.slots.remove(&node).unwrap_or(Slot::Empty);
        Some((zone, slot))
    }

    /// Find the leftmost slot in `zone` matching `pred`.
    #[must_use]
    pub fn find_first_matching(&self, zone: &ZoneKey, pred: impl Fn(&Slot) -> bool) -> Option<NodeId> {
        self.nodes(zone)
            .iter()
            .copied()
            .find(|node| self.slots.get(node).is_some_and(&pred))
    }

    /// Remove the leftmost slot in `zone` matching `pred`.
    pub fn remove_first_matching(
        &mut self,
        zone: &ZoneKey,
        pred: impl Fn(&Slot) -> bool,
    ) -> Option<(NodeId, Slot)> {
        let node = self.find_first_matching(zone, pred)?;
        let (_, slot) = self.remove_node(node)?;
        Some((node, slot))
    }

    /// Overwrite a slot in place. Returns `false` if the node doesn't exist.
    pub fn set_slot(&mut self, node: NodeId, slot: Slot) -> bool {
        match self.slots.get_mut(&node) {
            Some(existing) => {
                *existing = slot;
                true
            }
            None => false,
        }
    }

    /// Choose uniformly among the occupied slots of a zone.
    pub fn pick_random_occupied(&self, zone: &ZoneKey, rng: &mut SelectionRng) -> Option<NodeId> {
        let occupied: Vec<NodeId> = self
            .nodes(zone)
            .iter()
            .copied()
            .filter(|node| self.slots.get(node).is_some_and(Slot::is_occupied))
            .collect();
        rng.choose(&occupied).copied()
    }

    /// Remove a uniformly random occupied slot from a zone.
    pub fn remove_random_occupied(
        &mut self,
        zone: &ZoneKey,
        rng: &mut SelectionRng,
    ) -> Option<(NodeId, Slot)> {
        let node = self.pick_random_occupied(zone, rng)?;
        let (_, slot) = self.remove_node(node)?;
        Some((node, slot))
    }

    /// Replace the whole contents of a zone, returning the new node ids in order.
    pub fn replace_all(&mut self, zone: &ZoneKey, slots: impl IntoIterator<Item = Slot>) -> Vec<NodeId> {
        self.drop_zone(zone);
        slots
            .into_iter()
            .map(|slot| self.insert(zone, slot, ZonePosition::Top))
            .collect()
    }

    /// Remove a zone and all of its nodes. Returns how many nodes were removed.
    pub fn drop_zone(&mut self, zone: &ZoneKey) -> usize {
        let Some(order) = self.zone_order.remove(zone) else {
            return 0;
        };
        for node in &order {
            self.locations.remove(node);
            self.slots.remove(node);
        }
        order.len()
    }

    /// Number of slots in a zone.
    #[must_use]
    pub fn count(&self, zone: &ZoneKey) -> usize {
        self.zone_order.get(zone).map_or(0, Vec::len)
    }

    /// Node ids of a zone, left to right.
    #[must_use]
    pub fn nodes(&self, zone: &ZoneKey) -> &[NodeId] {
        self.zone_order.get(zone).map_or(&[], Vec::as_slice)
    }

    /// Slot contents of a zone, left to right.
    #[must_use]
    pub fn slots(&self, zone: &ZoneKey) -> Vec<Slot> {
        self.nodes(zone)
            .iter()
            .filter_map(|node| self.slots.get(node).copied())
            .collect()
    }

    /// The rightmost node of a zone.
    #[must_use]
    pub fn top(&self, zone: &ZoneKey) -> Option<NodeId> {
        self.zone_order.get(zone)?.last().copied()
    }

    #[must_use]
    pub fn slot(&self, node: NodeId) -> Option<&Slot> {
        self.slots.get(&node)
    }

    /// Position of a node within its zone.
    #[must_use]
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        let zone = self.locations.get(&node)?;
        self.nodes(zone).iter().position(|&n| n == node)
    }

    /// The zone a node is in.
    #[must_use]
    pub fn zone_of(&self, node: NodeId) -> Option<&ZoneKey> {
        self.locations.get(&node)
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.locations.contains_key(&node)
    }

    /// All zone keys, sorted.
    #[must_use]
    pub fn zones(&self) -> Vec<&ZoneKey> {
        let mut keys: Vec<_> = self.zone_order.keys().collect();
        keys.sort();
        keys
    }

    #[must_use]
    pub fn crib_count(&self) -> u32 {
        self.crib_count
    }

    pub fn set_crib_count(&mut self, count: u32) {
        self.crib_count = count;
    }

    /// Add one card to the crib count, returning the new count.
    pub fn increment_crib(&mut self) -> u32 {
        self.crib_count += 1;
        self.crib_count
    }

    /// Get total number of nodes tracked.
    #[must_use]
    pub fn total_nodes(&self) -> usize {
        self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Card;

    fn card(code: &str) -> Card {
        code.parse().unwrap()
    }

    #[test]
    fn test_insert_positions() {
        let mut zones = ZoneManager::new();
        let hand = ZoneKey::hand("p1");

        let a = zones.insert(&hand, Slot::up(card("AS")), ZonePosition::Top);
        let b = zones.insert(&hand, Slot::up(card("KH")), ZonePosition::Top);
        let c = zones.insert(&hand, Slot::up(card("2D")), ZonePosition::Bottom);
        let d = zones.insert(&hand, Slot::up(card("3C")), ZonePosition::Index(1));
        let e = zones.insert(&hand, Slot::up(card("4C")), ZonePosition::Index(99));

        assert_eq!(zones.nodes(&hand), &[c, d, a, b, e]);
        assert_eq!(zones.count(&hand), 5);
        assert_eq!(zones.top(&hand), Some(e));
    }

    #[test]
    fn test_node_ids_never_reused() {
        let mut zones = ZoneManager::new();
        let deck = ZoneKey::deck();

        let first = zones.replace_all(&deck, [Slot::Placeholder]);
        let second = zones.replace_all(&deck, [Slot::Placeholder]);

        assert_ne!(first, second);
        assert!(!zones.contains(first[0]));
        assert_eq!(zones.total_nodes(), 1);
    }

    #[test]
    fn test_find_first_matching() {
        let mut zones = ZoneManager::new();
        let hand = ZoneKey::hand("p1");
        let nodes = zones.replace_all(
            &hand,
            [Slot::up(card("AS")), Slot::up(card("KH")), Slot::up(card("AS"))],
        );

        assert_eq!(zones.find_first_matching(&hand, |s| s.holds(card("AS"))), Some(nodes[0]));
        assert_eq!(zones.find_first_matching(&hand, |s| s.holds(card("KH"))), Some(nodes[1]));
        assert!(zones.find_first_matching(&hand, |s| s.holds(card("2C"))).is_none());

        let (node, slot) = zones
            .remove_first_matching(&hand, |s| s.holds(card("AS")))
            .unwrap();
        assert_eq!((node, slot), (nodes[0], Slot::up(card("AS"))));
        assert!(!zones.contains(node));
        assert_eq!(zones.slots(&hand), vec![Slot::up(card("KH")), Slot::up(card("AS"))]);
    }

    #[test]
    fn test_move_node_keeps_identity() {
        let mut zones = ZoneManager::new();
        let hand = ZoneKey::hand("p1");
        let discard = ZoneKey::discard();
        let nodes = zones.replace_all(&hand, [Slot::up(card("9C")), Slot::up(card("TD"))]);

        let old = zones.move_node(nodes[0], &discard, ZonePosition::Top);
        assert_eq!(old, Some(hand.clone()));
        assert_eq!(zones.zone_of(nodes[0]), Some(&discard));
        assert_eq!(zones.slot(nodes[0]), Some(&Slot::up(card("9C"))));
        assert_eq!(zones.count(&hand), 1);
        assert_eq!(zones.index_of(nodes[1]), Some(0));
    }

    #[test]
    fn test_random_occupied_skips_placeholders() {
        let mut zones = ZoneManager::new();
        let hand = ZoneKey::hand("p2");
        let nodes = zones.replace_all(&hand, [Slot::Placeholder, Slot::hidden(), Slot::Placeholder]);

        let mut rng = SelectionRng::new(5);
        for _ in 0..20 {
            assert_eq!(zones.pick_random_occupied(&hand, &mut rng), Some(nodes[1]));
        }
        let (node, slot) = zones.remove_random_occupied(&hand, &mut rng).unwrap();
        assert_eq!(node, nodes[1]);
        assert_eq!(slot, Slot::hidden());
        assert!(zones.pick_random_occupied(&hand, &mut rng).is_none());
    }

    #[test]
    fn test_random_pick_is_uniform_across_seeds() {
        let mut zones = ZoneManager::new();
        let hand = ZoneKey::hand("p2");
        let nodes = zones.replace_all(&hand, [Slot::hidden(); 3]);

        let mut counts = [0usize; 3];
        for seed in 0..3000 {
            let mut rng = SelectionRng::new(seed);
            let node = zones.pick_random_occupied(&hand, &mut rng).unwrap();
            let index = nodes.iter().position(|&n| n == node).unwrap();
            counts[index] += 1;
        }
        for count in counts {
            assert!((850..=1150).contains(&count), "skewed pick counts {counts:?}");
        }
    }

    #[test]
    fn test_random_pick_is_seeded() {
        let mut zones = ZoneManager::new();
        let hand = ZoneKey::hand("p2");
        zones.replace_all(&hand, std::iter::repeat(Slot::hidden()).take(5));

        let picks = |seed| {
            let mut rng = SelectionRng::new(seed);
            (0..10)
                .map(|_| zones.pick_random_occupied(&hand, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(11), picks(11));
    }

    #[test]
    fn test_drop_zone() {
        let mut zones = ZoneManager::new();
        let hand = ZoneKey::hand("gone");
        zones.replace_all(&hand, [Slot::hidden(), Slot::hidden()]);

        assert_eq!(zones.drop_zone(&hand), 2);
        assert_eq!(zones.count(&hand), 0);
        assert_eq!(zones.total_nodes(), 0);
        assert_eq!(zones.drop_zone(&hand), 0);
    }

    #[test]
    fn test_crib_count() {
        let mut zones = ZoneManager::new();
        assert_eq!(zones.crib_count(), 0);
        assert_eq!(zones.increment_crib(), 1);
        assert_eq!(zones.increment_crib(), 2);
        zones.set_crib_count(0);
        assert_eq!(zones.crib_count(), 0);
    }

    #[test]
    fn test_set_slot() {
        let mut zones = ZoneManager::new();
        let deck = ZoneKey::deck();
        let node = zones.insert(&deck, Slot::Placeholder, ZonePosition::Top);

        assert!(zones.set_slot(node, Slot::up(card("5H"))));
        assert_eq!(zones.slots(&deck), vec![Slot::up(card("5H"))]);
        zones.remove_node(node);
        assert!(!zones.set_slot(node, Slot::Placeholder));
    }
}
