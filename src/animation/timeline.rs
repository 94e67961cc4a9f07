//! Animation timeline: per-zone job queues on a virtual clock.
//!
//! Every card move is an `AnimationJob` that declares the zones it touches
//! and carries the zone mutation (`SettlePlan`) to apply when it completes.
//!
//! ## Ordering
//!
//! Each zone has a FIFO queue of job ids. A job starts only when it is at the
//! head of the queue of *every* zone it touches, so two jobs that share a
//! zone run in enqueue order while jobs on disjoint zones run concurrently.
//! The source slot of a move (including a random pick among an opponent's
//! hidden cards) is resolved when the job starts, never at enqueue time.
//!
//! ## Completion
//!
//! `advance_to` walks the clock forward event by event. A job's mutation is
//! applied exactly once, when it finishes; completions come back in finish
//! order with ties broken by enqueue order. A job whose source or rects can't
//! be resolved fails without mutating anything and releases its zones.

use std::collections::{BTreeMap, VecDeque};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use tracing::{debug, trace, warn};

use super::easing::CubicBezier;
use super::layout::LayoutProbe;
use super::primitives::{animate_move, AnimationError, CloneSprite};
use crate::cards::Card;
use crate::core::entity::NodeId;
use crate::core::rng::SelectionRng;
use crate::zones::{FaceState, Slot, SlotCard, ZoneKey, ZoneKind, ZoneManager, ZonePosition};

/// Identifier of a queued job, in enqueue order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub u64);

/// How a move finds the slot it animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceSelector {
    /// Leftmost slot holding this card.
    Matching(Card),
    /// Uniformly random occupied slot.
    RandomOccupied,
    /// Rightmost slot of the zone.
    ZoneTop,
    /// The zone itself; no slot leaves it (drawing from the deck).
    Anchor,
}

/// The visual part of a job.
#[derive(Clone, Debug, PartialEq)]
pub struct Motion {
    pub from: ZoneKey,
    pub source: SourceSelector,
    pub to: ZoneKey,
    pub start_face: FaceState,
    pub end_face: FaceState,
    /// Card drawn on the clone sprite.
    pub shown: SlotCard,
}

/// The zone mutation a job applies when it completes.
#[derive(Clone, Debug, PartialEq)]
pub enum SettlePlan {
    /// Append a new slot to a hand.
    DrawToHand { hand: ZoneKey, slot: Slot },
    /// Move the source node onto the discard pile as `revealed`.
    DiscardFromHand { revealed: Slot },
    /// Move the discard top into a hand, then show `next_discard` on the pile.
    /// `slot` overrides what the card shows once in hand; `None` keeps it as is.
    PickupToHand {
        hand: ZoneKey,
        slot: Option<Slot>,
        next_discard: Slot,
    },
    /// Move the source node onto the crib face down and count it.
    CribFromHand,
    /// Turn the deck slot face up as the starter.
    RevealStarter { card: Card },
    /// Overwrite a zone.
    Replace { zone: ZoneKey, slots: Vec<Slot> },
    /// Remove a zone and every node in it.
    DropZone { zone: ZoneKey },
    /// Overwrite a hand only if it already holds `slots.len()` slots.
    ConformHand { hand: ZoneKey, slots: Vec<Slot> },
    /// Empty the crib and zero its count.
    ResetCrib,
}

impl SettlePlan {
    fn zones(&self) -> SmallVec<[ZoneKey; 2]> {
        match self {
            SettlePlan::DrawToHand { hand, .. } => smallvec![hand.clone()],
            SettlePlan::DiscardFromHand { .. } => smallvec![ZoneKey::discard()],
            SettlePlan::PickupToHand { hand, .. } => smallvec![ZoneKey::discard(), hand.clone()],
            SettlePlan::CribFromHand | SettlePlan::ResetCrib => smallvec![ZoneKey::crib()],
            SettlePlan::RevealStarter { .. } => smallvec![ZoneKey::deck()],
            SettlePlan::Replace { zone, .. } | SettlePlan::DropZone { zone } => smallvec![zone.clone()],
            SettlePlan::ConformHand { hand, .. } => smallvec![hand.clone()],
        }
    }

    fn source(node: Option<NodeId>) -> Result<NodeId, AnimationError> {
        node.ok_or_else(|| AnimationError::SourceMissing {
            what: "source node was not resolved".to_string(),
        })
    }

    fn lost(node: NodeId) -> AnimationError {
        AnimationError::SourceMissing {
            what: format!("{node} left the table before settling"),
        }
    }

    /// Apply this mutation. `source` is the node resolved when the job started.
    pub fn apply(&self, zones: &mut ZoneManager, source: Option<NodeId>) -> Result<(), AnimationError> {
        match self {
            SettlePlan::DrawToHand { hand, slot } => {
                zones.insert(hand, *slot, ZonePosition::Top);
            }
            SettlePlan::DiscardFromHand { revealed } => {
                let node = Self::source(source)?;
                land_on_pile(zones, node, &ZoneKey::discard(), *revealed)?;
            }
            SettlePlan::PickupToHand {
                hand,
                slot,
                next_discard,
            } => {
                let node = Self::source(source)?;
                zones
                    .move_node(node, hand, ZonePosition::Top)
                    .ok_or_else(|| Self::lost(node))?;
                if let Some(slot) = slot {
                    zones.set_slot(node, *slot);
                }
                zones.insert(&ZoneKey::discard(), *next_discard, ZonePosition::Top);
            }
            SettlePlan::CribFromHand => {
                let node = Self::source(source)?;
                land_on_pile(zones, node, &ZoneKey::crib(), Slot::hidden())?;
                zones.increment_crib();
            }
            SettlePlan::RevealStarter { card } => {
                let node = Self::source(source)?;
                if !zones.set_slot(node, Slot::up(*card)) {
                    return Err(Self::lost(node));
                }
            }
            SettlePlan::Replace { zone, slots } => {
                zones.replace_all(zone, slots.iter().copied());
            }
            SettlePlan::DropZone { zone } => {
                zones.drop_zone(zone);
            }
            SettlePlan::ConformHand { hand, slots } => {
                if zones.count(hand) == slots.len() {
                    zones.replace_all(hand, slots.iter().copied());
                } else {
                    debug!(
                        %hand,
                        have = zones.count(hand),
                        want = slots.len(),
                        "hand size disagrees, not conforming"
                    );
                }
            }
            SettlePlan::ResetCrib => {
                zones.set_crib_count(0);
                zones.replace_all(&ZoneKey::crib(), [Slot::Placeholder]);
            }
        }
        Ok(())
    }
}

/// Single-slot piles show only the card that landed last.
fn land_on_pile(
    zones: &mut ZoneManager,
    node: NodeId,
    pile: &ZoneKey,
    shown: Slot,
) -> Result<(), AnimationError> {
    if !zones.contains(node) {
        return Err(SettlePlan::lost(node));
    }
    let stale: Vec<NodeId> = zones.nodes(pile).iter().copied().filter(|&n| n != node).collect();
    for n in stale {
        zones.remove_node(n);
    }
    zones.move_node(node, pile, ZonePosition::Top);
    zones.set_slot(node, shown);
    Ok(())
}

/// A job to enqueue.
#[derive(Clone, Debug, PartialEq)]
pub struct JobRequest {
    pub motion: Option<Motion>,
    pub settle: SettlePlan,
}

impl JobRequest {
    /// An animated move.
    #[must_use]
    pub fn moving(motion: Motion, settle: SettlePlan) -> Self {
        Self {
            motion: Some(motion),
            settle,
        }
    }

    /// A zero-duration mutation that still waits its turn in the zone queues.
    #[must_use]
    pub fn instant(settle: SettlePlan) -> Self {
        Self { motion: None, settle }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Queued,
    Running,
}

/// A queued or running job.
#[derive(Clone, Debug)]
pub struct AnimationJob {
    pub id: JobId,
    /// Index into the action log this job replays, if any.
    pub action_index: Option<usize>,
    pub touches: SmallVec<[ZoneKey; 2]>,
    pub motion: Option<Motion>,
    pub settle: SettlePlan,
    pub state: JobState,
    /// Source node, resolved at start.
    pub source_node: Option<NodeId>,
    pub sprite: Option<CloneSprite>,
    pub started_at: Option<u64>,
}

impl AnimationJob {
    fn finish_at(&self) -> Option<u64> {
        let started = self.started_at?;
        let duration = self.sprite.as_ref().map_or(0, |s| u64::from(s.duration_ms));
        Some(started + duration)
    }

    /// Time since this job started.
    #[must_use]
    pub fn elapsed(&self, now_ms: u64) -> Option<u64> {
        self.started_at.map(|start| now_ms.saturating_sub(start))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionOutcome {
    Settled,
    Failed(AnimationError),
}

/// A job that finished, in the order it finished.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    pub job: JobId,
    pub action_index: Option<usize>,
    pub at_ms: u64,
    pub outcome: CompletionOutcome,
}

impl Completion {
    #[must_use]
    pub fn settled(&self) -> bool {
        self.outcome == CompletionOutcome::Settled
    }
}

/// Per-zone queues of animation jobs.
#[derive(Clone, Debug)]
pub struct AnimationTimeline {
    jobs: BTreeMap<JobId, AnimationJob>,
    queues: FxHashMap<ZoneKey, VecDeque<JobId>>,
    next_id: u64,
    clock_ms: u64,
    duration_ms: u32,
    easing: CubicBezier,
}

impl AnimationTimeline {
    #[must_use]
    pub fn new(duration_ms: u32, easing: CubicBezier) -> Self {
        Self {
            jobs: BTreeMap::new(),
            queues: FxHashMap::default(),
            next_id: 0,
            clock_ms: 0,
            duration_ms,
            easing,
        }
    }

    /// Queue a job behind everything already queued on its zones.
    pub fn enqueue(&mut self, action_index: Option<usize>, request: JobRequest) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;

        let mut touches: SmallVec<[ZoneKey; 2]> = SmallVec::new();
        let motion_zones = request.motion.iter().flat_map(|m| [m.from.clone(), m.to.clone()]);
        for zone in motion_zones.chain(request.settle.zones()) {
            if !touches.contains(&zone) {
                touches.push(zone);
            }
        }
        for zone in &touches {
            self.queues.entry(zone.clone()).or_default().push_back(id);
        }

        self.jobs.insert(
            id,
            AnimationJob {
                id,
                action_index,
                touches,
                motion: request.motion,
                settle: request.settle,
                state: JobState::Queued,
                source_node: None,
                sprite: None,
                started_at: None,
            },
        );
        id
    }

    /// Advance the clock to `now_ms`, starting and settling jobs on the way.
    pub fn advance_to(
        &mut self,
        now_ms: u64,
        zones: &mut ZoneManager,
        layout: &dyn LayoutProbe,
        rng: &mut SelectionRng,
    ) -> Vec<Completion> {
        let now_ms = now_ms.max(self.clock_ms);
        let mut done = Vec::new();

        loop {
            self.start_eligible(zones, layout, rng, &mut done);

            let next = self
                .jobs
                .values()
                .filter_map(|job| Some((job.finish_at()?, job.id)))
                .min();
            match next {
                Some((finish, id)) if finish <= now_ms => {
                    self.clock_ms = finish;
                    self.settle(id, zones, &mut done);
                }
                _ => break,
            }
        }

        self.clock_ms = now_ms;
        done
    }

    fn is_eligible(&self, job: &AnimationJob) -> bool {
        job.touches.iter().all(|zone| {
            self.queues
                .get(zone)
                .and_then(VecDeque::front)
                .is_some_and(|&head| head == job.id)
        })
    }

    fn start_eligible(
        &mut self,
        zones: &ZoneManager,
        layout: &dyn LayoutProbe,
        rng: &mut SelectionRng,
        done: &mut Vec<Completion>,
    ) {
        loop {
            let ready: Vec<JobId> = self
                .jobs
                .values()
                .filter(|job| job.state == JobState::Queued && self.is_eligible(job))
                .map(|job| job.id)
                .collect();
            if ready.is_empty() {
                return;
            }

            let mut released = false;
            for id in ready {
                if let Err(err) = self.start(id, zones, layout, rng) {
                    warn!(job = id.0, error = %err, "animation job failed to start");
                    self.finish(id, CompletionOutcome::Failed(err), done);
                    released = true;
                }
            }
            if !released {
                return;
            }
        }
    }

    fn start(
        &mut self,
        id: JobId,
        zones: &ZoneManager,
        layout: &dyn LayoutProbe,
        rng: &mut SelectionRng,
    ) -> Result<(), AnimationError> {
        let (duration_ms, easing, clock_ms) = (self.duration_ms, self.easing, self.clock_ms);
        let Some(job) = self.jobs.get_mut(&id) else {
            return Ok(());
        };

        if let Some(motion) = &job.motion {
            let node = resolve_source(motion, zones, rng)?;
            let from_rect = match node {
                Some(node) => {
                    let index = zones.index_of(node).unwrap_or(0);
                    layout.slot_rect(&motion.from, index, zones.count(&motion.from))
                }
                None => layout.zone_rect(&motion.from),
            };
            let to_rect = if motion.to.kind == ZoneKind::Hand {
                let len = zones.count(&motion.to);
                layout.slot_rect(&motion.to, len, len + 1)
            } else {
                layout.zone_rect(&motion.to)
            };
            let sprite = animate_move(
                from_rect,
                to_rect,
                motion.start_face,
                motion.end_face,
                duration_ms,
                easing,
            )?;
            job.source_node = node;
            job.sprite = Some(sprite);
        }

        trace!(job = id.0, at = clock_ms, "animation job started");
        job.state = JobState::Running;
        job.started_at = Some(clock_ms);
        Ok(())
    }

    fn settle(&mut self, id: JobId, zones: &mut ZoneManager, done: &mut Vec<Completion>) {
        let Some(job) = self.jobs.get(&id) else {
            return;
        };
        let outcome = match job.settle.apply(zones, job.source_node) {
            Ok(()) => {
                trace!(job = id.0, at = self.clock_ms, "animation job settled");
                CompletionOutcome::Settled
            }
            Err(err) => {
                warn!(job = id.0, error = %err, "animation job failed to settle");
                CompletionOutcome::Failed(err)
            }
        };
        self.finish(id, outcome, done);
    }

    fn finish(&mut self, id: JobId, outcome: CompletionOutcome, done: &mut Vec<Completion>) {
        let Some(job) = self.jobs.remove(&id) else {
            return;
        };
        for zone in &job.touches {
            if let Some(queue) = self.queues.get_mut(zone) {
                queue.retain(|&queued| queued != id);
                if queue.is_empty() {
                    self.queues.remove(zone);
                }
            }
        }
        done.push(Completion {
            job: id,
            action_index: job.action_index,
            at_ms: self.clock_ms,
            outcome,
        });
    }

    /// Drop every queued and running job without settling it.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.jobs.len();
        self.jobs.clear();
        self.queues.clear();
        cancelled
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.jobs.is_empty()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.jobs.len()
    }

    /// Jobs currently in flight.
    pub fn running(&self) -> impl Iterator<Item = &AnimationJob> {
        self.jobs.values().filter(|job| job.state == JobState::Running)
    }

    /// Earliest action index still being replayed.
    #[must_use]
    pub fn current_action(&self) -> Option<usize> {
        self.jobs.values().filter_map(|job| job.action_index).min()
    }

    #[must_use]
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    #[must_use]
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }
}

fn resolve_source(
    motion: &Motion,
    zones: &ZoneManager,
    rng: &mut SelectionRng,
) -> Result<Option<NodeId>, AnimationError> {
    let from = &motion.from;
    let missing = |what: String| AnimationError::SourceMissing { what };
    match motion.source {
        SourceSelector::Anchor => Ok(None),
        SourceSelector::Matching(card) => zones
            .find_first_matching(from, |slot| slot.holds(card))
            .map(Some)
            .ok_or_else(|| missing(format!("{card} in {from}"))),
        SourceSelector::RandomOccupied => zones
            .pick_random_occupied(from, rng)
            .map(Some)
            .ok_or_else(|| missing(format!("occupied slot in {from}"))),
        SourceSelector::ZoneTop => zones
            .top(from)
            .map(Some)
            .ok_or_else(|| missing(format!("top of {from}"))),
    }
}
