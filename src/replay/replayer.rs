//! Action replayer: turns an action log into queued card moves.
//!
//! Every logged action becomes one or more timeline jobs, enqueued in log
//! order. The replayer never touches the zone model itself; each mutation
//! happens when its job settles, so the per-zone queues are what keep the
//! mutations in log order even while unrelated moves overlap on screen.
//!
//! The snapshot that carried the log describes the table *after* all of it.
//! Where a logged move doesn't name a card the replayer falls back to the
//! snapshot (the discard pile top, the local hand).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animation::timeline::{
    AnimationTimeline, JobRequest, Motion, SettlePlan, SourceSelector,
};
use crate::cards::Card;
use crate::core::action::TableAction;
use crate::core::config::GameKind;
use crate::core::state::RoomSessionState;
use crate::protocol::{CardToken, Snapshot};
use crate::zones::{FaceState, Slot, SlotCard, ZoneKey};

/// Whether the replayer is mid-log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayState {
    #[default]
    Idle,
    /// Replaying the action at this log index.
    Replaying(usize),
}

impl ReplayState {
    #[must_use]
    pub fn of(timeline: &AnimationTimeline) -> Self {
        timeline
            .current_action()
            .map_or(ReplayState::Idle, ReplayState::Replaying)
    }
}

/// What one replay enqueued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub jobs: usize,
    pub replayed: usize,
    pub skipped: usize,
}

fn face_up_or_placeholder(card: Option<Card>) -> Slot {
    card.map_or(Slot::Placeholder, Slot::up)
}

fn token_slot(token: &CardToken) -> Slot {
    token.card().map_or_else(Slot::hidden, Slot::up)
}

/// Replays one board update's action log into a timeline.
pub struct ActionReplayer<'a> {
    session: &'a RoomSessionState,
    snapshot: &'a Snapshot,
    timeline: &'a mut AnimationTimeline,
    report: ReplayReport,
}

impl<'a> ActionReplayer<'a> {
    /// `session` must already reflect `snapshot`.
    pub fn new(
        session: &'a RoomSessionState,
        snapshot: &'a Snapshot,
        timeline: &'a mut AnimationTimeline,
    ) -> Self {
        Self {
            session,
            snapshot,
            timeline,
            report: ReplayReport::default(),
        }
    }

    /// Enqueue every action in the log, then the end-of-log corrections.
    pub fn replay(mut self) -> ReplayReport {
        let game = self.session.game;
        let actions: Vec<TableAction> = self
            .snapshot
            .action_log
            .iter()
            .map(|action| TableAction::interpret(action, game))
            .collect();
        for (index, action) in actions.iter().enumerate() {
            debug!(index, ?action, "replaying action");
            if self.replay_action(index, action, &actions[index + 1..]) {
                self.report.replayed += 1;
            } else {
                self.report.skipped += 1;
            }
        }
        self.finish_log();
        self.report
    }

    fn push(&mut self, index: Option<usize>, request: JobRequest) {
        self.timeline.enqueue(index, request);
        self.report.jobs += 1;
    }

    fn is_local(&self, player: &str) -> bool {
        self.session.is_local(player)
    }

    /// `later` is the rest of the log after `action`.
    fn replay_action(&mut self, index: usize, action: &TableAction, later: &[TableAction]) -> bool {
        match action {
            TableAction::Deal => self.deal(index, later),
            TableAction::Draw { player, card } => {
                let slot = match (self.is_local(player), card) {
                    (true, Some(card)) => Slot::up(*card),
                    _ => Slot::hidden(),
                };
                self.draw(Some(index), player, slot);
            }
            TableAction::Discard { player, card } => self.discard(index, player, *card),
            TableAction::Pickup { player, card } => self.pickup(index, player, *card),
            TableAction::Starter { card } => {
                let Some(card) = card.or_else(|| self.snapshot.starter_card()) else {
                    debug!(index, "starter without a card, skipping");
                    return false;
                };
                self.push(
                    Some(index),
                    JobRequest::moving(
                        Motion {
                            from: ZoneKey::deck(),
                            source: SourceSelector::ZoneTop,
                            to: ZoneKey::deck(),
                            start_face: FaceState::Down,
                            end_face: FaceState::Up,
                            shown: SlotCard::Known(card),
                        },
                        SettlePlan::RevealStarter { card },
                    ),
                );
            }
            TableAction::DiscardToCrib {
                player,
                cards,
                count,
            } => {
                let local = self.is_local(player);
                for k in 0..*count {
                    let card = cards.get(k).copied().flatten();
                    self.crib_one(index, player, local, card);
                }
            }
            TableAction::Skipped { tag } => {
                debug!(index, tag = tag.as_str(), "action not animated");
                return false;
            }
        }
        true
    }

    fn deal(&mut self, index: usize, later: &[TableAction]) {
        let snapshot = self.snapshot;
        match self.session.game {
            GameKind::Cribbage => {
                self.push(Some(index), JobRequest::instant(SettlePlan::ResetCrib));
                self.push(
                    Some(index),
                    JobRequest::instant(SettlePlan::Replace {
                        zone: ZoneKey::deck(),
                        slots: vec![Slot::Placeholder],
                    }),
                );
            }
            GameKind::ThirtyOne => {
                self.push(
                    Some(index),
                    JobRequest::instant(SettlePlan::Replace {
                        zone: ZoneKey::discard(),
                        slots: vec![face_up_or_placeholder(snapshot.discard_card())],
                    }),
                );
            }
        }

        for (i, player) in snapshot.order().iter().enumerate() {
            self.push(
                Some(index),
                JobRequest::instant(SettlePlan::Replace {
                    zone: ZoneKey::hand(player.as_str()),
                    slots: Vec::new(),
                }),
            );
            for slot in self.dealt_hand(i, player, later) {
                self.draw(Some(index), player, slot);
            }
        }
    }

    /// The hand `player` was dealt, worked back from the snapshot's final hand.
    ///
    /// Cards the player drew or picked up after the deal weren't dealt, and
    /// cards they discarded or gave to the crib were. Only the local hand has
    /// faces; every other hand is a count of hidden slots.
    fn dealt_hand(&self, i: usize, player: &str, later: &[TableAction]) -> Vec<Slot> {
        let snapshot = self.snapshot;
        let local = self.is_local(player);
        let mut size = snapshot.hand_size(i);
        let mut slots: Vec<Slot> = if local {
            snapshot.hand.iter().map(token_slot).collect()
        } else {
            Vec::new()
        };

        // Undo the round's moves newest first, so a card that arrives and
        // leaves again within the round cancels out.
        let this_round: Vec<&TableAction> = later
            .iter()
            .take_while(|action| !matches!(action, TableAction::Deal))
            .collect();
        for action in this_round.into_iter().rev() {
            match action {
                TableAction::Draw { player: p, card } | TableAction::Pickup { player: p, card }
                    if p == player =>
                {
                    size = size.saturating_sub(1);
                    let arrived = card.and_then(|card| slots.iter().position(|s| s.holds(card)));
                    if let Some(k) = arrived {
                        slots.remove(k);
                    }
                }
                TableAction::Discard { player: p, card } if p == player => {
                    size += 1;
                    slots.extend(card.map(Slot::up));
                }
                TableAction::DiscardToCrib {
                    player: p,
                    cards,
                    count,
                } if p == player => {
                    size += count;
                    slots.extend(cards.iter().flatten().copied().map(Slot::up));
                }
                _ => {}
            }
        }

        if !local {
            slots.clear();
        }
        slots.resize(size, Slot::hidden());
        slots
    }

    fn draw(&mut self, index: Option<usize>, player: &str, slot: Slot) {
        let hand = ZoneKey::hand(player);
        self.push(
            index,
            JobRequest::moving(
                Motion {
                    from: ZoneKey::deck(),
                    source: SourceSelector::Anchor,
                    to: hand.clone(),
                    start_face: FaceState::Down,
                    end_face: slot.face().unwrap_or(FaceState::Down),
                    shown: slot.card().into(),
                },
                SettlePlan::DrawToHand { hand, slot },
            ),
        );
    }

    fn discard(&mut self, index: usize, player: &str, card: Option<Card>) {
        let local = self.is_local(player);
        let source = match card {
            Some(card) if local => SourceSelector::Matching(card),
            _ => SourceSelector::RandomOccupied,
        };
        let revealed_card = card.or_else(|| self.snapshot.discard_card());
        self.push(
            Some(index),
            JobRequest::moving(
                Motion {
                    from: ZoneKey::hand(player),
                    source,
                    to: ZoneKey::discard(),
                    start_face: if local { FaceState::Up } else { FaceState::Down },
                    end_face: FaceState::Up,
                    shown: revealed_card.into(),
                },
                SettlePlan::DiscardFromHand {
                    revealed: face_up_or_placeholder(revealed_card),
                },
            ),
        );
    }

    fn pickup(&mut self, index: usize, player: &str, card: Option<Card>) {
        let local = self.is_local(player);
        let (slot, end_face) = if local {
            (card.map(Slot::up), FaceState::Up)
        } else {
            (Some(Slot::hidden()), FaceState::Down)
        };
        self.push(
            Some(index),
            JobRequest::moving(
                Motion {
                    from: ZoneKey::discard(),
                    source: SourceSelector::ZoneTop,
                    to: ZoneKey::hand(player),
                    start_face: FaceState::Up,
                    end_face,
                    shown: card.into(),
                },
                SettlePlan::PickupToHand {
                    hand: ZoneKey::hand(player),
                    slot,
                    next_discard: face_up_or_placeholder(self.snapshot.discard_card()),
                },
            ),
        );
    }

    fn crib_one(&mut self, index: usize, player: &str, local: bool, card: Option<Card>) {
        let source = match card {
            Some(card) if local => SourceSelector::Matching(card),
            _ => SourceSelector::RandomOccupied,
        };
        self.push(
            Some(index),
            JobRequest::moving(
                Motion {
                    from: ZoneKey::hand(player),
                    source,
                    to: ZoneKey::crib(),
                    start_face: if local { FaceState::Up } else { FaceState::Down },
                    end_face: FaceState::Down,
                    shown: if local { card.into() } else { SlotCard::Unknown },
                },
                SettlePlan::CribFromHand,
            ),
        );
    }

    /// Reveal hands at the end of a round and put the local hand in server order.
    fn finish_log(&mut self) {
        let snapshot = self.snapshot;
        let order = snapshot.order();

        if snapshot.reveals_hands() {
            for (i, player) in order.iter().enumerate() {
                if self.is_local(player) {
                    continue;
                }
                let Some(cards) = snapshot.final_hands.get(i).filter(|cards| !cards.is_empty()) else {
                    continue;
                };
                self.push(
                    None,
                    JobRequest::instant(SettlePlan::Replace {
                        zone: ZoneKey::hand(player.as_str()),
                        slots: cards.iter().map(token_slot).collect(),
                    }),
                );
            }
        }

        if order.iter().any(|p| self.is_local(p)) {
            let hand = ZoneKey::hand(self.session.username.as_str());
            let slots = snapshot.hand.iter().map(token_slot).collect();
            self.push(None, JobRequest::instant(SettlePlan::ConformHand { hand, slots }));
        }
    }
}

/// Replay `snapshot.action_log` into `timeline`.
pub fn replay(
    session: &RoomSessionState,
    snapshot: &Snapshot,
    timeline: &mut AnimationTimeline,
) -> ReplayReport {
    ActionReplayer::new(session, snapshot, timeline).replay()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::easing::CubicBezier;
    use crate::protocol::{ActionKind, ServerAction};

    fn card(code: &str) -> Card {
        code.parse().unwrap()
    }

    fn names(list: &[&str]) -> Option<Vec<String>> {
        Some(list.iter().map(|s| (*s).to_string()).collect())
    }

    fn session(game: GameKind, snapshot: &Snapshot) -> RoomSessionState {
        RoomSessionState::setup("den", "p1", game, 50).apply_snapshot(snapshot)
    }

    fn timeline() -> AnimationTimeline {
        AnimationTimeline::new(1000, CubicBezier::EASE_OUT_QUART)
    }

    #[test]
    fn test_deal_job_count() {
        let snapshot = Snapshot {
            player_order: names(&["p1", "p2"]),
            hand_sizes: vec![3, 3],
            hand: ["AS", "KH", "2D"].iter().map(|c| CardToken::Known(card(c))).collect(),
            action_log: vec![ServerAction::new(ActionKind::Deal, "all")],
            ..Snapshot::default()
        };
        let session = session(GameKind::ThirtyOne, &snapshot);
        let mut timeline = timeline();

        let report = replay(&session, &snapshot, &mut timeline);
        // discard reset + 2 hand clears + 6 draws + local conform
        assert_eq!(report.jobs, 10);
        assert_eq!(report.replayed, 1);
        assert_eq!(ReplayState::of(&timeline), ReplayState::Replaying(0));
    }

    #[test]
    fn test_deal_counts_cards_that_left_later() {
        let snapshot = Snapshot {
            player_order: names(&["p1", "p2"]),
            hand_sizes: vec![4, 4],
            hand: ["2D", "3C", "4C", "5C"].iter().map(|c| CardToken::Known(card(c))).collect(),
            crib_size: 4,
            action_log: vec![
                ServerAction::new(ActionKind::Deal, "all"),
                ServerAction::new(ActionKind::Discard, "p1")
                    .with_cards([CardToken::Known(card("AS")), CardToken::Known(card("KH"))])
                    .with_num_to_discard(2),
                ServerAction::new(ActionKind::Discard, "p2")
                    .with_cards([CardToken::Unknown])
                    .with_num_to_discard(2),
            ],
            ..Snapshot::default()
        };
        let session = session(GameKind::Cribbage, &snapshot);
        let mut timeline = timeline();
        let replayer = ActionReplayer::new(&session, &snapshot, &mut timeline);
        let later: Vec<TableAction> = snapshot.action_log[1..]
            .iter()
            .map(|action| TableAction::interpret(action, GameKind::Cribbage))
            .collect();

        let local = replayer.dealt_hand(0, "p1", &later);
        assert_eq!(local.len(), 6);
        assert!(local.contains(&Slot::up(card("AS"))));
        assert!(local.contains(&Slot::up(card("KH"))));
        assert_eq!(replayer.dealt_hand(1, "p2", &later), vec![Slot::hidden(); 6]);

        // A later deal starts a new round; nothing past it counts.
        let mut next_round = later.clone();
        next_round.insert(0, TableAction::Deal);
        assert_eq!(replayer.dealt_hand(1, "p2", &next_round), vec![Slot::hidden(); 4]);
    }

    #[test]
    fn test_thirty_one_deal_excludes_later_draws() {
        let snapshot = Snapshot {
            player_order: names(&["p1", "p2"]),
            hand_sizes: vec![3, 3],
            hand: ["AS", "2D", "QS"].iter().map(|c| CardToken::Known(card(c))).collect(),
            ..Snapshot::default()
        };
        let session = session(GameKind::ThirtyOne, &snapshot);
        let mut timeline = timeline();
        let replayer = ActionReplayer::new(&session, &snapshot, &mut timeline);
        let later = vec![
            TableAction::Draw {
                player: "p1".into(),
                card: Some(card("QS")),
            },
            TableAction::Discard {
                player: "p1".into(),
                card: Some(card("KH")),
            },
            TableAction::Pickup {
                player: "p2".into(),
                card: Some(card("KH")),
            },
            TableAction::Discard {
                player: "p2".into(),
                card: None,
            },
        ];

        assert_eq!(
            replayer.dealt_hand(0, "p1", &later),
            vec![Slot::up(card("AS")), Slot::up(card("2D")), Slot::up(card("KH"))]
        );
        assert_eq!(replayer.dealt_hand(1, "p2", &later), vec![Slot::hidden(); 3]);

        // A card picked up and thrown back within the round was never dealt.
        let returned = vec![
            TableAction::Pickup {
                player: "p1".into(),
                card: Some(card("9C")),
            },
            TableAction::Discard {
                player: "p1".into(),
                card: Some(card("9C")),
            },
            later[0].clone(),
            later[1].clone(),
        ];
        assert_eq!(
            replayer.dealt_hand(0, "p1", &returned),
            vec![Slot::up(card("AS")), Slot::up(card("2D")), Slot::up(card("KH"))]
        );
    }

    #[test]
    fn test_skipped_actions_enqueue_nothing() {
        let snapshot = Snapshot {
            player_order: names(&["p1", "p2"]),
            action_log: vec![
                ServerAction::new(ActionKind::PlayCard, "p2"),
                ServerAction::new(ActionKind::Score, "p2"),
            ],
            ..Snapshot::default()
        };
        let session = session(GameKind::Cribbage, &snapshot);
        let mut timeline = timeline();

        let report = replay(&session, &snapshot, &mut timeline);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.replayed, 0);
        // only the local conform
        assert_eq!(report.jobs, 1);
    }

    #[test]
    fn test_crib_discard_one_job_per_card() {
        let snapshot = Snapshot {
            player_order: names(&["p1", "p2"]),
            action_log: vec![ServerAction::new(ActionKind::Discard, "p2")
                .with_cards([CardToken::Unknown])
                .with_num_to_discard(2)],
            ..Snapshot::default()
        };
        let session = session(GameKind::Cribbage, &snapshot);
        let mut timeline = timeline();

        let report = replay(&session, &snapshot, &mut timeline);
        assert_eq!(report.jobs, 3);
    }

    #[test]
    fn test_starter_falls_back_to_snapshot() {
        let snapshot = Snapshot {
            player_order: names(&["p1"]),
            starter: Some(CardToken::Known(card("JH"))),
            action_log: vec![ServerAction::new(ActionKind::Starter, "all")],
            ..Snapshot::default()
        };
        let session = session(GameKind::Cribbage, &snapshot);
        let mut timeline = timeline();

        assert_eq!(replay(&session, &snapshot, &mut timeline).replayed, 1);

        let bare = Snapshot {
            starter: None,
            ..snapshot
        };
        let mut timeline = self::timeline();
        assert_eq!(replay(&session, &bare, &mut timeline).skipped, 1);
    }

    #[test]
    fn test_idle_state() {
        assert_eq!(ReplayState::of(&timeline()), ReplayState::Idle);
    }
}
