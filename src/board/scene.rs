//! Scene: a pure projection of the table for a renderer.
//!
//! The scene is rebuilt from the zone model, roster, session and in-flight
//! jobs every frame. A running move shows its card in two places: the clone
//! sprite travelling over the table, and the real node already sitting at
//! its destination but hidden until the move settles.

use serde::Serialize;

use super::controls::Controls;
use crate::animation::geometry::Rect;
use crate::animation::layout::LayoutProbe;
use crate::animation::timeline::{AnimationJob, AnimationTimeline, JobId};
use crate::cards::{Card, CardRegistry};
use crate::core::config::GameKind;
use crate::core::entity::NodeId;
use crate::core::player::{Player, Tally};
use crate::core::state::{Mode, RoomSessionState};
use crate::core::Roster;
use crate::zones::{FaceState, Slot, SlotCard, ZoneKey, ZoneKind, ZoneManager};

/// One card-sized slot as drawn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CardView {
    /// `None` for the slot reserved by a draw still in flight.
    pub node: Option<NodeId>,
    pub slot: Slot,
    /// `card-AS` style id for known cards.
    pub element_id: Option<String>,
    /// Front text for face-up known cards, empty otherwise.
    pub text: String,
    /// Present but invisible while its move is in flight.
    pub hidden: bool,
    pub staged: bool,
    pub clickable: bool,
    pub rect: Option<Rect>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ZoneView {
    pub key: ZoneKey,
    pub rect: Option<Rect>,
    pub cards: Vec<CardView>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerView {
    pub name: String,
    pub cell: Option<u8>,
    /// Lives stars / "on the bike" / "Knocked out", or the score.
    pub tally_text: String,
    pub hand_size: usize,
    pub hand_score: Option<i32>,
    pub connected: bool,
    pub current: bool,
    pub dealer: bool,
    pub knocked: bool,
    pub knocked_out: bool,
}

impl PlayerView {
    fn new(player: &Player) -> Self {
        let tally_text = match (player.tally, player.lives_display()) {
            (_, Some(display)) => display.text(),
            (Tally::Score(score), None) => score.to_string(),
            (Tally::Lives(lives), None) => lives.to_string(),
        };
        Self {
            name: player.name.clone(),
            cell: player.grid_cell,
            tally_text,
            hand_size: player.hand_size,
            hand_score: player.hand_score,
            connected: player.connected,
            current: player.is_current,
            dealer: player.is_dealer,
            knocked: player.has_knocked,
            knocked_out: player.knocked_out,
        }
    }
}

/// A clone sprite at one instant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpriteView {
    pub job: JobId,
    pub card: SlotCard,
    /// Face text when the front is towards the viewer, empty otherwise.
    pub text: String,
    pub origin: Rect,
    pub transform: String,
    pub face: FaceState,
}

/// Full projection of the table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scene {
    pub room: Option<String>,
    pub game: GameKind,
    pub title: String,
    pub mode: Mode,
    pub zones: Vec<ZoneView>,
    pub players: Vec<PlayerView>,
    pub sprites: Vec<SpriteView>,
    pub controls: Controls,
    pub crib_count: u32,
    pub staged: Vec<Card>,
    pub log: Vec<String>,
}

/// Everything a scene is projected from.
pub struct SceneSource<'a> {
    pub session: &'a RoomSessionState,
    pub roster: &'a Roster,
    pub zones: &'a ZoneManager,
    pub timeline: &'a AnimationTimeline,
    pub layout: &'a dyn LayoutProbe,
    pub registry: &'a CardRegistry,
    pub controls: Controls,
    pub staged: &'a [Card],
}

impl SceneSource<'_> {
    fn card_view(&self, zone: &ZoneKey, node: Option<NodeId>, slot: Slot) -> CardView {
        let face = match slot.card() {
            Some(card) => self.registry.face(card),
            None => None,
        };
        let text = match (slot.face(), face) {
            (Some(FaceState::Up), Some(face)) => face.front_text.clone(),
            _ => String::new(),
        };
        let local_hand = zone.kind == ZoneKind::Hand
            && zone.owner().is_some_and(|owner| self.session.is_local(owner));
        CardView {
            node,
            slot,
            element_id: face.map(|f| f.element_id.clone()),
            text,
            hidden: false,
            staged: slot.card().is_some_and(|card| local_hand && self.staged.contains(&card)),
            clickable: match zone.kind {
                ZoneKind::Deck => self.controls.draw.enabled,
                ZoneKind::Discard => self.controls.pickup.enabled,
                ZoneKind::Crib => false,
                ZoneKind::Hand => local_hand && self.controls.hand_cards.enabled,
            },
            rect: None,
        }
    }

    fn sprite_view(&self, job: &AnimationJob, now_ms: u64) -> Option<SpriteView> {
        let motion = job.motion.as_ref()?;
        let sprite = job.sprite.as_ref()?;
        let elapsed = job.elapsed(now_ms)?;
        let frame = sprite.frame_at(elapsed);

        let card = match motion.shown {
            SlotCard::Known(card) => SlotCard::Known(card),
            SlotCard::Unknown => job
                .source_node
                .and_then(|node| self.zones.slot(node))
                .and_then(Slot::card)
                .map_or(SlotCard::Unknown, SlotCard::Known),
        };
        let face = if frame.rotate_y_deg < 90.0 {
            FaceState::Up
        } else {
            FaceState::Down
        };
        let text = match (face, card) {
            (FaceState::Up, SlotCard::Known(card)) => self
                .registry
                .face(card)
                .map(|f| f.front_text.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };

        Some(SpriteView {
            job: job.id,
            card,
            text,
            origin: sprite.origin,
            transform: frame.css(),
            face,
        })
    }

    /// Project at `now_ms`.
    #[must_use]
    pub fn project(&self, now_ms: u64) -> Scene {
        let mut views: Vec<ZoneView> = self
            .zones
            .zones()
            .into_iter()
            .map(|key| ZoneView {
                key: key.clone(),
                rect: self.layout.zone_rect(key),
                cards: self
                    .zones
                    .nodes(key)
                    .iter()
                    .filter_map(|&node| {
                        let slot = *self.zones.slot(node)?;
                        Some(self.card_view(key, Some(node), slot))
                    })
                    .collect(),
            })
            .collect();

        let mut sprites = Vec::new();
        for job in self.timeline.running() {
            let Some(motion) = &job.motion else {
                continue;
            };
            if let Some(sprite) = self.sprite_view(job, now_ms) {
                sprites.push(sprite);
            }

            let moved = job.source_node.and_then(|node| {
                let zone = views.iter_mut().find(|z| z.key == motion.from)?;
                let idx = zone.cards.iter().position(|c| c.node == Some(node))?;
                if motion.from == motion.to {
                    zone.cards[idx].hidden = true;
                    return None;
                }
                Some(zone.cards.remove(idx))
            });
            if motion.from == motion.to && job.source_node.is_some() {
                continue;
            }

            let mut arriving = moved.unwrap_or_else(|| {
                self.card_view(&motion.to, None, Slot::Occupied {
                    card: motion.shown,
                    face: motion.end_face,
                })
            });
            arriving.hidden = true;
            arriving.clickable = false;

            match views.iter_mut().find(|z| z.key == motion.to) {
                Some(zone) => zone.cards.push(arriving),
                None => views.push(ZoneView {
                    key: motion.to.clone(),
                    rect: self.layout.zone_rect(&motion.to),
                    cards: vec![arriving],
                }),
            }
        }

        for view in &mut views {
            let len = view.cards.len();
            for (i, card) in view.cards.iter_mut().enumerate() {
                card.rect = self.layout.slot_rect(&view.key, i, len);
            }
        }
        views.sort_by(|a, b| a.key.cmp(&b.key));

        Scene {
            room: self.session.room.clone(),
            game: self.session.game,
            title: self.session.game.display_name().to_string(),
            mode: self.session.mode,
            zones: views,
            players: self.roster.iter().map(PlayerView::new).collect(),
            sprites,
            controls: self.controls,
            crib_count: self.zones.crib_count(),
            staged: self.staged.to_vec(),
            log: self.session.log.iter().cloned().collect(),
        }
    }
}

impl Scene {
    #[must_use]
    pub fn zone(&self, key: &ZoneKey) -> Option<&ZoneView> {
        self.zones.iter().find(|z| &z.key == key)
    }

    /// Plain-text dump, one zone per line.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{} [{}] mode={}",
            self.title,
            self.room.as_deref().unwrap_or("-"),
            self.mode.as_str()
        )];
        for zone in &self.zones {
            let cards: Vec<String> = zone
                .cards
                .iter()
                .map(|card| match card.slot {
                    _ if card.hidden => "..".to_string(),
                    Slot::Empty => "  ".to_string(),
                    Slot::Placeholder => "[]".to_string(),
                    Slot::Occupied {
                        face: FaceState::Down,
                        ..
                    } => "##".to_string(),
                    Slot::Occupied { .. } => card.text.clone(),
                })
                .collect();
            let suffix = if zone.key.kind == ZoneKind::Crib {
                format!(" ({})", self.crib_count)
            } else {
                String::new()
            };
            lines.push(format!("{:<16} {}{}", zone.key.to_string(), cards.join(" "), suffix));
        }
        for player in &self.players {
            let marker = if player.current { "*" } else { " " };
            lines.push(format!(
                "{marker} {:<14} cell={} cards={} {}",
                player.name,
                player.cell.map_or_else(|| "-".to_string(), |c| c.to_string()),
                player.hand_size,
                player.tally_text
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::easing::CubicBezier;
    use crate::animation::layout::GridLayout;
    use crate::animation::timeline::{JobRequest, Motion, SettlePlan, SourceSelector};
    use crate::board::controls::Controls;
    use crate::core::config::LayoutConfig;
    use crate::core::rng::SelectionRng;

    fn card(code: &str) -> Card {
        code.parse().unwrap()
    }

    struct Fixture {
        session: RoomSessionState,
        roster: Roster,
        zones: ZoneManager,
        timeline: AnimationTimeline,
        layout: GridLayout,
        registry: CardRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            let mut session = RoomSessionState::setup("den", "p1", GameKind::ThirtyOne, 10);
            session.mode = Mode::MainPhase;
            let mut roster = Roster::new();
            roster.add("p1");
            roster.add("p2");
            roster.assign_seats(&["p1".to_string(), "p2".to_string()], "p1");
            let mut layout = GridLayout::new(LayoutConfig::default());
            crate::animation::LayoutProbe::assign_seats(&mut layout, &roster.seats());

            let mut zones = ZoneManager::new();
            zones.replace_all(&ZoneKey::deck(), [Slot::Placeholder]);
            zones.replace_all(&ZoneKey::discard(), [Slot::up(card("9C"))]);
            zones.replace_all(&ZoneKey::hand("p1"), [Slot::up(card("AS")), Slot::up(card("KH"))]);
            zones.replace_all(&ZoneKey::hand("p2"), [Slot::hidden(), Slot::hidden()]);

            Self {
                session,
                roster,
                zones,
                timeline: AnimationTimeline::new(1000, CubicBezier::LINEAR),
                layout,
                registry: CardRegistry::new(),
            }
        }

        fn scene(&self, now_ms: u64, staged: &[Card]) -> Scene {
            SceneSource {
                session: &self.session,
                roster: &self.roster,
                zones: &self.zones,
                timeline: &self.timeline,
                layout: &self.layout,
                registry: &self.registry,
                controls: Controls::default(),
                staged,
            }
            .project(now_ms)
        }
    }

    #[test]
    fn test_static_projection() {
        let fixture = Fixture::new();
        let scene = fixture.scene(0, &[card("KH")]);

        let hand = scene.zone(&ZoneKey::hand("p1")).unwrap();
        assert_eq!(hand.cards.len(), 2);
        assert_eq!(hand.cards[0].text, "A\u{2660}");
        assert_eq!(hand.cards[0].element_id.as_deref(), Some("card-AS"));
        assert!(hand.cards[1].staged);
        assert!(hand.cards.iter().all(|c| c.rect.is_some()));

        let opp = scene.zone(&ZoneKey::hand("p2")).unwrap();
        assert!(opp.cards.iter().all(|c| c.text.is_empty() && c.element_id.is_none()));
        assert_eq!(scene.players.len(), 2);
        assert!(scene.sprites.is_empty());
    }

    #[test]
    fn test_in_flight_draw_reserves_hidden_slot() {
        let mut fixture = Fixture::new();
        fixture.timeline.enqueue(
            Some(0),
            JobRequest::moving(
                Motion {
                    from: ZoneKey::deck(),
                    source: SourceSelector::Anchor,
                    to: ZoneKey::hand("p2"),
                    start_face: FaceState::Down,
                    end_face: FaceState::Down,
                    shown: SlotCard::Unknown,
                },
                SettlePlan::DrawToHand {
                    hand: ZoneKey::hand("p2"),
                    slot: Slot::hidden(),
                },
            ),
        );
        let mut rng = SelectionRng::new(0);
        fixture
            .timeline
            .advance_to(0, &mut fixture.zones, &fixture.layout, &mut rng);

        let scene = fixture.scene(500, &[]);
        let opp = scene.zone(&ZoneKey::hand("p2")).unwrap();
        assert_eq!(opp.cards.len(), 3);
        assert!(opp.cards[2].hidden);
        assert_eq!(opp.cards[2].node, None);
        assert_eq!(scene.sprites.len(), 1);
        assert_eq!(scene.sprites[0].face, FaceState::Down);
    }

    #[test]
    fn test_in_flight_discard_moves_node() {
        let mut fixture = Fixture::new();
        fixture.timeline.enqueue(
            Some(0),
            JobRequest::moving(
                Motion {
                    from: ZoneKey::hand("p1"),
                    source: SourceSelector::Matching(card("AS")),
                    to: ZoneKey::discard(),
                    start_face: FaceState::Up,
                    end_face: FaceState::Up,
                    shown: SlotCard::Known(card("AS")),
                },
                SettlePlan::DiscardFromHand {
                    revealed: Slot::up(card("AS")),
                },
            ),
        );
        let mut rng = SelectionRng::new(0);
        fixture
            .timeline
            .advance_to(0, &mut fixture.zones, &fixture.layout, &mut rng);

        let scene = fixture.scene(250, &[]);
        let hand = scene.zone(&ZoneKey::hand("p1")).unwrap();
        assert_eq!(hand.cards.len(), 1);
        let discard = scene.zone(&ZoneKey::discard()).unwrap();
        assert_eq!(discard.cards.len(), 2);
        assert!(discard.cards[1].hidden);
        assert_eq!(scene.sprites[0].text, "A\u{2660}");
    }

    #[test]
    fn test_summary_lists_zones() {
        let fixture = Fixture::new();
        let summary = fixture.scene(0, &[]).summary();
        assert!(summary.starts_with("31 [den] mode=main_phase"));
        assert!(summary.contains("hand:p2"));
        assert!(summary.contains("## ##"));
        assert!(summary.contains("9\u{2663}"));
    }
}
