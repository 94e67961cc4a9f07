//! Board controller: the single owner of table state.
//!
//! The host feeds it server messages, drives the animation clock with
//! [`BoardController::tick`], forwards clicks and button presses, and draws
//! whatever [`BoardController::scene`] returns. Every mutation of the zone
//! model goes through the controller or a job it queued.
//!
//! ## Example
//!
//! ```
//! use card_table::board::{BoardController, ClickTarget};
//! use card_table::core::TableConfig;
//! use card_table::protocol::ServerMessage;
//!
//! let mut board = BoardController::from_config(TableConfig::default().with_seed(7));
//! board
//!     .handle(ServerMessage::from_json(
//!         r#"{"action": "setup_room", "room": "den", "username": "p1", "game": "thirty_one"}"#,
//!     ).unwrap())
//!     .unwrap();
//! board
//!     .handle(ServerMessage::from_json(
//!         r#"{"action": "update_board", "player_order": ["p1", "p2"], "hand_sizes": [3, 3],
//!             "hand": ["AS", "KH", "2D"], "discard": "9C", "current_player": "p1",
//!             "mode": "main_phase", "in_progress": true}"#,
//!     ).unwrap())
//!     .unwrap();
//!
//! let request = board.click(ClickTarget::Deck).unwrap();
//! assert_eq!(request.to_json().unwrap(), r#"{"action":"draw","room":"den","username":"p1"}"#);
//! ```

use tracing::{debug, info, warn};

use super::controls::{derive_controls, Control, ControlInputs, Controls};
use super::scene::{Scene, SceneSource};
use crate::animation::layout::{GridLayout, LayoutProbe};
use crate::animation::timeline::{AnimationTimeline, Completion, JobRequest, SettlePlan};
use crate::cards::{Card, CardRegistry};
use crate::core::config::{GameKind, TableConfig};
use crate::core::entity::NodeId;
use crate::core::error::TableError;
use crate::core::player::Roster;
use crate::core::rng::SelectionRng;
use crate::core::state::RoomSessionState;
use crate::protocol::{MoveKind, MoveRequest, ServerMessage, Snapshot};
use crate::replay::{departed_hands, reconcile, replay, ReplayReport, ReplayState};
use crate::zones::{ZoneKey, ZoneManager};

/// Something the local player clicked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    Deck,
    Discard,
    HandCard(NodeId),
}

/// What handling one message did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    RoomReady,
    RoomClosed,
    RosterChanged,
    /// The action log was queued for animation.
    Replayed(ReplayReport),
    /// The board was rebuilt from the snapshot after cancelling in-flight jobs.
    Reconciled { cancelled: usize },
}

/// Owns the table and turns server traffic into board state.
pub struct BoardController<L: LayoutProbe = GridLayout> {
    config: TableConfig,
    session: RoomSessionState,
    roster: Roster,
    zones: ZoneManager,
    timeline: AnimationTimeline,
    rng: SelectionRng,
    registry: CardRegistry,
    layout: L,
    staged: Vec<Card>,
    now_ms: u64,
}

impl BoardController<GridLayout> {
    /// Controller with the built-in grid layout.
    #[must_use]
    pub fn from_config(config: TableConfig) -> Self {
        let layout = GridLayout::new(config.layout);
        Self::new(config, layout)
    }
}

impl<L: LayoutProbe> BoardController<L> {
    #[must_use]
    pub fn new(config: TableConfig, layout: L) -> Self {
        let rng = config
            .selection_seed
            .map_or_else(SelectionRng::from_entropy, SelectionRng::new);
        Self {
            session: RoomSessionState {
                log_capacity: config.log_capacity,
                ..RoomSessionState::default()
            },
            roster: Roster::new(),
            zones: ZoneManager::new(),
            timeline: AnimationTimeline::new(config.animation.duration_ms, config.animation.easing),
            rng,
            registry: CardRegistry::new(),
            layout,
            staged: Vec::new(),
            now_ms: 0,
            config,
        }
    }

    /// Apply one inbound message.
    ///
    /// Messages that need a room fail with [`TableError::NoRoom`] outside one.
    /// A board update that fails validation is dropped whole.
    pub fn handle(&mut self, message: ServerMessage) -> Result<UpdateOutcome, TableError> {
        match message {
            ServerMessage::SetupRoom {
                room,
                username,
                game,
            } => {
                info!(%room, %username, ?game, "room set up");
                self.reset_table();
                self.session = RoomSessionState::setup(&room, &username, game, self.config.log_capacity);
                Ok(UpdateOutcome::RoomReady)
            }
            ServerMessage::TeardownRoom => {
                self.require_room()?;
                info!(room = ?self.session.room, "room torn down");
                self.reset_table();
                self.session = self.session.teardown();
                Ok(UpdateOutcome::RoomClosed)
            }
            ServerMessage::AddPlayers { players } => {
                self.require_room()?;
                for name in &players {
                    if !self.roster.add(name) {
                        debug!(player = %name, "player already in room");
                    }
                }
                Ok(UpdateOutcome::RosterChanged)
            }
            ServerMessage::RemovePlayers { players } => {
                self.require_room()?;
                self.remove_players(&players)?;
                Ok(UpdateOutcome::RosterChanged)
            }
            ServerMessage::ConnStatus { players, connected } => {
                self.require_room()?;
                for name in self.roster.set_connected(&players, connected) {
                    warn!(player = %name, "connection status for unknown player");
                }
                Ok(UpdateOutcome::RosterChanged)
            }
            ServerMessage::UpdateBoard(snapshot) => self.update_board(&snapshot),
        }
    }

    fn require_room(&self) -> Result<(), TableError> {
        if self.session.in_room() {
            Ok(())
        } else {
            Err(TableError::NoRoom)
        }
    }

    fn reset_table(&mut self) {
        let cancelled = self.timeline.cancel_all();
        if cancelled > 0 {
            debug!(cancelled, "cancelled animations on room change");
        }
        self.roster.clear();
        self.zones = ZoneManager::new();
        self.staged.clear();
        self.layout.assign_seats(&[]);
    }

    fn remove_players(&mut self, players: &[String]) -> Result<(), TableError> {
        let mut unknown = None;
        for name in players {
            if self.roster.remove(name).is_some() {
                self.zones.drop_zone(&ZoneKey::hand(name.as_str()));
            } else {
                warn!(player = %name, "removing unknown player");
                unknown.get_or_insert_with(|| name.clone());
            }
        }
        self.layout.assign_seats(&self.roster.seats());
        match unknown {
            Some(name) => Err(TableError::UnknownPlayer { name }),
            None => Ok(()),
        }
    }

    fn update_board(&mut self, snapshot: &Snapshot) -> Result<UpdateOutcome, TableError> {
        self.require_room()?;
        if let Err(err) = snapshot.validate() {
            warn!(error = %err, "dropping board update");
            return Err(err);
        }

        self.session = self.session.apply_snapshot(snapshot);
        let username = self.session.username.clone();
        self.roster.apply_snapshot(snapshot, &username, self.session.game);
        self.layout.assign_seats(&self.roster.seats());

        let hand = snapshot.hand_cards();
        self.staged.retain(|card| hand.contains(&Some(*card)));

        if snapshot.action_log.is_empty() {
            let cancelled = self.timeline.cancel_all();
            reconcile(snapshot, &self.session, &self.roster, &mut self.zones);
            debug!(cancelled, mode = self.session.mode.as_str(), "board reconciled");
            Ok(UpdateOutcome::Reconciled { cancelled })
        } else {
            let mut report = replay(&self.session, snapshot, &mut self.timeline);
            // Queued behind the log so a departing player's last moves still play.
            for zone in departed_hands(snapshot.order(), &self.roster, &self.zones) {
                debug!(%zone, "queueing removal of departed hand");
                self.timeline
                    .enqueue(None, JobRequest::instant(SettlePlan::DropZone { zone }));
                report.jobs += 1;
            }
            debug!(
                jobs = report.jobs,
                replayed = report.replayed,
                skipped = report.skipped,
                "action log queued"
            );
            Ok(UpdateOutcome::Replayed(report))
        }
    }

    /// Advance the animation clock, settling every job that finishes by `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Completion> {
        self.now_ms = self.now_ms.max(now_ms);
        self.timeline
            .advance_to(self.now_ms, &mut self.zones, &self.layout, &mut self.rng)
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        !self.timeline.is_idle()
    }

    #[must_use]
    pub fn replay_state(&self) -> ReplayState {
        ReplayState::of(&self.timeline)
    }

    #[must_use]
    pub fn controls(&self) -> Controls {
        derive_controls(ControlInputs::from_session(&self.session))
    }

    fn request(&self, kind: MoveKind) -> Option<MoveRequest> {
        let room = self.session.room.as_deref()?;
        Some(MoveRequest::new(kind, room, self.session.username.as_str()))
    }

    /// Handle a click on the table. Returns the move to send, if any.
    pub fn click(&mut self, target: ClickTarget) -> Option<MoveRequest> {
        let controls = self.controls();
        match target {
            ClickTarget::Deck if controls.draw.enabled => self.request(MoveKind::Draw),
            ClickTarget::Discard if controls.pickup.enabled => self.request(MoveKind::Pickup),
            ClickTarget::HandCard(node) if controls.hand_cards.enabled => self.click_hand_card(node),
            _ => None,
        }
    }

    fn click_hand_card(&mut self, node: NodeId) -> Option<MoveRequest> {
        let own_hand = ZoneKey::hand(self.session.username.as_str());
        if self.zones.zone_of(node) != Some(&own_hand) {
            return None;
        }
        let card = self.zones.slot(node)?.card()?;

        match self.session.game {
            GameKind::ThirtyOne => self.request(MoveKind::Discard).map(|r| r.with_card(card)),
            GameKind::Cribbage => {
                if let Some(pos) = self.staged.iter().position(|&c| c == card) {
                    self.staged.remove(pos);
                } else if self.staged.len() < self.session.num_to_discard as usize {
                    self.staged.push(card);
                } else {
                    debug!(%card, limit = self.session.num_to_discard, "staging limit reached");
                }
                None
            }
        }
    }

    /// Handle a button press. Returns the move to send, if any.
    pub fn press(&mut self, control: Control) -> Option<MoveRequest> {
        if !self.controls().get(control).enabled {
            return None;
        }
        match control {
            Control::Draw => self.request(MoveKind::Draw),
            Control::Pickup => self.request(MoveKind::Pickup),
            Control::Knock => self.request(MoveKind::Knock),
            Control::Continue => self.request(MoveKind::Continue),
            Control::Start => self.request(MoveKind::Start),
            Control::DiscardConfirm => {
                let needed = self.session.num_to_discard as usize;
                if self.staged.len() != needed {
                    debug!(staged = self.staged.len(), needed, "discard not confirmed");
                    return None;
                }
                let request = self.request(MoveKind::Discard)?;
                Some(request.with_cards(std::mem::take(&mut self.staged)))
            }
        }
    }

    /// Project the table at `now_ms`.
    #[must_use]
    pub fn scene(&self, now_ms: u64) -> Scene {
        SceneSource {
            session: &self.session,
            roster: &self.roster,
            zones: &self.zones,
            timeline: &self.timeline,
            layout: &self.layout,
            registry: &self.registry,
            controls: self.controls(),
            staged: &self.staged,
        }
        .project(now_ms)
    }

    #[must_use]
    pub fn session(&self) -> &RoomSessionState {
        &self.session
    }

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub fn zones(&self) -> &ZoneManager {
        &self.zones
    }

    #[must_use]
    pub fn timeline(&self) -> &AnimationTimeline {
        &self.timeline
    }

    #[must_use]
    pub fn registry(&self) -> &CardRegistry {
        &self.registry
    }

    #[must_use]
    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Cards staged for a cribbage discard, in click order.
    #[must_use]
    pub fn staged(&self) -> &[Card] {
        &self.staged
    }

    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    #[must_use]
    pub fn config(&self) -> &TableConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Mode;
    use crate::protocol::CardToken;
    use crate::zones::Slot;

    fn card(code: &str) -> Card {
        code.parse().unwrap()
    }

    fn board(game: GameKind) -> BoardController {
        let mut board = BoardController::from_config(TableConfig::default().with_seed(1));
        board
            .handle(ServerMessage::SetupRoom {
                room: "den".into(),
                username: "p1".into(),
                game,
            })
            .unwrap();
        board
    }

    fn snapshot(mode: Mode, hand: &[&str]) -> Snapshot {
        Snapshot {
            player_order: Some(vec!["p1".into(), "p2".into()]),
            hand_sizes: vec![hand.len(), 3],
            hand: hand.iter().map(|c| CardToken::Known(card(c))).collect(),
            current_player: Some("p1".into()),
            in_progress: true,
            num_to_discard: 2,
            mode,
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_messages_need_a_room() {
        let mut board = BoardController::from_config(TableConfig::default().with_seed(1));
        let err = board
            .handle(ServerMessage::UpdateBoard(Snapshot::default()))
            .unwrap_err();
        assert!(matches!(err, TableError::NoRoom));
        assert!(matches!(
            board.handle(ServerMessage::TeardownRoom),
            Err(TableError::NoRoom)
        ));
    }

    #[test]
    fn test_invalid_update_keeps_state() {
        let mut board = board(GameKind::ThirtyOne);
        board
            .handle(ServerMessage::UpdateBoard(snapshot(Mode::Play, &["AS"])))
            .unwrap();
        let before = board.zones().slots(&ZoneKey::hand("p1"));

        let err = board
            .handle(ServerMessage::UpdateBoard(Snapshot {
                mode: Mode::EndGame,
                ..Snapshot::default()
            }))
            .unwrap_err();
        assert!(matches!(err, TableError::MissingField { .. }));
        assert_eq!(board.zones().slots(&ZoneKey::hand("p1")), before);
        assert_eq!(board.session().mode, Mode::Play);
    }

    #[test]
    fn test_remove_unknown_player() {
        let mut board = board(GameKind::ThirtyOne);
        board
            .handle(ServerMessage::AddPlayers {
                players: vec!["p2".into()],
            })
            .unwrap();
        let err = board
            .handle(ServerMessage::RemovePlayers {
                players: vec!["p2".into(), "ghost".into()],
            })
            .unwrap_err();
        assert!(matches!(err, TableError::UnknownPlayer { ref name } if name == "ghost"));
        assert!(!board.roster().contains("p2"));
    }

    #[test]
    fn test_cribbage_staging() {
        let mut board = board(GameKind::Cribbage);
        board
            .handle(ServerMessage::UpdateBoard(snapshot(Mode::Discard, &["AS", "KH", "2D"])))
            .unwrap();
        let nodes = board.zones().nodes(&ZoneKey::hand("p1")).to_vec();

        for &node in &nodes {
            assert!(board.click(ClickTarget::HandCard(node)).is_none());
        }
        assert_eq!(board.staged(), &[card("AS"), card("KH")]);
        assert!(board.press(Control::DiscardConfirm).is_some_and(|r| r.cards
            == Some(vec![card("AS"), card("KH")])));
        assert!(board.staged().is_empty());

        board.click(ClickTarget::HandCard(nodes[0]));
        board.click(ClickTarget::HandCard(nodes[0]));
        assert!(board.staged().is_empty());
        assert!(board.press(Control::DiscardConfirm).is_none());
    }

    #[test]
    fn test_thirty_one_hand_click_discards() {
        let mut board = board(GameKind::ThirtyOne);
        board
            .handle(ServerMessage::UpdateBoard(snapshot(Mode::Discard, &["AS", "KH", "2D", "3C"])))
            .unwrap();
        let node = board.zones().nodes(&ZoneKey::hand("p1"))[1];
        let request = board.click(ClickTarget::HandCard(node)).unwrap();
        assert_eq!(request.action, MoveKind::Discard);
        assert_eq!(request.card, Some(card("KH")));

        assert!(board.click(ClickTarget::Deck).is_none());
        let opponent = board.zones().nodes(&ZoneKey::hand("p2"))[0];
        assert!(board.click(ClickTarget::HandCard(opponent)).is_none());
    }

    #[test]
    fn test_reconcile_cancels_animation() {
        let mut board = board(GameKind::ThirtyOne);
        board
            .handle(ServerMessage::UpdateBoard(snapshot(Mode::Play, &["AS"])))
            .unwrap();
        let mut with_log = snapshot(Mode::MainPhase, &["AS", "KH"]);
        with_log.action_log = vec![crate::protocol::ServerAction::new(
            crate::protocol::ActionKind::Draw,
            "p1",
        )
        .with_cards([CardToken::Known(card("KH"))])];
        let outcome = board.handle(ServerMessage::UpdateBoard(with_log)).unwrap();
        assert!(matches!(outcome, UpdateOutcome::Replayed(_)));
        board.tick(10);
        assert!(board.is_animating());

        let outcome = board
            .handle(ServerMessage::UpdateBoard(snapshot(Mode::Play, &["AS", "KH"])))
            .unwrap();
        assert!(matches!(outcome, UpdateOutcome::Reconciled { cancelled } if cancelled > 0));
        assert!(!board.is_animating());
        assert_eq!(
            board.zones().slots(&ZoneKey::hand("p1")),
            vec![Slot::up(card("AS")), Slot::up(card("KH"))]
        );
    }
}
