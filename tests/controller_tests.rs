//! Room lifecycle, controls and input handling.

mod common;

use card_table::board::{ClickTarget, Control, UpdateOutcome};
use card_table::core::{GameKind, Mode, TableError};
use card_table::protocol::{ActionKind, CardToken, MoveKind, ServerMessage, Snapshot};
use card_table::zones::ZoneKey;

use common::{action, card, setup, settle, two_player, update};

#[test]
fn test_room_lifecycle() {
    let mut board = setup(GameKind::ThirtyOne, 1);
    assert!(board.session().in_room());

    let outcome = board
        .handle(ServerMessage::AddPlayers {
            players: vec!["p1".into(), "p2".into()],
        })
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::RosterChanged);
    assert_eq!(board.roster().len(), 2);

    board
        .handle(ServerMessage::ConnStatus {
            players: vec!["p2".into(), "ghost".into()],
            connected: false,
        })
        .unwrap();
    assert!(!board.roster().get("p2").unwrap().connected);

    update(&mut board, two_player(Mode::Play, &["AS"], 1));
    assert_eq!(board.zones().count(&ZoneKey::hand("p2")), 1);

    board
        .handle(ServerMessage::RemovePlayers {
            players: vec!["p2".into()],
        })
        .unwrap();
    assert_eq!(board.zones().count(&ZoneKey::hand("p2")), 0);
    assert!(!board.roster().contains("p2"));

    let outcome = board.handle(ServerMessage::TeardownRoom).unwrap();
    assert_eq!(outcome, UpdateOutcome::RoomClosed);
    assert!(!board.session().in_room());
    assert_eq!(board.session().username, "p1");
    assert!(board.roster().is_empty());
    assert_eq!(board.zones().total_nodes(), 0);

    let err = board
        .handle(ServerMessage::AddPlayers {
            players: vec!["p3".into()],
        })
        .unwrap_err();
    assert!(matches!(err, TableError::NoRoom));
}

#[test]
fn test_setup_resets_previous_room() {
    let mut board = setup(GameKind::ThirtyOne, 1);
    update(&mut board, two_player(Mode::Play, &["AS", "KH"], 2));
    update(
        &mut board,
        Snapshot {
            action_log: vec![action(ActionKind::Draw, "p2", &[])],
            ..two_player(Mode::Play, &["AS", "KH"], 3)
        },
    );
    assert!(board.is_animating());

    board
        .handle(ServerMessage::from_json(
            r#"{"action": "setup_room", "room": "attic", "username": "p1", "game": "cribbage"}"#,
        ).unwrap())
        .unwrap();
    assert!(!board.is_animating());
    assert_eq!(board.session().room.as_deref(), Some("attic"));
    assert_eq!(board.session().game, GameKind::Cribbage);
    assert_eq!(board.zones().total_nodes(), 0);
}

#[test]
fn test_main_phase_turn_controls() {
    let mut board = setup(GameKind::ThirtyOne, 1);
    update(
        &mut board,
        Snapshot {
            discard: Some(CardToken::Known(card("9C"))),
            ..two_player(Mode::MainPhase, &["AS", "KH", "2D"], 3)
        },
    );

    let controls = board.controls();
    assert!(controls.draw.enabled && controls.pickup.enabled && controls.knock.enabled);
    assert!(!controls.start.visible);

    let draw = board.click(ClickTarget::Deck).unwrap();
    assert_eq!(draw.action, MoveKind::Draw);
    assert_eq!(draw.room, "den");
    assert_eq!(board.click(ClickTarget::Discard).unwrap().action, MoveKind::Pickup);
    assert_eq!(board.press(Control::Knock).unwrap().action, MoveKind::Knock);
    assert!(board.press(Control::Continue).is_none());

    let scene = board.scene(0);
    let deck = scene.zone(&ZoneKey::deck()).unwrap();
    assert!(deck.cards.iter().all(|c| c.clickable));
    let hand = scene.zone(&ZoneKey::hand("p1")).unwrap();
    assert!(hand.cards.iter().all(|c| !c.clickable));
}

#[test]
fn test_knock_disabled_after_knock() {
    let mut board = setup(GameKind::ThirtyOne, 1);
    update(
        &mut board,
        Snapshot {
            knocked: Some("p2".into()),
            ..two_player(Mode::MainPhase, &["AS", "KH", "2D"], 3)
        },
    );
    assert!(board.press(Control::Knock).is_none());
    assert!(board.controls().knock.visible);
    assert!(board.press(Control::Draw).is_some());
}

#[test]
fn test_waiting_for_opponent() {
    let mut board = setup(GameKind::ThirtyOne, 1);
    update(
        &mut board,
        Snapshot {
            current_player: Some("p2".into()),
            ..two_player(Mode::MainPhase, &["AS", "KH", "2D"], 3)
        },
    );
    assert!(board.click(ClickTarget::Deck).is_none());
    assert!(board.click(ClickTarget::Discard).is_none());
    let node = board.zones().nodes(&ZoneKey::hand("p1"))[0];
    assert!(board.click(ClickTarget::HandCard(node)).is_none());
}

#[test]
fn test_end_round_and_restart() {
    let mut board = setup(GameKind::ThirtyOne, 1);
    update(&mut board, two_player(Mode::EndRound, &["AS", "KH", "2D"], 3));
    let request = board.press(Control::Continue).unwrap();
    assert_eq!(request.to_json().unwrap(), r#"{"action":"continue","room":"den","username":"p1"}"#);

    update(
        &mut board,
        Snapshot {
            in_progress: false,
            ..two_player(Mode::EndGame, &[], 0)
        },
    );
    assert!(board.press(Control::Continue).is_none());
    assert_eq!(board.press(Control::Start).unwrap().action, MoveKind::Start);
}

#[test]
fn test_cribbage_discard_flow() {
    let mut board = setup(GameKind::Cribbage, 1);
    update(
        &mut board,
        Snapshot {
            num_to_discard: 2,
            current_player: None,
            ..two_player(Mode::Discard, &["AS", "KH", "2D", "3C", "4C", "5C"], 6)
        },
    );
    assert!(!board.controls().draw.visible);
    assert!(board.controls().discard_confirm.enabled);

    let nodes = board.zones().nodes(&ZoneKey::hand("p1")).to_vec();
    board.click(ClickTarget::HandCard(nodes[4]));
    assert!(board.press(Control::DiscardConfirm).is_none());
    board.click(ClickTarget::HandCard(nodes[1]));
    board.click(ClickTarget::HandCard(nodes[2]));
    assert_eq!(board.staged(), &[card("4C"), card("KH")]);

    let scene = board.scene(0);
    let hand = scene.zone(&ZoneKey::hand("p1")).unwrap();
    let staged: Vec<bool> = hand.cards.iter().map(|c| c.staged).collect();
    assert_eq!(staged, vec![false, true, false, false, true, false]);

    // A refresh that still holds both staged cards keeps them staged.
    update(
        &mut board,
        Snapshot {
            num_to_discard: 2,
            current_player: None,
            ..two_player(Mode::Discard, &["AS", "KH", "2D", "3C", "4C", "5C"], 6)
        },
    );
    assert_eq!(board.staged().len(), 2);

    let request = board.press(Control::DiscardConfirm).unwrap();
    assert_eq!(request.action, MoveKind::Discard);
    assert_eq!(request.cards, Some(vec![card("4C"), card("KH")]));
    let json: serde_json::Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
    assert_eq!(json["cards"], serde_json::json!(["4C", "KH"]));
    assert!(board.staged().is_empty());
}

#[test]
fn test_staging_pruned_when_cards_leave_hand() {
    let mut board = setup(GameKind::Cribbage, 1);
    update(
        &mut board,
        Snapshot {
            num_to_discard: 1,
            ..two_player(Mode::Discard, &["AS", "KH", "2D", "3C", "4C"], 5)
        },
    );
    let node = board.zones().nodes(&ZoneKey::hand("p1"))[0];
    board.click(ClickTarget::HandCard(node));
    assert_eq!(board.staged(), &[card("AS")]);

    update(
        &mut board,
        Snapshot {
            num_to_discard: 0,
            ..two_player(Mode::Play, &["KH", "2D", "3C", "4C"], 4)
        },
    );
    assert!(board.staged().is_empty());
}

#[test]
fn test_scene_during_replay() {
    let mut board = setup(GameKind::ThirtyOne, 9);
    update(
        &mut board,
        Snapshot {
            discard: Some(CardToken::Known(card("9C"))),
            current_player: Some("p2".into()),
            ..two_player(Mode::MainPhase, &["AS", "KH", "2D"], 3)
        },
    );
    update(
        &mut board,
        Snapshot {
            action_log: vec![action(ActionKind::Draw, "p2", &[])],
            discard: Some(CardToken::Known(card("9C"))),
            current_player: Some("p2".into()),
            ..two_player(Mode::MainPhase, &["AS", "KH", "2D"], 4)
        },
    );
    board.tick(200);

    let scene = board.scene(200);
    assert_eq!(scene.sprites.len(), 1);
    assert!(scene.sprites[0].transform.starts_with("translate("));
    let hand = scene.zone(&ZoneKey::hand("p2")).unwrap();
    assert_eq!(hand.cards.len(), 4);
    assert!(hand.cards[3].hidden);
    assert_eq!(board.zones().count(&ZoneKey::hand("p2")), 3);

    settle(&mut board);
    let scene = board.scene(board.now_ms());
    assert!(scene.sprites.is_empty());
    assert!(scene.zone(&ZoneKey::hand("p2")).unwrap().cards.iter().all(|c| !c.hidden));
    assert!(scene.summary().contains("hand:p2"));
}
