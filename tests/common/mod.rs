//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use card_table::board::{BoardController, UpdateOutcome};
use card_table::cards::Card;
use card_table::core::{GameKind, Mode, TableConfig};
use card_table::protocol::{ActionKind, CardToken, ServerAction, ServerMessage, Snapshot};
use card_table::animation::Completion;

pub fn card(code: &str) -> Card {
    code.parse().unwrap()
}

pub fn tokens(codes: &[&str]) -> Vec<CardToken> {
    codes.iter().map(|code| CardToken::parse_lenient(code)).collect()
}

pub fn names(list: &[&str]) -> Option<Vec<String>> {
    Some(list.iter().map(|s| (*s).to_string()).collect())
}

pub fn action(kind: ActionKind, player: &str, codes: &[&str]) -> ServerAction {
    ServerAction::new(kind, player).with_cards(tokens(codes))
}

/// A board in room "den" as "p1".
pub fn setup(game: GameKind, seed: u64) -> BoardController {
    let config = TableConfig::default().with_seed(seed).with_duration_ms(400);
    let mut board = BoardController::from_config(config);
    board
        .handle(ServerMessage::SetupRoom {
            room: "den".into(),
            username: "p1".into(),
            game,
        })
        .unwrap();
    board
}

/// A two-player snapshot with p1 to move.
pub fn two_player(mode: Mode, hand: &[&str], opponent_size: usize) -> Snapshot {
    Snapshot {
        player_order: names(&["p1", "p2"]),
        current_player: Some("p1".into()),
        hand_sizes: vec![hand.len(), opponent_size],
        hand: tokens(hand),
        in_progress: true,
        mode,
        ..Snapshot::default()
    }
}

pub fn update(board: &mut BoardController, snapshot: Snapshot) -> UpdateOutcome {
    board.handle(ServerMessage::UpdateBoard(snapshot)).unwrap()
}

/// Tick in small steps until every job has settled.
pub fn settle(board: &mut BoardController) -> Vec<Completion> {
    let mut done = Vec::new();
    let mut now = board.now_ms();
    while board.is_animating() {
        now += 100;
        done.extend(board.tick(now));
    }
    done
}
