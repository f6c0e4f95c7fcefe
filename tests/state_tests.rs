use std::thread;

use warships::core::{CellState, Coord, Grid, ShotResult};
use warships::state::{format_accuracy, GameState};

fn at(x: i32, y: i32) -> Coord {
    Coord::new(x, y).unwrap()
}

#[test]
fn sinking_a_single_cell_ship_counts_once() {
    let state = GameState::new();
    assert_eq!(state.opponent_tally().remaining(1), 4);

    assert_eq!(state.mark_opponent_board(at(4, 4), ShotResult::Sunk), 1);
    assert_eq!(state.opponent_tally().remaining(1), 3);

    assert_eq!(state.mark_opponent_board(at(4, 4), ShotResult::Sunk), 0);
    assert_eq!(state.opponent_tally().remaining(1), 3);
    assert_eq!(state.opponent_board().count(CellState::Miss), 8);
}

#[test]
fn sinking_after_hits_uses_whole_extent() {
    let state = GameState::new();
    assert_eq!(state.record_shot(at(2, 2), ShotResult::Hit), 0);
    assert_eq!(state.record_shot(at(2, 3), ShotResult::Hit), 0);
    assert_eq!(state.record_shot(at(2, 4), ShotResult::Sunk), 3);

    let board = state.opponent_board();
    for y in 2..=4 {
        assert_eq!(board.get(at(2, y)), CellState::Sunk);
    }
    assert_eq!(board.count(CellState::Miss), 12);
    assert_eq!(state.opponent_tally().remaining(3), 1);
    assert_eq!(state.total_shots(), 3);
    assert_eq!(state.total_hits(), 3);
}

#[test]
fn a_miss_only_counts_the_shot() {
    let state = GameState::new();
    assert_eq!(state.accuracy(), "0.00");
    state.increment_hit_count(ShotResult::Miss);
    assert_eq!(state.total_shots(), 1);
    assert_eq!(state.total_hits(), 0);
    assert_eq!(state.accuracy(), "0.00");
    state.increment_hit_count(ShotResult::Hit);
    assert_eq!(state.accuracy(), "50.00");
}

#[test]
fn accuracy_formatting() {
    assert_eq!(format_accuracy(0, 0), "0.00");
    assert_eq!(format_accuracy(1, 3), "33.33");
    assert_eq!(format_accuracy(4, 4), "100.00");
}

#[test]
fn enemy_shots_mark_our_board() {
    let state = GameState::new();
    state.update_player_board(Grid::from_coords([at(0, 0), at(0, 1)], CellState::Ship));
    state.mark_player_shots(&[at(0, 0), at(5, 5)]);
    state.mark_player_board(at(0, 0));

    let board = state.player_board();
    assert_eq!(board.get(at(0, 0)), CellState::Hit);
    assert_eq!(board.get(at(0, 1)), CellState::Ship);
    assert_eq!(board.get(at(5, 5)), CellState::Miss);
    assert_eq!(state.player_ship_coords(), vec![at(0, 1)]);
}

#[test]
fn resolved_cells_are_reported_as_already_hit() {
    let state = GameState::new();
    assert!(!state.check_if_already_hit(at(3, 3)));
    state.mark_opponent_board(at(3, 3), ShotResult::Miss);
    state.mark_opponent_board(at(6, 6), ShotResult::Hit);
    assert!(state.check_if_already_hit(at(3, 3)));
    assert!(state.check_if_already_hit(at(6, 6)));
    assert!(!state.check_if_already_hit(at(6, 7)));
}

#[test]
fn reads_are_copies() {
    let state = GameState::new();
    let before = state.snapshot();
    let mut board = state.update_player_board(Grid::from_coords([at(1, 1)], CellState::Ship));
    board.set(at(9, 9), CellState::Ship);

    assert_eq!(before.player_board, Grid::new());
    assert_eq!(state.player_board().count(CellState::Ship), 1);
    state.record_shot(at(0, 0), ShotResult::Miss);
    assert_eq!(before.total_shots, 0);
    assert_eq!(state.snapshot().total_shots, 1);
}

#[test]
fn clear_state_keeps_identity_and_last_status() {
    let state = GameState::new();
    state.set_player_info("me", "my fleet");
    state.update_nicknames("", "them");
    state.update_descriptions("my fleet", "their fleet");
    state.update_last_game_status("win");
    state.add_ship(at(1, 1));
    state.record_shot(at(5, 5), ShotResult::Sunk);

    state.clear_state();

    let snap = state.snapshot();
    assert_eq!(snap.player_board, Grid::new());
    assert_eq!(snap.opponent_board, Grid::new());
    assert_eq!(snap.total_shots, 0);
    assert_eq!(snap.total_hits, 0);
    assert_eq!(snap.tally.remaining(1), 4);
    assert_eq!(snap.player.nick, "me");
    assert_eq!(snap.opponent.nick, "them");
    assert_eq!(snap.opponent.description, "their fleet");
    assert_eq!(state.last_game_status(), "win");
}

#[test]
fn concurrent_shots_keep_counters_consistent() {
    let state = GameState::new();
    thread::scope(|s| {
        for t in 0..8 {
            let state = &state;
            s.spawn(move || {
                for i in 0..10 {
                    let c = Coord::new(i, t).unwrap();
                    let result = if i % 2 == 0 {
                        ShotResult::Hit
                    } else {
                        ShotResult::Miss
                    };
                    state.record_shot(c, result);
                    let snap = state.snapshot();
                    assert!(snap.total_hits <= snap.total_shots);
                }
            });
        }
    });
    assert_eq!(state.total_shots(), 80);
    assert_eq!(state.total_hits(), 40);
    assert_eq!(state.opponent_board().count(CellState::Hit), 40);
    assert_eq!(state.opponent_board().count(CellState::Miss), 40);
}
