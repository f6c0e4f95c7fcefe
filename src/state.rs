//! Shared game state.
//!
//! `GameState` is the only mutable value shared between round tasks. Every
//! operation takes the one lock for its whole duration, so a logical update
//! (for example a shot result touching counters, grid and tally together)
//! is never observed half applied. Reads hand out copies.

use std::sync::{Mutex, MutexGuard};

use crate::core::{
    config::{fleet_count, FLEET, MAX_SHIP_LENGTH},
    sink_ship, CellState, Coord, Grid, ShotResult,
};

/// Nickname and free-text description of one side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerInfo {
    pub nick: String,
    pub description: String,
}

/// Remaining unsunk opponent ships, keyed by length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetTally {
    remaining: [usize; MAX_SHIP_LENGTH + 1],
}

impl FleetTally {
    /// Tally for a full, untouched fleet.
    pub fn new() -> Self {
        let mut remaining = [0; MAX_SHIP_LENGTH + 1];
        for class in FLEET.iter() {
            remaining[class.length()] = class.count();
        }
        Self { remaining }
    }

    /// Ships of `length` still afloat; 0 for lengths outside the fleet.
    pub fn remaining(&self, length: usize) -> usize {
        self.remaining.get(length).copied().unwrap_or(0)
    }

    /// Record one sunk ship of `length`. Returns `false` when the length is
    /// not part of the fleet or none of that class remain.
    pub fn record_sunk(&mut self, length: usize) -> bool {
        if fleet_count(length).is_none() {
            return false;
        }
        match self.remaining.get_mut(length) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    /// `(length, remaining)` pairs in ascending length order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (1..=MAX_SHIP_LENGTH).map(move |len| (len, self.remaining[len]))
    }

    pub fn all_sunk(&self) -> bool {
        self.remaining.iter().all(|&n| n == 0)
    }
}

impl Default for FleetTally {
    fn default() -> Self {
        Self::new()
    }
}

/// Hit percentage with two decimals; `"0.00"` before the first shot.
pub fn format_accuracy(hits: u32, shots: u32) -> String {
    if shots == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", hits as f64 / shots as f64 * 100.0)
}

/// Everything a renderer needs, copied at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    pub player_board: Grid,
    pub opponent_board: Grid,
    pub total_shots: u32,
    pub total_hits: u32,
    pub player: PlayerInfo,
    pub opponent: PlayerInfo,
    pub tally: FleetTally,
}

impl StateSnapshot {
    pub fn accuracy(&self) -> String {
        format_accuracy(self.total_hits, self.total_shots)
    }
}

#[derive(Debug, Default)]
struct Inner {
    player: PlayerInfo,
    opponent: PlayerInfo,
    player_board: Grid,
    opponent_board: Grid,
    total_shots: u32,
    hits: u32,
    tally: FleetTally,
    last_game_status: String,
}

impl Inner {
    fn mark_player_board(&mut self, c: Coord) {
        match self.player_board.get(c) {
            CellState::Ship => self.player_board.set(c, CellState::Hit),
            CellState::Empty => self.player_board.set(c, CellState::Miss),
            _ => {}
        }
    }

    fn mark_opponent_board(&mut self, c: Coord, result: ShotResult) -> usize {
        if self.opponent_board.get(c).is_terminal() {
            return 0;
        }
        match result {
            ShotResult::Sunk => {
                let extent = sink_ship(&mut self.opponent_board, c);
                if !self.tally.record_sunk(extent.len()) {
                    log::warn!(
                        "sunk ship at {} has length {} which the tally cannot account for",
                        c,
                        extent.len()
                    );
                }
                extent.len()
            }
            other => {
                self.opponent_board.set(c, other.cell_state());
                0
            }
        }
    }

    fn increment_hit_count(&mut self, result: ShotResult) {
        if result.is_hit() {
            self.hits += 1;
        }
        self.total_shots += 1;
    }
}

/// The single shared aggregate for one client process.
#[derive(Debug, Default)]
pub struct GameState {
    inner: Mutex<Inner>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Mutations never call out while holding the guard, so a poisoned
        // lock still guards consistent data.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the player's grid and return the committed copy.
    pub fn update_player_board(&self, grid: Grid) -> Grid {
        let mut inner = self.lock();
        inner.player_board = grid;
        inner.player_board
    }

    /// Replace the opponent-view grid and return the committed copy.
    pub fn update_opponent_board(&self, grid: Grid) -> Grid {
        let mut inner = self.lock();
        inner.opponent_board = grid;
        inner.opponent_board
    }

    pub fn player_board(&self) -> Grid {
        self.lock().player_board
    }

    pub fn opponent_board(&self) -> Grid {
        self.lock().opponent_board
    }

    /// Apply an incoming enemy shot to our board: Ship becomes Hit, Empty
    /// becomes Miss, anything else is left alone.
    pub fn mark_player_board(&self, c: Coord) {
        self.lock().mark_player_board(c);
    }

    /// Apply a batch of enemy shots under one lock.
    pub fn mark_player_shots(&self, shots: &[Coord]) {
        let mut inner = self.lock();
        for &c in shots {
            inner.mark_player_board(c);
        }
    }

    /// Record the outcome of our own shot on the opponent view. On `Sunk`
    /// the ship is located, bordered and counted; its length is returned.
    /// A cell that is already `Miss` or `Sunk` is left untouched and 0 is
    /// returned, so repeating a sunk report never counts a ship twice.
    pub fn mark_opponent_board(&self, c: Coord, result: ShotResult) -> usize {
        self.lock().mark_opponent_board(c, result)
    }

    /// `true` if a shot at `c` has already been resolved.
    pub fn check_if_already_hit(&self, c: Coord) -> bool {
        self.lock().opponent_board.get(c).is_resolved()
    }

    pub fn increment_hit_count(&self, result: ShotResult) {
        self.lock().increment_hit_count(result);
    }

    /// Count the shot and mark its result in one critical section.
    pub fn record_shot(&self, c: Coord, result: ShotResult) -> usize {
        let mut inner = self.lock();
        inner.increment_hit_count(result);
        inner.mark_opponent_board(c, result)
    }

    pub fn total_shots(&self) -> u32 {
        self.lock().total_shots
    }

    pub fn total_hits(&self) -> u32 {
        self.lock().hits
    }

    pub fn accuracy(&self) -> String {
        let inner = self.lock();
        format_accuracy(inner.hits, inner.total_shots)
    }

    pub fn set_player_info(&self, nick: &str, description: &str) {
        let mut inner = self.lock();
        inner.player.nick = nick.to_string();
        inner.player.description = description.to_string();
    }

    pub fn player_info(&self) -> PlayerInfo {
        self.lock().player.clone()
    }

    pub fn opponent_info(&self) -> PlayerInfo {
        self.lock().opponent.clone()
    }

    pub fn update_descriptions(&self, description: &str, opponent_description: &str) {
        let mut inner = self.lock();
        inner.player.description = description.to_string();
        inner.opponent.description = opponent_description.to_string();
    }

    /// Take nicknames reported by the server. Empty values are ignored.
    pub fn update_nicknames(&self, nick: &str, opponent: &str) {
        let mut inner = self.lock();
        if !nick.is_empty() {
            inner.player.nick = nick.to_string();
        }
        if !opponent.is_empty() {
            inner.opponent.nick = opponent.to_string();
        }
    }

    /// Put a ship segment on the player's board.
    pub fn add_ship(&self, c: Coord) {
        self.lock().player_board.set(c, CellState::Ship);
    }

    /// Coordinates of intact ship segments on the player's board.
    pub fn player_ship_coords(&self) -> Vec<Coord> {
        self.lock().player_board.coords_with(CellState::Ship)
    }

    pub fn opponent_tally(&self) -> FleetTally {
        self.lock().tally
    }

    pub fn update_last_game_status(&self, status: &str) {
        self.lock().last_game_status = status.to_string();
    }

    pub fn last_game_status(&self) -> String {
        self.lock().last_game_status.clone()
    }

    /// Reset for a new round. Nicknames, descriptions and the last game
    /// status survive.
    pub fn clear_state(&self) {
        let mut inner = self.lock();
        inner.player_board = Grid::new();
        inner.opponent_board = Grid::new();
        inner.total_shots = 0;
        inner.hits = 0;
        inner.tally = FleetTally::new();
    }

    /// Copy everything a renderer needs at one instant.
    pub fn snapshot(&self) -> StateSnapshot {
        let inner = self.lock();
        StateSnapshot {
            player_board: inner.player_board,
            opponent_board: inner.opponent_board,
            total_shots: inner.total_shots,
            total_hits: inner.hits,
            player: inner.player.clone(),
            opponent: inner.opponent.clone(),
            tally: inner.tally,
        }
    }
}
