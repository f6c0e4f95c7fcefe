//! Plain terminal display and stdin coordinate reader.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::{CoordSource, DisplaySink};
use crate::api::{RemoteStatus, StatusReport};
use crate::core::{config::BOARD_SIZE, CellState, Coord, Grid};
use crate::state::StateSnapshot;

fn cell_char(state: CellState, reveal: bool) -> char {
    match state {
        CellState::Hit => 'H',
        CellState::Sunk => 'X',
        CellState::Miss => 'o',
        CellState::Ship if reveal => 'S',
        _ => '.',
    }
}

/// Render one grid as a framed block of text, rows 1-10 down, columns A-J
/// across. `reveal` shows intact ships.
pub fn render_grid(grid: &Grid, reveal: bool) -> String {
    let n = BOARD_SIZE as i32;
    let mut out = String::new();
    let _ = writeln!(out, "    ╔═══════════════════════╗");
    out.push_str("    ║   ");
    for x in 0..n {
        let _ = write!(out, " {}", (b'A' + x as u8) as char);
    }
    out.push_str(" ║\n");
    let _ = writeln!(out, "    ╠═══════════════════════╣");
    for y in 0..n {
        let _ = write!(out, "    ║ {:2}", y + 1);
        for x in 0..n {
            let ch = Coord::new(x, y)
                .map(|c| cell_char(grid.get(c), reveal))
                .unwrap_or(' ');
            let _ = write!(out, " {}", ch);
        }
        out.push_str(" ║\n");
    }
    let _ = writeln!(out, "    ╚═══════════════════════╝");
    out
}

/// Render a full snapshot: both boards, accuracy and the opponent tally.
pub fn render_state(snapshot: &StateSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Opponent: {} - {}",
        snapshot.opponent.nick, snapshot.opponent.description
    );
    out.push_str(&render_grid(&snapshot.opponent_board, false));
    let _ = writeln!(
        out,
        "You: {} - {}",
        snapshot.player.nick, snapshot.player.description
    );
    out.push_str(&render_grid(&snapshot.player_board, true));
    let _ = writeln!(out, "    Legend: S=Ship  H=Hit  X=Sunk  o=Miss  .=Water");
    let _ = writeln!(out, "    Accuracy: {} %", snapshot.accuracy());
    for (len, remaining) in snapshot.tally.iter() {
        let noun = if remaining == 1 { "ship" } else { "ships" };
        let _ = writeln!(out, "    {} {} of length {} left", remaining, noun, len);
    }
    out
}

/// One-line summary of a status report.
pub fn render_status(status: &StatusReport) -> String {
    match status.status {
        RemoteStatus::Waiting | RemoteStatus::WaitingBot => "Waiting for opponent...".to_string(),
        RemoteStatus::Ended => format!("Game ended: {}", status.last_game_status),
        _ => {
            let turn = if status.should_fire {
                "Your turn"
            } else {
                "Opponent's turn"
            };
            format!(
                "{} vs {} | {} | Time: {}",
                status.nick, status.opponent, turn, status.timer_seconds
            )
        }
    }
}

/// Prints to stdout, redrawing only when something visible changed.
#[derive(Default)]
pub struct ConsoleDisplay {
    last_state: Mutex<Option<StateSnapshot>>,
    last_status: Mutex<Option<(RemoteStatus, bool, u32)>>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `status` and report whether its visible part differs from
    /// the previous one, turn timer included.
    fn status_changed(&self, status: &StatusReport) -> bool {
        let key = (status.status, status.should_fire, status.timer_seconds);
        let mut last = self.last_status.lock().unwrap_or_else(|p| p.into_inner());
        if last.as_ref() == Some(&key) {
            return false;
        }
        *last = Some(key);
        true
    }
}

impl DisplaySink for ConsoleDisplay {
    fn show_status(&self, status: &StatusReport) {
        if self.status_changed(status) {
            println!("{}", render_status(status));
        }
    }

    fn show_state(&self, snapshot: &StateSnapshot) {
        let mut last = self.last_state.lock().unwrap_or_else(|p| p.into_inner());
        if last.as_ref() == Some(snapshot) {
            return;
        }
        *last = Some(snapshot.clone());
        println!("{}", render_state(snapshot));
    }

    fn log(&self, line: &str) {
        println!(">> {}", line);
    }
}

/// Split one input line on spaces and commas. Returns the coordinates that
/// parsed and a message for every token that did not.
pub fn split_coords(line: &str) -> (Vec<Coord>, Vec<String>) {
    let mut coords = Vec::new();
    let mut rejected = Vec::new();
    for token in line
        .split(|ch: char| ch.is_whitespace() || ch == ',')
        .filter(|t| !t.is_empty())
    {
        match token.parse::<Coord>() {
            Ok(c) => coords.push(c),
            Err(e) => rejected.push(format!("Invalid coordinate '{}': {}", token, e)),
        }
    }
    (coords, rejected)
}

/// Reads coordinates from stdin. A line may hold several coordinates
/// separated by spaces or commas; malformed ones are logged, shown on the
/// attached display and skipped.
pub struct ConsoleInput {
    lines: Lines<BufReader<Stdin>>,
    pending: VecDeque<Coord>,
    display: Option<Arc<dyn DisplaySink>>,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            pending: VecDeque::new(),
            display: None,
        }
    }

    /// Report rejected tokens to `display` as well as the log.
    pub fn with_display(mut self, display: Arc<dyn DisplaySink>) -> Self {
        self.display = Some(display);
        self
    }

    /// Next raw line, or `None` at end of input.
    pub async fn read_line(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                log::warn!("stdin read failed: {}", e);
                None
            }
        }
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CoordSource for ConsoleInput {
    async fn next_coord(&mut self) -> Option<Coord> {
        loop {
            if let Some(c) = self.pending.pop_front() {
                return Some(c);
            }
            let line = self.read_line().await?;
            let (coords, rejected) = split_coords(&line);
            self.pending.extend(coords);
            for msg in rejected {
                log::warn!("[Input] {}", msg);
                if let Some(display) = &self.display {
                    display.log(&msg);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameState;

    #[test]
    fn grid_rendering_hides_ships_unless_revealed() {
        let mut grid = Grid::new();
        grid.set(Coord::new(0, 0).unwrap(), CellState::Ship);
        grid.set(Coord::new(1, 0).unwrap(), CellState::Hit);
        assert!(render_grid(&grid, true).contains(" S H"));
        assert!(render_grid(&grid, false).contains(" . H"));
    }

    #[test]
    fn state_rendering_includes_accuracy_and_tally() {
        let state = GameState::new();
        let text = render_state(&state.snapshot());
        assert!(text.contains("Accuracy: 0.00 %"));
        assert!(text.contains("4 ships of length 1 left"));
        assert!(text.contains("1 ship of length 4 left"));
    }

    #[test]
    fn bad_tokens_are_split_out_with_a_message() {
        let (coords, rejected) = split_coords("A1, k3  B10 A05,,J2");
        let names: Vec<String> = coords.iter().map(Coord::to_string).collect();
        assert_eq!(names, ["A1", "B10", "J2"]);
        assert_eq!(rejected.len(), 2);
        assert!(rejected[0].starts_with("Invalid coordinate 'k3'"));
        assert!(rejected[1].starts_with("Invalid coordinate 'A05'"));
        assert_eq!(split_coords("   "), (Vec::new(), Vec::new()));
    }

    #[test]
    fn status_redraws_when_the_timer_moves() {
        let display = ConsoleDisplay::new();
        let mut report = StatusReport {
            status: RemoteStatus::InProgress,
            should_fire: true,
            timer_seconds: 60,
            ..Default::default()
        };
        assert!(display.status_changed(&report));
        assert!(!display.status_changed(&report));
        report.timer_seconds = 59;
        assert!(display.status_changed(&report));
        report.should_fire = false;
        assert!(display.status_changed(&report));
        assert!(!display.status_changed(&report));
    }
}
