use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use warships::api::{GameApi, RemoteStatus};
use warships::core::{CellState, Coord, Grid};
use warships::display::{CoordSource, DisplaySink};
use warships::state::StateSnapshot;
use warships::{Client, ClientConfig, EndReason, GameRequest, LocalServer, StatusReport};

#[derive(Default)]
struct LogDisplay {
    lines: Mutex<Vec<String>>,
}

impl DisplaySink for LogDisplay {
    fn show_status(&self, _status: &StatusReport) {}

    fn show_state(&self, _snapshot: &StateSnapshot) {}

    fn log(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

fn coords(list: &[&str]) -> Vec<Coord> {
    list.iter().map(|s| s.parse().unwrap()).collect()
}

/// A legal fleet, largest ship first, in the order placement asks for it.
fn fleet() -> Vec<Coord> {
    coords(&[
        "A1", "A2", "A3", "A4", // 4
        "C1", "C2", "C3", // 3
        "E1", "E2", "E3", // 3
        "G1", "G2", // 2
        "I1", "I2", // 2
        "A6", "A7", // 2
        "C6", "E6", "G6", "I6", // 1
    ])
}

fn request() -> GameRequest {
    GameRequest {
        nick: "tester".into(),
        description: "integration".into(),
        target_nick: String::new(),
        vs_bot: true,
    }
}

fn fast_config() -> ClientConfig {
    ClientConfig {
        poll_interval_ms: 20,
        publish_interval_ms: 10,
        ..ClientConfig::default()
    }
}

#[tokio::test]
async fn manual_placement_reprompts_and_commits_the_fleet() {
    let display = Arc::new(LogDisplay::default());
    let server = Arc::new(LocalServer::new(9));
    let client = Client::new(server.clone(), display.clone(), ClientConfig::default());

    let (tx, mut rx) = mpsc::channel(64);
    // A broken first attempt at the four-long ship, then the real fleet.
    for c in coords(&["J1", "J2", "J4", "J5"]).into_iter().chain(fleet()) {
        tx.send(c).await.unwrap();
    }
    client
        .setup(&request(), Some(&mut rx as &mut dyn CoordSource))
        .await
        .unwrap();

    let lines = display.lines.lock().unwrap().clone();
    assert_eq!(
        lines
            .iter()
            .filter(|l| l.starts_with("Invalid placement"))
            .count(),
        1
    );
    let expected = Grid::from_coords(fleet(), CellState::Ship);
    assert_eq!(client.state().player_board(), expected);

    let mut on_server = server.board().await.unwrap();
    let mut placed: Vec<String> = fleet().iter().map(|c| c.to_string()).collect();
    on_server.sort();
    placed.sort();
    assert_eq!(on_server, placed);
}

#[tokio::test]
async fn server_placed_fleet_is_loaded_back() {
    let display = Arc::new(LogDisplay::default());
    let client = Client::new(LocalServer::new(21), display, ClientConfig::default());
    client.setup(&request(), None).await.unwrap();

    let state = client.state();
    assert_eq!(state.player_board().count(CellState::Ship), 20);
    assert_eq!(state.player_info().nick, "tester");
    assert_eq!(state.opponent_info().nick, "local_bot");
    assert!(!state.opponent_info().description.is_empty());
}

#[tokio::test]
async fn closed_input_during_placement_is_an_error() {
    let display = Arc::new(LogDisplay::default());
    let client = Client::new(LocalServer::new(1), display, ClientConfig::default());
    let (tx, mut rx) = mpsc::channel(4);
    tx.send("A1".parse().unwrap()).await.unwrap();
    drop(tx);
    assert!(client
        .setup(&request(), Some(&mut rx as &mut dyn CoordSource))
        .await
        .is_err());
}

#[tokio::test]
async fn round_ends_when_the_server_ends_the_game() {
    let display = Arc::new(LogDisplay::default());
    let server = LocalServer::new(8).with_turn_limit(Duration::ZERO);
    let client = Client::new(server, display, fast_config());
    let (_tx, rx) = mpsc::channel::<Coord>(1);

    let summary = timeout(Duration::from_secs(5), client.play_round(&request(), None, rx))
        .await
        .expect("round finishes")
        .unwrap();
    assert_eq!(summary.reason, EndReason::RemoteEnded);
    assert_eq!(summary.last_game_status, "lose");
    assert_eq!(client.state().total_shots(), 0);
}

#[tokio::test]
async fn abort_abandons_on_the_server_and_allows_a_new_round() {
    let display = Arc::new(LogDisplay::default());
    let server = Arc::new(LocalServer::new(13));
    let client = Client::new(server.clone(), display, fast_config());

    client.setup(&request(), None).await.unwrap();
    let (_tx, rx) = mpsc::channel::<Coord>(1);
    let round = client.launch(rx);
    tokio::time::sleep(Duration::from_millis(60)).await;
    round.abort().await.unwrap();
    let summary = timeout(Duration::from_secs(1), round.join()).await.unwrap();
    assert_eq!(summary.reason, EndReason::Aborted);

    let report = server.status().await.unwrap();
    assert_eq!(report.status, RemoteStatus::Ended);
    assert_eq!(report.last_game_status, "abandon");

    client.setup(&request(), None).await.unwrap();
    let report = server.status().await.unwrap();
    assert_eq!(report.status, RemoteStatus::WaitingBot);
}
