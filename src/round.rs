//! One game round: a fixed set of tasks sharing [`GameState`] under one
//! cancellation signal.
//!
//! ```text
//!   status poller ──status──▶ status feed ──▶ DisplaySink
//!   state publisher ─state──▶ state feed ──▶ DisplaySink
//!   CoordSource ▶ shot listener ─shots─▶ shot dispatcher ─▶ GameApi::fire
//!   (any task) ──errors──▶ error sink ──▶ DisplaySink::log
//! ```
//!
//! Every blocking point races the signal, so a cancel reaches all seven
//! tasks. [`Round::join`] returns once every task has exited.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::{self, MissedTickBehavior};

use crate::api::{ApiError, GameApi, RemoteStatus, StatusReport};
use crate::config::ClientConfig;
use crate::core::Coord;
use crate::display::{CoordSource, DisplaySink};
use crate::state::{GameState, StateSnapshot};

/// Why a round stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The server reported the game as ended.
    RemoteEnded,
    /// The player abandoned the game.
    Aborted,
    /// Stopped locally without telling the server.
    Cancelled,
}

/// Observable progress of a running round. The setup step that precedes
/// it is [`crate::Client::setup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    AwaitingOpponent,
    InProgress,
    Ended,
}

impl RoundPhase {
    fn from_remote(status: RemoteStatus) -> Option<Self> {
        match status {
            RemoteStatus::Waiting | RemoteStatus::WaitingBot => Some(RoundPhase::AwaitingOpponent),
            RemoteStatus::InProgress => Some(RoundPhase::InProgress),
            RemoteStatus::Ended => Some(RoundPhase::Ended),
            RemoteStatus::Unknown => None,
        }
    }
}

/// Shared cancellation signal. The first reason recorded wins.
#[derive(Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<Option<EndReason>>>,
}

impl CancelSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the signal. Returns `false` if it had already fired.
    pub fn cancel(&self, reason: EndReason) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    pub fn reason(&self) -> Option<EndReason> {
        *self.tx.borrow()
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    pub fn listener(&self) -> Cancelled {
        Cancelled {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// One task's view of a [`CancelSignal`].
pub struct Cancelled {
    rx: watch::Receiver<Option<EndReason>>,
}

impl Cancelled {
    /// Resolves once the signal has fired.
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(Option::is_some).await;
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.borrow().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    StatusPoller,
    StatePublisher,
    ShotDispatcher,
    ShotListener,
    StatusFeed,
    StateFeed,
    ErrorSink,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Task::StatusPoller => "status poller",
            Task::StatePublisher => "state publisher",
            Task::ShotDispatcher => "shot dispatcher",
            Task::ShotListener => "shot listener",
            Task::StatusFeed => "status feed",
            Task::StateFeed => "state feed",
            Task::ErrorSink => "error sink",
        };
        f.write_str(name)
    }
}

/// Outcome of a finished round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub reason: EndReason,
    /// The server's verdict ("win", "lose", "abandon"), empty if unknown.
    pub last_game_status: String,
}

/// Everything a task needs besides its own channels.
#[derive(Clone)]
struct TaskContext {
    api: Arc<dyn GameApi>,
    state: Arc<GameState>,
    signal: CancelSignal,
    errors: mpsc::Sender<ApiError>,
}

impl TaskContext {
    async fn report(&self, error: ApiError, cancelled: &mut Cancelled) {
        log::warn!("[Round] {}", error);
        forward(&self.errors, error, cancelled).await;
    }
}

/// Send `value` unless the round is cancelled first. Returns `false` when
/// the value was not delivered.
async fn forward<T>(tx: &mpsc::Sender<T>, value: T, cancelled: &mut Cancelled) -> bool {
    tokio::select! {
        biased;
        _ = cancelled.wait() => false,
        res = tx.send(value) => res.is_ok(),
    }
}

fn ticker(period: Duration) -> time::Interval {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// A running round.
pub struct Round {
    signal: CancelSignal,
    phase_tx: Arc<watch::Sender<RoundPhase>>,
    phase: watch::Receiver<RoundPhase>,
    tasks: JoinSet<Task>,
    api: Arc<dyn GameApi>,
    state: Arc<GameState>,
}

impl Round {
    /// Start the round's tasks. Must be called from inside a Tokio runtime.
    pub fn spawn<I>(
        api: Arc<dyn GameApi>,
        state: Arc<GameState>,
        display: Arc<dyn DisplaySink>,
        input: I,
        config: &ClientConfig,
    ) -> Self
    where
        I: CoordSource + 'static,
    {
        let capacity = config.channel_capacity.max(1);
        let signal = CancelSignal::new();
        let (phase_tx, phase_rx) = watch::channel(RoundPhase::AwaitingOpponent);
        let phase_tx = Arc::new(phase_tx);
        let (status_tx, status_rx) = mpsc::channel(capacity);
        let (snapshot_tx, snapshot_rx) = mpsc::channel(capacity);
        let (shot_tx, shot_rx) = mpsc::channel(capacity);
        let (error_tx, error_rx) = mpsc::channel(capacity);

        let ctx = TaskContext {
            api: api.clone(),
            state: state.clone(),
            signal: signal.clone(),
            errors: error_tx,
        };

        let mut tasks = JoinSet::new();
        tasks.spawn(poll_status(
            ctx.clone(),
            status_tx,
            phase_tx.clone(),
            config.poll_interval(),
        ));
        tasks.spawn(publish_state(ctx.clone(), snapshot_tx, config.publish_interval()));
        tasks.spawn(dispatch_shots(ctx.clone(), shot_rx));
        tasks.spawn(listen_for_shots(ctx.clone(), input, shot_tx));
        tasks.spawn(feed_status(signal.clone(), status_rx, display.clone()));
        tasks.spawn(feed_state(signal.clone(), snapshot_rx, display.clone()));
        tasks.spawn(sink_errors(signal.clone(), error_rx, display));
        drop(ctx);

        log::debug!("[Round] started {} tasks", tasks.len());
        Self {
            signal,
            phase_tx,
            phase: phase_rx,
            tasks,
            api,
            state,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        *self.phase.borrow()
    }

    /// A receiver that sees every phase change.
    pub fn phase_watch(&self) -> watch::Receiver<RoundPhase> {
        self.phase.clone()
    }

    pub fn signal(&self) -> CancelSignal {
        self.signal.clone()
    }

    /// Resolves once the round has been told to stop, for any reason.
    pub async fn cancelled(&self) {
        self.signal.listener().wait().await;
    }

    /// Stop all tasks without notifying the server.
    pub fn cancel(&self) {
        if self.signal.cancel(EndReason::Cancelled) {
            log::debug!("[Round] cancelled");
        }
        self.phase_tx.send_replace(RoundPhase::Ended);
    }

    /// Abandon the game on the server, then stop all tasks. The tasks stop
    /// even when the abandon request fails; the failure is returned.
    pub async fn abort(&self) -> Result<(), ApiError> {
        let res = self.api.abandon().await;
        if let Err(e) = &res {
            log::warn!("[Round] abandon failed: {}", e);
        }
        self.signal.cancel(EndReason::Aborted);
        self.phase_tx.send_replace(RoundPhase::Ended);
        res
    }

    /// Wait for every task to exit.
    pub async fn join(mut self) -> RoundSummary {
        while let Some(res) = self.tasks.join_next().await {
            match res {
                Ok(task) => log::debug!("[Round] {} stopped", task),
                Err(e) => log::error!("[Round] task failed: {}", e),
            }
        }
        // The signal may have fired through a cloned `CancelSignal`.
        self.phase_tx.send_replace(RoundPhase::Ended);
        RoundSummary {
            reason: self.signal.reason().unwrap_or(EndReason::Cancelled),
            last_game_status: self.state.last_game_status(),
        }
    }
}

/// Parse the opponent's shots, reporting the ones that are not coordinates.
async fn parse_opponent_shots(
    ctx: &TaskContext,
    raw: &[String],
    cancelled: &mut Cancelled,
) -> Vec<Coord> {
    let mut shots = Vec::with_capacity(raw.len());
    for s in raw {
        match s.parse::<Coord>() {
            Ok(c) => shots.push(c),
            Err(e) => {
                let error = ApiError::Malformed(format!("opponent shot '{}': {}", s, e));
                ctx.report(error, cancelled).await;
            }
        }
    }
    shots
}

async fn poll_status(
    ctx: TaskContext,
    status_tx: mpsc::Sender<StatusReport>,
    phase_tx: Arc<watch::Sender<RoundPhase>>,
    period: Duration,
) -> Task {
    let mut cancelled = ctx.signal.listener();
    let mut ticks = ticker(period);
    loop {
        tokio::select! {
            biased;
            _ = cancelled.wait() => break,
            _ = ticks.tick() => {}
        }
        let res = tokio::select! {
            biased;
            _ = cancelled.wait() => break,
            res = ctx.api.status() => res,
        };
        let report = match res {
            Ok(report) => report,
            Err(e) => {
                ctx.report(e, &mut cancelled).await;
                continue;
            }
        };
        if cancelled.is_cancelled() {
            break;
        }

        ctx.state.update_last_game_status(&report.last_game_status);
        if let Some(phase) = RoundPhase::from_remote(report.status) {
            // Once ended, the phase never moves again.
            phase_tx.send_if_modified(|current| {
                if *current == RoundPhase::Ended || *current == phase {
                    return false;
                }
                *current = phase;
                true
            });
        }
        if report.status == RemoteStatus::Ended {
            log::info!("[Round] game ended: {}", report.last_game_status);
            ctx.state.clear_state();
            let _ = status_tx.try_send(report);
            ctx.signal.cancel(EndReason::RemoteEnded);
            break;
        }

        ctx.state.update_nicknames(&report.nick, &report.opponent);
        if report.status == RemoteStatus::InProgress {
            let res = tokio::select! {
                biased;
                _ = cancelled.wait() => break,
                res = ctx.api.descriptions() => res,
            };
            match res {
                Ok(d) if !cancelled.is_cancelled() => {
                    ctx.state.update_descriptions(&d.desc, &d.opp_desc)
                }
                Ok(_) => break,
                Err(e) => ctx.report(e, &mut cancelled).await,
            }
        }

        let shots = parse_opponent_shots(&ctx, &report.opp_shots, &mut cancelled).await;
        if cancelled.is_cancelled() {
            break;
        }
        ctx.state.mark_player_shots(&shots);

        if !forward(&status_tx, report, &mut cancelled).await {
            break;
        }
    }
    Task::StatusPoller
}

async fn publish_state(
    ctx: TaskContext,
    snapshot_tx: mpsc::Sender<StateSnapshot>,
    period: Duration,
) -> Task {
    let mut cancelled = ctx.signal.listener();
    let mut ticks = ticker(period);
    loop {
        tokio::select! {
            biased;
            _ = cancelled.wait() => break,
            _ = ticks.tick() => {}
        }
        let snapshot = ctx.state.snapshot();
        if !forward(&snapshot_tx, snapshot, &mut cancelled).await {
            break;
        }
    }
    Task::StatePublisher
}

async fn dispatch_shots(ctx: TaskContext, mut shot_rx: mpsc::Receiver<Coord>) -> Task {
    let mut cancelled = ctx.signal.listener();
    loop {
        let coord = tokio::select! {
            biased;
            _ = cancelled.wait() => break,
            next = shot_rx.recv() => match next {
                Some(c) => c,
                None => break,
            },
        };
        let res = tokio::select! {
            biased;
            _ = cancelled.wait() => break,
            res = ctx.api.fire(coord) => res,
        };
        match res {
            Ok(_) if cancelled.is_cancelled() => break,
            Ok(result) => {
                let sunk = ctx.state.record_shot(coord, result);
                if sunk > 0 {
                    log::info!("[Round] {} sank a ship of length {}", coord, sunk);
                } else {
                    log::debug!("[Round] fired at {}: {}", coord, result);
                }
            }
            Err(e) => ctx.report(e, &mut cancelled).await,
        }
    }
    Task::ShotDispatcher
}

async fn listen_for_shots<I: CoordSource>(
    ctx: TaskContext,
    mut input: I,
    shot_tx: mpsc::Sender<Coord>,
) -> Task {
    let mut cancelled = ctx.signal.listener();
    loop {
        let coord = tokio::select! {
            biased;
            _ = cancelled.wait() => break,
            next = input.next_coord() => match next {
                Some(c) => c,
                None => {
                    log::debug!("[Round] coordinate input closed");
                    break;
                }
            },
        };
        if ctx.state.check_if_already_hit(coord) {
            log::debug!("[Round] {} already resolved, ignoring", coord);
            continue;
        }
        if !forward(&shot_tx, coord, &mut cancelled).await {
            break;
        }
    }
    Task::ShotListener
}

async fn feed_status(
    signal: CancelSignal,
    mut status_rx: mpsc::Receiver<StatusReport>,
    display: Arc<dyn DisplaySink>,
) -> Task {
    let mut cancelled = signal.listener();
    loop {
        tokio::select! {
            biased;
            _ = cancelled.wait() => break,
            next = status_rx.recv() => match next {
                Some(status) => display.show_status(&status),
                None => break,
            },
        }
    }
    Task::StatusFeed
}

async fn feed_state(
    signal: CancelSignal,
    mut snapshot_rx: mpsc::Receiver<StateSnapshot>,
    display: Arc<dyn DisplaySink>,
) -> Task {
    let mut cancelled = signal.listener();
    loop {
        tokio::select! {
            biased;
            _ = cancelled.wait() => break,
            next = snapshot_rx.recv() => match next {
                Some(snapshot) => display.show_state(&snapshot),
                None => break,
            },
        }
    }
    Task::StateFeed
}

async fn sink_errors(
    signal: CancelSignal,
    mut error_rx: mpsc::Receiver<ApiError>,
    display: Arc<dyn DisplaySink>,
) -> Task {
    let mut cancelled = signal.listener();
    loop {
        tokio::select! {
            biased;
            _ = cancelled.wait() => break,
            next = error_rx.recv() => match next {
                Some(e) => display.log(&format!("Error: {}", e)),
                None => break,
            },
        }
    }
    Task::ErrorSink
}
