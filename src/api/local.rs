//! In-process bot opponent.
//!
//! `LocalServer` answers the same calls a remote game server would, with a
//! randomly placed bot fleet and a hunt/target bot shooting back. It keeps
//! the whole game behind one mutex; no call blocks.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{ApiError, Descriptions, GameApi, RemoteStatus, StartGame, StatusReport};
use crate::core::{
    coord::STRAIGHT, locate_with, parse_coords, random_fleet, sink_ship, validate_fleet,
    CellState, Coord, Grid, ShotResult,
};

pub const BOT_NICK: &str = "local_bot";
const BOT_DESC: &str = "Practice opponent running inside this process";

struct Session {
    token: String,
    nick: String,
    desc: String,
    status: RemoteStatus,
    last_game_status: String,
    /// Our player's ships, as shot at by the bot.
    player_fleet: Grid,
    /// The bot's ships, as shot at by our player.
    bot_fleet: Grid,
    bot_shots: Vec<Coord>,
    should_fire: bool,
    turn_started: Instant,
}

impl Session {
    fn end(&mut self, outcome: &str) {
        self.status = RemoteStatus::Ended;
        self.last_game_status = outcome.to_string();
        self.should_fire = false;
    }
}

struct Inner {
    rng: SmallRng,
    games_started: u64,
    session: Option<Session>,
}

/// A [`GameApi`] that plays against a bot without any network.
pub struct LocalServer {
    inner: Mutex<Inner>,
    turn_limit: Duration,
}

impl LocalServer {
    /// Create a server whose bot decisions come from `seed`.
    pub fn new(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    /// Create a server seeded from the thread RNG.
    pub fn from_entropy() -> Self {
        let mut seed_rng = rand::rng();
        Self::with_rng(SmallRng::from_rng(&mut seed_rng))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            inner: Mutex::new(Inner {
                rng,
                games_started: 0,
                session: None,
            }),
            turn_limit: Duration::from_secs(60),
        }
    }

    /// Time the player has for each shot before forfeiting.
    pub fn with_turn_limit(mut self, limit: Duration) -> Self {
        self.turn_limit = limit;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn no_session() -> ApiError {
    ApiError::Unauthorized("no active game session".to_string())
}

/// Pick the bot's next shot: finish off a wounded ship if there is one,
/// otherwise any unresolved cell not bordering a sunk ship.
fn bot_target<R: Rng>(board: &Grid, rng: &mut R) -> Option<Coord> {
    let open = |c: Coord| !board.get(c).is_resolved();

    let mut targets: Vec<Coord> = board
        .coords_with(CellState::Hit)
        .into_iter()
        .flat_map(|hit| {
            STRAIGHT
                .iter()
                .filter_map(move |&(dx, dy)| hit.offset(dx, dy))
        })
        .filter(|&c| open(c))
        .collect();

    if targets.is_empty() {
        targets = Coord::all()
            .filter(|&c| open(c))
            .filter(|&c| !c.neighbors().any(|n| board.get(n) == CellState::Sunk))
            .collect();
    }
    if targets.is_empty() {
        targets = Coord::all().filter(|&c| open(c)).collect();
    }
    if targets.is_empty() {
        return None;
    }
    Some(targets[rng.random_range(0..targets.len())])
}

/// Resolve a shot at `c` on `fleet`. Returns `None` if the cell was
/// already shot.
fn resolve_shot(fleet: &mut Grid, c: Coord) -> Option<ShotResult> {
    match fleet.get(c) {
        CellState::Empty => {
            fleet.set(c, CellState::Miss);
            Some(ShotResult::Miss)
        }
        CellState::Ship => {
            fleet.set(c, CellState::Hit);
            let ship = locate_with(fleet, c, CellState::is_occupied);
            if ship.cells().iter().any(|&s| fleet.get(s) == CellState::Ship) {
                Some(ShotResult::Hit)
            } else {
                sink_ship(fleet, c);
                Some(ShotResult::Sunk)
            }
        }
        _ => None,
    }
}

fn fleet_destroyed(fleet: &Grid) -> bool {
    !fleet.contains(CellState::Ship)
}

impl Inner {
    /// Let the bot shoot until it misses or wins.
    fn bot_turn(&mut self) {
        let Inner { rng, session, .. } = self;
        let Some(session) = session.as_mut() else {
            return;
        };
        loop {
            let Some(target) = bot_target(&session.player_fleet, rng) else {
                session.end("lose");
                return;
            };
            let Some(result) = resolve_shot(&mut session.player_fleet, target) else {
                continue;
            };
            session.bot_shots.push(target);
            log::debug!("[LocalServer] bot fired at {}: {}", target, result);
            if result == ShotResult::Miss {
                session.should_fire = true;
                session.turn_started = Instant::now();
                return;
            }
            if fleet_destroyed(&session.player_fleet) {
                session.end("lose");
                return;
            }
        }
    }
}

#[async_trait::async_trait]
impl GameApi for LocalServer {
    async fn start_game(&self, request: &StartGame) -> Result<String, ApiError> {
        if !request.wpbot {
            return Err(ApiError::BadRequest(
                "the local server only hosts games against the bot".to_string(),
            ));
        }
        let mut inner = self.lock();
        let player_fleet = if request.coords.is_empty() {
            random_fleet(&mut inner.rng).map_err(|e| ApiError::Unexpected(e.to_string()))?
        } else {
            let coords = parse_coords(&request.coords)
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            let grid = Grid::from_coords(coords, CellState::Ship);
            validate_fleet(&grid).map_err(|e| ApiError::BadRequest(e.to_string()))?;
            grid
        };
        let bot_fleet =
            random_fleet(&mut inner.rng).map_err(|e| ApiError::Unexpected(e.to_string()))?;

        inner.games_started += 1;
        let token = format!("local-{}", inner.games_started);
        let nick = if request.nick.is_empty() {
            format!("player_{}", inner.rng.random_range(1000..10000))
        } else {
            request.nick.clone()
        };
        log::info!("[LocalServer] starting game {} for {}", token, nick);
        inner.session = Some(Session {
            token: token.clone(),
            nick,
            desc: request.desc.clone(),
            status: RemoteStatus::WaitingBot,
            last_game_status: String::new(),
            player_fleet,
            bot_fleet,
            bot_shots: Vec::new(),
            should_fire: true,
            turn_started: Instant::now(),
        });
        Ok(token)
    }

    async fn board(&self) -> Result<Vec<String>, ApiError> {
        let inner = self.lock();
        let session = inner.session.as_ref().ok_or_else(no_session)?;
        Ok(session
            .player_fleet
            .iter()
            .filter(|(_, s)| s.is_occupied())
            .map(|(c, _)| c.to_string())
            .collect())
    }

    async fn status(&self) -> Result<StatusReport, ApiError> {
        let turn_limit = self.turn_limit;
        let mut inner = self.lock();
        let session = inner.session.as_mut().ok_or_else(no_session)?;

        let status = session.status;
        match status {
            RemoteStatus::WaitingBot => session.status = RemoteStatus::InProgress,
            RemoteStatus::InProgress => {
                if session.should_fire && session.turn_started.elapsed() > turn_limit {
                    log::info!("[LocalServer] {} ran out of time", session.token);
                    session.end("lose");
                } else if !session.should_fire {
                    inner.bot_turn();
                }
            }
            _ => {}
        }

        let session = inner.session.as_ref().ok_or_else(no_session)?;
        let timer_seconds = if session.status == RemoteStatus::InProgress {
            turn_limit
                .saturating_sub(session.turn_started.elapsed())
                .as_secs() as u32
        } else {
            0
        };
        Ok(StatusReport {
            status: if status == RemoteStatus::WaitingBot {
                status
            } else {
                session.status
            },
            last_game_status: session.last_game_status.clone(),
            nick: session.nick.clone(),
            opponent: BOT_NICK.to_string(),
            should_fire: session.should_fire,
            timer_seconds,
            opp_shots: session.bot_shots.iter().map(|c| c.to_string()).collect(),
        })
    }

    async fn fire(&self, coord: Coord) -> Result<ShotResult, ApiError> {
        let mut inner = self.lock();
        let session = inner.session.as_mut().ok_or_else(no_session)?;
        if session.status != RemoteStatus::InProgress {
            return Err(ApiError::BadRequest("game is not in progress".to_string()));
        }
        if !session.should_fire {
            return Err(ApiError::BadRequest("it is not your turn".to_string()));
        }
        let result = resolve_shot(&mut session.bot_fleet, coord)
            .ok_or_else(|| ApiError::BadRequest(format!("{} was already fired at", coord)))?;
        match result {
            ShotResult::Miss => session.should_fire = false,
            _ if fleet_destroyed(&session.bot_fleet) => session.end("win"),
            _ => session.turn_started = Instant::now(),
        }
        Ok(result)
    }

    async fn descriptions(&self) -> Result<Descriptions, ApiError> {
        let inner = self.lock();
        let session = inner.session.as_ref().ok_or_else(no_session)?;
        Ok(Descriptions {
            desc: session.desc.clone(),
            nick: session.nick.clone(),
            opp_desc: BOT_DESC.to_string(),
            opponent: BOT_NICK.to_string(),
        })
    }

    async fn abandon(&self) -> Result<(), ApiError> {
        let mut inner = self.lock();
        let session = inner.session.as_mut().ok_or_else(no_session)?;
        if session.status != RemoteStatus::Ended {
            log::info!("[LocalServer] {} abandoned", session.token);
            session.end("abandon");
        }
        Ok(())
    }
}
