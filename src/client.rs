//! Session driver: set up a game, run the round, repeat.

use std::sync::Arc;

use anyhow::{anyhow, Context};

use crate::api::{DeadlineApi, GameApi, StartGame};
use crate::config::ClientConfig;
use crate::core::{
    commit_ship, config::FLEET, parse_coords, validate_placement, CellState, Coord, Grid,
};
use crate::display::{CoordSource, DisplaySink};
use crate::round::{Round, RoundSummary};
use crate::state::GameState;

/// Who to play and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameRequest {
    pub nick: String,
    pub description: String,
    /// Specific opponent to challenge; empty for any.
    pub target_nick: String,
    pub vs_bot: bool,
}

/// Ask the player for every ship of the fleet, largest first. A candidate
/// that fails validation is discarded and the same ship is asked for again.
/// Accepted ships are written to the player board as they are placed.
pub async fn place_fleet(
    input: &mut (dyn CoordSource + '_),
    display: &dyn DisplaySink,
    state: &GameState,
) -> anyhow::Result<Vec<Coord>> {
    let mut committed = Grid::new();
    for class in FLEET.iter() {
        for n in 1..=class.count() {
            loop {
                display.log(&format!(
                    "Place ship {}/{} of length {}",
                    n,
                    class.count(),
                    class.length()
                ));
                let mut coords = Vec::with_capacity(class.length());
                while coords.len() < class.length() {
                    let c = input
                        .next_coord()
                        .await
                        .ok_or_else(|| anyhow!("input closed during ship placement"))?;
                    coords.push(c);
                }
                match validate_placement(&coords, &committed) {
                    Ok(()) => {
                        commit_ship(&mut committed, &coords);
                        for &c in &coords {
                            state.add_ship(c);
                        }
                        display.show_state(&state.snapshot());
                        break;
                    }
                    Err(e) => display.log(&format!("Invalid placement ({}), try again", e)),
                }
            }
        }
    }
    Ok(state.player_ship_coords())
}

/// Owns the shared state and the server handle across rounds.
pub struct Client {
    api: Arc<dyn GameApi>,
    state: Arc<GameState>,
    display: Arc<dyn DisplaySink>,
    config: ClientConfig,
}

impl Client {
    /// Every server call made through this client is bounded by the
    /// configured request timeout.
    pub fn new<A>(api: A, display: Arc<dyn DisplaySink>, config: ClientConfig) -> Self
    where
        A: GameApi + 'static,
    {
        let api: Arc<dyn GameApi> = Arc::new(DeadlineApi::new(api, config.request_timeout()));
        Self {
            api,
            state: Arc::new(GameState::new()),
            display,
            config,
        }
    }

    pub fn state(&self) -> Arc<GameState> {
        self.state.clone()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Prepare a new game: reset local state, optionally place ships
    /// interactively, start the game and load the board the server
    /// committed. Without `placement` the server picks the fleet.
    pub async fn setup(
        &self,
        request: &GameRequest,
        placement: Option<&mut (dyn CoordSource + '_)>,
    ) -> anyhow::Result<String> {
        self.state.clear_state();
        self.state.set_player_info(&request.nick, &request.description);

        let coords = match placement {
            Some(input) => place_fleet(input, self.display.as_ref(), &self.state).await?,
            None => Vec::new(),
        };

        let start = StartGame::new(
            &request.nick,
            &request.description,
            &request.target_nick,
            &coords,
            request.vs_bot,
        );
        let token = self.api.start_game(&start).await.context("starting game")?;
        log::info!("[Client] game started ({})", token);

        match self.api.board().await {
            Ok(raw) => match parse_coords(&raw) {
                Ok(ships) => {
                    self.state
                        .update_player_board(Grid::from_coords(ships, CellState::Ship));
                }
                Err(e) => self.display.log(&format!("Error: malformed board: {}", e)),
            },
            Err(e) => self.display.log(&format!("Error: {}", e)),
        }
        match self.api.descriptions().await {
            Ok(d) => {
                self.state.update_nicknames(&d.nick, &d.opponent);
                self.state.update_descriptions(&d.desc, &d.opp_desc);
            }
            Err(e) => self.display.log(&format!("Error: {}", e)),
        }
        Ok(token)
    }

    /// Start the round tasks for a game that has been set up.
    pub fn launch<I>(&self, input: I) -> Round
    where
        I: CoordSource + 'static,
    {
        Round::spawn(
            self.api.clone(),
            self.state.clone(),
            self.display.clone(),
            input,
            &self.config,
        )
    }

    /// Set up, run and join one round.
    pub async fn play_round<I>(
        &self,
        request: &GameRequest,
        placement: Option<&mut (dyn CoordSource + '_)>,
        input: I,
    ) -> anyhow::Result<RoundSummary>
    where
        I: CoordSource + 'static,
    {
        self.setup(request, placement).await?;
        let summary = self.launch(input).join().await;
        log::info!(
            "[Client] round over ({:?}): {}",
            summary.reason,
            summary.last_game_status
        );
        Ok(summary)
    }
}
