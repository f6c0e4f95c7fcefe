pub mod api;
pub mod client;
pub mod config;
pub mod core;
pub mod display;
pub mod interrupt;
mod logging;
pub mod round;
pub mod state;

pub use api::{ApiError, DeadlineApi, GameApi, LocalServer, RemoteStatus, StatusReport};
pub use client::{place_fleet, Client, GameRequest};
pub use config::ClientConfig;
pub use crate::core::{CellState, Coord, Grid, ShotResult};
pub use display::{ConsoleDisplay, ConsoleInput, CoordSource, DisplaySink};
pub use interrupt::Interrupts;
pub use logging::init_logging;
pub use round::{CancelSignal, EndReason, Round, RoundPhase, RoundSummary};
pub use state::{GameState, StateSnapshot};
