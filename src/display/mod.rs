//! Display collaborator: where snapshots go and where coordinates come from.

use tokio::sync::mpsc;

use crate::api::StatusReport;
use crate::core::Coord;
use crate::state::StateSnapshot;

pub mod console;

pub use console::{ConsoleDisplay, ConsoleInput};

/// Receives everything the round wants shown. Calls must return quickly;
/// they run on the render feed tasks.
pub trait DisplaySink: Send + Sync {
    /// Turn indicator, timer, nicknames.
    fn show_status(&self, status: &StatusReport);
    /// Both boards, accuracy, descriptions and the sunk-ship tally.
    fn show_state(&self, snapshot: &StateSnapshot);
    /// One log line.
    fn log(&self, line: &str);
}

/// A stream of coordinates picked by the user.
#[async_trait::async_trait]
pub trait CoordSource: Send {
    /// Next coordinate, or `None` once the source is exhausted.
    async fn next_coord(&mut self) -> Option<Coord>;
}

#[async_trait::async_trait]
impl CoordSource for mpsc::Receiver<Coord> {
    async fn next_coord(&mut self) -> Option<Coord> {
        self.recv().await
    }
}

#[async_trait::async_trait]
impl<S: CoordSource + ?Sized> CoordSource for Box<S> {
    async fn next_coord(&mut self) -> Option<Coord> {
        (**self).next_coord().await
    }
}
