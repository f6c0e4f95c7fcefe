//! The game server as the client sees it.
//!
//! [`GameApi`] is the capability the round tasks consume. Wire types mirror
//! the server's JSON field names so an HTTP implementation can decode
//! straight into them.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{Coord, ShotResult};

pub mod deadline;
pub mod local;

pub use deadline::DeadlineApi;
pub use local::LocalServer;

/// Transport and protocol failures. None of these end a round on their own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unexpected API error: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Classify a non-success HTTP status and its message.
    pub fn from_status(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited(message),
            _ => ApiError::Unexpected(format!("status {}: {}", code, message)),
        }
    }
}

/// Game status as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RemoteStatus {
    #[serde(rename = "waiting")]
    Waiting,
    #[serde(rename = "waiting_wpbot")]
    WaitingBot,
    #[serde(rename = "game_in_progress")]
    InProgress,
    #[serde(rename = "ended")]
    Ended,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Response to a status poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusReport {
    #[serde(rename = "game_status")]
    pub status: RemoteStatus,
    pub last_game_status: String,
    pub nick: String,
    pub opponent: String,
    pub should_fire: bool,
    #[serde(rename = "timer")]
    pub timer_seconds: u32,
    pub opp_shots: Vec<String>,
}

/// Body of a start-game request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartGame {
    pub coords: Vec<String>,
    pub desc: String,
    pub nick: String,
    pub target_nick: String,
    pub wpbot: bool,
}

impl StartGame {
    pub fn new(nick: &str, desc: &str, target_nick: &str, coords: &[Coord], vs_bot: bool) -> Self {
        Self {
            coords: coords.iter().map(|c| c.to_string()).collect(),
            desc: desc.to_string(),
            nick: nick.to_string(),
            target_nick: target_nick.to_string(),
            wpbot: vs_bot,
        }
    }
}

/// Response to a fire request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireResponse {
    pub result: ShotResult,
}

/// Free-text descriptions of both players.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Descriptions {
    pub desc: String,
    pub nick: String,
    pub opp_desc: String,
    pub opponent: String,
}

/// Operations the client needs from the game server. Methods take `&self`
/// so one instance can be shared by every round task.
#[async_trait::async_trait]
pub trait GameApi: Send + Sync {
    /// Open a session; returns the session token.
    async fn start_game(&self, request: &StartGame) -> Result<String, ApiError>;
    /// Ship coordinates the server committed for us.
    async fn board(&self) -> Result<Vec<String>, ApiError>;
    async fn status(&self) -> Result<StatusReport, ApiError>;
    async fn fire(&self, coord: Coord) -> Result<ShotResult, ApiError>;
    async fn descriptions(&self) -> Result<Descriptions, ApiError>;
    async fn abandon(&self) -> Result<(), ApiError>;
}

#[async_trait::async_trait]
impl<A: GameApi + ?Sized> GameApi for Arc<A> {
    async fn start_game(&self, request: &StartGame) -> Result<String, ApiError> {
        (**self).start_game(request).await
    }

    async fn board(&self) -> Result<Vec<String>, ApiError> {
        (**self).board().await
    }

    async fn status(&self) -> Result<StatusReport, ApiError> {
        (**self).status().await
    }

    async fn fire(&self, coord: Coord) -> Result<ShotResult, ApiError> {
        (**self).fire(coord).await
    }

    async fn descriptions(&self) -> Result<Descriptions, ApiError> {
        (**self).descriptions().await
    }

    async fn abandon(&self) -> Result<(), ApiError> {
        (**self).abandon().await
    }
}
