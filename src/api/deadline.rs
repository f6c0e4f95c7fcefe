use std::future::Future;

use tokio::time::{timeout, Duration};

use super::{ApiError, Descriptions, GameApi, StartGame, StatusReport};
use crate::core::{Coord, ShotResult};

/// Wrapper that bounds every call on the inner API by a fixed deadline.
///
/// An expired call resolves to [`ApiError::Timeout`]; the inner future is
/// dropped, so nothing it would have returned reaches the caller.
pub struct DeadlineApi<A: GameApi> {
    inner: A,
    limit: Duration,
}

impl<A: GameApi> DeadlineApi<A> {
    /// # Arguments
    /// * `inner` - The API to wrap
    /// * `limit` - Upper bound on the duration of any single call
    pub fn new(inner: A, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    async fn bounded<T, F>(&self, call: &'static str, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>> + Send,
    {
        match timeout(self.limit, fut).await {
            Ok(res) => res,
            Err(_) => {
                log::warn!("[DeadlineApi] {} exceeded {:?}", call, self.limit);
                Err(ApiError::Timeout(self.limit))
            }
        }
    }
}

#[async_trait::async_trait]
impl<A: GameApi> GameApi for DeadlineApi<A> {
    async fn start_game(&self, request: &StartGame) -> Result<String, ApiError> {
        self.bounded("start_game", self.inner.start_game(request)).await
    }

    async fn board(&self) -> Result<Vec<String>, ApiError> {
        self.bounded("board", self.inner.board()).await
    }

    async fn status(&self) -> Result<StatusReport, ApiError> {
        self.bounded("status", self.inner.status()).await
    }

    async fn fire(&self, coord: Coord) -> Result<ShotResult, ApiError> {
        self.bounded("fire", self.inner.fire(coord)).await
    }

    async fn descriptions(&self) -> Result<Descriptions, ApiError> {
        self.bounded("descriptions", self.inner.descriptions()).await
    }

    async fn abandon(&self) -> Result<(), ApiError> {
        self.bounded("abandon", self.inner.abandon()).await
    }
}
