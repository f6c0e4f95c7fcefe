use std::time::Duration;

use tokio::time::sleep;
use warships::api::{ApiError, Descriptions, GameApi, StartGame, StatusReport};
use warships::core::{Coord, ShotResult};
use warships::DeadlineApi;

/// Answers every call after `delay`.
struct SlowServer {
    delay: Duration,
}

#[async_trait::async_trait]
impl GameApi for SlowServer {
    async fn start_game(&self, _request: &StartGame) -> Result<String, ApiError> {
        sleep(self.delay).await;
        Ok("token".into())
    }

    async fn board(&self) -> Result<Vec<String>, ApiError> {
        sleep(self.delay).await;
        Ok(vec!["A1".into()])
    }

    async fn status(&self) -> Result<StatusReport, ApiError> {
        sleep(self.delay).await;
        Ok(StatusReport::default())
    }

    async fn fire(&self, _coord: Coord) -> Result<ShotResult, ApiError> {
        sleep(self.delay).await;
        Ok(ShotResult::Miss)
    }

    async fn descriptions(&self) -> Result<Descriptions, ApiError> {
        sleep(self.delay).await;
        Ok(Descriptions::default())
    }

    async fn abandon(&self) -> Result<(), ApiError> {
        sleep(self.delay).await;
        Err(ApiError::NotFound("no game".into()))
    }
}

#[tokio::test(start_paused = true)]
async fn slow_calls_time_out() {
    let limit = Duration::from_secs(10);
    let api = DeadlineApi::new(
        SlowServer {
            delay: Duration::from_secs(30),
        },
        limit,
    );
    assert_eq!(api.status().await, Err(ApiError::Timeout(limit)));
    assert_eq!(
        api.fire("B3".parse().unwrap()).await,
        Err(ApiError::Timeout(limit))
    );
    assert_eq!(api.abandon().await, Err(ApiError::Timeout(limit)));
}

#[tokio::test(start_paused = true)]
async fn fast_calls_pass_through_unchanged() {
    let api = DeadlineApi::new(
        SlowServer {
            delay: Duration::from_millis(50),
        },
        Duration::from_secs(10),
    );
    assert_eq!(api.board().await.unwrap(), vec!["A1".to_string()]);
    assert_eq!(api.fire("B3".parse().unwrap()).await, Ok(ShotResult::Miss));
    assert!(matches!(api.abandon().await, Err(ApiError::NotFound(_))));
    assert_eq!(api.limit(), Duration::from_secs(10));
}
