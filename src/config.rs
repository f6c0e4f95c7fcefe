//! Runtime settings for a client session.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

const DEFAULT_POLL_MS: u64 = 500;
const DEFAULT_PUBLISH_MS: u64 = 100;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_CHANNEL_CAPACITY: usize = 8;

/// Timings and buffer sizes for the round tasks. Missing fields in a config
/// file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// How often the status poller asks the server for the game status.
    pub poll_interval_ms: u64,
    /// How often the state publisher pushes a snapshot to the display.
    pub publish_interval_ms: u64,
    /// Deadline applied to every server call.
    pub request_timeout_ms: u64,
    /// Capacity of each bounded channel between round tasks.
    pub channel_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_MS,
            publish_interval_ms: DEFAULT_PUBLISH_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ClientConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: ClientConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would stall the round tasks.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval_ms == 0 || self.publish_interval_ms == 0 {
            anyhow::bail!("poll and publish intervals must be non-zero");
        }
        if self.request_timeout_ms == 0 {
            anyhow::bail!("request timeout must be non-zero");
        }
        if self.channel_capacity == 0 {
            anyhow::bail!("channel capacity must be at least 1");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ClientConfig::from_json(r#"{"poll_interval_ms": 250}"#).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.publish_interval(), Duration::from_millis(100));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.channel_capacity, 8);
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(ClientConfig::from_json(r#"{"channel_capacity": 0}"#).is_err());
    }
}
