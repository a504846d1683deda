//! Embed configuration.
//!
//! Built from an optional JSON object handed in by the page; every key is
//! optional and falls back to the values below.
//!
//! | Key                 | Default                                  | Description                          |
//! |---------------------|------------------------------------------|--------------------------------------|
//! | `serviceUrl`        | `http://66.59.208.121:8100`              | Base URL of the BlueMap web server   |
//! | `origin`            | `http://66.59.208.121:8100`              | Exact origin used for `postMessage`  |
//! | `worldId`           | `world`                                  | Map whose live players are polled    |
//! | `deadlineMs`        | `5000`                                   | Load deadline before falling back    |
//! | `rosterIntervalMs`  | `30000`                                  | Roster poll period                   |
//! | `avatarUrl`         | `https://mc-heads.net/avatar/{uuid}/32`  | Avatar template, `{uuid}` substituted |
//! | `initialPosition`   | `{x: 0, y: 64, z: 0}`                    | Camera pushed on load                |
//! | `theme`             | `dark`                                   | Theme pushed on load                 |
//! | `viewTransition`    | `{transition: 500, heightTransition: 256}` | View-mode animation                |
//! | `livenessProbe`     | `loadEvent`                              | See [`LivenessProbe`]                |

use serde::{Deserialize, Serialize};

use crate::error::{EmbedError, Result};
use crate::liveness::LivenessProbe;
use crate::protocol::{Coordinates, ViewTransition};

pub const DEFAULT_SERVICE_URL: &str = "http://66.59.208.121:8100";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbedConfig {
    pub service_url: String,
    pub origin: String,
    pub world_id: String,
    pub deadline_ms: u32,
    pub roster_interval_ms: u32,
    pub avatar_url: String,
    pub initial_position: Coordinates,
    pub theme: String,
    pub view_transition: ViewTransition,
    pub liveness_probe: LivenessProbe,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.into(),
            origin: DEFAULT_SERVICE_URL.into(),
            world_id: "world".into(),
            deadline_ms: 5000,
            roster_interval_ms: 30_000,
            avatar_url: "https://mc-heads.net/avatar/{uuid}/32".into(),
            initial_position: Coordinates::default(),
            theme: "dark".into(),
            view_transition: ViewTransition::default(),
            liveness_probe: LivenessProbe::default(),
        }
    }
}

impl EmbedConfig {
    /// Parse and validate a JSON config object.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let origin = self.origin.trim();
        if origin.is_empty() {
            return Err(EmbedError::Config("origin must not be empty".into()));
        }
        if origin == "*" {
            return Err(EmbedError::Config(
                "origin must name the embed service exactly, not '*'".into(),
            ));
        }
        if self.service_url.trim().is_empty() {
            return Err(EmbedError::Config("serviceUrl must not be empty".into()));
        }
        if self.world_id.is_empty() {
            return Err(EmbedError::Config("worldId must not be empty".into()));
        }
        if self.deadline_ms == 0 {
            return Err(EmbedError::Config("deadlineMs must be positive".into()));
        }
        if self.roster_interval_ms == 0 {
            return Err(EmbedError::Config("rosterIntervalMs must be positive".into()));
        }
        Ok(())
    }

    /// `GET` target for the live player list.
    pub fn roster_url(&self) -> String {
        format!(
            "{}/maps/{}/live/players.json",
            self.service_url.trim_end_matches('/'),
            self.world_id
        )
    }

    pub fn avatar_url_for(&self, uuid: &str) -> String {
        self.avatar_url.replace("{uuid}", uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EmbedConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.deadline_ms, 5000);
        assert_eq!(config.roster_interval_ms, 30_000);
    }

    #[test]
    fn roster_url_joins_cleanly() {
        let config = EmbedConfig {
            service_url: "https://map.example.net/".into(),
            world_id: "nether".into(),
            ..Default::default()
        };
        assert_eq!(
            config.roster_url(),
            "https://map.example.net/maps/nether/live/players.json"
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EmbedConfig::from_json(r#"{"worldId":"end","deadlineMs":2500}"#).unwrap();
        assert_eq!(config.world_id, "end");
        assert_eq!(config.deadline_ms, 2500);
        assert_eq!(config.origin, DEFAULT_SERVICE_URL);
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn wildcard_origin_is_rejected() {
        let err = EmbedConfig::from_json(r#"{"origin":"*"}"#).unwrap_err();
        assert!(matches!(err, EmbedError::Config(_)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(EmbedConfig::from_json(r#"{"rosterIntervalMs":0}"#).is_err());
    }

    #[test]
    fn avatar_template() {
        let config = EmbedConfig::default();
        assert_eq!(
            config.avatar_url_for("1234"),
            "https://mc-heads.net/avatar/1234/32"
        );
    }
}
