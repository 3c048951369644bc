use serde::Deserialize;

use crease_core::setup::{MatchSetup, SetupId};
use crease_http::HttpStoreConfig;

const CONFIG_PATH: &str = "crease.toml";

/// Top-level runner configuration, loaded from `crease.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Player whose match setup is fetched and whose records are written.
    pub user_id: String,
    pub tick_rate_hz: u32,
    /// Remote store. When absent the match runs offline against an
    /// in-memory store seeded from `offline`.
    pub store: Option<HttpStoreConfig>,
    pub offline: OfflineSetup,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            user_id: "local-player".to_string(),
            tick_rate_hz: 60,
            store: None,
            offline: OfflineSetup::default(),
        }
    }
}

/// Match parameters used when no remote store is configured.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OfflineSetup {
    pub your_team: String,
    pub opponent_team: String,
    pub overs: u32,
    pub max_wickets: u32,
    pub target: u32,
}

impl Default for OfflineSetup {
    fn default() -> Self {
        Self {
            your_team: "India".to_string(),
            opponent_team: "Australia".to_string(),
            overs: 2,
            max_wickets: 3,
            target: 24,
        }
    }
}

impl OfflineSetup {
    pub fn to_setup(&self, user_id: &str) -> MatchSetup {
        MatchSetup {
            id: SetupId("offline".to_string()),
            user_id: user_id.to_string(),
            your_team: self.your_team.clone(),
            opponent_team: self.opponent_team.clone(),
            overs_limit: self.overs,
            max_wickets: self.max_wickets,
            target: self.target,
            score: 0,
            balls_faced: 0,
            wickets: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyUserId,
    TickRate(u32),
    StoreUrl(String),
    ZeroTimeout,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUserId => write!(f, "user_id must not be empty"),
            Self::TickRate(hz) => write!(f, "tick_rate_hz must be between 1 and 240, got {hz}"),
            Self::StoreUrl(url) => write!(f, "store.base_url is not an http(s) URL: {url}"),
            Self::ZeroTimeout => write!(f, "store.timeout_secs must be greater than 0"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl RunnerConfig {
    /// Check values that would otherwise fail at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_id.trim().is_empty() {
            return Err(ConfigError::EmptyUserId);
        }
        if !(1..=240).contains(&self.tick_rate_hz) {
            return Err(ConfigError::TickRate(self.tick_rate_hz));
        }
        if let Some(store) = &self.store {
            if !store.base_url.starts_with("http://") && !store.base_url.starts_with("https://") {
                return Err(ConfigError::StoreUrl(store.base_url.clone()));
            }
            if store.timeout_secs == 0 {
                return Err(ConfigError::ZeroTimeout);
            }
        }
        Ok(())
    }

    /// Load from `crease.toml` if present, then apply `CREASE_*` overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string(CONFIG_PATH) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(c) => {
                    tracing::info!("Loaded config from {CONFIG_PATH}");
                    c
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {CONFIG_PATH}: {e}, using defaults");
                    Self::default()
                },
            },
            Err(_) => {
                tracing::info!("No {CONFIG_PATH} found, using defaults");
                Self::default()
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(user) = var("CREASE_USER_ID")
            && !user.is_empty()
        {
            self.user_id = user;
        }
        if let Some(url) = var("CREASE_STORE_URL")
            && !url.is_empty()
        {
            match &mut self.store {
                Some(store) => store.base_url = url,
                None => self.store = Some(HttpStoreConfig::new(url)),
            }
        }
        if let Some(val) = var("CREASE_TICK_RATE")
            && let Ok(hz) = val.parse::<u32>()
        {
            self.tick_rate_hz = hz;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = RunnerConfig::default();
        assert_eq!(cfg.tick_rate_hz, 60);
        assert!(cfg.store.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
user_id = "player-9"
tick_rate_hz = 30

[store]
base_url = "https://crease.example"
timeout_secs = 5

[offline]
your_team = "England"
target = 50
"#;
        let cfg: RunnerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.user_id, "player-9");
        assert_eq!(cfg.tick_rate_hz, 30);
        let store = cfg.store.unwrap();
        assert_eq!(store.base_url, "https://crease.example");
        assert_eq!(store.timeout_secs, 5);
        assert_eq!(cfg.offline.your_team, "England");
        assert_eq!(cfg.offline.target, 50);
        assert_eq!(cfg.offline.overs, 2);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = RunnerConfig {
            user_id: "  ".to_string(),
            ..RunnerConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyUserId));

        let cfg = RunnerConfig {
            tick_rate_hz: 0,
            ..RunnerConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::TickRate(0)));

        let cfg = RunnerConfig {
            store: Some(HttpStoreConfig::new("ftp://nope")),
            ..RunnerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::StoreUrl(_))));

        let mut store = HttpStoreConfig::new("http://localhost:3000");
        store.timeout_secs = 0;
        let cfg = RunnerConfig {
            store: Some(store),
            ..RunnerConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = RunnerConfig::default();
        cfg.apply_overrides(|key| match key {
            "CREASE_USER_ID" => Some("from-env".to_string()),
            "CREASE_STORE_URL" => Some("http://store:3000".to_string()),
            "CREASE_TICK_RATE" => Some("not-a-number".to_string()),
            _ => None,
        });
        assert_eq!(cfg.user_id, "from-env");
        assert_eq!(cfg.store.unwrap().base_url, "http://store:3000");
        assert_eq!(cfg.tick_rate_hz, 60);
    }

    #[test]
    fn offline_setup_is_valid_by_default() {
        let setup = OfflineSetup::default().to_setup("me");
        assert_eq!(setup.user_id, "me");
        assert!(setup.validate().is_ok());
    }
}
