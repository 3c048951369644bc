use serde::{Deserialize, Serialize};

/// Connection settings for the remote match-record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpStoreConfig {
    /// Origin serving the `/api/...` routes, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 10,
            user_agent: "crease-http/0.1".to_string(),
        }
    }
}

impl HttpStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Full URL for an `/api/...` path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let cfg = HttpStoreConfig::new("http://store.local/");
        assert_eq!(
            cfg.endpoint("/api/play-match"),
            "http://store.local/api/play-match"
        );
    }

    #[test]
    fn defaults() {
        let cfg = HttpStoreConfig::default();
        assert_eq!(cfg.timeout_secs, 10);
        assert!(cfg.base_url.starts_with("http://"));
    }
}
