use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crease_core::setup::{MatchSetup, SetupId};
use crease_core::store::{MatchId, MatchKey, MatchRecord, MatchStore, StoreError};

use crate::config::HttpStoreConfig;

const GAME_SETUP: &str = "/api/game-setup";
const PLAY_MATCH: &str = "/api/play-match";

/// Response envelope used by every store route.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Row returned by a create; only its id is needed.
#[derive(Debug, Deserialize)]
struct CreatedRow {
    id: MatchId,
}

#[derive(Debug, Serialize)]
struct UpdateBody<'a> {
    /// Present when the update targets a confirmed match record.
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a MatchId>,
    #[serde(flatten)]
    record: &'a MatchRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteMatchBody<'a> {
    user_id: &'a str,
    game_id: &'a SetupId,
}

#[derive(Debug, Serialize)]
struct DeleteSetupBody<'a> {
    id: &'a SetupId,
}

/// `MatchStore` backed by the store's REST routes.
pub struct HttpMatchStore {
    config: HttpStoreConfig,
    client: reqwest::Client,
}

impl HttpMatchStore {
    pub fn new(config: HttpStoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpStoreConfig {
        &self.config
    }

    /// Send `request` and unwrap the envelope, returning its `data`.
    async fn call(
        &self,
        route: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let resp = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let envelope = serde_json::from_slice::<ApiResponse>(&body);

        if !status.is_success() {
            let message = envelope
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
            tracing::debug!(route, status = status.as_u16(), %message, "Store call failed");
            return Err(StoreError::Status(status.as_u16(), message));
        }

        let envelope = envelope.map_err(|e| StoreError::Decode(e.to_string()))?;
        if !envelope.success {
            return Err(StoreError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "request rejected".to_string()),
            ));
        }
        Ok(envelope.data.filter(|d| !d.is_null()))
    }
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Decode(e.to_string()))
}

impl MatchStore for HttpMatchStore {
    async fn fetch_setup(&self, user_id: &str) -> Result<Option<MatchSetup>, StoreError> {
        let request = self
            .client
            .get(self.config.endpoint(GAME_SETUP))
            .query(&[("userId", user_id)]);
        self.call(GAME_SETUP, request)
            .await?
            .map(decode::<MatchSetup>)
            .transpose()
    }

    async fn create_match(&self, record: &MatchRecord) -> Result<MatchId, StoreError> {
        let request = self
            .client
            .post(self.config.endpoint(PLAY_MATCH))
            .json(record);
        let data = self.call(PLAY_MATCH, request).await?;
        let row: CreatedRow = decode(data.ok_or(StoreError::MissingId)?)?;
        Ok(row.id)
    }

    async fn update_match(&self, key: &MatchKey, record: &MatchRecord) -> Result<(), StoreError> {
        // Rows are located by gameId and userId, both carried in the record.
        let body = UpdateBody {
            id: match key {
                MatchKey::Match(id) => Some(id),
                MatchKey::Setup(_) => None,
            },
            record,
        };
        let request = self
            .client
            .put(self.config.endpoint(PLAY_MATCH))
            .json(&body);
        self.call(PLAY_MATCH, request).await.map(|_| ())
    }

    async fn delete_match(&self, user_id: &str, setup_id: &SetupId) -> Result<(), StoreError> {
        let request = self
            .client
            .delete(self.config.endpoint(PLAY_MATCH))
            .json(&DeleteMatchBody {
                user_id,
                game_id: setup_id,
            });
        match self.call(PLAY_MATCH, request).await {
            // The route answers 404 when no row is left, which is the goal.
            Err(StoreError::Status(404, message)) => {
                tracing::debug!(setup = %setup_id, %message, "No match record to delete");
                Ok(())
            },
            other => other.map(|_| ()),
        }
    }

    async fn delete_match_setup(&self, setup_id: &SetupId) -> Result<(), StoreError> {
        let request = self
            .client
            .delete(self.config.endpoint(GAME_SETUP))
            .json(&DeleteSetupBody { id: setup_id });
        self.call(GAME_SETUP, request).await.map(|_| ())
    }
}
