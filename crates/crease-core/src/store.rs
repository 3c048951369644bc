use std::future::Future;

use serde::{Deserialize, Deserializer, Serialize};

use crate::progress::{MatchProgress, MatchStatus};
use crate::setup::{MatchSetup, SetupId, string_or_number};

/// Identifier of a persisted match record, assigned by the store on create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MatchId(pub String);

impl<'de> Deserialize<'de> for MatchId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_number(deserializer).map(MatchId)
    }
}

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which record an update targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchKey {
    /// The record returned by a confirmed create.
    Match(MatchId),
    /// The record created for this setup, when the create was never confirmed.
    Setup(SetupId),
}

/// Status vocabulary of the store. It has no separate value for a lost match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoredStatus {
    Ongoing,
    Achieved,
    NotAchieved,
}

impl From<MatchStatus> for StoredStatus {
    fn from(status: MatchStatus) -> Self {
        match status {
            MatchStatus::OnGoing => Self::Ongoing,
            MatchStatus::Achieved => Self::Achieved,
            MatchStatus::NotAchieved | MatchStatus::Lost => Self::NotAchieved,
        }
    }
}

/// Body of a create or update call against the `play-match` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub game_id: SetupId,
    pub user_id: String,
    pub your_team: String,
    pub opponent_team: String,
    /// Overs notation (`completed.balls`).
    pub overs: f64,
    pub target: u32,
    pub status: StoredStatus,
    pub wickets: u32,
    pub score: u32,
    pub balls_faced: u32,
}

impl MatchRecord {
    pub fn new(setup: &MatchSetup, progress: &MatchProgress) -> Self {
        Self {
            game_id: setup.id.clone(),
            user_id: setup.user_id.clone(),
            your_team: setup.your_team.clone(),
            opponent_team: setup.opponent_team.clone(),
            overs: progress.overs(),
            target: setup.target,
            status: progress.status.into(),
            wickets: progress.wickets,
            score: progress.total_runs,
            balls_faced: progress.balls_faced,
        }
    }
}

/// Failure talking to the match-record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The request never produced a response.
    Transport(String),
    /// Non-success HTTP status, with whatever message the body carried.
    Status(u16, String),
    /// The envelope reported `success: false`.
    Rejected(String),
    /// The response body could not be understood.
    Decode(String),
    /// A create succeeded but returned no record id.
    MissingId,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "store unreachable: {msg}"),
            Self::Status(code, msg) => write!(f, "store returned HTTP {code}: {msg}"),
            Self::Rejected(msg) => write!(f, "store rejected request: {msg}"),
            Self::Decode(msg) => write!(f, "could not decode store response: {msg}"),
            Self::MissingId => write!(f, "store did not return a match id"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Remote match-record store.
///
/// Calls are awaited one at a time by a single persistence task, so
/// implementations need not order concurrent requests.
pub trait MatchStore: Send + Sync {
    /// Latest setup chosen by `user_id`, if any.
    fn fetch_setup(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<MatchSetup>, StoreError>> + Send;

    fn create_match(
        &self,
        record: &MatchRecord,
    ) -> impl Future<Output = Result<MatchId, StoreError>> + Send;

    fn update_match(
        &self,
        key: &MatchKey,
        record: &MatchRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove the match record `user_id` played against `setup_id`.
    fn delete_match(
        &self,
        user_id: &str,
        setup_id: &SetupId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove the setup once its match has a result.
    fn delete_match_setup(
        &self,
        setup_id: &SetupId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
