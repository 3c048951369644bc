use serde::{Deserialize, Deserializer, Serialize};

use crate::progress::{MatchProgress, MatchStatus};

/// Identifier of a match setup record, created by the team-selection flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SetupId(pub String);

impl<'de> Deserialize<'de> for SetupId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_number(deserializer).map(SetupId)
    }
}

/// Row ids arrive as strings or integers depending on the backing table.
pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

impl std::fmt::Display for SetupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Match parameters chosen before play starts. Read-only to the simulation.
///
/// Field names follow the store's `game-setup` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSetup {
    pub id: SetupId,
    pub user_id: String,
    pub your_team: String,
    pub opponent_team: String,
    /// Overs available to the batting side (six balls each).
    #[serde(rename = "overs")]
    pub overs_limit: u32,
    /// Wickets that end the innings.
    #[serde(rename = "maxPlayer")]
    pub max_wickets: u32,
    pub target: u32,
    /// Progress already recorded against this setup (resumed sessions).
    #[serde(default, deserialize_with = "null_as_zero")]
    pub score: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub balls_faced: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub wickets: u32,
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

impl MatchSetup {
    /// Check that every field needed to run a match is present and usable.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.id.0.trim().is_empty() {
            return Err(SetupError::MissingField("id"));
        }
        if self.user_id.trim().is_empty() {
            return Err(SetupError::MissingField("userId"));
        }
        if self.your_team.trim().is_empty() {
            return Err(SetupError::MissingField("yourTeam"));
        }
        if self.opponent_team.trim().is_empty() {
            return Err(SetupError::MissingField("opponentTeam"));
        }
        if self.overs_limit == 0 {
            return Err(SetupError::ZeroOvers);
        }
        if self.max_wickets == 0 {
            return Err(SetupError::ZeroWickets);
        }
        if self.target == 0 {
            return Err(SetupError::ZeroTarget);
        }
        Ok(())
    }

    /// Total deliveries available in the innings.
    pub fn total_balls(&self) -> u32 {
        self.overs_limit.saturating_mul(6)
    }

    /// Progress to resume from, taken from the counters stored on the setup.
    pub fn resume_progress(&self) -> MatchProgress {
        MatchProgress {
            balls_faced: self.balls_faced,
            total_runs: self.score,
            wickets: self.wickets,
            status: MatchStatus::OnGoing,
        }
    }
}

/// Reasons a match cannot start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// The store holds no setup for this user.
    Missing,
    MissingField(&'static str),
    ZeroOvers,
    ZeroWickets,
    ZeroTarget,
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "no match setup found; pick teams and overs first"),
            Self::MissingField(name) => write!(f, "match setup is missing `{name}`"),
            Self::ZeroOvers => write!(f, "match setup has no overs to play"),
            Self::ZeroWickets => write!(f, "match setup allows no wickets"),
            Self::ZeroTarget => write!(f, "match setup has no target"),
        }
    }
}

impl std::error::Error for SetupError {}
