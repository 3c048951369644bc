use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;
use crate::progress::{MatchProgress, MatchStatus};

/// The two bat actions a player can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwingKind {
    /// Attacking shot, triggered by `attack`.
    Shot,
    /// Defensive block, triggered by `defend`.
    Defense,
}

impl std::fmt::Display for SwingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shot => f.write_str("SHOT"),
            Self::Defense => f.write_str("DEFENSE"),
        }
    }
}

/// What an accepted swing would do to the ball if it connects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitOutcome {
    pub kind: SwingKind,
    pub power: f32,
    /// Where the ball left play; set once the hit resolves.
    pub exit_position: Option<Vec3>,
}

/// Events emitted by one simulation tick, in the order they happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    /// The pre-start countdown ran out; bowling begins.
    Ready,
    /// A ball was released.
    DeliveryStarted { delivery: u32, profile: String },
    /// First accepted swing of the session.
    MatchStarted,
    SwingAccepted { kind: SwingKind, power: f32, at_ms: u64 },
    /// The ball crossed the batting crease.
    BallFaced { delivery: u32, balls_faced: u32 },
    BatContact { kind: SwingKind, position: Vec3 },
    RunsScored {
        runs: u32,
        total_runs: u32,
        outcome: HitOutcome,
        peak_height: f32,
    },
    Wicket { wickets: u32 },
    /// Ball parked off-scene, waiting for the next delivery.
    DeliveryDead { delivery: u32 },
    ProgressChanged(MatchProgress),
    MatchFinished {
        status: MatchStatus,
        progress: MatchProgress,
    },
    /// Result display delay elapsed after the match finished.
    Archived,
}
