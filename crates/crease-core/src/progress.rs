use serde::{Deserialize, Serialize};

use crate::setup::MatchSetup;

/// Balls in one over.
pub const BALLS_PER_OVER: u32 = 6;

/// Result state of the chase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    OnGoing,
    /// Target reached.
    Achieved,
    /// Balls ran out before the target was reached.
    NotAchieved,
    /// All permitted wickets fell.
    Lost,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::OnGoing)
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OnGoing => "ON_GOING",
            Self::Achieved => "ACHIEVED",
            Self::NotAchieved => "NOT_ACHIEVED",
            Self::Lost => "LOST",
        };
        f.write_str(s)
    }
}

/// Cumulative innings state. Owned and mutated only by the match state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchProgress {
    pub balls_faced: u32,
    pub total_runs: u32,
    pub wickets: u32,
    pub status: MatchStatus,
}

impl MatchProgress {
    /// Overs in `completed.balls` notation, e.g. 14 balls -> 2.2.
    pub fn overs(&self) -> f64 {
        overs_notation(self.balls_faced)
    }

    /// The counters whose change is worth mirroring remotely.
    pub fn tally(&self) -> Tally {
        Tally {
            runs: self.total_runs,
            balls_faced: self.balls_faced,
            wickets: self.wickets,
        }
    }
}

/// Runs, balls and wickets without the status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Tally {
    pub runs: u32,
    pub balls_faced: u32,
    pub wickets: u32,
}

/// `floor(balls / 6) + (balls % 6) / 10`: a decimal label, not fractional overs.
///
/// Computed as an integer number of tenths divided by ten so the value is the
/// nearest double to the printed label (`2.2`, not `2.2000000000000002`).
pub fn overs_notation(balls_faced: u32) -> f64 {
    let completed = u64::from(balls_faced / BALLS_PER_OVER);
    let in_over = u64::from(balls_faced % BALLS_PER_OVER);
    (completed * 10 + in_over) as f64 / 10.0
}

/// The same notation as text, for display.
pub fn overs_label(balls_faced: u32) -> String {
    format!(
        "{}.{}",
        balls_faced / BALLS_PER_OVER,
        balls_faced % BALLS_PER_OVER
    )
}

/// Scoreboard figures derived from the setup and current progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    pub batting: String,
    pub bowling: String,
    pub target: u32,
    pub score: u32,
    pub overs: String,
    pub balls_left: u32,
    pub wickets_left: u32,
    pub status: MatchStatus,
}

impl Scoreboard {
    pub fn new(setup: &MatchSetup, progress: &MatchProgress) -> Self {
        Self {
            batting: setup.your_team.clone(),
            bowling: setup.opponent_team.clone(),
            target: setup.target,
            score: progress.total_runs,
            overs: overs_label(progress.balls_faced),
            balls_left: setup.total_balls().saturating_sub(progress.balls_faced),
            wickets_left: setup.max_wickets.saturating_sub(progress.wickets),
            status: progress.status,
        }
    }
}

impl std::fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} v {} | {} of {} | overs {} | balls left {} | wickets left {}",
            self.batting,
            self.bowling,
            self.score,
            self.target,
            self.overs,
            self.balls_left,
            self.wickets_left
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::SetupId;

    #[test]
    fn overs_notation_matches_label() {
        assert_eq!(overs_notation(0), 0.0);
        assert_eq!(overs_notation(5), 0.5);
        assert_eq!(overs_notation(6), 1.0);
        assert_eq!(overs_notation(14), 2.2);
        assert_eq!(overs_notation(59), 9.5);
        for balls in 0..600 {
            let parsed: f64 = overs_label(balls).parse().unwrap();
            assert_eq!(overs_notation(balls), parsed, "balls = {balls}");
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(!MatchStatus::OnGoing.is_terminal());
        assert!(MatchStatus::Achieved.is_terminal());
        assert!(MatchStatus::NotAchieved.is_terminal());
        assert!(MatchStatus::Lost.is_terminal());
    }

    #[test]
    fn status_serializes_screaming() {
        let s = serde_json::to_string(&MatchStatus::NotAchieved).unwrap();
        assert_eq!(s, "\"NOT_ACHIEVED\"");
        assert_eq!(MatchStatus::OnGoing.to_string(), "ON_GOING");
    }

    #[test]
    fn scoreboard_counts_down() {
        let setup = MatchSetup {
            id: SetupId("s".to_string()),
            user_id: "u".to_string(),
            your_team: "India".to_string(),
            opponent_team: "Australia".to_string(),
            overs_limit: 2,
            max_wickets: 3,
            target: 20,
            score: 0,
            balls_faced: 0,
            wickets: 0,
        };
        let progress = MatchProgress {
            balls_faced: 8,
            total_runs: 11,
            wickets: 1,
            status: MatchStatus::OnGoing,
        };
        let board = Scoreboard::new(&setup, &progress);
        assert_eq!(board.overs, "1.2");
        assert_eq!(board.balls_left, 4);
        assert_eq!(board.wickets_left, 2);
        assert_eq!(board.score, 11);
    }
}
