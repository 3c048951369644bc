pub mod events;
pub mod geometry;
pub mod memory_store;
pub mod progress;
pub mod schedule;
pub mod setup;
pub mod store;
pub mod sync;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::progress::{MatchProgress, MatchStatus};
    use crate::setup::{MatchSetup, SetupId};

    /// India chasing 20 against Australia in 2 overs with 3 wickets.
    pub fn sample_setup() -> MatchSetup {
        MatchSetup {
            id: SetupId("setup-1".to_string()),
            user_id: "user-1".to_string(),
            your_team: "India".to_string(),
            opponent_team: "Australia".to_string(),
            overs_limit: 2,
            max_wickets: 3,
            target: 20,
            score: 0,
            balls_faced: 0,
            wickets: 0,
        }
    }

    /// Setup with the given limits and the sample teams.
    pub fn setup_with(overs_limit: u32, max_wickets: u32, target: u32) -> MatchSetup {
        MatchSetup {
            overs_limit,
            max_wickets,
            target,
            ..sample_setup()
        }
    }

    /// Ongoing progress with the given counters.
    pub fn progress(balls_faced: u32, total_runs: u32, wickets: u32) -> MatchProgress {
        MatchProgress {
            balls_faced,
            total_runs,
            wickets,
            status: MatchStatus::OnGoing,
        }
    }
}
