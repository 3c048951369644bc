use crease_core::progress::{MatchProgress, MatchStatus};
use crease_core::setup::MatchSetup;

/// Result of applying one change to the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Applied {
    /// Whether any counter moved.
    pub changed: bool,
    /// Set on the change that ended the match.
    pub finished: Option<MatchStatus>,
}

/// Owns the innings counters and decides when the chase is over.
///
/// Every mutation is ignored once the status is terminal.
#[derive(Debug, Clone)]
pub struct MatchStateMachine {
    target: u32,
    total_balls: u32,
    max_wickets: u32,
    progress: MatchProgress,
    /// A faced delivery that has not yet resolved.
    delivery_live: bool,
}

impl MatchStateMachine {
    pub fn new(setup: &MatchSetup) -> Self {
        Self::resume(setup, setup.resume_progress())
    }

    /// Continue from previously recorded counters.
    pub fn resume(setup: &MatchSetup, progress: MatchProgress) -> Self {
        let mut machine = Self {
            target: setup.target,
            total_balls: setup.total_balls(),
            max_wickets: setup.max_wickets,
            progress: MatchProgress {
                status: MatchStatus::OnGoing,
                ..progress
            },
            delivery_live: false,
        };
        machine.progress.status = machine.evaluate();
        machine
    }

    pub fn progress(&self) -> &MatchProgress {
        &self.progress
    }

    pub fn status(&self) -> MatchStatus {
        self.progress.status
    }

    pub fn is_finished(&self) -> bool {
        self.progress.status.is_terminal()
    }

    pub fn balls_remaining(&self) -> u32 {
        self.total_balls.saturating_sub(self.progress.balls_faced)
    }

    /// A delivery crossed the crease; it stays live until resolved.
    pub fn ball_faced(&mut self) -> Applied {
        self.apply(|m| {
            m.progress.balls_faced += 1;
            m.delivery_live = true;
            true
        })
    }

    pub fn add_runs(&mut self, runs: u32) -> Applied {
        self.apply(|m| {
            m.progress.total_runs += runs;
            runs > 0
        })
    }

    pub fn add_wicket(&mut self) -> Applied {
        self.apply(|m| {
            m.progress.wickets += 1;
            true
        })
    }

    /// The live delivery is over (runs scored, wicket, or dead ball).
    pub fn delivery_resolved(&mut self) -> Applied {
        self.apply(|m| {
            m.delivery_live = false;
            false
        })
    }

    fn apply(&mut self, change: impl FnOnce(&mut Self) -> bool) -> Applied {
        if self.is_finished() {
            return Applied::default();
        }
        let changed = change(self);
        let status = self.evaluate();
        self.progress.status = status;
        Applied {
            changed,
            finished: status.is_terminal().then_some(status),
        }
    }

    fn evaluate(&self) -> MatchStatus {
        let p = &self.progress;
        if p.total_runs >= self.target {
            MatchStatus::Achieved
        } else if self.balls_remaining() == 0 {
            // The last ball's runs still count until it resolves.
            if self.delivery_live {
                MatchStatus::OnGoing
            } else {
                MatchStatus::NotAchieved
            }
        } else if p.wickets >= self.max_wickets {
            MatchStatus::Lost
        } else {
            MatchStatus::OnGoing
        }
    }
}
