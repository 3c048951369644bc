use rand::Rng;

use crease_core::events::{HitOutcome, SwingKind};

use crate::config::SwingConfig;

/// An accepted swing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingEvent {
    /// Increments with every accepted swing; end-of-window tasks carry it.
    pub seq: u64,
    pub start_ms: u64,
    pub kind: SwingKind,
    pub swinging_until_ms: u64,
    pub busy_until_ms: u64,
}

/// Tracks the player's bat: whether it is mid-swing, and whether another
/// trigger may be accepted yet.
#[derive(Debug, Default)]
pub struct SwingTracker {
    seq: u64,
    current: Option<SwingEvent>,
    swinging: bool,
    busy: bool,
    last_accepted_ms: Option<u64>,
}

impl SwingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to start a swing at `now_ms`. Returns the swing and its power roll
    /// when accepted; the caller schedules the window ends.
    pub fn trigger<R: Rng>(
        &mut self,
        kind: SwingKind,
        now_ms: u64,
        rng: &mut R,
        cfg: &SwingConfig,
    ) -> Option<(SwingEvent, HitOutcome)> {
        if self.busy {
            return None;
        }
        if let Some(last) = self.last_accepted_ms
            && now_ms.saturating_sub(last) < cfg.cooldown_ms
        {
            return None;
        }

        self.seq += 1;
        let swing = SwingEvent {
            seq: self.seq,
            start_ms: now_ms,
            kind,
            swinging_until_ms: now_ms + cfg.swinging_ms,
            busy_until_ms: now_ms + cfg.busy_ms,
        };
        self.current = Some(swing);
        self.swinging = true;
        self.busy = true;
        self.last_accepted_ms = Some(now_ms);

        let range = match kind {
            SwingKind::Shot => cfg.shot_power,
            SwingKind::Defense => cfg.defense_power,
        };
        let outcome = HitOutcome {
            kind,
            power: rng.random_range(range.min..range.max),
            exit_position: None,
        };
        Some((swing, outcome))
    }

    /// Close the hitting arc of swing `seq`. Stale sequence numbers are ignored.
    pub fn end_swinging(&mut self, seq: u64) {
        if seq == self.seq {
            self.swinging = false;
        }
    }

    /// Release the busy lock of swing `seq`. Stale sequence numbers are ignored.
    pub fn end_busy(&mut self, seq: u64) {
        if seq == self.seq {
            self.busy = false;
        }
    }

    /// The swing whose bat is currently in the hitting arc.
    pub fn active_swing(&self) -> Option<&SwingEvent> {
        self.current.as_ref().filter(|_| self.swinging)
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Number of swings accepted so far.
    pub fn accepted(&self) -> u64 {
        self.seq
    }
}
