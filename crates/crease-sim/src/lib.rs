pub mod collision;
pub mod config;
pub mod delivery;
pub mod match_state;
pub mod scoring;
pub mod swing;
pub mod trajectory;

use rand::Rng;

use crease_core::events::{HitOutcome, MatchEvent, SwingKind};
use crease_core::progress::{MatchProgress, MatchStatus, Scoreboard};
use crease_core::schedule::{Epoch, Scheduler};
use crease_core::setup::MatchSetup;

use collision::Collision;
use config::SimConfig;
use match_state::{Applied, MatchStateMachine};
use swing::SwingTracker;
use trajectory::{Ball, BallState};

/// Player triggers sampled for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub attack: bool,
    pub defend: bool,
}

impl TickInput {
    pub const NONE: Self = Self {
        attack: false,
        defend: false,
    };
    pub const ATTACK: Self = Self {
        attack: true,
        defend: false,
    };
    pub const DEFEND: Self = Self {
        attack: false,
        defend: true,
    };
}

/// Delayed continuations. The epoch each is scheduled with says which swing,
/// delivery or wicket it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    /// Countdown over.
    Ready,
    EndSwinging,
    EndBusy,
    /// Release the next delivery (epoch: the delivery that just ended).
    ResetDelivery,
    /// Drop the broken-stumps indicator (epoch: wicket count when raised).
    ClearOut,
    /// Result display delay over.
    Archive,
}

/// A single-player chase: deliveries, swings and the match result.
pub struct CricketMatch<R: Rng> {
    setup: MatchSetup,
    cfg: SimConfig,
    rng: R,
    /// Simulation time in milliseconds, accumulated from tick deltas.
    clock_ms: f64,
    ready: bool,
    started: bool,
    archived: bool,
    out: bool,
    ball: Ball,
    swing: SwingTracker,
    /// Outcome rolled by the most recent accepted swing.
    last_outcome: Option<HitOutcome>,
    /// Outcome of the swing that struck the ball in flight.
    struck: Option<HitOutcome>,
    machine: MatchStateMachine,
    scheduler: Scheduler<Task>,
    /// Events raised outside `update`, flushed on the next tick.
    pending: Vec<MatchEvent>,
}

impl<R: Rng> CricketMatch<R> {
    /// Start a session from `setup`, resuming any counters it carries.
    ///
    /// The first delivery is released after the configured countdown.
    pub fn new(setup: MatchSetup, cfg: SimConfig, rng: R) -> Self {
        let machine = MatchStateMachine::new(&setup);
        let ball = Ball::new(delivery::opening(), &cfg.pitch);
        let mut scheduler = Scheduler::new();
        let mut pending = Vec::new();

        if machine.is_finished() {
            let status = machine.status();
            tracing::info!(%status, "Resumed a match that is already decided");
            pending.push(MatchEvent::MatchFinished {
                status,
                progress: *machine.progress(),
            });
            scheduler.schedule(cfg.timing.result_delay_ms, 0, Task::Archive);
        } else {
            scheduler.schedule(cfg.timing.countdown_ms, 0, Task::Ready);
        }

        Self {
            setup,
            cfg,
            rng,
            clock_ms: 0.0,
            ready: false,
            started: false,
            archived: false,
            out: false,
            ball,
            swing: SwingTracker::new(),
            last_outcome: None,
            struck: None,
            machine,
            scheduler,
            pending,
        }
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// # Panics
    /// If `dt` is negative or not finite.
    pub fn update(&mut self, dt: f32, input: &TickInput) -> Vec<MatchEvent> {
        assert!(
            dt.is_finite() && dt >= 0.0,
            "tick delta must be finite and non-negative, got {dt}"
        );
        let mut events = std::mem::take(&mut self.pending);

        self.clock_ms += f64::from(dt) * 1000.0;
        let now = self.now_ms();
        for due in self.scheduler.drain_due(now) {
            self.run_task(due.task, due.epoch, &mut events);
        }

        if self.machine.is_finished() || !self.ready {
            return events;
        }

        self.process_input(input, now, &mut events);
        if !self.evaluate_contact(now, &mut events) && !self.machine.is_finished() {
            self.advance(dt, now, &mut events);
        }
        events
    }

    pub fn now_ms(&self) -> u64 {
        self.clock_ms as u64
    }

    pub fn setup(&self) -> &MatchSetup {
        &self.setup
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn progress(&self) -> &MatchProgress {
        self.machine.progress()
    }

    pub fn status(&self) -> MatchStatus {
        self.machine.status()
    }

    pub fn is_finished(&self) -> bool {
        self.machine.is_finished()
    }

    /// Countdown is over and deliveries are being bowled.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// At least one swing has been accepted.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The result display delay has elapsed after the match finished.
    pub fn is_archived(&self) -> bool {
        self.archived
    }

    /// Stumps were recently broken.
    pub fn is_out(&self) -> bool {
        self.out
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard::new(&self.setup, self.machine.progress())
    }

    fn run_task(&mut self, task: Task, epoch: Epoch, events: &mut Vec<MatchEvent>) {
        match task {
            Task::Ready => {
                if self.ready || self.machine.is_finished() {
                    return;
                }
                self.ready = true;
                tracing::info!(
                    batting = %self.setup.your_team,
                    target = self.setup.target,
                    "Countdown finished"
                );
                events.push(MatchEvent::Ready);
                events.push(MatchEvent::DeliveryStarted {
                    delivery: self.ball.delivery,
                    profile: self.ball.profile.name.to_string(),
                });
            },
            Task::EndSwinging => self.swing.end_swinging(epoch),
            Task::EndBusy => self.swing.end_busy(epoch),
            Task::ResetDelivery => {
                if self.machine.is_finished()
                    || Epoch::from(self.ball.delivery) != epoch
                    || self.ball.state() != BallState::Waiting
                {
                    return;
                }
                let profile = delivery::select(&mut self.rng);
                self.ball.rebowl(profile, &self.cfg.pitch);
                tracing::debug!(
                    delivery = self.ball.delivery,
                    profile = profile.name,
                    "Delivery released"
                );
                events.push(MatchEvent::DeliveryStarted {
                    delivery: self.ball.delivery,
                    profile: profile.name.to_string(),
                });
            },
            Task::ClearOut => {
                if Epoch::from(self.machine.progress().wickets) == epoch {
                    self.out = false;
                }
            },
            Task::Archive => {
                if self.machine.is_finished() && !self.archived {
                    self.archived = true;
                    events.push(MatchEvent::Archived);
                }
            },
        }
    }

    fn process_input(&mut self, input: &TickInput, now: u64, events: &mut Vec<MatchEvent>) {
        let triggers = [
            (input.attack, SwingKind::Shot),
            (input.defend, SwingKind::Defense),
        ];
        for (pressed, kind) in triggers {
            if !pressed {
                continue;
            }
            let Some((swing, outcome)) =
                self.swing
                    .trigger(kind, now, &mut self.rng, &self.cfg.swing)
            else {
                continue;
            };
            if !self.started {
                self.started = true;
                tracing::info!("Match started");
                events.push(MatchEvent::MatchStarted);
            }
            self.scheduler
                .schedule(swing.swinging_until_ms, swing.seq, Task::EndSwinging);
            self.scheduler
                .schedule(swing.busy_until_ms, swing.seq, Task::EndBusy);
            self.last_outcome = Some(outcome);
            events.push(MatchEvent::SwingAccepted {
                kind,
                power: outcome.power,
                at_ms: now,
            });
        }
    }

    /// Test the position reached last tick. Returns whether the bat or the
    /// stumps took the ball.
    fn evaluate_contact(&mut self, now: u64, events: &mut Vec<MatchEvent>) -> bool {
        if self.ball.state() != BallState::Idle {
            return false;
        }
        let pos = self.ball.position;
        if !self.ball.faced && pos.x < self.cfg.pitch.faced_x {
            self.count_faced(events);
        }

        match collision::detect(
            &pos,
            self.swing.active_swing(),
            now,
            &self.cfg.collision,
        ) {
            Collision::None => false,
            Collision::Hit(kind) => {
                let velocity = collision::initial_hit_velocity(kind, &mut self.rng, &self.cfg.flight);
                self.ball.strike(velocity);
                self.struck = Some(self.last_outcome.take().unwrap_or(HitOutcome {
                    kind,
                    power: 0.0,
                    exit_position: None,
                }));
                tracing::debug!(delivery = self.ball.delivery, %kind, x = pos.x, y = pos.y, "Bat contact");
                events.push(MatchEvent::BatContact {
                    kind,
                    position: pos,
                });
                true
            },
            Collision::Wicket => {
                self.ball.transition(BallState::Bowled);
                let applied = self.machine.add_wicket();
                let wickets = self.machine.progress().wickets;
                tracing::debug!(delivery = self.ball.delivery, wickets, "Bowled");
                events.push(MatchEvent::Wicket { wickets });
                events.push(MatchEvent::ProgressChanged(*self.machine.progress()));
                self.out = true;
                self.scheduler.schedule(
                    now + self.cfg.timing.out_indicator_ms,
                    Epoch::from(wickets),
                    Task::ClearOut,
                );
                self.on_applied(applied, events);
                self.end_delivery(now, events);
                true
            },
        }
    }

    fn advance(&mut self, dt: f32, now: u64, events: &mut Vec<MatchEvent>) {
        match self.ball.state() {
            BallState::Idle => {
                self.ball.advance_delivery(dt, &self.cfg.pitch);
                if self.ball.past_far_boundary(&self.cfg.pitch) {
                    tracing::debug!(delivery = self.ball.delivery, "Dead ball");
                    self.end_delivery(now, events);
                }
            },
            BallState::Hit => {
                self.ball.advance_flight(&self.cfg.flight);
                let Some(resolution) = scoring::resolve(
                    &self.ball.position,
                    self.ball.peak_height,
                    &self.cfg.flight,
                ) else {
                    return;
                };
                let applied = self.machine.add_runs(resolution.runs);
                let mut outcome = self.struck.take().unwrap_or(HitOutcome {
                    kind: SwingKind::Shot,
                    power: 0.0,
                    exit_position: None,
                });
                outcome.exit_position = Some(resolution.exit_position);
                let total_runs = self.machine.progress().total_runs;
                tracing::debug!(
                    delivery = self.ball.delivery,
                    runs = resolution.runs,
                    total_runs,
                    peak = resolution.peak_height,
                    six = resolution.six,
                    "Runs scored"
                );
                events.push(MatchEvent::RunsScored {
                    runs: resolution.runs,
                    total_runs,
                    outcome,
                    peak_height: resolution.peak_height,
                });
                events.push(MatchEvent::ProgressChanged(*self.machine.progress()));
                self.on_applied(applied, events);
                self.end_delivery(now, events);
            },
            BallState::Bowled | BallState::Waiting => {},
        }
    }

    fn count_faced(&mut self, events: &mut Vec<MatchEvent>) {
        self.ball.faced = true;
        let applied = self.machine.ball_faced();
        if applied.changed {
            events.push(MatchEvent::BallFaced {
                delivery: self.ball.delivery,
                balls_faced: self.machine.progress().balls_faced,
            });
            events.push(MatchEvent::ProgressChanged(*self.machine.progress()));
        }
        self.on_applied(applied, events);
    }

    /// Park the ball and, unless the match is over, queue the next delivery.
    fn end_delivery(&mut self, now: u64, events: &mut Vec<MatchEvent>) {
        if !self.ball.faced {
            self.count_faced(events);
        }
        self.ball.park(&self.cfg.pitch);
        events.push(MatchEvent::DeliveryDead {
            delivery: self.ball.delivery,
        });
        let applied = self.machine.delivery_resolved();
        self.on_applied(applied, events);

        if !self.machine.is_finished() {
            self.scheduler.schedule(
                now + self.cfg.pitch.reset_pause_ms,
                Epoch::from(self.ball.delivery),
                Task::ResetDelivery,
            );
        }
    }

    fn on_applied(&mut self, applied: Applied, events: &mut Vec<MatchEvent>) {
        let Some(status) = applied.finished else {
            return;
        };
        let progress = *self.machine.progress();
        tracing::info!(
            %status,
            runs = progress.total_runs,
            balls = progress.balls_faced,
            wickets = progress.wickets,
            "Match finished"
        );
        events.push(MatchEvent::MatchFinished { status, progress });
        self.scheduler.schedule(
            self.now_ms() + self.cfg.timing.result_delay_ms,
            0,
            Task::Archive,
        );
    }
}
