use serde::Serialize;

use crease_core::geometry::Vec3;

use crate::config::{FlightConfig, PitchConfig};
use crate::delivery::DeliveryProfile;

/// Lifecycle of the ball within one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BallState {
    /// In flight from the bowler, not yet hit.
    Idle,
    Hit,
    /// Broke the stumps.
    Bowled,
    /// Parked off-scene until the next release.
    Waiting,
}

impl BallState {
    pub fn can_transition_to(self, next: BallState) -> bool {
        use BallState::*;
        matches!(
            (self, next),
            (Idle, Hit) | (Idle, Bowled) | (Idle, Waiting) | (Hit, Waiting) | (Bowled, Waiting)
                | (Waiting, Idle)
        )
    }
}

/// Position of an unhit ball `t` seconds after release.
pub fn pre_hit_position(profile: &DeliveryProfile, t: f32, cfg: &PitchConfig) -> Vec3 {
    let x = cfg.release_x - t * profile.speed;
    let y = if t < profile.pitch_time {
        cfg.release_y - (t / profile.pitch_time) * (cfg.release_y - cfg.pitch_y)
    } else {
        cfg.pitch_y + (t - profile.pitch_time) * profile.bounce_height * cfg.bounce_scale
    };
    Vec3::new(x, y, cfg.line_z)
}

/// The ball and the delivery it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct Ball {
    pub position: Vec3,
    /// Per-tick velocity, only meaningful while `Hit`.
    pub velocity: Vec3,
    state: BallState,
    pub profile: DeliveryProfile,
    /// Seconds since release.
    pub flight_time: f32,
    /// Whether this delivery has been counted as faced.
    pub faced: bool,
    /// Highest point reached since the hit.
    pub peak_height: f32,
    /// 1-based delivery number within the session.
    pub delivery: u32,
}

impl Ball {
    /// Ball at the release point for the first delivery.
    pub fn new(profile: DeliveryProfile, cfg: &PitchConfig) -> Self {
        Self {
            position: pre_hit_position(&profile, 0.0, cfg),
            velocity: Vec3::ZERO,
            state: BallState::Idle,
            profile,
            flight_time: 0.0,
            faced: false,
            peak_height: 0.0,
            delivery: 1,
        }
    }

    pub fn state(&self) -> BallState {
        self.state
    }

    /// # Panics
    /// On a transition outside the ball lifecycle.
    pub fn transition(&mut self, next: BallState) {
        assert!(
            self.state.can_transition_to(next),
            "illegal ball transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }

    /// Move an unhit ball along its delivery path by `dt` seconds.
    pub fn advance_delivery(&mut self, dt: f32, cfg: &PitchConfig) {
        self.flight_time += dt;
        self.position = pre_hit_position(&self.profile, self.flight_time, cfg);
    }

    pub fn past_far_boundary(&self, cfg: &PitchConfig) -> bool {
        self.position.x < cfg.far_boundary_x
    }

    /// Bat contact: leave the delivery path with `velocity` per tick.
    pub fn strike(&mut self, velocity: Vec3) {
        self.transition(BallState::Hit);
        self.velocity = velocity;
        self.peak_height = self.position.y;
    }

    /// One tick of ballistic flight after a hit.
    pub fn advance_flight(&mut self, cfg: &FlightConfig) {
        self.position += self.velocity;
        self.velocity.y -= cfg.gravity;
        self.peak_height = self.peak_height.max(self.position.y);
    }

    /// Take the ball out of play until the next release.
    pub fn park(&mut self, cfg: &PitchConfig) {
        self.transition(BallState::Waiting);
        self.position = cfg.park_position;
        self.velocity = Vec3::ZERO;
    }

    /// Release the next delivery with `profile`.
    pub fn rebowl(&mut self, profile: DeliveryProfile, cfg: &PitchConfig) {
        self.transition(BallState::Idle);
        self.profile = profile;
        self.flight_time = 0.0;
        self.faced = false;
        self.peak_height = 0.0;
        self.velocity = Vec3::ZERO;
        self.position = pre_hit_position(&profile, 0.0, cfg);
        self.delivery += 1;
    }
}
