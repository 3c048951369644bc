use serde::{Deserialize, Serialize};

use crease_core::geometry::{Bounds3, Vec3};

/// Release, pitching and reset geometry of a delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    /// X of the bowler's release point.
    pub release_x: f32,
    /// Height at release.
    pub release_y: f32,
    /// Height where the ball meets the pitch.
    pub pitch_y: f32,
    /// Multiplier on `bounce_height` for the post-pitch climb rate.
    pub bounce_scale: f32,
    /// Lateral line of the delivery; constant until hit.
    pub line_z: f32,
    /// Crossing this x counts the ball as faced.
    pub faced_x: f32,
    /// Past this x an unhit ball is dead.
    pub far_boundary_x: f32,
    /// Off-scene position for a dead ball.
    pub park_position: Vec3,
    /// Pause between a dead ball and the next release.
    pub reset_pause_ms: u64,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            release_x: 14.0,
            release_y: 18.0,
            pitch_y: 12.4,
            bounce_scale: 6.0,
            line_z: 1.5,
            faced_x: -5.0,
            far_boundary_x: -25.0,
            park_position: Vec3::new(0.0, -100.0, 0.0),
            reset_pause_ms: 2000,
        }
    }
}

/// Half-open range `[min, max)` for a swing's power.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PowerRange {
    pub min: f32,
    pub max: f32,
}

/// Bat action timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwingConfig {
    /// How long the bat is in the hitting arc.
    pub swinging_ms: u64,
    /// How long further triggers are refused.
    pub busy_ms: u64,
    /// Minimum gap between accepted swings.
    pub cooldown_ms: u64,
    pub shot_power: PowerRange,
    pub defense_power: PowerRange,
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            swinging_ms: 250,
            busy_ms: 600,
            cooldown_ms: 300,
            shot_power: PowerRange { min: 0.4, max: 0.9 },
            defense_power: PowerRange {
                min: 0.01,
                max: 0.61,
            },
        }
    }
}

/// Bat contact and stumps geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Earliest moment after swing start the bat can connect.
    pub hit_window_min_ms: u64,
    /// Latest moment after swing start the bat can connect.
    pub hit_window_max_ms: u64,
    /// Bat sweet spot on the ground plane (y ignored).
    pub bat_position: Vec3,
    /// Ground-plane reach around the sweet spot.
    pub bat_reach: f32,
    pub hit_min_y: f32,
    pub hit_max_y: f32,
    /// An unhit ball inside this box breaks the stumps.
    pub wicket_zone: Bounds3,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            hit_window_min_ms: 50,
            hit_window_max_ms: 450,
            bat_position: Vec3::new(-9.5, 0.0, 1.5),
            bat_reach: 1.8,
            hit_min_y: 12.5,
            hit_max_y: 18.5,
            wicket_zone: Bounds3::new(Vec3::new(-13.8, 12.4, 0.2), Vec3::new(-13.2, 16.5, 1.8)),
        }
    }
}

/// Post-hit ballistics and boundaries, in per-tick units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub gravity: f32,
    /// Clearing this height is a six.
    pub six_height: f32,
    pub max_x: f32,
    pub min_x: f32,
    pub min_y: f32,
    /// SHOT velocity is `shot_base + r * shot_spread` per axis, `r` in `[0, 1)`.
    pub shot_base: Vec3,
    pub shot_spread: Vec3,
    pub defense_velocity: Vec3,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            gravity: 0.012,
            six_height: 65.0,
            max_x: 120.0,
            min_x: -40.0,
            min_y: 11.0,
            shot_base: Vec3::new(1.5, 0.8, 0.0),
            shot_spread: Vec3::new(1.5, 0.7, 0.4),
            defense_velocity: Vec3::new(0.6, 0.3, 0.0),
        }
    }
}

/// Session-level delays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Countdown before the first delivery.
    pub countdown_ms: u64,
    /// Result display time between finishing and archiving.
    pub result_delay_ms: u64,
    /// How long the broken-stumps indicator stays up.
    pub out_indicator_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            countdown_ms: 3000,
            result_delay_ms: 2500,
            out_indicator_ms: 2000,
        }
    }
}

/// Data-driven tuning for the delivery simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub pitch: PitchConfig,
    pub swing: SwingConfig,
    pub collision: CollisionConfig,
    pub flight: FlightConfig,
    pub timing: TimingConfig,
}

impl SimConfig {
    /// Load config from `CREASE_SIM_CONFIG` or `config/sim.toml`, falling back
    /// to defaults if neither is present or parseable.
    pub fn load() -> Self {
        let path =
            std::env::var("CREASE_SIM_CONFIG").unwrap_or_else(|_| "config/sim.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<SimConfig>(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    SimConfig::default()
                },
            },
            Err(_) => SimConfig::default(),
        }
    }
}
