use rand::Rng;
use serde::Serialize;

/// One of the fixed kinds of delivery the bowler sends down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeliveryProfile {
    pub name: &'static str,
    /// Seconds from release until the ball pitches.
    pub pitch_time: f32,
    /// Steepness of the climb after pitching.
    pub bounce_height: f32,
    /// Horizontal speed in units per second.
    pub speed: f32,
}

pub const YORKER: DeliveryProfile = DeliveryProfile {
    name: "YORKER",
    pitch_time: 1.0,
    bounce_height: 2.0,
    speed: 22.0,
};

pub const GOOD_LENGTH: DeliveryProfile = DeliveryProfile {
    name: "GOOD_LENGTH",
    pitch_time: 0.8,
    bounce_height: 1.5,
    speed: 25.0,
};

pub const SHORT_BALL: DeliveryProfile = DeliveryProfile {
    name: "SHORT_BALL",
    pitch_time: 0.6,
    bounce_height: 1.3,
    speed: 18.0,
};

pub const CATALOG: [DeliveryProfile; 3] = [YORKER, GOOD_LENGTH, SHORT_BALL];

/// The first ball of every match.
pub fn opening() -> DeliveryProfile {
    GOOD_LENGTH
}

/// Profile at `index` in the catalog.
///
/// # Panics
/// If `index` is outside the catalog.
pub fn by_index(index: usize) -> DeliveryProfile {
    assert!(
        index < CATALOG.len(),
        "delivery index {index} outside catalog of {}",
        CATALOG.len()
    );
    CATALOG[index]
}

/// Uniform draw with replacement.
pub fn select<R: Rng>(rng: &mut R) -> DeliveryProfile {
    by_index(rng.random_range(0..CATALOG.len()))
}
