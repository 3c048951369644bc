use rand::Rng;

use crease_core::events::SwingKind;
use crease_core::geometry::Vec3;

use crate::config::{CollisionConfig, FlightConfig};
use crate::swing::SwingEvent;

/// Result of testing one unhit ball position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    None,
    Hit(SwingKind),
    Wicket,
}

/// Whether `now_ms` falls inside the swing's contact window (inclusive).
pub fn in_timing_window(swing: &SwingEvent, now_ms: u64, cfg: &CollisionConfig) -> bool {
    let Some(elapsed) = now_ms.checked_sub(swing.start_ms) else {
        return false;
    };
    (cfg.hit_window_min_ms..=cfg.hit_window_max_ms).contains(&elapsed)
}

/// Whether the ball is within reach of the bat.
pub fn bat_contact(pos: &Vec3, cfg: &CollisionConfig) -> bool {
    pos.distance_xz(&cfg.bat_position) < cfg.bat_reach
        && pos.y > cfg.hit_min_y
        && pos.y < cfg.hit_max_y
}

pub fn in_wicket_zone(pos: &Vec3, cfg: &CollisionConfig) -> bool {
    cfg.wicket_zone.contains(pos)
}

/// Test an unhit ball at `pos` against the swing in its hitting arc, if any.
/// A hit takes precedence; the stumps are only tested when there is none.
pub fn detect(
    pos: &Vec3,
    swing: Option<&SwingEvent>,
    now_ms: u64,
    cfg: &CollisionConfig,
) -> Collision {
    if let Some(swing) = swing
        && in_timing_window(swing, now_ms, cfg)
        && bat_contact(pos, cfg)
    {
        return Collision::Hit(swing.kind);
    }
    if in_wicket_zone(pos, cfg) {
        return Collision::Wicket;
    }
    Collision::None
}

/// Per-tick velocity the ball leaves the bat with.
pub fn initial_hit_velocity<R: Rng>(kind: SwingKind, rng: &mut R, cfg: &FlightConfig) -> Vec3 {
    match kind {
        SwingKind::Shot => {
            let rx: f32 = rng.random();
            let ry: f32 = rng.random();
            let rz: f32 = rng.random();
            Vec3::new(
                cfg.shot_base.x + rx * cfg.shot_spread.x,
                cfg.shot_base.y + ry * cfg.shot_spread.y,
                cfg.shot_base.z + rz * cfg.shot_spread.z,
            )
        },
        SwingKind::Defense => cfg.defense_velocity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn swing(start_ms: u64, kind: SwingKind) -> SwingEvent {
        SwingEvent {
            seq: 1,
            start_ms,
            kind,
            swinging_until_ms: start_ms + 250,
            busy_until_ms: start_ms + 600,
        }
    }

    const SWEET_SPOT: Vec3 = Vec3::new(-9.5, 14.0, 1.5);

    #[test]
    fn window_bounds_inclusive() {
        let cfg = CollisionConfig::default();
        let s = swing(1000, SwingKind::Shot);
        assert!(!in_timing_window(&s, 1049, &cfg));
        assert!(in_timing_window(&s, 1050, &cfg));
        assert!(in_timing_window(&s, 1450, &cfg));
        assert!(!in_timing_window(&s, 1451, &cfg));
        assert!(!in_timing_window(&s, 900, &cfg));
    }

    #[test]
    fn perfect_alignment_outside_window_misses() {
        let cfg = CollisionConfig::default();
        let s = swing(1000, SwingKind::Shot);
        assert_eq!(detect(&SWEET_SPOT, Some(&s), 1020, &cfg), Collision::None);
        assert_eq!(detect(&SWEET_SPOT, Some(&s), 1500, &cfg), Collision::None);
        assert_eq!(
            detect(&SWEET_SPOT, Some(&s), 1100, &cfg),
            Collision::Hit(SwingKind::Shot)
        );
    }

    #[test]
    fn no_swing_no_hit() {
        let cfg = CollisionConfig::default();
        assert_eq!(detect(&SWEET_SPOT, None, 1100, &cfg), Collision::None);
    }

    #[test]
    fn spatial_limits() {
        let cfg = CollisionConfig::default();
        assert!(bat_contact(&Vec3::new(-8.0, 13.0, 1.5), &cfg));
        assert!(!bat_contact(&Vec3::new(-7.7, 13.0, 1.5), &cfg));
        assert!(!bat_contact(&Vec3::new(-9.5, 12.5, 1.5), &cfg));
        assert!(!bat_contact(&Vec3::new(-9.5, 18.5, 1.5), &cfg));
        assert!(!bat_contact(&Vec3::new(-9.5, 14.0, 3.4), &cfg));
    }

    #[test]
    fn stumps_box() {
        let cfg = CollisionConfig::default();
        assert_eq!(
            detect(&Vec3::new(-13.5, 15.0, 1.5), None, 0, &cfg),
            Collision::Wicket
        );
        assert_eq!(
            detect(&Vec3::new(-13.5, 16.6, 1.5), None, 0, &cfg),
            Collision::None
        );
        assert_eq!(
            detect(&Vec3::new(-13.8, 15.0, 1.5), None, 0, &cfg),
            Collision::None
        );
    }

    #[test]
    fn defense_velocity_fixed() {
        let cfg = FlightConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            initial_hit_velocity(SwingKind::Defense, &mut rng, &cfg),
            Vec3::new(0.6, 0.3, 0.0)
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn shot_velocity_in_range(seed in 0u64..10_000) {
                let cfg = FlightConfig::default();
                let mut rng = StdRng::seed_from_u64(seed);
                let v = initial_hit_velocity(SwingKind::Shot, &mut rng, &cfg);
                prop_assert!(v.x >= 1.5 && v.x <= 3.0);
                prop_assert!(v.y >= 0.8 && v.y <= 1.5);
                prop_assert!(v.z >= 0.0 && v.z <= 0.4);
            }

            #[test]
            fn at_most_one_outcome(
                x in -16.0f32..-6.0,
                y in 10.0f32..20.0,
                z in 0.0f32..3.0,
                elapsed in 0u64..600,
            ) {
                let cfg = CollisionConfig::default();
                let s = swing(0, SwingKind::Shot);
                let pos = Vec3::new(x, y, z);
                let hit = in_timing_window(&s, elapsed, &cfg) && bat_contact(&pos, &cfg);
                match detect(&pos, Some(&s), elapsed, &cfg) {
                    Collision::Hit(_) => prop_assert!(hit),
                    Collision::Wicket => prop_assert!(!hit && in_wicket_zone(&pos, &cfg)),
                    Collision::None => prop_assert!(!hit && !in_wicket_zone(&pos, &cfg)),
                }
            }
        }
    }
}
