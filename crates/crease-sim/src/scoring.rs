use crease_core::geometry::Vec3;

use crate::config::FlightConfig;

/// Runs for a ball leaving play at height `y`.
///
/// Bands:
/// - above 60: 6
/// - above 50: 4
/// - above 40: 3
/// - above 30: 2
/// - otherwise: 1
pub fn runs_for_height(y: f32) -> u32 {
    if y > 60.0 {
        6
    } else if y > 50.0 {
        4
    } else if y > 40.0 {
        3
    } else if y > 30.0 {
        2
    } else {
        1
    }
}

/// How a struck ball finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub runs: u32,
    pub exit_position: Vec3,
    pub peak_height: f32,
    /// Cleared the six height rather than leaving through a boundary.
    pub six: bool,
}

pub fn out_of_bounds(pos: &Vec3, cfg: &FlightConfig) -> bool {
    pos.x > cfg.max_x || pos.y < cfg.min_y || pos.x < cfg.min_x
}

/// Resolve a struck ball at `pos`, or `None` while it is still in play.
pub fn resolve(pos: &Vec3, peak_height: f32, cfg: &FlightConfig) -> Option<Resolution> {
    if pos.y > cfg.six_height {
        return Some(Resolution {
            runs: 6,
            exit_position: *pos,
            peak_height,
            six: true,
        });
    }
    if out_of_bounds(pos, cfg) {
        return Some(Resolution {
            runs: runs_for_height(pos.y),
            exit_position: *pos,
            peak_height,
            six: false,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_examples() {
        assert_eq!(runs_for_height(61.0), 6);
        assert_eq!(runs_for_height(45.0), 3);
        assert_eq!(runs_for_height(25.0), 1);
        assert_eq!(runs_for_height(55.0), 4);
        assert_eq!(runs_for_height(35.0), 2);
    }

    #[test]
    fn band_edges_are_exclusive() {
        assert_eq!(runs_for_height(60.0), 4);
        assert_eq!(runs_for_height(50.0), 3);
        assert_eq!(runs_for_height(40.0), 2);
        assert_eq!(runs_for_height(30.0), 1);
    }

    #[test]
    fn six_above_ceiling() {
        let cfg = FlightConfig::default();
        let r = resolve(&Vec3::new(40.0, 65.5, 2.0), 65.5, &cfg).unwrap();
        assert!(r.six);
        assert_eq!(r.runs, 6);
    }

    #[test]
    fn in_play_is_unresolved() {
        let cfg = FlightConfig::default();
        assert_eq!(resolve(&Vec3::new(30.0, 40.0, 2.0), 41.0, &cfg), None);
    }

    #[test]
    fn boundary_exit_uses_exit_height() {
        let cfg = FlightConfig::default();
        let r = resolve(&Vec3::new(121.0, 45.0, 2.0), 58.0, &cfg).unwrap();
        assert_eq!(r.runs, 3);
        assert_eq!(r.peak_height, 58.0);
        assert!(!r.six);

        let r = resolve(&Vec3::new(10.0, 10.9, 1.5), 20.0, &cfg).unwrap();
        assert_eq!(r.runs, 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn runs_always_from_table(y in -200.0f32..200.0) {
                let runs = runs_for_height(y);
                prop_assert!([1, 2, 3, 4, 6].contains(&runs));
            }

            #[test]
            fn runs_never_decrease_with_height(a in 0.0f32..100.0, b in 0.0f32..100.0) {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(runs_for_height(lo) <= runs_for_height(hi));
            }
        }
    }
}
