//! Closed-form sphere trajectory.

use glam::Vec3;

/// Radius of the horizontal orbit traced by the sphere.
pub const ORBIT_RADIUS: f32 = 1.5;

/// Bounce angular frequency relative to the orbit.
pub const BOUNCE_FREQUENCY: f32 = 3.0;

/// Sphere position at `elapsed_time` seconds.
///
/// Pure function of its input: x/z trace a circle of radius [`ORBIT_RADIUS`]
/// with period 2π, y bounces in `[0, 1]` with period π/3 and touches zero
/// whenever `sin(3t)` does.
pub fn sphere_position(elapsed_time: f32) -> Vec3 {
    Vec3::new(
        elapsed_time.cos() * ORBIT_RADIUS,
        (elapsed_time * BOUNCE_FREQUENCY).sin().abs(),
        elapsed_time.sin() * ORBIT_RADIUS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn sample_times() -> impl Iterator<Item = f32> {
        (0..5_000).map(|i| i as f32 * 0.0137)
    }

    #[test]
    fn never_below_ground() {
        for t in sample_times() {
            assert!(sphere_position(t).y >= 0.0, "t={t}");
        }
    }

    #[test]
    fn bounce_stays_within_unit_height() {
        for t in sample_times() {
            assert!(sphere_position(t).y <= 1.0, "t={t}");
        }
    }

    #[test]
    fn constant_orbit_radius() {
        for t in sample_times() {
            let p = sphere_position(t);
            let r2 = p.x * p.x + p.z * p.z;
            assert!((r2 - ORBIT_RADIUS * ORBIT_RADIUS).abs() < 1e-4, "t={t} r2={r2}");
        }
    }

    #[test]
    fn start_position_rests_on_ground() {
        assert_eq!(sphere_position(0.0), Vec3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn quarter_orbit_is_at_apex() {
        let p = sphere_position(FRAC_PI_2);
        assert!(p.x.abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
        assert!((p.z - 1.5).abs() < 1e-5);
    }

    #[test]
    fn bounce_touches_ground_every_third_of_pi() {
        for k in 0..12 {
            let t = k as f32 * PI / 3.0;
            assert!(sphere_position(t).y < 1e-4, "k={k}");
        }
    }

    #[test]
    fn repeated_calls_agree() {
        for t in [0.0, 0.5, 3.3, 100.0] {
            assert_eq!(sphere_position(t), sphere_position(t));
        }
    }
}
