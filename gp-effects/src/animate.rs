//! This module contains the closed-form animation functions applied every frame.
//!
//! Phases are decorrelated in one of two ways: canopy points derive their phase from their own
//! position (spatial variety for free), ornament lights carry a random phase assigned at
//! placement. Either way the functions here only ever see a number.

use glam::Vec3;

/// The angular frequency shared by all twinkle effects.
const TWINKLE_SPEED: f32 = 6.0;

/// Compute the brightness multiplier for a canopy point.
///
/// The wave `0.5 + 0.5 sin(6t + 8y)` runs over `[0, 1]` with a phase taken from the point's
/// height, and `strength` scales the modulation depth on top of a constant 0.8 baseline. A
/// strength of zero collapses the whole thing to that baseline.
pub fn canopy_twinkle(elapsed: f32, position: Vec3, strength: f32) -> f32 {
    let wave = 0.5 + 0.5 * (TWINKLE_SPEED * elapsed + position.y * 8.0).sin();
    0.8 + 0.4 * wave * strength
}

/// Compute the brightness multiplier for an ornament light with the given phase.
///
/// Ornaments swing harder than the canopy: `0.7 + 0.6 sin(6t + phase)`, with `strength` scaling
/// the swing. Clamped at zero so extreme strengths can't produce a negative brightness.
pub fn ornament_twinkle(elapsed: f32, phase: f32, strength: f32) -> f32 {
    (0.7 + 0.6 * strength * (TWINKLE_SPEED * elapsed + phase).sin()).max(0.)
}

/// Compute the render scale for an ornament light with the given phase.
///
/// Uses the same phase and frequency as [`ornament_twinkle`] so brightness and apparent size
/// pulse together.
pub fn ornament_scale(elapsed: f32, phase: f32) -> f32 {
    0.6 + 0.4 * (TWINKLE_SPEED * elapsed + phase).sin()
}

/// Compute the per-point shimmer offset for a canopy point.
///
/// The trig arguments depend on the point's own position, so neighbouring points drift out of
/// phase and the cloud shimmers instead of translating rigidly. Amplitude is tiny (5mm in scene
/// units) on purpose.
pub fn shimmer(elapsed: f32, position: Vec3) -> Vec3 {
    Vec3 {
        x: 0.005 * (0.7 * elapsed + position.y * 3.0 + position.x * 6.0).sin(),
        y: 0.,
        z: 0.005 * (0.5 * elapsed + position.y * 2.0 + position.z * 4.0).cos(),
    }
}

/// Compute the whole-group yaw angle (radians) for the gentle sway.
///
/// The tree group uses a phase offset of 0 and the lights group 0.5, so they swing almost but
/// not quite together.
pub fn sway_yaw(elapsed: f32, phase_offset: f32) -> f32 {
    0.03 * (elapsed * 0.25 + phase_offset).sin()
}

/// Compute the uniform scale of the star topper.
pub fn topper_pulse(elapsed: f32) -> f32 {
    1.0 + 0.08 * (elapsed * 4.0).sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::{approx_eq, assert_approx_eq};

    #[test]
    fn zero_strength_collapses_twinkle_to_its_baseline() {
        for elapsed in [0., 0.37, 1., 12.5, 600.] {
            assert_approx_eq!(
                f32,
                canopy_twinkle(elapsed, Vec3::new(0.3, 1.7, -0.2), 0.),
                0.8
            );
            assert_approx_eq!(f32, ornament_twinkle(elapsed, 2.1, 0.), 0.7);
        }
    }

    #[test]
    fn twinkle_stays_within_its_envelope() {
        for i in 0..1000 {
            let elapsed = i as f32 * 0.013;
            let canopy = canopy_twinkle(elapsed, Vec3::new(0.1, elapsed.fract(), 0.5), 1.);
            assert!((0.8 - 1e-6..=1.2 + 1e-6).contains(&canopy));

            let ornament = ornament_twinkle(elapsed, 1.3, 1.);
            assert!((0.1 - 1e-6..=1.3 + 1e-6).contains(&ornament));

            let ornament_strong = ornament_twinkle(elapsed, 1.3, 2.);
            assert!((0. ..=1.9 + 1e-6).contains(&ornament_strong));
        }
    }

    #[test]
    fn ornament_scale_and_twinkle_share_a_phase() {
        // Both waves peak at the same time for the same phase
        for i in 0..500 {
            let elapsed = i as f32 * 0.017;
            let phase = 0.9;
            let twinkle_centred = ornament_twinkle(elapsed, phase, 1.) - 0.7;
            let scale_centred = ornament_scale(elapsed, phase) - 0.6;
            // 0.6 sin(x) and 0.4 sin(x) always agree in sign
            assert!(twinkle_centred * scale_centred >= -1e-6);
        }
    }

    #[test]
    fn animation_is_a_pure_function_of_elapsed_time() {
        let pos = Vec3::new(0.4, 2.2, -0.9);
        let a = (
            canopy_twinkle(3.5, pos, 1.2),
            shimmer(3.5, pos),
            sway_yaw(3.5, 0.),
            topper_pulse(3.5),
        );
        let b = (
            canopy_twinkle(3.5, pos, 1.2),
            shimmer(3.5, pos),
            sway_yaw(3.5, 0.),
            topper_pulse(3.5),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn shimmer_is_tiny_and_horizontal() {
        for i in 0..500 {
            let elapsed = i as f32 * 0.011;
            let offset = shimmer(elapsed, Vec3::new(0.8, 1.1, -0.3));
            assert!(offset.x.abs() <= 0.005 + 1e-6);
            assert!(offset.z.abs() <= 0.005 + 1e-6);
            assert!(approx_eq!(f32, offset.y, 0.));
        }
    }

    #[test]
    fn sway_amplitude_is_bounded() {
        for i in 0..2000 {
            let elapsed = i as f32 * 0.021;
            assert!(sway_yaw(elapsed, 0.).abs() <= 0.03 + 1e-6);
            assert!(sway_yaw(elapsed, 0.5).abs() <= 0.03 + 1e-6);
            assert!((0.92 - 1e-6..=1.08 + 1e-6).contains(&topper_pulse(elapsed)));
        }
    }

    #[test]
    fn nearby_canopy_points_twinkle_out_of_phase() {
        let low = Vec3::new(0., 0.2, 0.);
        let high = Vec3::new(0., 1.0, 0.);
        // 8 * 0.8 radians of phase difference is far from a multiple of 2π
        let a = canopy_twinkle(1., low, 1.);
        let b = canopy_twinkle(1., high, 1.);
        assert!((a - b).abs() > 1e-3);
    }
}
