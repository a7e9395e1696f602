//! This module handles the falling snow field.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The parameters for generating and animating a snow field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnowParams {
    /// The number of snowflakes.
    pub count: usize,

    /// The side length of the horizontal box the flakes fall within, centred on the origin.
    pub spread: f32,

    /// Flakes below this y value wrap back to the top.
    pub floor: f32,

    /// The y value wrapped flakes reappear at, plus a random offset within [`respawn_band`](Self::respawn_band).
    pub ceiling: f32,

    /// The height of the band above [`ceiling`](Self::ceiling) that wrapped flakes respawn in.
    pub respawn_band: f32,

    /// The bottom of the initial spawn band.
    pub spawn_base: f32,

    /// The height of the initial spawn band.
    pub spawn_height: f32,

    /// The slowest fall speed a flake can be assigned.
    pub min_speed: f32,

    /// The fastest fall speed a flake can be assigned.
    pub max_speed: f32,

    /// A global multiplier on fall speed.
    pub fall_rate: f32,
}

impl SnowParams {
    /// The minimum number of snowflakes; smaller requests are clamped up to this.
    pub const MIN_FLAKES: usize = 1;
}

impl Default for SnowParams {
    fn default() -> Self {
        Self {
            count: 400,
            spread: 6.0,
            floor: -1.0,
            ceiling: 5.0,
            respawn_band: 1.5,
            spawn_base: 0.5,
            spawn_height: 5.0,
            min_speed: 0.2,
            max_speed: 0.8,
            fall_rate: 0.6,
        }
    }
}

/// A field of falling snowflakes.
///
/// The two vecs are parallel: index `i` in each refers to the same flake. The field is a circular
/// buffer semantically — flakes that fall below the floor wrap back above the ceiling — and is
/// never reallocated after generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnowField {
    /// The position of each flake.
    pub positions: Vec<Vec3>,

    /// The fall speed of each flake, fixed for the flake's lifetime.
    pub speeds: Vec<f32>,

    /// The params the field was generated with, kept so [`advance`](Self::advance) agrees with
    /// the generation-time thresholds.
    params: SnowParams,
}

impl SnowField {
    /// Generate a snow field with positions uniform in the spawn box and an independent random
    /// fall speed per flake.
    pub fn generate(params: SnowParams, rng: &mut impl Rng) -> Self {
        let count = params.count.max(SnowParams::MIN_FLAKES);
        let half_spread = params.spread / 2.;

        let mut positions = Vec::with_capacity(count);
        let mut speeds = Vec::with_capacity(count);

        for _ in 0..count {
            positions.push(Vec3 {
                x: rng.gen_range(-half_spread..half_spread),
                y: params.spawn_base + rng.gen::<f32>() * params.spawn_height,
                z: rng.gen_range(-half_spread..half_spread),
            });
            speeds.push(rng.gen_range(params.min_speed..params.max_speed));
        }

        debug!(count, "Generated snow field");

        Self {
            positions,
            speeds,
            params,
        }
    }

    /// Advance every flake by one frame.
    ///
    /// Each flake falls by `speed * dt * fall_rate`; a flake that crosses the floor resets to a
    /// fresh random height in `[ceiling, ceiling + respawn_band)` with its speed unchanged.
    pub fn advance(&mut self, dt: f32, rng: &mut impl Rng) {
        for (pos, &speed) in self.positions.iter_mut().zip(&self.speeds) {
            pos.y -= speed * dt * self.params.fall_rate;
            if pos.y < self.params.floor {
                pos.y = self.params.ceiling + rng.gen::<f32>() * self.params.respawn_band;
            }
        }
    }

    /// The number of flakes in the field.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the field has no flakes. Generated fields never do.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn flakes_spawn_inside_the_box_with_speeds_in_range() {
        let mut rng = StdRng::seed_from_u64(12345);
        let params = SnowParams::default();
        let field = SnowField::generate(params, &mut rng);

        assert_eq!(field.len(), params.count);

        for pos in &field.positions {
            assert!((-3.0..3.0).contains(&pos.x));
            assert!((-3.0..3.0).contains(&pos.z));
            assert!((0.5..5.5).contains(&pos.y));
        }
        for &speed in &field.speeds {
            assert!((0.2..0.8).contains(&speed));
        }
    }

    #[test]
    fn flakes_fall_and_wrap_above_the_ceiling() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut field = SnowField::generate(SnowParams::default(), &mut rng);

        // Force one flake below the floor
        field.positions[0].y = -1.1;
        let speeds_before = field.speeds.clone();

        field.advance(0., &mut rng);

        assert!(
            (5.0..6.5).contains(&field.positions[0].y),
            "wrapped flake at y = {}",
            field.positions[0].y
        );
        // Wrapping never touches speeds
        assert_eq!(field.speeds, speeds_before);
    }

    #[test]
    fn advancing_with_zero_dt_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = SnowField::generate(SnowParams::default(), &mut rng);
        field.positions[0].y = -1.1;

        // The first call wraps the sunken flake; a second zero-dt call must change nothing
        field.advance(0., &mut rng);
        let after_once = field.clone();
        field.advance(0., &mut rng);

        assert_eq!(field, after_once);
    }

    #[test]
    fn flakes_descend_by_speed_dt_fall_rate() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut field = SnowField::generate(SnowParams::default(), &mut rng);
        let y_before: Vec<f32> = field.positions.iter().map(|pos| pos.y).collect();

        field.advance(0.1, &mut rng);

        for ((pos, &y0), &speed) in field.positions.iter().zip(&y_before).zip(&field.speeds) {
            if pos.y <= y0 {
                float_cmp::assert_approx_eq!(f32, pos.y, y0 - speed * 0.1 * 0.6, epsilon = 1e-5);
            } else {
                // The flake wrapped this frame
                assert!(pos.y >= 5.0);
            }
        }
    }

    #[test]
    fn zero_count_is_clamped() {
        let mut rng = StdRng::seed_from_u64(9);
        let field = SnowField::generate(
            SnowParams {
                count: 0,
                ..SnowParams::default()
            },
            &mut rng,
        );
        assert_eq!(field.len(), SnowParams::MIN_FLAKES);
    }
}
