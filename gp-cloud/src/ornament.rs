//! This module handles placing the little ornament lights on the canopy.

use crate::ParticleCloud;
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use tracing::{debug, warn};

/// The fixed palette of ornament colours, assigned cyclically.
pub const PALETTE: [[u8; 3]; 5] = [
    [0xFF, 0x3D, 0x6B], // pink
    [0xFF, 0xD2, 0x4D], // gold
    [0x4C, 0xFF, 0xB6], // mint
    [0x7E, 0xC8, 0xFF], // ice blue
    [0xE8, 0xA1, 0xFF], // lilac
];

/// A single ornament light on the tree.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrnamentLight {
    /// Where the light sits.
    ///
    /// This is copied by value from a canopy point at placement time, so regenerating the canopy
    /// afterwards does not move existing lights.
    pub position: Vec3,

    /// The base colour of the light, from [`PALETTE`].
    pub colour: [u8; 3],

    /// The phase of this light's twinkle, in `[0, 2π)`. Each light oscillates independently.
    pub phase: f32,
}

/// Place `count` ornament lights on random points of the given canopy cloud.
///
/// Indices are sampled uniformly *with replacement*: duplicate placements are allowed and
/// expected, and no minimum-distance constraint is applied. Colours cycle through [`PALETTE`]
/// and each light gets an independent random phase.
///
/// An empty source cloud yields no lights; a zero count is clamped to one.
pub fn place_ornaments(
    cloud: &ParticleCloud,
    count: usize,
    rng: &mut impl Rng,
) -> Vec<OrnamentLight> {
    if cloud.is_empty() {
        warn!("Tried to place ornaments on an empty cloud");
        return Vec::new();
    }

    let count = count.max(1);

    let lights = (0..count)
        .map(|i| {
            let idx = rng.gen_range(0..cloud.len());
            OrnamentLight {
                position: cloud.positions[idx],
                colour: PALETTE[i % PALETTE.len()],
                phase: rng.gen_range(0.0..TAU),
            }
        })
        .collect();

    debug!(count, "Placed ornament lights");
    lights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TreeParams;
    use rand::{rngs::StdRng, SeedableRng};

    fn small_cloud(rng: &mut impl Rng) -> ParticleCloud {
        ParticleCloud::generate(
            TreeParams {
                points: 1000,
                ..TreeParams::default()
            },
            rng,
        )
    }

    #[test]
    fn every_light_sits_on_a_canopy_point() {
        let mut rng = StdRng::seed_from_u64(12345);
        let cloud = small_cloud(&mut rng);
        let lights = place_ornaments(&cloud, 80, &mut rng);

        assert_eq!(lights.len(), 80);
        for light in &lights {
            assert!(
                cloud.positions.contains(&light.position),
                "light at {:?} matches no canopy point",
                light.position
            );
        }
    }

    #[test]
    fn colours_cycle_through_the_palette() {
        let mut rng = StdRng::seed_from_u64(6);
        let cloud = small_cloud(&mut rng);
        let lights = place_ornaments(&cloud, 12, &mut rng);

        for (i, light) in lights.iter().enumerate() {
            assert_eq!(light.colour, PALETTE[i % PALETTE.len()]);
        }
    }

    #[test]
    fn phases_are_independent_and_in_range() {
        let mut rng = StdRng::seed_from_u64(31);
        let cloud = small_cloud(&mut rng);
        let lights = place_ornaments(&cloud, 50, &mut rng);

        for light in &lights {
            assert!((0.0..TAU).contains(&light.phase));
        }

        // 50 independent draws all landing on the same phase would mean the RNG is broken
        let first = lights[0].phase;
        assert!(lights.iter().any(|light| light.phase != first));
    }

    #[test]
    fn lights_survive_canopy_regeneration() {
        let mut rng = StdRng::seed_from_u64(44);
        let cloud = small_cloud(&mut rng);
        let lights = place_ornaments(&cloud, 20, &mut rng);
        let positions_before: Vec<_> = lights.iter().map(|light| light.position).collect();

        // Regenerating the canopy must not move lights placed from the old one
        drop(cloud);
        let _new_cloud = small_cloud(&mut rng);

        let positions_after: Vec<_> = lights.iter().map(|light| light.position).collect();
        assert_eq!(positions_before, positions_after);
    }

    #[test]
    fn empty_cloud_places_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty = ParticleCloud {
            positions: Vec::new(),
            colours: Vec::new(),
            sizes: Vec::new(),
        };
        assert!(place_ornaments(&empty, 80, &mut rng).is_empty());
    }

    #[test]
    fn zero_count_is_clamped_to_one() {
        let mut rng = StdRng::seed_from_u64(8);
        let cloud = small_cloud(&mut rng);
        assert_eq!(place_ornaments(&cloud, 0, &mut rng).len(), 1);
    }
}
