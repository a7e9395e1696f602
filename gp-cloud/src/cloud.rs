//! This module handles the cone-shaped tree canopy cloud and its procedural generation.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use tracing::{debug, warn};

/// The minimum number of points in a tree canopy.
///
/// Counts below this produce a visibly sparse cone, so generation clamps up to it.
pub const MIN_TREE_POINTS: usize = 1000;

/// The parameters for generating a tree canopy cloud.
///
/// The distribution constants on this type are load-bearing for the look of the tree: changing
/// the exponents or ramp coefficients changes the silhouette and colour gradient, not just the
/// density.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// The number of points in the cloud. Clamped up to [`MIN_TREE_POINTS`].
    pub points: usize,

    /// The height of the cone.
    pub height: f32,

    /// The radius of the cone at its base. The radius tapers linearly to zero at the apex.
    pub base_radius: f32,
}

impl TreeParams {
    /// The exponent applied to the uniform height sample.
    ///
    /// For `U` in `(0, 1)`, `U^1.6 < U`, so the sampled heights bunch towards 0 and the canopy is
    /// denser near the base.
    pub const HEIGHT_BIAS: f32 = 1.6;

    /// The exponent applied to the uniform radial sample, biasing points slightly outwards.
    pub const RADIUS_BIAS: f32 = 0.9;

    /// How far the whole canopy is shifted down the y axis.
    pub const VERTICAL_OFFSET: f32 = 0.2;

    /// The nominal size of a point at the base of the tree. Points shrink linearly to half this
    /// at the apex.
    pub const BASE_SIZE: f32 = 6.0;

    /// Return a copy of these params with every field forced into its sane range.
    ///
    /// Degenerate values get replaced rather than rejected; this is a decorative scene with no
    /// consumer that could do anything better with an error.
    #[must_use]
    pub fn sanitised(self) -> Self {
        let defaults = Self::default();

        let points = self.points.max(MIN_TREE_POINTS);
        let height = if self.height.is_finite() && self.height > 0. {
            self.height
        } else {
            defaults.height
        };
        let base_radius = if self.base_radius.is_finite() && self.base_radius > 0. {
            self.base_radius
        } else {
            defaults.base_radius
        };

        if points != self.points || height != self.height || base_radius != self.base_radius {
            warn!(?self, "Clamped degenerate tree params");
        }

        Self {
            points,
            height,
            base_radius,
        }
    }
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            points: 16_000,
            height: 3.2,
            base_radius: 1.6,
        }
    }
}

/// Compute the canopy colour for a normalised height `t` in `[0, 1]`.
///
/// The ramp runs from a dark green at the base to a bright yellow-green at the apex. All three
/// channels stay within `[0, 1]` by construction.
pub fn canopy_colour(t: f32) -> [f32; 3] {
    [
        0.05 + 0.4 * (1. - t),
        0.25 + 0.7 * t,
        0.05 + 0.15 * t,
    ]
}

/// A fixed-size cloud of independently positioned, coloured and sized points.
///
/// This is a structure of arrays: the three vecs are always exactly the same length and index `i`
/// in each refers to the same point. A cloud is allocated once by [`generate`](Self::generate)
/// and never edited incrementally; "changing" a cloud means generating a replacement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleCloud {
    /// The position of each point.
    pub positions: Vec<Vec3>,

    /// The colour of each point, as RGB channels in `[0, 1]`.
    pub colours: Vec<[f32; 3]>,

    /// The nominal render size of each point.
    pub sizes: Vec<f32>,
}

impl ParticleCloud {
    /// Generate a cone-shaped canopy cloud from the given params.
    ///
    /// Each point samples a height (biased towards the base), then a radial offset inside the
    /// cone's taper at that height, then an angle. Colour and size derive from the normalised
    /// height alone.
    pub fn generate(params: TreeParams, rng: &mut impl Rng) -> Self {
        let TreeParams {
            points,
            height,
            base_radius,
        } = params.sanitised();

        let mut positions = Vec::with_capacity(points);
        let mut colours = Vec::with_capacity(points);
        let mut sizes = Vec::with_capacity(points);

        for _ in 0..points {
            let h = rng.gen::<f32>().powf(TreeParams::HEIGHT_BIAS) * height;
            let max_radius = (1. - h / height) * base_radius;
            let r = rng.gen::<f32>().powf(TreeParams::RADIUS_BIAS) * max_radius;
            let theta = rng.gen::<f32>() * TAU;

            positions.push(Vec3 {
                x: theta.cos() * r,
                y: h - TreeParams::VERTICAL_OFFSET,
                z: theta.sin() * r,
            });

            let t = h / height;
            colours.push(canopy_colour(t));
            sizes.push(TreeParams::BASE_SIZE * (0.5 + 0.5 * (1. - t)));
        }

        debug!(points, height, base_radius, "Generated canopy cloud");

        Self {
            positions,
            colours,
            sizes,
        }
    }

    /// The number of points in the cloud.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the cloud has no points. Generated clouds never do.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
