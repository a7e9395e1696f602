//! This module handles the runtime-tunable scene configuration and its egui panel.

use egui::{RichText, Ui};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::info;

/// The range of the global particle size multiplier.
pub const PARTICLE_SIZE_RANGE: RangeInclusive<f32> = 0.2..=4.0;

/// The range of the twinkle modulation strength.
pub const TWINKLE_RANGE: RangeInclusive<f32> = 0.0..=2.0;

/// The range of the canopy point count.
pub const PARTICLE_COUNT_RANGE: RangeInclusive<usize> = 1000..=50_000;

/// The range of the ornament light count.
pub const LIGHT_COUNT_RANGE: RangeInclusive<usize> = 10..=300;

/// The range of the snowflake count.
pub const SNOW_COUNT_RANGE: RangeInclusive<usize> = 50..=2000;

/// The runtime-tunable parameters of the scene.
///
/// Mutation is immediate: the size and twinkle scalars are read fresh by the animation systems
/// every frame, the counts are read by the next regeneration, and the visibility flags apply on
/// the next frame. Nothing in here is cached anywhere else.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// A uniform multiplier on the rendered size of every canopy point.
    pub particle_size: f32,

    /// The strength of all brightness modulation. Zero freezes every twinkle at its baseline.
    pub twinkle: f32,

    /// The canopy point count used by the next tree regeneration.
    pub particle_count: usize,

    /// Whether the ornament light group is visible.
    pub lights_on: bool,

    /// The ornament count used by the next light regeneration.
    pub light_count: usize,

    /// Whether the snow is visible.
    pub snow_on: bool,

    /// The snowflake count used by the next snow regeneration.
    pub snow_count: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_size: 1.0,
            twinkle: 1.0,
            particle_count: 18_000,
            lights_on: true,
            light_count: 80,
            snow_on: true,
            snow_count: 400,
        }
    }
}

impl SceneConfig {
    /// The default canopy point count on a constrained device.
    pub const REDUCED_PARTICLE_COUNT: usize = 8000;

    /// Viewports narrower than this get [`REDUCED_PARTICLE_COUNT`](Self::REDUCED_PARTICLE_COUNT)
    /// canopy points by default.
    pub const SMALL_VIEWPORT_WIDTH: f32 = 1000.;

    /// Build the startup config for a viewport of the given logical width.
    ///
    /// This is a one-time decision: the count is never re-evaluated when the window resizes, only
    /// when the user regenerates the tree.
    pub fn for_viewport_width(width: f32) -> Self {
        if width < Self::SMALL_VIEWPORT_WIDTH {
            info!(width, "Small viewport detected; lowering default particle count");
            Self {
                particle_count: Self::REDUCED_PARTICLE_COUNT,
                ..Self::default()
            }
        } else {
            Self::default()
        }
    }

    /// Force every field back into its slider range, replacing non-finite values with defaults.
    pub fn clamp_to_ranges(&mut self) {
        let defaults = Self::default();

        if !self.particle_size.is_finite() {
            self.particle_size = defaults.particle_size;
        }
        if !self.twinkle.is_finite() {
            self.twinkle = defaults.twinkle;
        }

        self.particle_size = self
            .particle_size
            .clamp(*PARTICLE_SIZE_RANGE.start(), *PARTICLE_SIZE_RANGE.end());
        self.twinkle = self
            .twinkle
            .clamp(*TWINKLE_RANGE.start(), *TWINKLE_RANGE.end());
        self.particle_count = self
            .particle_count
            .clamp(*PARTICLE_COUNT_RANGE.start(), *PARTICLE_COUNT_RANGE.end());
        self.light_count = self
            .light_count
            .clamp(*LIGHT_COUNT_RANGE.start(), *LIGHT_COUNT_RANGE.end());
        self.snow_count = self
            .snow_count
            .clamp(*SNOW_COUNT_RANGE.start(), *SNOW_COUNT_RANGE.end());
    }

    /// Render the GUI to edit this config and return whether anything changed.
    ///
    /// The regeneration triggers are deliberately not in here: they are scene actions, not
    /// config, so the viewer renders those buttons itself next to this.
    pub fn render_options_gui(&mut self, ui: &mut Ui) -> bool {
        ui.label(RichText::new("Scene config").heading());

        let mut config_changed = false;

        config_changed |= ui
            .add(
                egui::Slider::new(&mut self.particle_size, PARTICLE_SIZE_RANGE)
                    .text("Particle size"),
            )
            .changed();
        config_changed |= ui
            .add(egui::Slider::new(&mut self.twinkle, TWINKLE_RANGE).text("Twinkle strength"))
            .changed();
        config_changed |= ui
            .add(
                egui::Slider::new(&mut self.particle_count, PARTICLE_COUNT_RANGE)
                    .text("Particle count"),
            )
            .changed();

        ui.separator();

        config_changed |= ui.checkbox(&mut self.lights_on, "Ornament lights").changed();
        config_changed |= ui
            .add(egui::Slider::new(&mut self.light_count, LIGHT_COUNT_RANGE).text("Light count"))
            .changed();

        ui.separator();

        config_changed |= ui.checkbox(&mut self.snow_on, "Snow").changed();
        config_changed |= ui
            .add(egui::Slider::new(&mut self.snow_count, SNOW_COUNT_RANGE).text("Snow count"))
            .changed();

        ui.separator();

        if ui.button("Reset to defaults").clicked() {
            *self = Self::default();
            config_changed = true;
        }

        if config_changed {
            self.clamp_to_ranges();
        }

        config_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn defaults_are_in_range() {
        let mut config = SceneConfig::default();
        let before = config;
        config.clamp_to_ranges();
        assert_eq!(config, before);
    }

    #[test]
    fn out_of_range_values_get_clamped() {
        let mut config = SceneConfig {
            particle_size: 100.,
            twinkle: -3.,
            particle_count: 12,
            light_count: 100_000,
            snow_count: 0,
            ..SceneConfig::default()
        };
        config.clamp_to_ranges();

        assert_approx_eq!(f32, config.particle_size, 4.0);
        assert_approx_eq!(f32, config.twinkle, 0.0);
        assert_eq!(config.particle_count, 1000);
        assert_eq!(config.light_count, 300);
        assert_eq!(config.snow_count, 50);
    }

    #[test]
    fn non_finite_scalars_fall_back_to_defaults() {
        let mut config = SceneConfig {
            particle_size: f32::NAN,
            twinkle: f32::INFINITY,
            ..SceneConfig::default()
        };
        config.clamp_to_ranges();

        assert_approx_eq!(f32, config.particle_size, 1.0);
        // Infinity is finite-checked too, not just clamped to the range end
        assert_approx_eq!(f32, config.twinkle, 1.0);
    }

    #[test]
    fn small_viewports_get_fewer_particles() {
        assert_eq!(
            SceneConfig::for_viewport_width(800.).particle_count,
            SceneConfig::REDUCED_PARTICLE_COUNT
        );
        assert_eq!(
            SceneConfig::for_viewport_width(1920.).particle_count,
            SceneConfig::default().particle_count
        );
    }
}
