//! This module contains the per-frame systems: the parameter panel, the regeneration handlers
//! and the animation passes.
//!
//! Every buffer here has exactly one writer per frame. The regeneration handlers run between the
//! panel and the animation passes, so a frame either renders the old collection or the new one,
//! never both and never neither.

use crate::{
    bevy_setup::{
        spawn_canopy, spawn_ornament_lights, spawn_snow, CanopyIndex, LightsGroup, OrnamentIndex,
        SceneAssets, SnowGroup, SnowIndex, Topper, TreeGroup,
    },
    CanopyCloud, Config, Ornaments, RegenerateLights, RegenerateSnow, RegenerateTree, Snow,
};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContext};
use gp_cloud::{place_ornaments, ParticleCloud, SnowField, SnowParams, TreeParams};
use gp_effects::{
    canopy_twinkle, ornament_scale, ornament_twinkle, shimmer, sway_yaw, topper_pulse,
};
use rand::thread_rng;
use tracing::{debug, instrument};

/// Render the parameter panel and fire regeneration events from its trigger buttons.
pub(crate) fn ui_panel(
    mut egui_ctx: ResMut<EguiContext>,
    mut config: ResMut<Config>,
    mut regen_tree: EventWriter<RegenerateTree>,
    mut regen_lights: EventWriter<RegenerateLights>,
    mut regen_snow: EventWriter<RegenerateSnow>,
) {
    egui::Window::new("Controls")
        .default_width(300.)
        .show(egui_ctx.ctx_mut(), |ui| {
            config.render_options_gui(ui);

            ui.separator();

            if ui.button("Regenerate tree").clicked() {
                regen_tree.send(RegenerateTree);
            }
            if ui.button("Regenerate lights").clicked() {
                regen_lights.send(RegenerateLights);
            }
            if ui.button("Regenerate snow").clicked() {
                regen_snow.send(RegenerateSnow);
            }
        });
}

/// Mirror the visibility flags onto the light and snow groups.
///
/// Toggling never touches the underlying buffers; a hidden group keeps animating its data so it
/// reappears mid-motion.
pub(crate) fn apply_visibility(
    config: Res<Config>,
    mut lights: Query<&mut Visibility, With<LightsGroup>>,
    mut snow: Query<&mut Visibility, (With<SnowGroup>, Without<LightsGroup>)>,
) {
    for mut visibility in &mut lights {
        visibility.is_visible = config.lights_on;
    }
    for mut visibility in &mut snow {
        visibility.is_visible = config.snow_on;
    }
}

/// Gently yaw the tree and lights groups, slightly out of phase with each other.
pub(crate) fn sway(
    time: Res<Time>,
    mut tree: Query<&mut Transform, With<TreeGroup>>,
    mut lights: Query<&mut Transform, (With<LightsGroup>, Without<TreeGroup>)>,
) {
    let elapsed = time.elapsed_seconds();

    for mut transform in &mut tree {
        transform.rotation = Quat::from_rotation_y(sway_yaw(elapsed, 0.));
    }
    for mut transform in &mut lights {
        transform.rotation = Quat::from_rotation_y(sway_yaw(elapsed, 0.5));
    }
}

/// Shimmer, twinkle and scale every canopy point.
///
/// Positions, colours and sizes always come fresh from the cloud arrays; the entities only cache
/// indices, so a regeneration earlier in the frame is picked up immediately.
pub(crate) fn animate_canopy(
    time: Res<Time>,
    config: Res<Config>,
    cloud: Res<CanopyCloud>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut points: Query<(&CanopyIndex, &mut Transform, &Handle<StandardMaterial>)>,
) {
    let elapsed = time.elapsed_seconds();

    for (&CanopyIndex(index), mut transform, handle) in &mut points {
        // A point can outlive its cloud for the frame its replacement was swapped in on
        let Some(&position) = cloud.0.positions.get(index) else {
            continue;
        };
        let Some(&[r, g, b]) = cloud.0.colours.get(index) else {
            continue;
        };
        let Some(&size) = cloud.0.sizes.get(index) else {
            continue;
        };

        transform.translation = position + shimmer(elapsed, position);
        transform.scale = Vec3::splat(size / TreeParams::BASE_SIZE * config.particle_size);

        let brightness = canopy_twinkle(elapsed, position, config.twinkle);
        if let Some(material) = materials.get_mut(handle) {
            material.emissive = Color::rgb(r, g, b) * brightness;
        }
    }
}

/// Twinkle and pulse every ornament light, brightness and size in phase with each other.
pub(crate) fn animate_ornaments(
    time: Res<Time>,
    config: Res<Config>,
    ornaments: Res<Ornaments>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut lights: Query<(
        &OrnamentIndex,
        &mut Transform,
        &Handle<StandardMaterial>,
        &Children,
    )>,
    mut point_lights: Query<&mut PointLight>,
) {
    let elapsed = time.elapsed_seconds();

    for (&OrnamentIndex(index), mut transform, handle, children) in &mut lights {
        let Some(ornament) = ornaments.0.get(index) else {
            continue;
        };

        transform.scale = Vec3::splat(ornament_scale(elapsed, ornament.phase));

        let brightness = ornament_twinkle(elapsed, ornament.phase, config.twinkle);
        let [r, g, b] = ornament.colour;
        let colour = Color::rgb_u8(r, g, b) * brightness;

        if let Some(material) = materials.get_mut(handle) {
            material.emissive = colour;
        }
        for &child in children.iter() {
            if let Ok(mut point_light) = point_lights.get_mut(child) {
                point_light.color = colour;
            }
        }
    }
}

/// Pulse the star topper.
pub(crate) fn animate_topper(time: Res<Time>, mut topper: Query<&mut Transform, With<Topper>>) {
    let elapsed = time.elapsed_seconds();
    for mut transform in &mut topper {
        transform.scale = Vec3::splat(topper_pulse(elapsed));
    }
}

/// Step the snow field and mirror the flake positions into their transforms.
pub(crate) fn fall_snow(
    time: Res<Time>,
    mut snow: ResMut<Snow>,
    mut flakes: Query<(&SnowIndex, &mut Transform)>,
) {
    snow.0.advance(time.delta_seconds(), &mut thread_rng());

    for (&SnowIndex(index), mut transform) in &mut flakes {
        if let Some(&position) = snow.0.positions.get(index) {
            transform.translation = position;
        }
    }
}

/// Rebuild the tree canopy if a [`RegenerateTree`] event fired.
///
/// The old entities despawn and the new ones spawn in the same command batch, so the swap is
/// atomic from the renderer's point of view; the old materials and their GPU buffers are freed
/// when the despawn drops their last handles.
#[instrument(skip_all)]
pub(crate) fn regenerate_tree(
    mut commands: Commands,
    mut events: EventReader<RegenerateTree>,
    config: Res<Config>,
    assets: Res<SceneAssets>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut cloud: ResMut<CanopyCloud>,
    old_points: Query<Entity, With<CanopyIndex>>,
    tree_group: Query<Entity, With<TreeGroup>>,
) {
    if events.iter().count() == 0 {
        return;
    }

    for entity in &old_points {
        commands.entity(entity).despawn_recursive();
    }

    cloud.0 = ParticleCloud::generate(
        TreeParams {
            points: config.particle_count,
            ..TreeParams::default()
        },
        &mut thread_rng(),
    );

    if let Ok(parent) = tree_group.get_single() {
        spawn_canopy(&mut commands, &mut materials, &assets, &cloud.0, parent);
    }

    debug!(points = cloud.0.len(), "Regenerated tree canopy");
}

/// Rebuild the ornament lights if a [`RegenerateLights`] event fired.
///
/// Samples from whatever canopy cloud is current this frame; positions are copied by value, so a
/// later tree regeneration leaves these lights where they are.
#[instrument(skip_all)]
pub(crate) fn regenerate_lights(
    mut commands: Commands,
    mut events: EventReader<RegenerateLights>,
    config: Res<Config>,
    assets: Res<SceneAssets>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cloud: Res<CanopyCloud>,
    mut ornaments: ResMut<Ornaments>,
    old_lights: Query<Entity, With<OrnamentIndex>>,
    lights_group: Query<Entity, With<LightsGroup>>,
) {
    if events.iter().count() == 0 {
        return;
    }

    for entity in &old_lights {
        commands.entity(entity).despawn_recursive();
    }

    ornaments.0 = place_ornaments(&cloud.0, config.light_count, &mut thread_rng());

    if let Ok(parent) = lights_group.get_single() {
        spawn_ornament_lights(&mut commands, &mut materials, &assets, &ornaments.0, parent);
    }

    debug!(lights = ornaments.0.len(), "Regenerated ornament lights");
}

/// Rebuild the snow field if a [`RegenerateSnow`] event fired.
#[instrument(skip_all)]
pub(crate) fn regenerate_snow(
    mut commands: Commands,
    mut events: EventReader<RegenerateSnow>,
    config: Res<Config>,
    assets: Res<SceneAssets>,
    mut snow: ResMut<Snow>,
    old_flakes: Query<Entity, With<SnowIndex>>,
    snow_group: Query<Entity, With<SnowGroup>>,
) {
    if events.iter().count() == 0 {
        return;
    }

    for entity in &old_flakes {
        commands.entity(entity).despawn_recursive();
    }

    snow.0 = SnowField::generate(
        SnowParams {
            count: config.snow_count,
            ..SnowParams::default()
        },
        &mut thread_rng(),
    );

    if let Ok(parent) = snow_group.get_single() {
        spawn_snow(&mut commands, &assets, &snow.0, parent);
    }

    debug!(flakes = snow.0.len(), "Regenerated snow field");
}
