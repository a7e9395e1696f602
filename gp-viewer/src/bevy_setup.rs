//! This module sets up the Bevy world: camera, lighting, ground, topper, the shared meshes, and
//! the spawning of the particle collections.

use crate::{CanopyCloud, Config, Ornaments, Snow};
use bevy::{core_pipeline::bloom::BloomSettings, prelude::*};
use gp_cloud::{place_ornaments, ParticleCloud, SnowField, SnowParams, TreeParams};
use gp_effects::SceneConfig;
use rand::thread_rng;
use smooth_bevy_cameras::controllers::orbit::{OrbitCameraBundle, OrbitCameraController};
use std::f32::consts::PI;
use tracing::{debug, info};
use tracing_unwrap::OptionExt;

/// The index of a canopy point into the [`CanopyCloud`] arrays.
#[derive(Component, Clone, Copy, Debug)]
pub(crate) struct CanopyIndex(pub(crate) usize);

/// The index of an ornament into the [`Ornaments`] vec.
#[derive(Component, Clone, Copy, Debug)]
pub(crate) struct OrnamentIndex(pub(crate) usize);

/// The index of a snowflake into the [`Snow`] arrays.
#[derive(Component, Clone, Copy, Debug)]
pub(crate) struct SnowIndex(pub(crate) usize);

/// The parent entity of all canopy points; swaying yaws this transform.
#[derive(Component, Clone, Copy, Debug)]
pub(crate) struct TreeGroup;

/// The parent entity of all ornament lights; visibility toggling and swaying happen here.
#[derive(Component, Clone, Copy, Debug)]
pub(crate) struct LightsGroup;

/// The parent entity of all snowflakes; visibility toggling happens here.
#[derive(Component, Clone, Copy, Debug)]
pub(crate) struct SnowGroup;

/// The star on top of the tree.
#[derive(Component, Clone, Copy, Debug)]
pub(crate) struct Topper;

/// Handles to the meshes and materials shared by every particle of a kind.
///
/// One low-poly sphere serves all canopy points, one all ornaments, one all snowflakes; only the
/// materials differ per entity (snowflakes are all plain white, so they also share a material).
#[derive(Resource, Clone, Debug)]
pub(crate) struct SceneAssets {
    /// The mesh shared by all canopy points.
    pub(crate) canopy_mesh: Handle<Mesh>,

    /// The mesh shared by all ornament lights.
    pub(crate) ornament_mesh: Handle<Mesh>,

    /// The mesh shared by all snowflakes.
    pub(crate) flake_mesh: Handle<Mesh>,

    /// The material shared by all snowflakes.
    pub(crate) snow_material: Handle<StandardMaterial>,
}

/// Setup the Bevy world with a camera, lights, ground, topper and the shared assets, and decide
/// the startup config from the window size.
pub(crate) fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    windows: Res<Windows>,
) {
    // The device heuristic is a one-shot decision at startup; resizing later never re-evaluates it
    let width = windows
        .get_primary()
        .expect_or_log("There should be a primary window at startup")
        .width();
    let config = SceneConfig::for_viewport_width(width);
    info!(?config, "Startup scene config");
    commands.insert_resource(Config(config));

    // Hold LControl to orbit the camera
    commands
        .spawn((
            Camera3dBundle {
                camera: Camera {
                    hdr: true,
                    ..default()
                },
                ..default()
            },
            BloomSettings {
                intensity: 1.4,
                threshold: 0.6,
                ..default()
            },
        ))
        .insert(OrbitCameraBundle::new(
            OrbitCameraController {
                mouse_rotate_sensitivity: Vec2::splat(0.25),
                smoothing_weight: 0.1,
                ..default()
            },
            Vec3::new(0., 2.5, 6.),
            Vec3::new(0., 1.5, 0.),
            Vec3::Y,
        ));

    // Soft white ambient plus one warm point light above and behind the camera
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 0.6,
    });
    commands.spawn(PointLightBundle {
        point_light: PointLight {
            color: Color::rgb_u8(255, 245, 195),
            intensity: 1500.,
            range: 20.,
            shadows_enabled: false,
            ..default()
        },
        transform: Transform::from_xyz(0., 6., 6.),
        ..default()
    });

    // A translucent dark-green glow disc under the tree
    commands.spawn(PbrBundle {
        mesh: meshes.add(Mesh::from(shape::Circle {
            radius: 3.5,
            vertices: 32,
        })),
        material: materials.add(StandardMaterial {
            base_color: Color::rgba_u8(0x05, 0x2D, 0x2A, 89),
            alpha_mode: AlphaMode::Blend,
            perceptual_roughness: 0.8,
            ..default()
        }),
        transform: Transform::from_xyz(0., -0.25, 0.)
            .with_rotation(Quat::from_rotation_x(-PI / 2.)),
        ..default()
    });

    // The star topper sits just above the apex of the default cone
    let topper_y = TreeParams::default().height - TreeParams::VERTICAL_OFFSET + 0.25;
    commands.spawn((
        PbrBundle {
            mesh: meshes.add(Mesh::from(shape::UVSphere {
                radius: 0.06,
                sectors: 8,
                stacks: 6,
            })),
            material: materials.add(StandardMaterial {
                base_color: Color::rgb_u8(0xFF, 0xEE, 0x66),
                emissive: Color::rgb_u8(0xFF, 0xEE, 0x66),
                ..default()
            }),
            transform: Transform::from_xyz(0., topper_y, 0.),
            ..default()
        },
        Topper,
    ));

    // Group parents so sway and visibility apply to whole collections at once
    commands.spawn((SpatialBundle::default(), TreeGroup));
    commands.spawn((SpatialBundle::default(), LightsGroup));
    commands.spawn((SpatialBundle::default(), SnowGroup));

    let snow_material = materials.add(StandardMaterial {
        base_color: Color::rgba(1., 1., 1., 0.9),
        emissive: Color::rgb(0.8, 0.8, 0.8),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });
    commands.insert_resource(SceneAssets {
        canopy_mesh: meshes.add(Mesh::from(shape::Icosphere {
            radius: 0.009,
            subdivisions: 1,
        })),
        ornament_mesh: meshes.add(Mesh::from(shape::UVSphere {
            radius: 0.035,
            sectors: 8,
            stacks: 6,
        })),
        flake_mesh: meshes.add(Mesh::from(shape::Icosphere {
            radius: 0.03,
            subdivisions: 1,
        })),
        snow_material,
    });
}

/// Generate the initial collections from the startup config and spawn them.
///
/// Runs after [`setup`] so the config, shared assets and group parents all exist.
pub(crate) fn spawn_initial_scene(
    mut commands: Commands,
    config: Res<Config>,
    assets: Res<SceneAssets>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    tree_group: Query<Entity, With<TreeGroup>>,
    lights_group: Query<Entity, With<LightsGroup>>,
    snow_group: Query<Entity, With<SnowGroup>>,
) {
    let mut rng = thread_rng();

    let cloud = ParticleCloud::generate(
        TreeParams {
            points: config.particle_count,
            ..TreeParams::default()
        },
        &mut rng,
    );
    let ornaments = place_ornaments(&cloud, config.light_count, &mut rng);
    let snow = SnowField::generate(
        SnowParams {
            count: config.snow_count,
            ..SnowParams::default()
        },
        &mut rng,
    );

    if let Ok(parent) = tree_group.get_single() {
        spawn_canopy(&mut commands, &mut materials, &assets, &cloud, parent);
    }
    if let Ok(parent) = lights_group.get_single() {
        spawn_ornament_lights(&mut commands, &mut materials, &assets, &ornaments, parent);
    }
    if let Ok(parent) = snow_group.get_single() {
        spawn_snow(&mut commands, &assets, &snow, parent);
    }

    commands.insert_resource(CanopyCloud(cloud));
    commands.insert_resource(Ornaments(ornaments));
    commands.insert_resource(Snow(snow));
}

/// Spawn one entity per canopy point under the given parent.
///
/// Every point shares the canopy mesh but owns its material, since its colour and twinkle are its
/// own. The per-point size scalar becomes the transform scale.
pub(crate) fn spawn_canopy(
    commands: &mut Commands,
    materials: &mut Assets<StandardMaterial>,
    assets: &SceneAssets,
    cloud: &ParticleCloud,
    parent: Entity,
) {
    debug!(points = cloud.len(), "Spawning canopy points");

    commands.entity(parent).with_children(|builder| {
        for index in 0..cloud.len() {
            let [r, g, b] = cloud.colours[index];
            let colour = Color::rgb(r, g, b);

            builder.spawn((
                PbrBundle {
                    mesh: assets.canopy_mesh.clone(),
                    material: materials.add(StandardMaterial {
                        base_color: colour,
                        emissive: colour,
                        perceptual_roughness: 0.8,
                        ..default()
                    }),
                    transform: Transform::from_translation(cloud.positions[index])
                        .with_scale(Vec3::splat(cloud.sizes[index] / TreeParams::BASE_SIZE)),
                    ..default()
                },
                CanopyIndex(index),
            ));
        }
    });
}

/// Spawn one entity per ornament light under the given parent, each with a child [`PointLight`]
/// so the ornaments actually cast light onto the canopy around them.
pub(crate) fn spawn_ornament_lights(
    commands: &mut Commands,
    materials: &mut Assets<StandardMaterial>,
    assets: &SceneAssets,
    ornaments: &[gp_cloud::OrnamentLight],
    parent: Entity,
) {
    debug!(lights = ornaments.len(), "Spawning ornament lights");

    commands.entity(parent).with_children(|builder| {
        for (index, ornament) in ornaments.iter().enumerate() {
            let [r, g, b] = ornament.colour;
            let colour = Color::rgb_u8(r, g, b);

            builder
                .spawn((
                    PbrBundle {
                        mesh: assets.ornament_mesh.clone(),
                        material: materials.add(StandardMaterial {
                            base_color: colour,
                            emissive: colour,
                            perceptual_roughness: 0.8,
                            ..default()
                        }),
                        transform: Transform::from_translation(ornament.position),
                        ..default()
                    },
                    OrnamentIndex(index),
                ))
                .with_children(|light_builder| {
                    light_builder.spawn(PointLightBundle {
                        point_light: PointLight {
                            color: colour,
                            intensity: 1.5,
                            range: 0.8,
                            shadows_enabled: false,
                            ..default()
                        },
                        ..default()
                    });
                });
        }
    });
}

/// Spawn one entity per snowflake under the given parent. All flakes share one white material.
pub(crate) fn spawn_snow(
    commands: &mut Commands,
    assets: &SceneAssets,
    snow: &SnowField,
    parent: Entity,
) {
    debug!(flakes = snow.len(), "Spawning snowflakes");

    commands.entity(parent).with_children(|builder| {
        for index in 0..snow.len() {
            builder.spawn((
                PbrBundle {
                    mesh: assets.flake_mesh.clone(),
                    material: assets.snow_material.clone(),
                    transform: Transform::from_translation(snow.positions[index]),
                    ..default()
                },
                SnowIndex(index),
            ));
        }
    });
}
