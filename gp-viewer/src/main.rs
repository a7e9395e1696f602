//! This binary renders the Glimmer Pine scene with Bevy: a procedural particle Christmas tree
//! with twinkling ornament lights, falling snow, a pulsing star topper, an orbitable camera, and
//! an egui panel of live-tunable parameters.
//!
//! Hold LControl and drag to orbit the camera; scroll to zoom.

mod bevy_setup;
mod systems;

use bevy::{log::LogPlugin, prelude::*};
use bevy_egui::EguiPlugin;
use gp_cloud::{OrnamentLight, ParticleCloud, SnowField};
use gp_effects::SceneConfig;
use smooth_bevy_cameras::{controllers::orbit::OrbitCameraPlugin, LookTransformPlugin};
use tracing::warn;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// The current scene parameters, edited live by the egui panel.
#[derive(Resource, Clone, Copy, Debug, Deref, DerefMut)]
pub(crate) struct Config(pub(crate) SceneConfig);

/// The active tree canopy cloud. Replaced wholesale on regeneration, never edited in place.
#[derive(Resource, Clone, Debug)]
pub(crate) struct CanopyCloud(pub(crate) ParticleCloud);

/// The active ornament lights.
#[derive(Resource, Clone, Debug)]
pub(crate) struct Ornaments(pub(crate) Vec<OrnamentLight>);

/// The active snow field. Its positions are stepped every frame and mirrored into transforms.
#[derive(Resource, Clone, Debug)]
pub(crate) struct Snow(pub(crate) SnowField);

/// Rebuild the tree canopy from the current config on the next frame.
pub(crate) struct RegenerateTree;

/// Rebuild the ornament lights from the current config on the next frame.
pub(crate) struct RegenerateLights;

/// Rebuild the snow field from the current config on the next frame.
pub(crate) struct RegenerateSnow;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    run_scene();

    // Winit terminates the program after the event loop ends, so we should never get here. If we
    // do, then we want to terminate the program manually.
    warn!(concat!(
        "Winit should terminate the program when the eventloop ends, but it hasn't. ",
        "Now terminating the program."
    ));
    std::process::exit(255);
}

/// Run the scene with Bevy.
///
/// Bevy's own `LogPlugin` is disabled because we initialise `tracing` ourselves in [`main`].
fn run_scene() {
    App::new()
        .insert_resource(Msaa { samples: 4 })
        .add_plugins(
            DefaultPlugins
                .build()
                .disable::<LogPlugin>()
                .set(WindowPlugin {
                    window: WindowDescriptor {
                        title: "Glimmer Pine".to_string(),
                        ..default()
                    },
                    ..default()
                }),
        )
        .add_plugin(LookTransformPlugin)
        .add_plugin(OrbitCameraPlugin::default())
        .add_plugin(EguiPlugin)
        .add_event::<RegenerateTree>()
        .add_event::<RegenerateLights>()
        .add_event::<RegenerateSnow>()
        .add_startup_system(bevy_setup::setup)
        .add_startup_system_to_stage(StartupStage::PostStartup, bevy_setup::spawn_initial_scene)
        .add_system(systems::ui_panel)
        .add_system(systems::apply_visibility.after(systems::ui_panel))
        // Regeneration swaps collections between animation passes, never mid-pass
        .add_system(systems::regenerate_tree.after(systems::ui_panel))
        .add_system(systems::regenerate_lights.after(systems::regenerate_tree))
        .add_system(systems::regenerate_snow.after(systems::ui_panel))
        .add_system(systems::sway.after(systems::regenerate_lights))
        .add_system(systems::animate_canopy.after(systems::regenerate_tree))
        .add_system(systems::animate_ornaments.after(systems::regenerate_lights))
        .add_system(systems::animate_topper)
        .add_system(systems::fall_snow.after(systems::regenerate_snow))
        .run();
}
