//! This crate provides the per-frame animation maths for Glimmer Pine, as well as the scene
//! configuration and its GUI.
//!
//! The animation functions are all pure: they map `(elapsed time, per-point data, params)` to a
//! scalar or offset and keep no state between calls, so the scene looks identical no matter how
//! often or rarely frames are produced.

pub mod animate;
pub mod config;

pub use self::{
    animate::{
        canopy_twinkle, ornament_scale, ornament_twinkle, shimmer, sway_yaw, topper_pulse,
    },
    config::SceneConfig,
};
