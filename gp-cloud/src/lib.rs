//! This crate provides the particle data model for Glimmer Pine: the procedurally generated tree
//! canopy cloud, the ornament lights sampled from it, and the falling snow field.
//!
//! Everything in here is plain data plus closed-form generation. The crates above this one decide
//! how the data is rendered; this crate only guarantees the shape of the distributions.

pub mod cloud;
pub mod ornament;
pub mod snow;

pub use self::{
    cloud::{ParticleCloud, TreeParams, MIN_TREE_POINTS},
    ornament::{place_ornaments, OrnamentLight, PALETTE},
    snow::{SnowField, SnowParams},
};
