//! gridcaster - first-person ray casting over a 2D occupancy grid
//!
//! Core modules:
//! - `world`: occupancy grid and cell classification
//! - `camera`: player state and the movement resolver
//! - `caster`: grid sweeps producing ordered ray collisions
//! - `projector`: distance-to-column projection, shading, drawing surface
//! - `sim`: per-frame orchestration over an explicit simulation context
//! - `renderer`, `minimap`, `scaler`: software presentation

pub mod camera;
pub mod caster;
pub mod config;
pub mod error;
pub mod minimap;
pub mod projector;
pub mod renderer;
pub mod scaler;
pub mod sim;
pub mod world;

pub use camera::{Camera, Intents};
pub use caster::{Collision, HitKind, cast_ray};
pub use config::{CompositeOrder, Config};
pub use error::{GridError, Result};
pub use projector::{ColumnSlice, Projection, Surface};
pub use renderer::Framebuffer;
pub use sim::Simulation;
pub use world::{Cell, Grid};

use std::f64::consts::TAU;

/// Normalize angle to [0, 2pi)
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if a >= TAU { 0.0 } else { a }
}
