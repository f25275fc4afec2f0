//! Simulation context
//!
//! Bundles the grid, the camera and the startup constants so one tick is a
//! plain function of (state, intents) with no module-level globals.

use crate::camera::{Camera, Intents};
use crate::caster::{Collision, cast_ray, order_hits};
use crate::config::Config;
use crate::error::{GridError, Result};
use crate::minimap::Minimap;
use crate::normalize_angle;
use crate::projector::{ColumnSlice, Projection};
use crate::world::Grid;

/// Presentation switches that may be toggled while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_minimap: bool,
    pub textures: bool,
}

pub struct Simulation {
    grid: Grid,
    camera: Camera,
    config: Config,
    projection: Projection,
    pub options: RenderOptions,
}

impl Simulation {
    /// Validate `config` and place the camera on the grid's spawn cell.
    pub fn new(grid: Grid, config: Config) -> Result<Self> {
        let camera = Camera::at_spawn(&grid);
        Self::with_camera(grid, config, camera)
    }

    /// Start from an explicit camera instead of the spawn cell. The camera
    /// must stand in a passable cell.
    pub fn with_camera(grid: Grid, config: Config, camera: Camera) -> Result<Self> {
        config.validate()?;
        let [x, y] = camera.pos;
        if grid.is_blocking_at(x, y) {
            return Err(GridError::BlockedStart { x, y });
        }

        let projection = Projection::from_config(&config);
        let options = RenderOptions {
            show_minimap: config.show_minimap,
            textures: config.textures,
        };
        Ok(Self {
            grid,
            camera,
            config,
            projection,
            options,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn minimap(&self) -> Minimap {
        Minimap::new(self.config.minimap_scale, self.config.minimap_offset)
    }

    /// Advance one fixed step. Speeds are per tick, so motion scales with
    /// the tick rate. Returns whether the camera moved.
    pub fn tick(&mut self, intents: &Intents) -> bool {
        self.camera.apply_intents(intents);
        self.camera
            .step(&self.grid, self.config.move_speed, self.config.turn_speed)
    }

    /// Absolute angle of the ray through screen `column`.
    pub fn ray_angle(&self, column: usize) -> f64 {
        normalize_angle(self.camera.heading + self.projection.angle_offset(column))
    }

    /// Collisions for one column in compositing order.
    pub fn cast_column(&self, column: usize) -> Vec<Collision> {
        let hits = cast_ray(&self.grid, self.camera.pos, self.ray_angle(column), column);
        order_hits(hits, self.config.composite_order)
    }

    /// Every column of the current frame, left to right.
    pub fn frame(&self) -> impl Iterator<Item = (usize, Vec<Collision>)> + '_ {
        (0..self.projection.num_columns).map(|column| (column, self.cast_column(column)))
    }

    pub fn project(&self, hit: &Collision) -> ColumnSlice {
        self.projection.project(hit, self.camera.heading)
    }
}
