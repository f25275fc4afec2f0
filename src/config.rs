//! Startup configuration.
//!
//! Values are fixed for the lifetime of the process. A JSON file may override
//! any subset of the fields; the rest keep their defaults.

use std::f64::consts::PI;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Order in which translucent hits are handed to the projector after the wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompositeOrder {
    /// Wall, then translucent hits in reversed collection order.
    #[default]
    Reference,
    /// Wall, then translucent hits in front of it, farthest first.
    DepthSorted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub screen_width: u32,
    pub screen_height: u32,
    /// Screen pixels covered by one ray.
    pub strip_width: u32,
    /// Horizontal field of view in radians.
    pub fov: f64,
    /// Grid cells per tick.
    pub move_speed: f64,
    /// Radians per tick.
    pub turn_speed: f64,
    pub minimap_scale: u32,
    /// Minimap distance from the top-left corner, in pixels.
    pub minimap_offset: u32,
    /// Target ticks per second.
    pub tick_rate: u32,
    /// Distance at which shading reaches full dark.
    pub far_clip: f64,
    pub show_minimap: bool,
    pub textures: bool,
    pub composite_order: CompositeOrder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen_width: 1280,
            screen_height: 720,
            strip_width: 2,
            fov: 60.0_f64.to_radians(),
            move_speed: 0.1,
            turn_speed: 2.0_f64.to_radians(),
            minimap_scale: 4,
            minimap_offset: 20,
            tick_rate: 60,
            far_clip: 32.0,
            show_minimap: true,
            textures: false,
            composite_order: CompositeOrder::Reference,
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(GridError::Config(msg.to_string()));

        if self.screen_width == 0 || self.screen_height == 0 {
            return invalid("screen dimensions must be non-zero");
        }
        if self.strip_width == 0 {
            return invalid("strip_width must be non-zero");
        }
        if self.fov.is_nan() || self.fov <= 0.0 || self.fov >= PI {
            return invalid("fov must lie in (0, pi)");
        }
        if self.tick_rate == 0 {
            return invalid("tick_rate must be non-zero");
        }
        if !self.far_clip.is_finite() || self.far_clip <= 0.0 {
            return invalid("far_clip must be positive");
        }
        if !self.move_speed.is_finite() || !self.turn_speed.is_finite() {
            return invalid("speeds must be finite");
        }
        Ok(())
    }

    /// Number of rays cast per frame.
    pub fn num_columns(&self) -> usize {
        self.screen_width.div_ceil(self.strip_width) as usize
    }

    /// Distance from the eye to the projection plane, in pixels.
    pub fn viewing_distance(&self) -> f64 {
        self.screen_width as f64 / 2.0 / (self.fov / 2.0).tan()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate as f64)
    }
}
