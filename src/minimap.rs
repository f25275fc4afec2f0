//! Top-down overview drawn over the 3D view.

use crate::projector::{Color, Surface};
use crate::world::{Cell, Grid};

pub struct Minimap {
    /// Pixels per grid cell.
    pub scale: f64,
    /// Distance of the map from the top-left corner, in pixels.
    pub offset: f64,
}

impl Minimap {
    pub fn new(scale: u32, offset: u32) -> Self {
        Self {
            scale: scale as f64,
            offset: offset as f64,
        }
    }

    /// Grid coordinates to screen pixels.
    #[inline]
    pub fn to_screen(&self, [x, y]: [f64; 2]) -> [f64; 2] {
        [x * self.scale + self.offset, y * self.scale + self.offset]
    }

    /// Draw the opaque walls, then a faint ray from `camera` to each wall hit.
    pub fn draw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        grid: &Grid,
        camera: [f64; 2],
        wall_points: &[[f64; 2]],
    ) {
        let wall = Color::rgba(0, 0, 0, 0.3);
        let size = self.scale.round() as i32;
        for ((col, row), cell) in grid.cells() {
            if let Cell::Wall(_) = cell {
                let [x, y] = self.to_screen([col as f64, row as f64]);
                surface.fill_rect(x.round() as i32, y.round() as i32, size, size, wall);
            }
        }

        let ray = Color::rgba(30, 30, 30, 0.2);
        let eye = self.to_screen(camera);
        for &point in wall_points {
            surface.stroke_line(eye, self.to_screen(point), ray);
        }
    }
}
