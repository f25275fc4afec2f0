//! Column projection: collision distance to a screen-space wall slice.

use crate::caster::{Collision, HitKind};
use crate::config::Config;

/// Perpendicular distances are clamped to this before projecting, so a hit
/// at the camera's own position still yields a finite column.
const MIN_DISTANCE: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `alpha` in [0, 1].
    pub fn rgba(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        }
    }
}

/// A slice to be drawn from a texture column instead of a flat fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturedColumn {
    pub code: u32,
    pub kind: HitKind,
    pub x: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    /// Horizontal texture coordinate in [0, 1).
    pub texture_x: f64,
    /// 0 (dark) ..= 255 (full light).
    pub brightness: f64,
}

/// Drawing capability consumed by the projector and the minimap.
pub trait Surface {
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color);

    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], color: Color);

    /// Draw a textured column. Returns `false` when the surface has no
    /// texture support, in which case the caller falls back to a flat fill.
    fn draw_textured_column(&mut self, _column: &TexturedColumn) -> bool {
        false
    }
}

/// Affine map of `value` from [in_lo, in_hi] onto [out_lo, out_hi].
#[inline]
pub fn map_value(value: f64, in_lo: f64, in_hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    (value - in_lo) * (out_hi - out_lo) / (in_hi - in_lo) + out_lo
}

/// Linear distance shading: 255 at the eye, 0 at `far_clip` and beyond.
#[inline]
pub fn brightness(distance: f64, far_clip: f64) -> f64 {
    map_value(distance, 0.0, far_clip, 255.0, 0.0).clamp(0.0, 255.0)
}

/// Euclidean ray length projected onto the view direction. Removes the
/// fish-eye bulge of rays cast away from the heading.
#[inline]
pub fn perpendicular_distance(dist_sq: f64, heading: f64, ray_angle: f64) -> f64 {
    dist_sq.sqrt() * (heading - ray_angle).cos()
}

/// Unrounded on-screen height of a unit-tall wall.
#[inline]
pub fn projected_height(viewing_distance: f64, perpendicular: f64) -> f64 {
    viewing_distance / perpendicular.max(MIN_DISTANCE)
}

/// A projected wall or object slice for one screen column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSlice {
    pub column: usize,
    pub x: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub brightness: f64,
    pub texture_x: f64,
    pub code: u32,
    pub kind: HitKind,
}

impl ColumnSlice {
    /// Flat fill colour: brightness on the red channel.
    pub fn color(&self) -> Color {
        Color::rgb(self.brightness.round() as u8, 0, 0)
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, textured: bool) {
        if textured {
            let column = TexturedColumn {
                code: self.code,
                kind: self.kind,
                x: self.x,
                top: self.top,
                width: self.width * 2,
                height: self.height,
                texture_x: self.texture_x,
                brightness: self.brightness,
            };
            if surface.draw_textured_column(&column) {
                return;
            }
        }
        surface.fill_rect(self.x, self.top, self.width, self.height, self.color());
    }
}

/// Screen geometry of the flat projection plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub screen_width: u32,
    pub screen_height: u32,
    pub strip_width: u32,
    pub num_columns: usize,
    /// Eye to projection plane, in pixels.
    pub viewing_distance: f64,
    pub far_clip: f64,
}

impl Projection {
    pub fn from_config(config: &Config) -> Self {
        Self {
            screen_width: config.screen_width,
            screen_height: config.screen_height,
            strip_width: config.strip_width,
            num_columns: config.num_columns(),
            viewing_distance: config.viewing_distance(),
            far_clip: config.far_clip,
        }
    }

    /// Horizontal pixel offset of `column` from the screen centre.
    #[inline]
    pub fn column_offset(&self, column: usize) -> f64 {
        (column as f64 - self.num_columns as f64 / 2.0) * self.strip_width as f64
    }

    /// Angle between the heading and the ray through `column`. Rays pass
    /// through evenly spaced points on the plane, not evenly spaced angles.
    pub fn angle_offset(&self, column: usize) -> f64 {
        let offset = self.column_offset(column);
        let vd = self.viewing_distance;
        (offset / (offset * offset + vd * vd).sqrt()).asin()
    }

    pub fn project(&self, hit: &Collision, heading: f64) -> ColumnSlice {
        let perpendicular = perpendicular_distance(hit.dist_sq, heading, hit.angle);
        let height = projected_height(self.viewing_distance, perpendicular).round();
        let top = ((self.screen_height as f64 - height) / 2.0).round();

        ColumnSlice {
            column: hit.column,
            x: (hit.column as u64 * self.strip_width as u64).min(i32::MAX as u64) as i32,
            top: top as i32,
            width: self.strip_width as i32,
            height: height as i32,
            brightness: brightness(perpendicular, self.far_clip),
            texture_x: hit.texture_x,
            code: hit.code,
            kind: hit.kind,
        }
    }
}
