//! Software framebuffer and whole-frame rendering.

use crate::caster::HitKind;
use crate::projector::{Color, Surface, TexturedColumn};
use crate::sim::Simulation;

const SKY: Color = Color::rgb(0x99, 0xcc, 0xff);
const GROUND: Color = Color::rgb(0x00, 0x99, 0x00);

const BRICK_COLORS: [Color; 4] = [
    Color::rgb(200, 200, 200),
    Color::rgb(180, 180, 250),
    Color::rgb(250, 180, 180),
    Color::rgb(180, 250, 180),
];
const MORTAR: Color = Color::rgb(90, 90, 90);
const WOOD: Color = Color::rgb(139, 90, 43);

#[inline]
fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

#[inline]
fn unpack_rgb(p: u32) -> (u8, u8, u8) {
    ((p >> 16) as u8, (p >> 8) as u8, p as u8)
}

/// Source-over blend of `src` onto the packed pixel `dst`.
#[inline]
fn blend(dst: u32, src: Color) -> u32 {
    if src.a == 255 {
        return pack_rgb(src.r, src.g, src.b);
    }
    let a = src.a as u32;
    let inv = 255 - a;
    let (dr, dg, db) = unpack_rgb(dst);
    let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * inv + 127) / 255) as u8;
    pack_rgb(mix(src.r, dr), mix(src.g, dg), mix(src.b, db))
}

#[inline]
fn shade(color: Color, brightness: f64) -> Color {
    let k = (brightness / 255.0).clamp(0.0, 1.0);
    let s = |c: u8| (c as f64 * k).round() as u8;
    Color { r: s(color.r), g: s(color.g), b: s(color.b), a: color.a }
}

/// Procedural texel for cell `code` at texture coordinates (u, v) in [0, 1).
/// `None` is a transparent texel.
fn texel(code: u32, kind: HitKind, u: f64, v: f64) -> Option<Color> {
    match kind {
        HitKind::Opaque => {
            let row = (v * 8.0).floor() as i64;
            let shift = if row % 2 == 0 { 0.0 } else { 0.5 };
            let mortar = (v * 8.0).fract() < 0.08 || (u * 4.0 + shift).fract() < 0.05;
            Some(if mortar {
                MORTAR
            } else {
                BRICK_COLORS[code as usize % BRICK_COLORS.len()]
            })
        }
        // Table: a top board on two legs
        HitKind::Translucent => {
            let board = (0.55..0.62).contains(&v);
            let leg = v >= 0.62 && !(0.12..=0.88).contains(&u);
            (board || leg).then_some(WOOD)
        }
    }
}

/// Packed-pixel software render target.
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixel at (x, y) as (r, g, b).
    pub fn rgb_at(&self, x: usize, y: usize) -> (u8, u8, u8) {
        unpack_rgb(self.pixels[y * self.width + x])
    }

    #[inline]
    fn plot(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.pixels[idx] = blend(self.pixels[idx], color);
    }

    /// Clip a span [start, start + len) to [0, limit).
    #[inline]
    fn clip(start: i32, len: i32, limit: usize) -> Option<(usize, usize)> {
        let lo = (start as i64).max(0);
        let hi = (start as i64 + len as i64).min(limit as i64);
        (lo < hi).then_some((lo as usize, hi as usize))
    }
}

impl Surface for Framebuffer {
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let (Some((x0, x1)), Some((y0, y1))) = (
            Self::clip(x, w, self.width),
            Self::clip(y, h, self.height),
        ) else {
            return;
        };

        for row in y0..y1 {
            let line = &mut self.pixels[row * self.width + x0..row * self.width + x1];
            for p in line {
                *p = blend(*p, color);
            }
        }
    }

    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], color: Color) {
        let dx = to[0] - from[0];
        let dy = to[1] - from[1];
        let steps = dx.abs().max(dy.abs()).ceil();
        if !steps.is_finite() {
            return;
        }
        let steps = steps as i64;
        if steps == 0 {
            self.plot(from[0].round() as i32, from[1].round() as i32, color);
            return;
        }
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = (from[0] + dx * t).round() as i32;
            let y = (from[1] + dy * t).round() as i32;
            self.plot(x, y, color);
        }
    }

    fn draw_textured_column(&mut self, col: &TexturedColumn) -> bool {
        if col.height <= 0 {
            return true;
        }
        let (Some((x0, x1)), Some((y0, y1))) = (
            Self::clip(col.x, col.width, self.width),
            Self::clip(col.top, col.height, self.height),
        ) else {
            return true;
        };

        let u = col.texture_x;
        for y in y0..y1 {
            let v = (y as f64 - col.top as f64 + 0.5) / col.height as f64;
            let Some(color) = texel(col.code, col.kind, u, v) else {
                continue;
            };
            let color = shade(color, col.brightness);
            for x in x0..x1 {
                let idx = y * self.width + x;
                self.pixels[idx] = blend(self.pixels[idx], color);
            }
        }
        true
    }
}

/// Render one frame of `sim` into `buf`: sky, ground, every column's slices in
/// cast order, then the minimap.
pub fn render_frame(buf: &mut Framebuffer, sim: &Simulation) {
    let (width, height) = (buf.width as i32, buf.height as i32);
    let mid = height / 2;
    buf.fill_rect(0, 0, width, mid, SKY);
    buf.fill_rect(0, mid, width, height - mid, GROUND);

    let textured = sim.options.textures;
    let mut wall_points = Vec::with_capacity(sim.projection().num_columns);
    for (_, hits) in sim.frame() {
        if let Some(wall) = hits.first().filter(|h| h.is_opaque()) {
            wall_points.push(wall.point);
        }
        for hit in &hits {
            sim.project(hit).draw(buf, textured);
        }
    }

    if sim.options.show_minimap {
        sim.minimap().draw(buf, sim.grid(), sim.camera().pos, &wall_points);
    }
}
