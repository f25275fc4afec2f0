//! Ray casting over the occupancy grid.
//!
//! A ray is traced by two independent sweeps: one visiting every vertical grid
//! line (x = integer) the ray crosses, one visiting every horizontal grid line
//! (y = integer). Each sweep costs one step per line crossed. The nearest
//! opaque hit of the two terminates the ray; translucent hits from both are
//! kept for layered drawing.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::config::CompositeOrder;
use crate::normalize_angle;
use crate::world::Grid;

/// Below this the ray runs parallel to the lines a sweep visits.
const PARALLEL_EPS: f64 = 1e-12;

/// Which family of grid lines a sweep crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Lines x = n, stepping across columns.
    Vertical,
    /// Lines y = n, stepping across rows.
    Horizontal,
}

impl Axis {
    /// Split a world pair into (stepped, interpolated) components.
    #[inline]
    fn split<T>(self, [x, y]: [T; 2]) -> (T, T) {
        match self {
            Axis::Vertical => (x, y),
            Axis::Horizontal => (y, x),
        }
    }

    #[inline]
    fn join<T>(self, major: T, minor: T) -> [T; 2] {
        match self {
            Axis::Vertical => [major, minor],
            Axis::Horizontal => [minor, major],
        }
    }
}

/// Direction of travel along the stepped axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Increasing coordinate (moving right / down the rows).
    Forward,
    /// Decreasing coordinate (moving left / up the rows).
    Backward,
}

impl Step {
    /// Direction of a ray at `angle` (in [0, 2pi)) along `axis`.
    pub fn of(axis: Axis, angle: f64) -> Self {
        let forward = match axis {
            Axis::Vertical => !(FRAC_PI_2..=3.0 * FRAC_PI_2).contains(&angle),
            Axis::Horizontal => angle <= PI,
        };
        if forward { Step::Forward } else { Step::Backward }
    }

    #[inline]
    fn sign(self) -> f64 {
        match self {
            Step::Forward => 1.0,
            Step::Backward => -1.0,
        }
    }

    /// First grid line at or beyond `v` in the direction of travel.
    #[inline]
    fn first_line(self, v: f64) -> f64 {
        match self {
            Step::Forward => v.ceil(),
            Step::Backward => v.floor(),
        }
    }

    /// Offset from a grid line to the cell being entered.
    #[inline]
    fn entered_bias(self) -> f64 {
        match self {
            Step::Forward => 0.0,
            Step::Backward => -1.0,
        }
    }
}

/// One grid-line crossing visited by a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub point: [f64; 2],
    /// Cell being entered, as (column, row). May lie outside the grid when
    /// stepping backward across line 0.
    pub cell: [i64; 2],
    /// Position along the crossed face in [0, 1], mirrored for backward travel
    /// so it always runs left to right as seen by the viewer.
    pub offset: f64,
}

/// Iterator over the crossings of one axis, in order of travel, ending when
/// the crossing point leaves the grid.
#[derive(Debug, Clone)]
pub struct GridSweep {
    axis: Axis,
    step: Step,
    major: f64,
    minor: f64,
    slope: f64,
    major_len: f64,
    minor_len: f64,
    done: bool,
}

impl GridSweep {
    pub fn new(grid: &Grid, origin: [f64; 2], angle: f64, axis: Axis) -> Self {
        let angle = normalize_angle(angle);
        let step = Step::of(axis, angle);
        let (o_major, o_minor) = axis.split(origin);
        let (d_major, d_minor) = axis.split([angle.cos(), angle.sin()]);
        let (major_len, minor_len) = axis.split([grid.width() as f64, grid.height() as f64]);

        let slope = d_minor / d_major;
        let major = step.first_line(o_major);
        let minor = o_minor + (major - o_major) * slope;

        Self {
            axis,
            step,
            major,
            minor,
            slope,
            major_len,
            minor_len,
            done: d_major.abs() < PARALLEL_EPS,
        }
    }
}

impl Iterator for GridSweep {
    type Item = Crossing;

    fn next(&mut self) -> Option<Crossing> {
        if self.done {
            return None;
        }
        let inside = self.major >= 0.0
            && self.major < self.major_len
            && self.minor >= 0.0
            && self.minor < self.minor_len;
        if !inside {
            self.done = true;
            return None;
        }

        let cell_major = (self.major + self.step.entered_bias()).floor() as i64;
        let cell_minor = self.minor.floor() as i64;
        let frac = self.minor - self.minor.floor();
        let offset = match self.step {
            Step::Forward => frac,
            Step::Backward => 1.0 - frac,
        };

        let crossing = Crossing {
            point: self.axis.join(self.major, self.minor),
            cell: self.axis.join(cell_major, cell_minor),
            offset,
        };

        let sign = self.step.sign();
        self.major += sign;
        self.minor += sign * self.slope;

        Some(crossing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    /// Terminates the ray.
    Opaque,
    /// Recorded, the ray continues.
    Translucent,
}

/// A ray/cell intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub code: u32,
    /// Screen column the ray belongs to.
    pub column: usize,
    /// Absolute ray angle in [0, 2pi).
    pub angle: f64,
    /// Squared euclidean distance from the camera to `point`.
    pub dist_sq: f64,
    /// Position along the hit face in [0, 1], used for texture sampling.
    /// A backward hit exactly on a grid line reports 1.0.
    pub texture_x: f64,
    pub point: [f64; 2],
    pub kind: HitKind,
}

impl Collision {
    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.kind == HitKind::Opaque
    }
}

/// Run one sweep, appending translucent hits to `translucent` and returning
/// the opaque hit that ended it, if any.
fn sweep(
    grid: &Grid,
    origin: [f64; 2],
    angle: f64,
    column: usize,
    axis: Axis,
    translucent: &mut Vec<Collision>,
) -> Option<Collision> {
    for crossing in GridSweep::new(grid, origin, angle, axis) {
        let [col, row] = crossing.cell;
        let Some(cell) = grid.cell_at(col, row).filter(|c| c.collides()) else {
            continue;
        };

        let dx = crossing.point[0] - origin[0];
        let dy = crossing.point[1] - origin[1];
        let mut hit = Collision {
            code: cell.code(),
            column,
            angle,
            dist_sq: dx * dx + dy * dy,
            texture_x: crossing.offset,
            point: crossing.point,
            kind: HitKind::Translucent,
        };

        if cell.is_opaque() {
            hit.kind = HitKind::Opaque;
            return Some(hit);
        }
        translucent.push(hit);
    }
    None
}

/// Cast the ray for screen `column` at absolute `angle` from `origin`.
///
/// The result starts with the terminating wall (when the ray hits one before
/// leaving the grid), followed by every translucent hit from both sweeps in
/// reverse collection order: horizontal-sweep hits farthest first, then
/// vertical-sweep hits farthest first.
pub fn cast_ray(grid: &Grid, origin: [f64; 2], angle: f64, column: usize) -> Vec<Collision> {
    let angle = normalize_angle(angle);
    let mut translucent = Vec::new();

    let vertical = sweep(grid, origin, angle, column, Axis::Vertical, &mut translucent);
    let horizontal = sweep(grid, origin, angle, column, Axis::Horizontal, &mut translucent);

    let wall = match (vertical, horizontal) {
        (Some(v), Some(h)) => Some(if h.dist_sq < v.dist_sq { h } else { v }),
        (v, h) => v.or(h),
    };

    let mut hits = Vec::with_capacity(translucent.len() + 1);
    hits.extend(wall);
    hits.extend(translucent.into_iter().rev());
    hits
}

/// Reorder a [`cast_ray`] result for compositing.
pub fn order_hits(mut hits: Vec<Collision>, order: CompositeOrder) -> Vec<Collision> {
    if order == CompositeOrder::Reference {
        return hits;
    }

    let wall = match hits.first() {
        Some(first) if first.is_opaque() => Some(hits.remove(0)),
        _ => None,
    };
    if let Some(wall) = &wall {
        hits.retain(|hit| hit.dist_sq < wall.dist_sq);
    }
    hits.sort_by(|a, b| b.dist_sq.total_cmp(&a.dist_sq));

    if let Some(wall) = wall {
        hits.insert(0, wall);
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    fn room(object: Option<(usize, usize, i64)>) -> Grid {
        let mut rows = vec![
            vec![1, 1, 1, 1, 1],
            vec![1, 0, 0, 0, 1],
            vec![1, 0, 20, 0, 1],
            vec![1, 0, 0, 0, 1],
            vec![1, 1, 1, 1, 1],
        ];
        if let Some((col, row, code)) = object {
            rows[row][col] = code;
        }
        Grid::from_rows(&rows).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_direction_flags() {
        assert_eq!(Step::of(Axis::Vertical, 0.0), Step::Forward);
        assert_eq!(Step::of(Axis::Vertical, 1.6 * PI), Step::Forward);
        assert_eq!(Step::of(Axis::Vertical, PI), Step::Backward);
        assert_eq!(Step::of(Axis::Horizontal, 0.5 * PI), Step::Forward);
        assert_eq!(Step::of(Axis::Horizontal, 1.5 * PI), Step::Backward);
        assert_eq!(Step::of(Axis::Horizontal, PI), Step::Forward);
    }

    #[test]
    fn test_parallel_sweep_is_empty() {
        let grid = room(None);
        assert_eq!(GridSweep::new(&grid, [2.0, 2.0], 0.0, Axis::Horizontal).count(), 0);
        assert_eq!(GridSweep::new(&grid, [2.0, 2.0], PI / 2.0, Axis::Vertical).count(), 0);
    }

    #[test]
    fn test_sweep_visits_each_column_line() {
        let grid = room(None);
        let xs: Vec<f64> = GridSweep::new(&grid, [2.0, 2.0], 0.0, Axis::Vertical)
            .map(|c| c.point[0])
            .collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_east_ray_hits_border() {
        let grid = room(None);
        let hits = cast_ray(&grid, [2.0, 2.0], 0.0, 7);

        assert_eq!(hits.len(), 1);
        let wall = hits[0];
        assert!(wall.is_opaque());
        assert_eq!(wall.code, 1);
        assert_eq!(wall.column, 7);
        assert!(approx(wall.point[0], 4.0));
        assert!(approx(wall.point[1], 2.0));
        assert!(approx(wall.dist_sq, 4.0));
    }

    #[test]
    fn test_translucent_follows_wall() {
        let grid = room(Some((3, 2, 15)));
        let hits = cast_ray(&grid, [2.0, 2.0], 0.0, 0);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].kind, HitKind::Opaque);
        assert!(approx(hits[0].point[0], 4.0));
        assert_eq!(hits[1].kind, HitKind::Translucent);
        assert_eq!(hits[1].code, 15);
        assert!(approx(hits[1].point[0], 3.0));
        assert!(approx(hits[1].dist_sq, 1.0));
    }

    #[test]
    fn test_south_ray_uses_horizontal_sweep() {
        let grid = room(None);
        let hits = cast_ray(&grid, [2.25, 2.5], PI / 2.0, 0);
        let wall = hits[0];
        assert!(approx(wall.point[1], 4.0));
        assert!(approx(wall.point[0], 2.25));
        assert!(approx(wall.dist_sq, 2.25));
        assert!(approx(wall.texture_x, 0.25));
    }

    #[test]
    fn test_texture_offset_mirrors_backward() {
        let grid = room(None);

        let north = cast_ray(&grid, [2.25, 2.5], 1.5 * PI, 0)[0];
        assert!(approx(north.point[1], 1.0));
        assert!(approx(north.texture_x, 0.75));

        let west = cast_ray(&grid, [2.5, 2.25], PI, 0)[0];
        assert!(approx(west.point[0], 1.0));
        assert!(approx(west.texture_x, 0.75));
    }

    #[test]
    fn test_texture_offset_on_grid_line() {
        let grid = room(None);

        // Forward hit on a line starts the face, backward hit ends it
        let east = cast_ray(&grid, [2.5, 2.0], 0.0, 0)[0];
        assert_eq!(east.point, [4.0, 2.0]);
        assert_eq!(east.texture_x, 0.0);

        let west = cast_ray(&grid, [2.5, 2.0], PI, 0)[0];
        assert_eq!(west.point[0], 1.0);
        assert_eq!(west.texture_x, 1.0);
        assert!((0.0..=1.0).contains(&west.texture_x));
    }

    #[test]
    fn test_diagonal_picks_nearest_wall() {
        let grid = room(None);
        let hits = cast_ray(&grid, [2.5, 2.5], FRAC_PI_4, 0);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].dist_sq - 4.5).abs() < 1e-6);
    }

    #[test]
    fn test_spawn_cell_is_transparent() {
        let grid = room(None);
        // Start left of the spawn cell, looking through it
        let hits = cast_ray(&grid, [1.5, 2.5], 0.0, 0);
        assert_eq!(hits.len(), 1);
        assert!(approx(hits[0].point[0], 4.0));
    }

    #[test]
    fn test_open_grid_has_no_wall() {
        let grid = Grid::from_rows(&[vec![0, 0, 0], vec![0, 20, 0], vec![0, 11, 0]]).unwrap();
        let hits = cast_ray(&grid, [1.5, 1.5], 0.0, 0);
        assert!(hits.is_empty());

        let hits = cast_ray(&grid, [1.5, 1.5], PI / 2.0, 0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, HitKind::Translucent);
    }

    #[test]
    fn test_negative_angle_is_normalized() {
        let grid = room(None);
        let hits = cast_ray(&grid, [2.5, 2.5], -PI / 2.0, 0);
        assert!(approx(hits[0].angle, 1.5 * PI));
        assert!(approx(hits[0].point[1], 1.0));
    }

    fn hit(kind: HitKind, dist_sq: f64) -> Collision {
        Collision {
            code: if kind == HitKind::Opaque { 1 } else { 11 },
            column: 0,
            angle: 0.0,
            dist_sq,
            texture_x: 0.0,
            point: [0.0, 0.0],
            kind,
        }
    }

    #[test]
    fn test_order_hits() {
        let hits = vec![
            hit(HitKind::Opaque, 9.0),
            hit(HitKind::Translucent, 1.0),
            hit(HitKind::Translucent, 16.0),
            hit(HitKind::Translucent, 4.0),
        ];

        let same = order_hits(hits.clone(), CompositeOrder::Reference);
        assert_eq!(same, hits);

        let sorted = order_hits(hits, CompositeOrder::DepthSorted);
        let dists: Vec<f64> = sorted.iter().map(|h| h.dist_sq).collect();
        assert_eq!(dists, vec![9.0, 4.0, 1.0]);
        assert!(sorted[0].is_opaque());
    }

    #[test]
    fn test_order_hits_without_wall() {
        let hits = vec![hit(HitKind::Translucent, 1.0), hit(HitKind::Translucent, 4.0)];
        let sorted = order_hits(hits, CompositeOrder::DepthSorted);
        let dists: Vec<f64> = sorted.iter().map(|h| h.dist_sq).collect();
        assert_eq!(dists, vec![4.0, 1.0]);
    }
}
