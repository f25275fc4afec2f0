//! Property tests for the sweep, movement and projection invariants.

use std::f64::consts::TAU;

use proptest::prelude::*;

use gridcaster::caster::{Axis, GridSweep};
use gridcaster::projector::{brightness, projected_height};
use gridcaster::{Camera, Grid};

/// Bordered `w` x `h` room with the spawn marker at (1, 1) and optional
/// interior cells from `fill`.
fn room(w: usize, h: usize, fill: &[i64]) -> Grid {
    let mut rows = vec![vec![0i64; w]; h];
    for (row, cells) in rows.iter_mut().enumerate() {
        for (col, cell) in cells.iter_mut().enumerate() {
            if row == 0 || col == 0 || row == h - 1 || col == w - 1 {
                *cell = 1;
            } else if !fill.is_empty() {
                *cell = fill[(row * w + col) % fill.len()];
            }
        }
    }
    rows[1][1] = 20;
    Grid::from_rows(&rows).unwrap()
}

fn open(w: usize, h: usize) -> Grid {
    let mut rows = vec![vec![0i64; w]; h];
    rows[0][0] = 20;
    Grid::from_rows(&rows).unwrap()
}

fn circular_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TAU);
    d.min(TAU - d)
}

proptest! {
    #[test]
    fn sweeps_are_bounded(
        w in 1usize..40,
        h in 1usize..40,
        fx in 0.0f64..1.0,
        fy in 0.0f64..1.0,
        angle in 0.0f64..TAU,
    ) {
        let grid = open(w, h);
        let origin = [fx * w as f64, fy * h as f64];
        for axis in [Axis::Vertical, Axis::Horizontal] {
            let steps = GridSweep::new(&grid, origin, angle, axis).count();
            prop_assert!(steps <= w + h);
        }
    }

    #[test]
    fn open_grid_always_commits(
        w in 3usize..20,
        h in 3usize..20,
        fx in 0.25f64..0.75,
        fy in 0.25f64..0.75,
        heading in 0.0f64..TAU,
    ) {
        let grid = open(w, h);
        let start = [fx * w as f64, fy * h as f64];
        prop_assert!(!grid.is_blocking_at(start[0], start[1]));

        let mut camera = Camera::new(start, heading);
        camera.move_intent = 1;
        prop_assert!(camera.step(&grid, 0.1, 0.0));
        prop_assert!((camera.pos[0] - (start[0] + heading.cos() * 0.1)).abs() < 1e-12);
        prop_assert!((camera.pos[1] - (start[1] + heading.sin() * 0.1)).abs() < 1e-12);
    }

    #[test]
    fn movement_never_enters_blocking_cells(
        fill in prop::collection::vec(prop_oneof![Just(0i64), Just(0i64), Just(3i64), Just(11i64)], 1..30),
        turns in prop::collection::vec(-1i8..=1, 1..200),
        moves in prop::collection::vec(-1i8..=1, 1..200),
        speed in 0.05f64..0.9,
    ) {
        let grid = room(9, 7, &fill);
        let mut camera = Camera::at_spawn(&grid);
        prop_assert!(!grid.is_blocking_at(camera.pos[0], camera.pos[1]));

        for (turn, advance) in turns.iter().zip(moves.iter().cycle()) {
            camera.turn_intent = *turn;
            camera.move_intent = *advance;
            camera.step(&grid, speed, 0.3);
            prop_assert!(!grid.is_blocking_at(camera.pos[0], camera.pos[1]));
        }
    }

    #[test]
    fn heading_wraps_exactly(n in 0usize..5000, speed in 0.0f64..1.0) {
        let grid = open(3, 3);
        let mut camera = Camera::new([1.5, 1.5], 0.0);
        camera.turn_intent = 1;
        for _ in 0..n {
            camera.step(&grid, 0.0, speed);
        }
        prop_assert!(camera.heading >= 0.0 && camera.heading < TAU);
        let expected = (n as f64 * speed).rem_euclid(TAU);
        prop_assert!(circular_diff(camera.heading, expected) < 1e-9);
    }

    #[test]
    fn height_decreases_with_distance(
        vd in 1.0f64..5000.0,
        near in 0.01f64..100.0,
        gap in 1e-6f64..100.0,
    ) {
        let far = near + gap;
        prop_assert!(projected_height(vd, near) > projected_height(vd, far));
        prop_assert!(projected_height(vd, near).round() >= projected_height(vd, far).round());
    }

    #[test]
    fn shading_is_affine_and_monotone(
        far_clip in 1.0f64..100.0,
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
    ) {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        prop_assert!(brightness(lo * far_clip, far_clip) >= brightness(hi * far_clip, far_clip));
        let expected = 255.0 * (1.0 - a);
        prop_assert!((brightness(a * far_clip, far_clip) - expected).abs() < 1e-9);
    }
}

#[test]
fn shading_endpoints() {
    assert_eq!(brightness(0.0, 32.0), 255.0);
    assert_eq!(brightness(16.0, 32.0), 127.5);
    assert_eq!(brightness(32.0, 32.0), 0.0);
}
