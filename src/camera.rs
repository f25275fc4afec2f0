//! Camera state and the movement resolver.

use crate::normalize_angle;
use crate::world::Grid;

/// Movement keys as last written by the input layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intents {
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub back: bool,
}

impl Intents {
    /// -1 (left), 0 or 1 (right). Right wins when both are held.
    pub fn turn(&self) -> i8 {
        if self.right {
            1
        } else if self.left {
            -1
        } else {
            0
        }
    }

    /// -1 (back), 0 or 1 (forward). Forward wins when both are held.
    pub fn advance(&self) -> i8 {
        if self.forward {
            1
        } else if self.back {
            -1
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub pos: [f64; 2], // (x, y) in grid cells
    pub heading: f64,  // radians in [0, 2pi), 0 faces +x, pi/2 faces +y
    pub turn_intent: i8,
    pub move_intent: i8,
}

impl Camera {
    pub fn new(pos: [f64; 2], heading: f64) -> Self {
        Self {
            pos,
            heading: normalize_angle(heading),
            turn_intent: 0,
            move_intent: 0,
        }
    }

    /// Place the camera on the grid's spawn cell, facing +x.
    pub fn at_spawn(grid: &Grid) -> Self {
        let (col, row) = grid.spawn();
        log::info!("Spawning camera at ({col}, {row})");
        Self::new([col as f64, row as f64], 0.0)
    }

    /// Latch the intents for the next step.
    pub fn apply_intents(&mut self, intents: &Intents) {
        self.turn_intent = intents.turn();
        self.move_intent = intents.advance();
    }

    /// Turn, then propose a move along the new heading and commit it only if
    /// the destination cell is inside the grid and passable. Returns whether
    /// the position changed.
    pub fn step(&mut self, grid: &Grid, move_speed: f64, turn_speed: f64) -> bool {
        self.heading = normalize_angle(self.heading + self.turn_intent as f64 * turn_speed);

        let d = self.move_intent as f64 * move_speed;
        if d == 0.0 {
            return false;
        }

        let x = self.pos[0] + self.heading.cos() * d;
        let y = self.pos[1] + self.heading.sin() * d;
        if grid.is_blocking_at(x, y) {
            log::trace!("Move to ({x:.3}, {y:.3}) rejected");
            return false;
        }

        self.pos = [x, y];
        true
    }
}
