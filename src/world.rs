//! Grid model: the occupancy map and its cell classification.

use std::path::Path;

use crate::error::{GridError, Result};

/// Reserved code placing the camera at load time. Behaves as empty afterwards.
pub const SPAWN_MARKER: u32 = 20;

/// First code of the translucent object range.
pub const FIRST_OBJECT_CODE: u32 = 10;

/// Built-in map used when no asset path is given.
pub const SAMPLE_MAP: &str = include_str!("../maps/sample.json");

/// Classification of a raw cell code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    /// Opaque wall (codes 1..=9). Blocks movement and terminates rays.
    Wall(u32),
    /// Translucent object (codes >= 10 except the spawn marker). Blocks
    /// movement, rays pass through it.
    Object(u32),
    Spawn,
}

impl Cell {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Cell::Empty,
            SPAWN_MARKER => Cell::Spawn,
            c if c < FIRST_OBJECT_CODE => Cell::Wall(c),
            c => Cell::Object(c),
        }
    }

    #[inline]
    pub fn is_blocking(self) -> bool {
        matches!(self, Cell::Wall(_) | Cell::Object(_))
    }

    /// Whether a ray reports this cell at all.
    #[inline]
    pub fn collides(self) -> bool {
        self.is_blocking()
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        matches!(self, Cell::Wall(_))
    }

    /// Raw code, or 0 for cells a ray never reports.
    pub fn code(self) -> u32 {
        match self {
            Cell::Wall(c) | Cell::Object(c) => c,
            Cell::Spawn => SPAWN_MARKER,
            Cell::Empty => 0,
        }
    }
}

/// Rectangular, immutable occupancy grid indexed by (column, row).
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    spawn: (usize, usize),
}

impl Grid {
    /// Validate and build a grid from row-major codes.
    pub fn from_rows(rows: &[Vec<i64>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        let mut spawns = Vec::new();
        for (row, values) in rows.iter().enumerate() {
            if values.len() != width {
                return Err(GridError::Ragged {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }
            for (col, &value) in values.iter().enumerate() {
                let code = u32::try_from(value)
                    .map_err(|_| GridError::InvalidCode { col, row, value })?;
                let cell = Cell::from_code(code);
                if cell == Cell::Spawn {
                    spawns.push((col, row));
                }
                cells.push(cell);
            }
        }

        if spawns.len() != 1 {
            return Err(GridError::SpawnCount(spawns.len()));
        }

        Ok(Self {
            width,
            height,
            cells,
            spawn: spawns[0],
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let rows: Vec<Vec<i64>> = serde_json::from_str(json)?;
        Self::from_rows(&rows)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let grid = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {}x{} grid from {}",
            grid.width,
            grid.height,
            path.display()
        );
        Ok(grid)
    }

    pub fn sample() -> Result<Self> {
        Self::from_json_str(SAMPLE_MAP)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell holding the spawn marker as (column, row).
    pub fn spawn(&self) -> (usize, usize) {
        self.spawn
    }

    /// Cell at integer coordinates, `None` outside the grid.
    #[inline]
    pub fn cell_at(&self, col: i64, row: i64) -> Option<Cell> {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return None;
        }
        Some(self.cells[row as usize * self.width + col as usize])
    }

    /// Whether the cell containing the continuous point (x, y) blocks movement.
    /// Anything outside the grid blocks.
    pub fn is_blocking_at(&self, x: f64, y: f64) -> bool {
        if x.is_nan() || y.is_nan() {
            return true;
        }
        self.cell_at(x.floor() as i64, y.floor() as i64)
            .is_none_or(Cell::is_blocking)
    }

    /// Iterate over every cell as ((column, row), cell).
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &cell)| ((i % self.width, i / self.width), cell))
    }
}
