//! # Passability Grid
//!
//! The solid/open terrain grid handed to collision, and door carving.

use crate::config::DOOR_BAND_DIVISOR;
use log::debug;
use pathfinding::prelude::bfs_reach;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

/// Collision state of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Passability {
    Solid,
    Open,
}

impl Passability {
    /// Solid for `true`, open for `false`.
    pub fn from_solid(solid: bool) -> Self {
        if solid {
            Passability::Solid
        } else {
            Passability::Open
        }
    }

    /// Checks whether this cell blocks movement.
    pub fn is_solid(self) -> bool {
        self == Passability::Solid
    }

    fn glyph(self) -> char {
        match self {
            Passability::Solid => '#',
            Passability::Open => '.',
        }
    }
}

/// Page edge a door is carved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorDirection {
    Up,
    Down,
    Left,
    Right,
}

impl DoorDirection {
    /// Returns all four directions.
    pub fn all() -> [DoorDirection; 4] {
        [
            DoorDirection::Up,
            DoorDirection::Down,
            DoorDirection::Left,
            DoorDirection::Right,
        ]
    }

    /// Rows and columns of the quarter band along this edge of an `n`×`n` grid.
    ///
    /// The band is `n - 3n/4` cells deep, so every non-empty grid has one.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagegen::DoorDirection;
    ///
    /// let (rows, cols) = DoorDirection::Right.band(8);
    /// assert_eq!(rows, 0..8);
    /// assert_eq!(cols, 6..8);
    /// ```
    pub fn band(self, n: usize) -> (Range<usize>, Range<usize>) {
        let depth = n - (n * (DOOR_BAND_DIVISOR - 1)) / DOOR_BAND_DIVISOR;
        match self {
            DoorDirection::Up => (0..depth, 0..n),
            DoorDirection::Down => (n - depth..n, 0..n),
            DoorDirection::Left => (0..n, 0..depth),
            DoorDirection::Right => (0..n, n - depth..n),
        }
    }
}

impl std::str::FromStr for DoorDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(DoorDirection::Up),
            "down" => Ok(DoorDirection::Down),
            "left" => Ok(DoorDirection::Left),
            "right" => Ok(DoorDirection::Right),
            other => Err(format!("unknown door direction '{}'", other)),
        }
    }
}

/// Resolved collision terrain for one page.
///
/// Keeps the tile identifier of every cell so doors can be carved after
/// resolution. Deserializing checks that both layers hold `size × size` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PassabilityGridData")]
pub struct PassabilityGrid {
    size: usize,
    cells: Vec<Passability>,
    terrain: Vec<u32>,
    exit_marker: Option<u32>,
}

/// Unchecked wire form of [`PassabilityGrid`].
#[derive(Deserialize)]
struct PassabilityGridData {
    size: usize,
    cells: Vec<Passability>,
    terrain: Vec<u32>,
    exit_marker: Option<u32>,
}

impl TryFrom<PassabilityGridData> for PassabilityGrid {
    type Error = String;

    fn try_from(data: PassabilityGridData) -> Result<Self, Self::Error> {
        let expected = data
            .size
            .checked_mul(data.size)
            .ok_or_else(|| format!("grid size {} overflows", data.size))?;
        if data.cells.len() != expected || data.terrain.len() != expected {
            return Err(format!(
                "expected {} cells for a {}x{} grid, found {} cells and {} terrain ids",
                expected,
                data.size,
                data.size,
                data.cells.len(),
                data.terrain.len()
            ));
        }
        Ok(Self::new(data.size, data.cells, data.terrain, data.exit_marker))
    }
}

impl PassabilityGrid {
    pub(crate) fn new(
        size: usize,
        cells: Vec<Passability>,
        terrain: Vec<u32>,
        exit_marker: Option<u32>,
    ) -> Self {
        debug_assert_eq!(cells.len(), size * size);
        debug_assert_eq!(terrain.len(), size * size);
        Self {
            size,
            cells,
            terrain,
            exit_marker,
        }
    }

    /// The default empty page: a solid border around an open interior.
    ///
    /// Built directly rather than through a rule table, so the shape holds
    /// whatever the configured vocabulary says about `wall_id`.
    pub fn fallback(
        size: usize,
        wall_id: u32,
        background_id: u32,
        exit_marker: Option<u32>,
    ) -> Self {
        let last = size.saturating_sub(1);
        let (cells, terrain): (Vec<Passability>, Vec<u32>) = (0..size * size)
            .map(|i| {
                let (row, col) = (i / size, i % size);
                if row == 0 || col == 0 || row == last || col == last {
                    (Passability::Solid, wall_id)
                } else {
                    (Passability::Open, background_id)
                }
            })
            .unzip();
        Self::new(size, cells, terrain, exit_marker)
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell at `(row, col)`, if in bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Passability> {
        if row < self.size && col < self.size {
            self.cells.get(row * self.size + col).copied()
        } else {
            None
        }
    }

    /// Checks whether `(row, col)` is solid. Out-of-bounds cells count as solid.
    pub fn is_solid(&self, row: usize, col: usize) -> bool {
        self.get(row, col).map_or(true, Passability::is_solid)
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Passability] {
        &self.cells
    }

    /// Tile identifier of every cell, row-major.
    pub fn terrain(&self) -> &[u32] {
        &self.terrain
    }

    /// Iterates over rows of cells.
    pub fn rows(&self) -> impl Iterator<Item = &[Passability]> {
        self.cells.chunks(self.size.max(1))
    }

    /// Number of solid cells.
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_solid()).count()
    }

    /// Positions of all solid cells, row-major.
    pub fn solid_positions(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_solid())
            .map(|(i, _)| (i / self.size, i % self.size))
            .collect()
    }

    /// Opens every exit marker inside the band along `direction`.
    ///
    /// Cells outside the band, or with any other identifier, are untouched.
    /// Carving twice in the same direction changes nothing the second time.
    /// Returns how many cells went from solid to open.
    pub fn carve_door(&mut self, direction: DoorDirection) -> usize {
        let Some(marker) = self.exit_marker else {
            return 0;
        };

        let (rows, cols) = direction.band(self.size);
        let mut opened = 0;
        for row in rows {
            for col in cols.clone() {
                let index = row * self.size + col;
                if self.terrain.get(index) != Some(&marker) {
                    continue;
                }
                if let Some(cell) = self.cells.get_mut(index) {
                    if cell.is_solid() {
                        *cell = Passability::Open;
                        opened += 1;
                    }
                }
            }
        }

        debug!("Carved {:?} door: {} cells opened", direction, opened);
        opened
    }

    /// Open cells reachable from `(row, col)` through 4-neighbour moves.
    ///
    /// Empty if the start is solid or out of bounds.
    pub fn reachable_from(&self, row: usize, col: usize) -> HashSet<(usize, usize)> {
        if self.is_solid(row, col) {
            return HashSet::new();
        }

        bfs_reach((row, col), |&(r, c)| {
            let mut next = Vec::with_capacity(4);
            if r > 0 {
                next.push((r - 1, c));
            }
            if c > 0 {
                next.push((r, c - 1));
            }
            next.push((r + 1, c));
            next.push((r, c + 1));
            next.into_iter()
                .filter(|&(nr, nc)| !self.is_solid(nr, nc))
                .collect::<Vec<_>>()
        })
        .collect()
    }

    /// Renders the grid as text, `#` for solid and `.` for open.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.size * (self.size + 1));
        for row in self.rows() {
            out.extend(row.iter().map(|cell| cell.glyph()));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for PassabilityGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}
