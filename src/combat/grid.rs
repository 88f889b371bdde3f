//! Combat grid - fixed occupancy map of the battlefield

use serde::{Deserialize, Serialize};

use crate::combat::constants::{GRID_HEIGHT, GRID_WIDTH, NEIGHBOR_OFFSETS};
use crate::core::types::{GridPos, StackId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub pos: GridPos,
    /// Index of the stack standing here
    pub occupant: Option<StackId>,
    pub obstacle: bool,
}

impl GridCell {
    pub fn is_open(&self) -> bool {
        self.occupant.is_none() && !self.obstacle
    }
}

/// Dense row-major grid; at most one stack per cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatGrid {
    width: i32,
    height: i32,
    cells: Vec<GridCell>,
}

impl Default for CombatGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatGrid {
    /// Empty 15x11 battlefield with no obstacles
    pub fn new() -> Self {
        Self::with_size(GRID_WIDTH, GRID_HEIGHT)
    }

    pub fn with_size(width: i32, height: i32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(GridCell {
                    pos: GridPos::new(x, y),
                    occupant: None,
                    obstacle: false,
                });
            }
        }
        Self { width, height, cells }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y * self.width + pos.x) as usize)
    }

    /// Cell at `pos`, None when out of bounds
    pub fn get_cell(&self, pos: GridPos) -> Option<&GridCell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    fn get_cell_mut(&mut self, pos: GridPos) -> Option<&mut GridCell> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    pub fn is_open(&self, pos: GridPos) -> bool {
        self.get_cell(pos).is_some_and(GridCell::is_open)
    }

    pub fn occupant(&self, pos: GridPos) -> Option<StackId> {
        self.get_cell(pos).and_then(|cell| cell.occupant)
    }

    pub fn set_obstacle(&mut self, pos: GridPos, obstacle: bool) {
        if let Some(cell) = self.get_cell_mut(pos) {
            cell.obstacle = obstacle;
        }
    }

    pub(crate) fn occupy(&mut self, pos: GridPos, id: StackId) {
        if let Some(cell) = self.get_cell_mut(pos) {
            cell.occupant = Some(id);
        }
    }

    /// Clear `pos` if `id` is the one standing there
    pub(crate) fn vacate(&mut self, pos: GridPos, id: StackId) {
        if let Some(cell) = self.get_cell_mut(pos) {
            if cell.occupant == Some(id) {
                cell.occupant = None;
            }
        }
    }

    /// Rows an army of `army_size` stacks deploys to, evenly spaced
    pub fn deployment_rows(&self, army_size: usize) -> Vec<i32> {
        let spacing = (self.height / (army_size as i32 + 1)).max(1);
        (0..army_size as i32)
            .map(|i| (spacing * (i + 1)).min(self.height - 1))
            .collect()
    }

    /// First open cell in `column`, searching outward from the middle row
    pub fn free_cell_in_column(&self, column: i32) -> Option<GridPos> {
        let middle = self.height / 2;
        (0..self.height)
            .map(|step| {
                let offset = (step + 1) / 2;
                if step % 2 == 1 {
                    middle - offset
                } else {
                    middle + offset
                }
            })
            .map(|y| GridPos::new(column, y))
            .find(|&pos| self.is_open(pos))
    }

    /// Open cell next to `target` closest to `mover` within `budget` moves
    ///
    /// Scans orthogonal neighbours before diagonal ones and keeps the first
    /// strictly closer candidate, so ties go to scan order.
    pub fn find_adjacent_open_cell(
        &self,
        target: GridPos,
        mover: GridPos,
        budget: i32,
    ) -> Option<GridPos> {
        let mut best: Option<(GridPos, i32)> = None;
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let candidate = target.offset(dx, dy);
            if !self.is_open(candidate) {
                continue;
            }
            let distance = candidate.manhattan(&mover);
            if distance > budget {
                continue;
            }
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((candidate, distance));
            }
        }
        best.map(|(pos, _)| pos)
    }
}
