//! Combat constants - all fixed battlefield values in one place

// Battlefield
pub const GRID_WIDTH: i32 = 15;
pub const GRID_HEIGHT: i32 = 11;
pub const ATTACKER_COLUMN: i32 = 0;
pub const DEFENDER_COLUMN: i32 = GRID_WIDTH - 1;

// Armies
pub const MAX_ARMY_SLOTS: usize = 7;

// Scan order for cells around a target: orthogonal first, then diagonal
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];
