//! Whack-a-Mole - a timed arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (mole state machines, game loop, timers)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Grid layout: 4 rows of 3 holes
    pub const GRID_ROWS: usize = 4;
    pub const GRID_COLS: usize = 3;
    /// Total number of mole slots
    pub const GRID_SLOTS: usize = GRID_ROWS * GRID_COLS;

    /// Health bounds
    pub const MAX_HEALTH: u32 = 100;

    /// Fixed frontend step (ms) used by the headless runner
    pub const FRAME_MS: u64 = 16;
}

/// Slot index for a (row, col) grid position
#[inline]
pub fn slot_index(row: usize, col: usize) -> usize {
    row * consts::GRID_COLS + col
}

/// Grid (row, col) position of a slot index
#[inline]
pub fn slot_position(slot: usize) -> (usize, usize) {
    (slot / consts::GRID_COLS, slot % consts::GRID_COLS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_layout() {
        assert_eq!(consts::GRID_SLOTS, 12);
        assert_eq!(slot_index(0, 0), 0);
        assert_eq!(slot_index(3, 2), 11);
        for slot in 0..consts::GRID_SLOTS {
            let (row, col) = slot_position(slot);
            assert!(row < consts::GRID_ROWS && col < consts::GRID_COLS);
            assert_eq!(slot_index(row, col), slot);
        }
    }
}
