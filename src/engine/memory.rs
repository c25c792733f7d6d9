//! The byte tape.
//!
//! A fixed-size array of unsigned byte cells with one movable pointer.
//! Pointer motion always wraps at the ends; direct reads by address are
//! strict and fail outside the tape.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of cells on the tape.
pub const DEFAULT_MEMORY_SIZE: usize = 1024;

/// Fixed-size byte tape with a movable pointer.
///
/// The pointer resolves to a valid index in `[0, size)` after every
/// mutation.
#[derive(Clone, Serialize, Deserialize)]
pub struct Memory {
    cells: Vec<u8>,
    pointer: usize,
}

impl Memory {
    /// Create a tape with the default size, all cells zeroed.
    pub fn new() -> Self {
        Self::with_size(DEFAULT_MEMORY_SIZE)
    }

    /// Create a tape with `size` cells, all zeroed, pointer at 0.
    ///
    /// # Panics
    /// Panics if `size` is zero.
    pub fn with_size(size: usize) -> Self {
        assert!(size >= 1, "memory size must be at least 1");
        Self {
            cells: vec![0; size],
            pointer: 0,
        }
    }

    /// Number of cells on the tape.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Current pointer position.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Move the pointer forward one cell; past the last index it resets
    /// to 0.
    pub fn increment_pointer(&mut self) {
        self.pointer += 1;
        if self.pointer >= self.cells.len() {
            self.pointer = 0;
        }
    }

    /// Move the pointer back one cell; below 0 it resets to the last index.
    pub fn decrement_pointer(&mut self) {
        if self.pointer == 0 {
            self.pointer = self.cells.len() - 1;
        } else {
            self.pointer -= 1;
        }
    }

    /// Set the pointer to `addr` modulo the tape size. True mathematical
    /// modulo: any integer, negative included, maps into `[0, size)`.
    pub fn set_pointer(&mut self, addr: i32) {
        self.pointer = (addr as i64).rem_euclid(self.cells.len() as i64) as usize;
    }

    /// Read the cell at the pointer.
    #[inline]
    pub fn current_byte(&self) -> u8 {
        self.cells[self.pointer]
    }

    /// Write the cell at the pointer, truncating `value` to its low 8 bits.
    #[inline]
    pub fn set_current_byte(&mut self, value: i32) {
        self.cells[self.pointer] = (value & 0xFF) as u8;
    }

    /// Read an arbitrary cell. Direct reads do not wrap: an address outside
    /// `[0, size)` is an error.
    pub fn byte_at(&self, addr: i32) -> Result<u8, MemoryError> {
        if addr < 0 || addr as usize >= self.cells.len() {
            return Err(MemoryError::AddressOutOfRange {
                addr,
                size: self.cells.len(),
            });
        }
        Ok(self.cells[addr as usize])
    }

    /// Reset every cell to zero. The pointer stays where it is.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// All cells in address order (used by the table prints).
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only summarize the cell array
        let non_zero = self.cells.iter().filter(|&&cell| cell != 0).count();

        f.debug_struct("Memory")
            .field("size", &self.cells.len())
            .field("pointer", &self.pointer)
            .field("non_zero_cells", &non_zero)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("memory address {addr} out of range for a tape of {size} cells")]
    AddressOutOfRange { addr: i32, size: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_read_write_at_pointer() {
        let mut mem = Memory::with_size(4);
        mem.set_current_byte(42);
        assert_eq!(mem.current_byte(), 42);
        assert_eq!(mem.byte_at(0).unwrap(), 42);
    }

    #[test]
    fn test_write_truncates_to_low_byte() {
        let mut mem = Memory::with_size(4);
        mem.set_current_byte(256);
        assert_eq!(mem.current_byte(), 0);
        mem.set_current_byte(263);
        assert_eq!(mem.current_byte(), 7);
        mem.set_current_byte(-1);
        assert_eq!(mem.current_byte(), 255);
        mem.set_current_byte(-34);
        assert_eq!(mem.current_byte(), 222);
    }

    #[test]
    fn test_pointer_wraps_forward() {
        let mut mem = Memory::with_size(4);
        for _ in 0..3 {
            mem.increment_pointer();
        }
        assert_eq!(mem.pointer(), 3);
        mem.increment_pointer();
        assert_eq!(mem.pointer(), 0);
    }

    #[test]
    fn test_pointer_wraps_backward() {
        let mut mem = Memory::with_size(4);
        mem.decrement_pointer();
        assert_eq!(mem.pointer(), 3);
    }

    #[test]
    fn test_single_cell_tape_wraps_to_itself() {
        let mut mem = Memory::with_size(1);
        mem.increment_pointer();
        assert_eq!(mem.pointer(), 0);
        mem.decrement_pointer();
        assert_eq!(mem.pointer(), 0);
    }

    #[test]
    fn test_set_pointer_wraps_negative_addresses() {
        let mut mem = Memory::with_size(4);
        mem.set_pointer(-1);
        assert_eq!(mem.pointer(), 3);
        mem.set_pointer(-5);
        assert_eq!(mem.pointer(), 3);
        mem.set_pointer(6);
        assert_eq!(mem.pointer(), 2);
    }

    #[test]
    fn test_byte_at_is_strict() {
        let mem = Memory::with_size(4);
        assert!(mem.byte_at(0).is_ok());
        assert!(mem.byte_at(3).is_ok());
        assert!(mem.byte_at(4).is_err());
        assert!(mem.byte_at(-1).is_err());
    }

    #[test]
    fn test_clear_keeps_the_pointer() {
        let mut mem = Memory::with_size(4);
        mem.increment_pointer();
        mem.set_current_byte(9);
        mem.clear();
        assert_eq!(mem.pointer(), 1);
        assert_eq!(mem.current_byte(), 0);
    }

    proptest! {
        #[test]
        fn prop_set_pointer_lands_in_range(addr in any::<i32>(), size in 1usize..4096) {
            let mut mem = Memory::with_size(size);
            mem.set_pointer(addr);
            prop_assert!(mem.pointer() < size);
        }

        #[test]
        fn prop_increment_decrement_round_trip(size in 1usize..512, moves in 0usize..600) {
            let mut mem = Memory::with_size(size);
            for _ in 0..moves {
                mem.increment_pointer();
                prop_assert!(mem.pointer() < size);
            }
            for _ in 0..moves {
                mem.decrement_pointer();
                prop_assert!(mem.pointer() < size);
            }
            prop_assert_eq!(mem.pointer(), 0);
        }
    }
}
