//! Internal call/return stack.
//!
//! Return addresses live here rather than in page one, so guest code can
//! neither see nor corrupt them. The pointer descends from `$FF` and marks
//! the next free slot.

use crate::CpuError;

/// Number of return addresses the stack can hold.
pub const STACK_CAPACITY: usize = 256;

/// Fixed-capacity LIFO of 16-bit return addresses.
#[derive(Debug, Clone)]
pub struct CallStack {
    slots: [u16; STACK_CAPACITY],
    /// Next free slot.
    sp: u8,
    depth: usize,
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

impl CallStack {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [0; STACK_CAPACITY],
            sp: 0xFF,
            depth: 0,
        }
    }

    /// Write at the current slot, then move the pointer down.
    pub fn push(&mut self, address: u16) -> Result<(), CpuError> {
        if self.depth == STACK_CAPACITY {
            return Err(CpuError::StackOverflow(self.depth));
        }
        self.slots[self.sp as usize] = address;
        self.sp = self.sp.wrapping_sub(1);
        self.depth += 1;
        Ok(())
    }

    /// Move the pointer up, then read that slot.
    pub fn pop(&mut self) -> Result<u16, CpuError> {
        if self.depth == 0 {
            return Err(CpuError::StackUnderflow);
        }
        self.sp = self.sp.wrapping_add(1);
        self.depth -= 1;
        Ok(self.slots[self.sp as usize])
    }

    /// The address the next `pop` would return.
    #[must_use]
    pub fn peek(&self) -> Option<u16> {
        (self.depth > 0).then(|| self.slots[self.sp.wrapping_add(1) as usize])
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.depth == 0
    }

    /// Index of the next free slot.
    #[must_use]
    pub const fn sp(&self) -> u8 {
        self.sp
    }

    /// Held return addresses, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        (1..=self.depth).map(|i| self.slots[self.sp.wrapping_add(i as u8) as usize])
    }

    pub fn clear(&mut self) {
        self.sp = 0xFF;
        self.depth = 0;
    }
}
