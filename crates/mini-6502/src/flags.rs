//! Processor status register (P).
//!
//! Only two bits carry meaning in this instruction set. The layout is not
//! the NMOS one: Zero lives in bit 0 and Carry in bit 1.

/// Zero flag - set by CMP when the accumulator equals the operand.
pub const Z: u8 = 0x01;

/// Carry flag - tested by BCC/BCS, never computed by any opcode.
pub const C: u8 = 0x02;

/// Processor status register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status(pub u8);

impl Status {
    /// All flags clear.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Check if a flag is set.
    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    /// Set or clear a flag based on condition.
    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }
}
