//! Addressing modes.
//!
//! Seven modes are supported:
//! - Immediate: #$nn (the effective address is the operand byte itself)
//! - Zero Page: $nn
//! - Absolute: $nnnn
//! - Zero Page,X: $nn,X (wraps within zero page)
//! - Absolute,X: $nnnn,X (16-bit wrap, no masking)
//! - Zero Page,Y: $nn,Y (wraps within zero page)
//! - Absolute,Y: $nnnn,Y (16-bit wrap, no masking)

use emu_core::Bus;

use crate::{CpuError, Mini6502};

/// Operand addressing mode.
///
/// The discriminants are the numeric mode selectors used by loaders and
/// debuggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    Immediate = 0,
    ZeroPage = 1,
    Absolute = 2,
    ZeroPageX = 3,
    AbsoluteX = 4,
    ZeroPageY = 5,
    AbsoluteY = 6,
}

impl AddressingMode {
    pub const ALL: [Self; 7] = [
        Self::Immediate,
        Self::ZeroPage,
        Self::Absolute,
        Self::ZeroPageX,
        Self::AbsoluteX,
        Self::ZeroPageY,
        Self::AbsoluteY,
    ];

    /// Decode a numeric mode selector.
    pub fn from_selector(selector: u8) -> Result<Self, CpuError> {
        Self::ALL
            .get(selector as usize)
            .copied()
            .ok_or(CpuError::InvalidAddressingMode(selector))
    }

    #[must_use]
    pub const fn selector(self) -> u8 {
        self as u8
    }

    /// Bytes following the opcode that this mode steps over.
    #[must_use]
    pub const fn operand_width(self) -> u16 {
        match self {
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY => 2,
            Self::Immediate | Self::ZeroPage | Self::ZeroPageX | Self::ZeroPageY => 1,
        }
    }
}

/// Compute an effective address from a raw operand.
///
/// `operand` is the byte or little-endian word that follows the opcode; for
/// Immediate it is the address of the literal.
#[must_use]
pub fn effective_address(mode: AddressingMode, operand: u16, x: u8, y: u8) -> u16 {
    match mode {
        AddressingMode::Immediate | AddressingMode::ZeroPage | AddressingMode::Absolute => operand,
        AddressingMode::ZeroPageX => operand.wrapping_add(u16::from(x)) & 0x00FF,
        AddressingMode::ZeroPageY => operand.wrapping_add(u16::from(y)) & 0x00FF,
        AddressingMode::AbsoluteX => operand.wrapping_add(u16::from(x)),
        AddressingMode::AbsoluteY => operand.wrapping_add(u16::from(y)),
    }
}

impl Mini6502 {
    /// Fetch the next byte at PC and increment PC.
    pub(crate) fn fetch(&mut self, bus: &mut impl Bus) -> u8 {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Fetch a 16-bit word (little-endian) at PC.
    pub(crate) fn fetch_word(&mut self, bus: &mut impl Bus) -> u16 {
        let low = self.fetch(bus);
        let high = self.fetch(bus);
        u16::from_le_bytes([low, high])
    }

    /// Step PC over the operand and return the effective address.
    pub(crate) fn resolve(&mut self, bus: &mut impl Bus, mode: AddressingMode) -> u16 {
        let operand = match mode {
            AddressingMode::Immediate => {
                let addr = self.regs.pc;
                self.regs.pc = self.regs.pc.wrapping_add(1);
                addr
            }
            AddressingMode::ZeroPage | AddressingMode::ZeroPageX | AddressingMode::ZeroPageY => {
                u16::from(self.fetch(bus))
            }
            AddressingMode::Absolute | AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => {
                self.fetch_word(bus)
            }
        };
        effective_address(mode, operand, self.regs.x, self.regs.y)
    }

    /// Resolve an operand and read the byte it names.
    pub(crate) fn read_operand(&mut self, bus: &mut impl Bus, mode: AddressingMode) -> u8 {
        let addr = self.resolve(bus, mode);
        bus.read(addr)
    }

    /// Resolve an operand and write `value` to it.
    pub(crate) fn write_operand(&mut self, bus: &mut impl Bus, mode: AddressingMode, value: u8) {
        let addr = self.resolve(bus, mode);
        bus.write(addr, value);
    }
}
