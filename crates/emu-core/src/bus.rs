//! Memory bus interface and a flat 64K implementation.

/// Size of the flat 16-bit address space.
pub const MEMORY_SIZE: usize = 0x1_0000;

/// Memory bus interface.
///
/// Components access memory through this trait. The bus handles address
/// decoding; for the flat machine every address is plain RAM.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

/// Flat 64K RAM bus, zero-initialised.
///
/// Code, data and host-call trampolines all share this one array. There is
/// no mirroring or mapping: address `n` is byte `n`.
pub struct SimpleBus {
    ram: Box<[u8; MEMORY_SIZE]>,
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; MEMORY_SIZE]),
        }
    }

    /// Copy `data` into memory starting at `address`.
    ///
    /// Bytes that would run past `$FFFF` wrap to `$0000`.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[addr as usize] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read a byte without going through the bus.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    /// Write a byte without going through the bus.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }

    /// Borrow the whole address space.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.ram[..]
    }

    /// Zero every byte.
    pub fn clear(&mut self) {
        self.ram.fill(0);
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }
}
