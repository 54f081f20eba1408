//! CPU core trait.

use crate::Bus;

/// A CPU core.
///
/// CPUs execute whole instructions and access memory through a bus. The bus
/// is passed in, not owned, so the machine that runs the loop keeps
/// ownership of memory.
///
/// CPUs expose their internal state for observation and debugging.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// The fatal condition a step can end in.
    type Error;

    /// Fetch, decode and execute one instruction.
    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<(), Self::Error>;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Reset the CPU to its initial state.
    fn reset(&mut self);
}
