//! Core traits and types for instruction-stepped emulation.
//!
//! A CPU reaches memory only through a [`Bus`]. Every component exposes its
//! state through [`Observable`] so front-ends, tests and debuggers can
//! inspect it without side effects.

mod bus;
mod cpu;
mod observable;

pub use bus::{Bus, MEMORY_SIZE, SimpleBus};
pub use cpu::Cpu;
pub use observable::{Observable, Value, parse_address};
