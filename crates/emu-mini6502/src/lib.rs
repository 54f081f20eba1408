//! A flat 64K machine built around the mini 6502 core.
//!
//! The machine owns the CPU and its memory. Guest programs talk to the host
//! only through JSR traps: `$0025` writes A to the console, `$0026` reads one
//! byte into A. Everything else is ordinary guest code.

pub mod config;
pub mod console;
pub mod dump;
mod machine;
#[cfg(feature = "mcp")]
pub mod mcp;
pub mod programs;

pub use config::{MachineConfig, ProgramSource};
pub use machine::{Machine, StopReason};
pub use programs::Program;
