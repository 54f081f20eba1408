//! Instruction-stepped emulator for a small 6502-family CPU.
//!
//! Each `step()` fetches one opcode, decodes it against a fixed table and
//! executes it to completion. There is no cycle timing, no decimal mode and
//! no interrupt handling.
//!
//! Subroutine calls use an internal return-address stack rather than page
//! one of memory. A call whose target is a reserved trap address is serviced
//! by the host instead of guest code; see [`HostIo`].

mod addressing;
mod call_stack;
mod cpu;
mod error;
pub mod flags;
mod host_io;
mod registers;

pub use addressing::{AddressingMode, effective_address};
pub use call_stack::{CallStack, STACK_CAPACITY};
pub use cpu::Mini6502;
pub use error::{CpuError, ErrorKind};
pub use flags::Status;
pub use host_io::{
    CharSink, CharSource, EOF_BYTE, GETCHAR_ADDR, HostCall, HostIo, InputQueue, OutputCapture,
    PUTCHAR_ADDR,
};
pub use registers::Registers;
