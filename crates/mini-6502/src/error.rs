//! Fatal CPU conditions.
//!
//! Nothing here is recoverable inside the fetch-decode-execute loop. The
//! loop hands the error to its owner, which decides whether to exit the
//! process, unwind, or report it to a test.

use thiserror::Error;

/// Broad class of a fatal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The instruction stream is not decodable.
    Program,
    /// The call/return stack was driven past one of its ends.
    ResourceExhaustion,
}

impl ErrorKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Program => "program",
            Self::ResourceExhaustion => "resource_exhaustion",
        }
    }
}

/// A fatal condition raised while executing guest code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("Unrecognized opcode: 0x{opcode:02X} at ${pc:04X}")]
    UnknownOpcode { opcode: u8, pc: u16 },
    #[error("Invalid addressing mode: {0}")]
    InvalidAddressingMode(u8),
    #[error("Stack Overflow! return stack already holds {0} addresses")]
    StackOverflow(usize),
    #[error("Stack Underflow! return with an empty call stack")]
    StackUnderflow,
}

impl CpuError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownOpcode { .. } | Self::InvalidAddressingMode(_) => ErrorKind::Program,
            Self::StackOverflow(_) | Self::StackUnderflow => ErrorKind::ResourceExhaustion,
        }
    }
}
