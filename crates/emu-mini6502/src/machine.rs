//! Top-level machine: CPU, flat memory and run loop.

use emu_core::{Cpu, Observable, SimpleBus, Value, parse_address};
use mini_6502::{CpuError, HostIo, Mini6502, Registers};

use crate::Program;

/// Why a bounded run ended without a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The step budget ran out.
    StepLimit,
}

/// Emulator context. Each instance is fully independent.
pub struct Machine {
    cpu: Mini6502,
    bus: SimpleBus,
    /// Instructions executed since construction or the last reset.
    steps: u64,
    /// Address of the instruction most recently started.
    instruction_pc: u16,
}

impl Machine {
    /// Create a machine with zeroed memory and the given host traps.
    #[must_use]
    pub fn new(host: HostIo) -> Self {
        Self {
            cpu: Mini6502::new(host),
            bus: SimpleBus::new(),
            steps: 0,
            instruction_pc: 0,
        }
    }

    /// Copy raw bytes into memory.
    pub fn load(&mut self, origin: u16, bytes: &[u8]) {
        self.bus.load(origin, bytes);
    }

    /// Load every segment of `program` and point PC at its entry.
    pub fn load_program(&mut self, program: &Program) {
        for (origin, bytes) in &program.segments {
            self.bus.load(*origin, bytes);
        }
        self.cpu.regs.pc = program.entry;
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.cpu.regs.pc = pc;
    }

    /// Registers and return stack to power-on state. Memory is kept.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.steps = 0;
        self.instruction_pc = 0;
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> Result<(), CpuError> {
        self.instruction_pc = self.cpu.regs.pc;
        self.cpu.step(&mut self.bus)?;
        self.steps += 1;
        Ok(())
    }

    /// Run until a fatal error or `limit` instructions.
    ///
    /// With no limit the loop only ends on an error.
    pub fn run(&mut self, limit: Option<u64>) -> Result<StopReason, CpuError> {
        self.run_with(limit, |_| {})
    }

    /// As [`Machine::run`], calling `trace` after every instruction.
    pub fn run_with(
        &mut self,
        limit: Option<u64>,
        mut trace: impl FnMut(&Registers),
    ) -> Result<StopReason, CpuError> {
        let mut executed = 0u64;
        loop {
            if limit.is_some_and(|max| executed >= max) {
                return Ok(StopReason::StepLimit);
            }
            self.step()?;
            executed += 1;
            trace(&self.cpu.regs);
        }
    }

    /// Address of the instruction most recently started, including one
    /// that failed.
    #[must_use]
    pub fn instruction_pc(&self) -> u16 {
        self.instruction_pc
    }

    #[must_use]
    pub fn cpu(&self) -> &Mini6502 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Mini6502 {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &SimpleBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut SimpleBus {
        &mut self.bus
    }

    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Observable for Machine {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            parse_address(rest).map(|a| Value::U8(self.bus.peek(a)))
        } else {
            match path {
                "steps" => Some(self.steps.into()),
                _ => self.cpu.query(path),
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "steps",
            "cpu.pc",
            "cpu.a",
            "cpu.x",
            "cpu.y",
            "cpu.s",
            "cpu.p",
            "cpu.flags.z",
            "cpu.flags.c",
            "cpu.stack.depth",
            "cpu.stack.top",
            "memory.<address>",
        ]
    }
}
