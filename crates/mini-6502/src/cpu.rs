//! Fetch-decode-execute dispatcher.
//!
//! One `step()` runs one whole instruction. Loads, stores, increments and
//! register transfers leave the status register alone; only CMP writes Z.
//! Nothing computes Carry, so BCC/BCS only see what a debugger or test put
//! there.

use emu_core::{Bus, Cpu, Observable, Value};

use crate::AddressingMode::{
    Absolute, AbsoluteX, AbsoluteY, Immediate, ZeroPage, ZeroPageX, ZeroPageY,
};
use crate::flags::{C, Z};
use crate::{CallStack, CpuError, HostIo, Registers};

/// The CPU: registers, return stack and host trap map.
#[derive(Debug, Default)]
pub struct Mini6502 {
    /// CPU registers.
    pub regs: Registers,

    stack: CallStack,

    host: HostIo,
}

impl Mini6502 {
    /// Create a CPU in reset state bound to the given host traps.
    #[must_use]
    pub fn new(host: HostIo) -> Self {
        Self {
            regs: Registers::new(),
            stack: CallStack::new(),
            host,
        }
    }

    #[must_use]
    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    /// Direct access to the return stack, for loaders and debuggers.
    pub fn stack_mut(&mut self) -> &mut CallStack {
        &mut self.stack
    }

    #[must_use]
    pub fn host(&self) -> &HostIo {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut HostIo {
        &mut self.host
    }

    /// Decode and execute `opcode`, fetched from `at`.
    fn execute<B: Bus>(&mut self, bus: &mut B, opcode: u8, at: u16) -> Result<(), CpuError> {
        match opcode {
            // LDA
            0xA9 => self.regs.a = self.read_operand(bus, Immediate),
            0xA5 => self.regs.a = self.read_operand(bus, ZeroPage),
            0xB5 => self.regs.a = self.read_operand(bus, ZeroPageX),
            0xAD => self.regs.a = self.read_operand(bus, Absolute),
            0xBD => self.regs.a = self.read_operand(bus, AbsoluteX),
            0xB9 => self.regs.a = self.read_operand(bus, AbsoluteY),

            // LDA ($zz),X - X is added to the 16-bit pointer read from $zz,
            // not to $zz. The pointer's high byte comes from $zz+1 unwrapped.
            0xA1 => {
                let zp = u16::from(self.fetch(bus));
                let pointer = u16::from_le_bytes([bus.read(zp), bus.read(zp + 1)]);
                self.regs.a = bus.read(pointer.wrapping_add(u16::from(self.regs.x)));
            }

            // LDX
            0xA2 => self.regs.x = self.read_operand(bus, Immediate),
            0xA6 => self.regs.x = self.read_operand(bus, ZeroPage),
            0xB6 => self.regs.x = self.read_operand(bus, ZeroPageY),
            0xAE => self.regs.x = self.read_operand(bus, Absolute),
            0xBE => self.regs.x = self.read_operand(bus, AbsoluteY),

            // LDY
            0xA0 => self.regs.y = self.read_operand(bus, Immediate),
            0xA4 => self.regs.y = self.read_operand(bus, ZeroPage),
            0xB4 => self.regs.y = self.read_operand(bus, ZeroPageX),
            0xAC => self.regs.y = self.read_operand(bus, Absolute),
            0xBC => self.regs.y = self.read_operand(bus, AbsoluteX),

            // STA
            0x85 => self.write_operand(bus, ZeroPage, self.regs.a),
            0x95 => self.write_operand(bus, ZeroPageX, self.regs.a),
            0x8D => self.write_operand(bus, Absolute, self.regs.a),
            0x9D => self.write_operand(bus, AbsoluteX, self.regs.a),
            0x99 => self.write_operand(bus, AbsoluteY, self.regs.a),

            // STX
            0x86 => self.write_operand(bus, ZeroPage, self.regs.x),
            0x96 => self.write_operand(bus, ZeroPageY, self.regs.x),
            0x8E => self.write_operand(bus, Absolute, self.regs.x),

            // STY
            0x84 => self.write_operand(bus, ZeroPage, self.regs.y),
            0x94 => self.write_operand(bus, ZeroPageX, self.regs.y),
            0x8C => self.write_operand(bus, Absolute, self.regs.y),

            // STZ
            0x64 => self.write_operand(bus, ZeroPage, 0),
            0x9C => self.write_operand(bus, Absolute, 0),

            // INX / INY
            0xE8 => self.regs.x = self.regs.x.wrapping_add(1),
            0xC8 => self.regs.y = self.regs.y.wrapping_add(1),

            // INC zp
            0xE6 => {
                let addr = self.resolve(bus, ZeroPage);
                let value = bus.read(addr).wrapping_add(1);
                bus.write(addr, value);
            }

            // ADC #imm - plain 8-bit add, Carry neither read nor written
            0x69 => {
                let value = self.read_operand(bus, Immediate);
                self.regs.a = self.regs.a.wrapping_add(value);
            }

            // CMP #imm - Z only
            0xC9 => {
                let value = self.read_operand(bus, Immediate);
                self.regs.p.clear(Z);
                if self.regs.a == value {
                    self.regs.p.set(Z);
                }
            }

            // BEQ / BNE / BCS / BCC. F0 is taken on Z set and D0 on Z clear;
            // the pair is never swapped.
            0xF0 => self.branch_if(bus, self.regs.p.is_set(Z)),
            0xD0 => self.branch_if(bus, !self.regs.p.is_set(Z)),
            0xB0 => self.branch_if(bus, self.regs.p.is_set(C)),
            0x90 => self.branch_if(bus, !self.regs.p.is_set(C)),

            // JMP abs
            0x4C => self.regs.pc = self.fetch_word(bus),

            0x20 => self.jsr(bus)?,
            0x60 => self.regs.pc = self.stack.pop()?,

            // Transfers
            0xAA => self.regs.x = self.regs.a,
            0x8A => self.regs.a = self.regs.x,
            0xA8 => self.regs.y = self.regs.a,
            0x98 => self.regs.a = self.regs.y,
            0xBA => self.regs.x = self.regs.s,
            0x9A => self.regs.s = self.regs.x,

            _ => return Err(CpuError::UnknownOpcode { opcode, pc: at }),
        }
        Ok(())
    }

    /// Branches add the operand as an unsigned displacement, so they only
    /// ever move forward (or wrap past `$FFFF`).
    fn branch_if(&mut self, bus: &mut impl Bus, condition: bool) {
        let offset = self.fetch(bus);
        if condition {
            self.regs.pc = self.regs.pc.wrapping_add(u16::from(offset));
        }
    }

    /// JSR abs. The pushed return address is the byte after the 3-byte
    /// instruction. A trapped target is serviced and returned from at once.
    fn jsr(&mut self, bus: &mut impl Bus) -> Result<(), CpuError> {
        let target = self.fetch_word(bus);
        self.stack.push(self.regs.pc)?;
        self.regs.pc = target;

        if self.host.service(target, &mut self.regs) {
            self.regs.pc = self.stack.pop()?;
        }
        Ok(())
    }
}

impl Cpu for Mini6502 {
    type Registers = Registers;
    type Error = CpuError;

    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        let at = self.regs.pc;
        let opcode = self.fetch(bus);
        self.execute(bus, opcode, at)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    /// Registers back to power-on values and the return stack emptied.
    /// Host traps stay bound.
    fn reset(&mut self) {
        self.regs.reset();
        self.stack.clear();
    }
}

impl Observable for Mini6502 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(self.regs.p.0.into()),
            "flags.z" | "z" => Some(self.regs.p.is_set(Z).into()),
            "flags.c" | "c" => Some(self.regs.p.is_set(C).into()),
            "stack.depth" => Some((self.stack.depth() as u64).into()),
            "stack.top" => self.stack.peek().map(Value::from),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc",
            "a",
            "x",
            "y",
            "s",
            "p",
            "flags.z",
            "flags.c",
            "stack.depth",
            "stack.top",
        ]
    }
}
