//! Single-instruction state vectors.
//!
//! Each case in `tests/data/single_step.json` gives the full register,
//! memory, return-stack and host-output state before and after exactly one
//! `step()`.

use emu_core::{Cpu, SimpleBus};
use mini_6502::{HostIo, InputQueue, Mini6502, OutputCapture, Status};
use serde::Deserialize;

/// JSON test case format.
#[derive(Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
}

/// JSON CPU state format.
#[derive(Deserialize)]
struct CpuState {
    pc: u16,
    s: u8,
    a: u8,
    x: u8,
    y: u8,
    p: u8,
    ram: Vec<(u16, u8)>,
    /// Return stack, oldest entry first.
    #[serde(default)]
    stack: Vec<u16>,
    #[serde(default)]
    output: Vec<u8>,
}

fn setup(state: &CpuState) -> (Mini6502, SimpleBus, OutputCapture) {
    let out = OutputCapture::new();
    let mut cpu = Mini6502::new(HostIo::standard(out.clone(), InputQueue::new()));
    let mut bus = SimpleBus::new();

    for &(addr, value) in &state.ram {
        bus.poke(addr, value);
    }
    for &addr in &state.stack {
        cpu.stack_mut().push(addr).expect("seed stack");
    }
    cpu.regs.pc = state.pc;
    cpu.regs.s = state.s;
    cpu.regs.a = state.a;
    cpu.regs.x = state.x;
    cpu.regs.y = state.y;
    cpu.regs.p = Status(state.p);
    (cpu, bus, out)
}

/// Compare the CPU/bus state against expected, returning a list of mismatches.
fn compare(cpu: &Mini6502, bus: &SimpleBus, out: &OutputCapture, expected: &CpuState) -> Vec<String> {
    let mut errors = Vec::new();
    let regs = cpu.regs;

    if regs.pc != expected.pc {
        errors.push(format!("PC: got ${:04X}, want ${:04X}", regs.pc, expected.pc));
    }
    for (name, got, want) in [
        ("S", regs.s, expected.s),
        ("A", regs.a, expected.a),
        ("X", regs.x, expected.x),
        ("Y", regs.y, expected.y),
        ("P", regs.p.0, expected.p),
    ] {
        if got != want {
            errors.push(format!("{name}: got ${got:02X}, want ${want:02X}"));
        }
    }
    for &(addr, want) in &expected.ram {
        let got = bus.peek(addr);
        if got != want {
            errors.push(format!("RAM[${addr:04X}]: got ${got:02X}, want ${want:02X}"));
        }
    }

    let mut stack: Vec<u16> = cpu.stack().iter().collect();
    stack.reverse();
    if stack != expected.stack {
        errors.push(format!("stack: got {stack:04X?}, want {:04X?}", expected.stack));
    }
    if out.bytes() != expected.output {
        errors.push(format!("output: got {:?}, want {:?}", out.bytes(), expected.output));
    }

    errors
}

#[test]
fn run_all() {
    let data = include_str!("data/single_step.json");
    let tests: Vec<TestCase> = serde_json::from_str(data).expect("valid test vectors");
    assert!(!tests.is_empty());

    let mut failures = Vec::new();
    for test in &tests {
        let (mut cpu, mut bus, out) = setup(&test.initial);
        if let Err(e) = cpu.step(&mut bus) {
            failures.push(format!("  FAIL [{}]: {e}", test.name));
            continue;
        }
        let errors = compare(&cpu, &bus, &out, &test.final_state);
        if !errors.is_empty() {
            failures.push(format!("  FAIL [{}]: {}", test.name, errors.join(", ")));
        }
    }

    assert!(failures.is_empty(), "{} vectors failed:\n{}", failures.len(), failures.join("\n"));
}
