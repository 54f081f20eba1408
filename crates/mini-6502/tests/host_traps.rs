//! Host I/O traps reached through JSR.

use emu_core::{Cpu, SimpleBus};
use mini_6502::{
    CharSink, EOF_BYTE, GETCHAR_ADDR, HostCall, HostIo, InputQueue, Mini6502, OutputCapture,
    PUTCHAR_ADDR,
};

fn machine(input: &[u8]) -> (Mini6502, SimpleBus, OutputCapture) {
    let out = OutputCapture::new();
    let host = HostIo::standard(out.clone(), InputQueue::from_bytes(input));
    let mut cpu = Mini6502::new(host);
    cpu.regs.pc = 0x0100;
    (cpu, SimpleBus::new(), out)
}

#[test]
fn test_putchar_emits_accumulator_and_returns() {
    let (mut cpu, mut bus, out) = machine(b"");
    bus.load(
        0x0100,
        &[
            0xA9, 0x41, // LDA #'A'
            0x20, 0x25, 0x00, // JSR $0025
            0xE8, // INX
        ],
    );
    // Guest code at the trap address must never run.
    bus.poke(PUTCHAR_ADDR, 0x02);

    cpu.step(&mut bus).expect("lda");
    cpu.step(&mut bus).expect("jsr $0025");

    assert_eq!(out.bytes(), vec![0x41]);
    assert_eq!(cpu.regs.pc, 0x0105);
    assert!(cpu.stack().is_empty());

    cpu.step(&mut bus).expect("inx");
    assert_eq!(cpu.regs.x, 1);
}

#[test]
fn test_getchar_loads_accumulator() {
    let (mut cpu, mut bus, _) = machine(b"Q");
    bus.load(
        0x0100,
        &[
            0x20, 0x26, 0x00, // JSR $0026
            0x8D, 0x01, 0x02, // STA $0201
            0x20, 0x26, 0x00, // JSR $0026
        ],
    );

    cpu.step(&mut bus).expect("jsr $0026");
    assert_eq!(cpu.regs.a, b'Q');
    assert_eq!(cpu.regs.pc, 0x0103);
    cpu.step(&mut bus).expect("sta");
    assert_eq!(bus.peek(0x0201), b'Q');

    cpu.step(&mut bus).expect("jsr $0026 at end of input");
    assert_eq!(cpu.regs.a, EOF_BYTE);
}

#[test]
fn test_subroutine_then_trampoline() {
    // Main calls a subroutine that prints through the putchar trap, then
    // calls a trampoline at $0020 that prints Y via TYA.
    let (mut cpu, mut bus, out) = machine(b"");
    bus.load(
        0x0100,
        &[
            0xA9, 0x41, // LDA #'A'
            0x20, 0x00, 0x20, // JSR $2000
            0xA0, 0x21, // LDY #'!'
            0x20, 0x20, 0x00, // JSR $0020
            0x4C, 0x0A, 0x01, // JMP $010A
        ],
    );
    bus.load(0x2000, &[0x20, 0x25, 0x00, 0x60]); // JSR $0025; RTS
    bus.load(0x0020, &[0x98, 0x20, 0x25, 0x00, 0x60]); // TYA; JSR $0025; RTS

    for _ in 0..9 {
        cpu.step(&mut bus).expect("step");
    }

    assert_eq!(out.text(), "A!");
    assert_eq!(cpu.regs.pc, 0x010A);
    assert!(cpu.stack().is_empty());
}

#[test]
fn test_trap_with_full_stack_overflows() {
    let (mut cpu, mut bus, out) = machine(b"");
    bus.load(0x0100, &[0x20, 0x00, 0x01]); // JSR $0100
    bus.load(0x0200, &[0x20, 0x25, 0x00]); // JSR $0025

    for _ in 0..256 {
        cpu.step(&mut bus).expect("recursive jsr");
    }
    cpu.regs.pc = 0x0200;
    assert!(cpu.step(&mut bus).is_err());
    assert!(out.bytes().is_empty(), "nothing printed once the push failed");
}

#[test]
fn test_custom_trap_is_a_map_entry() {
    struct Upper(OutputCapture);
    impl CharSink for Upper {
        fn put_char(&mut self, byte: u8) {
            self.0.put_char(byte.to_ascii_uppercase());
        }
    }

    let out = OutputCapture::new();
    let mut host = HostIo::new();
    host.register(0xFFF0, HostCall::output(Upper(out.clone())));
    let mut cpu = Mini6502::new(host);
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[0xA9, b'q', 0x20, 0xF0, 0xFF, 0x20, 0x25, 0x00]);

    cpu.step(&mut bus).expect("lda");
    cpu.step(&mut bus).expect("jsr $FFF0");
    assert_eq!(out.text(), "Q");
    assert_eq!(cpu.regs.pc, 0x0005);

    // $0025 is not bound in this map, so the call lands on guest code.
    cpu.step(&mut bus).expect("jsr $0025");
    assert_eq!(cpu.regs.pc, GETCHAR_ADDR - 1);
    assert_eq!(cpu.stack().depth(), 1);
}
