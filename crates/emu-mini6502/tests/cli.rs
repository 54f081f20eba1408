//! End-to-end runs of the `emu-mini6502` binary.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn emulator() -> Command {
    Command::new(env!("CARGO_BIN_EXE_emu-mini6502"))
}

fn run_with_stdin(cmd: &mut Command, stdin: &[u8]) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn emulator");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin)
        .expect("write stdin");
    child.wait_with_output().expect("wait for emulator")
}

fn temp_image(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("emu-mini6502-{}-{name}", std::process::id()));
    std::fs::write(&path, bytes).expect("write image");
    path
}

#[test]
fn hello_demo_prints_to_stdout() {
    let out = run_with_stdin(emulator().args(["--demo", "hello"]), b"");

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "A!\n");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Fatal: Unrecognized opcode: 0x00 at $010D"),
        "{stderr}"
    );
}

#[test]
fn self_jump_runs_until_the_step_limit() {
    // JMP $0100
    let path = temp_image("spin.bin", &[0x4C, 0x00, 0x01]);
    let out = run_with_stdin(
        emulator().arg("--load").arg(&path).args(["--max-steps", "1000"]),
        b"",
    );
    let _ = std::fs::remove_file(&path);

    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Step limit reached after 1000 instructions"), "{stderr}");
}

#[test]
fn self_recursive_call_exits_with_stack_overflow() {
    // JSR $0100
    let path = temp_image("recurse.bin", &[0x20, 0x00, 0x01]);
    let out = run_with_stdin(emulator().arg("--load").arg(&path), b"");
    let _ = std::fs::remove_file(&path);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Fatal: Stack Overflow!"), "{stderr}");
}

#[test]
fn greeting_demo_reads_stdin() {
    let out = run_with_stdin(
        emulator().args(["--demo", "greeting", "--max-steps", "65"]),
        b"Q",
    );

    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "What is your name?\r\nHello, Q!\r\n"
    );
}

#[test]
fn unknown_opcode_exits_with_status_one() {
    // LDA #$41, then an undefined opcode.
    let path = temp_image("bad.bin", &[0xA9, 0x41, 0x02]);
    let out = run_with_stdin(
        emulator().arg("--load").arg(&path).args(["--origin", "$0400"]),
        b"",
    );
    let _ = std::fs::remove_file(&path);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Fatal: Unrecognized opcode: 0x02 at $0402"),
        "{stderr}"
    );
}

#[test]
fn trace_and_dump() {
    // STA $0200 after LDA #$2A, then JMP *.
    let path = temp_image(
        "store.bin",
        &[0xA9, 0x2A, 0x8D, 0x00, 0x02, 0x4C, 0x05, 0x01],
    );
    let out = run_with_stdin(
        emulator()
            .arg("--load")
            .arg(&path)
            .args(["--trace", "--max-steps", "4", "--dump", "$0200:$0203"]),
        b"",
    );
    let _ = std::fs::remove_file(&path);

    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("PC=$0102 A=$2A X=$00 Y=$00 S=$FF P=$00"),
        "{stderr}"
    );
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "Memory Dump (0x0200 - 0x0203)\n0200: 2A 00 00 00\n"
    );
}

#[test]
fn bad_arguments_exit_with_status_one() {
    let out = run_with_stdin(emulator().arg("--bogus"), b"");
    assert_eq!(out.status.code(), Some(1));

    let out = run_with_stdin(emulator().args(["--demo", "nope"]), b"");
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Unknown demo: nope"));
}
