//! Host handlers bound to the process's stdin and stdout.

use std::io::{Read, Write};

use mini_6502::{CharSink, CharSource, EOF_BYTE};

/// Writes each guest character to stdout and flushes immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl CharSink for StdoutSink {
    fn put_char(&mut self, byte: u8) {
        let mut out = std::io::stdout().lock();
        // A closed stdout must not stop the guest.
        let _ = out.write_all(&[byte]);
        let _ = out.flush();
    }
}

/// Blocks on stdin for one byte; end of input reads as [`EOF_BYTE`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

impl CharSource for StdinSource {
    fn get_char(&mut self) -> u8 {
        let mut byte = [0u8; 1];
        match std::io::stdin().lock().read(&mut byte) {
            Ok(1) => byte[0],
            _ => EOF_BYTE,
        }
    }
}
