//! Hex dump of a memory range.

use std::fmt::Write;

use emu_core::SimpleBus;

const ROW: u16 = 16;

/// Format `start..=end` as rows of up to 16 bytes.
///
/// Rows break at 16-byte-aligned addresses, so a range that starts mid-row
/// produces a short first row.
#[must_use]
pub fn hex_dump(bus: &SimpleBus, start: u16, end: u16) -> String {
    let mut out = format!("Memory Dump (0x{start:04X} - 0x{end:04X})\n");
    if end < start {
        return out;
    }
    let mut addr = start;
    loop {
        let row_end = (addr | (ROW - 1)).min(end);
        let _ = write!(out, "{addr:04X}:");
        for a in addr..=row_end {
            let _ = write!(out, " {:02X}", bus.peek(a));
        }
        out.push('\n');
        if row_end == end {
            break;
        }
        addr = row_end + 1;
    }
    out
}
