//! Program images and the built-in demos.
//!
//! A program is a set of byte segments poked into memory before the first
//! instruction runs, plus the address execution starts at.

use mini_6502::{GETCHAR_ADDR, PUTCHAR_ADDR};

/// Names accepted by [`Program::demo`].
pub const DEMOS: &[&str] = &["hello", "greeting"];

/// Where the demos keep the character read by `greeting`.
pub const NAME_BUFFER: u16 = 0x0201;

/// A loadable program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub name: String,
    pub entry: u16,
    pub segments: Vec<(u16, Vec<u8>)>,
}

impl Program {
    /// A raw binary image loaded at `origin` and entered there.
    #[must_use]
    pub fn from_image(name: &str, origin: u16, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            entry: origin,
            segments: vec![(origin, bytes)],
        }
    }

    /// Look up a built-in demo by name.
    #[must_use]
    pub fn demo(name: &str) -> Option<Self> {
        match name {
            "hello" => Some(hello()),
            "greeting" => Some(greeting()),
            _ => None,
        }
    }

    /// Total bytes across all segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.iter().map(|(_, bytes)| bytes.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Emits instruction bytes at a known origin.
struct Segment {
    origin: u16,
    bytes: Vec<u8>,
}

impl Segment {
    fn at(origin: u16) -> Self {
        Self {
            origin,
            bytes: Vec::new(),
        }
    }

    /// Address of the next byte emitted.
    fn here(&self) -> u16 {
        self.origin.wrapping_add(self.bytes.len() as u16)
    }

    fn op(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    fn op_abs(&mut self, opcode: u8, addr: u16) -> &mut Self {
        let [lo, hi] = addr.to_le_bytes();
        self.op(&[opcode, lo, hi])
    }

    fn lda_imm(&mut self, value: u8) -> &mut Self {
        self.op(&[0xA9, value])
    }

    fn jsr(&mut self, addr: u16) -> &mut Self {
        self.op_abs(0x20, addr)
    }

    /// LDA #c; JSR putchar for every byte of `text`.
    fn print(&mut self, text: &[u8]) -> &mut Self {
        for &c in text {
            self.lda_imm(c).jsr(PUTCHAR_ADDR);
        }
        self
    }

    fn finish(self) -> (u16, Vec<u8>) {
        (self.origin, self.bytes)
    }
}

/// Prints `A!` and a newline, then stops on the undefined opcode `$00`.
///
/// The first character goes through an ordinary subroutine at `$2000`, the
/// second through a trampoline at `$0020` that prints Y.
fn hello() -> Program {
    let mut main = Segment::at(0x0100);
    main.jsr(0x2000)
        .op(&[0xA0, b'!']) // LDY #'!'
        .jsr(0x0020)
        .print(b"\n")
        .op(&[0x00]); // not decodable: the run ends with a fatal error

    let mut sub = Segment::at(0x2000);
    sub.lda_imm(b'A').jsr(PUTCHAR_ADDR).op(&[0x60]);

    let mut trampoline = Segment::at(0x0020);
    trampoline.op(&[0x98]).jsr(PUTCHAR_ADDR).op(&[0x60]); // TYA; JSR putchar; RTS

    Program {
        name: "hello".to_string(),
        entry: 0x0100,
        segments: vec![main.finish(), sub.finish(), trampoline.finish()],
    }
}

/// Asks for a name, reads one character and greets it, forever.
fn greeting() -> Program {
    let mut main = Segment::at(0x0100);
    main.print(b"What is your name?");
    let read = main.here();
    main.jsr(GETCHAR_ADDR)
        .op_abs(0x8D, NAME_BUFFER) // STA name
        .print(b"\r\nHello, ")
        .op_abs(0xAD, NAME_BUFFER) // LDA name
        .jsr(PUTCHAR_ADDR)
        .print(b"!\r\n")
        .op_abs(0x4C, read);

    Program {
        name: "greeting".to_string(),
        entry: 0x0100,
        segments: vec![main.finish()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_layout_matches_classic_listing() {
        let program = greeting();
        let (origin, bytes) = &program.segments[0];
        assert_eq!(*origin, 0x0100);
        // JSR $0026 right after the 18-character prompt.
        assert_eq!(&bytes[0x5A..0x5D], &[0x20, 0x26, 0x00]);
        // Loop back to the read at the very end.
        assert_eq!(&bytes[0xA2..], &[0x4C, 0x5A, 0x01]);
    }

    #[test]
    fn hello_ends_on_a_zero_byte() {
        let program = hello();
        let (origin, bytes) = &program.segments[0];
        assert_eq!(*origin, 0x0100);
        assert_eq!(bytes.len(), 14);
        assert_eq!(&bytes[bytes.len() - 4..], &[0x20, 0x25, 0x00, 0x00]);
    }

    #[test]
    fn demo_lookup() {
        for name in DEMOS {
            let program = Program::demo(name).expect("listed demo exists");
            assert_eq!(program.name, *name);
            assert!(!program.is_empty());
        }
        assert!(Program::demo("nope").is_none());
    }

    #[test]
    fn image_enters_at_origin() {
        let program = Program::from_image("rom.bin", 0x0400, vec![0xEA; 3]);
        assert_eq!(program.entry, 0x0400);
        assert_eq!(program.len(), 3);
    }
}
