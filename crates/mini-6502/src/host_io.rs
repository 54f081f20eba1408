//! Host I/O traps.
//!
//! A JSR whose target is a reserved address never runs guest code there.
//! The CPU looks the target up here, performs the host action, then returns
//! to the caller as if an RTS had executed. Adding a trap is a map insert,
//! not a dispatcher change.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::Registers;

/// Conventional trap for character output (A is written to the sink).
pub const PUTCHAR_ADDR: u16 = 0x0025;

/// Conventional trap for character input (the byte read lands in A).
pub const GETCHAR_ADDR: u16 = 0x0026;

/// Byte a source returns once its input is exhausted.
pub const EOF_BYTE: u8 = 0xFF;

/// Output capability: accepts one character.
pub trait CharSink {
    fn put_char(&mut self, byte: u8);
}

/// Input capability: produces one character, blocking if it must.
pub trait CharSource {
    fn get_char(&mut self) -> u8;
}

/// Host action bound to a reserved address.
pub enum HostCall {
    Output(Box<dyn CharSink>),
    Input(Box<dyn CharSource>),
}

impl HostCall {
    pub fn output(sink: impl CharSink + 'static) -> Self {
        Self::Output(Box::new(sink))
    }

    pub fn input(source: impl CharSource + 'static) -> Self {
        Self::Input(Box::new(source))
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Output(_) => "output",
            Self::Input(_) => "input",
        }
    }
}

impl std::fmt::Debug for HostCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Map of reserved addresses to host calls.
#[derive(Debug, Default)]
pub struct HostIo {
    traps: BTreeMap<u16, HostCall>,
}

impl HostIo {
    /// No traps: every JSR runs guest code.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Output at `$0025`, input at `$0026`.
    pub fn standard(sink: impl CharSink + 'static, source: impl CharSource + 'static) -> Self {
        let mut host = Self::new();
        host.register(PUTCHAR_ADDR, HostCall::output(sink));
        host.register(GETCHAR_ADDR, HostCall::input(source));
        host
    }

    /// Bind `call` to `address`, returning any call it replaces.
    pub fn register(&mut self, address: u16, call: HostCall) -> Option<HostCall> {
        self.traps.insert(address, call)
    }

    pub fn unregister(&mut self, address: u16) -> Option<HostCall> {
        self.traps.remove(&address)
    }

    #[must_use]
    pub fn is_trap(&self, address: u16) -> bool {
        self.traps.contains_key(&address)
    }

    /// Reserved addresses in ascending order.
    pub fn addresses(&self) -> impl Iterator<Item = u16> + '_ {
        self.traps.keys().copied()
    }

    /// Perform the host call bound to `address`, if any.
    ///
    /// Returns false when `address` is ordinary guest code.
    pub(crate) fn service(&mut self, address: u16, regs: &mut Registers) -> bool {
        match self.traps.get_mut(&address) {
            Some(HostCall::Output(sink)) => {
                sink.put_char(regs.a);
                true
            }
            Some(HostCall::Input(source)) => {
                regs.a = source.get_char();
                true
            }
            None => false,
        }
    }
}

/// Output sink that records every character.
///
/// Clones share one transcript, so a handle kept outside the CPU sees what
/// the trap wrote.
#[derive(Debug, Clone, Default)]
pub struct OutputCapture(Rc<RefCell<Vec<u8>>>);

impl OutputCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }

    /// Drain the transcript.
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl CharSink for OutputCapture {
    fn put_char(&mut self, byte: u8) {
        self.0.borrow_mut().push(byte);
    }
}

/// Input source fed from a shared queue.
///
/// Never blocks: a drained queue yields [`EOF_BYTE`].
#[derive(Debug, Clone, Default)]
pub struct InputQueue(Rc<RefCell<VecDeque<u8>>>);

impl InputQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let queue = Self::new();
        queue.push(bytes);
        queue
    }

    pub fn push(&self, bytes: &[u8]) {
        self.0.borrow_mut().extend(bytes.iter().copied());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

impl CharSource for InputQueue {
    fn get_char(&mut self) -> u8 {
        self.0.borrow_mut().pop_front().unwrap_or(EOF_BYTE)
    }
}
