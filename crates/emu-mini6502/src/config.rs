//! Run configuration for the headless front end.

use std::path::PathBuf;

use emu_core::parse_address;

use crate::Program;

/// Where the program comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramSource {
    /// One of the built-in demos, by name.
    Demo(String),
    /// A raw binary image placed at `origin`.
    File { path: PathBuf, origin: u16 },
}

impl Default for ProgramSource {
    fn default() -> Self {
        Self::Demo("hello".to_string())
    }
}

/// Machine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineConfig {
    pub program: ProgramSource,
    /// Overrides the program's own entry point.
    pub entry: Option<u16>,
    /// Instruction budget. `None` runs until a fatal error.
    pub max_steps: Option<u64>,
    /// Print one register line per instruction to stderr.
    pub trace: bool,
    /// Inclusive ranges to hex-dump after the run.
    pub dumps: Vec<(u16, u16)>,
}

impl MachineConfig {
    /// Resolve the program source into a loadable image.
    pub fn load_program(&self) -> Result<Program, String> {
        let mut program = match &self.program {
            ProgramSource::Demo(name) => {
                Program::demo(name).ok_or_else(|| format!("Unknown demo: {name}"))?
            }
            ProgramSource::File { path, origin } => {
                let bytes = std::fs::read(path)
                    .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
                if bytes.is_empty() {
                    return Err(format!("{} is empty", path.display()));
                }
                if usize::from(*origin) + bytes.len() > emu_core::MEMORY_SIZE {
                    return Err(format!(
                        "{} ({} bytes) does not fit at ${origin:04X}",
                        path.display(),
                        bytes.len()
                    ));
                }
                let name = path
                    .file_name()
                    .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
                Program::from_image(&name, *origin, bytes)
            }
        };
        if let Some(entry) = self.entry {
            program.entry = entry;
        }
        Ok(program)
    }
}

/// Parse an address given as `$hhhh`, `0xhhhh` or decimal.
pub fn parse_addr(text: &str) -> Result<u16, String> {
    parse_address(text).ok_or_else(|| format!("Invalid address: {text}"))
}

/// Parse a `<start>:<end>` dump range.
pub fn parse_range(text: &str) -> Result<(u16, u16), String> {
    let (start, end) = text
        .split_once(':')
        .ok_or_else(|| format!("Invalid range (expected <start>:<end>): {text}"))?;
    let start = parse_addr(start)?;
    let end = parse_addr(end)?;
    if end < start {
        return Err(format!("Range ends before it starts: {text}"));
    }
    Ok((start, end))
}
