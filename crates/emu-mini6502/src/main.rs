//! Mini 6502 emulator binary.
//!
//! Loads a built-in demo or a raw binary image and runs it headless with
//! guest I/O bound to the terminal, or serves the machine over MCP.

use std::io::Write;
use std::path::PathBuf;
use std::process;

use emu_mini6502::config::{parse_addr, parse_range};
use emu_mini6502::console::{StdinSource, StdoutSink};
use emu_mini6502::dump::hex_dump;
use emu_mini6502::programs::DEMOS;
use emu_mini6502::{Machine, MachineConfig, ProgramSource, StopReason};
use mini_6502::HostIo;

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    config: MachineConfig,
    mcp: bool,
}

fn value_or_exit<T>(result: Result<T, String>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config: MachineConfig::default(),
        mcp: false,
    };
    let mut demo: Option<String> = None;
    let mut load: Option<PathBuf> = None;
    let mut origin = 0x0100;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            match args.get(i) {
                Some(v) => v.clone(),
                None => {
                    eprintln!("Missing value for {flag}");
                    process::exit(1);
                }
            }
        };
        match flag {
            "--demo" => {
                demo = Some(value());
            }
            "--load" => {
                load = Some(PathBuf::from(value()));
            }
            "--origin" => {
                origin = value_or_exit(parse_addr(&value()));
            }
            "--entry" => {
                cli.config.entry = Some(value_or_exit(parse_addr(&value())));
            }
            "--max-steps" => {
                let text = value();
                cli.config.max_steps = Some(value_or_exit(
                    text.parse()
                        .map_err(|_| format!("Invalid step count: {text}")),
                ));
            }
            "--trace" => {
                cli.config.trace = true;
            }
            "--dump" => {
                cli.config.dumps.push(value_or_exit(parse_range(&value())));
            }
            "--mcp" => {
                cli.mcp = true;
            }
            "--help" | "-h" => {
                eprintln!("Usage: emu-mini6502 [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!(
                    "  --demo <name>          Built-in demo ({}) [default: hello]",
                    DEMOS.join(", ")
                );
                eprintln!("  --load <file>          Raw binary image to run");
                eprintln!("  --origin <addr>        Load address for --load [default: $0100]");
                eprintln!("  --entry <addr>         Start execution here instead");
                eprintln!("  --max-steps <n>        Stop after n instructions [default: run until a fatal error]");
                eprintln!("  --trace                Print registers after every instruction");
                eprintln!("  --dump <start>:<end>   Hex-dump memory after the run (repeatable)");
                eprintln!("  --mcp                  Run as MCP server (JSON-RPC over stdio)");
                eprintln!();
                eprintln!("Addresses accept $hhhh, 0xhhhh or decimal.");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli.config.program = match (demo, load) {
        (Some(_), Some(_)) => {
            eprintln!("--demo and --load are mutually exclusive");
            process::exit(1);
        }
        (Some(name), None) => ProgramSource::Demo(name),
        (None, Some(path)) => ProgramSource::File { path, origin },
        (None, None) => ProgramSource::default(),
    };

    cli
}

// ---------------------------------------------------------------------------
// Headless mode
// ---------------------------------------------------------------------------

fn run_headless(config: &MachineConfig) {
    let program = value_or_exit(config.load_program());
    eprintln!(
        "Loaded {} ({} bytes), entry ${:04X}",
        program.name,
        program.len(),
        program.entry
    );

    let mut machine = Machine::new(HostIo::standard(StdoutSink, StdinSource));
    machine.load_program(&program);

    let result = if config.trace {
        machine.run_with(config.max_steps, |regs| {
            eprintln!(
                "PC=${:04X} A=${:02X} X=${:02X} Y=${:02X} S=${:02X} P=${:02X}",
                regs.pc, regs.a, regs.x, regs.y, regs.s, regs.p.0
            );
        })
    } else {
        machine.run(config.max_steps)
    };

    for &(start, end) in &config.dumps {
        print!("{}", hex_dump(machine.bus(), start, end));
    }
    let _ = std::io::stdout().flush();

    match result {
        Ok(StopReason::StepLimit) => {
            eprintln!("Step limit reached after {} instructions", machine.steps());
        }
        Err(e) => {
            eprintln!("Fatal: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = parse_args();

    if cli.mcp {
        #[cfg(feature = "mcp")]
        {
            let mut server = emu_mini6502::mcp::McpServer::new();
            match cli.config.load_program() {
                Ok(program) => server.set_program(program),
                Err(e) => eprintln!("{e}"),
            }
            server.run();
            return;
        }
        #[cfg(not(feature = "mcp"))]
        {
            eprintln!("Built without the 'mcp' feature");
            process::exit(1);
        }
    }

    run_headless(&cli.config);
}
