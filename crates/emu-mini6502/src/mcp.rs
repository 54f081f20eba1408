//! MCP (Model Context Protocol) server for the mini 6502 machine.
//!
//! Exposes the machine as a JSON-RPC 2.0 server over stdin/stdout. Guest
//! output is captured rather than printed, and guest input is fed from a
//! queue filled by `send_input`, so stdout stays reserved for responses.

#![allow(clippy::redundant_closure_for_method_calls)]

use std::io::{self, BufRead, Write};

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use emu_core::{Cpu, Observable};
use mini_6502::{AddressingMode, CpuError, HostIo, InputQueue, OutputCapture, effective_address};

use crate::dump::hex_dump;
use crate::{Machine, Program, StopReason};

/// Error code for a fatal CPU condition raised by guest code.
const CPU_FAULT: i32 = -32001;

// ---------------------------------------------------------------------------
// JSON-RPC types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RpcRequest {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: JsonValue,
    id: JsonValue,
}

#[derive(Serialize)]
struct RpcResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
    id: JsonValue,
}

#[derive(Serialize)]
struct RpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

impl RpcResponse {
    fn success(id: JsonValue, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0",
            result: Some(result),
            error: None,
            id,
        }
    }

    fn error(id: JsonValue, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            result: None,
            error: Some(RpcError {
                code,
                message,
                data: None,
            }),
            id,
        }
    }

    fn cpu_fault(id: JsonValue, err: &CpuError, pc: u16) -> Self {
        Self {
            jsonrpc: "2.0",
            result: None,
            error: Some(RpcError {
                code: CPU_FAULT,
                message: err.to_string(),
                data: Some(serde_json::json!({
                    "kind": err.kind().name(),
                    "pc": format!("${pc:04X}"),
                })),
            }),
            id,
        }
    }
}

fn require_u16(params: &JsonValue, key: &str, id: &JsonValue) -> Result<u16, RpcResponse> {
    match params.get(key).and_then(|v| v.as_u64()) {
        Some(v) if v <= 0xFFFF => Ok(v as u16),
        _ => Err(RpcResponse::error(
            id.clone(),
            -32602,
            format!("Missing or invalid '{key}' (0-65535)"),
        )),
    }
}

fn optional_u16(
    params: &JsonValue,
    key: &str,
    default: u16,
    id: &JsonValue,
) -> Result<u16, RpcResponse> {
    if params.get(key).is_some() {
        require_u16(params, key, id)
    } else {
        Ok(default)
    }
}

// ---------------------------------------------------------------------------
// MCP Server
// ---------------------------------------------------------------------------

/// MCP server wrapping a headless machine.
pub struct McpServer {
    machine: Option<Machine>,
    /// Entry point of the booted program, restored by `reset`.
    entry: u16,
    output: OutputCapture,
    input: InputQueue,
    default_program: Option<Program>,
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

impl McpServer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            machine: None,
            entry: 0,
            output: OutputCapture::new(),
            input: InputQueue::new(),
            default_program: None,
        }
    }

    /// Program booted when `boot` is called without parameters.
    pub fn set_program(&mut self, program: Program) {
        self.default_program = Some(program);
    }

    /// Run the server loop: read JSON-RPC from stdin, write responses to stdout.
    pub fn run(&mut self) {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut stdout = stdout.lock();

        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = self.handle_line(line);
            let _ = writeln!(
                stdout,
                "{}",
                serde_json::to_string(&response).unwrap_or_default()
            );
            let _ = stdout.flush();
        }
    }

    fn handle_line(&mut self, line: &str) -> RpcResponse {
        let request: RpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                return RpcResponse::error(JsonValue::Null, -32700, format!("Parse error: {e}"));
            }
        };
        if request.jsonrpc != "2.0" {
            return RpcResponse::error(request.id, -32600, "Invalid JSON-RPC version".to_string());
        }
        self.dispatch(&request.method, &request.params, request.id)
    }

    fn dispatch(&mut self, method: &str, params: &JsonValue, id: JsonValue) -> RpcResponse {
        match method {
            "boot" => self.handle_boot(params, id),
            "reset" => self.handle_reset(id),
            "step_instruction" => self.handle_step_instruction(id),
            "run" => self.handle_run(params, id),
            "query" => self.handle_query(params, id),
            "poke" => self.handle_poke(params, id),
            "query_memory" => self.handle_query_memory(params, id),
            "dump" => self.handle_dump(params, id),
            "send_input" => self.handle_send_input(params, id),
            "take_output" => self.handle_take_output(id),
            "effective_address" => self.handle_effective_address(params, id),
            _ => RpcResponse::error(id, -32601, format!("Unknown method: {method}")),
        }
    }

    fn require_machine(&mut self, id: &JsonValue) -> Result<&mut Machine, RpcResponse> {
        self.machine.as_mut().ok_or_else(|| {
            RpcResponse::error(
                id.clone(),
                -32000,
                "No machine instance. Call 'boot' first.".to_string(),
            )
        })
    }

    // === Tool handlers ===

    fn handle_boot(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let origin = match optional_u16(params, "origin", 0x0100, &id) {
            Ok(o) => o,
            Err(e) => return e,
        };
        let program = if let Some(name) = params.get("demo").and_then(|v| v.as_str()) {
            match Program::demo(name) {
                Some(p) => p,
                None => return RpcResponse::error(id, -32602, format!("Unknown demo: {name}")),
            }
        } else if let Some(b64) = params.get("data").and_then(|v| v.as_str()) {
            let data = match base64::engine::general_purpose::STANDARD.decode(b64) {
                Ok(d) => d,
                Err(e) => return RpcResponse::error(id, -32602, format!("Invalid base64: {e}")),
            };
            Program::from_image("data", origin, data)
        } else if let Some(path) = params.get("path").and_then(|v| v.as_str()) {
            match std::fs::read(path) {
                Ok(d) => Program::from_image(path, origin, d),
                Err(e) => return RpcResponse::error(id, -32000, format!("Cannot read file: {e}")),
            }
        } else if let Some(program) = self.default_program.clone() {
            program
        } else {
            return RpcResponse::error(
                id,
                -32602,
                "Provide 'demo', 'data' (base64) or 'path'".to_string(),
            );
        };

        let entry = match optional_u16(params, "entry", program.entry, &id) {
            Ok(e) => e,
            Err(e) => return e,
        };

        self.output = OutputCapture::new();
        self.input = InputQueue::new();
        let mut machine = Machine::new(HostIo::standard(self.output.clone(), self.input.clone()));
        machine.load_program(&program);
        machine.set_pc(entry);
        self.entry = entry;
        self.machine = Some(machine);

        RpcResponse::success(
            id,
            serde_json::json!({
                "status": "ok",
                "program": program.name,
                "bytes": program.len(),
                "entry": format!("${entry:04X}"),
            }),
        )
    }

    fn handle_reset(&mut self, id: JsonValue) -> RpcResponse {
        let entry = self.entry;
        match self.require_machine(&id) {
            Ok(machine) => {
                machine.reset();
                machine.set_pc(entry);
                RpcResponse::success(id, serde_json::json!({"status": "ok"}))
            }
            Err(e) => e,
        }
    }

    fn handle_step_instruction(&mut self, id: JsonValue) -> RpcResponse {
        let machine = match self.require_machine(&id) {
            Ok(m) => m,
            Err(e) => return e,
        };

        match machine.step() {
            Ok(()) => RpcResponse::success(
                id,
                serde_json::json!({
                    "pc": format!("${:04X}", machine.cpu().pc()),
                    "registers": registers_json(machine),
                }),
            ),
            Err(err) => RpcResponse::cpu_fault(id, &err, machine.instruction_pc()),
        }
    }

    fn handle_run(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let machine = match self.require_machine(&id) {
            Ok(m) => m,
            Err(e) => return e,
        };

        let count = params.get("count").and_then(|v| v.as_u64()).unwrap_or(1);
        let before = machine.steps();
        let result = machine.run(Some(count));
        let executed = machine.steps() - before;

        match result {
            Ok(StopReason::StepLimit) => RpcResponse::success(
                id,
                serde_json::json!({
                    "executed": executed,
                    "stop": "step_limit",
                    "pc": format!("${:04X}", machine.cpu().pc()),
                }),
            ),
            Err(err) => RpcResponse::cpu_fault(id, &err, machine.instruction_pc()),
        }
    }

    fn handle_query(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let machine = match self.require_machine(&id) {
            Ok(m) => m,
            Err(e) => return e,
        };

        let Some(path) = params.get("path").and_then(|v| v.as_str()) else {
            return RpcResponse::error(id, -32602, "Missing 'path' parameter".to_string());
        };

        match machine.query(path) {
            Some(value) => {
                let json_val = observable_to_json(&value);
                RpcResponse::success(id, serde_json::json!({"path": path, "value": json_val}))
            }
            None => RpcResponse::error(id, -32000, format!("Unknown query path: {path}")),
        }
    }

    fn handle_poke(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let addr = match require_u16(params, "address", &id) {
            Ok(a) => a,
            Err(e) => return e,
        };
        let value = match params.get("value").and_then(|v| v.as_u64()) {
            Some(v) if v <= 0xFF => v as u8,
            _ => {
                return RpcResponse::error(
                    id,
                    -32602,
                    "Missing or invalid 'value' (0-255)".to_string(),
                );
            }
        };
        let machine = match self.require_machine(&id) {
            Ok(m) => m,
            Err(e) => return e,
        };

        machine.bus_mut().poke(addr, value);
        RpcResponse::success(id, serde_json::json!({"address": addr, "value": value}))
    }

    fn handle_query_memory(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let address = match require_u16(params, "address", &id) {
            Ok(a) => a,
            Err(e) => return e,
        };
        let length = match params.get("length").and_then(|v| v.as_u64()) {
            Some(l) if (1..=0x1_0000).contains(&l) => l as usize,
            Some(_) => {
                return RpcResponse::error(id, -32602, "Invalid 'length' (1-65536)".to_string());
            }
            None => {
                return RpcResponse::error(id, -32602, "Missing 'length' parameter".to_string());
            }
        };
        let machine = match self.require_machine(&id) {
            Ok(m) => m,
            Err(e) => return e,
        };

        let bytes: Vec<u8> = (0..length)
            .map(|i| machine.bus().peek(address.wrapping_add(i as u16)))
            .collect();

        RpcResponse::success(
            id,
            serde_json::json!({
                "address": address,
                "length": length,
                "data": bytes,
            }),
        )
    }

    fn handle_dump(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let start = match require_u16(params, "start", &id) {
            Ok(a) => a,
            Err(e) => return e,
        };
        let end = match require_u16(params, "end", &id) {
            Ok(a) => a,
            Err(e) => return e,
        };
        if end < start {
            return RpcResponse::error(id, -32602, "'end' is before 'start'".to_string());
        }
        let machine = match self.require_machine(&id) {
            Ok(m) => m,
            Err(e) => return e,
        };

        RpcResponse::success(
            id,
            serde_json::json!({"text": hex_dump(machine.bus(), start, end)}),
        )
    }

    fn handle_send_input(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let bytes = if let Some(text) = params.get("text").and_then(|v| v.as_str()) {
            text.as_bytes().to_vec()
        } else if let Some(b64) = params.get("data").and_then(|v| v.as_str()) {
            match base64::engine::general_purpose::STANDARD.decode(b64) {
                Ok(d) => d,
                Err(e) => return RpcResponse::error(id, -32602, format!("Invalid base64: {e}")),
            }
        } else {
            return RpcResponse::error(id, -32602, "Provide 'text' or 'data' (base64)".to_string());
        };
        if let Err(e) = self.require_machine(&id) {
            return e;
        }

        self.input.push(&bytes);
        RpcResponse::success(
            id,
            serde_json::json!({"queued": bytes.len(), "pending": self.input.len()}),
        )
    }

    fn handle_take_output(&mut self, id: JsonValue) -> RpcResponse {
        if let Err(e) = self.require_machine(&id) {
            return e;
        }

        let bytes = self.output.take();
        RpcResponse::success(
            id,
            serde_json::json!({
                "text": String::from_utf8_lossy(&bytes),
                "data": base64::engine::general_purpose::STANDARD.encode(&bytes),
            }),
        )
    }

    fn handle_effective_address(&mut self, params: &JsonValue, id: JsonValue) -> RpcResponse {
        let selector = match params.get("mode").and_then(|v| v.as_u64()) {
            Some(m) if m <= 0xFF => m as u8,
            _ => {
                return RpcResponse::error(
                    id,
                    -32602,
                    "Missing or invalid 'mode' (0-255)".to_string(),
                );
            }
        };
        let operand = match require_u16(params, "operand", &id) {
            Ok(o) => o,
            Err(e) => return e,
        };
        let machine = match self.require_machine(&id) {
            Ok(m) => m,
            Err(e) => return e,
        };

        let pc = machine.cpu().pc();
        match AddressingMode::from_selector(selector) {
            Ok(mode) => {
                let regs = machine.cpu().registers();
                let addr = effective_address(mode, operand, regs.x, regs.y);
                RpcResponse::success(
                    id,
                    serde_json::json!({
                        "mode": format!("{mode:?}"),
                        "address": addr,
                    }),
                )
            }
            Err(err) => RpcResponse::cpu_fault(id, &err, pc),
        }
    }
}

fn registers_json(machine: &Machine) -> JsonValue {
    serde_json::to_value(machine.cpu().registers()).unwrap_or(JsonValue::Null)
}

fn observable_to_json(value: &emu_core::Value) -> JsonValue {
    match value {
        emu_core::Value::U8(v) => serde_json::json!(v),
        emu_core::Value::U16(v) => serde_json::json!(v),
        emu_core::Value::U64(v) => serde_json::json!(v),
        emu_core::Value::Bool(v) => serde_json::json!(v),
        emu_core::Value::String(v) => serde_json::json!(v),
    }
}
