//! MCP (Model Context Protocol) server over stdio for terminal panes.
//!
//! Reads line-delimited JSON-RPC 2.0 from stdin and writes responses to stdout.
//! Exposes the terminal's windows, tabs and panes as tools: listing panes,
//! reading screen contents, sending text and control characters, and
//! splitting panes. Panes are addressed with the `t<tab>p<pane>` shorthand
//! resolved by `pane-mcp-core`.
//!
//! # Module layout
//!
//! - [`jsonrpc`]: JSON-RPC 2.0 requests, responses and line framing
//! - [`tools`]: tool descriptors and `tools/call` dispatch
//! - [`client`]: subprocess terminal controller with bounded waits

pub mod client;
pub mod jsonrpc;
pub mod tools;

use pane_mcp_core::{Dispatcher, TerminalController};
use std::io::{BufRead, Write};
use std::sync::OnceLock;

use jsonrpc::{Request, Response, RpcError, write_response};
use tools::{ToolCallError, handle_tools_call, handle_tools_list};

pub use client::{ClientError, DEFAULT_TIMEOUT, ProcessController};

// ---------------------------------------------------------------------------
// Protocol constants
// ---------------------------------------------------------------------------

/// MCP protocol version.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported during initialization.
pub const SERVER_NAME: &str = "pane-mcp";

/// Application version set by the main crate.
/// Use `set_app_version()` to initialize this before calling `run_mcp_server()`.
static APP_VERSION: OnceLock<String> = OnceLock::new();

/// Set the application version (should be called from the main crate with
/// the root crate's `VERSION` constant before running the MCP server).
pub fn set_app_version(version: impl Into<String>) {
    let _ = APP_VERSION.set(version.into());
}

/// Get the application version, falling back to the crate version if not set.
pub(crate) fn get_app_version() -> &'static str {
    APP_VERSION
        .get()
        .map(|s| s.as_str())
        .unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Handle the `initialize` JSON-RPC request.
fn handle_initialize() -> serde_json::Value {
    serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": get_app_version()
        }
    })
}

// ---------------------------------------------------------------------------
// Server loop
// ---------------------------------------------------------------------------

/// Handle one line of input. Returns `None` when no response is due
/// (blank lines, notifications, messages without a method).
pub fn handle_line<C: TerminalController>(
    dispatcher: &Dispatcher<C>,
    line: &str,
) -> Option<Response> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    log::trace!("<- {trimmed}");

    let request: Request = match serde_json::from_str(trimmed) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("Parse error: {e}");
            return Some(Response::parse_error());
        }
    };

    let Request { id, method, params } = request;
    let Some(method) = method else {
        log::debug!("Ignoring message without method");
        return None;
    };
    let Some(id) = id else {
        log::debug!("Notification: {method}");
        return None;
    };

    let outcome = match method.as_str() {
        "initialize" => Ok(handle_initialize()),
        "ping" => Ok(serde_json::json!({})),
        "tools/list" => Ok(handle_tools_list()),
        "tools/call" => handle_tools_call(params, dispatcher).map_err(|e| match e {
            ToolCallError::UnknownTool(name) => RpcError::unknown_tool(&name),
            ToolCallError::InvalidParams(detail) => RpcError::invalid_params(&detail),
        }),
        other => Err(RpcError::method_not_found(other)),
    };

    Some(match outcome {
        Ok(result) => Response::success(id, result),
        Err(error) => Response::failure(id, error),
    })
}

/// Serve requests from `reader` until it is exhausted or either side fails,
/// writing one response line per request to `writer`.
pub fn serve<C, R, W>(dispatcher: &Dispatcher<C>, reader: R, writer: &mut W)
where
    C: TerminalController,
    R: BufRead,
    W: Write,
{
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("Error reading input: {e}");
                break;
            }
        };

        if let Some(response) = handle_line(dispatcher, &line) {
            if let Some(error) = response.error() {
                log::debug!("Rejected request {}: {} ({})", response.id, error.message, error.code);
            }
            log::trace!(
                "-> {}",
                serde_json::to_string(&response).unwrap_or_else(|_| "<serialization error>".into())
            );
            if let Err(e) = write_response(writer, &response) {
                log::error!("Failed to write response: {e}");
                break;
            }
        }
    }
}

/// Run the MCP server on stdio. Returns once stdin is closed or stdout
/// fails so callers can run destructors and exit cleanly.
pub fn run_mcp_server<C: TerminalController>(dispatcher: &Dispatcher<C>) {
    log::info!("Starting {SERVER_NAME} MCP server v{}", get_app_version());

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    serve(dispatcher, stdin.lock(), &mut stdout);

    log::info!("stdin closed, exiting");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
