//! Tool registration, descriptors, and dispatch for the MCP server.
//!
//! This module owns the tool registry: it builds the `tools/list` response and
//! hands `tools/call` requests to the core dispatcher, turning its envelopes
//! into MCP tool results.

pub mod descriptors;

use pane_mcp_core::format;
use pane_mcp_core::{DispatchFault, Dispatcher, ResultEnvelope, TerminalController};
use serde_json::Value;

/// Why a `tools/call` request could not be executed at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCallError {
    /// The named tool does not exist.
    UnknownTool(String),
    /// The request or its arguments were malformed.
    InvalidParams(String),
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Handle the `tools/list` request.
pub fn handle_tools_list() -> Value {
    serde_json::json!({
        "tools": descriptors::all_tools()
    })
}

/// Handle the `tools/call` request.
pub fn handle_tools_call<C: TerminalController>(
    params: Option<Value>,
    dispatcher: &Dispatcher<C>,
) -> Result<Value, ToolCallError> {
    let params = params
        .ok_or_else(|| ToolCallError::InvalidParams("Missing params for tools/call".into()))?;

    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolCallError::InvalidParams("Missing 'name' in tools/call params".into()))?;

    match dispatcher.dispatch(name, params.get("arguments")) {
        Ok(envelope) => {
            log::debug!(
                "{name} -> {}",
                serde_json::to_string(&envelope).unwrap_or_else(|_| "<unserializable>".into())
            );
            Ok(envelope_result(&envelope))
        }
        Err(DispatchFault::UnknownCommand(tool)) => Err(ToolCallError::UnknownTool(tool)),
        Err(DispatchFault::Validation(e)) => Err(ToolCallError::InvalidParams(e.to_string())),
    }
}

/// Convert an envelope into an MCP tool result.
pub fn envelope_result(envelope: &ResultEnvelope) -> Value {
    let text = format::render(envelope);
    if envelope.is_error() {
        tool_error(&text)
    } else {
        tool_text(&text)
    }
}

// ---------------------------------------------------------------------------
// Result helpers
// ---------------------------------------------------------------------------

/// Build a successful text tool result.
pub fn tool_text(text: &str) -> Value {
    serde_json::json!({
        "content": [{
            "type": "text",
            "text": text
        }]
    })
}

/// Build a tool error result.
pub fn tool_error(message: &str) -> Value {
    serde_json::json!({
        "isError": true,
        "content": [{
            "type": "text",
            "text": message
        }]
    })
}
