//! Tool descriptors and input schemas advertised by `tools/list`.

use pane_mcp_core::controller::ControlChar;
use pane_mcp_core::dispatch::ADDRESS_FIELD;
use serde_json::{Value, json};

const ADDRESS_DESCRIPTION: &str = "Pane address: t<tab>p<pane> (first window) or \
     w<window>t<tab>p<pane>, 1-based as shown in the terminal (e.g. t1p2), or 'current'";

fn address_property() -> Value {
    json!({
        "type": "string",
        "description": ADDRESS_DESCRIPTION
    })
}

fn no_arguments() -> Value {
    json!({
        "type": "object",
        "properties": {}
    })
}

fn tool(name: &str, description: &str, input_schema: Value) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": input_schema
    })
}

fn status_tool() -> Value {
    tool(
        "status",
        "Check whether the terminal control API is usable: control module installed, API \
         enabled in preferences, and server running inside a terminal session.",
        no_arguments(),
    )
}

fn list_panes_tool() -> Value {
    tool(
        "list_panes",
        "List every window, tab and pane with its address, name, job and working \
         directory. The pane this server runs in is marked with '*'.",
        no_arguments(),
    )
}

fn read_pane_tool() -> Value {
    tool(
        "read_pane",
        "Read the visible screen contents of a pane.",
        json!({
            "type": "object",
            "properties": { ADDRESS_FIELD: address_property() },
            "required": [ADDRESS_FIELD]
        }),
    )
}

fn current_pane_tool() -> Value {
    tool(
        "current_pane",
        "Show the pane this server is running in: address, name, job and working directory.",
        no_arguments(),
    )
}

fn side_pane_tool() -> Value {
    tool(
        "side_pane",
        "Find the pane next to the current one in the same tab (the next pane, or the \
         previous one when the current pane is last).",
        no_arguments(),
    )
}

fn enable_api_tool() -> Value {
    tool(
        "enable_api",
        "Enable the terminal's scripting API in its preferences. The terminal must be \
         restarted afterwards.",
        no_arguments(),
    )
}

fn send_text_tool() -> Value {
    tool(
        "send_text",
        "Type text into a pane, pressing Enter afterwards unless newline is false.",
        json!({
            "type": "object",
            "properties": {
                ADDRESS_FIELD: address_property(),
                "text": {
                    "type": "string",
                    "description": "Text to type"
                },
                "newline": {
                    "type": "boolean",
                    "description": "Press Enter after the text (default: true)",
                    "default": true
                }
            },
            "required": [ADDRESS_FIELD, "text"]
        }),
    )
}

fn send_control_character_tool() -> Value {
    tool(
        "send_control_character",
        "Send a control character to a pane: c = Ctrl+C (interrupt), d = Ctrl+D (end of \
         transmission), z = Ctrl+Z (suspend), l = Ctrl+L (clear screen).",
        json!({
            "type": "object",
            "properties": {
                ADDRESS_FIELD: address_property(),
                "control": {
                    "type": "string",
                    "enum": ControlChar::LETTERS,
                    "description": "Control character letter"
                }
            },
            "required": [ADDRESS_FIELD, "control"]
        }),
    )
}

fn split_pane_tool() -> Value {
    tool(
        "split_pane",
        "Split a pane, creating a new one beside it. Returns the new pane's session id.",
        json!({
            "type": "object",
            "properties": {
                ADDRESS_FIELD: address_property(),
                "vertical": {
                    "type": "boolean",
                    "description": "Split vertically (side by side) instead of horizontally \
                                    (default: false)",
                    "default": false
                }
            },
            "required": [ADDRESS_FIELD]
        }),
    )
}

/// Every tool descriptor, in the order of `Command::NAMES`.
pub fn all_tools() -> Vec<Value> {
    vec![
        status_tool(),
        list_panes_tool(),
        read_pane_tool(),
        current_pane_tool(),
        side_pane_tool(),
        enable_api_tool(),
        send_text_tool(),
        send_control_character_tool(),
        split_pane_tool(),
    ]
}
