//! Shared integration test helpers for pane-mcp.
//!
//! Provides an in-memory terminal that answers controller requests the way a
//! real client would, plus helpers for driving the JSON-RPC layer.
//!
//! ```ignore
//! mod common;
//! use common::{FakeTerminal, call_tool};
//! ```

#![allow(dead_code)]

use pane_mcp_core::{
    ControllerReply, ControllerRequest, Dispatcher, TerminalController, TransportError,
};
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::time::Duration;

#[derive(Debug, Clone)]
struct FakePane {
    id: String,
    name: String,
    current: bool,
}

/// In-memory terminal. Splits really add panes, so a later `list_panes`
/// sees them.
pub struct FakeTerminal {
    /// window -> tab -> panes
    windows: RefCell<Vec<Vec<Vec<FakePane>>>>,
    calls: RefCell<Vec<ControllerRequest>>,
    next_id: Cell<u32>,
    offline: bool,
}

impl FakeTerminal {
    /// Build from a layout of session ids; an id ending in `*` is current.
    pub fn new(layout: &[&[&[&str]]]) -> Self {
        let windows = layout
            .iter()
            .map(|tabs| {
                tabs.iter()
                    .map(|panes| {
                        panes
                            .iter()
                            .map(|id| {
                                let current = id.ends_with('*');
                                let id = id.trim_end_matches('*').to_string();
                                FakePane {
                                    name: format!("shell-{}", id.to_lowercase()),
                                    id,
                                    current,
                                }
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();

        Self {
            windows: RefCell::new(windows),
            calls: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            offline: false,
        }
    }

    /// One window: tab 1 holds the current pane, tab 2 holds two panes.
    pub fn standard() -> Self {
        Self::new(&[&[&["CUR*"], &["P1", "P2"]]])
    }

    /// A terminal whose client never answers.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::standard()
        }
    }

    /// Every request received so far.
    pub fn calls(&self) -> Vec<ControllerRequest> {
        self.calls.borrow().clone()
    }

    /// Requests other than topology lookups.
    pub fn actions(&self) -> Vec<ControllerRequest> {
        self.calls()
            .into_iter()
            .filter(|c| *c != ControllerRequest::List)
            .collect()
    }

    fn current_id(&self) -> Option<String> {
        self.windows
            .borrow()
            .iter()
            .flatten()
            .flatten()
            .find(|p| p.current)
            .map(|p| p.id.clone())
    }

    fn find(&self, id: &str) -> Option<FakePane> {
        self.windows
            .borrow()
            .iter()
            .flatten()
            .flatten()
            .find(|p| p.id == id)
            .cloned()
    }

    fn list_json(&self) -> Value {
        let windows: Vec<Value> = self
            .windows
            .borrow()
            .iter()
            .enumerate()
            .map(|(w, tabs)| {
                let tabs: Vec<Value> = tabs
                    .iter()
                    .enumerate()
                    .map(|(t, panes)| {
                        let sessions: Vec<Value> = panes
                            .iter()
                            .map(|p| {
                                json!({
                                    "id": p.id,
                                    "name": p.name,
                                    "tty": format!("/dev/ttys{:03}", p.id.len()),
                                    "cwd": "/home/dev/project",
                                    "job": "zsh",
                                    "is_current": p.current
                                })
                            })
                            .collect();
                        json!({"id": format!("tab-{w}-{t}"), "sessions": sessions})
                    })
                    .collect();
                json!({"id": format!("window-{w}"), "tabs": tabs})
            })
            .collect();
        json!({"windows": windows, "current_session_id": self.current_id()})
    }

    fn not_found(id: &str) -> Value {
        json!({"error": "SESSION_NOT_FOUND", "message": format!("Session not found: {id}")})
    }

    fn split(&self, source: &str) -> Value {
        let new_id = format!("NEW-{}", self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);

        let mut windows = self.windows.borrow_mut();
        for tab in windows.iter_mut().flatten() {
            if let Some(index) = tab.iter().position(|p| p.id == source) {
                tab.insert(
                    index + 1,
                    FakePane {
                        id: new_id.clone(),
                        name: "shell-new".to_string(),
                        current: false,
                    },
                );
                return json!({"new_session_id": new_id});
            }
        }
        Self::not_found(source)
    }

    fn reply(&self, request: &ControllerRequest) -> Value {
        match request {
            ControllerRequest::Status => json!({
                "iterm2_module_installed": true,
                "api_enabled": true,
                "in_iterm_session": self.current_id().is_some(),
                "current_session_id": self.current_id()
            }),
            ControllerRequest::Enable => json!({
                "enabled": true,
                "message": "Python API enabled. Restart the terminal for the change to take effect."
            }),
            ControllerRequest::List => self.list_json(),
            ControllerRequest::Read { pane_id } => match self.find(pane_id) {
                Some(pane) => json!({
                    "contents": format!("{}$ echo hello\nhello", pane.name),
                    "name": pane.name
                }),
                None => Self::not_found(pane_id),
            },
            ControllerRequest::SendText { pane_id, .. }
            | ControllerRequest::SendControl { pane_id, .. } => match self.find(pane_id) {
                Some(_) => json!({"ok": true}),
                None => Self::not_found(pane_id),
            },
            ControllerRequest::Split { pane_id, .. } => self.split(pane_id),
        }
    }
}

impl TerminalController for FakeTerminal {
    fn call(&self, request: &ControllerRequest) -> Result<ControllerReply, TransportError> {
        self.calls.borrow_mut().push(request.clone());
        if self.offline {
            return Err(TransportError::Timeout(Duration::from_millis(10_000)));
        }
        ControllerReply::from_json(self.reply(request))
    }
}

/// Send a `tools/call` through the JSON-RPC layer and return the response.
pub fn call_tool(dispatcher: &Dispatcher<FakeTerminal>, name: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    });
    let response = pane_mcp_server::handle_line(dispatcher, &request.to_string())
        .expect("tools/call always gets a response");
    serde_json::to_value(&response).expect("response serializes")
}

/// Text content of a tool result.
pub fn result_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .expect("tool result has text content")
}

/// Whether the tool result is flagged as an error.
pub fn is_tool_error(response: &Value) -> bool {
    response["result"]["isError"].as_bool().unwrap_or(false)
}
