//! Message-passing boundary toward the terminal controller.
//!
//! The dispatcher never talks to the terminal directly. It hands a
//! [`ControllerRequest`] to a [`TerminalController`] and gets back a
//! [`ControllerReply`]: either the verb's JSON payload or the failure the
//! controller reported. Payloads are decoded into the `*Reply` wire structs
//! straight away so untyped maps never travel further than this module.

use crate::error::TransportError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Control characters that can be sent to a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlChar {
    /// Ctrl+C
    Interrupt,
    /// Ctrl+D
    EndOfTransmission,
    /// Ctrl+Z
    Suspend,
    /// Ctrl+L
    ClearScreen,
}

impl ControlChar {
    /// Accepted argument spellings, for error messages and schemas.
    pub const ALLOWED: &'static str = "c, d, z, l";
    pub const LETTERS: [&'static str; 4] = ["c", "d", "z", "l"];

    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim().to_ascii_lowercase().as_str() {
            "c" => Some(ControlChar::Interrupt),
            "d" => Some(ControlChar::EndOfTransmission),
            "z" => Some(ControlChar::Suspend),
            "l" => Some(ControlChar::ClearScreen),
            _ => None,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            ControlChar::Interrupt => "c",
            ControlChar::EndOfTransmission => "d",
            ControlChar::Suspend => "z",
            ControlChar::ClearScreen => "l",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ControlChar::Interrupt => "Ctrl+C (interrupt)",
            ControlChar::EndOfTransmission => "Ctrl+D (end of transmission)",
            ControlChar::Suspend => "Ctrl+Z (suspend)",
            ControlChar::ClearScreen => "Ctrl+L (clear screen)",
        }
    }
}

/// One controller round trip. Pane operations carry the native session id,
/// never a shorthand address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerRequest {
    Status,
    Enable,
    List,
    Read {
        pane_id: String,
    },
    SendText {
        pane_id: String,
        text: String,
        newline: bool,
    },
    SendControl {
        pane_id: String,
        control: ControlChar,
    },
    Split {
        pane_id: String,
        vertical: bool,
    },
}

impl ControllerRequest {
    pub fn verb(&self) -> &'static str {
        match self {
            ControllerRequest::Status => "status",
            ControllerRequest::Enable => "enable",
            ControllerRequest::List => "list",
            ControllerRequest::Read { .. } => "read",
            ControllerRequest::SendText { .. } => "send-text",
            ControllerRequest::SendControl { .. } => "send-control",
            ControllerRequest::Split { .. } => "split",
        }
    }

    /// Verb, then flags, then `--`, then positionals. User text may start
    /// with `-` and must never be read as an option by the client.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![self.verb().to_string()];
        let positionals: Vec<String> = match self {
            ControllerRequest::Status | ControllerRequest::Enable | ControllerRequest::List => {
                return args;
            }
            ControllerRequest::Read { pane_id } => vec![pane_id.clone()],
            ControllerRequest::SendText {
                pane_id,
                text,
                newline,
            } => {
                if !newline {
                    args.push("--no-newline".to_string());
                }
                vec![pane_id.clone(), text.clone()]
            }
            ControllerRequest::SendControl { pane_id, control } => {
                vec![pane_id.clone(), control.letter().to_string()]
            }
            ControllerRequest::Split { pane_id, vertical } => {
                if *vertical {
                    args.push("--vertical".to_string());
                }
                vec![pane_id.clone()]
            }
        };
        args.push("--".to_string());
        args.extend(positionals);
        args
    }
}

impl fmt::Display for ControllerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Text payloads can be long or sensitive; keep them out of logs.
        match self {
            ControllerRequest::SendText { pane_id, text, .. } => {
                write!(f, "send-text {pane_id} <{} chars>", text.chars().count())
            }
            other => f.write_str(&other.to_args().join(" ")),
        }
    }
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// Tagged outcome of a controller round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerReply {
    Success(Value),
    Failure {
        code: Option<String>,
        message: String,
    },
}

impl ControllerReply {
    /// Classify a raw JSON reply. An `error` field that is `true` or a
    /// string code marks a failure.
    pub fn from_json(value: Value) -> Result<Self, TransportError> {
        let Value::Object(map) = &value else {
            return Err(TransportError::MalformedResponse(format!(
                "expected a JSON object, got {value}"
            )));
        };

        let code = match map.get("error") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => return Ok(Self::Success(value)),
            Some(Value::String(code)) => Some(code.clone()),
            Some(_) => None,
        };
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| code.clone())
            .unwrap_or_else(|| "Terminal client reported an error".to_string());

        Ok(Self::Failure { code, message })
    }

    /// Decode a success payload into the verb's wire struct. A failure
    /// reply is returned unchanged as `Err(Failure)`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Result<T, ReplyFailure>, TransportError> {
        match self {
            ControllerReply::Success(value) => serde_json::from_value(value)
                .map(Ok)
                .map_err(|e| TransportError::MalformedResponse(e.to_string())),
            ControllerReply::Failure { code, message } => Ok(Err(ReplyFailure { code, message })),
        }
    }
}

/// A failure the controller itself reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyFailure {
    pub code: Option<String>,
    pub message: String,
}

impl fmt::Display for ReplyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) if code != &self.message => write!(f, "{} ({code})", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Performs terminal operations on behalf of the dispatcher.
///
/// Implementations must bound every call; a controller that does not answer
/// should produce [`TransportError::Timeout`] rather than block forever.
pub trait TerminalController {
    fn call(&self, request: &ControllerRequest) -> Result<ControllerReply, TransportError>;
}

impl<T: TerminalController + ?Sized> TerminalController for Box<T> {
    fn call(&self, request: &ControllerRequest) -> Result<ControllerReply, TransportError> {
        (**self).call(request)
    }
}

impl<T: TerminalController + ?Sized> TerminalController for &T {
    fn call(&self, request: &ControllerRequest) -> Result<ControllerReply, TransportError> {
        (**self).call(request)
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Reply to `status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusReply {
    #[serde(default, alias = "module_installed")]
    pub iterm2_module_installed: bool,
    #[serde(default)]
    pub api_enabled: bool,
    #[serde(default, alias = "in_session")]
    pub in_iterm_session: bool,
    #[serde(default)]
    pub current_session_id: Option<String>,
}

/// Reply to `enable`.
#[derive(Debug, Clone, Deserialize)]
pub struct EnableReply {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub message: String,
}

/// Reply to `list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListReply {
    #[serde(default)]
    pub current_session_id: Option<String>,
    #[serde(default)]
    pub windows: Vec<WindowWire>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowWire {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub tabs: Vec<TabWire>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TabWire {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "panes")]
    pub sessions: Vec<SessionWire>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionWire {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tty: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub is_current: bool,
}

/// Reply to `read`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadReply {
    #[serde(default)]
    pub contents: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
}

/// Reply to `split`.
#[derive(Debug, Clone, Deserialize)]
pub struct SplitReply {
    #[serde(alias = "session_id")]
    pub new_session_id: String,
}

/// Reply to `send-text` and `send-control`; only its error-ness matters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AckReply {}

fn default_true() -> bool {
    true
}
