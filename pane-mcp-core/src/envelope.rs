//! Uniform outcome of a dispatched command.
//!
//! Every command produces exactly one [`ResultEnvelope`]. Success payloads
//! are typed per command and carry everything the formatter needs, so
//! rendering never has to go back to the controller.

use crate::address::{PaneAddress, SidePosition};
use crate::controller::ControlChar;
use crate::topology::{Pane, Topology};
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultEnvelope {
    Success(Payload),
    Failure(Failure),
}

impl ResultEnvelope {
    pub fn is_error(&self) -> bool {
        matches!(self, ResultEnvelope::Failure(_))
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        ResultEnvelope::Failure(Failure {
            kind,
            message: message.into(),
        })
    }
}

impl From<Payload> for ResultEnvelope {
    fn from(payload: Payload) -> Self {
        ResultEnvelope::Success(payload)
    }
}

impl Serialize for ResultEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResultEnvelope::Success(payload) => payload.serialize(serializer),
            ResultEnvelope::Failure(failure) => failure.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

/// Which stage produced a business failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The address did not match the topology.
    Resolution,
    /// The controller was unreachable, misbehaved, or reported an error.
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Serialize for Failure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("error", &true)?;
        map.serialize_entry("kind", &self.kind)?;
        map.serialize_entry("message", &self.message)?;
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Success payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Payload {
    Status(StatusReport),
    ListPanes(Topology),
    ReadPane(ReadReport),
    CurrentPane(PaneReport),
    SidePane(SideReport),
    EnableApi(EnableReport),
    SendText(SendTextReport),
    SendControlCharacter(SendControlReport),
    SplitPane(SplitReport),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub module_installed: bool,
    pub api_enabled: bool,
    pub in_session: bool,
    /// Logical AND of the three checks above.
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_session_id: Option<String>,
}

impl StatusReport {
    pub fn new(
        module_installed: bool,
        api_enabled: bool,
        in_session: bool,
        current_session_id: Option<String>,
    ) -> Self {
        Self {
            module_installed,
            api_enabled,
            in_session,
            ready: module_installed && api_enabled && in_session,
            current_session_id: current_session_id.filter(|id| !id.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadReport {
    pub address: PaneAddress,
    pub session_id: String,
    pub name: String,
    pub cwd: String,
    pub contents: String,
}

/// Details of one pane, as reported by `current_pane`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaneReport {
    pub address: PaneAddress,
    pub session_id: String,
    pub name: String,
    pub tty: String,
    pub cwd: String,
    pub job: String,
}

impl From<&Pane> for PaneReport {
    fn from(pane: &Pane) -> Self {
        Self {
            address: pane.address,
            session_id: pane.id.clone(),
            name: pane.name.clone(),
            tty: pane.tty.clone(),
            cwd: pane.cwd.clone(),
            job: pane.job.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideReport {
    pub position: SidePosition,
    #[serde(flatten)]
    pub pane: PaneReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnableReport {
    pub enabled: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendTextReport {
    pub address: PaneAddress,
    pub text: String,
    pub newline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendControlReport {
    pub address: PaneAddress,
    pub control: ControlChar,
}

impl SendControlReport {
    pub fn description(&self) -> &'static str {
        self.control.description()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

impl SplitDirection {
    pub fn from_vertical(vertical: bool) -> Self {
        if vertical {
            SplitDirection::Vertical
        } else {
            SplitDirection::Horizontal
        }
    }

    /// "horizontally" / "vertically", for prose.
    pub fn adverb(self) -> &'static str {
        match self {
            SplitDirection::Horizontal => "horizontally",
            SplitDirection::Vertical => "vertically",
        }
    }
}

impl fmt::Display for SplitDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SplitDirection::Horizontal => "horizontal",
            SplitDirection::Vertical => "vertical",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    /// Address of the pane that was split.
    pub address: PaneAddress,
    pub source_session_id: String,
    pub new_session_id: String,
    pub direction: SplitDirection,
}
