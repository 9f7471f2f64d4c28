//! Typed error taxonomy for pane-mcp.
//!
//! Four families of failure flow through the dispatcher:
//! - [`ValidationError`]: bad tool arguments, detected before any controller
//!   call and reported to the client as a protocol-level invalid-params fault
//! - [`ResolutionError`]: a pane address that does not match the current
//!   topology, reported as a tool result with `isError: true`
//! - [`TransportError`]: the terminal controller could not be reached or
//!   answered with something unusable, also reported as a tool result
//! - [`DispatchFault`]: the two protocol-shape faults (unknown command,
//!   invalid arguments) that escape the dispatcher instead of becoming an
//!   envelope

use std::fmt;
use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A tool argument was missing or had the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required argument was absent or an empty string.
    #[error("Missing required argument '{0}'")]
    MissingField(&'static str),

    /// An argument was present but not of the expected JSON type.
    #[error("Argument '{field}' must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    /// An argument was not one of the accepted values.
    #[error("Invalid value '{value}' for '{field}' (expected one of: {allowed})")]
    InvalidEnum {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Level of the window → tab → pane hierarchy at which a lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Window,
    Tab,
    Pane,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Window => "window",
            Level::Tab => "tab",
            Level::Pane => "pane",
        })
    }
}

/// A pane address could not be mapped onto the topology snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The address string does not match `t<tab>p<pane>` or
    /// `w<window>t<tab>p<pane>`.
    #[error(
        "Invalid pane address '{0}': expected t<tab>p<pane> or w<window>t<tab>p<pane> \
         with 1-based numbers (e.g. t1p2)"
    )]
    Malformed(String),

    /// A position was out of range at the given level.
    #[error("{level} {position} not found ({available} {level}(s) available)")]
    NotFound {
        level: Level,
        position: usize,
        available: usize,
    },

    /// No pane in the snapshot is flagged as current.
    #[error(
        "No current session: the server does not appear to be running inside a terminal pane"
    )]
    NoCurrentSession,

    /// More than one pane claimed to be current.
    #[error("Inconsistent topology: {0} panes are flagged as current")]
    MultipleCurrentSessions(usize),

    /// The current pane is alone in its tab.
    #[error("No side pane: the current tab has only one pane")]
    NoSidePane,
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// The terminal controller could not complete a round trip.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The controller program could not be started.
    #[error("Failed to start terminal client '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The controller did not answer within the configured bound.
    #[error("Terminal client timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// The controller exited abnormally without a parseable reply.
    #[error("Terminal client exited with {status}: {stderr}")]
    AbnormalExit { status: String, stderr: String },

    /// The controller answered with something that is not the expected JSON.
    #[error("Malformed response from terminal client: {0}")]
    MalformedResponse(String),

    /// Any other I/O failure while talking to the controller.
    #[error("I/O error talking to terminal client: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Dispatch faults
// ---------------------------------------------------------------------------

/// Protocol-shape faults that are not turned into a result envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchFault {
    #[error("Unknown tool: {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_level() {
        let err = ResolutionError::NotFound {
            level: Level::Pane,
            position: 5,
            available: 2,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("pane 5 not found"), "got: {msg}");
        assert!(msg.contains("2 pane(s)"));
    }

    #[test]
    fn timeout_reports_milliseconds() {
        let err = TransportError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Terminal client timed out after 1500 ms");
    }

    #[test]
    fn validation_converts_into_dispatch_fault() {
        let fault: DispatchFault = ValidationError::MissingField("session_id").into();
        assert_eq!(fault.to_string(), "Missing required argument 'session_id'");
    }
}
