//! Core of the pane-mcp server: pane addressing, command dispatch, and
//! result envelopes.
//!
//! # Module layout
//!
//! - [`topology`]: immutable window/tab/pane snapshot
//! - [`address`]: shorthand address parsing and resolution (`t2p1`,
//!   `w1t2p1`, `current`, side pane)
//! - [`controller`]: request/reply boundary toward the terminal controller
//! - [`dispatch`]: argument validation and command execution
//! - [`envelope`]: typed success/failure outcome of a command
//! - [`format`]: text rendering of envelopes
//! - [`error`]: validation, resolution and transport error types
//!
//! Nothing in this crate performs I/O or keeps state between calls; the
//! controller implementation supplied by the caller does all talking to the
//! terminal.

pub mod address;
pub mod controller;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod format;
pub mod topology;

pub use address::{PaneAddress, SidePane, SidePosition, resolve, resolve_current, resolve_side};
pub use controller::{ControlChar, ControllerReply, ControllerRequest, TerminalController};
pub use dispatch::{Command, Dispatcher};
pub use envelope::{Failure, FailureKind, Payload, ResultEnvelope};
pub use error::{DispatchFault, ResolutionError, TransportError, ValidationError};
pub use topology::{Pane, Tab, Topology, Window};
