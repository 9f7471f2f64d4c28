//! Command dispatcher: argument validation, address resolution, controller
//! calls, and conversion of every outcome into a [`ResultEnvelope`].
//!
//! Only protocol-shape faults (unknown command, invalid arguments) escape as
//! [`DispatchFault`]. Resolution and transport failures become failure
//! envelopes so the assistant can read them and retry with corrected input.
//! Nothing is retried here: a repeated `send_text` would type twice.

use crate::address::{self, PaneAddress};
use crate::controller::{
    AckReply, ControlChar, ControllerRequest, EnableReply, ListReply, ReadReply, ReplyFailure,
    SplitReply, StatusReply, TerminalController,
};
use crate::envelope::{
    EnableReport, FailureKind, PaneReport, Payload, ReadReport, ResultEnvelope, SendControlReport,
    SendTextReport, SideReport, SplitDirection, SplitReport, StatusReport,
};
use crate::error::{DispatchFault, ResolutionError, TransportError, ValidationError};
use crate::topology::Topology;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Argument carrying a pane address.
pub const ADDRESS_FIELD: &str = "session_id";

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A validated tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    ListPanes,
    ReadPane {
        address: String,
    },
    CurrentPane,
    SidePane,
    EnableApi,
    SendText {
        address: String,
        text: String,
        newline: bool,
    },
    SendControlCharacter {
        address: String,
        control: ControlChar,
    },
    SplitPane {
        address: String,
        vertical: bool,
    },
}

impl Command {
    /// Every command name, in the order tools are advertised.
    pub const NAMES: [&'static str; 9] = [
        "status",
        "list_panes",
        "read_pane",
        "current_pane",
        "side_pane",
        "enable_api",
        "send_text",
        "send_control_character",
        "split_pane",
    ];

    /// Validate raw JSON arguments for the named command.
    ///
    /// `args` may be absent or `null` for commands without required
    /// arguments; otherwise it must be an object.
    pub fn parse(name: &str, args: Option<&Value>) -> Result<Self, DispatchFault> {
        let empty = Map::new();
        let args = match args {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(ValidationError::InvalidType {
                    field: "arguments",
                    expected: "an object",
                }
                .into());
            }
        };

        let command = match name {
            "status" => Command::Status,
            "list_panes" => Command::ListPanes,
            "current_pane" => Command::CurrentPane,
            "side_pane" => Command::SidePane,
            "enable_api" => Command::EnableApi,
            "read_pane" => Command::ReadPane {
                address: address_arg(args)?,
            },
            "send_text" => Command::SendText {
                address: address_arg(args)?,
                text: required_str(args, "text")?,
                newline: optional_bool(args, "newline", true)?,
            },
            "send_control_character" => {
                let address = address_arg(args)?;
                let letter = required_str(args, "control")?;
                let control =
                    ControlChar::from_letter(&letter).ok_or(ValidationError::InvalidEnum {
                        field: "control",
                        value: letter,
                        allowed: ControlChar::ALLOWED,
                    })?;
                Command::SendControlCharacter { address, control }
            }
            "split_pane" => Command::SplitPane {
                address: address_arg(args)?,
                vertical: optional_bool(args, "vertical", false)?,
            },
            other => return Err(DispatchFault::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Status => "status",
            Command::ListPanes => "list_panes",
            Command::ReadPane { .. } => "read_pane",
            Command::CurrentPane => "current_pane",
            Command::SidePane => "side_pane",
            Command::EnableApi => "enable_api",
            Command::SendText { .. } => "send_text",
            Command::SendControlCharacter { .. } => "send_control_character",
            Command::SplitPane { .. } => "split_pane",
        }
    }
}

/// Clients send `""` for values they do not know.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn address_arg(args: &Map<String, Value>) -> Result<String, ValidationError> {
    let address = required_str(args, ADDRESS_FIELD)?;
    if address.trim().is_empty() {
        return Err(ValidationError::MissingField(ADDRESS_FIELD));
    }
    Ok(address)
}

fn required_str(args: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    match args.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(Value::String(s)) if s.is_empty() => Err(ValidationError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::InvalidType {
            field,
            expected: "a string",
        }),
    }
}

fn optional_bool(
    args: &Map<String, Value>,
    field: &'static str,
    default: bool,
) -> Result<bool, ValidationError> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(ValidationError::InvalidType {
            field,
            expected: "a boolean",
        }),
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Failures that end a command but still produce an envelope.
#[derive(Debug, Error)]
enum BusinessError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Reported(ReplyFailure),
}

impl BusinessError {
    fn kind(&self) -> FailureKind {
        match self {
            BusinessError::Resolution(_) => FailureKind::Resolution,
            BusinessError::Transport(_) | BusinessError::Reported(_) => FailureKind::Transport,
        }
    }
}

/// Stateless command dispatcher over a terminal controller.
pub struct Dispatcher<C> {
    controller: C,
}

impl<C: TerminalController> Dispatcher<C> {
    pub fn new(controller: C) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Validate and run a named command.
    pub fn dispatch(&self, name: &str, args: Option<&Value>) -> Result<ResultEnvelope, DispatchFault> {
        let command = Command::parse(name, args).inspect_err(|fault| {
            log::warn!("Rejected tool call '{name}': {fault}");
        })?;
        Ok(self.execute(command))
    }

    /// Run an already validated command.
    pub fn execute(&self, command: Command) -> ResultEnvelope {
        let name = command.name();
        log::info!("Executing {name}");
        match self.run(command) {
            Ok(payload) => ResultEnvelope::Success(payload),
            Err(e) => {
                log::warn!("{name} failed: {e}");
                ResultEnvelope::failure(e.kind(), e.to_string())
            }
        }
    }

    fn run(&self, command: Command) -> Result<Payload, BusinessError> {
        match command {
            Command::Status => {
                let reply: StatusReply = self.request(ControllerRequest::Status)?;
                Ok(Payload::Status(StatusReport::new(
                    reply.iterm2_module_installed,
                    reply.api_enabled,
                    reply.in_iterm_session,
                    reply.current_session_id,
                )))
            }
            Command::EnableApi => {
                let reply: EnableReply = self.request(ControllerRequest::Enable)?;
                Ok(Payload::EnableApi(EnableReport {
                    enabled: reply.enabled,
                    message: reply.message,
                }))
            }
            Command::ListPanes => Ok(Payload::ListPanes(self.snapshot()?)),
            Command::CurrentPane => {
                let topology = self.snapshot()?;
                let pane = address::resolve_current(&topology)?;
                Ok(Payload::CurrentPane(PaneReport::from(pane)))
            }
            Command::SidePane => {
                let topology = self.snapshot()?;
                let side = address::resolve_side(&topology)?;
                Ok(Payload::SidePane(SideReport {
                    position: side.position,
                    pane: PaneReport::from(side.pane),
                }))
            }
            Command::ReadPane { address } => {
                let topology = self.snapshot()?;
                let pane = address::resolve(&topology, &address)?;
                let reply: ReadReply = self.request(ControllerRequest::Read {
                    pane_id: pane.id.clone(),
                })?;
                Ok(Payload::ReadPane(ReadReport {
                    address: pane.address,
                    session_id: pane.id.clone(),
                    name: non_empty(reply.name).unwrap_or_else(|| pane.name.clone()),
                    cwd: non_empty(reply.cwd).unwrap_or_else(|| pane.cwd.clone()),
                    contents: reply.contents,
                }))
            }
            Command::SendText {
                address,
                text,
                newline,
            } => {
                let (target, pane_id) = self.locate(&address)?;
                let _: AckReply = self.request(ControllerRequest::SendText {
                    pane_id,
                    text: text.clone(),
                    newline,
                })?;
                Ok(Payload::SendText(SendTextReport {
                    address: target,
                    text,
                    newline,
                }))
            }
            Command::SendControlCharacter { address, control } => {
                let (target, pane_id) = self.locate(&address)?;
                let _: AckReply =
                    self.request(ControllerRequest::SendControl { pane_id, control })?;
                Ok(Payload::SendControlCharacter(SendControlReport {
                    address: target,
                    control,
                }))
            }
            Command::SplitPane { address, vertical } => {
                let (target, pane_id) = self.locate(&address)?;
                let reply: SplitReply = self.request(ControllerRequest::Split {
                    pane_id: pane_id.clone(),
                    vertical,
                })?;
                Ok(Payload::SplitPane(SplitReport {
                    address: target,
                    source_session_id: pane_id,
                    new_session_id: reply.new_session_id,
                    direction: SplitDirection::from_vertical(vertical),
                }))
            }
        }
    }

    /// Take a fresh snapshot and resolve `address` to its position and
    /// native session id.
    fn locate(&self, address: &str) -> Result<(PaneAddress, String), BusinessError> {
        let topology = self.snapshot()?;
        let pane = address::resolve(&topology, address)?;
        log::debug!("Resolved '{address}' to {} ({})", pane.address, pane.id);
        Ok((pane.address, pane.id.clone()))
    }

    /// Topology is never cached: panes come and go between calls.
    fn snapshot(&self) -> Result<Topology, BusinessError> {
        let reply: ListReply = self.request(ControllerRequest::List)?;
        Ok(Topology::from_list(reply))
    }

    fn request<T: DeserializeOwned>(&self, request: ControllerRequest) -> Result<T, BusinessError> {
        log::debug!("Controller request: {request}");
        let reply = self.controller.call(&request)?;
        reply.decode::<T>()?.map_err(BusinessError::Reported)
    }
}
