//! Subprocess terminal controller.
//!
//! Each request runs the configured client program once with the verb and
//! its arguments appended, and reads a single JSON object from its stdout.
//! Calls are bounded by a timeout; a client that overruns is killed and the
//! call fails with [`TransportError::Timeout`]. Calls are never retried.

use pane_mcp_core::{ControllerReply, ControllerRequest, TerminalController, TransportError};
use parking_lot::Mutex;
use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::runtime::Runtime;

/// Default bound on a single client round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest diagnostic excerpt copied from client output into errors.
const MAX_DIAGNOSTIC_CHARS: usize = 500;

/// Errors constructing a [`ProcessController`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Terminal client command is empty")]
    EmptyCommand,

    #[error("Invalid terminal client command line: {0}")]
    InvalidCommandLine(#[from] shell_words::ParseError),

    #[error("Failed to start async runtime for terminal client: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Runs the terminal client program once per request.
pub struct ProcessController {
    program: String,
    base_args: Vec<String>,
    timeout: Duration,
    runtime: Runtime,
    /// One client process at a time, even if the controller is shared.
    call_lock: Mutex<()>,
}

impl std::fmt::Debug for ProcessController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessController")
            .field("program", &self.program)
            .field("base_args", &self.base_args)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ProcessController {
    /// Create a controller from a program and its leading arguments.
    pub fn new(command: Vec<String>, timeout: Duration) -> Result<Self, ClientError> {
        let mut parts = command.into_iter();
        let program = parts
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or(ClientError::EmptyCommand)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ClientError::Runtime)?;

        Ok(Self {
            program,
            base_args: parts.collect(),
            timeout,
            runtime,
            call_lock: Mutex::new(()),
        })
    }

    /// Create a controller from a command line such as
    /// `python3 ~/bin/iterm2_client.py`, split with shell quoting rules but
    /// never run through a shell.
    pub fn from_command_line(command_line: &str, timeout: Duration) -> Result<Self, ClientError> {
        Self::new(shell_words::split(command_line)?, timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run(&self, request: &ControllerRequest) -> Result<ControllerReply, TransportError> {
        let child = Command::new(&self.program)
            .args(&self.base_args)
            .args(request.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Dropping the pending future on timeout drops the child, which
        // kills it via `kill_on_drop`.
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => interpret_output(&output),
            Ok(Err(e)) => Err(TransportError::Io(e)),
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        }
    }
}

impl TerminalController for ProcessController {
    fn call(&self, request: &ControllerRequest) -> Result<ControllerReply, TransportError> {
        let _guard = self.call_lock.lock();
        log::debug!("Running terminal client: {} {request}", self.program);
        let result = self.runtime.block_on(self.run(request));
        if let Err(e) = &result {
            log::error!("Terminal client call '{}' failed: {e}", request.verb());
        }
        result
    }
}

/// Turn a finished client process into a reply.
///
/// Clients report their own errors as JSON on stdout with a non-zero exit
/// status, so parseable output wins over the status code.
fn interpret_output(output: &Output) -> Result<ControllerReply, TransportError> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();

    if !stdout.is_empty()
        && let Ok(value) = serde_json::from_str::<serde_json::Value>(stdout)
    {
        if !output.status.success() {
            log::debug!("Terminal client exited with {} but replied", output.status);
        }
        return ControllerReply::from_json(value);
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostic = if stderr.trim().is_empty() {
            stdout
        } else {
            stderr.trim()
        };
        return Err(TransportError::AbnormalExit {
            status: output.status.to_string(),
            stderr: excerpt(diagnostic),
        });
    }

    if stdout.is_empty() {
        Err(TransportError::MalformedResponse(
            "client produced no output".to_string(),
        ))
    } else {
        Err(TransportError::MalformedResponse(format!(
            "expected JSON, got: {}",
            excerpt(stdout)
        )))
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= MAX_DIAGNOSTIC_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_DIAGNOSTIC_CHARS).collect();
        format!("{cut}...")
    }
}
