//! Command-line interface for pane-mcp.
//!
//! With no subcommand the MCP server runs on stdio. `call` runs a single tool
//! and prints its formatted text, `tools` lists the tool names.

use crate::config::{Config, ConfigError};
use anyhow::Context;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use pane_mcp_core::{Command, DispatchFault, Dispatcher, TerminalController, format};
use pane_mcp_server::ProcessController;
use std::io::Write;
use std::path::PathBuf;

/// pane-mcp - MCP server for driving terminal panes
#[derive(Parser, Debug)]
#[command(name = "pane-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file to use instead of ~/.config/pane-mcp/config.yaml
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Terminal client command line (overrides config and environment)
    #[arg(long, value_name = "COMMAND", global = true)]
    pub client: Option<String>,

    /// Terminal client timeout in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    pub timeout_ms: Option<u64>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LevelFilter>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the MCP server on stdin/stdout (default)
    Serve,

    /// Run one tool and print its result
    Call {
        /// Tool name, e.g. list_panes
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long, value_name = "JSON")]
        args: Option<String>,
    },

    /// List the available tool names
    Tools,
}

/// Exit codes for `call`.
pub const EXIT_TOOL_ERROR: i32 = 1;
pub const EXIT_INVALID_CALL: i32 = 2;

/// Load the configuration the command line points at and apply flag overrides.
pub fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            config.apply_env(|key| std::env::var(key).ok())?;
            config
        }
        None => Config::load()?,
    };

    if let Some(client) = &cli.client {
        config.client_command = client.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.validate()?;
    Ok(config)
}

/// Run the selected command. Returns the process exit code.
pub fn run(command: Commands, config: &Config) -> anyhow::Result<i32> {
    if command == Commands::Tools {
        print_tools(&mut std::io::stdout())?;
        return Ok(0);
    }

    let controller = ProcessController::from_command_line(&config.client_command, config.timeout())
        .context("Failed to set up terminal client")?;
    log::info!(
        "Terminal client: {} (timeout {} ms)",
        config.client_command,
        controller.timeout().as_millis()
    );
    let dispatcher = Dispatcher::new(controller);

    match command {
        Commands::Call { tool, args } => {
            call_tool(&dispatcher, &tool, args.as_deref(), &mut std::io::stdout())
        }
        Commands::Serve | Commands::Tools => {
            pane_mcp_server::set_app_version(crate::VERSION);
            pane_mcp_server::run_mcp_server(&dispatcher);
            Ok(0)
        }
    }
}

/// Run one tool and write its rendered text to `out`.
pub fn call_tool<C: TerminalController, W: Write>(
    dispatcher: &Dispatcher<C>,
    tool: &str,
    args: Option<&str>,
    out: &mut W,
) -> anyhow::Result<i32> {
    let args: Option<serde_json::Value> = args
        .map(serde_json::from_str)
        .transpose()
        .context("--args must be valid JSON")?;

    match dispatcher.dispatch(tool, args.as_ref()) {
        Ok(envelope) => {
            writeln!(out, "{}", format::render(&envelope))?;
            Ok(if envelope.is_error() {
                EXIT_TOOL_ERROR
            } else {
                0
            })
        }
        Err(fault @ DispatchFault::UnknownCommand(_)) => {
            eprintln!("pane-mcp: {fault}");
            eprintln!("Available tools: {}", Command::NAMES.join(", "));
            Ok(EXIT_INVALID_CALL)
        }
        Err(fault) => {
            eprintln!("pane-mcp: {fault}");
            Ok(EXIT_INVALID_CALL)
        }
    }
}

fn print_tools<W: Write>(out: &mut W) -> std::io::Result<()> {
    for name in Command::NAMES {
        writeln!(out, "{name}")?;
    }
    Ok(())
}
