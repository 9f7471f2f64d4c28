use anyhow::Result;
use clap::Parser;
use pane_mcp::cli::{self, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config first so its log_level can take part in level selection.
    let config = cli::load_config(&cli)?;

    // Routes all log::info!() etc. to the debug log file; stdout is reserved
    // for JSON-RPC. When RUST_LOG is set, also mirrors to stderr.
    pane_mcp::debug::init_log_bridge(
        cli.log_level,
        config.log_level_filter(),
        config.log_file.as_deref(),
    );

    log::info!("Starting pane-mcp v{}", pane_mcp::VERSION);

    let code = cli::run(cli.command.unwrap_or(Commands::Serve), &config)?;
    if code != 0 {
        // No server state exists at this point, so no destructors are skipped.
        std::process::exit(code);
    }
    Ok(())
}
