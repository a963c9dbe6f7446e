//! google-calendar-mcp: MCP server for AI-assisted Google Calendar management
//!
//! This tool exposes a Google Calendar to AI assistants as a small set of MCP
//! tools for listing, creating, editing and deleting events.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use google_calendar_mcp::calendar::{CalendarService, GoogleCalendarClient};
use google_calendar_mcp::config;
use google_calendar_mcp::mcp::server::McpServer;

/// MCP server for AI-assisted Google Calendar management.
///
/// Speaks JSON-RPC over stdin/stdout and lets AI assistants list, create,
/// edit and delete calendar events.
#[derive(Parser, Debug)]
#[command(name = "google-calendar-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,

    /// Print the calendars the credentials can access, then exit
    #[arg(long)]
    list_calendars: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries protocol messages only.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints the accessible calendars to stdout.
async fn print_calendars(client: &GoogleCalendarClient) -> ExitCode {
    match client.list_calendars().await {
        Ok(calendars) => {
            for cal in calendars {
                let marker = if cal.primary { " (primary)" } else { "" };
                println!("{}{marker}\n  ID: {}", cal.summary, cal.id);
                if let Some(description) = cal.description.filter(|d| !d.is_empty()) {
                    println!("  Description: {description}");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Failed to list calendars");
            eprintln!("Failed to list calendars: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Entry point for the google-calendar-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nExpected config at: {}", default_path.display());
                    eprintln!("Create one based on config/example-config.json");
                }
            }
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "google-calendar-mcp {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!();

    let settings = match cfg.calendar_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let client = match GoogleCalendarClient::new(
        &settings.credentials_file,
        settings.calendar_id,
        settings.timezone.as_deref(),
    ) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to initialise calendar client");
            eprintln!("Failed to initialise calendar client: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        calendar_id = client.calendar_id(),
        timezone = %client.timezone(),
        "Starting google-calendar-mcp server"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    if args.list_calendars {
        return runtime.block_on(print_calendars(&client));
    }

    // Create MCP server
    let mut server = McpServer::new(client);

    info!("MCP server ready, waiting for client connection...");

    match runtime.block_on(server.run()) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn log_level_from_flags() {
        assert_eq!(get_log_level(0, true, "trace"), Level::ERROR);
        assert_eq!(get_log_level(2, false, "warn"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "INFO"), Level::INFO);
        assert_eq!(get_log_level(0, false, "loud"), Level::WARN);
    }
}
