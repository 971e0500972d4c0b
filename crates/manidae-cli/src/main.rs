// crates/manidae-cli/src/main.rs
// ============================================================================
// Module: Manidae CLI Entry Point
// Description: Command dispatcher for the Manidae provider plugin binary.
// Purpose: Run the stdio plugin server and inspect the provider schema.
// Dependencies: clap, manidae-provider, manidae-server, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The `manidae-provider` binary exposes two commands: `serve` runs the
//! framed JSON-RPC server over stdio until the host closes the stream, and
//! `schema` prints the advertised provider schema for inspection. Errors are
//! reported on stderr with a failure exit code; the process never panics.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use manidae_provider::EnvironmentSource;
use manidae_provider::ManidaeProvider;
use manidae_server::ProviderServer;
use manidae_server::ServerConfig;
use manidae_server::StderrRequestLog;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "manidae-provider", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the stdio plugin server.
    Serve(ServeCommand),
    /// Print the provider schema as JSON.
    Schema(SchemaCommand),
}

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Maximum accepted request body size in bytes.
    #[arg(long, value_name = "BYTES")]
    max_body_bytes: Option<usize>,
}

/// Arguments for the `schema` command.
#[derive(Args, Debug)]
struct SchemaCommand {
    /// Pretty-print the schema JSON.
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("manidae-provider {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(&command),
        Commands::Schema(command) => command_schema(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
fn command_serve(command: &ServeCommand) -> CliResult<ExitCode> {
    let config = resolve_server_config(command.max_body_bytes);
    let server = ProviderServer::new(build_provider(), config, Box::new(StderrRequestLog))
        .map_err(|err| CliError::new(format!("failed to start server: {err}")))?;
    server.serve_stdio().map_err(|err| CliError::new(format!("server stopped: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `schema` command.
fn command_schema(command: &SchemaCommand) -> CliResult<ExitCode> {
    let rendered = render_schema(&build_provider(), command.pretty)?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the provider over the live process environment.
fn build_provider() -> ManidaeProvider {
    ManidaeProvider::new(env!("CARGO_PKG_VERSION"), EnvironmentSource::process())
}

/// Applies the body size override to the default server configuration.
fn resolve_server_config(max_body_bytes: Option<usize>) -> ServerConfig {
    let mut config = ServerConfig::default();
    if let Some(limit) = max_body_bytes {
        config.max_body_bytes = limit;
    }
    config
}

/// Renders the provider schema as JSON text.
fn render_schema(provider: &ManidaeProvider, pretty: bool) -> CliResult<String> {
    let schema = provider.provider_schema();
    let rendered = if pretty {
        serde_json::to_string_pretty(&schema)
    } else {
        serde_json::to_string(&schema)
    };
    rendered.map_err(|err| CliError::new(format!("failed to encode schema: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
