// crates/contract-gate-cli/src/main.rs
// ============================================================================
// Module: Contract Gate CLI Entry Point
// Description: Command dispatcher for storefront contract runs.
// Purpose: Run the suite, inspect the catalog, and check configuration.
// Dependencies: clap, contract-gate-cli, contract-gate-config, serde_jcs
// ============================================================================

//! ## Overview
//! `contract-gate run` executes the storefront suite and exits `0` only when
//! every scenario passed. `endpoints` prints the effective catalog,
//! `scenarios` lists the suite, `check-config` validates configuration, and
//! `init` emits a starter config file. All output goes through `writeln!`
//! helpers so write failures surface as errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use contract_gate_cli::CliError;
use contract_gate_cli::CliResult;
use contract_gate_cli::RunOptions;
use contract_gate_cli::artifacts;
use contract_gate_cli::artifacts::RunDocument;
use contract_gate_cli::logging;
use contract_gate_cli::run_suite;
use contract_gate_cli::scenarios::storefront_suite;
use contract_gate_cli::suite::effective_catalog;
use contract_gate_cli::suite::http_transport;
use contract_gate_cli::suite::load_config;
use contract_gate_config::config_toml_example;
use serde::Serialize;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "contract-gate", disable_help_subcommand = true, disable_version_flag = true)]
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
    /// Run the storefront scenario suite.
    Run(RunCommand),
    /// Print the effective endpoint catalog.
    Endpoints(EndpointsCommand),
    /// List scenario names and lanes.
    Scenarios(ConfigArgs),
    /// Load and validate configuration without sending requests.
    CheckConfig(ConfigArgs),
    /// Write a starter `contract-gate.toml`.
    Init(InitCommand),
}

/// Config file selection shared by several commands.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Config file path (defaults to `CONTRACT_GATE_CONFIG` or `./contract-gate.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Run only these scenarios (repeatable).
    #[arg(long, value_name = "NAME")]
    only: Vec<String>,
    /// Skip the exclusive rate-limit lane.
    #[arg(long, action = ArgAction::SetTrue)]
    skip_rate_limit: bool,
    /// Parallel-lane worker count (overrides `[runner].workers`).
    #[arg(long, value_name = "N")]
    workers: Option<usize>,
    /// Report format on stdout.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
    /// Artifact directory (overrides `[report].output_dir`).
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Log filter directive (overrides `CONTRACT_GATE_LOG`).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

/// Arguments for `endpoints`.
#[derive(Args, Debug)]
struct EndpointsCommand {
    /// Config file selection.
    #[command(flatten)]
    config: ConfigArgs,
    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Arguments for `init`.
#[derive(Args, Debug)]
struct InitCommand {
    /// Destination file; prints to stdout when omitted.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

/// Output formats for structured CLI commands.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum OutputFormat {
    /// Canonical JSON output.
    Json,
    /// Human-readable text output.
    Text,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Binary entry point.
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
        write_stdout_line(&format!("contract-gate {}", env!("CARGO_PKG_VERSION")))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        write_stdout_line(&Cli::command().render_help().to_string())?;
        return Ok(ExitCode::SUCCESS);
    };
    match command {
        Commands::Run(command) => command_run(command),
        Commands::Endpoints(command) => command_endpoints(&command),
        Commands::Scenarios(command) => command_scenarios(&command),
        Commands::CheckConfig(command) => command_check_config(&command),
        Commands::Init(command) => command_init(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Runs the suite, writes artifacts, and reports the verdict.
fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    logging::init(command.log_level.as_deref())?;
    let config = load_config(command.config.config.as_deref())?;
    let transport = http_transport(&config)?;
    let options = RunOptions {
        only: command.only,
        skip_rate_limit: command.skip_rate_limit,
        workers: command.workers,
    };
    let run = run_suite(&config, transport, &options)?;

    let output_dir = command.output_dir.unwrap_or_else(|| config.report.output_dir.clone());
    artifacts::write_run(&output_dir, &run.summary, &run.report)?;

    match command.format {
        OutputFormat::Text => {
            write_stdout_line(run.summary.summary.render_text().trim_end())?;
            write_stdout_line(&format!("artifacts: {}", output_dir.display()))?;
        }
        OutputFormat::Json => write_json(&RunDocument {
            run: &run.summary,
            outcomes: run.report.outcomes(),
        })?,
    }
    Ok(if run.report.all_passed() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Prints the catalog after overrides.
fn command_endpoints(command: &EndpointsCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.config.as_deref())?;
    let catalog = effective_catalog(&config)?;
    match command.format {
        OutputFormat::Text => write_stdout_line(catalog.render_text().trim_end())?,
        OutputFormat::Json => write_json(catalog.endpoints())?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Lists scenario names with their lanes.
fn command_scenarios(command: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    for scenario in storefront_suite(&effective_catalog(&config)?)? {
        write_stdout_line(&format!("{:<28} {}", scenario.name().as_str(), scenario.lane()))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Validates configuration and endpoint overrides.
fn command_check_config(command: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    effective_catalog(&config)?;
    let source = config.source.as_ref().map_or_else(|| "defaults".to_string(), |path| path.display().to_string());
    write_stdout_line(&format!("config ok ({source}); target {}", config.target.base_url))?;
    Ok(ExitCode::SUCCESS)
}

/// Emits the example configuration, refusing to overwrite a file.
fn command_init(command: &InitCommand) -> CliResult<ExitCode> {
    let example = config_toml_example();
    let Some(path) = &command.output else {
        write_stdout_line(example.trim_end())?;
        return Ok(ExitCode::SUCCESS);
    };
    if path.exists() {
        return Err(CliError::Artifact {
            path: path.clone(),
            reason: "file already exists".to_string(),
        });
    }
    fs::write(path, example.as_bytes()).map_err(|err| CliError::Artifact {
        path: path.clone(),
        reason: err.to_string(),
    })?;
    write_stdout_line(&format!("wrote {}", path.display()))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|source| CliError::Output {
        stream: "stdout",
        source,
    })
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Writes canonical JSON to stdout.
fn write_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let rendered = serde_jcs::to_string(value).map_err(|err| CliError::Render(err.to_string()))?;
    write_stdout_line(&rendered)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
