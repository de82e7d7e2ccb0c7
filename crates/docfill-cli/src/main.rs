//! # docfill CLI
//!
//! Fills `{{name}}` placeholders in Word templates.
//!
//! ## Startup sequence
//!
//! 1. Read `.env`, then parse CLI arguments (clap handles `--help` /
//!    `--version` early-exit).
//! 2. Initialise the tracing subscriber (logging).
//! 3. Reject malformed `generate -V` overrides, then load configuration
//!    (defaults + file + env).
//! 4. Build the [`OutputManager`].
//! 5. Dispatch to the appropriate command handler.
//! 6. Translate any [`CliError`] into a user-facing message and exit code.
//!
//! ## Exit codes
//!
//! | Code | Meaning                 |
//! |------|-------------------------|
//! |  0   | Success                 |
//! |  1   | Internal / system error |
//! |  2   | User / input error      |
//! |  3   | Template not found      |
//! |  4   | Configuration error     |

use std::io::IsTerminal as _;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, instrument};

use crate::{
    cli::{Cli, Commands, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

fn main() -> ExitCode {
    // Missing .env is fine.
    let _ = dotenvy::dotenv();

    // ── 1. Parse arguments ────────────────────────────────────────────────
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also arrive here, on stdout with code 0.
            if !e.use_stderr() {
                let _ = e.print();
                return ExitCode::SUCCESS;
            }
            eprintln!("{}", e.render().ansi());
            return ExitCode::from(2);
        }
    };

    // ── 2. Initialise tracing ─────────────────────────────────────────────
    if let Err(e) = init_logging(&cli.global) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::from(1);
    }

    debug!(
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        no_color = cli.global.no_color,
        "CLI started"
    );

    let verbose = cli.global.verbose > 0;
    let json_errors = cli.global.output_format == OutputFormat::Json;
    let color_errors = !cli.global.no_color && std::io::stderr().is_terminal();

    // ── 3. Load configuration ─────────────────────────────────────────────
    // Overrides need no config, and their errors take precedence.
    if let Commands::Generate(args) = &cli.command {
        if let Err(e) = commands::generate::check_overrides(args) {
            return handle_error(e, verbose, json_errors, color_errors);
        }
    }

    // `init` creates the file that --config may point at.
    let loaded = match cli.command {
        Commands::Init(_) => Ok(AppConfig::default()),
        _ => AppConfig::load(cli.global.config.as_ref()),
    };
    let config = match loaded {
        Ok(cfg) => cfg,
        Err(e) => return handle_error(e, verbose, json_errors, color_errors),
    };

    // ── 4. Build output manager ───────────────────────────────────────────
    let output = OutputManager::new(&cli.global, &config);

    // ── 5. Dispatch + 6. Error handling ──────────────────────────────────
    match run(cli, config, output) {
        Ok(()) => {
            info!("docfill completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => handle_error(e, verbose, json_errors, color_errors),
    }
}

/// Dispatch to the correct command handler.
#[instrument(skip_all)]
fn run(cli: Cli, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cli.command {
        Commands::Generate(cmd) => commands::generate::execute(cmd, cli.global, config, output),
        Commands::List(cmd) => commands::list::execute(cmd, cli.global, config, output),
        Commands::Inspect(cmd) => commands::inspect::execute(cmd, cli.global, config, output),
        Commands::Init(cmd) => commands::init::execute(cmd, cli.global, output),
        Commands::Completions(cmd) => commands::completions::execute(cmd),
        Commands::Config(cmd) => commands::config::execute(cmd, cli.global, config, output),
    }
}

/// Translate a `CliError` into a user message and an exit code.
///
/// Messages go to stderr so they appear even when stdout is redirected.
fn handle_error(err: CliError, verbose: bool, json: bool, color: bool) -> ExitCode {
    err.log();

    let msg = if json {
        format!("{}\n", err.to_json())
    } else {
        err.render(verbose, color)
    };
    eprint!("{msg}");

    ExitCode::from(err.exit_code())
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_version_matches_cargo() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_version(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn cli_has_author() {
        let cmd = Cli::command();
        assert!(cmd.get_author().is_some());
    }
}
