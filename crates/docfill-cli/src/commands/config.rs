//! `docfill config`: inspect configuration values.

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = config.get(&key)?;
            output.raw(&value)?;
        }
        ConfigCommands::List => {
            if output.is_json() {
                output.json(&config)?;
                return Ok(());
            }
            output.header("Current Configuration:")?;
            let serialised =
                toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
                    message: format!("Failed to serialise config: {e}"),
                    source: Some(Box::new(e)),
                })?;
            output.print(serialised.trim_end())?;
        }
        ConfigCommands::Path => {
            let path = global.config.unwrap_or_else(AppConfig::config_path);
            output.raw(&path.display().to_string())?;
        }
    }
    Ok(())
}
