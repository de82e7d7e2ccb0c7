//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `DOCFILL_<SECTION>__<KEY>`, e.g. `DOCFILL_TEMPLATES__DIR`
//! 3. Config file (`--config FILE`, or the platform default location)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use docfill_core::domain::MissingPolicy;

use crate::error::{CliError, CliResult};

const ENV_PREFIX: &str = "DOCFILL";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Template library settings.
    pub templates: TemplatesConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Defaults for `docfill generate`.
    pub generate: GenerateConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Root of the template library.
    pub dir: PathBuf,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("templates"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output path used when `-o` is not given.
    pub default_path: PathBuf,
    pub no_color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_path: PathBuf::from("output.docx"),
            no_color: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Unresolved-placeholder policy.
    pub missing: MissingPolicy,
    /// Provide the `DATE` and `YEAR` built-in variables.
    pub builtins: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            missing: MissingPolicy::Keep,
            builtins: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, file and environment.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> CliResult<Self> {
        let (path, required) = match config_file {
            Some(p) => (p.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::build(&path, required, None)
    }

    /// Layer the sources. `env` replaces the process environment (tests).
    fn build(
        path: &Path,
        required: bool,
        env: Option<config::Map<String, String>>,
    ) -> CliResult<Self> {
        let defaults = Config::try_from(&Self::default()).map_err(config_error)?;

        let settings = Config::builder()
            .add_source(defaults)
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .map_err(config_error)?;

        let config: Self = settings.try_deserialize().map_err(config_error)?;
        debug!(path = %path.display(), required, "Configuration loaded");
        Ok(config)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.docfill.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "docfill", "docfill")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".docfill.toml"))
    }

    /// Look up a dotted key such as `templates.dir`.
    pub fn get(&self, key: &str) -> CliResult<String> {
        let unknown = || CliError::ConfigError {
            message: format!("Unknown config key: '{key}'"),
            source: None,
        };

        let root = toml::Value::try_from(self).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise config: {e}"),
            source: Some(Box::new(e)),
        })?;

        let mut value = &root;
        for part in key.split('.') {
            value = value.get(part).ok_or_else(unknown)?;
        }

        match value {
            toml::Value::String(s) => Ok(s.clone()),
            toml::Value::Table(_) => Err(unknown()),
            other => Ok(other.to_string()),
        }
    }
}

fn config_error(e: config::ConfigError) -> CliError {
    CliError::ConfigError {
        message: e.to_string(),
        source: Some(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.templates.dir, PathBuf::from("templates"));
        assert_eq!(cfg.output.default_path, PathBuf::from("output.docx"));
        assert_eq!(cfg.generate.missing, MissingPolicy::Keep);
        assert!(cfg.generate.builtins);
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn missing_optional_file_gives_defaults() {
        let cfg = AppConfig::build(Path::new("/nonexistent/docfill.toml"), false, env(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn missing_required_file_is_config_error() {
        let err = AppConfig::build(Path::new("/nonexistent/docfill.toml"), true, env(&[])).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn file_overrides_defaults_partially() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docfill.toml");
        std::fs::write(&path, "[generate]\nmissing = \"empty\"\n").unwrap();

        let cfg = AppConfig::build(&path, true, env(&[])).unwrap();
        assert_eq!(cfg.generate.missing, MissingPolicy::Empty);
        assert!(cfg.generate.builtins);
        assert_eq!(cfg.templates.dir, PathBuf::from("templates"));
    }

    #[test]
    fn environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docfill.toml");
        std::fs::write(&path, "[templates]\ndir = \"from-file\"\n").unwrap();

        let cfg = AppConfig::build(
            &path,
            true,
            env(&[
                ("DOCFILL_TEMPLATES__DIR", "from-env"),
                ("DOCFILL_GENERATE__BUILTINS", "false"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.templates.dir, PathBuf::from("from-env"));
        assert!(!cfg.generate.builtins);
    }

    #[test]
    fn invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docfill.toml");
        std::fs::write(&path, "[generate]\nmissing = \"sometimes\"\n").unwrap();

        assert!(matches!(
            AppConfig::build(&path, true, env(&[])),
            Err(CliError::ConfigError { .. })
        ));
    }

    #[test]
    fn get_dotted_keys() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.get("templates.dir").unwrap(), "templates");
        assert_eq!(cfg.get("generate.missing").unwrap(), "keep");
        assert_eq!(cfg.get("output.no_color").unwrap(), "false");
    }

    #[test]
    fn get_unknown_or_section_key_is_error() {
        let cfg = AppConfig::default();
        assert!(cfg.get("does.not.exist").is_err());
        assert!(cfg.get("generate").is_err());
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
