//! CLI error type.
//!
//! Everything a command can fail with ends up as a [`CliError`], which knows
//! its exit code, its suggestions and how to render itself on stderr.

use std::error::Error as _;
use std::fmt::Write as _;

use owo_colors::OwoColorize;
use thiserror::Error;

use docfill_core::error::{DocfillError, ErrorCategory as CoreCategory};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Input clap accepted but the command cannot use.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Config file unreadable or invalid, or a bad `config get` key.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    Core(#[from] DocfillError),

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Interactive prompt interrupted.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("'{feature}' is not available in this build")]
    FeatureNotAvailable { feature: &'static str },
}

impl From<std::io::Error> for CliError {
    fn from(source: std::io::Error) -> Self {
        Self::IoError {
            message: source.to_string(),
            source,
        }
    }
}

/// Broad failure class, one per exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserError,
    NotFound,
    Configuration,
    Internal,
}

impl CliError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { .. } => vec!["Run 'docfill <command> --help' for usage".into()],
            Self::ConfigError { .. } => vec![
                "Check the file given with --config, or the one shown by 'docfill config path'".into(),
                "Write a fresh default with 'docfill init --force'".into(),
            ],
            Self::Core(e) => e.suggestions(),
            Self::IoError { .. } => vec!["Check that the path exists and is writable".into()],
            Self::Cancelled => vec!["Nothing was written".into()],
            Self::FeatureNotAvailable { feature } => vec![format!(
                "Reinstall with the feature enabled: cargo install docfill-cli --features {feature}"
            )],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::Cancelled => ErrorCategory::UserError,
            Self::ConfigError { .. } | Self::FeatureNotAvailable { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError { .. } => ErrorCategory::Internal,
            Self::Core(e) => match e.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
        }
    }

    /// 2 user error, 3 template not found, 4 configuration, 1 anything else.
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::Internal => 1,
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
        }
    }

    /// Message, cause chain (verbose only) and suggestions, ready for stderr.
    pub fn render(&self, verbose: bool, color: bool) -> String {
        let paint = |text: &str, style: fn(&str) -> String| {
            if color { style(text) } else { text.to_owned() }
        };
        let mut out = String::new();

        let _ = writeln!(
            out,
            "\n{} {}",
            paint("error:", |s| s.red().bold().to_string()),
            self
        );

        if verbose {
            let mut cause = self.source();
            while let Some(err) = cause {
                let _ = writeln!(
                    out,
                    "  {}",
                    paint(&format!("caused by: {err}"), |s| s.dimmed().to_string())
                );
                cause = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            let _ = writeln!(out, "\n{}", paint("hint:", |s| s.yellow().bold().to_string()));
            for s in &suggestions {
                let _ = writeln!(out, "  {s}");
            }
        }

        if !verbose {
            let _ = writeln!(
                out,
                "\n{}",
                paint("Run with -v for more detail.", |s| s.dimmed().to_string())
            );
        }
        out
    }

    /// JSON form for `--output-format json`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.to_string(),
            "exit_code": self.exit_code(),
            "suggestions": self.suggestions(),
        })
    }

    /// Emit one tracing event at a severity matching the category.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError | ErrorCategory::NotFound => {
                tracing::warn!(code = self.exit_code(), "{}", self)
            }
            ErrorCategory::Configuration | ErrorCategory::Internal => {
                tracing::error!(code = self.exit_code(), "{}", self)
            }
        }
        if let Some(source) = self.source() {
            tracing::debug!(%source, "root cause");
        }
    }
}

/// Attach a context message to an `io::Error` at the call-site.
pub trait IoContext<T> {
    fn io_context(self, message: impl FnOnce() -> String) -> CliResult<T>;
}

impl<T> IoContext<T> for Result<T, std::io::Error> {
    fn io_context(self, message: impl FnOnce() -> String) -> CliResult<T> {
        self.map_err(|source| CliError::IoError {
            message: message(),
            source,
        })
    }
}
