//! Terminal output.
//!
//! Status lines (`✓`, `ℹ`, `⚠`, headers) are dropped under `--quiet`.
//! Machine-readable output goes through [`OutputManager::json`] and
//! [`OutputManager::raw`] and is always written.

use std::io::{self, IsTerminal};
use std::time::Duration;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

#[derive(Debug, Clone, Copy)]
enum Marker {
    Success,
    Info,
    Warning,
}

impl Marker {
    fn symbol(self) -> &'static str {
        match self {
            Self::Success => "\u{2713}",
            Self::Info => "\u{2139}",
            Self::Warning => "\u{26a0}",
        }
    }

    fn paint(self, msg: &str) -> String {
        let symbol = self.symbol();
        match self {
            Self::Success => format!("{} {}", symbol.green().bold(), msg.green()),
            Self::Info => format!("{} {}", symbol.blue().bold(), msg),
            Self::Warning => format!("{} {}", symbol.yellow().bold(), msg.yellow()),
        }
    }
}

pub struct OutputManager {
    format: OutputFormat,
    quiet: bool,
    color: bool,
    term: Term,
}

impl OutputManager {
    /// `Auto` becomes `Human` on a TTY and `Plain` otherwise.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let format = match args.output_format {
            OutputFormat::Auto if io::stdout().is_terminal() => OutputFormat::Human,
            OutputFormat::Auto => OutputFormat::Plain,
            explicit => explicit,
        };
        let color =
            format == OutputFormat::Human && !(args.no_color || config.output.no_color);

        Self {
            format,
            quiet: args.quiet,
            color,
            term: Term::stdout(),
        }
    }

    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Always written, for list and CSV output.
    pub fn raw(&self, line: &str) -> io::Result<()> {
        self.term.write_line(line)
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&text)
    }

    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.marked(Marker::Success, msg)
    }

    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.marked(Marker::Info, msg)
    }

    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.marked(Marker::Warning, msg)
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        if self.color {
            self.term.write_line(&text.cyan().bold().to_string())
        } else {
            self.term.write_line(text)
        }
    }

    /// Spinner on stderr; hidden unless output is human and not quiet.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.quiet || self.format != OutputFormat::Human {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(msg.to_owned());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn marked(&self, marker: Marker, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.color {
            marker.paint(msg)
        } else {
            format!("{} {msg}", marker.symbol())
        };
        self.term.write_line(&line)
    }
}
