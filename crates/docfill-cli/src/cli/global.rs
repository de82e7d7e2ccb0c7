//! Flags accepted by every subcommand, flattened into [`super::Cli`].

use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum};

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// `-v` info, `-vv` debug, `-vvv` trace. `RUST_LOG` takes precedence.
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help = "More log output (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Only errors are printed.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Print errors only"
    )]
    pub quiet: bool,

    /// Honours `NO_COLOR` (<https://no-color.org>).
    #[arg(long = "no-color", global = true, env = "NO_COLOR", help = "Disable colours")]
    pub no_color: bool,

    /// Must exist when given; the default location is optional.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        help = "Read configuration from FILE"
    )]
    pub config: Option<PathBuf>,

    /// Overrides `templates.dir`.
    #[arg(
        long = "templates-dir",
        global = true,
        value_name = "DIR",
        help = "Template library directory"
    )]
    pub templates_dir: Option<PathBuf>,

    #[arg(
        long = "output-format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Auto,
        help = "How results are printed"
    )]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human on a terminal, plain when piped.
    #[default]
    Auto,
    /// Coloured, with a progress spinner.
    Human,
    /// No colour, no spinner.
    Plain,
    /// One JSON document on stdout; errors as JSON on stderr.
    Json,
}
