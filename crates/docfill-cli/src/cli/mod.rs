//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use docfill_core::domain::MissingPolicy;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "docfill",
    bin_name = "docfill",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Fill {{placeholders}} in Word templates",
    long_about = "docfill produces a new .docx from a template by replacing \
                  {{name}} placeholders with values from the template's \
                  defaults, a variables file and the command line.",
    after_help = "EXAMPLES:\n\
        \x20 docfill list\n\
        \x20 docfill generate notice -V title=年度通知 -o notice.docx\n\
        \x20 docfill generate ./letter.docx --vars values.toml --missing empty\n\
        \x20 docfill completions bash > /usr/share/bash-completion/completions/docfill",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fill a template and write the result.
    #[command(
        visible_aliases = ["gen", "g"],
        about = "Generate a document from a template",
        after_help = "EXAMPLES:\n\
            \x20 docfill generate notice -V title=年度通知\n\
            \x20 docfill generate official/notice -o out/notice.docx --force\n\
            \x20 docfill generate ./letter.docx --vars values.json --dry-run"
    )]
    Generate(GenerateArgs),

    /// List available templates.
    #[command(
        visible_alias = "ls",
        about = "List available templates",
        after_help = "EXAMPLES:\n\
            \x20 docfill list\n\
            \x20 docfill list --category official\n\
            \x20 docfill list --format json"
    )]
    List(ListArgs),

    /// Show the placeholders of one template.
    #[command(
        about = "Show a template's placeholders and defaults",
        after_help = "EXAMPLES:\n\
            \x20 docfill inspect notice\n\
            \x20 docfill inspect ./letter.docx --output-format json"
    )]
    Inspect(InspectArgs),

    /// Initialise a docfill configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 docfill init\n\
            \x20 docfill init --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 docfill completions bash > ~/.local/share/bash-completion/completions/docfill\n\
            \x20 docfill completions zsh  > ~/.zfunc/_docfill\n\
            \x20 docfill completions fish > ~/.config/fish/completions/docfill.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the docfill configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 docfill config get templates.dir\n\
            \x20 docfill config list\n\
            \x20 docfill config path"
    )]
    Config(ConfigCommands),
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `docfill generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Template id (`category/name`), bare name, or path to a `.docx` file.
    #[arg(value_name = "TEMPLATE", help = "Template name or path to a .docx file")]
    pub template: String,

    /// Output path; defaults to `output.default_path` from the config.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output file (default: output.docx)"
    )]
    pub output: Option<PathBuf>,

    /// Variable override, repeatable. Split on the first `=`.
    #[arg(
        short = 'V',
        long = "var",
        value_name = "KEY=VALUE",
        action = clap::ArgAction::Append,
        help = "Set a variable (repeatable)"
    )]
    pub vars: Vec<String>,

    /// TOML or JSON file of variables.
    #[arg(
        long = "vars",
        value_name = "FILE",
        help = "Read variables from a .toml or .json file"
    )]
    pub vars_file: Option<PathBuf>,

    /// What to do with placeholders that have no value.
    #[arg(
        long = "missing",
        value_enum,
        value_name = "POLICY",
        help = "Unresolved placeholders: keep them or blank them"
    )]
    pub missing: Option<MissingArg>,

    /// Overwrite an existing output file.
    #[arg(long = "force", help = "Overwrite an existing output file")]
    pub force: bool,

    /// Resolve everything and report, without writing.
    #[arg(long = "dry-run", help = "Show what would be generated without writing")]
    pub dry_run: bool,

    /// Prompt for placeholders that are still missing.
    #[arg(
        short = 'i',
        long = "interactive",
        help = "Prompt for missing values"
    )]
    pub interactive: bool,
}

/// CLI spelling of [`MissingPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MissingArg {
    /// Leave `{{name}}` in the output.
    Keep,
    /// Replace with nothing.
    Empty,
}

impl From<MissingArg> for MissingPolicy {
    fn from(arg: MissingArg) -> Self {
        match arg {
            MissingArg::Keep => MissingPolicy::Keep,
            MissingArg::Empty => MissingPolicy::Empty,
        }
    }
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `docfill list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only templates in this category (nested categories included).
    #[arg(
        short = 'C',
        long = "category",
        value_name = "CATEGORY",
        help = "Filter by category"
    )]
    pub category: Option<String>,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One id per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── inspect ───────────────────────────────────────────────────────────────────

/// Arguments for `docfill inspect`.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Template id, bare name, or path to a `.docx` file.
    #[arg(value_name = "TEMPLATE")]
    pub template: String,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `docfill init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `docfill completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `docfill config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `templates.dir`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_command() {
        let cli = Cli::parse_from([
            "docfill",
            "generate",
            "notice",
            "-V",
            "title=年度通知",
            "--var",
            "author=张三",
            "-o",
            "out.docx",
            "--missing",
            "empty",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected Generate command");
        };
        assert_eq!(args.template, "notice");
        assert_eq!(args.vars, vec!["title=年度通知", "author=张三"]);
        assert_eq!(args.output, Some(PathBuf::from("out.docx")));
        assert_eq!(args.missing, Some(MissingArg::Empty));
        assert!(!args.force);
    }

    #[test]
    fn generate_aliases() {
        for alias in ["gen", "g"] {
            let cli = Cli::parse_from(["docfill", alias, "notice"]);
            assert!(matches!(cli.command, Commands::Generate(_)));
        }
    }

    #[test]
    fn list_alias_and_filters() {
        let cli = Cli::parse_from(["docfill", "ls", "--category", "official", "--format", "csv"]);
        let Commands::List(args) = cli.command else {
            panic!("expected List command");
        };
        assert_eq!(args.category.as_deref(), Some("official"));
        assert_eq!(args.format, ListFormat::Csv);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["docfill", "list", "--templates-dir", "lib", "-vv"]);
        assert_eq!(cli.global.templates_dir, Some(PathBuf::from("lib")));
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn missing_arg_maps_to_policy() {
        assert_eq!(MissingPolicy::from(MissingArg::Keep), MissingPolicy::Keep);
        assert_eq!(MissingPolicy::from(MissingArg::Empty), MissingPolicy::Empty);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["docfill", "--quiet", "--verbose", "list"]);
        assert!(result.is_err());
    }
}
