//! Implementation of the `docfill generate` command.
//!
//! Responsibility: turn CLI arguments into a [`GenerateRequest`], let the
//! core service plan and execute it, and display the result. No
//! substitution logic lives here.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, instrument};

use docfill_adapters::{DocxCodec, load_variables_file};
use docfill_core::{
    application::{GenerateOutcome, GenerateRequest, GenerateService, GenerationPlan},
    domain::{MissingPolicy, VariableMap, parse_overrides},
};

use crate::{
    cli::{GenerateArgs, global::GlobalArgs},
    commands::{builtin_variables, filesystem, open_store, today},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Reject malformed `-V` overrides.
///
/// `main` calls this before configuration is loaded, so a bad override
/// reports exit code 2 even when the config file is missing or broken.
pub fn check_overrides(args: &GenerateArgs) -> CliResult<()> {
    parse_overrides(&args.vars)
        .map(drop)
        .map_err(|e| CliError::Core(e.into()))
}

/// Execute the `docfill generate` command.
///
/// Dispatch sequence:
/// 1. Reject malformed `-V` overrides before any file is touched
/// 2. Read the `--vars` file and open the template store
/// 3. Plan: resolve the template and every variable layer
/// 4. Prompt for missing values if `--interactive`
/// 5. Report and stop if `--dry-run`
/// 6. Fill and write the document, then report unresolved names
#[instrument(skip_all, fields(template = %args.template))]
pub fn execute(
    args: GenerateArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    // 1. Overrides first
    check_overrides(&args)?;

    let policy = args
        .missing
        .map(MissingPolicy::from)
        .unwrap_or(config.generate.missing);
    let out_path = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.default_path.clone());

    // 2. Inputs
    let variables_file = match &args.vars_file {
        Some(path) => load_variables_file(path)?,
        None => VariableMap::new(),
    };
    let resolved = open_store(&args.template, &global, &config)?;

    let service = GenerateService::new(resolved.store, Box::new(DocxCodec::new()), filesystem());

    // 3. Plan
    let request = GenerateRequest {
        template: resolved.name,
        overrides: args.vars,
        variables_file,
        builtins: builtin_variables(config.generate.builtins, today())?,
        policy,
    };
    let mut plan = service.plan(request)?;
    debug!(
        id = %plan.template.id(),
        missing = plan.missing().len(),
        "Generation planned"
    );

    // 4. Interactive
    if args.interactive {
        prompt_missing(&mut plan)?;
    }

    // 5. Dry run
    if args.dry_run {
        return report_plan(&plan, &out_path, &output);
    }

    // 6. Write
    let spinner = output.spinner(&format!("Generating {}", out_path.display()));
    let result = service.execute(&plan, &out_path, args.force);
    spinner.finish_and_clear();
    let outcome = result?;

    info!(output = %outcome.output.display(), "Generation completed");
    report_outcome(&outcome, policy, &output)
}

// ── Interactive prompting ─────────────────────────────────────────────────────

/// Ask for each placeholder that still has no value. An empty answer leaves
/// the placeholder to the missing policy.
#[cfg(feature = "interactive")]
fn prompt_missing(plan: &mut GenerationPlan) -> CliResult<()> {
    use std::io::IsTerminal as _;

    use dialoguer::Input;

    if !std::io::stdin().is_terminal() {
        return Err(CliError::InvalidInput {
            message: "--interactive needs a terminal on stdin".into(),
        });
    }

    let missing: Vec<String> = plan.missing().into_iter().map(str::to_owned).collect();
    for name in missing {
        let value: String = Input::new()
            .with_prompt(name.as_str())
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)?;
        if !value.is_empty() {
            plan.set_variable(&name, value)?;
        }
    }
    Ok(())
}

#[cfg(feature = "interactive")]
fn prompt_error(err: dialoguer::Error) -> CliError {
    match err {
        dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
            CliError::Cancelled
        }
        dialoguer::Error::IO(e) => CliError::IoError {
            message: "failed to read interactive input".into(),
            source: e,
        },
    }
}

#[cfg(not(feature = "interactive"))]
fn prompt_missing(_plan: &mut GenerationPlan) -> CliResult<()> {
    Err(CliError::FeatureNotAvailable {
        feature: "interactive",
    })
}

// ── Reporting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PlanReport<'a> {
    template: String,
    output: &'a Path,
    policy: MissingPolicy,
    placeholders: Vec<&'a str>,
    variables: &'a VariableMap,
    missing: Vec<&'a str>,
}

fn report_plan(plan: &GenerationPlan, out_path: &Path, output: &OutputManager) -> CliResult<()> {
    let report = PlanReport {
        template: plan.template.id(),
        output: out_path,
        policy: plan.policy,
        placeholders: plan.placeholders.iter().map(String::as_str).collect(),
        variables: &plan.variables,
        missing: plan.missing(),
    };

    if output.is_json() {
        output.json(&report)?;
        return Ok(());
    }

    output.info(&format!(
        "Dry run: would write '{}' from template '{}'",
        out_path.display(),
        report.template,
    ))?;
    for name in &report.placeholders {
        match plan.variables.get(name) {
            Some(value) => output.print(&format!("  {name} = {value}"))?,
            None => output.print(&format!("  {name} (no value, {})", plan.policy))?,
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct OutcomeReport<'a> {
    template: &'a str,
    output: &'a Path,
    policy: MissingPolicy,
    replaced: usize,
    unresolved: &'a BTreeSet<String>,
}

fn report_outcome(
    outcome: &GenerateOutcome,
    policy: MissingPolicy,
    output: &OutputManager,
) -> CliResult<()> {
    if output.is_json() {
        output.json(&OutcomeReport {
            template: &outcome.template_id,
            output: &outcome.output,
            policy,
            replaced: outcome.report.replaced,
            unresolved: &outcome.report.unresolved,
        })?;
        return Ok(());
    }

    output.success(&format!(
        "Generated '{}' from '{}'",
        outcome.output.display(),
        outcome.template_id,
    ))?;

    if !outcome.report.unresolved.is_empty() {
        let names: Vec<&str> = outcome.report.unresolved.iter().map(String::as_str).collect();
        let action = match policy {
            MissingPolicy::Keep => "left in place",
            MissingPolicy::Empty => "replaced with nothing",
        };
        output.warning(&format!(
            "No value for {} ({action}): {}",
            if names.len() == 1 { "placeholder" } else { "placeholders" },
            names.join(", "),
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn generate_args(vars: &[&str]) -> GenerateArgs {
        let mut argv = vec!["docfill", "generate", "notice"];
        for var in vars {
            argv.extend(["-V", var]);
        }
        let Commands::Generate(args) = Cli::parse_from(argv).command else {
            panic!("expected Generate command");
        };
        args
    }

    #[test]
    fn well_formed_overrides_pass() {
        assert!(check_overrides(&generate_args(&["title=a=b", "author="])).is_ok());
    }

    #[test]
    fn malformed_override_is_a_user_error() {
        let err = check_overrides(&generate_args(&["title=ok", "novalue"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("novalue"));
    }
}
