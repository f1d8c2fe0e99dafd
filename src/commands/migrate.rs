use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use wp_psr4::migrate::{
    self, ConfigOverrides, DirectoryRenameEntry, ExecuteOptions, ExecutionReport, LocalWorkspace,
    MigrateConfig, PlanWarning, RenamePlanEntry, SkippedFile,
};

use wp_psr4::Error;

use crate::commands::CmdResult;

#[derive(Args)]
pub struct MigrateArgs {
    /// Root of the codebase to migrate
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Compute and report the plan without touching any file
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Move files with plain filesystem renames instead of `git mv`
    #[arg(long)]
    pub no_git: bool,

    /// Skip paths matching this pattern (substring or glob, repeatable)
    #[arg(short = 'e', long, value_name = "PATTERN")]
    pub exclude: Vec<String>,
}

#[derive(Serialize)]
#[serde(tag = "command", rename = "migrate")]
pub struct MigrateOutput {
    pub root: String,
    pub dry_run: bool,
    pub use_git: bool,
    pub files: Vec<RenamePlanEntry>,
    pub directories: Vec<DirectoryRenameEntry>,
    pub skipped: Vec<SkippedFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PlanWarning>,
    pub report: ExecutionReport,
}

pub fn run(args: MigrateArgs) -> CmdResult<MigrateOutput> {
    if args.exclude.iter().any(|pattern| pattern.trim().is_empty()) {
        return Err(Error::validation_invalid_argument(
            "exclude",
            "Exclude patterns cannot be empty",
            None,
        ));
    }

    let root = migrate::resolve_root(&args.path)?;

    let config = MigrateConfig::load(&root)?.with_overrides(ConfigOverrides {
        exclude: args.exclude,
        no_git: args.no_git,
    });

    let plan = migrate::plan_migration(&root, &config.plan_options())?;

    let workspace = if config.use_git {
        LocalWorkspace::git(root.clone())
    } else {
        LocalWorkspace::filesystem()
    };

    let report = migrate::execute(
        &plan,
        &workspace,
        ExecuteOptions {
            dry_run: args.dry_run,
        },
    );

    let exit_code = if report.has_errors() { 1 } else { 0 };

    Ok((
        MigrateOutput {
            root: plan.root.display().to_string(),
            dry_run: args.dry_run,
            use_git: workspace.uses_git(),
            files: plan.files,
            directories: plan.directories,
            skipped: plan.skipped,
            warnings: plan.warnings,
            report,
        },
        exit_code,
    ))
}
