//! Legacy-to-PSR-4 migration: plan file and directory renames, then apply them.
//!
//! The pipeline is a single pass over one snapshot of the migration root:
//! scan → classify → verify → file plan → directory plan → execute.
//! Planning only reads the tree; only the executor mutates it.

pub mod config;
pub mod directories;
pub mod executor;
pub mod naming;
pub mod plan;
pub mod scan;
pub mod verify;

pub use config::{ConfigOverrides, MigrateConfig, CONFIG_FILE};
pub use directories::{plan_directories, DirectoryRenameEntry};
pub use executor::{
    execute, ExecuteOptions, ExecutionItem, ExecutionReport, ItemStatus, LocalWorkspace, Workspace,
};
pub use naming::{CasingCorrection, CasingCorrections, Keyword, TypeToken};
pub use plan::{
    plan_migration, resolve_root, MigrationPlan, PlanOptions, PlanWarning, RenamePlanBuilder,
    RenamePlanEntry,
};
pub use scan::{SkipReason, SkippedFile};
