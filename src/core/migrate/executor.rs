//! Plan application.
//!
//! Applies a [`MigrationPlan`] through a [`Workspace`]: every file move and
//! declaration rewrite first, then directory moves in plan order (deepest
//! first). Paths are never re-resolved mid-run. Failed items are recorded and
//! the pass continues; there is no rollback.

use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::plan::{MigrationPlan, RenamePlanEntry};
use super::directories::DirectoryRenameEntry;
use super::verify;
use crate::error::{Error, Result};
use crate::utils::{command, io};

// ============================================================================
// Workspace
// ============================================================================

/// The storage the executor mutates.
pub trait Workspace {
    fn move_file(&self, from: &Path, to: &Path) -> Result<()>;
    fn move_dir(&self, from: &Path, to: &Path) -> Result<()>;
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    fn write(&self, path: &Path, content: &[u8]) -> Result<()>;
    fn dir_exists(&self, path: &Path) -> bool;
}

#[derive(Debug, Clone)]
enum Mover {
    Filesystem,
    Git { root: PathBuf },
}

/// Local disk, moving either with `rename(2)` or `git mv`.
#[derive(Debug, Clone)]
pub struct LocalWorkspace {
    mover: Mover,
}

impl LocalWorkspace {
    pub fn filesystem() -> Self {
        Self {
            mover: Mover::Filesystem,
        }
    }

    /// `git mv` run from `root`.
    pub fn git(root: impl Into<PathBuf>) -> Self {
        Self {
            mover: Mover::Git { root: root.into() },
        }
    }

    pub fn uses_git(&self) -> bool {
        matches!(self.mover, Mover::Git { .. })
    }
}

/// The underlying cause when the error carries one, else its message.
fn cause(err: &Error) -> String {
    err.details
        .get("error")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| err.message.clone())
}

fn item_message(err: &Error) -> String {
    let cause = cause(err);
    if cause == err.message {
        cause
    } else {
        format!("{}: {}", err.message, cause)
    }
}

fn git_mv(root: &Path, from: &Path, to: &Path) -> Result<()> {
    let args = [OsStr::new("mv"), from.as_os_str(), to.as_os_str()];
    command::run_in(root, "git", args, "git mv")
        .map(|_| ())
        .map_err(|e| Error::git_command_failed(cause(&e)))
}

fn fs_rename(from: &Path, to: &Path) -> Result<()> {
    std::fs::rename(from, to).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("rename {} → {}", from.display(), to.display())),
        )
    })
}

/// True if `path`'s parent holds an entry with exactly that name.
///
/// Compares names byte for byte, so a case-only rename on a case-insensitive
/// filesystem does not count as occupied.
fn occupied(path: &Path) -> bool {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return false;
    };
    match std::fs::read_dir(parent) {
        Ok(entries) => entries.flatten().any(|entry| entry.file_name() == name),
        Err(_) => false,
    }
}

fn ensure_vacant(path: &Path, operation: &str) -> Result<()> {
    if occupied(path) {
        return Err(Error::internal_io(
            format!("Destination {} already exists", path.display()),
            Some(operation.to_string()),
        ));
    }
    Ok(())
}

/// `{dir}-bak` next to `dir`.
fn intermediate_path(dir: &Path) -> PathBuf {
    let mut name = dir.file_name().unwrap_or_default().to_os_string();
    name.push("-bak");
    dir.with_file_name(name)
}

impl Workspace for LocalWorkspace {
    fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        ensure_vacant(to, "move file")?;
        match &self.mover {
            Mover::Filesystem => fs_rename(from, to),
            Mover::Git { root } => git_mv(root, from, to),
        }
    }

    /// Git moves go through `{old}-bak` so case-only renames work on
    /// case-insensitive filesystems.
    fn move_dir(&self, from: &Path, to: &Path) -> Result<()> {
        ensure_vacant(to, "move directory")?;
        match &self.mover {
            Mover::Filesystem => fs_rename(from, to),
            Mover::Git { root } => {
                let intermediate = intermediate_path(from);
                ensure_vacant(&intermediate, "move directory")?;
                git_mv(root, from, &intermediate)?;
                git_mv(root, &intermediate, to)
            }
        }
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        io::read_bytes(path, &format!("read {}", path.display()))
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        io::write_bytes_atomic(path, content, &format!("write {}", path.display()))
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    File,
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Move,
    Rewrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Done,
    WouldApply,
    Skipped,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionItem {
    pub kind: ItemKind,
    pub action: Action,
    pub from: String,
    pub to: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outcome of one pass over a plan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionReport {
    pub dry_run: bool,
    pub moved: u32,
    pub rewritten: u32,
    pub skipped: u32,
    pub errors: u32,
    pub items: Vec<ExecutionItem>,
}

impl ExecutionReport {
    fn record(
        &mut self,
        kind: ItemKind,
        action: Action,
        from: String,
        to: String,
        status: ItemStatus,
        message: Option<String>,
    ) {
        match (status, action) {
            (ItemStatus::Done, Action::Move) => self.moved += 1,
            (ItemStatus::Done, Action::Rewrite) => self.rewritten += 1,
            (ItemStatus::Skipped, _) => self.skipped += 1,
            (ItemStatus::Error, _) => self.errors += 1,
            (ItemStatus::WouldApply, _) => {}
        }
        self.items.push(ExecutionItem {
            kind,
            action,
            from,
            to,
            status,
            message,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    pub dry_run: bool,
}

// ============================================================================
// Execution
// ============================================================================

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn dry_run_file(entry: &RenamePlanEntry, report: &mut ExecutionReport) {
    crate::log_status!(
        "migrate",
        "Would move {} to {}.",
        entry.old_path.display(),
        entry.new_path.display()
    );
    report.record(
        ItemKind::File,
        Action::Move,
        display(&entry.old_path),
        display(&entry.new_path),
        ItemStatus::WouldApply,
        None,
    );

    crate::log_status!(
        "migrate",
        "Would replace {} with {} in {}.",
        entry.legacy,
        entry.canonical,
        entry.new_path.display()
    );
    report.record(
        ItemKind::File,
        Action::Rewrite,
        entry.legacy.clone(),
        entry.canonical.clone(),
        ItemStatus::WouldApply,
        Some(display(&entry.new_path)),
    );
}

fn rewrite_file(workspace: &dyn Workspace, entry: &RenamePlanEntry) -> Result<usize> {
    let content = workspace.read(&entry.new_path)?;
    let (rewritten, count) =
        verify::rewrite_declaration(&content, entry.keyword, &entry.legacy, &entry.canonical);
    if count > 0 {
        workspace.write(&entry.new_path, &rewritten)?;
    }
    Ok(count)
}

fn apply_file(workspace: &dyn Workspace, entry: &RenamePlanEntry, report: &mut ExecutionReport) {
    let from = display(&entry.old_path);
    let to = display(&entry.new_path);

    crate::log_status!("migrate", "Moving {} to {}...", from, to);
    if let Err(err) = workspace.move_file(&entry.old_path, &entry.new_path) {
        crate::log_status!("migrate", "Failed to move {}: {}", from, item_message(&err));
        report.record(
            ItemKind::File,
            Action::Move,
            from,
            to,
            ItemStatus::Error,
            Some(item_message(&err)),
        );
        return;
    }
    report.record(ItemKind::File, Action::Move, from, to.clone(), ItemStatus::Done, None);

    crate::log_status!("migrate", "Updating class name in {}...", to);
    let (status, message) = match rewrite_file(workspace, entry) {
        Ok(0) => (
            ItemStatus::Skipped,
            Some(format!("Declaration '{} {} ' no longer present", entry.keyword, entry.legacy)),
        ),
        Ok(_) => (ItemStatus::Done, Some(to)),
        Err(err) => (ItemStatus::Error, Some(item_message(&err))),
    };
    report.record(
        ItemKind::File,
        Action::Rewrite,
        entry.legacy.clone(),
        entry.canonical.clone(),
        status,
        message,
    );
}

fn apply_directory(
    workspace: &dyn Workspace,
    entry: &DirectoryRenameEntry,
    dry_run: bool,
    report: &mut ExecutionReport,
) {
    let from = display(&entry.old_path);
    let to = display(&entry.new_path);

    if dry_run {
        crate::log_status!("migrate", "Would move {} to {}.", from, to);
        report.record(ItemKind::Directory, Action::Move, from, to, ItemStatus::WouldApply, None);
        return;
    }

    if !workspace.dir_exists(&entry.old_path) {
        let message = format!("Old directory {} does not exist, ignoring...", from);
        crate::log_status!("migrate", "{}", message);
        report.record(
            ItemKind::Directory,
            Action::Move,
            from,
            to,
            ItemStatus::Skipped,
            Some(message),
        );
        return;
    }

    crate::log_status!("migrate", "Moving {} to {}...", from, to);
    match workspace.move_dir(&entry.old_path, &entry.new_path) {
        Ok(()) => report.record(ItemKind::Directory, Action::Move, from, to, ItemStatus::Done, None),
        Err(err) => report.record(
            ItemKind::Directory,
            Action::Move,
            from,
            to,
            ItemStatus::Error,
            Some(item_message(&err)),
        ),
    }
}

/// Apply `plan` to `workspace`. In dry-run mode the workspace is never called.
pub fn execute(
    plan: &MigrationPlan,
    workspace: &dyn Workspace,
    options: ExecuteOptions,
) -> ExecutionReport {
    let mut report = ExecutionReport {
        dry_run: options.dry_run,
        ..ExecutionReport::default()
    };

    if options.dry_run {
        crate::log_status!("migrate", "Running in dry-run mode, no files will be moved.");
    }

    for entry in &plan.files {
        if options.dry_run {
            dry_run_file(entry, &mut report);
        } else {
            apply_file(workspace, entry, &mut report);
        }
    }

    crate::log_status!("migrate", "Starting directory migration...");

    for entry in &plan.directories {
        apply_directory(workspace, entry, options.dry_run, &mut report);
    }

    if options.dry_run {
        crate::log_status!("migrate", "Dry-run complete, no files or directories were moved.");
    } else {
        crate::log_status!(
            "migrate",
            "Migration complete: {} moved, {} rewritten, {} errors.",
            report.moved,
            report.rewritten,
            report.errors
        );
    }

    report
}

// ============================================================================
// Tests
// ============================================================================
