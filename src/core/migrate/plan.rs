//! Migration planning: classify, verify, and aggregate into one plan.
//!
//! The plan is computed from a single snapshot of the root and never touches
//! storage. Structural problems (bad root, path escaping the root, two sources
//! sharing a destination) fail the whole plan.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::directories::{self, DirectoryRenameEntry};
use super::naming::{self, CasingCorrections, Keyword, TypeToken};
use super::scan::{self, Candidate, FileEntry, SkipReason, SkippedFile};
use super::verify;
use crate::error::{Error, Result};

// ============================================================================
// Types
// ============================================================================

/// Inputs that shape a plan.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub extension: String,
    pub exclude: Vec<String>,
    pub corrections: CasingCorrections,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            extension: "php".to_string(),
            exclude: Vec::new(),
            corrections: CasingCorrections::default(),
        }
    }
}

/// A candidate whose identifiers were derived and whose declaration was found.
#[derive(Debug, Clone)]
pub struct ClassifiedFile {
    pub entry: FileEntry,
    pub token: TypeToken,
    pub keyword: Keyword,
    pub slug: String,
    pub legacy: String,
    pub canonical: String,
}

/// One file move plus declaration rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamePlanEntry {
    pub keyword: Keyword,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
    pub legacy: String,
    pub canonical: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanWarning {
    pub kind: String,
    pub file: String,
    pub message: String,
}

/// The full migration plan handed to the executor.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationPlan {
    pub root: PathBuf,
    pub files: Vec<RenamePlanEntry>,
    /// Deepest first.
    pub directories: Vec<DirectoryRenameEntry>,
    pub skipped: Vec<SkippedFile>,
    pub warnings: Vec<PlanWarning>,
}

// ============================================================================
// Root resolution
// ============================================================================

/// Canonicalize the migration root and require it to be a directory.
pub fn resolve_root(path: &Path) -> Result<PathBuf> {
    let display = path.display().to_string();
    let resolved = path
        .canonicalize()
        .map_err(|e| Error::migration_invalid_root(display.clone(), e.to_string()))?;

    if !resolved.is_dir() {
        return Err(Error::migration_invalid_root(display, "Not a directory"));
    }

    Ok(resolved)
}

// ============================================================================
// Classification
// ============================================================================

/// Derive identifiers for a candidate and check its declaration.
pub fn classify(
    candidate: Candidate,
    extension: &str,
    corrections: &CasingCorrections,
) -> std::result::Result<ClassifiedFile, SkippedFile> {
    let Candidate { token, entry } = candidate;

    let slug = naming::slug(&entry.filename, token, extension).to_string();
    if slug.is_empty() {
        return Err(SkippedFile::new(entry.relative, SkipReason::EmptySlug));
    }

    let ids = naming::identifiers(&slug, token, corrections);
    if !naming::is_valid_identifier(&ids.canonical) {
        return Err(SkippedFile::new(
            entry.relative,
            SkipReason::InvalidIdentifier {
                identifier: ids.canonical,
            },
        ));
    }

    if !verify::declares(&entry.content, ids.keyword, &ids.legacy) {
        return Err(SkippedFile::new(
            entry.relative,
            SkipReason::IdentifierNotFound {
                expected: format!("{} {} ", ids.keyword, ids.legacy),
            },
        ));
    }

    Ok(ClassifiedFile {
        entry,
        token,
        keyword: ids.keyword,
        slug,
        legacy: ids.legacy,
        canonical: ids.canonical,
    })
}

// ============================================================================
// Plan building
// ============================================================================

/// Collects file entries and rejects duplicate destinations.
#[derive(Debug, Default)]
pub struct RenamePlanBuilder {
    entries: Vec<RenamePlanEntry>,
    destinations: HashMap<PathBuf, usize>,
}

impl RenamePlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// New path: same directory, `{canonical}.{extension}`.
    pub fn entry_for(file: &ClassifiedFile, extension: &str) -> RenamePlanEntry {
        let dir = file.entry.path.parent().unwrap_or_else(|| Path::new(""));
        RenamePlanEntry {
            keyword: file.keyword,
            old_path: file.entry.path.clone(),
            new_path: dir.join(format!("{}.{}", file.canonical, extension)),
            legacy: file.legacy.clone(),
            canonical: file.canonical.clone(),
        }
    }

    pub fn push(&mut self, entry: RenamePlanEntry) -> Result<()> {
        if entry.old_path == entry.new_path {
            return Err(Error::internal_unexpected(format!(
                "Planned move of {} onto itself",
                entry.old_path.display()
            )));
        }

        if let Some(&index) = self.destinations.get(&entry.new_path) {
            return Err(Error::plan_destination_collision(
                entry.new_path.display().to_string(),
                vec![
                    self.entries[index].old_path.display().to_string(),
                    entry.old_path.display().to_string(),
                ],
            ));
        }

        self.destinations
            .insert(entry.new_path.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self) -> Vec<RenamePlanEntry> {
        self.entries
    }
}

/// Targets that already exist as files not being moved away by the plan.
fn detect_existing_targets(
    entries: &[RenamePlanEntry],
    seen: &[PathBuf],
    root: &Path,
) -> Vec<PlanWarning> {
    let moving: HashSet<&Path> = entries.iter().map(|e| e.old_path.as_path()).collect();
    let existing: HashSet<&Path> = seen
        .iter()
        .map(PathBuf::as_path)
        .filter(|p| !moving.contains(p))
        .collect();

    entries
        .iter()
        .filter(|e| existing.contains(e.new_path.as_path()))
        .map(|e| {
            let file = e
                .new_path
                .strip_prefix(root)
                .unwrap_or(&e.new_path)
                .display()
                .to_string();
            PlanWarning {
                kind: "target_exists".to_string(),
                message: format!(
                    "Rename target '{}' already exists on disk (from '{}')",
                    e.new_path.display(),
                    e.old_path.display()
                ),
                file,
            }
        })
        .collect()
}

/// Scan `root` and compute the complete file and directory plan.
pub fn plan_migration(root: &Path, options: &PlanOptions) -> Result<MigrationPlan> {
    let root = resolve_root(root)?;

    crate::log_status!("migrate", "Migrating WordPress codebase at {}...", root.display());

    let scanned = scan::scan(&root, &options.extension, &options.exclude);
    let mut skipped = scanned.skipped;
    let mut builder = RenamePlanBuilder::new();

    for candidate in scanned.candidates {
        match classify(candidate, &options.extension, &options.corrections) {
            Ok(file) => builder.push(RenamePlanBuilder::entry_for(&file, &options.extension))?,
            Err(skip) => skipped.push(skip),
        }
    }

    let files = builder.finish();
    skipped.sort_by(|a, b| a.file.cmp(&b.file));

    crate::log_status!("migrate", "Found {} files to migrate.", files.len());

    let directories = directories::plan_directories(
        &root,
        files.iter().map(|f| f.new_path.as_path()),
        &options.corrections,
    )?;

    crate::log_status!(
        "migrate",
        "Found {} directories to migrate.",
        directories.len()
    );

    let warnings = detect_existing_targets(&files, &scanned.seen, &root);
    for warning in &warnings {
        crate::log_status!("migrate", "{}", warning.message);
    }

    Ok(MigrationPlan {
        root,
        files,
        directories,
        skipped,
        warnings,
    })
}

// ============================================================================
// Tests
// ============================================================================
