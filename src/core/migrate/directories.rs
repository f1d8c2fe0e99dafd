//! Directory renames mirroring the file plan.
//!
//! Each directory holding a planned file gets its last segment converted to
//! PascalCase. Ancestors are never rewritten as part of a descendant's entry,
//! so every computed pair stays addressable until that directory itself moves,
//! provided entries are applied deepest first.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use super::naming::{self, CasingCorrections};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryRenameEntry {
    pub old_path: PathBuf,
    pub new_path: PathBuf,
}

impl DirectoryRenameEntry {
    pub fn depth(&self) -> usize {
        self.old_path.components().count()
    }
}

fn segments_under_root(dir: &Path, root: &Path) -> Result<Vec<OsString>> {
    let outside = || Error::plan_outside_root(dir.display().to_string(), root.display().to_string());

    let relative = dir.strip_prefix(root).map_err(|_| outside())?;
    relative
        .components()
        .map(|component| match component {
            Component::Normal(segment) => Ok(segment.to_os_string()),
            _ => Err(outside()),
        })
        .collect()
}

/// Ordered directory renames for a set of new file paths.
///
/// Fails if a directory lies outside `root` or two directories would land on
/// the same path. Directories already in canonical form produce no entry.
pub fn plan_directories<'a, I>(
    root: &Path,
    new_files: I,
    corrections: &CasingCorrections,
) -> Result<Vec<DirectoryRenameEntry>>
where
    I: IntoIterator<Item = &'a Path>,
{
    let dirs: BTreeSet<PathBuf> = new_files
        .into_iter()
        .filter_map(|file| file.parent().map(Path::to_path_buf))
        .filter(|dir| dir.as_path() != root)
        .collect();

    let mut entries = Vec::with_capacity(dirs.len());
    let mut destinations: HashMap<PathBuf, PathBuf> = HashMap::new();

    for dir in dirs {
        let mut segments = segments_under_root(&dir, root)?;
        let Some(last) = segments.pop() else {
            continue;
        };
        let Some(last) = last.to_str() else {
            crate::log_status!(
                "migrate",
                "Directory {} has a name that is not valid UTF-8, leaving it in place.",
                dir.display()
            );
            continue;
        };

        let mut new_path = root.to_path_buf();
        for ancestor in &segments {
            new_path.push(ancestor);
        }
        new_path.push(naming::directory_name(last, corrections));

        if let Some(previous) = destinations.insert(new_path.clone(), dir.clone()) {
            return Err(Error::plan_destination_collision(
                new_path.display().to_string(),
                vec![previous.display().to_string(), dir.display().to_string()],
            ));
        }

        entries.push(DirectoryRenameEntry {
            old_path: dir,
            new_path,
        });
    }

    entries.retain(|entry| entry.old_path != entry.new_path);
    entries.sort_by(|a, b| b.depth().cmp(&a.depth()));

    Ok(entries)
}
