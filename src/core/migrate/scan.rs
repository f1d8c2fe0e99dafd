//! Source discovery and filename classification.
//!
//! Walks the migration root once, applies exclusions, and sorts every source
//! file into a candidate (legacy naming, content loaded) or a skip record.

use glob_match::glob_match;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::naming::TypeToken;

// ============================================================================
// Types
// ============================================================================

/// One discovered source file.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Path relative to the root, `/` separated.
    pub relative: String,
    pub path: PathBuf,
    pub filename: String,
    pub content: Vec<u8>,
}

/// A file whose name follows the legacy convention.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub token: TypeToken,
    pub entry: FileEntry,
}

/// Why a file was left out of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    UppercaseFilename,
    UnknownType { token: String },
    EmptySlug,
    InvalidIdentifier { identifier: String },
    IdentifierNotFound { expected: String },
    Unreadable { error: String },
    UnreadableDirectory { error: String },
}

impl SkipReason {
    pub fn message(&self, file: &str) -> String {
        match self {
            SkipReason::UppercaseFilename => format!(
                "File {} does not seem like a valid WordPress file, ignoring...",
                file
            ),
            SkipReason::UnknownType { .. } => format!(
                "File {} does not seem like a valid WordPress file (unknown type), ignoring...",
                file
            ),
            SkipReason::EmptySlug => format!("File {} has no name after its type prefix, ignoring...", file),
            SkipReason::InvalidIdentifier { identifier } => format!(
                "File {} would produce invalid identifier '{}', ignoring...",
                file, identifier
            ),
            SkipReason::IdentifierNotFound { .. } => format!(
                "Cannot determine the proper class name for {}, ignoring...",
                file
            ),
            SkipReason::Unreadable { error } => {
                format!("File {} could not be read ({}), ignoring...", file, error)
            }
            SkipReason::UnreadableDirectory { error } => {
                format!("Directory {} could not be read ({}), ignoring...", file, error)
            }
        }
    }
}

/// A skipped file with its diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub file: String,
    #[serde(flatten)]
    pub reason: SkipReason,
    pub message: String,
}

impl SkippedFile {
    pub fn new(file: impl Into<String>, reason: SkipReason) -> Self {
        let file = file.into();
        let message = reason.message(&file);
        crate::log_status!("migrate", "{}", message);
        Self {
            file,
            reason,
            message,
        }
    }
}

/// What a scan found.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub candidates: Vec<Candidate>,
    pub skipped: Vec<SkippedFile>,
    /// Every source file seen, accepted or not. Used for on-disk collision warnings.
    pub seen: Vec<PathBuf>,
}

// ============================================================================
// Exclusion
// ============================================================================

fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// Match a root-relative path against exclude patterns.
///
/// Glob patterns match the path itself or anything below it; plain patterns
/// match as a substring anywhere in the path.
pub fn is_excluded(relative: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|raw| {
        let pattern = raw.trim().trim_matches('/');
        if pattern.is_empty() {
            return false;
        }
        if has_glob_meta(pattern) {
            glob_match(pattern, relative) || glob_match(&format!("{}/**", pattern), relative)
        } else {
            relative.contains(pattern)
        }
    })
}

// ============================================================================
// File walking
// ============================================================================

/// Directories never descended into.
const ALWAYS_SKIP_DIRS: &[&str] = &[".git", ".svn", ".hg", "vendor", "node_modules"];

fn relative_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Result of walking the migration root.
#[derive(Debug, Default)]
pub struct SourceWalk {
    /// Matching files, sorted.
    pub files: Vec<PathBuf>,
    /// Directories whose listing failed, with the error.
    pub unreadable: Vec<(PathBuf, String)>,
}

/// Every file under `root` ending in `.{extension}` and not excluded.
pub fn walk_sources(root: &Path, extension: &str, exclude: &[String]) -> SourceWalk {
    let mut walk = SourceWalk::default();
    walk_recursive(root, extension, &mut walk);
    walk.files
        .retain(|f| !is_excluded(&relative_path(f, root), exclude));
    walk.unreadable
        .retain(|(d, _)| !is_excluded(&relative_path(d, root), exclude));
    walk.files.sort();
    walk.unreadable.sort();
    walk
}

fn walk_recursive(dir: &Path, extension: &str, walk: &mut SourceWalk) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            walk.unreadable.push((dir.to_path_buf(), e.to_string()));
            return;
        }
    };

    let suffix = format!(".{}", extension);

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }

        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();

        if file_type.is_dir() {
            if ALWAYS_SKIP_DIRS.contains(&name.as_str()) {
                continue;
            }
            walk_recursive(&path, extension, walk);
        } else if name.ends_with(&suffix) && path.is_file() {
            walk.files.push(path);
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Decide from the filename alone whether a file follows the legacy convention.
pub fn classify_filename(filename: &str) -> Result<TypeToken, SkipReason> {
    if filename.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(SkipReason::UppercaseFilename);
    }

    let token = super::naming::type_token_text(filename);
    TypeToken::parse(token).ok_or_else(|| SkipReason::UnknownType {
        token: token.to_string(),
    })
}

/// Walk `root` and classify every source file.
pub fn scan(root: &Path, extension: &str, exclude: &[String]) -> ScanResult {
    let mut result = ScanResult::default();
    let walk = walk_sources(root, extension, exclude);

    for (dir, error) in walk.unreadable {
        let relative = match relative_path(&dir, root) {
            r if r.is_empty() => ".".to_string(),
            r => r,
        };
        result
            .skipped
            .push(SkippedFile::new(relative, SkipReason::UnreadableDirectory { error }));
    }

    for path in walk.files {
        let relative = relative_path(&path, root);
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        result.seen.push(path.clone());

        let token = match classify_filename(&filename) {
            Ok(token) => token,
            Err(reason) => {
                result.skipped.push(SkippedFile::new(relative, reason));
                continue;
            }
        };

        let content = match std::fs::read(&path) {
            Ok(content) => content,
            Err(e) => {
                result.skipped.push(SkippedFile::new(
                    relative,
                    SkipReason::Unreadable {
                        error: e.to_string(),
                    },
                ));
                continue;
            }
        };

        result.candidates.push(Candidate {
            token,
            entry: FileEntry {
                relative,
                path,
                filename,
                content,
            },
        });
    }

    result
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn uppercase_filename_is_rejected() {
        assert_eq!(
            classify_filename("Class-Foo.php"),
            Err(SkipReason::UppercaseFilename)
        );
        assert_eq!(classify_filename("FooBar.php"), Err(SkipReason::UppercaseFilename));
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert_eq!(
            classify_filename("widget-x.php"),
            Err(SkipReason::UnknownType {
                token: "widget".to_string()
            })
        );
        assert!(classify_filename("functions.php").is_err());
    }

    #[test]
    fn known_types_are_accepted() {
        assert_eq!(classify_filename("class-foo.php"), Ok(TypeToken::Class));
        assert_eq!(classify_filename("trait-foo.php"), Ok(TypeToken::Trait));
        assert_eq!(classify_filename("interface-foo.php"), Ok(TypeToken::Interface));
        assert_eq!(classify_filename("enum-foo.php"), Ok(TypeToken::Enum));
        assert_eq!(classify_filename("test-foo.php"), Ok(TypeToken::Test));
    }

    #[test]
    fn plain_patterns_match_substrings() {
        let patterns = vec!["fixtures".to_string()];
        assert!(is_excluded("tests/fixtures/class-a.php", &patterns));
        assert!(is_excluded("src/fixtures-old/class-a.php", &patterns));
        assert!(!is_excluded("src/class-a.php", &patterns));
    }

    #[test]
    fn glob_patterns_match_paths_and_directories() {
        let patterns = vec!["src/legacy/*".to_string(), "lib".to_string()];
        assert!(is_excluded("src/legacy/class-a.php", &patterns));
        assert!(is_excluded("lib/class-b.php", &patterns));

        let dir_glob = vec!["**/generated".to_string()];
        assert!(is_excluded("src/generated/class-c.php", &dir_glob));
        assert!(!is_excluded("src/class-c.php", &dir_glob));
    }

    #[test]
    fn blank_patterns_exclude_nothing() {
        let patterns = vec!["".to_string(), "  ".to_string()];
        assert!(!is_excluded("src/class-a.php", &patterns));
    }

    #[test]
    fn walk_skips_hidden_vendor_and_other_extensions() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "src/class-a.php", "");
        touch(root, "src/readme.md", "");
        touch(root, ".git/class-hidden.php", "");
        touch(root, "vendor/pkg/class-dep.php", "");
        touch(root, "src/.class-dot.php", "");

        let files = walk_sources(root, "php", &[]).files;
        let names: Vec<String> = files.iter().map(|f| relative_path(f, root)).collect();
        assert_eq!(names, vec!["src/class-a.php".to_string()]);
    }

    #[test]
    fn walk_is_sorted_and_honors_exclusions() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "b/class-b.php", "");
        touch(root, "a/class-a.php", "");
        touch(root, "tests/class-t.php", "");

        let files = walk_sources(root, "php", &["tests".to_string()]).files;
        let names: Vec<String> = files.iter().map(|f| relative_path(f, root)).collect();
        assert_eq!(names, vec!["a/class-a.php", "b/class-b.php"]);
    }

    #[test]
    fn scan_splits_candidates_and_skips() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "class-foo-bar.php", "<?php class Foo_Bar {}");
        touch(root, "Class-Foo.php", "<?php class Foo {}");
        touch(root, "widget-x.php", "<?php");

        let result = scan(root, "php", &[]);

        assert_eq!(result.candidates.len(), 1);
        let candidate = &result.candidates[0];
        assert_eq!(candidate.token, TypeToken::Class);
        assert_eq!(candidate.entry.relative, "class-foo-bar.php");
        assert_eq!(candidate.entry.content, b"<?php class Foo_Bar {}".to_vec());

        assert_eq!(result.skipped.len(), 2);
        assert_eq!(result.seen.len(), 3);
        assert!(result
            .skipped
            .iter()
            .any(|s| s.file == "Class-Foo.php" && s.reason == SkipReason::UppercaseFilename));
        assert!(result
            .skipped
            .iter()
            .any(|s| s.file == "widget-x.php" && s.message.contains("unknown type")));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "class-a.php", "<?php class A {}");
        touch(root, "locked/class-b.php", "<?php class B {}");

        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        let listable = fs::read_dir(&locked).is_ok();

        let result = scan(root, "php", &[]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // Privileged users can list the directory regardless of its mode.
        if listable {
            return;
        }

        assert_eq!(result.candidates.len(), 1);
        let skipped = result
            .skipped
            .iter()
            .find(|s| s.file == "locked")
            .unwrap();
        assert!(matches!(
            skipped.reason,
            SkipReason::UnreadableDirectory { .. }
        ));
        assert!(skipped.message.starts_with("Directory locked could not be read"));
    }
}
