//! Gitignore-style path filtering.
//!
//! Patterns come from a sidecar ignore file (`.ignore` at the project root by
//! default). Paths are always matched relative to the root with `/`
//! separators, and ignored directories are pruned before anything below them
//! is looked at.

use crate::utils::join_slash;
use anyhow::{Context, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{debug, info};
use std::collections::HashSet;
use std::path::{MAIN_SEPARATOR, Path};

/// Name of the ignore file looked up at the project root.
pub const IGNORE_FILE_NAME: &str = ".ignore";

/// Compiled ignore patterns for one run.
pub struct PathFilter {
    matcher: Gitignore,
    excluded: HashSet<String>,
}

impl PathFilter {
    /// A filter that never ignores anything.
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
            excluded: HashSet::new(),
        }
    }

    /// Compiles a filter from pattern lines. Blank lines and `#` comments are skipped.
    pub fn from_patterns<I, S>(root: &Path, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GitignoreBuilder::new(root);
        let mut count = 0usize;

        for line in patterns {
            let line = line.as_ref().trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            builder
                .add_line(None, line)
                .with_context(|| format!("Invalid ignore pattern: {line}"))?;
            count += 1;
        }

        let matcher = builder.build().context("Failed to compile ignore patterns")?;
        debug!("Compiled {count} ignore pattern(s)");

        Ok(Self {
            matcher,
            excluded: HashSet::new(),
        })
    }

    /// Reads patterns from an ignore file, one per line.
    pub fn from_ignore_file(root: &Path, ignore_file: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(ignore_file)
            .with_context(|| format!("Failed to read ignore file: {}", ignore_file.display()))?;
        info!("Using ignore file: {}", ignore_file.display());
        Self::from_patterns(root, content.lines())
    }

    /// Loads the explicit ignore file if given, else `<root>/.ignore` if it
    /// exists, else a filter that ignores nothing.
    pub fn load(root: &Path, ignore_file: Option<&Path>) -> Result<Self> {
        if let Some(path) = ignore_file {
            return Self::from_ignore_file(root, path);
        }

        let default_path = root.join(IGNORE_FILE_NAME);
        if default_path.is_file() {
            Self::from_ignore_file(root, &default_path)
        } else {
            debug!("No {IGNORE_FILE_NAME} under {}, nothing ignored", root.display());
            Ok(Self::empty())
        }
    }

    /// Additionally excludes one exact relative file path, regardless of patterns.
    pub fn with_excluded(mut self, rel_path: impl Into<String>) -> Self {
        self.excluded.insert(normalize(&rel_path.into()));
        self
    }

    /// Returns true if the relative path should be left out.
    ///
    /// Directories are tested both as a plain name and as a directory, and are
    /// excluded if either form matches. The root (empty path) is never ignored.
    pub fn is_ignored(&self, rel_path: &str, is_dir: bool) -> bool {
        let rel = normalize(rel_path);
        if rel.is_empty() {
            return false;
        }
        if !is_dir && self.excluded.contains(&rel) {
            return true;
        }

        if is_dir {
            self.matcher.matched(&rel, false).is_ignore()
                || self.matcher.matched(&rel, true).is_ignore()
        } else {
            self.matcher.matched(&rel, false).is_ignore()
        }
    }

    /// Returns the child directories of `parent_rel` that may be descended into,
    /// in their original order.
    pub fn prune_dirs(&self, parent_rel: &str, dirs: Vec<String>) -> Vec<String> {
        dirs.into_iter()
            .filter(|name| {
                let rel = join_slash(parent_rel, name);
                let ignored = self.is_ignored(&rel, true);
                if ignored {
                    info!("Ignoring directory: {rel}/");
                }
                !ignored
            })
            .collect()
    }

    /// Returns the files of `parent_rel` that are kept, in their original order.
    pub fn retain_files(&self, parent_rel: &str, files: Vec<String>) -> Vec<String> {
        files
            .into_iter()
            .filter(|name| {
                let rel = join_slash(parent_rel, name);
                let ignored = self.is_ignored(&rel, false);
                if ignored {
                    info!("Ignoring file: {rel}");
                }
                !ignored
            })
            .collect()
    }
}

fn normalize(path: &str) -> String {
    let path = path.replace(MAIN_SEPARATOR, "/");
    let path = path.strip_prefix("./").unwrap_or(&path);
    path.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dirs() -> Vec<String> {
        vec!["dir1".into(), "dir2".into(), "dir3".into()]
    }

    fn root() -> PathBuf {
        PathBuf::from("/home/user")
    }

    #[test]
    fn test_prune_dirs_with_trailing_slash_pattern() {
        let filter = PathFilter::from_patterns(&root(), ["*.ignore", "dir2/"]).unwrap();
        assert_eq!(filter.prune_dirs("project", dirs()), vec!["dir1", "dir3"]);
    }

    #[test]
    fn test_prune_dirs_no_match_keeps_order() {
        let filter = PathFilter::from_patterns(&root(), ["*.pdf", "*.docx"]).unwrap();
        assert_eq!(filter.prune_dirs("project", dirs()), dirs());
    }

    #[test]
    fn test_prune_dirs_all_match() {
        let filter = PathFilter::from_patterns(&root(), ["*", "dir1/", "dir3/"]).unwrap();
        assert!(filter.prune_dirs("project", dirs()).is_empty());
    }

    #[test]
    fn test_root_is_never_ignored() {
        let filter = PathFilter::from_patterns(&root(), ["*"]).unwrap();
        assert!(!filter.is_ignored("", true));
        assert!(!filter.is_ignored("./", true));
    }

    #[test]
    fn test_bare_pattern_matches_directory() {
        let filter = PathFilter::from_patterns(&root(), [".hidden"]).unwrap();
        assert!(filter.is_ignored(".hidden", true));
        assert!(filter.is_ignored("sub/.hidden", true));
    }

    #[test]
    fn test_directory_pattern_does_not_match_file() {
        let filter = PathFilter::from_patterns(&root(), ["build/"]).unwrap();
        assert!(filter.is_ignored("build", true));
        assert!(!filter.is_ignored("build", false));
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let filter =
            PathFilter::from_patterns(&root(), ["# a comment", "", "   ", "*.log"]).unwrap();
        assert!(filter.is_ignored("app.log", false));
        assert!(!filter.is_ignored("app.py", false));
        assert!(!filter.is_ignored("# a comment", false));
    }

    #[test]
    fn test_negation_whitelists() {
        let filter = PathFilter::from_patterns(&root(), ["*.log", "!keep.log"]).unwrap();
        assert!(filter.is_ignored("app.log", false));
        assert!(!filter.is_ignored("keep.log", false));
    }

    #[test]
    fn test_retain_files() {
        let filter = PathFilter::from_patterns(&root(), ["*.log"]).unwrap();
        let files = vec!["app.log".to_string(), "app.py".to_string()];
        assert_eq!(filter.retain_files("", files), vec!["app.py"]);
    }

    #[test]
    fn test_empty_filter_ignores_nothing() {
        let filter = PathFilter::empty();
        assert!(!filter.is_ignored("anything", false));
        assert!(!filter.is_ignored("node_modules", true));
    }

    #[test]
    fn test_excluded_path() {
        let filter = PathFilter::empty().with_excluded("out/doc.pdf");
        assert!(filter.is_ignored("out/doc.pdf", false));
        assert!(!filter.is_ignored("out", true));
    }

    #[test]
    fn test_load_without_ignore_file() {
        let dir = tempfile::tempdir().unwrap();
        let filter = PathFilter::load(dir.path(), None).unwrap();
        assert!(!filter.is_ignored("x.log", false));
    }

    #[test]
    fn test_load_reads_default_ignore_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(IGNORE_FILE_NAME), "*.log\n").unwrap();
        let filter = PathFilter::load(dir.path(), None).unwrap();
        assert!(filter.is_ignored("x.log", false));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert!(PathFilter::load(dir.path(), Some(&missing)).is_err());
    }
}
