//! Directory tree listing.
//!
//! The walk is top-down like `os.walk`: a directory's label comes first, then
//! its own files, then each surviving subdirectory in turn. Children keep the
//! order in which the filesystem enumerates them.

use crate::filter::PathFilter;
use crate::utils::join_slash;
use anyhow::{Result, bail};
use ignore::WalkBuilder;
use log::{debug, warn};
use std::path::Path;

/// Indentation used for one level of the listing.
pub const TREE_INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One line of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Display name: the directory or file name (the root's own name for the root).
    pub name: String,
    /// Path relative to the root with `/` separators; empty for the root.
    pub rel_path: String,
    pub depth: usize,
    pub kind: EntryKind,
}

impl TreeEntry {
    /// The indented label drawn in the listing. Directories get a trailing `/`.
    pub fn label(&self) -> String {
        let indent = TREE_INDENT.repeat(self.depth);
        match self.kind {
            EntryKind::Directory => format!("{indent}{}/", self.name),
            EntryKind::File => format!("{indent}{}", self.name),
        }
    }
}

/// Result of walking a project: the listing and the files to render, in order.
#[derive(Debug, Default)]
pub struct DirTree {
    pub entries: Vec<TreeEntry>,
    pub file_paths: Vec<String>,
}

impl DirTree {
    /// Indented display lines, one per entry.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(TreeEntry::label).collect()
    }
}

/// Walks `root`, skipping everything `filter` ignores.
pub fn build_tree(root: &Path, filter: &PathFilter) -> Result<DirTree> {
    if !root.is_dir() {
        bail!("Source directory not found: {}", root.display());
    }

    let mut tree = DirTree::default();
    walk_dir(root, "", &root_name(root), 0, filter, &mut tree);

    debug!(
        "Tree built: {} entries, {} files",
        tree.entries.len(),
        tree.file_paths.len()
    );
    Ok(tree)
}

fn walk_dir(
    abs_path: &Path,
    rel_path: &str,
    name: &str,
    depth: usize,
    filter: &PathFilter,
    tree: &mut DirTree,
) {
    tree.entries.push(TreeEntry {
        name: name.to_string(),
        rel_path: rel_path.to_string(),
        depth,
        kind: EntryKind::Directory,
    });

    let (dirs, files) = list_dir(abs_path);

    for file in filter.retain_files(rel_path, files) {
        let file_rel = join_slash(rel_path, &file);
        tree.entries.push(TreeEntry {
            name: file,
            rel_path: file_rel.clone(),
            depth: depth + 1,
            kind: EntryKind::File,
        });
        tree.file_paths.push(file_rel);
    }

    for dir in filter.prune_dirs(rel_path, dirs) {
        let dir_rel = join_slash(rel_path, &dir);
        walk_dir(&abs_path.join(&dir), &dir_rel, &dir, depth + 1, filter, tree);
    }
}

/// Lists the immediate children of `dir` as (directories, files), both in
/// enumeration order. Symlinked directories are not followed and are left out.
fn list_dir(dir: &Path) -> (Vec<String>, Vec<String>) {
    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .max_depth(Some(1))
        .build();

    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for result in walker {
        match result {
            Ok(entry) => {
                if entry.depth() == 0 {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                let Some(file_type) = entry.file_type() else {
                    continue;
                };

                if file_type.is_dir() {
                    dirs.push(name);
                } else if file_type.is_symlink() && entry.path().is_dir() {
                    debug!("Not following symlinked directory: {}", entry.path().display());
                } else {
                    files.push(name);
                }
            }
            Err(err) => {
                warn!("Error walking path: {err}");
            }
        }
    }

    (dirs, files)
}

fn root_name(root: &Path) -> String {
    let named = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty());

    named
        .or_else(|| {
            root.canonicalize()
                .ok()
                .as_deref()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| root.display().to_string())
}
