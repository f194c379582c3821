use std::path::{Component, Path};

/// Returns `path` relative to `root` with `/` separators on every platform.
///
/// The root itself maps to the empty string. Paths outside `root` are
/// normalized as given.
pub fn to_slash_relative(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Joins a forward-slash relative directory with a child name.
pub fn join_slash(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Replaces tabs with spaces up to the next multiple of `tab_width`.
pub fn expand_tabs(line: &str, tab_width: usize) -> String {
    if !line.contains('\t') || tab_width == 0 {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + tab_width);
    let mut column = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = tab_width - (column % tab_width);
            out.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            out.push(ch);
            column += 1;
        }
    }
    out
}
