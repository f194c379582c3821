//! # code2pdf Library
//!
//! This crate renders a project into a printable PDF:
//!
//! - A directory listing of everything not excluded by the project's `.ignore` file
//! - The text of every listed file, one after another, wrapped to the page width
//!
//! ## Usage
//!
//! ```rust,no_run
//! use code2pdf::{Config, run_code2pdf};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::new(std::env::current_dir()?, "project.pdf");
//!     run_code2pdf(config).await
//! }
//! ```
//!
//! The layout engine does not depend on PDF output. Anything implementing
//! [`Canvas`] can receive the pages, e.g. [`PageRecorder`]:
//!
//! ```rust
//! use code2pdf::{LayoutStyle, PageFlow, PageGeometry, PageRecorder};
//!
//! let metrics = |text: &str, size: f32| text.chars().count() as f32 * size * 0.6;
//! let mut flow = PageFlow::new(PageRecorder::new(), &metrics, PageGeometry::a4(), LayoutStyle::default());
//! flow.render_tree(&["project/".to_string(), "    main.rs".to_string()]);
//! let pages = flow.finish().finish();
//! assert_eq!(pages.len(), 1);
//! ```

pub mod cli;
pub mod filter;
pub mod font;
pub mod layout;
pub mod page;
pub mod tree;
pub mod utils;
pub mod wrap;
pub mod writer;

pub use cli::Config;
pub use filter::PathFilter;
pub use font::{Font, resolve_font};
pub use layout::{Cursor, LayoutStyle, PageFlow, PageGeometry};
pub use page::{Canvas, DrawCommand, Page, PageRecorder};
pub use tree::{DirTree, build_tree};
pub use wrap::{FontMetrics, WrappedLine, wrap_indented, wrap_text};
pub use writer::PdfWriter;

use anyhow::Result;
use log::debug;
use std::path::Path;
use utils::to_slash_relative;

/// Generate a PDF of the project's tree and file contents.
///
/// The font is resolved before anything else, and the output file is written
/// only once everything has been laid out.
pub async fn run_code2pdf(config: Config) -> Result<()> {
    let font = resolve_font(config.font.as_deref())?;

    let mut filter = PathFilter::load(&config.project_root, config.ignore_file.as_deref())?;
    if let Some(rel) = output_rel_path(&config.project_root, &config.output_path) {
        debug!("Excluding output file from the listing: {rel}");
        filter = filter.with_excluded(rel);
    }

    let tree = build_tree(&config.project_root, &filter)?;

    let geometry = PageGeometry::a4();
    let style = LayoutStyle::new(config.font_size);
    let title = tree
        .entries
        .first()
        .map(|root| root.name.clone())
        .unwrap_or_default();

    let writer = PdfWriter::new(&title, geometry, &font)?;
    let mut flow = PageFlow::new(writer, &font, geometry, style);

    flow.render_tree(&tree.lines());
    flow.render_files(&config.project_root, &tree.file_paths).await;

    flow.finish().save(&config.output_path).await
}

/// The output path relative to the project root, if it lies inside it.
fn output_rel_path(project_root: &Path, output_path: &Path) -> Option<String> {
    let root = project_root.canonicalize().ok()?;
    let file_name = output_path.file_name()?;
    let parent = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.canonicalize().ok()?,
        _ => std::env::current_dir().ok()?,
    };

    let output = parent.join(file_name);
    output
        .starts_with(&root)
        .then(|| to_slash_relative(&output, &root))
}
