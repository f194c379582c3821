//! Page flow: turns tree lines and file contents into positioned text on pages.
//!
//! A single [`Cursor`] walks down the page. Every draw advances it, and once it
//! drops below the bottom margin the page is closed and the cursor jumps back
//! to the same top-of-content line.

use crate::page::Canvas;
use crate::utils::expand_tabs;
use crate::wrap::{FontMetrics, wrap_indented};
use content_inspector::{ContentType, inspect};
use log::{debug, info, warn};
use std::fmt::Display;
use std::io;
use std::path::Path;

/// Points per millimetre.
pub const MM: f32 = 72.0 / 25.4;

/// Drawn in place of the content of files that look binary.
pub const BINARY_MARKER: &str = "(binary file omitted)";

/// Page size and margins, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl PageGeometry {
    /// A4 portrait with text starting 20 mm from the left and a 50 mm band
    /// kept free at the top and bottom.
    pub fn a4() -> Self {
        Self {
            width: 210.0 * MM,
            height: 297.0 * MM,
            margin_left: 20.0 * MM,
            margin_right: 20.0 * MM,
            margin_top: 50.0 * MM,
            margin_bottom: 50.0 * MM,
        }
    }

    /// The y every page starts at.
    pub fn top_of_content(&self) -> f32 {
        self.height - self.margin_top
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Font sizes and vertical spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStyle {
    pub font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
    /// Added to the base size for file headings.
    pub heading_increase: f32,
    /// Space below a heading as a multiple of the heading size.
    pub heading_spacing: f32,
    /// Space after each file as a multiple of the base size.
    pub file_gap: f32,
    pub tab_width: usize,
    /// Width of one leading space of indentation. Measured from the font when unset.
    pub indent_per_space: Option<f32>,
}

impl LayoutStyle {
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            line_spacing: 1.2,
            heading_increase: 2.0,
            heading_spacing: 1.5,
            file_gap: 2.0,
            tab_width: 4,
            indent_per_space: None,
        }
    }

    pub fn line_height(&self) -> f32 {
        self.font_size * self.line_spacing
    }

    pub fn heading_size(&self) -> f32 {
        self.font_size + self.heading_increase
    }
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self::new(10.0)
    }
}

/// Current drawing position on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
}

/// Lays text out onto a [`Canvas`], breaking pages as the cursor runs out of room.
pub struct PageFlow<'m, C, M>
where
    C: Canvas,
    M: FontMetrics + ?Sized,
{
    canvas: C,
    metrics: &'m M,
    geometry: PageGeometry,
    style: LayoutStyle,
    cursor: Cursor,
    page_has_content: bool,
}

impl<'m, C, M> PageFlow<'m, C, M>
where
    C: Canvas,
    M: FontMetrics + ?Sized,
{
    pub fn new(canvas: C, metrics: &'m M, geometry: PageGeometry, style: LayoutStyle) -> Self {
        let cursor = Cursor {
            x: geometry.margin_left,
            y: geometry.top_of_content(),
        };
        Self {
            canvas,
            metrics,
            geometry,
            style,
            cursor,
            page_has_content: false,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Draws one line at the base size and moves down a line.
    pub fn draw_line(&mut self, text: &str, indent: f32) {
        self.draw_text(text, indent, self.style.font_size);
        self.advance(self.style.line_height());
    }

    /// Moves the cursor down by `dy`, breaking the page if it passes the bottom margin.
    pub fn advance(&mut self, dy: f32) {
        self.cursor.y -= dy;
        if self.cursor.y < self.geometry.margin_bottom {
            self.new_page();
        }
    }

    /// Closes the current page and resets the cursor to the top of the next one.
    pub fn new_page(&mut self) {
        self.canvas.show_page();
        self.cursor.y = self.geometry.top_of_content();
        self.page_has_content = false;
    }

    /// Draws the directory listing, then starts a fresh page for the files.
    pub fn render_tree(&mut self, lines: &[String]) {
        for line in lines {
            self.draw_line(line, 0.0);
        }
        if self.page_has_content {
            self.new_page();
        }
        info!("Directory tree drawn ({} lines)", lines.len());
    }

    /// Draws a file heading at the heading size followed by its spacing.
    pub fn draw_heading(&mut self, title: &str) {
        let size = self.style.heading_size();
        self.draw_text(title, 0.0, size);
        self.advance(size * self.style.heading_spacing);
    }

    /// Draws file content line by line, wrapping long lines under their indentation.
    ///
    /// A blank line moves the cursor down without drawing anything.
    pub fn render_text(&mut self, content: &str) {
        let font_size = self.style.font_size;
        let max_width = self.geometry.content_width();
        let indent_per_space = self
            .style
            .indent_per_space
            .unwrap_or_else(|| self.metrics.text_width(" ", font_size));

        for line in content.lines() {
            let line = expand_tabs(line.trim_end(), self.style.tab_width);
            let wrapped = wrap_indented(&line, max_width, font_size, indent_per_space, self.metrics);

            if wrapped.is_empty() {
                self.advance(self.style.line_height());
                continue;
            }
            for piece in wrapped {
                self.draw_line(&piece.text, piece.indent);
            }
        }
    }

    /// Draws the single line that replaces the content of an unreadable file.
    pub fn draw_read_error(&mut self, err: impl Display) {
        self.draw_line(&format!("Error reading file: {err}"), 0.0);
    }

    /// Adds the gap that separates one file from the next.
    pub fn end_file(&mut self) {
        self.advance(self.style.font_size * self.style.file_gap);
    }

    /// Draws every file under `root` in order: heading, content, gap.
    ///
    /// Files that cannot be read get an error line instead of content; the
    /// remaining files are still drawn.
    pub async fn render_files(&mut self, root: &Path, rel_paths: &[String]) {
        for rel_path in rel_paths {
            self.render_file(root, rel_path).await;
        }
        info!("Rendered {} file(s)", rel_paths.len());
    }

    async fn render_file(&mut self, root: &Path, rel_path: &str) {
        debug!("Rendering file: {rel_path}");
        self.draw_heading(rel_path);

        match read_source(&root.join(rel_path)).await {
            Ok(Source::Text(content)) => self.render_text(&content),
            Ok(Source::Binary) => self.draw_line(BINARY_MARKER, 0.0),
            Err(err) => {
                warn!("Could not read {rel_path}: {err}");
                self.draw_read_error(err);
            }
        }

        self.end_file();
    }

    /// Hands back the canvas once drawing is done.
    pub fn finish(self) -> C {
        self.canvas
    }

    fn draw_text(&mut self, text: &str, indent: f32, font_size: f32) {
        self.canvas
            .draw_text(text, self.cursor.x + indent, self.cursor.y, font_size);
        self.page_has_content = true;
    }
}

enum Source {
    Text(String),
    Binary,
}

async fn read_source(path: &Path) -> io::Result<Source> {
    let bytes = tokio::fs::read(path).await?;

    let sample_size = std::cmp::min(8192, bytes.len());
    if inspect(&bytes[..sample_size]) == ContentType::BINARY {
        return Ok(Source::Binary);
    }

    String::from_utf8(bytes)
        .map(Source::Text)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Page, PageRecorder};

    /// Half an em per char keeps test widths exact.
    fn mono(text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.5
    }

    static MONO: fn(&str, f32) -> f32 = mono;

    fn flow(recorder: PageRecorder) -> PageFlow<'static, PageRecorder, fn(&str, f32) -> f32> {
        PageFlow::new(recorder, &MONO, PageGeometry::a4(), LayoutStyle::default())
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn test_cursor_starts_at_top_left() {
        let flow = flow(PageRecorder::new());
        let geometry = PageGeometry::a4();
        assert_eq!(flow.cursor().x, geometry.margin_left);
        assert_eq!(flow.cursor().y, geometry.top_of_content());
    }

    #[test]
    fn test_draw_line_advances_by_line_height() {
        let mut flow = flow(PageRecorder::new());
        let start = flow.cursor().y;
        flow.draw_line("hello", 0.0);
        assert!(close(start - flow.cursor().y, 12.0));
    }

    #[test]
    fn test_page_break_resets_to_same_top() {
        let mut flow = flow(PageRecorder::new());
        let top = flow.geometry().top_of_content();
        let bottom = flow.geometry().margin_bottom;

        let mut breaks = 0;
        for i in 0..200 {
            let before = flow.cursor().y;
            flow.draw_line(&format!("{i}"), 0.0);
            let after = flow.cursor().y;
            assert!(after >= bottom);
            if after > before {
                breaks += 1;
                assert_eq!(after, top);
            }
        }
        assert!(breaks >= 3);

        let pages = flow.finish().finish();
        for page in &pages {
            assert_eq!(page.commands[0].y, top);
            assert!(page.commands.iter().all(|c| c.y >= bottom));
        }
    }

    #[test]
    fn test_large_advance_breaks_page() {
        let mut flow = flow(PageRecorder::new());
        flow.draw_line("x", 0.0);
        flow.advance(10_000.0);
        assert_eq!(flow.cursor().y, flow.geometry().top_of_content());
    }

    #[test]
    fn test_tree_forces_fresh_page() {
        let mut flow = flow(PageRecorder::new());
        flow.render_tree(&lines(3));
        assert_eq!(flow.cursor().y, flow.geometry().top_of_content());
        flow.draw_heading("a.py");

        let pages = flow.finish().finish();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].texts(), vec!["line 0", "line 1", "line 2"]);
        assert_eq!(pages[1].texts(), vec!["a.py"]);
        assert_eq!(pages[1].commands[0].font_size, 12.0);
    }

    #[test]
    fn test_tree_filling_a_page_adds_no_blank_page() {
        let mut flow = flow(PageRecorder::new());
        let per_page = ((flow.geometry().top_of_content() - flow.geometry().margin_bottom) / 12.0)
            .floor() as usize
            + 1;
        flow.render_tree(&lines(per_page));
        flow.draw_heading("next");

        let pages: Vec<Page> = flow.finish().finish();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].commands.len(), per_page);
        assert_eq!(pages[1].texts(), vec!["next"]);
    }

    #[test]
    fn test_tree_lines_keep_baked_indent() {
        let mut flow = flow(PageRecorder::new());
        flow.render_tree(&["root/".to_string(), "    a.py".to_string()]);
        let pages = flow.finish().finish();
        let left = PageGeometry::a4().margin_left;
        assert!(pages[0].commands.iter().all(|c| c.x == left));
        assert_eq!(pages[0].commands[1].text, "    a.py");
    }

    #[test]
    fn test_long_line_is_wrapped_under_indent() {
        let mut flow = flow(PageRecorder::new());
        let long = format!("    {}", vec!["word"; 60].join(" "));
        flow.render_text(&long);

        let pages = flow.finish().finish();
        let commands = &pages[0].commands;
        let geometry = PageGeometry::a4();

        assert!(commands.len() >= 2);
        for cmd in commands {
            assert!(close(cmd.x, geometry.margin_left + 20.0));
            assert!(20.0 + mono(&cmd.text, 10.0) <= geometry.content_width());
        }
    }

    #[test]
    fn test_deeply_indented_line_stays_on_page() {
        let mut flow = flow(PageRecorder::new());
        let deep = format!("{}x = call(argument_one, argument_two)", " ".repeat(100));
        flow.render_text(&deep);

        let pages = flow.finish().finish();
        let geometry = PageGeometry::a4();
        let right_edge = geometry.width - geometry.margin_right;

        assert!(!pages[0].commands.is_empty());
        for cmd in &pages[0].commands {
            assert!(cmd.x < right_edge, "{:?} drawn at x={}", cmd.text, cmd.x);
        }
        assert_eq!(
            pages[0].texts().join(" "),
            "x = call(argument_one, argument_two)"
        );
    }

    #[test]
    fn test_blank_lines_take_space() {
        let mut flow = flow(PageRecorder::new());
        let start = flow.cursor().y;
        flow.render_text("a\n\n\nb\n");

        let pages = flow.finish().finish();
        let commands = &pages[0].commands;
        assert_eq!(commands.len(), 2);
        assert!(close(commands[0].y, start));
        assert!(close(commands[0].y - commands[1].y, 36.0));
    }

    #[test]
    fn test_tabs_become_indentation() {
        let mut flow = flow(PageRecorder::new());
        flow.render_text("\tindented");
        let pages = flow.finish().finish();
        assert!(close(pages[0].commands[0].x, PageGeometry::a4().margin_left + 20.0));
        assert_eq!(pages[0].commands[0].text, "indented");
    }

    #[test]
    fn test_read_error_line() {
        let mut flow = flow(PageRecorder::new());
        let start = flow.cursor().y;
        flow.draw_read_error("gone");
        assert!(close(start - flow.cursor().y, 12.0));
        let pages = flow.finish().finish();
        assert_eq!(pages[0].texts(), vec!["Error reading file: gone"]);
    }

    #[tokio::test]
    async fn test_render_files_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ok.txt"), "fine\n").unwrap();

        let mut flow = flow(PageRecorder::new());
        let paths = vec!["missing.txt".to_string(), "ok.txt".to_string()];
        flow.render_files(dir.path(), &paths).await;

        let pages = flow.finish().finish();
        let texts = pages[0].texts();
        assert_eq!(texts[0], "missing.txt");
        assert!(texts[1].starts_with("Error reading file: "));
        assert_eq!(&texts[2..], &["ok.txt", "fine"]);
    }

    #[tokio::test]
    async fn test_render_files_marks_binary() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blob.bin"), [0u8, 159, 146, 150, 0, 1]).unwrap();

        let mut flow = flow(PageRecorder::new());
        flow.render_files(dir.path(), &["blob.bin".to_string()]).await;

        let pages = flow.finish().finish();
        assert_eq!(pages[0].texts(), vec!["blob.bin", BINARY_MARKER]);
    }
}
