//! Drawing surface abstraction and an in-memory page recorder.

/// Something the page flow can draw text on.
///
/// Coordinates are in points with the origin at the bottom-left corner of the
/// page, as in PDF.
pub trait Canvas {
    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32);

    /// Closes the current page. A page that never receives any text is not
    /// emitted.
    fn show_page(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub commands: Vec<DrawCommand>,
}

impl Page {
    pub fn texts(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.text.as_str()).collect()
    }
}

/// Records draw commands page by page instead of rendering them.
#[derive(Debug, Default)]
pub struct PageRecorder {
    pages: Vec<Page>,
    current: Page,
}

impl PageRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes the last page and returns every page drawn.
    pub fn finish(mut self) -> Vec<Page> {
        self.show_page();
        self.pages
    }
}

impl Canvas for PageRecorder {
    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32) {
        self.current.commands.push(DrawCommand {
            text: text.to_string(),
            x,
            y,
            font_size,
        });
    }

    fn show_page(&mut self) {
        if !self.current.commands.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
    }
}
