//! Greedy word wrapping against measured text width.

/// Measures rendered text width. Units are whatever the layout uses (points).
pub trait FontMetrics {
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

impl<F> FontMetrics for F
where
    F: Fn(&str, f32) -> f32,
{
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        self(text, font_size)
    }
}

/// A wrapped piece of a source line, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    /// Horizontal offset from the left margin.
    pub indent: f32,
    pub font_size: f32,
}

/// Splits `line` on whitespace into lines no wider than `max_width`.
///
/// A word that is wider than `max_width` by itself is kept whole on its own
/// line. Blank input yields nothing.
pub fn wrap_text<M>(line: &str, max_width: f32, font_size: f32, metrics: &M) -> Vec<String>
where
    M: FontMetrics + ?Sized,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{current} {word}");
        if metrics.text_width(&candidate, font_size) > max_width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wraps `line` keeping its leading indentation.
///
/// Every piece is shifted right by the width of the leading spaces, so
/// continuation lines sit under the first one instead of the margin. The shift
/// never exceeds half of `max_width`, so deeply indented text stays on the page.
pub fn wrap_indented<M>(
    line: &str,
    max_width: f32,
    font_size: f32,
    indent_per_space: f32,
    metrics: &M,
) -> Vec<WrappedLine>
where
    M: FontMetrics + ?Sized,
{
    let leading = line.chars().take_while(|c| *c == ' ').count();
    let indent = (leading as f32 * indent_per_space).min(max_width * 0.5);
    let available = (max_width - indent).max(0.0);

    wrap_text(line, available, font_size, metrics)
        .into_iter()
        .map(|text| WrappedLine {
            text,
            indent,
            font_size,
        })
        .collect()
}
