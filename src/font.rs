//! Font resolution and width metrics.
//!
//! A font is either one of the PDF built-in Courier faces or a TrueType/OpenType
//! file that gets embedded. Both can be measured, which is all the layout needs.

use crate::wrap::FontMetrics;
use anyhow::{Context, Result, bail};
use ignore::WalkBuilder;
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use ttf_parser::{Face, GlyphId};

/// Font file expected in the executable's directory when no font is requested.
pub const DEFAULT_FONT_FILE: &str = "DejaVuSansMono.ttf";

/// Advance of every Courier glyph, in em.
const COURIER_ADVANCE: f32 = 0.6;

/// The built-in monospace faces every PDF reader ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinMono {
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl BuiltinMono {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "courier" => Some(Self::Courier),
            "courier-bold" => Some(Self::CourierBold),
            "courier-oblique" => Some(Self::CourierOblique),
            "courier-boldoblique" => Some(Self::CourierBoldOblique),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }
}

/// A font file loaded into memory, with its horizontal advances read up front.
pub struct TrueTypeFont {
    name: String,
    data: Vec<u8>,
    units_per_em: f32,
    advances: HashMap<char, u16>,
    notdef_advance: u16,
}

impl TrueTypeFont {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read font file: {}", path.display()))?;
        let face = Face::parse(&data, 0)
            .with_context(|| format!("Not a usable font file: {}", path.display()))?;
        let units_per_em = f32::from(face.units_per_em());
        let notdef_advance = face.glyph_hor_advance(GlyphId(0)).unwrap_or(0);
        let advances = unicode_advances(&face);

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "font".to_string());

        debug!(
            "Loaded {name} ({} bytes, {units_per_em} units/em, {} chars)",
            data.len(),
            advances.len()
        );

        Ok(Self {
            name,
            data,
            units_per_em,
            advances,
            notdef_advance,
        })
    }

    /// Raw font program, as embedded into the PDF.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the font maps `c` to a glyph of its own.
    pub fn has_glyph(&self, c: char) -> bool {
        self.advances.contains_key(&c)
    }

    /// Unmapped chars are drawn as `.notdef` and measured as such.
    fn advance_units(&self, text: &str) -> f32 {
        text.chars()
            .map(|c| self.advances.get(&c).copied().unwrap_or(self.notdef_advance))
            .map(f32::from)
            .sum()
    }
}

/// Advance of every char reachable through the Unicode cmap subtables.
fn unicode_advances(face: &Face<'_>) -> HashMap<char, u16> {
    let mut advances = HashMap::new();
    let Some(cmap) = face.tables().cmap else {
        return advances;
    };

    for subtable in cmap.subtables.into_iter().filter(|t| t.is_unicode()) {
        subtable.codepoints(|code_point| {
            let Some(c) = char::from_u32(code_point) else {
                return;
            };
            if advances.contains_key(&c) {
                return;
            }
            if let Some(advance) = subtable
                .glyph_index(code_point)
                .and_then(|id| face.glyph_hor_advance(id))
            {
                advances.insert(c, advance);
            }
        });
    }
    advances
}

/// A resolved font, usable for both drawing and measuring.
pub enum Font {
    Builtin(BuiltinMono),
    TrueType(TrueTypeFont),
}

impl Font {
    pub fn name(&self) -> &str {
        match self {
            Font::Builtin(builtin) => builtin.name(),
            Font::TrueType(font) => &font.name,
        }
    }
}

impl FontMetrics for Font {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        match self {
            Font::Builtin(_) => text.chars().count() as f32 * COURIER_ADVANCE * font_size,
            Font::TrueType(font) => font.advance_units(text) / font.units_per_em * font_size,
        }
    }
}

/// Resolves a font by built-in name, file path, or file name in the usual font
/// directories.
///
/// Without a request, [`DEFAULT_FONT_FILE`] next to the executable is required.
/// Courier only covers WinAnsi text, so it is used only when asked for by name.
pub fn resolve_font(request: Option<&str>) -> Result<Font> {
    let Some(request) = request else {
        return default_font(exe_dir().as_deref());
    };

    if let Some(builtin) = BuiltinMono::from_name(request) {
        info!("Using built-in font: {}", builtin.name());
        return Ok(Font::Builtin(builtin));
    }

    let path = Path::new(request);
    if path.is_file() {
        info!("Using font: {}", path.display());
        return Ok(Font::TrueType(TrueTypeFont::load(path)?));
    }

    match find_font_file(request) {
        Some(found) => {
            info!("Using font: {}", found.display());
            Ok(Font::TrueType(TrueTypeFont::load(&found)?))
        }
        None => bail!("Font not found: {request}"),
    }
}

fn default_font(dir: Option<&Path>) -> Result<Font> {
    let Some(path) = dir
        .map(|d| d.join(DEFAULT_FONT_FILE))
        .filter(|p| p.is_file())
    else {
        bail!(
            "Font not found: {DEFAULT_FONT_FILE} (place it next to the executable, or pass --font)"
        );
    };

    info!("Using font: {}", path.display());
    Ok(Font::TrueType(TrueTypeFont::load(&path)?))
}

/// Looks for `<name>.ttf` or `<name>.otf` (case-insensitive) in the font directories.
fn find_font_file(name: &str) -> Option<PathBuf> {
    let wanted: Vec<String> = ["ttf", "otf"]
        .iter()
        .map(|ext| format!("{name}.{ext}").to_lowercase())
        .collect();

    for dir in font_dirs().into_iter().filter(|d| d.is_dir()) {
        debug!("Searching fonts in {}", dir.display());
        let walker = WalkBuilder::new(&dir)
            .standard_filters(false)
            .follow_links(true)
            .build();

        for entry in walker.flatten() {
            let file_name = entry.file_name().to_string_lossy().to_lowercase();
            if wanted.contains(&file_name) && entry.path().is_file() {
                return Some(entry.into_path());
            }
        }
    }
    None
}

fn font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = exe_dir().into_iter().collect();
    dirs.extend(
        [
            "/usr/share/fonts",
            "/usr/local/share/fonts",
            "/Library/Fonts",
            "/System/Library/Fonts",
        ]
        .into_iter()
        .map(PathBuf::from),
    );

    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    if let Some(windir) = std::env::var_os("WINDIR").map(PathBuf::from) {
        dirs.push(windir.join("Fonts"));
    }
    dirs
}

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}
