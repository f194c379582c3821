use crate::font::{BuiltinMono, Font};
use crate::layout::{MM, PageGeometry};
use crate::page::Canvas;
use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use std::path::Path;

const LAYER_NAME: &str = "Text";

/// Writes laid-out pages into a PDF document held in memory until [`PdfWriter::save`].
pub struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    layer: PdfLayerReference,
    geometry: PageGeometry,
    page_count: usize,
    /// Set when the current page was closed; the next one is created on first draw.
    page_pending: bool,
}

impl PdfWriter {
    pub fn new(title: &str, geometry: PageGeometry, font: &Font) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            to_mm(geometry.width),
            to_mm(geometry.height),
            LAYER_NAME,
        );

        let font_ref = match font {
            Font::Builtin(builtin) => doc.add_builtin_font(builtin_font(*builtin)),
            Font::TrueType(ttf) => doc.add_external_font(ttf.data()),
        }
        .map_err(|err| anyhow!("Failed to register font {}: {err:?}", font.name()))?;

        let layer = doc.get_page(page).get_layer(layer);
        debug!("Created PDF document '{title}' with font {}", font.name());

        Ok(Self {
            doc,
            font: font_ref,
            layer,
            geometry,
            page_count: 1,
            page_pending: false,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Serializes the document and writes it to `output_path`.
    pub async fn save(self, output_path: &Path) -> Result<()> {
        let page_count = self.page_count;
        let bytes = self
            .doc
            .save_to_bytes()
            .map_err(|err| anyhow!("Failed to serialize PDF: {err:?}"))?;

        tokio::fs::write(output_path, bytes)
            .await
            .with_context(|| format!("Failed to write output: {}", output_path.display()))?;

        info!("Wrote {page_count} page(s) to {}", output_path.display());
        Ok(())
    }

    fn start_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            to_mm(self.geometry.width),
            to_mm(self.geometry.height),
            LAYER_NAME,
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_count += 1;
        self.page_pending = false;
    }
}

impl Canvas for PdfWriter {
    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32) {
        if self.page_pending {
            self.start_page();
        }
        self.layer
            .use_text(text, font_size, to_mm(x), to_mm(y), &self.font);
    }

    fn show_page(&mut self) {
        self.page_pending = true;
    }
}

fn builtin_font(font: BuiltinMono) -> BuiltinFont {
    match font {
        BuiltinMono::Courier => BuiltinFont::Courier,
        BuiltinMono::CourierBold => BuiltinFont::CourierBold,
        BuiltinMono::CourierOblique => BuiltinFont::CourierOblique,
        BuiltinMono::CourierBoldOblique => BuiltinFont::CourierBoldOblique,
    }
}

fn to_mm(points: f32) -> Mm {
    Mm(points / MM)
}
