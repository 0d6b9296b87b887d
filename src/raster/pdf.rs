//! Paginated PDF output using `printpdf` (v0.8 ops-based API).
//!
//! Layout pixels are mapped to points at 0.75 pt/px times the layout's fit
//! scale, so an auto-fitted document still lands on an A4 page.
//!
//! Text whose family has a registered TTF/OTF face is written with that
//! face embedded, so any script the face covers survives. Other text falls
//! back to the builtin face for its family, which only covers Windows-1252.

use std::collections::{HashMap, HashSet};

use printpdf::*;

use super::{border_rects, dots, ExportFormat, RasterRequest, Rasterizer};
use crate::error::{Error, Result};
use crate::fonts::{FontKey, FontManager};
use crate::layout::decode_data_uri;
use crate::layout_config::{Fill, LayoutBox, LayoutConfig, TextContent};
use crate::staging::StagedDocument;

const PT_PER_PX: f32 = 0.75;
const MM_PER_PT: f32 = 0.352778;
/// Gradients are painted as this many flat bands.
const GRADIENT_STEPS: usize = 32;

#[derive(Clone, Default)]
pub struct PdfRasterizer {
    fonts: FontManager,
}

impl PdfRasterizer {
    pub fn new(fonts: FontManager) -> Self {
        Self { fonts }
    }
}

impl Rasterizer for PdfRasterizer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn rasterize(&self, staged: &StagedDocument, _request: &RasterRequest) -> Result<Vec<u8>> {
        render_pdf(&staged.layout, &self.fonts)
    }
}

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// One page of drawing ops with the px → pt mapping.
struct PageOps<'a> {
    ops: Vec<Op>,
    /// Points per layout pixel.
    k: f32,
    page_height_pt: f32,
    images: &'a HashMap<String, ImageResource>,
    faces: &'a HashMap<FontKey, FontId>,
}

/// Render a paginated layout into PDF bytes, one PDF page per layout page.
pub fn render_pdf(layout: &LayoutConfig, fonts: &FontManager) -> Result<Vec<u8>> {
    let k = PT_PER_PX * layout.scale;
    let page_width_pt = layout.page_width_px * k;
    let page_height_pt = layout.page_height_px * k;
    let page_w = Mm(page_width_pt * MM_PER_PT);
    let page_h = Mm(page_height_pt * MM_PER_PT);

    let mut doc = PdfDocument::new(&layout.title);
    let images = register_images(&mut doc, layout);
    let faces = register_faces(&mut doc, layout, fonts);

    let mut pages: Vec<PdfPage> = layout
        .pages
        .iter()
        .map(|page| {
            let mut canvas = PageOps {
                ops: Vec::new(),
                k,
                page_height_pt,
                images: &images,
                faces: &faces,
            };
            for lbox in &page.boxes {
                canvas.paint(lbox);
            }
            PdfPage::new(page_w, page_h, canvas.ops)
        })
        .collect();
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());
    if bytes.is_empty() {
        return Err(Error::Raster("PDF writer produced no output".to_string()));
    }
    log::debug!("wrote {} PDF page(s), {} bytes", layout.pages.len().max(1), bytes.len());
    Ok(bytes)
}

fn register_images(doc: &mut PdfDocument, layout: &LayoutConfig) -> HashMap<String, ImageResource> {
    let srcs: HashSet<&str> = layout
        .pages
        .iter()
        .flat_map(|p| &p.boxes)
        .filter_map(|b| b.image.as_ref().map(|i| i.src.as_str()))
        .collect();

    let mut resources = HashMap::new();
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    for src in srcs {
        let Some(bytes) = decode_data_uri(src) else {
            log::warn!("skipping image: not a base64 data URI");
            continue;
        };
        let (px_width, px_height) = match ::image::load_from_memory(&bytes) {
            Ok(img) => (img.width(), img.height()),
            Err(e) => {
                log::warn!("skipping image: decode error: {e}");
                continue;
            }
        };
        let raw = match RawImage::decode_from_bytes(&bytes, &mut warnings) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("skipping image: PDF encode error: {e}");
                continue;
            }
        };
        let xobj_id = doc.add_image(&raw);
        resources.insert(
            src.to_string(),
            ImageResource {
                xobj_id,
                px_width,
                px_height,
            },
        );
    }
    resources
}

/// Embed a face for every text style in the layout that has one registered.
fn register_faces(doc: &mut PdfDocument, layout: &LayoutConfig, fonts: &FontManager) -> HashMap<FontKey, FontId> {
    let keys: HashSet<FontKey> = layout
        .pages
        .iter()
        .flat_map(|p| &p.boxes)
        .filter_map(|b| b.text.as_ref())
        .map(|t| FontKey::new(&t.font_family, t.bold, t.italic))
        .collect();

    let mut faces = HashMap::new();
    // Keys that resolve to the same face share one embedded copy.
    let mut embedded: HashMap<*const u8, FontId> = HashMap::new();
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    for key in keys {
        let Some(data) = fonts.face_for(&key) else {
            continue;
        };
        let id = match embedded.get(&data.bytes.as_ptr()) {
            Some(id) => id.clone(),
            None => {
                let Some(parsed) = ParsedFont::from_bytes(&data.bytes, 0, &mut warnings) else {
                    log::warn!("could not embed face for {}; using a builtin font", key.family);
                    continue;
                };
                let id = doc.add_font(&parsed);
                embedded.insert(data.bytes.as_ptr(), id.clone());
                id
            }
        };
        faces.insert(key, id);
    }
    if !embedded.is_empty() {
        log::debug!("embedded {} font face(s)", embedded.len());
    }
    faces
}

fn rgb(c: [f32; 4]) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

fn corner(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

impl PageOps<'_> {
    fn paint(&mut self, lbox: &LayoutBox) {
        if let Some(fill) = &lbox.background {
            self.fill(lbox, fill);
        }
        if let Some(border) = &lbox.border {
            for side in border_rects(lbox) {
                if border.dotted {
                    for dot in dots(side) {
                        self.rect(dot, border.color);
                    }
                } else {
                    self.rect(side, border.color);
                }
            }
        }
        if let Some(text) = &lbox.text {
            self.text(lbox, text);
        }
        if let Some(img) = &lbox.image {
            if let Some(res) = self.images.get(&img.src) {
                let bottom = self.page_height_pt - (lbox.y + img.height) * self.k;
                self.ops.push(Op::UseXobject {
                    id: res.xobj_id.clone(),
                    transform: XObjectTransform {
                        translate_x: Some(Pt(lbox.x * self.k)),
                        translate_y: Some(Pt(bottom)),
                        // At 72 dpi one image pixel is one point.
                        dpi: Some(72.0),
                        scale_x: Some(img.width * self.k / res.px_width.max(1) as f32),
                        scale_y: Some(img.height * self.k / res.px_height.max(1) as f32),
                        rotate: None,
                    },
                });
            }
        }
    }

    fn fill(&mut self, lbox: &LayoutBox, fill: &Fill) {
        let (x, y, w, h) = (lbox.x, lbox.y, lbox.width, lbox.height);
        match *fill {
            Fill::Solid { color } => self.rect([x, y, w, h], color),
            Fill::Split { left, right, at } => {
                self.rect([x, y, w * at, h], left);
                self.rect([x + w * at, y, w * (1.0 - at), h], right);
            }
            Fill::Linear { vertical, .. } => {
                let step = 1.0 / GRADIENT_STEPS as f32;
                for i in 0..GRADIENT_STEPS {
                    let t = i as f32 * step;
                    let color = fill.sample(t + step / 2.0);
                    // Bands overlap slightly to avoid hairline seams.
                    let band = if vertical {
                        [x, y + h * t, w, h * step + 0.5]
                    } else {
                        [x + w * t, y, w * step + 0.5, h]
                    };
                    self.rect(band, color);
                }
            }
        }
    }

    /// Filled rectangle given in layout px, top-left origin.
    fn rect(&mut self, [x, y, w, h]: [f32; 4], color: [f32; 4]) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let x1 = x * self.k;
        let x2 = (x + w) * self.k;
        let y2 = self.page_height_pt - y * self.k;
        let y1 = self.page_height_pt - (y + h) * self.k;
        self.ops.push(Op::SetFillColor { col: rgb(color) });
        self.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: vec![corner(x1, y1), corner(x2, y1), corner(x2, y2), corner(x1, y2)],
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    fn text(&mut self, lbox: &LayoutBox, text: &TextContent) {
        let face = self
            .faces
            .get(&FontKey::new(&text.font_family, text.bold, text.italic))
            .cloned();
        let font = builtin_font(&text.font_family, text.bold, text.italic);
        for line in text.lines.iter().filter(|l| !l.text.trim().is_empty()) {
            let baseline = lbox.y + line.y_offset + text.ascent;
            self.ops.push(Op::StartTextSection);
            self.ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt((lbox.x + line.x_offset) * self.k),
                    y: Pt(self.page_height_pt - baseline * self.k),
                },
            });
            let size = Pt(text.font_size * self.k);
            match &face {
                Some(id) => self.ops.push(Op::SetFontSize { size, font: id.clone() }),
                None => self.ops.push(Op::SetFontSizeBuiltinFont { size, font }),
            }
            self.ops.push(Op::SetLineHeight {
                lh: Pt(text.line_height * self.k),
            });
            self.ops.push(Op::SetFillColor { col: rgb(text.color) });
            match &face {
                Some(id) => self.ops.push(Op::WriteText {
                    items: vec![TextItem::Text(line.text.clone())],
                    font: id.clone(),
                }),
                None => self.ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(to_winlatin(&line.text))],
                    font,
                }),
            }
            self.ops.push(Op::EndTextSection);
        }
    }
}

/// The builtin face standing in for a paint family.
fn builtin_font(family: &str, bold: bool, italic: bool) -> BuiltinFont {
    match (family, bold, italic) {
        ("Times", true, true) => BuiltinFont::TimesBoldItalic,
        ("Times", true, false) => BuiltinFont::TimesBold,
        ("Times", false, true) => BuiltinFont::TimesItalic,
        ("Times", false, false) => BuiltinFont::TimesRoman,
        ("Courier", true, true) => BuiltinFont::CourierBoldOblique,
        ("Courier", true, false) => BuiltinFont::CourierBold,
        ("Courier", false, true) => BuiltinFont::CourierOblique,
        ("Courier", false, false) => BuiltinFont::Courier,
        (_, true, true) => BuiltinFont::HelveticaBoldOblique,
        (_, true, false) => BuiltinFont::HelveticaBold,
        (_, false, true) => BuiltinFont::HelveticaOblique,
        (_, false, false) => BuiltinFont::Helvetica,
    }
}

/// Re-encode text as Windows-1252 bytes carried in a `String`; builtin
/// fonts use WinAnsiEncoding and printpdf copies the bytes into the content
/// stream unchanged. Characters outside the code page become `?`.
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            '\u{00A0}' => 0x20,
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: the string is never inspected as UTF-8 again; printpdf writes
    // its bytes straight into the PDF stream.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_config::{BorderStyle, PageLayout, TextLine};

    fn label(text: &str, family: &str) -> LayoutBox {
        let mut lbox = LayoutBox::new(40.0, 40.0, 300.0, 20.0);
        lbox.text = Some(TextContent {
            lines: vec![TextLine {
                text: text.into(),
                x_offset: 0.0,
                y_offset: 0.0,
            }],
            font_family: family.into(),
            font_size: 16.0,
            bold: false,
            italic: false,
            color: [0.0, 0.0, 0.0, 1.0],
            line_height: 24.0,
            ascent: 16.0,
        });
        lbox
    }

    /// A system face with broad coverage, when the host has one installed.
    fn system_face() -> Option<Vec<u8>> {
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/Library/Fonts/Arial Unicode.ttf",
        ]
        .iter()
        .find_map(|p| std::fs::read(p).ok())
    }

    fn page(boxes: Vec<LayoutBox>) -> LayoutConfig {
        let mut layout = LayoutConfig::new(794.0, 1123.0, 1.0);
        layout.pages.push(PageLayout { page_index: 0, boxes });
        layout
    }

    #[test]
    fn empty_layout_still_has_a_page() {
        let bytes = render_pdf(&LayoutConfig::new(794.0, 1123.0, 1.0), &FontManager::default()).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn paints_fills_borders_and_text() {
        let mut panel = LayoutBox::new(0.0, 0.0, 794.0, 200.0);
        panel.background = Some(Fill::Linear {
            vertical: false,
            from: [0.1, 0.2, 0.9, 1.0],
            to: [0.5, 0.1, 0.8, 1.0],
        });
        panel.border = Some(BorderStyle {
            bottom: 1.0,
            color: [0.0, 0.0, 0.0, 1.0],
            dotted: true,
            ..BorderStyle::default()
        });
        let mut label = LayoutBox::new(40.0, 40.0, 300.0, 20.0);
        label.text = Some(TextContent {
            lines: vec![TextLine {
                text: "Total €1,000.00".into(),
                x_offset: 0.0,
                y_offset: 0.0,
            }],
            font_family: "Times".into(),
            font_size: 20.0,
            bold: true,
            italic: false,
            color: [0.0, 0.0, 0.0, 1.0],
            line_height: 28.0,
            ascent: 19.0,
        });
        let bytes = render_pdf(&page(vec![panel, label]), &FontManager::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn latin_text_is_recoded_for_builtin_fonts() {
        assert_eq!(to_winlatin("Café €5").as_bytes(), b"Caf\xe9 \x805");
        assert_eq!(to_winlatin("株式会社"), "????");
    }

    #[test]
    fn builtin_fonts_are_used_without_registered_faces() {
        let layout = page(vec![label("株式会社", "Helvetica")]);
        let mut doc = PdfDocument::new("t");
        assert!(register_faces(&mut doc, &layout, &FontManager::default()).is_empty());
        assert!(render_pdf(&layout, &FontManager::default()).unwrap().starts_with(b"%PDF-"));
    }

    #[test]
    fn registered_faces_are_embedded_once() {
        let Some(bytes) = system_face() else {
            return;
        };
        let mut fonts = FontManager::default();
        fonts.load_fallback(bytes).unwrap();
        let layout = page(vec![label("Ελληνικά", "Helvetica"), label("Courier", "Courier")]);

        let mut doc = PdfDocument::new("t");
        let faces = register_faces(&mut doc, &layout, &fonts);
        assert_eq!(faces.len(), 2);
        assert_eq!(
            faces[&FontKey::new("Helvetica", false, false)],
            faces[&FontKey::new("Courier", false, false)]
        );

        let plain = render_pdf(&layout, &FontManager::default()).unwrap();
        let embedded = render_pdf(&layout, &fonts).unwrap();
        assert!(embedded.len() > plain.len());
    }

    #[test]
    fn fitted_layouts_keep_a4_size() {
        let layout = LayoutConfig::new(794.0 / 0.9, 1123.0 / 0.9, 0.9);
        let k = PT_PER_PX * layout.scale;
        assert!((layout.page_width_px * k - 595.5).abs() < 0.1);
        assert!((layout.page_height_px * k - 842.25).abs() < 0.1);
    }

    #[test]
    fn font_families_map_to_builtins() {
        assert!(matches!(builtin_font("Courier", false, false), BuiltinFont::Courier));
        assert!(matches!(builtin_font("Times", true, true), BuiltinFont::TimesBoldItalic));
        assert!(matches!(builtin_font("Helvetica", true, false), BuiltinFont::HelveticaBold));
    }
}
