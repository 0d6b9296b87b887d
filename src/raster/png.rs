//! Raster image output: every page painted onto one tall RGBA canvas with
//! the `image` crate.
//!
//! Glyphs are filled from `ttf-parser` outlines, so text only appears when
//! the [`FontManager`] holds a real face.

use std::collections::HashMap;
use std::io::Cursor;

use image::{imageops, DynamicImage, ImageFormat, Pixel, Rgba, RgbaImage};

use super::{border_rects, decode_images, dots, ExportFormat, RasterRequest, Rasterizer};
use crate::error::{Error, Result};
use crate::fonts::{FontKey, FontManager};
use crate::layout_config::{Fill, LayoutBox, LayoutConfig, TextContent};
use crate::staging::StagedDocument;

/// Vertical sub-samples per pixel row when filling glyphs.
const SUBROWS: usize = 4;

#[derive(Clone, Default)]
pub struct PngRasterizer {
    fonts: FontManager,
}

impl PngRasterizer {
    pub fn new(fonts: FontManager) -> Self {
        Self { fonts }
    }
}

impl Rasterizer for PngRasterizer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Png
    }

    fn rasterize(&self, staged: &StagedDocument, request: &RasterRequest) -> Result<Vec<u8>> {
        let canvas = render_canvas(&staged.layout, request.raster_scale, &self.fonts)?;
        let mut out = Cursor::new(Vec::new());
        canvas
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| Error::Raster(format!("PNG encoding: {e}")))?;
        Ok(out.into_inner())
    }
}

/// Paint all pages top to bottom at `raster_scale` device px per page px.
pub fn render_canvas(layout: &LayoutConfig, raster_scale: f32, fonts: &FontManager) -> Result<RgbaImage> {
    let k = layout.scale * raster_scale;
    let page_h = (layout.page_height_px * k).round() as u32;
    let width = (layout.page_width_px * k).round() as u32;
    let height = page_h * layout.pages.len().max(1) as u32;
    if width == 0 || height == 0 {
        return Err(Error::Raster(format!("empty canvas {width}x{height}")));
    }

    if !fonts.has_real_fonts() && layout.pages.iter().flat_map(|p| &p.boxes).any(|b| b.text.is_some()) {
        log::warn!("no font file registered; text is omitted from the image");
    }

    let images = decode_images(layout);
    let mut painter = Painter {
        canvas: RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
        k,
        origin_y: 0.0,
        fonts,
        images: &images,
    };
    for (i, page) in layout.pages.iter().enumerate() {
        painter.origin_y = (i as u32 * page_h) as f32;
        for lbox in &page.boxes {
            painter.paint(lbox);
        }
    }
    Ok(painter.canvas)
}

struct Painter<'a> {
    canvas: RgbaImage,
    /// Device px per layout px.
    k: f32,
    /// Device y of the current page's top edge.
    origin_y: f32,
    fonts: &'a FontManager,
    images: &'a HashMap<String, DynamicImage>,
}

fn rgba8(c: [f32; 4]) -> Rgba<u8> {
    let ch = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([ch(c[0]), ch(c[1]), ch(c[2]), ch(c[3])])
}

impl Painter<'_> {
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
        if let Some(img) = &lbox.image {
            if let Some(decoded) = self.images.get(&img.src) {
                let w = (img.width * self.k).round().max(1.0) as u32;
                let h = (img.height * self.k).round().max(1.0) as u32;
                let scaled = imageops::resize(&decoded.to_rgba8(), w, h, imageops::FilterType::Triangle);
                let x = (lbox.x * self.k).round() as i64;
                let y = (self.origin_y + lbox.y * self.k).round() as i64;
                imageops::overlay(&mut self.canvas, &scaled, x, y);
            }
        }
        if let Some(text) = &lbox.text {
            self.text(lbox, text);
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
                // One band per device pixel along the gradient axis.
                let extent = if vertical { h } else { w } * self.k;
                let steps = extent.ceil().max(1.0) as usize;
                for i in 0..steps {
                    let t0 = i as f32 / steps as f32;
                    let t1 = (i + 1) as f32 / steps as f32;
                    let color = fill.sample((t0 + t1) / 2.0);
                    let band = if vertical {
                        [x, y + h * t0, w, h * (t1 - t0)]
                    } else {
                        [x + w * t0, y, w * (t1 - t0), h]
                    };
                    self.rect(band, color);
                }
            }
        }
    }

    /// Blend a rectangle given in layout px onto the canvas.
    fn rect(&mut self, [x, y, w, h]: [f32; 4], color: [f32; 4]) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let (cw, ch) = self.canvas.dimensions();
        let x0 = (x * self.k).round().clamp(0.0, cw as f32) as u32;
        let x1 = ((x + w) * self.k).round().clamp(0.0, cw as f32) as u32;
        let y0 = (self.origin_y + y * self.k).round().clamp(0.0, ch as f32) as u32;
        let y1 = (self.origin_y + (y + h) * self.k).round().clamp(0.0, ch as f32) as u32;
        // Hairlines still show.
        let x1 = if x1 == x0 && x0 < cw { x0 + 1 } else { x1 };
        let y1 = if y1 == y0 && y0 < ch { y0 + 1 } else { y1 };

        let paint = rgba8(color);
        for py in y0..y1 {
            for px in x0..x1 {
                self.canvas.get_pixel_mut(px, py).blend(&paint);
            }
        }
    }

    fn text(&mut self, lbox: &LayoutBox, text: &TextContent) {
        let key = FontKey::new(&text.font_family, text.bold, text.italic);
        let Some(data) = self.fonts.face_for(&key) else {
            return;
        };
        let Some(face) = data.face() else {
            return;
        };
        let em = text.font_size * self.k / data.units_per_em;
        let color = rgba8(text.color);

        for line in &text.lines {
            let mut pen_x = (lbox.x + line.x_offset) * self.k;
            let baseline = self.origin_y + (lbox.y + line.y_offset + text.ascent) * self.k;
            for ch in line.text.chars() {
                let Some(gid) = face.glyph_index(ch) else {
                    pen_x += text.font_size * self.k * 0.5;
                    continue;
                };
                let mut outline = Outline::new(pen_x, baseline, em);
                if face.outline_glyph(gid, &mut outline).is_some() {
                    fill_outline(&mut self.canvas, &outline.edges, color);
                }
                pen_x += face.glyph_hor_advance(gid).unwrap_or(0) as f32 * em;
            }
        }
    }
}

/// Glyph outline flattened into device-space line segments.
struct Outline {
    ox: f32,
    oy: f32,
    em: f32,
    start: (f32, f32),
    last: (f32, f32),
    edges: Vec<[f32; 4]>,
}

impl Outline {
    fn new(ox: f32, oy: f32, em: f32) -> Self {
        Self {
            ox,
            oy,
            em,
            start: (0.0, 0.0),
            last: (0.0, 0.0),
            edges: Vec::new(),
        }
    }

    /// Font units (y up) to device px (y down).
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.ox + x * self.em, self.oy - y * self.em)
    }

    fn push_to(&mut self, p: (f32, f32)) {
        self.edges.push([self.last.0, self.last.1, p.0, p.1]);
        self.last = p;
    }
}

impl ttf_parser::OutlineBuilder for Outline {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.start = p;
        self.last = p;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.push_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p0 = self.last;
        let c = self.map(x1, y1);
        let p1 = self.map(x, y);
        for i in 1..=8 {
            let t = i as f32 / 8.0;
            let u = 1.0 - t;
            self.push_to((
                u * u * p0.0 + 2.0 * u * t * c.0 + t * t * p1.0,
                u * u * p0.1 + 2.0 * u * t * c.1 + t * t * p1.1,
            ));
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p0 = self.last;
        let c1 = self.map(x1, y1);
        let c2 = self.map(x2, y2);
        let p1 = self.map(x, y);
        for i in 1..=12 {
            let t = i as f32 / 12.0;
            let u = 1.0 - t;
            let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
            self.push_to((
                a * p0.0 + b * c1.0 + c * c2.0 + d * p1.0,
                a * p0.1 + b * c1.1 + c * c2.1 + d * p1.1,
            ));
        }
    }

    fn close(&mut self) {
        let start = self.start;
        if self.last != start {
            self.push_to(start);
        }
    }
}

/// Non-zero winding scanline fill with vertical supersampling.
fn fill_outline(canvas: &mut RgbaImage, edges: &[[f32; 4]], color: Rgba<u8>) {
    if edges.is_empty() {
        return;
    }
    let (cw, ch) = canvas.dimensions();
    let min_y = edges.iter().map(|e| e[1].min(e[3])).fold(f32::MAX, f32::min).floor().max(0.0) as u32;
    let max_y = edges.iter().map(|e| e[1].max(e[3])).fold(f32::MIN, f32::max).ceil().min(ch as f32) as u32;

    let mut coverage = vec![0.0f32; cw as usize];
    let mut crossings: Vec<(f32, i32)> = Vec::new();
    for row in min_y..max_y {
        coverage.iter_mut().for_each(|c| *c = 0.0);
        for sub in 0..SUBROWS {
            let sy = row as f32 + (sub as f32 + 0.5) / SUBROWS as f32;
            crossings.clear();
            for &[x0, y0, x1, y1] in edges {
                if (y0 <= sy && y1 > sy) || (y1 <= sy && y0 > sy) {
                    let x = x0 + (sy - y0) / (y1 - y0) * (x1 - x0);
                    crossings.push((x, if y1 > y0 { 1 } else { -1 }));
                }
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding == 0 {
                    continue;
                }
                let start = (pair[0].0 - 0.5).ceil().max(0.0) as u32;
                let end = (pair[1].0 - 0.5).floor().min(cw as f32 - 1.0);
                if end < 0.0 {
                    continue;
                }
                for x in start..=end as u32 {
                    coverage[x as usize] += 1.0 / SUBROWS as f32;
                }
            }
        }
        for (x, &c) in coverage.iter().enumerate() {
            if c > 0.0 {
                let mut paint = color;
                paint[3] = (color[3] as f32 * c.min(1.0)).round() as u8;
                canvas.get_pixel_mut(x as u32, row).blend(&paint);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_config::{BorderStyle, PageLayout};

    fn layout(pages: usize, boxes: Vec<LayoutBox>) -> LayoutConfig {
        let mut layout = LayoutConfig::new(100.0, 50.0, 1.0);
        for i in 0..pages {
            layout.pages.push(PageLayout {
                page_index: i,
                boxes: boxes.clone(),
            });
        }
        layout
    }

    #[test]
    fn pages_stack_vertically_at_raster_scale() {
        let canvas = render_canvas(&layout(2, Vec::new()), 2.0, &FontManager::default()).unwrap();
        assert_eq!(canvas.dimensions(), (200, 200));
    }

    #[test]
    fn fills_and_borders_are_painted() {
        let mut panel = LayoutBox::new(0.0, 0.0, 50.0, 50.0);
        panel.background = Some(Fill::Solid {
            color: [1.0, 0.0, 0.0, 1.0],
        });
        panel.border = Some(BorderStyle {
            right: 2.0,
            color: [0.0, 0.0, 1.0, 1.0],
            ..BorderStyle::default()
        });
        let canvas = render_canvas(&layout(1, vec![panel]), 1.0, &FontManager::default()).unwrap();
        assert_eq!(canvas.get_pixel(10, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(49, 10), &Rgba([0, 0, 255, 255]));
        assert_eq!(canvas.get_pixel(80, 10), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn translucent_fills_blend() {
        let mut panel = LayoutBox::new(0.0, 0.0, 100.0, 50.0);
        panel.background = Some(Fill::Solid {
            color: [0.0, 0.0, 0.0, 0.5],
        });
        let canvas = render_canvas(&layout(1, vec![panel]), 1.0, &FontManager::default()).unwrap();
        let px = canvas.get_pixel(5, 5);
        assert!((120..=135).contains(&px[0]));
    }

    #[test]
    fn square_outline_fills_its_interior() {
        let mut canvas = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let square = [
            [2.0, 2.0, 8.0, 2.0],
            [8.0, 2.0, 8.0, 8.0],
            [8.0, 8.0, 2.0, 8.0],
            [2.0, 8.0, 2.0, 2.0],
        ];
        fill_outline(&mut canvas, &square, Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(5, 5), &Rgba([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn output_is_a_png() {
        let staged = StagedDocument {
            layout: layout(1, Vec::new()),
            page_width: 100.0,
            page_height: 50.0,
            fit: crate::pipeline::FitDecision::Natural,
            content_height: 0.0,
            images: Vec::new(),
        };
        let request = RasterRequest {
            filename: "x.png".into(),
            raster_scale: 1.0,
        };
        let bytes = PngRasterizer::default().rasterize(&staged, &request).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
