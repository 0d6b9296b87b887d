//! Rasterization collaborators: turn a staged document into file bytes.

pub mod pdf;
pub mod png;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::decode_data_uri;
use crate::layout_config::{LayoutBox, LayoutConfig};
use crate::staging::StagedDocument;

pub use pdf::PdfRasterizer;
pub use png::PngRasterizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "png" | "image" => Ok(ExportFormat::Png),
            other => Err(Error::MissingCapability(format!("export format '{other}'"))),
        }
    }
}

/// Per-call parameters alongside the staged document.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterRequest {
    pub filename: String,
    /// Device pixels per CSS pixel; only raster image output uses it.
    pub raster_scale: f32,
}

pub trait Rasterizer: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn rasterize(&self, staged: &StagedDocument, request: &RasterRequest) -> Result<Vec<u8>>;
}

/// Every distinct image source referenced by a layout, decoded once.
pub(crate) fn decode_images(layout: &LayoutConfig) -> HashMap<String, image::DynamicImage> {
    let mut out = HashMap::new();
    for lbox in layout.pages.iter().flat_map(|p| &p.boxes) {
        let Some(img) = &lbox.image else { continue };
        if out.contains_key(&img.src) {
            continue;
        }
        let decoded = decode_data_uri(&img.src)
            .ok_or_else(|| "not a base64 data URI".to_string())
            .and_then(|bytes| image::load_from_memory(&bytes).map_err(|e| e.to_string()));
        match decoded {
            Ok(image) => {
                out.insert(img.src.clone(), image);
            }
            Err(e) => log::warn!("skipping image: {e}"),
        }
    }
    out
}

/// The rectangles that paint each side of a border, in layout px.
pub(crate) fn border_rects(lbox: &LayoutBox) -> Vec<[f32; 4]> {
    let Some(b) = &lbox.border else {
        return Vec::new();
    };
    let (x, y, w, h) = (lbox.x, lbox.y, lbox.width, lbox.height);
    [
        [x, y, w, b.top],
        [x, y + h - b.bottom, w, b.bottom],
        [x, y, b.left, h],
        [x + w - b.right, y, b.right, h],
    ]
    .into_iter()
    .filter(|r| r[2] > 0.0 && r[3] > 0.0)
    .collect()
}

/// Split a border side into square dots separated by equal gaps.
pub(crate) fn dots(rect: [f32; 4]) -> Vec<[f32; 4]> {
    let [x, y, w, h] = rect;
    let size = w.min(h);
    if size <= 0.0 {
        return Vec::new();
    }
    let horizontal = w >= h;
    let length = if horizontal { w } else { h };
    let count = (length / (size * 2.0)).floor().max(1.0) as usize;
    (0..count)
        .map(|i| {
            let at = i as f32 * size * 2.0;
            if horizontal {
                [x + at, y, size, size]
            } else {
                [x, y + at, size, size]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_config::BorderStyle;

    #[test]
    fn format_names() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("png".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert!(matches!("tiff".parse::<ExportFormat>(), Err(Error::MissingCapability(_))));
        assert_eq!(ExportFormat::Png.to_string(), "png");
        assert_eq!(ExportFormat::Pdf.mime_type(), "application/pdf");
    }

    #[test]
    fn border_sides_become_rects() {
        let mut lbox = LayoutBox::new(10.0, 20.0, 100.0, 50.0);
        lbox.border = Some(BorderStyle {
            bottom: 1.0,
            left: 4.0,
            ..BorderStyle::default()
        });
        let rects = border_rects(&lbox);
        assert_eq!(rects, vec![[10.0, 69.0, 100.0, 1.0], [10.0, 20.0, 4.0, 50.0]]);
    }

    #[test]
    fn dotted_sides_alternate() {
        let d = dots([0.0, 0.0, 10.0, 1.0]);
        assert_eq!(d.len(), 5);
        assert_eq!(d[1], [2.0, 0.0, 1.0, 1.0]);
    }
}
