//! Layout config – the intermediate representation between layout computation
//! and rasterization. This is the "frozen" structure that encodes exactly what
//! goes on each page.
//!
//! Geometry is in layout pixels. `scale` maps layout pixels onto page pixels:
//! it is `1.0` at natural size and below `1.0` when a slightly-too-tall
//! document was laid out wider and shrunk onto a single page.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A complete document layout ready for rasterization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Document title embedded in the output metadata.
    #[serde(default = "LayoutConfig::default_title")]
    pub title: String,
    /// Width of each page in layout pixels.
    pub page_width_px: f32,
    /// Height of each page in layout pixels.
    pub page_height_px: f32,
    /// Layout pixels → page pixels.
    #[serde(default = "LayoutConfig::default_scale")]
    pub scale: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

/// One page of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    /// Boxes in paint order: containers before their content.
    pub boxes: Vec<LayoutBox>,
}

/// A positioned rectangle with optional content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutBox {
    /// Position relative to page top-left, in layout pixels.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    /// Visual styling
    pub background: Option<Fill>,
    pub border: Option<BorderStyle>,

    /// Content (mutually exclusive in practice)
    pub text: Option<TextContent>,
    pub image: Option<ImageContent>,
}

/// Background paint. Colours are opaque RGBA in 0..1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fill {
    Solid {
        color: [f32; 4],
    },
    /// Linear blend from `from` to `to`, left→right or top→bottom.
    Linear {
        vertical: bool,
        from: [f32; 4],
        to: [f32; 4],
    },
    /// Hard vertical split at fraction `at` of the width.
    Split {
        left: [f32; 4],
        right: [f32; 4],
        at: f32,
    },
}

impl Fill {
    /// Colour at fraction `t` along the fill's axis.
    pub fn sample(&self, t: f32) -> [f32; 4] {
        match *self {
            Fill::Solid { color } => color,
            Fill::Linear { from, to, .. } => {
                let t = t.clamp(0.0, 1.0);
                std::array::from_fn(|i| from[i] + (to[i] - from[i]) * t)
            }
            Fill::Split { left, right, at } => {
                if t < at {
                    left
                } else {
                    right
                }
            }
        }
    }
}

/// Per-side border widths sharing one colour.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BorderStyle {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
    pub color: [f32; 4],
    #[serde(default)]
    pub dotted: bool,
}

impl BorderStyle {
    pub fn is_visible(&self) -> bool {
        self.top > 0.0 || self.right > 0.0 || self.bottom > 0.0 || self.left > 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    /// Pre-wrapped lines of text.
    pub lines: Vec<TextLine>,
    pub font_family: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: [f32; 4],
    pub line_height: f32,
    /// Baseline offset from the top of a line box.
    pub ascent: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// X offset within the layout box (for alignment)
    pub x_offset: f32,
    /// Y offset from the top of the text content area
    pub y_offset: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageContent {
    pub src: String,
    pub width: f32,
    pub height: f32,
}

impl LayoutConfig {
    /// An empty layout with the given page geometry.
    pub fn new(page_width_px: f32, page_height_px: f32, scale: f32) -> Self {
        Self {
            title: Self::default_title(),
            page_width_px,
            page_height_px,
            scale,
            pages: Vec::new(),
        }
    }

    fn default_title() -> String {
        "Invoice".to_string()
    }

    fn default_scale() -> f32 {
        1.0
    }

    /// Page size after scaling, in page pixels.
    pub fn output_size_px(&self) -> (f32, f32) {
        (self.page_width_px * self.scale, self.page_height_px * self.scale)
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl LayoutBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }
}
