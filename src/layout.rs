//! Layout engine – uses Taffy to compute flexbox / grid layout from a styled
//! DOM tree, then converts the result into a tree of positioned boxes.
//!
//! Coordinates are CSS pixels with the origin at the top-left corner of the
//! document. Text is wrapped while the Taffy tree is built, so every text run
//! becomes a fixed-size leaf.

use std::collections::{BTreeMap, HashMap};
use taffy::prelude::*;

use crate::dom::Tag;
use crate::error::Result;
use crate::fonts::{wrap_text, FontManager};
use crate::style::{self, ComputedStyle, FontStyle as CssFontStyle, FontWeight, StyledNode};

// ---------------------------------------------------------------------------
// Intermediate layout tree (pre-pagination)
// ---------------------------------------------------------------------------

/// A positioned box in document coordinates (before page splitting).
#[derive(Debug, Clone)]
pub struct PositionedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub style: ComputedStyle,
    pub content: BoxContent,
    pub children: Vec<PositionedBox>,
    /// Table rows never split across pages.
    pub is_row: bool,
    pub page_break_inside_avoid: bool,
}

impl PositionedBox {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone)]
pub enum BoxContent {
    None,
    Text { lines: Vec<String> },
    Image { src: String },
}

// ---------------------------------------------------------------------------
// Build Taffy tree from styled nodes
// ---------------------------------------------------------------------------

/// How the parent lays out the node being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParentFlow {
    Column,
    Row,
}

struct LayoutBuilder<'a> {
    taffy: TaffyTree<()>,
    fonts: &'a FontManager,
    node_styles: HashMap<NodeId, ComputedStyle>,
    node_content: HashMap<NodeId, BoxContent>,
    rows: Vec<NodeId>,
}

impl<'a> LayoutBuilder<'a> {
    fn new(fonts: &'a FontManager) -> Self {
        Self {
            taffy: TaffyTree::new(),
            fonts,
            node_styles: HashMap::new(),
            node_content: HashMap::new(),
            rows: Vec::new(),
        }
    }

    /// Collect all text content from an inline subtree (spans, text nodes).
    fn collect_inline_text(node: &StyledNode) -> String {
        match node {
            StyledNode::Text { text, .. } => text.clone(),
            StyledNode::Element { children, .. } => children
                .iter()
                .map(Self::collect_inline_text)
                .collect::<Vec<_>>()
                .join(""),
        }
    }

    /// Return true when every child is a text node or a display:inline element
    /// (no block-level children).
    fn all_inline(children: &[StyledNode]) -> bool {
        children.iter().all(|c| match c {
            StyledNode::Text { .. } => true,
            StyledNode::Element {
                style,
                children: gc,
                ..
            } => style.display == style::Display::Inline && Self::all_inline(gc),
        })
    }

    fn build_node(&mut self, styled: &StyledNode, width: f32, flow: ParentFlow) -> Result<NodeId> {
        match styled {
            StyledNode::Text { text, style } => self.build_text_node(text, style, width, flow),
            StyledNode::Element {
                tag,
                style,
                children,
                attrs,
            } => self.build_element_node(tag, style, children, attrs, width, flow),
        }
    }

    /// A paragraph whose children are all inline becomes a single text leaf
    /// that keeps the paragraph's own margin and padding.
    fn build_paragraph(
        &mut self,
        text: &str,
        block_style: &ComputedStyle,
        width: f32,
        flow: ParentFlow,
    ) -> Result<NodeId> {
        let inner = width - block_style.padding_left - block_style.padding_right;
        let node = self.build_text_node(text, block_style, inner, flow)?;
        let current = self.taffy.style(node)?.clone();
        let text_size = current.size;
        let updated = Style {
            size: Size {
                width: match text_size.width {
                    taffy::Dimension::Length(w) => {
                        taffy::Dimension::Length(w + block_style.padding_left + block_style.padding_right)
                    }
                    other => other,
                },
                height: match text_size.height {
                    taffy::Dimension::Length(h) => {
                        taffy::Dimension::Length(h + block_style.padding_top + block_style.padding_bottom)
                    }
                    other => other,
                },
            },
            margin: margin_rect(block_style),
            ..current
        };
        self.taffy.set_style(node, updated)?;
        Ok(node)
    }

    fn build_text_node(
        &mut self,
        text: &str,
        style: &ComputedStyle,
        width: f32,
        flow: ParentFlow,
    ) -> Result<NodeId> {
        let bold = style.font_weight == FontWeight::Bold;
        let italic = style.font_style == CssFontStyle::Italic;
        let family = &style.font_family;
        let font_size = style.font_size;
        let line_height_px = self.fonts.line_height_px(font_size, style.line_height);

        let normalized = normalize_whitespace(text, style.preserve_newlines);
        let lines = wrap_text(&normalized, font_size, bold, italic, family, width, self.fonts);

        let text_width = lines
            .iter()
            .map(|l| {
                self.fonts
                    .measure_text_width(l, font_size, bold, italic, family)
            })
            .fold(0.0f32, f32::max);
        let text_height = lines.len() as f32 * line_height_px;

        let mut taffy_style = Style {
            size: Size {
                width: taffy::Dimension::Length(text_width.ceil()),
                height: taffy::Dimension::Length(text_height),
            },
            flex_shrink: 0.0,
            ..Default::default()
        };
        if flow == ParentFlow::Column {
            taffy_style.align_self = Some(match style.text_align {
                style::TextAlign::Left => taffy::AlignSelf::Start,
                style::TextAlign::Center => taffy::AlignSelf::Center,
                style::TextAlign::Right => taffy::AlignSelf::End,
            });
        }

        let node = self.taffy.new_leaf(taffy_style)?;
        self.node_styles.insert(node, style.clone());
        self.node_content.insert(node, BoxContent::Text { lines });
        Ok(node)
    }

    fn build_element_node(
        &mut self,
        tag: &Tag,
        style: &ComputedStyle,
        children: &[StyledNode],
        attrs: &BTreeMap<String, String>,
        width: f32,
        flow: ParentFlow,
    ) -> Result<NodeId> {
        // Paragraph-like block elements whose children are all inline get their
        // text merged into a single wrapped text node so spans flow correctly.
        if tag.is_paragraph() && !children.is_empty() && Self::all_inline(children) {
            let raw: String = children.iter().map(Self::collect_inline_text).collect();
            if !raw.trim().is_empty() {
                return self.build_paragraph(&raw, style, width, flow);
            }
        }

        // Width this element occupies, then the width its content gets.
        let own_width = match style.width {
            style::Dimension::Px(w) => w,
            style::Dimension::Percent(p) => width * p / 100.0,
            style::Dimension::Auto => width,
        };
        let own_width = match style.max_width {
            style::Dimension::Px(w) => own_width.min(w),
            style::Dimension::Percent(p) => own_width.min(width * p / 100.0),
            style::Dimension::Auto => own_width,
        };
        let inner_width = (own_width
            - style.padding_left
            - style.padding_right
            - style.border_left
            - style.border_right)
            .max(1.0);

        let is_row = *tag == Tag::Tr
            || (matches!(style.display, style::Display::Flex | style::Display::Inline)
                && style.flex_direction == style::FlexDirection::Row);
        let is_grid = style.display == style::Display::Grid && *tag != Tag::Table;

        let child_widths = if is_grid {
            let cols = style.grid_template_columns.len().max(1);
            let col = (inner_width - style.gap * (cols - 1) as f32) / cols as f32;
            vec![col.max(1.0); children.len()]
        } else if is_row {
            row_child_widths(children, inner_width, style.gap)
        } else {
            vec![inner_width; children.len()]
        };
        let child_flow = if is_row && !is_grid {
            ParentFlow::Row
        } else {
            ParentFlow::Column
        };

        let mut child_nodes = Vec::with_capacity(children.len());
        for (child, w) in children.iter().zip(child_widths) {
            child_nodes.push(self.build_node(child, w, child_flow)?);
        }

        // For <img> elements, resolve Auto width/height to concrete pixel dimensions
        // using the image's intrinsic size decoded from the base64 data URI.
        let style_override: Option<ComputedStyle> = if *tag == Tag::Img
            && (matches!(style.width, style::Dimension::Auto)
                || matches!(style.height, style::Dimension::Auto))
        {
            let src = attrs.get("src").map(|s| s.as_str()).unwrap_or("");
            resolve_img_auto_dimensions(src, style, width)
        } else {
            None
        };

        let effective_style = style_override.as_ref().unwrap_or(style);
        let taffy_style = self.computed_to_taffy(effective_style, tag, flow);
        let node = self.taffy.new_with_children(taffy_style, &child_nodes)?;
        self.node_styles.insert(node, effective_style.clone());

        match tag {
            Tag::Img => {
                let src = attrs.get("src").cloned().unwrap_or_default();
                self.node_content.insert(node, BoxContent::Image { src });
            }
            Tag::Tr => self.rows.push(node),
            _ => {}
        }

        Ok(node)
    }

    fn computed_to_taffy(&self, s: &ComputedStyle, tag: &Tag, flow: ParentFlow) -> Style {
        let mut ts = Style {
            margin: margin_rect(s),
            padding: Rect {
                top: LengthPercentage::Length(s.padding_top),
                right: LengthPercentage::Length(s.padding_right),
                bottom: LengthPercentage::Length(s.padding_bottom),
                left: LengthPercentage::Length(s.padding_left),
            },
            border: Rect {
                top: LengthPercentage::Length(s.border_top),
                right: LengthPercentage::Length(s.border_right),
                bottom: LengthPercentage::Length(s.border_bottom),
                left: LengthPercentage::Length(s.border_left),
            },
            ..Default::default()
        };

        // -----------------------------------------------------------------
        // HTML table model: always use flex regardless of computed display.
        // -----------------------------------------------------------------
        match tag {
            Tag::Table => {
                ts.display = taffy::Display::Flex;
                ts.flex_direction = taffy::FlexDirection::Column;
                ts.size.width = dim_to_taffy(s.width);
                ts.min_size.width = taffy::Dimension::Length(0.0);
                ts.flex_shrink = 0.0;
                return ts;
            }
            Tag::Tr => {
                ts.display = taffy::Display::Flex;
                ts.flex_direction = taffy::FlexDirection::Row;
                ts.align_items = Some(taffy::AlignItems::Stretch);
                ts.size.width = taffy::Dimension::Percent(1.0);
                ts.min_size.width = taffy::Dimension::Length(0.0);
                ts.flex_shrink = 0.0;
                return ts;
            }
            Tag::Td | Tag::Th => {
                ts.display = taffy::Display::Flex;
                ts.flex_direction = taffy::FlexDirection::Column;
                match s.width {
                    style::Dimension::Percent(p) => {
                        ts.flex_grow = 0.0;
                        ts.flex_shrink = 0.0;
                        ts.flex_basis = taffy::Dimension::Percent(p / 100.0);
                    }
                    _ => {
                        ts.flex_grow = 1.0;
                        ts.flex_shrink = 1.0;
                        ts.flex_basis = taffy::Dimension::Length(0.0); // equal columns
                    }
                }
                ts.min_size.width = taffy::Dimension::Length(0.0);
                return ts;
            }
            _ => {}
        }

        // Display / layout mode
        match s.display {
            style::Display::Flex => {
                ts.display = taffy::Display::Flex;
                ts.flex_direction = match s.flex_direction {
                    style::FlexDirection::Row => taffy::FlexDirection::Row,
                    style::FlexDirection::Column => taffy::FlexDirection::Column,
                };
                ts.flex_wrap = match s.flex_wrap {
                    style::FlexWrap::NoWrap => taffy::FlexWrap::NoWrap,
                    style::FlexWrap::Wrap => taffy::FlexWrap::Wrap,
                };
                ts.justify_content = Some(match s.justify_content {
                    style::JustifyContent::Start => taffy::JustifyContent::Start,
                    style::JustifyContent::End => taffy::JustifyContent::End,
                    style::JustifyContent::Center => taffy::JustifyContent::Center,
                    style::JustifyContent::SpaceBetween => taffy::JustifyContent::SpaceBetween,
                    style::JustifyContent::SpaceAround => taffy::JustifyContent::SpaceAround,
                    style::JustifyContent::SpaceEvenly => taffy::JustifyContent::SpaceEvenly,
                });
                ts.align_items = Some(match s.align_items {
                    style::AlignItems::Start => taffy::AlignItems::Start,
                    style::AlignItems::End => taffy::AlignItems::End,
                    style::AlignItems::Center => taffy::AlignItems::Center,
                    style::AlignItems::Stretch => taffy::AlignItems::Stretch,
                });
            }
            style::Display::Grid => {
                ts.display = taffy::Display::Grid;
                let cols = s.grid_template_columns.len().max(1);
                ts.grid_template_columns = vec![taffy::TrackSizingFunction::from_flex(1.0); cols];
            }
            style::Display::Block
            | style::Display::TableRow
            | style::Display::TableCell
            | style::Display::InlineBlock => {
                // Use flex column for block-level elements (vertical stacking)
                ts.display = taffy::Display::Flex;
                ts.flex_direction = taffy::FlexDirection::Column;
            }
            style::Display::Inline => {
                ts.display = taffy::Display::Flex;
                ts.flex_direction = taffy::FlexDirection::Row;
                ts.flex_wrap = taffy::FlexWrap::Wrap;
            }
            style::Display::None => {
                ts.display = taffy::Display::None;
            }
        }

        // Inline blocks shrink to their content instead of stretching.
        if s.display == style::Display::InlineBlock && flow == ParentFlow::Column {
            ts.align_self = Some(taffy::AlignSelf::Start);
        }

        // Sizing
        ts.size = Size {
            width: dim_to_taffy(s.width),
            height: dim_to_taffy(s.height),
        };
        // Allow flex/shrink items to compress below their natural content size
        ts.min_size = Size {
            width: if s.flex_grow > 0.0 {
                taffy::Dimension::Length(0.0)
            } else {
                dim_to_taffy(s.min_width)
            },
            height: dim_to_taffy(s.min_height),
        };
        ts.max_size = Size {
            width: dim_to_taffy(s.max_width),
            height: taffy::Dimension::Auto,
        };

        // Flex properties
        ts.flex_grow = s.flex_grow;
        ts.flex_shrink = s.flex_shrink;
        if s.flex_grow > 0.0 && flow == ParentFlow::Row {
            ts.flex_basis = taffy::Dimension::Length(0.0);
        }

        // Gap
        ts.gap = Size {
            width: LengthPercentage::Length(s.gap),
            height: LengthPercentage::Length(s.gap),
        };

        ts
    }

    /// Extract positioned boxes after layout computation.
    fn extract(&self, node: NodeId, offset_x: f32, offset_y: f32) -> Result<PositionedBox> {
        let layout = self.taffy.layout(node)?;
        let style = self.node_styles.get(&node).cloned().unwrap_or_default();
        let content = self
            .node_content
            .get(&node)
            .cloned()
            .unwrap_or(BoxContent::None);

        let x = offset_x + layout.location.x;
        let y = offset_y + layout.location.y;

        let children = self
            .taffy
            .children(node)?
            .into_iter()
            .map(|child| self.extract(child, x, y))
            .collect::<Result<Vec<_>>>()?;

        Ok(PositionedBox {
            x,
            y,
            width: layout.size.width,
            height: layout.size.height,
            is_row: self.rows.contains(&node),
            page_break_inside_avoid: style.page_break_inside_avoid,
            style,
            content,
            children,
        })
    }
}

fn margin_rect(s: &ComputedStyle) -> Rect<LengthPercentageAuto> {
    let auto_or = |auto: bool, v: f32| {
        if auto {
            LengthPercentageAuto::Auto
        } else {
            LengthPercentageAuto::Length(v)
        }
    };
    Rect {
        top: auto_or(s.margin_top_auto, s.margin_top),
        right: auto_or(s.margin_x_auto, s.margin_right),
        bottom: LengthPercentageAuto::Length(s.margin_bottom),
        left: auto_or(s.margin_x_auto, s.margin_left),
    }
}

fn dim_to_taffy(d: style::Dimension) -> taffy::Dimension {
    match d {
        style::Dimension::Auto => taffy::Dimension::Auto,
        style::Dimension::Px(v) => taffy::Dimension::Length(v),
        style::Dimension::Percent(v) => taffy::Dimension::Percent(v / 100.0),
    }
}

/// Collapse whitespace; with `preserve_newlines` line breaks survive and only
/// runs of spaces within a line collapse.
fn normalize_whitespace(text: &str, preserve_newlines: bool) -> String {
    if preserve_newlines {
        text.trim()
            .lines()
            .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Estimate the width each child of a row gets, so text wraps to its column
/// while the Taffy tree is still being built. Children with an explicit or
/// maximum width take it; the rest share what remains.
fn row_child_widths(children: &[StyledNode], inner_width: f32, gap: f32) -> Vec<f32> {
    let element_count = children
        .iter()
        .filter(|c| matches!(c, StyledNode::Element { .. }))
        .count();
    let available = inner_width - gap * element_count.saturating_sub(1) as f32;

    let fixed: Vec<Option<f32>> = children
        .iter()
        .map(|c| match c {
            StyledNode::Element { style, .. } => {
                let declared = match style.width {
                    style::Dimension::Px(w) => Some(w),
                    style::Dimension::Percent(p) => Some(inner_width * p / 100.0),
                    style::Dimension::Auto => None,
                };
                let cap = match style.max_width {
                    style::Dimension::Px(w) => Some(w),
                    style::Dimension::Percent(p) => Some(inner_width * p / 100.0),
                    style::Dimension::Auto => None,
                };
                match (declared, cap) {
                    (Some(d), Some(c)) => Some(d.min(c)),
                    (d, c) => d.or(c),
                }
            }
            StyledNode::Text { .. } => None,
        })
        .collect();

    let taken: f32 = fixed.iter().flatten().sum();
    let free = fixed.iter().filter(|f| f.is_none()).count().max(1);
    let share = ((available - taken) / free as f32).max(1.0);
    fixed.into_iter().map(|f| f.unwrap_or(share)).collect()
}

// ---------------------------------------------------------------------------
// Image intrinsic-size helper
// ---------------------------------------------------------------------------

/// Decode a base64 data URI into raw image bytes.
pub fn decode_data_uri(src: &str) -> Option<Vec<u8>> {
    use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

    if !src.starts_with("data:") || !src.contains(";base64,") {
        return None;
    }
    let comma = src.find(',')?;
    BASE64_STD.decode(src[comma + 1..].trim()).ok()
}

/// Attempt to decode a base64 data-URI image and return a cloned
/// [`ComputedStyle`] with any `Auto` width/height replaced by concrete pixel
/// values derived from the image's intrinsic dimensions.
///
/// Returns `None` when the src is not a parseable base64 data URI, when image
/// decoding fails, or when both dimensions are already specified.
fn resolve_img_auto_dimensions(
    src: &str,
    style: &ComputedStyle,
    parent_width: f32,
) -> Option<ComputedStyle> {
    let bytes = decode_data_uri(src)?;
    let img = ::image::load_from_memory(&bytes).ok()?;
    let (px_w, px_h) = (img.width() as f32, img.height() as f32);
    if px_w == 0.0 || px_h == 0.0 {
        return None;
    }
    let aspect = px_w / px_h;

    let known_w: Option<f32> = match style.width {
        style::Dimension::Px(v) => Some(v),
        style::Dimension::Percent(p) => Some(parent_width * p / 100.0),
        style::Dimension::Auto => None,
    };
    let known_h: Option<f32> = match style.height {
        style::Dimension::Px(v) => Some(v),
        _ => None,
    };

    let mut s = style.clone();
    match (known_w, known_h) {
        (Some(w), None) => s.height = style::Dimension::Px((w / aspect).max(1.0)),
        (None, Some(h)) => s.width = style::Dimension::Px((h * aspect).max(1.0)),
        // Intrinsic size, capped to the available width.
        (None, None) => {
            let w = px_w.min(parent_width.max(1.0));
            s.width = style::Dimension::Px(w);
            s.height = style::Dimension::Px(w / aspect);
        }
        (Some(_), Some(_)) => return None,
    }
    Some(s)
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute layout for a styled tree at the given document width, returning
/// the top-level positioned boxes in document coordinates.
pub fn compute_layout(
    styled_nodes: &[StyledNode],
    width: f32,
    fonts: &FontManager,
) -> Result<Vec<PositionedBox>> {
    let mut builder = LayoutBuilder::new(fonts);

    let mut child_ids = Vec::with_capacity(styled_nodes.len());
    for node in styled_nodes {
        child_ids.push(builder.build_node(node, width, ParentFlow::Column)?);
    }

    let root_style = Style {
        display: taffy::Display::Flex,
        flex_direction: taffy::FlexDirection::Column,
        size: Size {
            width: taffy::Dimension::Length(width),
            height: taffy::Dimension::Auto,
        },
        ..Default::default()
    };

    let root = builder.taffy.new_with_children(root_style, &child_ids)?;
    builder.taffy.compute_layout(
        root,
        Size {
            width: AvailableSpace::Definite(width),
            height: AvailableSpace::MaxContent,
        },
    )?;

    let root_box = builder.extract(root, 0.0, 0.0)?;
    Ok(root_box.children)
}

/// Bottom edge of the lowest box.
pub fn content_height(boxes: &[PositionedBox]) -> f32 {
    boxes.iter().map(PositionedBox::bottom).fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{el, parse_html, DomNode};
    use crate::style::build_styled_tree;

    fn layout(nodes: &[DomNode], width: f32) -> Vec<PositionedBox> {
        let styled = build_styled_tree(nodes, None);
        compute_layout(&styled, width, &FontManager::default()).unwrap()
    }

    #[test]
    fn layout_simple_paragraph() {
        let boxes = layout(&parse_html("<p>Hello world</p>"), 595.0);
        assert!(!boxes.is_empty(), "Should produce at least one box");
        let first = &boxes[0];
        assert!(first.width > 0.0, "Box should have width");
        assert!(first.height > 0.0, "Box should have height");
    }

    #[test]
    fn layout_flex_row() {
        let html =
            r#"<div class="flex"><div class="flex-1">A</div><div class="flex-1">B</div></div>"#;
        let boxes = layout(&parse_html(html), 600.0);
        let row = &boxes[0];
        assert_eq!(row.children.len(), 2);
        assert!((row.children[0].width - 300.0).abs() < 1.0);
        assert!((row.children[1].x - 300.0).abs() < 1.0);
    }

    #[test]
    fn min_height_and_auto_margin_pin_to_bottom() {
        let tree: Vec<DomNode> = vec![el(Tag::Div, "flex flex-col min-h-[1123px]")
            .child(el(Tag::P, "").text("top"))
            .child(el(Tag::Div, "mt-auto").child(el(Tag::P, "").text("bottom")))
            .into()];
        let boxes = layout(&tree, 794.0);
        assert!((boxes[0].height - 1123.0).abs() < 0.5);
        let pinned = &boxes[0].children[1];
        assert!((pinned.bottom() - 1123.0).abs() < 0.5);
    }

    #[test]
    fn percent_cells_follow_declared_widths() {
        let tree: Vec<DomNode> = vec![el(Tag::Table, "w-full")
            .child(
                el(Tag::Tr, "")
                    .child(el(Tag::Th, "w-[50%]").text("Description"))
                    .child(el(Tag::Th, "w-[15%]").text("Qty"))
                    .child(el(Tag::Th, "w-[17.5%]").text("Price"))
                    .child(el(Tag::Th, "w-[17.5%]").text("Total")),
            )
            .into()];
        let boxes = layout(&tree, 800.0);
        let row = &boxes[0].children[0];
        assert!(row.is_row);
        let widths: Vec<f32> = row.children.iter().map(|c| c.width.round()).collect();
        assert_eq!(widths, vec![400.0, 120.0, 140.0, 140.0]);
    }

    #[test]
    fn right_aligned_text_sits_at_the_right_edge() {
        let tree: Vec<DomNode> = vec![el(Tag::Div, "text-right")
            .child(el(Tag::P, "").text("#INV-001"))
            .into()];
        let boxes = layout(&tree, 500.0);
        let text = &boxes[0].children[0];
        assert!((text.x + text.width - 500.0).abs() < 1.0);
    }

    #[test]
    fn preserved_newlines_produce_lines() {
        let tree: Vec<DomNode> = vec![el(Tag::P, "whitespace-pre-line")
            .text("123 Business Rd\nTech City")
            .into()];
        let boxes = layout(&tree, 500.0);
        match &boxes[0].content {
            BoxContent::Text { lines } => assert_eq!(lines.len(), 2),
            other => panic!("expected text, got {other:?}"),
        }
    }
}
