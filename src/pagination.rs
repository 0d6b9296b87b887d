//! Pagination – splits a laid-out document into fixed-height pages.
//!
//! The document is cut into vertical ranges. Indivisible units (text runs,
//! images, table rows, `break-inside-avoid` blocks) never straddle a cut: a
//! unit that would cross the bottom of a page starts the next page instead.
//! A unit taller than a whole page is cut between its text lines, and each
//! page receives only the lines that start inside its range.
//! Containers are painted on every page they overlap, clipped to the
//! page's range, so panels and bands continue across page breaks.

use crate::fonts::FontManager;
use crate::layout::{content_height, BoxContent, PositionedBox};
use crate::layout_config::*;
use crate::style::{self, Color, ComputedStyle, Gradient, GradientDirection};

const EPSILON: f32 = 0.5;

fn is_unit(pbox: &PositionedBox) -> bool {
    !matches!(pbox.content, BoxContent::None)
        || pbox.is_row
        || pbox.page_break_inside_avoid
        || pbox.children.is_empty()
}

fn collect_units<'a>(boxes: &'a [PositionedBox], out: &mut Vec<&'a PositionedBox>) {
    for pbox in boxes {
        if is_unit(pbox) {
            if pbox.height > 0.0 {
                out.push(pbox);
            }
        } else {
            collect_units(&pbox.children, out);
        }
    }
}

/// Document-space `(top, bottom)` of every text line inside `pbox`.
fn line_spans(pbox: &PositionedBox, fonts: &FontManager, out: &mut Vec<(f32, f32)>) {
    if let BoxContent::Text { lines } = &pbox.content {
        let s = &pbox.style;
        let line_height = fonts.line_height_px(s.font_size, s.line_height);
        let top = pbox.y + s.padding_top;
        out.extend((0..lines.len()).map(|i| {
            let y = top + i as f32 * line_height;
            (y, y + line_height)
        }));
    }
    for child in &pbox.children {
        line_spans(child, fonts, out);
    }
}

/// The lowest cut at or above `limit` that passes through no line.
///
/// Falls back to `limit` when a single line is taller than the page.
fn cut_between_lines(spans: &[(f32, f32)], floor: f32, limit: f32) -> f32 {
    let mut cut = limit;
    loop {
        let lowered = spans
            .iter()
            .filter(|(top, bottom)| *top < cut - EPSILON && *bottom > cut + EPSILON)
            .map(|(top, _)| *top)
            .fold(cut, f32::min);
        if lowered >= cut {
            break;
        }
        cut = lowered;
    }
    if cut > floor + EPSILON {
        cut
    } else {
        limit
    }
}

/// Document-space y at which each page begins.
pub fn page_starts(boxes: &[PositionedBox], page_height: f32, fonts: &FontManager) -> Vec<f32> {
    let mut units = Vec::new();
    collect_units(boxes, &mut units);
    units.sort_by(|a, b| a.y.total_cmp(&b.y));

    let mut starts = vec![0.0f32];
    let mut last = 0.0f32;
    for unit in units {
        let (top, bottom) = (unit.y, unit.bottom());
        if bottom - last > page_height + EPSILON && top > last + EPSILON {
            last = top;
            starts.push(last);
        }
        if bottom - last > page_height + EPSILON {
            let mut spans = Vec::new();
            line_spans(unit, fonts, &mut spans);
            while bottom - last > page_height + EPSILON {
                last = cut_between_lines(&spans, last, last + page_height);
                starts.push(last);
            }
        }
    }
    let total = content_height(boxes);
    while total - last > page_height + EPSILON {
        last += page_height;
        starts.push(last);
    }
    starts
}

/// Convert positioned boxes into a paginated [`LayoutConfig`].
pub fn paginate(
    boxes: &[PositionedBox],
    page_width: f32,
    page_height: f32,
    scale: f32,
    fonts: &FontManager,
) -> LayoutConfig {
    let mut config = LayoutConfig::new(page_width, page_height, scale);
    let starts = page_starts(boxes, page_height, fonts);

    for (index, &start) in starts.iter().enumerate() {
        let end = starts.get(index + 1).copied().unwrap_or(f32::INFINITY);
        let mut page = PageCut {
            start,
            end,
            page_height,
            first: index == 0,
            fonts,
            out: Vec::new(),
        };
        for pbox in boxes {
            page.visit(pbox);
        }
        config.pages.push(PageLayout {
            page_index: index,
            boxes: page.out,
        });
    }
    log::debug!(
        "paginated {:.0}px of content into {} page(s) of {:.0}px",
        content_height(boxes),
        config.pages.len(),
        page_height
    );
    config
}

/// One page's vertical range and its display list under construction.
struct PageCut<'a> {
    start: f32,
    end: f32,
    page_height: f32,
    first: bool,
    fonts: &'a FontManager,
    out: Vec<LayoutBox>,
}

impl PageCut<'_> {
    fn visit(&mut self, pbox: &PositionedBox) {
        if is_unit(pbox) {
            let crosses_end = pbox.y < self.end - EPSILON && pbox.bottom() > self.end + EPSILON;
            let crosses_start = pbox.y < self.start - EPSILON && pbox.bottom() > self.start + EPSILON;
            let on_page = (pbox.y >= self.start - EPSILON || self.first) && pbox.y < self.end - EPSILON;
            if crosses_end || crosses_start {
                self.emit_split(pbox);
            } else if on_page {
                self.emit_whole(pbox);
            }
            return;
        }

        if pbox.y < self.end && pbox.bottom() > self.start {
            self.emit_decor(pbox);
            for child in &pbox.children {
                self.visit(child);
            }
        }
    }

    /// Paint a unit and all of its descendants unclipped.
    fn emit_whole(&mut self, pbox: &PositionedBox) {
        let y = pbox.y - self.start;
        let mut lb = LayoutBox::new(pbox.x, y, pbox.width, pbox.height);
        lb.background = fill_for(&pbox.style, 0.0, 1.0);
        lb.border = border_for(&pbox.style, true, true);

        match &pbox.content {
            BoxContent::Text { lines } => lb.text = Some(text_for(pbox, lines, self.fonts)),
            BoxContent::Image { src } => {
                if !src.is_empty() && pbox.width > 0.0 && pbox.height > 0.0 {
                    lb.image = Some(ImageContent {
                        src: src.clone(),
                        width: pbox.width,
                        height: pbox.height,
                    });
                }
            }
            BoxContent::None => {}
        }
        if lb.background.is_some() || lb.border.is_some() || lb.text.is_some() || lb.image.is_some() {
            self.out.push(lb);
        }
        for child in &pbox.children {
            self.emit_whole(child);
        }
    }

    /// Paint the part of a unit that lies on this page.
    fn emit_split(&mut self, pbox: &PositionedBox) {
        if pbox.y >= self.end - EPSILON || pbox.bottom() <= self.start + EPSILON {
            return;
        }
        if pbox.y >= self.start - EPSILON && pbox.bottom() <= self.end + EPSILON {
            self.emit_whole(pbox);
            return;
        }
        match &pbox.content {
            BoxContent::Text { lines } => self.emit_lines(pbox, lines),
            // Images are never cut; they stay on the page holding their top.
            BoxContent::Image { .. } => {
                if pbox.y >= self.start - EPSILON {
                    self.emit_whole(pbox);
                }
                return;
            }
            BoxContent::None => self.emit_decor(pbox),
        }
        for child in &pbox.children {
            self.emit_split(child);
        }
    }

    /// Paint the lines of a text box whose top falls inside this page,
    /// rebased onto the page.
    fn emit_lines(&mut self, pbox: &PositionedBox, lines: &[String]) {
        self.emit_decor(pbox);
        let text = text_for(pbox, lines, self.fonts);
        let top = pbox.y.max(self.start);
        let kept: Vec<TextLine> = text
            .lines
            .iter()
            .filter(|line| {
                let y = pbox.y + line.y_offset;
                y >= self.start - EPSILON && y < self.end - EPSILON
            })
            .map(|line| TextLine {
                y_offset: pbox.y + line.y_offset - top,
                ..line.clone()
            })
            .collect();
        if kept.is_empty() {
            return;
        }
        let bottom = pbox.bottom().min(self.end);
        let mut lb = LayoutBox::new(pbox.x, top - self.start, pbox.width, bottom - top);
        lb.text = Some(TextContent { lines: kept, ..text });
        self.out.push(lb);
    }

    /// Paint a container's background and border, clipped to this page.
    fn emit_decor(&mut self, pbox: &PositionedBox) {
        let top = pbox.y.max(self.start);
        let continues = pbox.bottom() > self.end;
        // Backgrounds run to the foot of the page when the box continues.
        let bottom = if continues {
            pbox.bottom().min(self.start + self.page_height)
        } else {
            pbox.bottom()
        };
        if bottom <= top || pbox.width <= 0.0 {
            return;
        }

        let t0 = (top - pbox.y) / pbox.height;
        let t1 = (bottom - pbox.y) / pbox.height;
        let mut lb = LayoutBox::new(pbox.x, top - self.start, pbox.width, bottom - top);
        lb.background = fill_for(&pbox.style, t0, t1);
        lb.border = border_for(&pbox.style, pbox.y >= self.start, !continues);
        if lb.background.is_some() || lb.border.is_some() {
            self.out.push(lb);
        }
    }
}

fn rgba(c: Color) -> [f32; 4] {
    [c.r, c.g, c.b, c.a]
}

/// Background of a box, restricted to the fraction `t0..t1` of its height.
fn fill_for(style: &ComputedStyle, t0: f32, t1: f32) -> Option<Fill> {
    if let Some(gradient) = style.background_gradient {
        return Some(match gradient {
            Gradient::Linear {
                direction: GradientDirection::ToBottom,
                ..
            } => Fill::Linear {
                vertical: true,
                from: rgba(gradient.sample(t0)),
                to: rgba(gradient.sample(t1)),
            },
            Gradient::Linear { from, to, .. } => Fill::Linear {
                vertical: false,
                from: rgba(from),
                to: rgba(to),
            },
            Gradient::Split { left, right, at } => Fill::Split {
                left: rgba(left),
                right: rgba(right),
                at,
            },
        });
    }
    if style.background_color.is_transparent() {
        None
    } else {
        Some(Fill::Solid {
            color: rgba(style.background_color),
        })
    }
}

fn border_for(style: &ComputedStyle, with_top: bool, with_bottom: bool) -> Option<BorderStyle> {
    if style.border_color.is_transparent() {
        return None;
    }
    let border = BorderStyle {
        top: if with_top { style.border_top } else { 0.0 },
        right: style.border_right,
        bottom: if with_bottom { style.border_bottom } else { 0.0 },
        left: style.border_left,
        color: rgba(style.border_color),
        dotted: style.border_dotted,
    };
    border.is_visible().then_some(border)
}

fn text_for(pbox: &PositionedBox, lines: &[String], fonts: &FontManager) -> TextContent {
    let s = &pbox.style;
    let bold = s.font_weight == style::FontWeight::Bold;
    let italic = s.font_style == style::FontStyle::Italic;
    let line_height = fonts.line_height_px(s.font_size, s.line_height);
    let inner_width = pbox.width - s.padding_left - s.padding_right;

    let text_lines = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let w = fonts.measure_text_width(line, s.font_size, bold, italic, &s.font_family);
            let align_offset = match s.text_align {
                style::TextAlign::Left => 0.0,
                style::TextAlign::Center => ((inner_width - w) / 2.0).max(0.0),
                style::TextAlign::Right => (inner_width - w).max(0.0),
            };
            TextLine {
                text: line.clone(),
                x_offset: s.padding_left + align_offset,
                y_offset: s.padding_top + i as f32 * line_height,
            }
        })
        .collect();

    TextContent {
        lines: text_lines,
        font_family: s.font_family.clone(),
        font_size: s.font_size,
        bold,
        italic,
        color: rgba(s.color),
        line_height,
        ascent: fonts.baseline_px(s.font_size, line_height, bold, italic, &s.font_family),
    }
}
