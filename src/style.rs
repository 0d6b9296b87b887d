//! Style resolver – maps CSS inline styles and Tailwind-like utility classes
//! to a flat [`ComputedStyle`] struct consumed by the layout engine.
//!
//! Base styles follow Tailwind's preflight: headings and paragraphs carry no
//! margins and inherit their font size, images are blocks. Colours are
//! resolved against the Tailwind palette; translucent colours and `opacity-*`
//! are pre-blended over the nearest painted ancestor so every colour that
//! reaches a rasterizer is opaque.

use std::collections::BTreeMap;

use crate::dom::{DomNode, ElementNode, Tag};

/// Fully resolved style for a single element.
#[derive(Debug, Clone)]
pub struct ComputedStyle {
    // Display / layout
    pub display: Display,
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub gap: f32,

    // Grid
    pub grid_template_columns: Vec<GridTrack>,

    // Sizing
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub max_width: Dimension,
    pub min_height: Dimension,

    // Spacing (px)
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    /// `mt-auto`: absorb free space above the element.
    pub margin_top_auto: bool,
    /// `mx-auto`: centre horizontally.
    pub margin_x_auto: bool,
    pub padding_top: f32,
    pub padding_right: f32,
    pub padding_bottom: f32,
    pub padding_left: f32,

    // Border, per side (px)
    pub border_top: f32,
    pub border_right: f32,
    pub border_bottom: f32,
    pub border_left: f32,
    pub border_color: Color,
    pub border_dotted: bool,

    // Typography
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_family: String,
    pub color: Color,
    pub text_align: TextAlign,
    pub line_height: f32,
    pub font_style: FontStyle,
    pub uppercase: bool,
    /// `whitespace-pre-line`: keep explicit line breaks in text.
    pub preserve_newlines: bool,
    pub opacity: f32,

    // Background
    pub background_color: Color,
    pub background_gradient: Option<Gradient>,
    /// Opaque colour this element is painted over; inherited.
    pub backdrop: Color,

    // Page break
    pub page_break_inside_avoid: bool,

    // Pending gradient parts, folded into `background_gradient` once all
    // classes are applied.
    gradient_dir: Option<GradientDirection>,
    gradient_from: Option<Color>,
    gradient_to: Option<Color>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::NoWrap,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            justify_content: JustifyContent::Start,
            align_items: AlignItems::Stretch,
            gap: 0.0,
            grid_template_columns: Vec::new(),
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            max_width: Dimension::Auto,
            min_height: Dimension::Auto,
            margin_top: 0.0,
            margin_right: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            margin_top_auto: false,
            margin_x_auto: false,
            padding_top: 0.0,
            padding_right: 0.0,
            padding_bottom: 0.0,
            padding_left: 0.0,
            border_top: 0.0,
            border_right: 0.0,
            border_bottom: 0.0,
            border_left: 0.0,
            border_color: palette("gray-200").unwrap_or(Color::BLACK),
            border_dotted: false,
            font_size: 16.0,
            font_weight: FontWeight::Normal,
            font_family: "Helvetica".to_string(),
            color: Color::BLACK,
            text_align: TextAlign::Left,
            line_height: 1.5,
            font_style: FontStyle::Normal,
            uppercase: false,
            preserve_newlines: false,
            opacity: 1.0,
            background_color: Color::TRANSPARENT,
            background_gradient: None,
            backdrop: Color::WHITE,
            page_break_inside_avoid: false,
            gradient_dir: None,
            gradient_from: None,
            gradient_to: None,
        }
    }
}

impl ComputedStyle {
    pub fn has_border(&self) -> bool {
        self.border_top > 0.0
            || self.border_right > 0.0
            || self.border_bottom > 0.0
            || self.border_left > 0.0
    }

    fn set_border_all(&mut self, w: f32) {
        self.border_top = w;
        self.border_right = w;
        self.border_bottom = w;
        self.border_left = w;
    }
}

// ---------------------------------------------------------------------------
// Supporting enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Flex,
    Grid,
    Inline,
    InlineBlock,
    TableRow,
    TableCell,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexWrap {
    NoWrap,
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustifyContent {
    Start,
    End,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignItems {
    Start,
    End,
    Center,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Auto,
    Px(f32),
    Percent(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridTrack {
    Px(f32),
    Fr(f32),
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDirection {
    ToRight,
    ToBottom,
}

/// Two-stop background gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gradient {
    Linear {
        direction: GradientDirection,
        from: Color,
        to: Color,
    },
    /// Hard stop: `left` up to `at` (0..1) of the width, `right` after it.
    Split { left: Color, right: Color, at: f32 },
}

impl Gradient {
    /// Colour at fraction `t` (0..1) along the gradient axis.
    pub fn sample(&self, t: f32) -> Color {
        match *self {
            Gradient::Linear { from, to, .. } => from.mix(to, t.clamp(0.0, 1.0)),
            Gradient::Split { left, right, at } => {
                if t < at {
                    left
                } else {
                    right
                }
            }
        }
    }

    pub fn direction(&self) -> GradientDirection {
        match *self {
            Gradient::Linear { direction, .. } => direction,
            Gradient::Split { .. } => GradientDirection::ToRight,
        }
    }
}

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn is_transparent(&self) -> bool {
        self.a < 0.001
    }

    pub fn from_rgb24(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        match hex.len() {
            6 => u32::from_str_radix(hex, 16).ok().map(Self::from_rgb24),
            3 => {
                let doubled: String = hex.chars().flat_map(|c| [c, c]).collect();
                u32::from_str_radix(&doubled, 16).ok().map(Self::from_rgb24)
            }
            _ => None,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Linear interpolation towards `other`.
    pub fn mix(self, other: Color, t: f32) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Composite this colour over an opaque backdrop.
    pub fn over(self, backdrop: Color) -> Color {
        backdrop.mix(self.with_alpha(1.0), self.a).with_alpha(1.0)
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

const SHADES: [u16; 10] = [50, 100, 200, 300, 400, 500, 600, 700, 800, 900];

fn hue_table(hue: &str) -> Option<[u32; 10]> {
    Some(match hue {
        "slate" => [
            0xf8fafc, 0xf1f5f9, 0xe2e8f0, 0xcbd5e1, 0x94a3b8, 0x64748b, 0x475569, 0x334155,
            0x1e293b, 0x0f172a,
        ],
        "gray" => [
            0xf9fafb, 0xf3f4f6, 0xe5e7eb, 0xd1d5db, 0x9ca3af, 0x6b7280, 0x4b5563, 0x374151,
            0x1f2937, 0x111827,
        ],
        "stone" => [
            0xfafaf9, 0xf5f5f4, 0xe7e5e4, 0xd6d3d1, 0xa8a29e, 0x78716c, 0x57534e, 0x44403c,
            0x292524, 0x1c1917,
        ],
        "red" => [
            0xfef2f2, 0xfee2e2, 0xfecaca, 0xfca5a5, 0xf87171, 0xef4444, 0xdc2626, 0xb91c1c,
            0x991b1b, 0x7f1d1d,
        ],
        "orange" => [
            0xfff7ed, 0xffedd5, 0xfed7aa, 0xfdba74, 0xfb923c, 0xf97316, 0xea580c, 0xc2410c,
            0x9a3412, 0x7c2d12,
        ],
        "amber" => [
            0xfffbeb, 0xfef3c7, 0xfde68a, 0xfcd34d, 0xfbbf24, 0xf59e0b, 0xd97706, 0xb45309,
            0x92400e, 0x78350f,
        ],
        "yellow" => [
            0xfefce8, 0xfef9c3, 0xfef08a, 0xfde047, 0xfacc15, 0xeab308, 0xca8a04, 0xa16207,
            0x854d0e, 0x713f12,
        ],
        "green" => [
            0xf0fdf4, 0xdcfce7, 0xbbf7d0, 0x86efac, 0x4ade80, 0x22c55e, 0x16a34a, 0x15803d,
            0x166534, 0x14532d,
        ],
        "emerald" => [
            0xecfdf5, 0xd1fae5, 0xa7f3d0, 0x6ee7b7, 0x34d399, 0x10b981, 0x059669, 0x047857,
            0x065f46, 0x064e3b,
        ],
        "teal" => [
            0xf0fdfa, 0xccfbf1, 0x99f6e4, 0x5eead4, 0x2dd4bf, 0x14b8a6, 0x0d9488, 0x0f766e,
            0x115e59, 0x134e4a,
        ],
        "cyan" => [
            0xecfeff, 0xcffafe, 0xa5f3fc, 0x67e8f9, 0x22d3ee, 0x06b6d4, 0x0891b2, 0x0e7490,
            0x155e75, 0x164e63,
        ],
        "sky" => [
            0xf0f9ff, 0xe0f2fe, 0xbae6fd, 0x7dd3fc, 0x38bdf8, 0x0ea5e9, 0x0284c7, 0x0369a1,
            0x075985, 0x0c4a6e,
        ],
        "blue" => [
            0xeff6ff, 0xdbeafe, 0xbfdbfe, 0x93c5fd, 0x60a5fa, 0x3b82f6, 0x2563eb, 0x1d4ed8,
            0x1e40af, 0x1e3a8a,
        ],
        "indigo" => [
            0xeef2ff, 0xe0e7ff, 0xc7d2fe, 0xa5b4fc, 0x818cf8, 0x6366f1, 0x4f46e5, 0x4338ca,
            0x3730a3, 0x312e81,
        ],
        "purple" => [
            0xfaf5ff, 0xf3e8ff, 0xe9d5ff, 0xd8b4fe, 0xc084fc, 0xa855f7, 0x9333ea, 0x7e22ce,
            0x6b21a8, 0x581c87,
        ],
        "rose" => [
            0xfff1f2, 0xffe4e6, 0xfecdd3, 0xfda4af, 0xfb7185, 0xf43f5e, 0xe11d48, 0xbe123c,
            0x9f1239, 0x881337,
        ],
        _ => return None,
    })
}

/// Resolve a palette token: `blue-600`, `blue-50/50` (50 % alpha), `white`,
/// `black`, `transparent` or an arbitrary `[#rrggbb]`.
pub fn palette(token: &str) -> Option<Color> {
    let (base, alpha) = match token.split_once('/') {
        Some((base, a)) => (base, a.parse::<f32>().ok()? / 100.0),
        None => (token, 1.0),
    };
    let color = match base {
        "white" => Color::WHITE,
        "black" => Color::BLACK,
        "transparent" => return Some(Color::TRANSPARENT),
        _ => {
            if let Some(hex) = base.strip_prefix("[#").and_then(|s| s.strip_suffix(']')) {
                Color::from_hex(hex)?
            } else {
                let (hue, shade) = base.rsplit_once('-')?;
                let shade: u16 = shade.parse().ok()?;
                let idx = SHADES.iter().position(|s| *s == shade)?;
                Color::from_rgb24(hue_table(hue)?[idx])
            }
        }
    };
    Some(color.with_alpha(alpha))
}

// ---------------------------------------------------------------------------
// Style resolution
// ---------------------------------------------------------------------------

/// Resolve the style for an element, inheriting text properties from its parent.
pub fn resolve_style(element: &ElementNode, parent: Option<&ComputedStyle>) -> ComputedStyle {
    let mut style = base_style_for_tag(&element.tag);

    if let Some(p) = parent {
        style.font_size = p.font_size;
        style.font_weight = if style.font_weight == FontWeight::Bold {
            FontWeight::Bold
        } else {
            p.font_weight
        };
        style.font_family = p.font_family.clone();
        style.color = p.color;
        style.text_align = p.text_align;
        style.line_height = p.line_height;
        style.font_style = p.font_style;
        style.uppercase = p.uppercase;
        style.preserve_newlines = p.preserve_newlines;
        style.backdrop = p.backdrop;
    }

    for class in element.classes() {
        apply_tailwind_class(&mut style, class);
    }

    if let Some(inline) = element.inline_style() {
        apply_inline_style(&mut style, inline);
    }

    finish(&mut style);
    style
}

/// Fold pending gradient parts and pre-blend translucent colours.
fn finish(s: &mut ComputedStyle) {
    if let (Some(direction), Some(from)) = (s.gradient_dir, s.gradient_from) {
        let to = s.gradient_to.unwrap_or(from);
        s.background_gradient = Some(Gradient::Linear {
            direction,
            from: from.over(s.backdrop),
            to: to.over(s.backdrop),
        });
    }

    let parent_backdrop = s.backdrop;
    if !s.background_color.is_transparent() {
        s.background_color = s.background_color.over(parent_backdrop);
    }
    if s.opacity < 1.0 && !s.background_color.is_transparent() {
        s.background_color = parent_backdrop.mix(s.background_color, s.opacity);
    }

    // The colour text and children are painted over.
    if let Some(g) = s.background_gradient {
        s.backdrop = g.sample(0.5);
    } else if !s.background_color.is_transparent() {
        s.backdrop = s.background_color;
    }

    if s.color.a < 1.0 {
        s.color = s.color.over(s.backdrop);
    }
    if s.opacity < 1.0 {
        s.color = s.backdrop.mix(s.color, s.opacity);
    }
    if s.border_color.a < 1.0 && !s.border_color.is_transparent() {
        s.border_color = s.border_color.over(s.backdrop);
    }
}

/// Default styles based on tag semantics (Tailwind preflight).
fn base_style_for_tag(tag: &Tag) -> ComputedStyle {
    let mut s = ComputedStyle::default();
    match tag {
        Tag::Table => {
            s.display = Display::Grid;
        }
        Tag::Tr => {
            s.display = Display::TableRow;
        }
        Tag::Td | Tag::Th => {
            s.display = Display::TableCell;
            if *tag == Tag::Th {
                s.font_weight = FontWeight::Bold;
            }
        }
        Tag::Span => {
            s.display = Display::Inline;
        }
        Tag::Img => {
            s.display = Display::Block;
        }
        Tag::Div | Tag::P | Tag::H1 | Tag::H2 | Tag::H3 | Tag::H4 | Tag::Body | Tag::Html => {}
        Tag::Head | Tag::Unknown(_) => {
            s.display = Display::None;
        }
    }
    s
}

/// Tailwind font size with its paired line height, as `(px, factor)`.
fn text_size(name: &str) -> Option<(f32, f32)> {
    Some(match name {
        "xs" => (12.0, 16.0 / 12.0),
        "sm" => (14.0, 20.0 / 14.0),
        "base" => (16.0, 1.5),
        "lg" => (18.0, 28.0 / 18.0),
        "xl" => (20.0, 1.4),
        "2xl" => (24.0, 32.0 / 24.0),
        "3xl" => (30.0, 1.2),
        "4xl" => (36.0, 40.0 / 36.0),
        "5xl" => (48.0, 1.0),
        _ => return None,
    })
}

/// Apply a single Tailwind utility class.
fn apply_tailwind_class(s: &mut ComputedStyle, class: &str) {
    // State and breakpoint variants are resolved by the renderer.
    if class.contains(':') {
        return;
    }
    match class {
        // Display
        "flex" => s.display = Display::Flex,
        "grid" => s.display = Display::Grid,
        "block" => s.display = Display::Block,
        "inline" => s.display = Display::Inline,
        "inline-block" => s.display = Display::InlineBlock,
        "hidden" => s.display = Display::None,

        "flex-row" => s.flex_direction = FlexDirection::Row,
        "flex-col" => s.flex_direction = FlexDirection::Column,
        "flex-wrap" => s.flex_wrap = FlexWrap::Wrap,
        "flex-nowrap" => s.flex_wrap = FlexWrap::NoWrap,
        "flex-grow" | "grow" => s.flex_grow = 1.0,
        "flex-shrink" | "shrink" => s.flex_shrink = 1.0,
        "flex-shrink-0" | "shrink-0" => s.flex_shrink = 0.0,
        "flex-1" => {
            s.flex_grow = 1.0;
            s.flex_shrink = 1.0;
        }

        "justify-start" => s.justify_content = JustifyContent::Start,
        "justify-end" => s.justify_content = JustifyContent::End,
        "justify-center" => s.justify_content = JustifyContent::Center,
        "justify-between" => s.justify_content = JustifyContent::SpaceBetween,
        "justify-around" => s.justify_content = JustifyContent::SpaceAround,
        "justify-evenly" => s.justify_content = JustifyContent::SpaceEvenly,

        "items-start" => s.align_items = AlignItems::Start,
        "items-end" => s.align_items = AlignItems::End,
        "items-center" => s.align_items = AlignItems::Center,
        "items-stretch" => s.align_items = AlignItems::Stretch,

        // Typography
        "font-bold" | "font-semibold" | "font-extrabold" | "font-black" => {
            s.font_weight = FontWeight::Bold
        }
        "font-normal" | "font-medium" | "font-light" | "font-thin" => {
            s.font_weight = FontWeight::Normal
        }
        "font-sans" => s.font_family = "Helvetica".to_string(),
        "font-serif" => s.font_family = "Times".to_string(),
        "font-mono" => s.font_family = "Courier".to_string(),
        "italic" => s.font_style = FontStyle::Italic,
        "not-italic" => s.font_style = FontStyle::Normal,
        "uppercase" => s.uppercase = true,
        "normal-case" => s.uppercase = false,
        "whitespace-pre-line" | "whitespace-pre-wrap" => s.preserve_newlines = true,
        "whitespace-normal" => s.preserve_newlines = false,
        "leading-none" => s.line_height = 1.0,
        "leading-tight" => s.line_height = 1.25,
        "leading-normal" => s.line_height = 1.5,

        "text-left" => s.text_align = TextAlign::Left,
        "text-center" => s.text_align = TextAlign::Center,
        "text-right" => s.text_align = TextAlign::Right,

        // Sizing
        "w-full" => s.width = Dimension::Percent(100.0),
        "w-auto" => s.width = Dimension::Auto,
        "h-auto" => s.height = Dimension::Auto,
        "mx-auto" => s.margin_x_auto = true,
        "mt-auto" => s.margin_top_auto = true,

        // Borders
        "border" => s.set_border_all(1.0),
        "border-0" => s.set_border_all(0.0),
        "border-x" => {
            s.border_left = 1.0;
            s.border_right = 1.0;
        }
        "border-y" => {
            s.border_top = 1.0;
            s.border_bottom = 1.0;
        }
        "border-t" => s.border_top = 1.0,
        "border-r" => s.border_right = 1.0,
        "border-b" => s.border_bottom = 1.0,
        "border-l" => s.border_left = 1.0,
        "border-dotted" | "border-dashed" => s.border_dotted = true,
        "border-solid" => s.border_dotted = false,

        // Backgrounds
        "bg-gradient-to-r" => s.gradient_dir = Some(GradientDirection::ToRight),
        "bg-gradient-to-b" => s.gradient_dir = Some(GradientDirection::ToBottom),

        "break-inside-avoid" => s.page_break_inside_avoid = true,

        _ => {
            // Dynamic patterns
            let _ = try_parse_text_class(s, class)
                || try_parse_background_class(s, class)
                || try_parse_border_class(s, class)
                || try_parse_spacing_class(s, class)
                || try_parse_gap_class(s, class)
                || try_parse_grid_cols_class(s, class)
                || try_parse_size_class(s, class)
                || try_parse_opacity_class(s, class);
        }
    }
}

/// Value of an arbitrary `[...]` suffix, e.g. `[12px]` → `12px`.
fn arbitrary(value: &str) -> Option<&str> {
    value.strip_prefix('[')?.strip_suffix(']')
}

/// Tailwind spacing scale: `4` → 16 px, `1.5` → 6 px, `[12px]` → 12 px.
fn spacing(value: &str) -> Option<f32> {
    if let Some(raw) = arbitrary(value) {
        return parse_px(raw);
    }
    value.parse::<f32>().ok().map(|v| v * 4.0)
}

fn try_parse_text_class(s: &mut ComputedStyle, class: &str) -> bool {
    let Some(rest) = class.strip_prefix("text-") else {
        return false;
    };
    if let Some((size, lh)) = text_size(rest) {
        s.font_size = size;
        s.line_height = lh;
        return true;
    }
    if let Some(px) = arbitrary(rest).and_then(parse_px) {
        s.font_size = px;
        return true;
    }
    if let Some(c) = palette(rest) {
        s.color = c;
        return true;
    }
    false
}

fn try_parse_background_class(s: &mut ComputedStyle, class: &str) -> bool {
    if let Some(rest) = class.strip_prefix("from-") {
        s.gradient_from = palette(rest);
        return s.gradient_from.is_some();
    }
    if let Some(rest) = class.strip_prefix("to-") {
        s.gradient_to = palette(rest);
        return s.gradient_to.is_some();
    }
    let Some(rest) = class.strip_prefix("bg-") else {
        return false;
    };
    if let Some(split) = arbitrary(rest).and_then(parse_split_gradient) {
        s.background_gradient = Some(split);
        return true;
    }
    if let Some(c) = palette(rest) {
        s.background_color = c;
        return true;
    }
    false
}

/// `linear-gradient(to_right,#f8fafc_33%,#ffffff_33%)` → hard split.
fn parse_split_gradient(raw: &str) -> Option<Gradient> {
    let inner = raw
        .strip_prefix("linear-gradient(to_right,")?
        .strip_suffix(')')?;
    let mut stops = inner.split(',').map(|stop| {
        let (color, pos) = stop.split_once('_')?;
        let pct: f32 = pos.strip_suffix('%')?.parse().ok()?;
        Some((Color::from_hex(color)?, pct / 100.0))
    });
    let (left, at) = stops.next()??;
    let (right, _) = stops.next()??;
    Some(Gradient::Split { left, right, at })
}

fn try_parse_border_class(s: &mut ComputedStyle, class: &str) -> bool {
    let Some(rest) = class.strip_prefix("border-") else {
        return false;
    };
    // border-2, border-[1px]
    if let Some(w) = border_width(rest) {
        s.set_border_all(w);
        return true;
    }
    // border-t-4, border-l-[12px], border-r-0, border-x-2
    if let Some((side, width)) = rest.split_once('-') {
        if let Some(w) = border_width(width) {
            match side {
                "t" => s.border_top = w,
                "r" => s.border_right = w,
                "b" => s.border_bottom = w,
                "l" => s.border_left = w,
                "x" => {
                    s.border_left = w;
                    s.border_right = w;
                }
                "y" => {
                    s.border_top = w;
                    s.border_bottom = w;
                }
                _ => return false,
            }
            return true;
        }
    }
    if let Some(c) = palette(rest) {
        s.border_color = c;
        return true;
    }
    false
}

fn border_width(value: &str) -> Option<f32> {
    if let Some(raw) = arbitrary(value) {
        return parse_px(raw);
    }
    match value {
        "0" | "2" | "4" | "8" => value.parse().ok(),
        _ => None,
    }
}

fn try_parse_spacing_class(s: &mut ComputedStyle, class: &str) -> bool {
    // space-y-{n} stacks children with a gap
    if let Some(rest) = class.strip_prefix("space-y-") {
        if let Some(v) = spacing(rest) {
            s.gap = v;
            return true;
        }
        return false;
    }
    let Some((prefix, value_str)) = class.split_once('-') else {
        return false;
    };
    let Some(value) = spacing(value_str) else {
        return false;
    };

    match prefix {
        "p" => {
            s.padding_top = value;
            s.padding_right = value;
            s.padding_bottom = value;
            s.padding_left = value;
        }
        "px" => {
            s.padding_left = value;
            s.padding_right = value;
        }
        "py" => {
            s.padding_top = value;
            s.padding_bottom = value;
        }
        "pt" => s.padding_top = value,
        "pr" => s.padding_right = value,
        "pb" => s.padding_bottom = value,
        "pl" => s.padding_left = value,
        "m" => {
            s.margin_top = value;
            s.margin_right = value;
            s.margin_bottom = value;
            s.margin_left = value;
        }
        "mx" => {
            s.margin_left = value;
            s.margin_right = value;
        }
        "my" => {
            s.margin_top = value;
            s.margin_bottom = value;
        }
        "mt" => s.margin_top = value,
        "mr" => s.margin_right = value,
        "mb" => s.margin_bottom = value,
        "ml" => s.margin_left = value,
        _ => return false,
    }
    true
}

fn try_parse_gap_class(s: &mut ComputedStyle, class: &str) -> bool {
    match class.strip_prefix("gap-").and_then(spacing) {
        Some(v) => {
            s.gap = v;
            true
        }
        None => false,
    }
}

fn try_parse_grid_cols_class(s: &mut ComputedStyle, class: &str) -> bool {
    match class
        .strip_prefix("grid-cols-")
        .and_then(|n| n.parse::<usize>().ok())
    {
        Some(n) => {
            s.grid_template_columns = vec![GridTrack::Fr(1.0); n];
            true
        }
        None => false,
    }
}

/// `w-*`, `h-*`, `max-w-*`, `min-h-*`.
fn try_parse_size_class(s: &mut ComputedStyle, class: &str) -> bool {
    let (target, value) = if let Some(v) = class.strip_prefix("max-w-") {
        (&mut s.max_width, v)
    } else if let Some(v) = class.strip_prefix("min-h-") {
        (&mut s.min_height, v)
    } else if let Some(v) = class.strip_prefix("min-w-") {
        (&mut s.min_width, v)
    } else if let Some(v) = class.strip_prefix("w-") {
        (&mut s.width, v)
    } else if let Some(v) = class.strip_prefix("h-") {
        (&mut s.height, v)
    } else {
        return false;
    };

    // Fractions: w-1/2, w-5/12
    if let Some((num, den)) = value.split_once('/') {
        if let (Ok(n), Ok(d)) = (num.parse::<f32>(), den.parse::<f32>()) {
            if d > 0.0 {
                *target = Dimension::Percent(n / d * 100.0);
                return true;
            }
        }
        return false;
    }
    if let Some(raw) = arbitrary(value) {
        let dim = parse_dimension(raw);
        if dim != Dimension::Auto {
            *target = dim;
            return true;
        }
        return false;
    }
    match value.parse::<f32>() {
        Ok(v) => {
            *target = Dimension::Px(v * 4.0);
            true
        }
        Err(_) => false,
    }
}

fn try_parse_opacity_class(s: &mut ComputedStyle, class: &str) -> bool {
    match class
        .strip_prefix("opacity-")
        .and_then(|v| v.parse::<f32>().ok())
    {
        Some(v) => {
            s.opacity = (v / 100.0).clamp(0.0, 1.0);
            true
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Inline style parsing (limited subset)
// ---------------------------------------------------------------------------

fn apply_inline_style(s: &mut ComputedStyle, style_str: &str) {
    for decl in style_str.split(';') {
        let Some((prop, val)) = decl.split_once(':') else {
            continue;
        };
        apply_css_property(s, prop.trim(), val.trim());
    }
}

fn apply_css_property(s: &mut ComputedStyle, prop: &str, val: &str) {
    match prop {
        "display" => {
            s.display = match val {
                "flex" => Display::Flex,
                "grid" => Display::Grid,
                "block" => Display::Block,
                "inline" => Display::Inline,
                "inline-block" => Display::InlineBlock,
                "none" => Display::None,
                _ => s.display,
            }
        }
        "flex-direction" => {
            s.flex_direction = match val {
                "row" => FlexDirection::Row,
                "column" => FlexDirection::Column,
                _ => s.flex_direction,
            }
        }
        "font-size" => {
            if let Some(px) = parse_px(val) {
                s.font_size = px;
            }
        }
        "font-weight" => {
            s.font_weight = match val {
                "bold" | "600" | "700" | "800" | "900" => FontWeight::Bold,
                _ => FontWeight::Normal,
            }
        }
        "color" => {
            if let Some(c) = Color::from_hex(val) {
                s.color = c;
            }
        }
        "background-color" | "background" => {
            if let Some(c) = Color::from_hex(val) {
                s.background_color = c;
            }
        }
        "text-align" => {
            s.text_align = match val {
                "center" => TextAlign::Center,
                "right" => TextAlign::Right,
                _ => TextAlign::Left,
            }
        }
        "width" => s.width = parse_dimension(val),
        "height" => s.height = parse_dimension(val),
        "min-height" => s.min_height = parse_dimension(val),
        "max-width" => s.max_width = parse_dimension(val),
        "margin" => {
            s.margin_x_auto = val.split_whitespace().nth(1) == Some("auto");
            apply_shorthand_spacing(
                val,
                &mut s.margin_top,
                &mut s.margin_right,
                &mut s.margin_bottom,
                &mut s.margin_left,
            );
        }
        "padding" => apply_shorthand_spacing(
            val,
            &mut s.padding_top,
            &mut s.padding_right,
            &mut s.padding_bottom,
            &mut s.padding_left,
        ),
        "border-width" => {
            if let Some(px) = parse_px(val) {
                s.set_border_all(px);
            }
        }
        "border-color" => {
            if let Some(c) = Color::from_hex(val) {
                s.border_color = c;
            }
        }
        "line-height" => {
            if let Ok(v) = val.parse::<f32>() {
                s.line_height = v;
            } else if let Some(px) = parse_px(val) {
                s.line_height = px / s.font_size;
            }
        }
        "gap" => {
            if let Some(px) = parse_px(val) {
                s.gap = px;
            }
        }
        "opacity" => {
            if let Ok(v) = val.parse::<f32>() {
                s.opacity = v.clamp(0.0, 1.0);
            }
        }
        "page-break-inside" | "break-inside" => {
            s.page_break_inside_avoid = val == "avoid";
        }
        // transform, box-shadow, box-sizing: geometry is always untransformed
        _ => {}
    }
}

fn parse_px(s: &str) -> Option<f32> {
    s.trim().trim_end_matches("px").parse().ok()
}

fn parse_dimension(s: &str) -> Dimension {
    let s = s.trim();
    if s == "auto" {
        Dimension::Auto
    } else if let Some(pct) = s.strip_suffix('%') {
        pct.parse::<f32>()
            .map(Dimension::Percent)
            .unwrap_or(Dimension::Auto)
    } else {
        parse_px(s).map(Dimension::Px).unwrap_or(Dimension::Auto)
    }
}

fn apply_shorthand_spacing(
    val: &str,
    top: &mut f32,
    right: &mut f32,
    bottom: &mut f32,
    left: &mut f32,
) {
    // `auto` counts as zero here; callers track auto margins separately.
    let parts: Vec<f32> = val
        .split_whitespace()
        .map(|p| if p == "auto" { Some(0.0) } else { parse_px(p) })
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default();
    match parts.len() {
        1 => {
            *top = parts[0];
            *right = parts[0];
            *bottom = parts[0];
            *left = parts[0];
        }
        2 => {
            *top = parts[0];
            *bottom = parts[0];
            *right = parts[1];
            *left = parts[1];
        }
        4 => {
            *top = parts[0];
            *right = parts[1];
            *bottom = parts[2];
            *left = parts[3];
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Styled DOM tree
// ---------------------------------------------------------------------------

/// A DOM node annotated with its computed style.
#[derive(Debug, Clone)]
pub enum StyledNode {
    Element {
        tag: Tag,
        style: ComputedStyle,
        children: Vec<StyledNode>,
        /// Original attributes (for images src, etc.)
        attrs: BTreeMap<String, String>,
    },
    Text {
        text: String,
        style: ComputedStyle,
    },
}

/// Build a styled tree from a DOM tree, resolving styles top-down.
pub fn build_styled_tree(
    nodes: &[DomNode],
    parent_style: Option<&ComputedStyle>,
) -> Vec<StyledNode> {
    let mut result = Vec::new();
    for node in nodes {
        match node {
            DomNode::Element(e) => {
                let style = resolve_style(e, parent_style);
                let children = build_styled_tree(&e.children, Some(&style));
                result.push(StyledNode::Element {
                    tag: e.tag.clone(),
                    style,
                    children,
                    attrs: e.attributes.clone(),
                });
            }
            DomNode::Text(text) => {
                if text.trim().is_empty() {
                    continue;
                }
                let mut style = parent_style.cloned().unwrap_or_default();
                // Text renders inline: box-model properties stay on the parent.
                style.set_border_all(0.0);
                style.background_color = Color::TRANSPARENT;
                style.background_gradient = None;
                style.margin_top = 0.0;
                style.margin_right = 0.0;
                style.margin_bottom = 0.0;
                style.margin_left = 0.0;
                style.margin_top_auto = false;
                style.margin_x_auto = false;
                style.padding_top = 0.0;
                style.padding_right = 0.0;
                style.padding_bottom = 0.0;
                style.padding_left = 0.0;
                let text = if style.uppercase {
                    text.to_uppercase()
                } else {
                    text.clone()
                };
                result.push(StyledNode::Text { text, style });
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::el;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn tailwind_padding() {
        let mut s = ComputedStyle::default();
        apply_tailwind_class(&mut s, "p-4");
        assert_eq!(s.padding_top, 16.0);
        assert_eq!(s.padding_left, 16.0);
        apply_tailwind_class(&mut s, "py-1.5");
        assert_eq!(s.padding_top, 6.0);
        assert_eq!(s.padding_left, 16.0);
    }

    #[test]
    fn inline_style_font_size() {
        let mut s = ComputedStyle::default();
        apply_inline_style(&mut s, "font-size: 24px; color: #ff0000");
        assert_eq!(s.font_size, 24.0);
        assert!(close(s.color.r, 1.0));
    }

    #[test]
    fn color_from_hex() {
        let c = Color::from_hex("#ff8800").unwrap();
        assert!(close(c.r, 1.0));
        assert!(close(c.g, 0.533));
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
    }

    #[test]
    fn palette_tokens() {
        assert_eq!(palette("blue-600"), Some(Color::from_rgb24(0x2563eb)));
        assert!(close(palette("blue-50/50").unwrap().a, 0.5));
        assert_eq!(palette("[#fffff0]"), Some(Color::from_rgb24(0xfffff0)));
        assert!(palette("teal-750").is_none());
        assert!(palette("chartreuse-500").is_none());
    }

    #[test]
    fn translucent_background_blends_over_white() {
        let e = el(Tag::Div, "bg-blue-50/50");
        let s = resolve_style(&e, None);
        let expected = Color::WHITE.mix(Color::from_rgb24(0xeff6ff), 0.5);
        assert!(close(s.background_color.b, expected.b));
        assert_eq!(s.background_color.a, 1.0);
    }

    #[test]
    fn opacity_fades_text_towards_backdrop() {
        let parent = resolve_style(&el(Tag::Div, "bg-black text-white"), None);
        let child = resolve_style(&el(Tag::P, "opacity-30"), Some(&parent));
        assert!(close(child.color.r, 0.3));
    }

    #[test]
    fn per_side_borders() {
        let s = resolve_style(&el(Tag::Div, "border-l-[12px] border-blue-600 border-b-2"), None);
        assert_eq!(s.border_left, 12.0);
        assert_eq!(s.border_bottom, 2.0);
        assert_eq!(s.border_top, 0.0);
        assert_eq!(s.border_color, Color::from_rgb24(0x2563eb));
        let s = resolve_style(&el(Tag::Div, "border-y"), None);
        assert_eq!((s.border_top, s.border_left), (1.0, 0.0));
    }

    #[test]
    fn text_size_versus_text_colour() {
        let s = resolve_style(&el(Tag::P, "text-xs text-slate-400 text-right"), None);
        assert_eq!(s.font_size, 12.0);
        assert_eq!(s.color, Color::from_rgb24(0x94a3b8));
        assert_eq!(s.text_align, TextAlign::Right);
        let s = resolve_style(&el(Tag::P, "text-[10px]"), None);
        assert_eq!(s.font_size, 10.0);
    }

    #[test]
    fn gradients() {
        let s = resolve_style(&el(Tag::Div, "bg-gradient-to-r from-blue-600 to-purple-600"), None);
        match s.background_gradient {
            Some(Gradient::Linear { from, to, direction }) => {
                assert_eq!(direction, GradientDirection::ToRight);
                assert_eq!(from, Color::from_rgb24(0x2563eb));
                assert_eq!(to, Color::from_rgb24(0x9333ea));
            }
            other => panic!("unexpected {other:?}"),
        }
        let s = resolve_style(
            &el(Tag::Div, "bg-[linear-gradient(to_right,#f8fafc_33%,#ffffff_33%)]"),
            None,
        );
        assert!(matches!(s.background_gradient, Some(Gradient::Split { at, .. }) if close(at, 0.33)));
    }

    #[test]
    fn sizes_and_fractions() {
        let s = resolve_style(&el(Tag::Div, "w-[32%] min-h-[1123px] max-w-[50%]"), None);
        assert_eq!(s.width, Dimension::Percent(32.0));
        assert_eq!(s.min_height, Dimension::Px(1123.0));
        assert_eq!(s.max_width, Dimension::Percent(50.0));
        let s = resolve_style(&el(Tag::Div, "w-5/12 h-16"), None);
        assert!(matches!(s.width, Dimension::Percent(p) if close(p, 41.67)));
        assert_eq!(s.height, Dimension::Px(64.0));
    }

    #[test]
    fn uppercase_is_inherited_and_applied_to_text() {
        let tree = vec![el(Tag::Div, "uppercase")
            .child(el(Tag::Span, "").text("bill to"))
            .into()];
        let styled = build_styled_tree(&tree, None);
        let StyledNode::Element { children, .. } = &styled[0] else {
            panic!("expected element");
        };
        let StyledNode::Element { children: inner, .. } = &children[0] else {
            panic!("expected span");
        };
        assert!(matches!(&inner[0], StyledNode::Text { text, .. } if text == "BILL TO"));
    }

    #[test]
    fn variant_classes_are_ignored() {
        let s = resolve_style(&el(Tag::Div, "md:w-5/12 last:border-r-0"), None);
        assert_eq!(s.width, Dimension::Auto);
        assert!(!s.has_border());
    }
}
