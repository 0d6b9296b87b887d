//! Font registry and text measurement using `ttf-parser`.
//!
//! Layout needs intrinsic text sizes before anything is painted. When a real
//! TTF/OTF face is registered its glyph advances are used; otherwise widths
//! come from per-family averages that approximate the builtin PDF fonts
//! (Helvetica, Times, Courier).

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// A loaded font face with metrics.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes (kept alive for ttf-parser's zero-copy API).
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
}

impl FontData {
    fn parse(bytes: Vec<u8>) -> Result<Self> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| Error::Raster(format!("failed to parse font: {e}")))?;
        Ok(Self {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            bytes,
        })
    }

    pub fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.bytes, 0).ok()
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: &str, bold: bool, italic: bool) -> Self {
        Self {
            family: family.to_string(),
            bold,
            italic,
        }
    }
}

/// Registered faces plus an optional face used for every unregistered key.
#[derive(Clone, Default)]
pub struct FontManager {
    fonts: HashMap<FontKey, FontData>,
    fallback: Option<FontData>,
}

impl FontManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a TTF/OTF face for one family/weight/style combination.
    pub fn load_font(&mut self, family: &str, bold: bool, italic: bool, bytes: Vec<u8>) -> Result<()> {
        let data = FontData::parse(bytes)?;
        self.fonts.insert(FontKey::new(family, bold, italic), data);
        Ok(())
    }

    /// Register a face used for any key without its own face.
    pub fn load_fallback(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.fallback = Some(FontData::parse(bytes)?);
        Ok(())
    }

    /// Read a font file from disk and register it as the fallback face.
    pub fn load_fallback_file(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)?;
        self.load_fallback(bytes)?;
        log::debug!("registered fallback font {}", path.display());
        Ok(())
    }

    /// The face to paint `key` with: exact match, then the family's regular
    /// face, then the fallback.
    pub fn face_for(&self, key: &FontKey) -> Option<&FontData> {
        self.fonts
            .get(key)
            .or_else(|| self.fonts.get(&FontKey::new(&key.family, false, false)))
            .or(self.fallback.as_ref())
    }

    /// True when at least one real face is available for painting glyphs.
    pub fn has_real_fonts(&self) -> bool {
        self.fallback.is_some() || !self.fonts.is_empty()
    }

    /// Measure the width of a string at a given font size (in px).
    pub fn measure_text_width(&self, text: &str, font_size: f32, bold: bool, italic: bool, family: &str) -> f32 {
        let key = FontKey::new(family, bold, italic);
        if let Some(face) = self.face_for(&key).and_then(|d| d.face().map(|f| (d, f))) {
            let (data, face) = face;
            let scale = font_size / data.units_per_em;
            return text
                .chars()
                .map(|ch| match face.glyph_index(ch) {
                    Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                    None => font_size * 0.5,
                })
                .sum();
        }
        text.chars()
            .map(|ch| heuristic_advance(ch, family, bold))
            .sum::<f32>()
            * font_size
    }

    /// Measure the line height in px.
    pub fn line_height_px(&self, font_size: f32, line_height_factor: f32) -> f32 {
        font_size * line_height_factor
    }

    /// Distance from the top of a line box to the baseline, splitting the
    /// leading evenly above and below the glyphs.
    pub fn baseline_px(&self, font_size: f32, line_height_px: f32, bold: bool, italic: bool, family: &str) -> f32 {
        let (ascent, content) = match self.face_for(&FontKey::new(family, bold, italic)) {
            Some(data) => {
                let scale = font_size / data.units_per_em;
                (data.ascender * scale, (data.ascender - data.descender) * scale)
            }
            None => (font_size * 0.75, font_size),
        };
        (line_height_px - content) / 2.0 + ascent
    }
}

/// Average advance in em for builtin faces.
fn heuristic_advance(ch: char, family: &str, bold: bool) -> f32 {
    if family == "Courier" {
        return 0.6;
    }
    let narrow = matches!(ch, 'i' | 'l' | 'j' | 't' | 'f' | 'r' | 'I' | '.' | ',' | ':' | ';' | '\'' | '!' | '|');
    let wide = ch.is_uppercase() || matches!(ch, 'm' | 'w' | 'M' | 'W' | '@' | '%');
    let base = match family {
        "Times" => 0.45,
        _ => 0.5,
    };
    let mut w = if ch == ' ' {
        0.28
    } else if narrow {
        base * 0.55
    } else if wide {
        base * 1.3
    } else {
        base
    };
    if bold {
        w *= 1.1;
    }
    w
}

/// Word-wrap text to fit within `max_width` pixels. Explicit `\n` always
/// starts a new line; words wider than the line are broken by character.
pub fn wrap_text(
    text: &str,
    font_size: f32,
    bold: bool,
    italic: bool,
    family: &str,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    let measure = |s: &str| fonts.measure_text_width(s, font_size, bold, italic, family);
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in words {
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{current_line} {word}")
            };
            if measure(&candidate) <= max_width {
                current_line = candidate;
                continue;
            }
            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
            }
            if measure(word) <= max_width {
                current_line = word.to_string();
                continue;
            }
            // Break an overlong word across lines.
            for ch in word.chars() {
                current_line.push(ch);
                if measure(&current_line) > max_width && current_line.chars().count() > 1 {
                    current_line.pop();
                    lines.push(std::mem::take(&mut current_line));
                    current_line.push(ch);
                }
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_text_width() {
        let mgr = FontManager::default();
        let w = mgr.measure_text_width("aaaaa", 16.0, false, false, "Helvetica");
        // 5 chars × 16 × 0.5 = 40
        assert!((w - 40.0).abs() < 0.1);
        let mono = mgr.measure_text_width("iiiii", 10.0, false, false, "Courier");
        assert!((mono - 30.0).abs() < 0.1);
    }

    #[test]
    fn bold_is_wider() {
        let mgr = FontManager::default();
        let regular = mgr.measure_text_width("Invoice", 16.0, false, false, "Helvetica");
        let bold = mgr.measure_text_width("Invoice", 16.0, true, false, "Helvetica");
        assert!(bold > regular);
    }

    #[test]
    fn word_wrap_basic() {
        let mgr = FontManager::default();
        let lines = wrap_text("Hello world foo bar", 16.0, false, false, "Helvetica", 60.0, &mgr);
        assert!(lines.len() >= 2, "Expected wrapping, got {:?}", lines);
    }

    #[test]
    fn explicit_newlines_are_kept() {
        let mgr = FontManager::default();
        let lines = wrap_text("123 Business Rd\nTech City", 14.0, false, false, "Helvetica", 500.0, &mgr);
        assert_eq!(lines, vec!["123 Business Rd", "Tech City"]);
    }

    #[test]
    fn long_words_break_without_truncation() {
        let mgr = FontManager::default();
        let word = "x".repeat(80);
        let lines = wrap_text(&word, 10.0, false, false, "Courier", 60.0, &mgr);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn missing_font_file_is_an_error() {
        let mut mgr = FontManager::new();
        assert!(mgr.load_fallback(vec![0, 1, 2, 3]).is_err());
        assert!(mgr.load_font("Inter", true, false, Vec::new()).is_err());
        assert!(!mgr.has_real_fonts());
    }
}
