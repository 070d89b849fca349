//! The measurement seam. Real font programs, shaping and kerning live
//! outside this crate; layout only ever asks for widths and vertical
//! metrics through this trait.

use folio_style::font::{FontFamily, FontSelection};

pub trait FontMetrics {
    /// Advance width of `text` in points at the selection's size.
    fn text_width(&self, text: &str, font: &FontSelection) -> f32;

    /// Distance from the baseline to the top of the em box.
    fn ascent(&self, font: &FontSelection) -> f32;

    /// Default baseline-to-baseline distance.
    fn line_height(&self, font: &FontSelection) -> f32 {
        font.size * 1.2
    }
}

/// Width-class metrics for the standard-14 faces. Coarse but deterministic,
/// which is what layout tests need.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinMetrics;

impl BuiltinMetrics {
    fn char_em(family: FontFamily, bold: bool, c: char) -> f32 {
        if family == FontFamily::Courier {
            return 0.6;
        }
        let base = match c {
            'i' | 'j' | 'l' | '.' | ',' | ';' | ':' | '\'' | '|' | '!' => 0.28,
            'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' => 0.35,
            'm' | 'w' | 'M' | 'W' | '@' => 0.9,
            ' ' => 0.28,
            c if c.is_ascii_uppercase() => 0.7,
            c if c.is_ascii_digit() => 0.556,
            _ => 0.5,
        };
        let family_scale = match family {
            FontFamily::Times => 0.96,
            _ => 1.0,
        };
        let weight_scale = if bold { 1.05 } else { 1.0 };
        base * family_scale * weight_scale
    }
}

impl FontMetrics for BuiltinMetrics {
    fn text_width(&self, text: &str, font: &FontSelection) -> f32 {
        let em: f32 = text
            .chars()
            .map(|c| Self::char_em(font.family, font.bold, c))
            .sum();
        em * font.size
    }

    fn ascent(&self, font: &FontSelection) -> f32 {
        let factor = match font.family {
            FontFamily::Helvetica => 0.718,
            FontFamily::Times => 0.683,
            FontFamily::Courier => 0.629,
        };
        factor * font.size
    }
}
