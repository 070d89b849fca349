use serde::{Deserialize, Serialize};

/// The standard-14 base families. Font file metrics and shaping live behind
/// the layout engine's `FontMetrics` seam; selection is pure data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSelection {
    pub family: FontFamily,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl Default for FontSelection {
    fn default() -> Self {
        Self {
            family: FontFamily::Helvetica,
            size: 12.0,
            bold: false,
            italic: false,
        }
    }
}

impl FontSelection {
    pub fn new(family: FontFamily, size: f32) -> Self {
        Self {
            family,
            size,
            ..Default::default()
        }
    }

    /// The PostScript name used as /BaseFont in the font resource dictionary.
    pub fn postscript_name(&self) -> &'static str {
        use FontFamily::*;
        match (self.family, self.bold, self.italic) {
            (Helvetica, false, false) => "Helvetica",
            (Helvetica, true, false) => "Helvetica-Bold",
            (Helvetica, false, true) => "Helvetica-Oblique",
            (Helvetica, true, true) => "Helvetica-BoldOblique",
            (Times, false, false) => "Times-Roman",
            (Times, true, false) => "Times-Bold",
            (Times, false, true) => "Times-Italic",
            (Times, true, true) => "Times-BoldItalic",
            (Courier, false, false) => "Courier",
            (Courier, true, false) => "Courier-Bold",
            (Courier, false, true) => "Courier-Oblique",
            (Courier, true, true) => "Courier-BoldOblique",
        }
    }
}
