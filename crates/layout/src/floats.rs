//! Active float tracking. A region keeps one chain per lifetime of its
//! flow; every line opened afterwards queries the chain for the horizontal
//! band it occupies. Queries are pure functions of the chain and the
//! (y, height) window, so repeated calls with the same inputs always agree.

use folio_style::FloatMode;

#[derive(Debug, Clone)]
pub struct FloatAddition {
    pub mode: FloatMode,
    pub width: f32,
    pub height: f32,
    /// Horizontal inset from the region edge the float is anchored to.
    pub inset: f32,
    /// Top of the float, relative to the region content origin.
    pub y_offset: f32,
    pub prev: Option<Box<FloatAddition>>,
}

impl FloatAddition {
    /// Pushes a new float onto the chain, newest first.
    pub fn push(
        chain: Option<Box<FloatAddition>>,
        mode: FloatMode,
        width: f32,
        height: f32,
        inset: f32,
        y_offset: f32,
    ) -> Box<FloatAddition> {
        Box::new(FloatAddition {
            mode,
            width,
            height,
            inset,
            y_offset,
            prev: chain,
        })
    }

    fn overlaps(&self, y: f32, height: f32) -> bool {
        let band_bottom = y + height;
        let float_bottom = self.y_offset + self.height;
        y < float_bottom && band_bottom > self.y_offset
    }

    /// Left-edge offset imposed on a band at `y` of the given height.
    pub fn left_offset(&self, y: f32, height: f32) -> f32 {
        let mut offset: f32 = 0.0;
        let mut node = Some(self);
        while let Some(f) = node {
            if f.mode == FloatMode::Left && f.overlaps(y, height) {
                offset = offset.max(f.inset + f.width);
            }
            node = f.prev.as_deref();
        }
        offset
    }

    /// Right-edge inset imposed on a band at `y` of the given height.
    pub fn right_inset(&self, y: f32, height: f32) -> f32 {
        let mut inset: f32 = 0.0;
        let mut node = Some(self);
        while let Some(f) = node {
            if f.mode == FloatMode::Right && f.overlaps(y, height) {
                inset = inset.max(f.inset + f.width);
            }
            node = f.prev.as_deref();
        }
        inset
    }

    /// Available width once both edges' floats are accounted for.
    pub fn apply_width_inset(&self, width: f32, y: f32, height: f32) -> f32 {
        (width - self.left_offset(y, height) - self.right_inset(y, height)).max(0.0)
    }
}
