//! Palette reduction for animated output.
//!
//! Full-color canvases are quantized with NeuQuant under a 256-color budget,
//! with one slot reserved for full transparency (the GIF transparent color)
//! and, when the descriptor sets one, a second slot for the exact background
//! color. Reduction runs through the image crate's Floyd-Steinberg
//! error-diffusion dither against the reserved palette.

use color_quant::NeuQuant;
use image::imageops::{self, ColorMap};
use image::{Rgba, RgbaImage};

use crate::frames::IndexedFrame;

/// Color budget for a quantized palette, including the reserved slots.
pub const PALETTE_BUDGET: usize = 256;

/// NeuQuant sampling factor; lower is higher quality (1-30).
const SAMPLE_FAC: i32 = 10;

/// Alpha below this maps to the reserved transparency slot.
const ALPHA_CUTOFF: u8 = 128;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Reducer input: either a full-color canvas or an already-indexed frame.
pub enum Canvas {
    Rgba(RgbaImage),
    Indexed(IndexedFrame),
}

/// Reduce a canvas to a palette-indexed frame.
///
/// An already-indexed canvas is returned unchanged, reusing its palette. The
/// same canvas and background always yield a palette of the same length with
/// transparency in the same (final) slot; the quantized colors themselves are
/// internal to the quantizer.
pub fn reduce(canvas: Canvas, background: Option<Rgba<u8>>) -> IndexedFrame {
    let img = match canvas {
        Canvas::Indexed(frame) => return frame,
        Canvas::Rgba(img) => img,
    };

    let palette = ReservedPalette::build(&img, background);
    let (width, height) = img.dimensions();

    let mut work = img;
    imageops::dither(&mut work, &palette);
    let indices = imageops::index_colors(&work, &palette);

    IndexedFrame {
        width,
        height,
        transparent: Some(palette.transparent_index() as u8),
        palette: palette.flat_rgb(),
        pixels: indices.into_raw(),
    }
}

/// A quantized palette with reserved transparency (and background) entries.
///
/// Transparency always occupies the final slot. When the quantizer fills the
/// whole budget, the reservations overwrite the tail entries rather than grow
/// the palette; the background takes priority over one quantized color.
pub struct ReservedPalette {
    entries: Vec<Rgba<u8>>,
}

impl ReservedPalette {
    pub fn build(canvas: &RgbaImage, background: Option<Rgba<u8>>) -> Self {
        let quantizer = NeuQuant::new(SAMPLE_FAC, PALETTE_BUDGET, canvas.as_raw());
        let mut entries: Vec<Rgba<u8>> = quantizer
            .color_map_rgb()
            .chunks_exact(3)
            .map(|c| Rgba([c[0], c[1], c[2], 255]))
            .collect();

        if entries.len() >= PALETTE_BUDGET {
            entries.truncate(PALETTE_BUDGET);
            if let Some(bg) = background {
                entries[PALETTE_BUDGET - 2] = bg;
            }
            entries[PALETTE_BUDGET - 1] = TRANSPARENT;
        } else {
            if let Some(bg) = background {
                entries.push(bg);
            }
            entries.push(TRANSPARENT);
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn transparent_index(&self) -> usize {
        self.entries.len() - 1
    }

    /// Flat RGB triples for a GIF local color table.
    pub fn flat_rgb(&self) -> Vec<u8> {
        self.entries
            .iter()
            .flat_map(|px| [px.0[0], px.0[1], px.0[2]])
            .collect()
    }
}

impl ColorMap for ReservedPalette {
    type Color = Rgba<u8>;

    fn index_of(&self, color: &Rgba<u8>) -> usize {
        if color.0[3] < ALPHA_CUTOFF {
            return self.transparent_index();
        }
        let mut best = 0;
        let mut best_dist = u32::MAX;
        // Skip the transparency slot; opaque pixels never map to it.
        for (i, entry) in self.entries[..self.transparent_index()].iter().enumerate() {
            let dr = entry.0[0].abs_diff(color.0[0]) as u32;
            let dg = entry.0[1].abs_diff(color.0[1]) as u32;
            let db = entry.0[2].abs_diff(color.0[2]) as u32;
            let dist = dr * dr + dg * dg + db * db;
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best
    }

    fn map_color(&self, color: &mut Rgba<u8>) {
        *color = self.entries[self.index_of(color)];
    }

    fn lookup(&self, index: usize) -> Option<Rgba<u8>> {
        self.entries.get(index).copied()
    }

    fn has_lookup(&self) -> bool {
        true
    }
}
