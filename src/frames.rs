//! Source and output image data models.
//!
//! A decoded source is either one still raster or an ordered frame sequence.
//! Animated frames are differential: each carries its own bounding rectangle
//! and is composited over the accumulated state of the frames before it (see
//! [`render::render_animation`](crate::render::render_animation)). Animated
//! output is a sequence of palette-indexed frames sharing a single delay.

use image::{DynamicImage, RgbaImage};

/// A decoded source image, immutable for the lifetime of a request.
#[derive(Debug)]
pub enum SourceImage {
    Still(DynamicImage),
    Animated(FrameSequence),
}

impl SourceImage {
    /// Dimensions of the still raster, or of the first frame's bounds for an
    /// animated source. `None` for an empty sequence.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            SourceImage::Still(img) => Some((img.width(), img.height())),
            SourceImage::Animated(seq) => seq.frames.first().map(|f| f.image.dimensions()),
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self, SourceImage::Animated(_))
    }
}

/// An ordered animated sequence with a single shared display delay.
///
/// The delay is collapsed from the source's first frame at decode time and
/// applied to every output frame; per-frame timing is not preserved.
#[derive(Debug)]
pub struct FrameSequence {
    pub frames: Vec<AnimationFrame>,
    /// Display delay in centiseconds, shared by all frames.
    pub delay_cs: u16,
}

/// One source frame: an RGBA diff rectangle at its own offset.
#[derive(Debug)]
pub struct AnimationFrame {
    pub left: u32,
    pub top: u32,
    pub image: RgbaImage,
}

/// Animated output: palette-indexed frames plus the shared delay.
#[derive(Debug)]
pub struct IndexedSequence {
    pub frames: Vec<IndexedFrame>,
    pub delay_cs: u16,
}

/// A raster whose pixels index into a bounded (≤256-entry) color table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFrame {
    pub width: u32,
    pub height: u32,
    /// Flat RGB triples, at most 256 entries.
    pub palette: Vec<u8>,
    /// Palette slot rendered as fully transparent.
    pub transparent: Option<u8>,
    /// One palette index per pixel, row-major.
    pub pixels: Vec<u8>,
}
