//! Per-descriptor rendering: the pipeline from a decoded source to one
//! finished variant.
//!
//! Stills run fit → Lanczos3 resample → compose. Animated sources run every
//! frame through the same stages plus palette reduction, compositing each
//! diff rectangle onto a persistent accumulation canvas first. Each call owns
//! its canvas outright; nothing is shared across concurrent size variants.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use thiserror::Error;

use crate::codec::CodecError;
use crate::compose;
use crate::fit;
use crate::frames::{FrameSequence, IndexedSequence, SourceImage};
use crate::palette::{self, Canvas};
use crate::size::{SizeDescriptor, SizeError};

/// A failure confined to one size variant's unit of work.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Size(#[from] SizeError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("animated source has no frames")]
    EmptySequence,
}

/// One finished variant: a still raster or an indexed frame sequence.
#[derive(Debug)]
pub enum ResizedPayload {
    Still(DynamicImage),
    Animated(IndexedSequence),
}

/// Render one descriptor against a decoded source.
pub fn render(source: &SourceImage, desc: &SizeDescriptor) -> Result<ResizedPayload, RenderError> {
    match source {
        SourceImage::Still(img) => render_still(img, desc).map(ResizedPayload::Still),
        SourceImage::Animated(seq) => render_animation(seq, desc).map(ResizedPayload::Animated),
    }
}

/// Render a still raster: validate, fit, resample, compose.
///
/// Resampling to the source's own dimensions is skipped entirely, so an
/// `Exact` descriptor matching the source (with no background) returns the
/// input pixels untouched.
pub fn render_still(
    img: &DynamicImage,
    desc: &SizeDescriptor,
) -> Result<DynamicImage, RenderError> {
    desc.validate()?;

    let orig = (img.width(), img.height());
    let dims = fit::compute_fit_dimensions(orig, desc);
    let resized = if dims == orig {
        img.clone()
    } else {
        img.resize_exact(dims.0, dims.1, FilterType::Lanczos3)
    };

    if desc.background.is_none() && compose_is_identity(&resized, desc) {
        return Ok(resized);
    }
    Ok(DynamicImage::ImageRgba8(compose::compose_frame(
        resized.into_rgba8(),
        desc,
    )))
}

/// True when composing would copy the image into an identical canvas.
///
/// Skipping the copy keeps the no-background pass-through byte-identical
/// instead of converting through RGBA.
fn compose_is_identity(resized: &DynamicImage, desc: &SizeDescriptor) -> bool {
    use crate::size::ResizeMode;
    match desc.mode {
        ResizeMode::Exact | ResizeMode::FitWidth | ResizeMode::FitHeight => true,
        ResizeMode::Fit | ResizeMode::FitWithCrop => {
            (resized.width(), resized.height()) == (desc.dimensions.width, desc.dimensions.height)
        }
    }
}

/// Render an animated sequence frame by frame.
///
/// Source frames are differential: each is alpha-composited onto the
/// accumulation canvas at its own offset, and the *full* canvas snapshot (not
/// the diff region) runs through fit → resample → compose → palette. The
/// canvas persists across frames and is never reset. The output carries the
/// sequence's single shared delay.
pub fn render_animation(
    seq: &FrameSequence,
    desc: &SizeDescriptor,
) -> Result<IndexedSequence, RenderError> {
    desc.validate()?;

    let first = seq.frames.first().ok_or(RenderError::EmptySequence)?;
    let mut canvas = RgbaImage::new(first.image.width(), first.image.height());

    let mut frames = Vec::with_capacity(seq.frames.len());
    for frame in &seq.frames {
        imageops::overlay(&mut canvas, &frame.image, frame.left as i64, frame.top as i64);

        let orig = canvas.dimensions();
        let dims = fit::compute_fit_dimensions(orig, desc);
        let resized = if dims == orig {
            canvas.clone()
        } else {
            imageops::resize(&canvas, dims.0, dims.1, FilterType::Lanczos3)
        };
        let composed = compose::compose_frame(resized, desc);
        frames.push(palette::reduce(
            Canvas::Rgba(composed),
            desc.background_pixel(),
        ));
    }

    Ok(IndexedSequence {
        frames,
        delay_cs: seq.delay_cs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::AnimationFrame;
    use crate::size::ResizeMode;
    use image::Rgba;

    fn still(w: u32, h: u32, px: Rgba<u8>) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, px))
    }

    #[test]
    fn exact_mode_hits_target_regardless_of_aspect() {
        let img = still(500, 375, Rgba([80, 80, 80, 255]));
        let out = render_still(&img, &SizeDescriptor::new("t", 64, 200, ResizeMode::Exact)).unwrap();
        assert_eq!((out.width(), out.height()), (64, 200));
    }

    #[test]
    fn exact_mode_same_dimensions_is_pixel_identical() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(90, 60, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 7, 255])
        }));
        let out =
            render_still(&img, &SizeDescriptor::new("t", 90, 60, ResizeMode::Exact)).unwrap();
        assert_eq!(out.as_bytes(), img.as_bytes());
    }

    #[test]
    fn crop_fill_thumb_is_exactly_target_sized() {
        // 500x375 into a 400x400 crop-fill thumb: center-cropped, no border.
        let img = still(500, 375, Rgba([200, 100, 50, 255]));
        let out = render_still(
            &img,
            &SizeDescriptor::new("thumb", 400, 400, ResizeMode::FitWithCrop),
        )
        .unwrap();
        assert_eq!((out.width(), out.height()), (400, 400));
        assert_eq!(
            out.to_rgba8().get_pixel(200, 200),
            &Rgba([200, 100, 50, 255])
        );
    }

    #[test]
    fn pad_fit_is_exactly_target_sized_with_letterbox() {
        let img = still(400, 400, Rgba([10, 200, 10, 255]));
        let out =
            render_still(&img, &SizeDescriptor::new("t", 200, 100, ResizeMode::Fit)).unwrap();
        assert_eq!((out.width(), out.height()), (200, 100));
        let rgba = out.to_rgba8();
        // 100x100 image centered in a 200x100 box: 50px transparent margins.
        assert_eq!(rgba.get_pixel(10, 50), &Rgba([0, 0, 0, 0]));
        assert_eq!(rgba.get_pixel(100, 50), &Rgba([10, 200, 10, 255]));
    }

    #[test]
    fn fit_width_output_follows_source_aspect() {
        let img = still(800, 400, Rgba([1, 2, 3, 255]));
        let out =
            render_still(&img, &SizeDescriptor::new("t", 200, 0, ResizeMode::FitWidth)).unwrap();
        assert_eq!((out.width(), out.height()), (200, 100));
    }

    #[test]
    fn invalid_descriptor_is_rejected_before_pixel_work() {
        let img = still(10, 10, Rgba([0, 0, 0, 255]));
        let err = render_still(&img, &SizeDescriptor::new("bad", 0, 100, ResizeMode::Fit))
            .unwrap_err();
        assert!(matches!(err, RenderError::Size(_)));
    }

    fn three_frame_sequence(w: u32, h: u32, delay_cs: u16) -> FrameSequence {
        let full = AnimationFrame {
            left: 0,
            top: 0,
            image: RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])),
        };
        // Later frames are small diff rects over the accumulated canvas.
        let diff1 = AnimationFrame {
            left: w / 2,
            top: 0,
            image: RgbaImage::from_pixel(w / 2, h, Rgba([0, 255, 0, 255])),
        };
        let diff2 = AnimationFrame {
            left: 0,
            top: 0,
            image: RgbaImage::from_pixel(w / 4, h, Rgba([0, 0, 255, 255])),
        };
        FrameSequence {
            frames: vec![full, diff1, diff2],
            delay_cs,
        }
    }

    #[test]
    fn animation_emits_one_indexed_frame_per_source_frame() {
        // 800x400 sequence into a 200x100 pad-fit: three frames, each exactly
        // the target box, sharing the source delay.
        let seq = three_frame_sequence(800, 400, 12);
        let out = render_animation(
            &seq,
            &SizeDescriptor::new("anim", 200, 100, ResizeMode::Fit),
        )
        .unwrap();
        assert_eq!(out.frames.len(), 3);
        assert_eq!(out.delay_cs, 12);
        for frame in &out.frames {
            assert_eq!((frame.width, frame.height), (200, 100));
            assert_eq!(frame.pixels.len(), 200 * 100);
            assert!(frame.transparent.is_some());
        }
    }

    #[test]
    fn animation_accumulates_diff_frames_over_prior_state() {
        // Frame 2 is a fully transparent diff rect: compositing it must leave
        // the accumulated canvas untouched, so frames 1 and 2 render
        // identically. Frame 3 paints an opaque region and must differ.
        let frames = vec![
            AnimationFrame {
                left: 0,
                top: 0,
                image: RgbaImage::from_pixel(32, 32, Rgba([255, 0, 0, 255])),
            },
            AnimationFrame {
                left: 16,
                top: 0,
                image: RgbaImage::from_pixel(16, 32, Rgba([0, 0, 0, 0])),
            },
            AnimationFrame {
                left: 0,
                top: 0,
                image: RgbaImage::from_pixel(16, 32, Rgba([0, 0, 255, 255])),
            },
        ];
        let seq = FrameSequence { frames, delay_cs: 0 };
        let out = render_animation(&seq, &SizeDescriptor::new("t", 32, 32, ResizeMode::Exact))
            .unwrap();

        assert_eq!(out.frames[0], out.frames[1]);
        assert_ne!(out.frames[1], out.frames[2]);
        // A reset canvas would leave frame 2 transparent where frame 1 drew.
        let t = out.frames[1].transparent.unwrap();
        assert!(out.frames[1].pixels.iter().all(|&i| i != t));
    }

    #[test]
    fn empty_sequence_is_a_render_error() {
        let seq = FrameSequence {
            frames: Vec::new(),
            delay_cs: 0,
        };
        let err = render_animation(&seq, &SizeDescriptor::new("t", 8, 8, ResizeMode::Fit))
            .unwrap_err();
        assert!(matches!(err, RenderError::EmptySequence));
    }

    #[test]
    fn animation_validation_failure_reports_the_size_error() {
        let seq = three_frame_sequence(8, 8, 0);
        let err = render_animation(&seq, &SizeDescriptor::new("t", 0, 0, ResizeMode::Fit))
            .unwrap_err();
        assert!(matches!(err, RenderError::Size(_)));
    }
}
