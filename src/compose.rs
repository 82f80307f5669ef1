//! Canvas compositing: turn a resampled image into the final fixed-size
//! canvas for its descriptor.
//!
//! Three primitives cover the crop and pad policies: [`pad_to_box`] letterboxes
//! into an exact target canvas, [`crop_to_box`] center-crops down to it, and
//! [`flatten_onto`] drops residual transparency onto a background. Mode
//! dispatch lives in [`compose_frame`].

use crate::size::{ResizeMode, SizeDescriptor};
use image::imageops;
use image::{Rgba, RgbaImage};

/// Produce the final canvas for one resampled frame.
///
/// `Fit` and `FitWithCrop` always emit exactly the descriptor's target box.
/// `Exact` is a pass-through unless a background is set (the resample already
/// produced the target dimensions). The single-axis modes have no fixed box
/// and pass through untouched.
pub fn compose_frame(resized: RgbaImage, desc: &SizeDescriptor) -> RgbaImage {
    let target = (desc.dimensions.width, desc.dimensions.height);
    let background = desc.background_pixel();
    match desc.mode {
        ResizeMode::Fit => pad_to_box(&resized, target, background),
        ResizeMode::FitWithCrop => crop_to_box(&resized, target, background),
        ResizeMode::Exact => match background {
            Some(bg) => flatten_onto(&resized, bg),
            None => resized,
        },
        ResizeMode::FitWidth | ResizeMode::FitHeight => resized,
    }
}

/// Letterbox `img` into an exact `target` canvas, centered.
///
/// With a background the canvas is filled first and the image alpha-blended
/// over it; without one the image is copied directly into the centered region
/// and the rest of the canvas stays transparent.
pub fn pad_to_box(
    img: &RgbaImage,
    target: (u32, u32),
    background: Option<Rgba<u8>>,
) -> RgbaImage {
    let (tw, th) = target;
    let (iw, ih) = img.dimensions();

    if (iw, ih) == (tw, th) {
        return match background {
            Some(bg) => flatten_onto(img, bg),
            None => img.clone(),
        };
    }

    let x = (tw as i64 - iw as i64) / 2;
    let y = (th as i64 - ih as i64) / 2;
    match background {
        Some(bg) => {
            let mut canvas = RgbaImage::from_pixel(tw, th, bg);
            imageops::overlay(&mut canvas, img, x, y);
            canvas
        }
        None => {
            let mut canvas = RgbaImage::new(tw, th);
            imageops::replace(&mut canvas, img, x, y);
            canvas
        }
    }
}

/// Center-crop `img` down to an exact `target` canvas.
///
/// The crop is clamped to the source bounds, so the output is always exactly
/// target-sized even if the fit stage undershot by a pixel. A background is
/// visually irrelevant when the crop fills the canvas, but is still honored
/// for residual transparency in the source.
pub fn crop_to_box(
    img: &RgbaImage,
    target: (u32, u32),
    background: Option<Rgba<u8>>,
) -> RgbaImage {
    let (tw, th) = target;
    let (iw, ih) = img.dimensions();

    let cw = tw.min(iw);
    let ch = th.min(ih);
    let cropped = imageops::crop_imm(img, (iw - cw) / 2, (ih - ch) / 2, cw, ch).to_image();

    let x = (tw as i64 - cw as i64) / 2;
    let y = (th as i64 - ch as i64) / 2;
    match background {
        Some(bg) => {
            let mut canvas = RgbaImage::from_pixel(tw, th, bg);
            imageops::overlay(&mut canvas, &cropped, x, y);
            canvas
        }
        None => {
            let mut canvas = RgbaImage::new(tw, th);
            imageops::replace(&mut canvas, &cropped, x, y);
            canvas
        }
    }
}

/// Alpha-blend `img` over an opaque canvas of `background`.
pub fn flatten_onto(img: &RgbaImage, background: Rgba<u8>) -> RgbaImage {
    let (w, h) = img.dimensions();
    let mut canvas = RgbaImage::from_pixel(w, h, background);
    imageops::overlay(&mut canvas, img, 0, 0);
    canvas
}
