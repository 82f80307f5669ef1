//! Pure fit calculations: descriptor + source dimensions in, resample
//! dimensions out.
//!
//! All functions here are pure and testable without any I/O or pixels. The
//! actual Lanczos3 resample happens in [`render`](crate::render).

use crate::size::{Dimensions, ResizeMode, SizeDescriptor};

/// Compute the intermediate resample dimensions for a descriptor.
///
/// `Exact` returns the target box verbatim (no aspect preservation). The
/// single-axis modes derive the zero axis from the source aspect ratio. `Fit`
/// and `FitWithCrop` compute an aspect-preserving box that respectively fits
/// inside or covers the target box; the compositor then letterboxes or
/// center-crops to the exact target.
pub fn compute_fit_dimensions(orig: (u32, u32), desc: &SizeDescriptor) -> (u32, u32) {
    let Dimensions { width, height } = desc.dimensions;
    match desc.mode {
        ResizeMode::Exact => (width, height),
        ResizeMode::FitWidth => (width, scaled_axis(orig.1, orig.0, width)),
        ResizeMode::FitHeight => (scaled_axis(orig.0, orig.1, height), height),
        ResizeMode::Fit => bounded_fit(orig, (width, height), false),
        ResizeMode::FitWithCrop => bounded_fit(orig, (width, height), true),
    }
}

/// Derive one axis from the other under the source aspect ratio.
fn scaled_axis(derived: u32, authoritative: u32, target: u32) -> u32 {
    (derived as f64 * target as f64 / authoritative as f64)
        .round()
        .max(1.0) as u32
}

/// Aspect-preserving box calculation shared by `Fit` and `FitWithCrop`.
///
/// With `cover` the result is the smallest box fully covering the target;
/// without it, the largest box fully inside the target.
fn bounded_fit(orig: (u32, u32), target: (u32, u32), cover: bool) -> (u32, u32) {
    if orig == target {
        return orig;
    }

    let (tw, th) = (target.0 as f64, target.1 as f64);
    let (mut w, mut h) = (orig.0 as f64, orig.1 as f64);

    // Pre-normalization compares BOTH source axes against the target width.
    // This width-referenced scale is part of the sizing contract (it decides
    // which branch below fires); keep it as-is.
    if w > tw && h > tw {
        let scale = w / tw;
        w /= scale;
        h /= scale;
    }
    if w < tw && h < tw {
        let scale = tw / w;
        w *= scale;
        h *= scale;
    }

    let (new_w, new_h) = if cover {
        if w < tw {
            let (mut nw, mut nh) = (tw, h * tw / w);
            if nh < th {
                nw = th * w / h;
                nh = th;
            }
            (nw, nh)
        } else if h < th {
            let (mut nw, mut nh) = (w * th / h, th);
            if nw < tw {
                nh = tw * h / w;
                nw = tw;
            }
            (nw, nh)
        } else {
            (w, h)
        }
    } else if w > tw {
        let (mut nw, mut nh) = (tw, h * tw / w);
        if nh > th {
            nw = th * w / h;
            nh = th;
        }
        (nw, nh)
    } else if h > th {
        let (mut nw, mut nh) = (w * th / h, th);
        if nw > tw {
            nh = tw * h / w;
            nw = tw;
        }
        (nw, nh)
    } else {
        (w, h)
    };

    (new_w as u32, new_h as u32)
}
