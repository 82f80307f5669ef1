//! Size descriptors: the validated specification of one named target variant.
//!
//! A [`SizeDescriptor`] describes *what* to produce, not *how*: the
//! [`fit`](crate::fit) module turns it into resample dimensions and the
//! [`compose`](crate::compose) module into a finished canvas. Descriptors are
//! plain serde-friendly data so size sets can live in config documents.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeError {
    #[error("invalid dimensions for size '{0}'")]
    InvalidDimensions(String),
}

/// Target box for a variant, in pixels.
///
/// A zero axis is only meaningful under [`ResizeMode::FitWidth`] /
/// [`ResizeMode::FitHeight`], where it marks the axis derived from the
/// source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Round each odd axis down to the nearest even number.
    ///
    /// Some downstream consumers (video posters, chroma-subsampled encoders)
    /// reject odd dimensions; this snaps a descriptor to the closest box they
    /// accept without growing it.
    pub fn evened(self) -> Self {
        Self {
            width: self.width - self.width % 2,
            height: self.height - self.height % 2,
        }
    }
}

/// Aspect-ratio policy for fitting a source into the target box.
///
/// Every consumption site matches exhaustively, so adding a mode is a
/// compile-visible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Resample to the target box verbatim; aspect ratio is not preserved.
    Exact,
    /// Largest aspect-preserving box inside the target, then letterbox.
    Fit,
    /// Smallest aspect-preserving box covering the target, then center-crop.
    FitWithCrop,
    /// Width is authoritative; height follows the source aspect ratio.
    FitWidth,
    /// Height is authoritative; width follows the source aspect ratio.
    FitHeight,
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// One named output variant: target box, fit policy, encode hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeDescriptor {
    /// Unique key within a request; names the output subdirectory and the
    /// slot in the result/error maps.
    pub name: String,
    pub dimensions: Dimensions,
    pub mode: ResizeMode,
    /// Lossy encode hint; irrelevant to palette formats.
    #[serde(default)]
    pub quality: Quality,
    /// RGBA padding/letterbox fill, also reserved as a palette entry for
    /// animated output. `None` means transparent padding.
    #[serde(default)]
    pub background: Option<[u8; 4]>,
}

impl SizeDescriptor {
    pub fn new(name: impl Into<String>, width: u32, height: u32, mode: ResizeMode) -> Self {
        Self {
            name: name.into(),
            dimensions: Dimensions::new(width, height),
            mode,
            quality: Quality::default(),
            background: None,
        }
    }

    pub fn with_background(mut self, rgba: [u8; 4]) -> Self {
        self.background = Some(rgba);
        self
    }

    pub fn background_pixel(&self) -> Option<image::Rgba<u8>> {
        self.background.map(image::Rgba)
    }

    /// Check the dimensions/mode invariant, once per descriptor, before any
    /// pixel work. `FitWidth`/`FitHeight` require exactly one positive axis;
    /// every other mode requires both axes strictly positive.
    pub fn validate(&self) -> Result<(), SizeError> {
        let Dimensions { width, height } = self.dimensions;
        let ok = match self.mode {
            ResizeMode::FitWidth => width > 0 && height == 0,
            ResizeMode::FitHeight => height > 0 && width == 0,
            ResizeMode::Exact | ResizeMode::Fit | ResizeMode::FitWithCrop => {
                width > 0 && height > 0
            }
        };
        if ok {
            Ok(())
        } else {
            Err(SizeError::InvalidDimensions(self.name.clone()))
        }
    }
}
