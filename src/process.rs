//! Fan-out controller: one independent unit of work per requested size.
//!
//! A request decodes once, then dispatches one rendering unit per descriptor
//! onto the rayon pool. Units never wait on each other; each reports a
//! `(name, result)` tuple, and the tuples are merged into the result and
//! error maps in a single non-concurrent step after every unit completes.
//! One descriptor's failure never aborts or blocks its siblings, so partial
//! success is a first-class outcome: inspect [`ProcessOutcome::errors`] (or
//! call [`ProcessOutcome::status`]) to distinguish total from partial
//! failure. No unit is retried and nothing is cancelled mid-flight.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;

use crate::codec::{self, CodecError, ContentType};
use crate::frames::SourceImage;
use crate::render::{self, RenderError};
use crate::resized::ResizedImage;
use crate::size::SizeDescriptor;
use crate::store;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("missing image name")]
    MissingName,
    #[error("no target sizes requested")]
    NoSizes,
    #[error("invalid image type: {0}")]
    InvalidImageType(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("{failed} of {total} sizes failed")]
    SizesFailed { failed: usize, total: usize },
}

/// The two keyed mappings a request produces. A given descriptor name appears
/// in exactly one of them.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub images: BTreeMap<String, ResizedImage>,
    pub errors: BTreeMap<String, RenderError>,
}

impl ProcessOutcome {
    /// `Ok` only when every requested size succeeded.
    pub fn status(&self) -> Result<(), ProcessError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ProcessError::SizesFailed {
                failed: self.errors.len(),
                total: self.images.len() + self.errors.len(),
            })
        }
    }
}

/// Produce every requested variant of a decoded source.
///
/// Fails fast on a blank `name`, an empty `sizes` list, or (when persisting)
/// an uncreatable destination root; everything after that is per-size.
/// Descriptor names are assumed unique within a request. With a
/// `destination`, each successful variant is written to
/// `destination/<size name>/<name>`; without one, results stay in memory for
/// [`ResizedImage::to_bytes`].
pub fn process(
    source: &SourceImage,
    name: &str,
    content_type: ContentType,
    sizes: &[SizeDescriptor],
    destination: Option<&Path>,
) -> Result<ProcessOutcome, ProcessError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProcessError::MissingName);
    }
    if sizes.is_empty() {
        return Err(ProcessError::NoSizes);
    }
    if let Some(dest) = destination {
        store::ensure_dir(dest)?;
    }

    let reports: Vec<(String, Result<ResizedImage, RenderError>)> = sizes
        .par_iter()
        .map(|desc| {
            let result = render_one(source, name, content_type, desc, destination);
            (desc.name.clone(), result)
        })
        .collect();

    let mut images = BTreeMap::new();
    let mut errors = BTreeMap::new();
    for (size_name, result) in reports {
        match result {
            Ok(img) => {
                images.insert(size_name, img);
            }
            Err(err) => {
                errors.insert(size_name, err);
            }
        }
    }
    Ok(ProcessOutcome { images, errors })
}

/// One unit of work: validate, render, optionally persist.
fn render_one(
    source: &SourceImage,
    name: &str,
    content_type: ContentType,
    desc: &SizeDescriptor,
    destination: Option<&Path>,
) -> Result<ResizedImage, RenderError> {
    let payload = render::render(source, desc)?;
    let img = ResizedImage {
        name: name.to_string(),
        content_type,
        descriptor: desc.clone(),
        payload,
    };
    if let Some(dest) = destination {
        img.save_to(dest)?;
    }
    Ok(img)
}

/// Read, sniff, decode, and process a file from disk.
///
/// The claimed extension must match the sniffed content; a mismatch (or an
/// unsupported extension) fails the whole request before decode. The file
/// name becomes the output name for persisted variants.
pub fn process_file(
    path: &Path,
    sizes: &[SizeDescriptor],
    destination: Option<&Path>,
) -> Result<ProcessOutcome, ProcessError> {
    let bytes = std::fs::read(path)?;

    let claimed = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ContentType::from_extension)
        .ok_or_else(|| ProcessError::InvalidImageType(path.to_path_buf()))?;
    let detected =
        codec::detect(&bytes).ok_or_else(|| ProcessError::InvalidImageType(path.to_path_buf()))?;
    if detected != claimed {
        return Err(ProcessError::InvalidImageType(path.to_path_buf()));
    }

    let source = codec::decode(&bytes, detected)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(ProcessError::MissingName)?;
    process(&source, name, detected, sizes, destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ResizedPayload;
    use crate::size::ResizeMode;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn still_source(w: u32, h: u32) -> SourceImage {
        SourceImage::Still(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            w,
            h,
            Rgba([120, 130, 140, 255]),
        )))
    }

    fn three_descriptors() -> Vec<SizeDescriptor> {
        vec![
            SizeDescriptor::new("large", 400, 300, ResizeMode::Fit),
            // Invalid: zero width under fit mode.
            SizeDescriptor::new("broken", 0, 300, ResizeMode::Fit),
            SizeDescriptor::new("thumb", 100, 100, ResizeMode::FitWithCrop),
        ]
    }

    #[test]
    fn blank_name_fails_fast() {
        let source = still_source(100, 100);
        let sizes = [SizeDescriptor::new("t", 50, 50, ResizeMode::Fit)];
        assert!(matches!(
            process(&source, "   ", ContentType::Png, &sizes, None),
            Err(ProcessError::MissingName)
        ));
    }

    #[test]
    fn empty_size_list_fails_fast() {
        let source = still_source(100, 100);
        assert!(matches!(
            process(&source, "a.png", ContentType::Png, &[], None),
            Err(ProcessError::NoSizes)
        ));
    }

    #[test]
    fn one_bad_descriptor_yields_partial_success() {
        let source = still_source(500, 375);
        let outcome = process(
            &source,
            "photo.png",
            ContentType::Png,
            &three_descriptors(),
            None,
        )
        .unwrap();

        assert_eq!(outcome.images.len(), 2);
        assert!(outcome.images.contains_key("large"));
        assert!(outcome.images.contains_key("thumb"));
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            outcome.errors.get("broken"),
            Some(RenderError::Size(_))
        ));
        assert!(matches!(
            outcome.status(),
            Err(ProcessError::SizesFailed {
                failed: 1,
                total: 3
            })
        ));
    }

    #[test]
    fn all_valid_descriptors_give_ok_status() {
        let source = still_source(500, 375);
        let sizes = [
            SizeDescriptor::new("a", 250, 250, ResizeMode::FitWithCrop),
            SizeDescriptor::new("b", 100, 0, ResizeMode::FitWidth),
        ];
        let outcome = process(&source, "p.png", ContentType::Png, &sizes, None).unwrap();
        assert!(outcome.status().is_ok());
        assert_eq!(outcome.images.len(), 2);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn results_carry_the_expected_dimensions() {
        let source = still_source(500, 375);
        let sizes = [SizeDescriptor::new("thumb", 400, 400, ResizeMode::FitWithCrop)];
        let outcome = process(&source, "p.png", ContentType::Png, &sizes, None).unwrap();
        let ResizedPayload::Still(img) = &outcome.images["thumb"].payload else {
            panic!("still source produced an animated payload");
        };
        assert_eq!((img.width(), img.height()), (400, 400));
    }

    #[test]
    fn persistence_writes_one_subdirectory_per_size() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dest = tmp.path().join("out");
        let source = still_source(300, 300);
        let sizes = [
            SizeDescriptor::new("small", 50, 50, ResizeMode::Fit),
            SizeDescriptor::new("medium", 150, 150, ResizeMode::Fit),
        ];

        let outcome = process(&source, "pic.png", ContentType::Png, &sizes, Some(&dest)).unwrap();

        assert!(outcome.status().is_ok());
        assert!(dest.join("small/pic.png").is_file());
        assert!(dest.join("medium/pic.png").is_file());
    }

    #[test]
    fn failed_size_does_not_block_persisted_siblings() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dest = tmp.path().join("out");
        let source = still_source(300, 300);

        let outcome = process(
            &source,
            "pic.png",
            ContentType::Png,
            &three_descriptors(),
            Some(&dest),
        )
        .unwrap();

        assert_eq!(outcome.errors.len(), 1);
        assert!(dest.join("large/pic.png").is_file());
        assert!(dest.join("thumb/pic.png").is_file());
        assert!(!dest.join("broken").exists());
    }

    #[test]
    fn process_file_rejects_extension_content_mismatch() {
        let tmp = tempfile::TempDir::new().unwrap();
        // PNG bytes behind a .gif extension.
        let img = DynamicImage::ImageRgba8(RgbaImage::new(8, 8));
        let path = tmp.path().join("fake.gif");
        let bytes =
            codec::encode_still(&img, ContentType::Png, crate::size::Quality::default()).unwrap();
        std::fs::write(&path, bytes).unwrap();

        let sizes = [SizeDescriptor::new("t", 4, 4, ResizeMode::Fit)];
        assert!(matches!(
            process_file(&path, &sizes, None),
            Err(ProcessError::InvalidImageType(_))
        ));
    }

    #[test]
    fn process_file_rejects_unsupported_extensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();
        let sizes = [SizeDescriptor::new("t", 4, 4, ResizeMode::Fit)];
        assert!(matches!(
            process_file(&path, &sizes, None),
            Err(ProcessError::InvalidImageType(_))
        ));
    }

    #[test]
    fn process_file_missing_file_is_an_io_error() {
        let sizes = [SizeDescriptor::new("t", 4, 4, ResizeMode::Fit)];
        assert!(matches!(
            process_file(Path::new("/nonexistent/photo.png"), &sizes, None),
            Err(ProcessError::Io(_))
        ));
    }
}
