//! # izero
//!
//! Named multi-size image derivatives. Give izero one decoded source image
//! (still or animated) and a list of size descriptors; it produces one fitted
//! variant per descriptor, concurrently, and reports success or failure per
//! size. Variants can be serialized in memory or persisted under
//! size-named subdirectories.
//!
//! # Architecture: Decode Once, Fan Out Per Size
//!
//! ```text
//! bytes ── decode ── SourceImage ──┬── fit → resample → compose            → "thumb"
//!                                  ├── fit → resample → compose            → "medium"
//!                                  └── fit → resample → compose → palette  → "banner"
//!                                        (one rayon task per descriptor)
//! ```
//!
//! Decoding happens exactly once per request and is a shared point of
//! failure: a corrupt source fails every size. After that each descriptor is
//! an independent unit of work; a failing size occupies its own slot in the
//! error map and never blocks its siblings. Callers must treat partial
//! success as a first-class outcome.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`size`] | [`SizeDescriptor`]: target box, fit mode, quality, background; validation |
//! | [`fit`] | Pure dimension math: which box to resample to under each mode |
//! | [`compose`] | Letterbox padding, centered crop-to-fill, background flattening |
//! | [`palette`] | 256-color quantization with reserved transparency/background slots |
//! | [`frames`] | Source/output data model: stills, diff-rect frame sequences |
//! | [`render`] | The per-descriptor pipeline, including the animation accumulation canvas |
//! | [`codec`] | Decode/encode (JPEG, PNG, animated GIF) and content sniffing |
//! | [`resized`] | [`ResizedImage`]: one finished variant, `to_bytes` / `save_to` |
//! | [`store`] | Storage sink: directory creation and byte writes |
//! | [`process`] | Fan-out controller: dispatch, aggregation, overall status |
//!
//! # Design Decisions
//!
//! ## Closed Mode Enum
//!
//! The fit policy is a closed enum ([`ResizeMode`]) matched exhaustively at
//! every consumption site, so an unhandled mode is a compile error rather
//! than a silent fallthrough.
//!
//! ## Diff-Rect Animation Model
//!
//! Animated frames are incremental: each carries only its changed rectangle.
//! Rendering keeps one persistent RGBA accumulation canvas per (source,
//! descriptor) pair and snapshots the full canvas for every output frame.
//! The canvas is owned by a single render call; concurrent size variants
//! each re-composite from scratch and share nothing.
//!
//! ## Message-Passing Aggregation
//!
//! The fan-out collects `(name, result)` tuples from the rayon tasks and
//! merges them into the result/error maps in one sequential step, so no map
//! is ever written from two threads.
//!
//! ## No Logging, No Retries
//!
//! The core returns every error and swallows none; logging and retry policy
//! belong to callers. There is no in-core cancellation: once dispatched, all
//! units run to completion or individual failure.
//!
//! # Example
//!
//! ```no_run
//! use izero::{process_file, ResizeMode, SizeDescriptor};
//! use std::path::Path;
//!
//! let sizes = vec![
//!     SizeDescriptor::new("thumb", 400, 400, ResizeMode::FitWithCrop),
//!     SizeDescriptor::new("medium", 1200, 900, ResizeMode::Fit),
//! ];
//! let outcome = process_file(Path::new("photo.jpg"), &sizes, Some(Path::new("out")))?;
//! outcome.status()?;
//! # Ok::<(), izero::ProcessError>(())
//! ```

pub mod codec;
pub mod compose;
pub mod fit;
pub mod frames;
pub mod palette;
pub mod process;
pub mod render;
pub mod resized;
pub mod size;
pub mod store;

pub use codec::{CodecError, ContentType, decode, detect};
pub use frames::{AnimationFrame, FrameSequence, IndexedFrame, IndexedSequence, SourceImage};
pub use process::{ProcessError, ProcessOutcome, process, process_file};
pub use render::{RenderError, ResizedPayload};
pub use resized::ResizedImage;
pub use size::{Dimensions, Quality, ResizeMode, SizeDescriptor, SizeError};
