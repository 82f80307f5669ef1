//! Decode, encode, and content sniffing for the supported formats.
//!
//! Stills (JPEG, PNG) go through the image crate. Animated GIF uses the gif
//! crate directly: decode keeps each frame's own bounding rectangle and delay
//! for the accumulation pipeline, and encode writes the palette-indexed
//! frames the reducer produced instead of re-quantizing.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;

use crate::frames::{AnimationFrame, FrameSequence, IndexedSequence, SourceImage};
use crate::size::Quality;

/// Bytes of the head considered by [`detect`].
const SNIFF_LEN: usize = 512;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("content type {0} does not match this payload")]
    ContentTypeMismatch(&'static str),
}

/// Supported content types, matched by sniffing and by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Jpeg,
    Png,
    Gif,
}

impl ContentType {
    pub fn mime(self) -> &'static str {
        match self {
            ContentType::Jpeg => "image/jpeg",
            ContentType::Png => "image/png",
            ContentType::Gif => "image/gif",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(ContentType::Jpeg),
            "image/png" => Some(ContentType::Png),
            "image/gif" => Some(ContentType::Gif),
            _ => None,
        }
    }

    /// Map a file extension (without the dot, any case) to a content type.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ContentType::Jpeg),
            "png" => Some(ContentType::Png),
            "gif" => Some(ContentType::Gif),
            _ => None,
        }
    }
}

/// Sniff the actual content type from the first bytes of a file.
///
/// Used upstream to validate that a claimed extension matches the bytes
/// before any decode is attempted. Only the first 512 bytes are considered.
pub fn detect(bytes: &[u8]) -> Option<ContentType> {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    match image::guess_format(head).ok()? {
        ImageFormat::Jpeg => Some(ContentType::Jpeg),
        ImageFormat::Png => Some(ContentType::Png),
        ImageFormat::Gif => Some(ContentType::Gif),
        _ => None,
    }
}

/// Decode source bytes under a known content type.
///
/// GIF always decodes to an animated sequence, even with a single frame;
/// the still formats decode to one raster. Errors here abort the whole
/// request: every size variant shares this one decode.
pub fn decode(bytes: &[u8], content_type: ContentType) -> Result<SourceImage, CodecError> {
    match content_type {
        ContentType::Gif => decode_gif(bytes).map(SourceImage::Animated),
        ContentType::Jpeg => decode_still(bytes, ImageFormat::Jpeg),
        ContentType::Png => decode_still(bytes, ImageFormat::Png),
    }
}

fn decode_still(bytes: &[u8], format: ImageFormat) -> Result<SourceImage, CodecError> {
    image::load_from_memory_with_format(bytes, format)
        .map(SourceImage::Still)
        .map_err(|e| CodecError::Decode(e.to_string()))
}

/// Decode every GIF frame as an RGBA diff rectangle with its own offset.
///
/// The sequence delay is collapsed to the first frame's delay; per-frame
/// timing is not preserved.
fn decode_gif(bytes: &[u8]) -> Result<FrameSequence, CodecError> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options
        .read_info(Cursor::new(bytes))
        .map_err(|e| CodecError::Decode(e.to_string()))?;

    let mut frames = Vec::new();
    let mut delay_cs = 0;
    while let Some(frame) = decoder
        .read_next_frame()
        .map_err(|e| CodecError::Decode(e.to_string()))?
    {
        if frames.is_empty() {
            delay_cs = frame.delay;
        }
        let image = RgbaImage::from_raw(
            frame.width as u32,
            frame.height as u32,
            frame.buffer.to_vec(),
        )
        .ok_or_else(|| CodecError::Decode("frame buffer size mismatch".to_string()))?;
        frames.push(AnimationFrame {
            left: frame.left as u32,
            top: frame.top as u32,
            image,
        });
    }

    if frames.is_empty() {
        return Err(CodecError::Decode("no frames in animated source".to_string()));
    }
    Ok(FrameSequence { frames, delay_cs })
}

/// Serialize a finished still raster.
///
/// The quality hint only affects JPEG; PNG is lossless. JPEG cannot carry an
/// alpha channel, so RGBA canvases are flattened to RGB first.
pub fn encode_still(
    img: &DynamicImage,
    content_type: ContentType,
    quality: Quality,
) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    match content_type {
        ContentType::Jpeg => {
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.value());
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| CodecError::Encode(e.to_string()))?;
        }
        ContentType::Png => {
            img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
                .map_err(|e| CodecError::Encode(e.to_string()))?;
        }
        ContentType::Gif => return Err(CodecError::ContentTypeMismatch("image/gif")),
    }
    Ok(out)
}

/// Serialize an indexed sequence as an animated GIF.
///
/// Each frame carries its own local color table and transparent index, the
/// shared delay, and keep-disposal so frames layer the way the accumulation
/// pipeline rendered them. The animation loops indefinitely.
pub fn encode_animation(seq: &IndexedSequence) -> Result<Vec<u8>, CodecError> {
    let first = seq
        .frames
        .first()
        .ok_or_else(|| CodecError::Encode("empty frame sequence".to_string()))?;

    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, first.width as u16, first.height as u16, &[])
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        encoder
            .set_repeat(gif::Repeat::Infinite)
            .map_err(|e| CodecError::Encode(e.to_string()))?;

        for frame in &seq.frames {
            let gif_frame = gif::Frame {
                width: frame.width as u16,
                height: frame.height as u16,
                buffer: std::borrow::Cow::Borrowed(&frame.pixels),
                palette: Some(frame.palette.clone()),
                transparent: frame.transparent,
                delay: seq.delay_cs,
                dispose: gif::DisposalMethod::Keep,
                ..gif::Frame::default()
            };
            encoder
                .write_frame(&gif_frame)
                .map_err(|e| CodecError::Encode(e.to_string()))?;
        }
    }
    Ok(out)
}
