//! The finished output of one (source, descriptor) pair.

use std::path::{Path, PathBuf};

use crate::codec::{self, CodecError, ContentType};
use crate::render::ResizedPayload;
use crate::size::SizeDescriptor;
use crate::store;

/// One finished variant, owned by the caller (or the result map) until it is
/// serialized or persisted.
#[derive(Debug)]
pub struct ResizedImage {
    /// Original image name; persisted files keep it.
    pub name: String,
    pub content_type: ContentType,
    pub descriptor: SizeDescriptor,
    pub payload: ResizedPayload,
}

impl ResizedImage {
    /// Serialize in-memory, for callers that do not persist to storage.
    ///
    /// Stills encode under the original content type with the descriptor's
    /// quality hint; animated payloads encode as GIF.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        match &self.payload {
            ResizedPayload::Still(img) => {
                codec::encode_still(img, self.content_type, self.descriptor.quality)
            }
            ResizedPayload::Animated(seq) => match self.content_type {
                ContentType::Gif => codec::encode_animation(seq),
                other => Err(CodecError::ContentTypeMismatch(other.mime())),
            },
        }
    }

    /// Persist under `dest/<size name>/<image name>`, creating the size
    /// subdirectory as needed. Returns the written path.
    pub fn save_to(&self, dest: &Path) -> Result<PathBuf, CodecError> {
        let dir = dest.join(&self.descriptor.name);
        store::ensure_dir(&dir)?;
        let path = dir.join(&self.name);
        store::write_bytes(&path, &self.to_bytes()?)?;
        Ok(path)
    }
}
