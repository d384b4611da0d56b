//! Encode-time padding that hides token boundaries from frame sizes

use rand::distributions::{Alphanumeric, DistString};
use rand::Rng;

use crate::domain::{ChatStreamChunk, DomainError};

const MIN_PADDING: usize = 1;
const MAX_PADDING: usize = 64;

/// Whether encoded chunks get a random padding field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaddingMode {
    #[default]
    Enabled,
    /// Deterministic output for tests only
    #[cfg(test)]
    Disabled,
}

/// A chunk ready for the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedChunk {
    Data(String),
    Done,
}

pub fn random_padding() -> String {
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(MIN_PADDING..=MAX_PADDING);
    Alphanumeric.sample_string(&mut rng, len)
}

/// Serialize a chunk, padding it unless padding is disabled
pub fn encode_chunk(
    mut chunk: ChatStreamChunk,
    mode: PaddingMode,
) -> Result<EncodedChunk, DomainError> {
    if chunk.done {
        return Ok(EncodedChunk::Done);
    }

    if mode == PaddingMode::Enabled {
        chunk.padding = Some(random_padding());
    }

    serde_json::to_string(&chunk)
        .map(EncodedChunk::Data)
        .map_err(|e| DomainError::internal(format!("Failed to encode stream chunk: {}", e)))
}
