//! Streaming normalization pipeline

mod normalizer;
mod padding;

pub use normalizer::{
    relay_chunks, spawn_normalizer, ChunkReceiver, ChunkWriter, RelayStats,
};
pub use padding::{encode_chunk, random_padding, EncodedChunk, PaddingMode};
