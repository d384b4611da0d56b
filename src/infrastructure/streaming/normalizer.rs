//! Turns a provider's native stream into uniform chunks for the caller.
//!
//! One background task drains the native stream into a bounded queue with a
//! single reader. A clean end produces exactly one done chunk, a failure
//! exactly one error chunk, and cancellation neither.

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::padding::{encode_chunk, EncodedChunk, PaddingMode};
use crate::domain::{ChatStreamChunk, DomainError, LlmStream};

const QUEUE_CAPACITY: usize = 32;

/// Receiving end of a normalized stream
pub type ChunkReceiver = mpsc::Receiver<ChatStreamChunk>;

/// Spawn the decode task; the upstream stream is dropped when it exits
pub fn spawn_normalizer(native: LlmStream, cancel: CancellationToken) -> ChunkReceiver {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);

    tokio::spawn(async move {
        let emitted = pump(native, &tx, &cancel).await;
        debug!(emitted, "Stream normalizer finished");
    });

    rx
}

async fn pump(
    mut native: LlmStream,
    tx: &mpsc::Sender<ChatStreamChunk>,
    cancel: &CancellationToken,
) -> usize {
    let created = Utc::now().timestamp();
    let mut emitted = 0;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Stream cancelled by caller");
                return emitted;
            }
            next = native.next() => next,
        };

        let (chunk, terminal) = match next {
            Some(Ok(chunk)) => (ChatStreamChunk::from_native(chunk, created), false),
            Some(Err(e)) if e.is_cancelled() => return emitted,
            Some(Err(e)) => {
                warn!(error = %e, emitted, "Upstream stream failed");
                (ChatStreamChunk::error(&e, created), true)
            }
            None => (ChatStreamChunk::done(created), true),
        };

        if !send(tx, chunk, cancel).await {
            return emitted;
        }
        emitted += 1;

        if terminal {
            return emitted;
        }
    }
}

/// False when the caller cancelled or the reader is gone
async fn send(
    tx: &mpsc::Sender<ChatStreamChunk>,
    chunk: ChatStreamChunk,
    cancel: &CancellationToken,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = tx.send(chunk) => sent.is_ok(),
    }
}

/// Sink for encoded chunks, e.g. an SSE response body
#[async_trait]
pub trait ChunkWriter: Send {
    async fn write_chunk(&mut self, chunk: EncodedChunk) -> Result<(), DomainError>;
}

/// Outcome of relaying one stream
#[derive(Debug, Default)]
pub struct RelayStats {
    pub written: usize,
    pub discarded: usize,
    pub write_error: Option<DomainError>,
}

/// Drain the queue into `writer`.
///
/// After the first write failure the remaining chunks are still received but
/// discarded, so the producer never blocks on a full queue.
pub async fn relay_chunks<W: ChunkWriter>(
    mut rx: ChunkReceiver,
    writer: &mut W,
    mode: PaddingMode,
) -> RelayStats {
    let mut stats = RelayStats::default();

    while let Some(chunk) = rx.recv().await {
        if stats.write_error.is_some() {
            stats.discarded += 1;
            continue;
        }

        let result = match encode_chunk(chunk, mode) {
            Ok(encoded) => writer.write_chunk(encoded).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => stats.written += 1,
            Err(e) => {
                debug!(error = %e, "Stream write failed, draining remaining chunks");
                stats.discarded += 1;
                stats.write_error = Some(e);
            }
        }
    }

    stats
}
