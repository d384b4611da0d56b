//! Chat completions endpoint handler

use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, Json};
use crate::domain::DomainError;
use crate::infrastructure::services::Dispatched;
use crate::infrastructure::streaming::{
    relay_chunks, ChunkReceiver, ChunkWriter, EncodedChunk, PaddingMode,
};

const SSE_BUFFER: usize = 32;
const DONE_SENTINEL: &str = "[DONE]";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// POST /v1/chat/completions
pub async fn create_chat_completion(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Response, ApiError> {
    let request_id = request_id(&headers);

    info!(
        request_id = %request_id,
        model = %request.model,
        stream = request.stream,
        messages = request.messages.len(),
        "Processing chat completion request"
    );

    let chat = request.into_domain()?;
    let instance = state.instance().await;
    let cancel = CancellationToken::new();

    // Cancels the upstream call if the client disconnects before a response
    let guard = cancel.clone().drop_guard();

    match instance.dispatcher().dispatch(chat, &cancel).await? {
        Dispatched::Complete(response) => {
            Ok(Json(ChatCompletionResponse::from(response)).into_response())
        }
        Dispatched::Stream(rx) => {
            let _ = guard.disarm();
            Ok(stream_response(rx, cancel, request_id))
        }
    }
}

/// The id `SetRequestIdLayer` stamped on the request, so handler and
/// middleware logs agree
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn stream_response(
    rx: ChunkReceiver,
    cancel: CancellationToken,
    request_id: String,
) -> Response {
    let (tx, events) = mpsc::channel::<Result<Event, Infallible>>(SSE_BUFFER);

    tokio::spawn(async move {
        let disconnected = tx.clone();
        let mut writer = SseChunkWriter {
            tx,
            cancel: cancel.clone(),
        };

        tokio::select! {
            stats = relay_chunks(rx, &mut writer, PaddingMode::default()) => {
                debug!(
                    request_id = %request_id,
                    written = stats.written,
                    discarded = stats.discarded,
                    client_gone = stats.write_error.is_some(),
                    "Chat stream finished"
                );
            }
            // Upstream may be idle; don't wait for the next chunk to notice
            _ = disconnected.closed() => {
                cancel.cancel();
                debug!(request_id = %request_id, "Client disconnected from chat stream");
            }
        }
    });

    Sse::new(ReceiverStream::new(events))
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// Frames encoded chunks as SSE `data:` events
struct SseChunkWriter {
    tx: mpsc::Sender<Result<Event, Infallible>>,
    cancel: CancellationToken,
}

#[async_trait]
impl ChunkWriter for SseChunkWriter {
    async fn write_chunk(&mut self, chunk: EncodedChunk) -> Result<(), DomainError> {
        let event = match chunk {
            EncodedChunk::Data(json) => Event::default().data(json),
            EncodedChunk::Done => Event::default().data(DONE_SENTINEL),
        };

        if self.tx.send(Ok(event)).await.is_err() {
            // Response body dropped: stop the upstream stream
            self.cancel.cancel();
            return Err(DomainError::Cancelled);
        }

        Ok(())
    }
}
