//! Server-sent event decoding shared by every streaming adapter

use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::StreamExt;

use super::http_client::ByteStream;
use crate::domain::{DomainError, LlmStream, StreamChunk};

/// What a provider makes of one SSE event
#[derive(Debug)]
pub enum SseStep {
    Chunk(StreamChunk),
    Skip,
    End,
}

/// Decode an SSE body with a provider-specific event decoder.
///
/// The stream stops after the first error; a body that closes without an
/// explicit end marker is treated as a clean end.
pub fn decode_sse<F>(bytes: ByteStream, mut decode: F) -> LlmStream
where
    F: FnMut(&Event) -> Result<SseStep, DomainError> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut events = Box::pin(bytes.eventsource());

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(EventStreamError::Transport(e)) => {
                    yield Err(e);
                    return;
                }
                Err(e) => {
                    yield Err(DomainError::stream(format!("Malformed event stream: {}", e)));
                    return;
                }
            };

            match decode(&event) {
                Ok(SseStep::Chunk(chunk)) => yield Ok(chunk),
                Ok(SseStep::Skip) => {}
                Ok(SseStep::End) => return,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    };

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;

    fn byte_stream(parts: Vec<&'static str>) -> ByteStream {
        Box::pin(stream::iter(
            parts.into_iter().map(|p| Ok(Bytes::from_static(p.as_bytes()))),
        ))
    }

    fn text_decoder(event: &Event) -> Result<SseStep, DomainError> {
        match event.data.as_str() {
            "[DONE]" => Ok(SseStep::End),
            "" => Ok(SseStep::Skip),
            "fail" => Err(DomainError::stream("bad event")),
            data => Ok(SseStep::Chunk(StreamChunk::new("id", "m").with_delta(data))),
        }
    }

    async fn collect(stream: LlmStream) -> Vec<Result<StreamChunk, DomainError>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_events_split_across_reads() {
        let bytes = byte_stream(vec!["data: Hel", "lo\n\ndata: world\n", "\ndata: [DONE]\n\n"]);
        let items = collect(decode_sse(bytes, text_decoder)).await;

        let deltas: Vec<_> = items
            .into_iter()
            .map(|item| item.unwrap().delta.unwrap())
            .collect();
        assert_eq!(deltas, vec!["Hello", "world"]);
    }

    #[tokio::test]
    async fn test_end_marker_stops_decoding() {
        let bytes = byte_stream(vec!["data: a\n\ndata: [DONE]\n\ndata: b\n\n"]);
        let items = collect(decode_sse(bytes, text_decoder)).await;

        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_decoder_error_is_terminal() {
        let bytes = byte_stream(vec!["data: a\n\ndata: fail\n\ndata: b\n\n"]);
        let items = collect(decode_sse(bytes, text_decoder)).await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_transport_error_is_forwarded() {
        let bytes: ByteStream = Box::pin(stream::iter(vec![
            Ok(Bytes::from_static(b"data: a\n\n")),
            Err(DomainError::stream("connection reset")),
        ]));
        let items = collect(decode_sse(bytes, text_decoder)).await;

        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(DomainError::Stream { .. })));
    }
}
