//! Chat-completions wire format shared by the OpenAI, Azure and gateway adapters

use chrono::Utc;
use eventsource_stream::Event;
use serde::{Deserialize, Serialize};

use super::sse::SseStep;
use crate::domain::{
    ChatRequest, ChatResponse, DomainError, FinishReason, Message, MessageRole, StreamChunk, Usage,
};

/// Build a chat-completions body; `model: None` omits the field entirely
pub fn build_body(request: &ChatRequest, model: Option<&str>, stream: bool) -> serde_json::Value {
    let messages: Vec<WireMessage> = request.messages.iter().map(WireMessage::from_domain).collect();

    let mut body = serde_json::json!({
        "messages": messages,
        "stream": stream,
    });

    if let Some(model) = model {
        body["model"] = serde_json::json!(model);
    }

    if let Some(temp) = request.temperature {
        body["temperature"] = serde_json::json!(temp);
    }

    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = serde_json::json!(max_tokens);
    }

    if let Some(top_p) = request.top_p {
        body["top_p"] = serde_json::json!(top_p);
    }

    if let Some(ref stop) = request.stop {
        body["stop"] = serde_json::json!(stop);
    }

    if let Some(presence_penalty) = request.presence_penalty {
        body["presence_penalty"] = serde_json::json!(presence_penalty);
    }

    if let Some(frequency_penalty) = request.frequency_penalty {
        body["frequency_penalty"] = serde_json::json!(frequency_penalty);
    }

    if let Some(ref user) = request.user {
        body["user"] = serde_json::json!(user);
    }

    body
}

pub fn parse_response(
    json: serde_json::Value,
    provider: &str,
) -> Result<ChatResponse, DomainError> {
    let response: WireResponse = serde_json::from_value(json).map_err(|e| {
        DomainError::upstream(provider, format!("Failed to parse response: {}", e))
    })?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| DomainError::upstream(provider, "No choices in response"))?;

    let message = Message::assistant(choice.message.content.unwrap_or_default());
    let created = response.created.unwrap_or_else(|| Utc::now().timestamp());

    let mut chat_response = ChatResponse::new(response.id, created, response.model, message);

    if let Some(reason) = choice.finish_reason {
        chat_response = chat_response.with_finish_reason(FinishReason::from_openai(&reason));
    }

    if let Some(usage) = response.usage {
        chat_response =
            chat_response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
    }

    Ok(chat_response)
}

/// Decode one chat-completions SSE event
pub fn decode_event(event: &Event, provider: &str) -> Result<SseStep, DomainError> {
    let data = event.data.trim();

    if data.is_empty() {
        return Ok(SseStep::Skip);
    }

    if data == "[DONE]" {
        return Ok(SseStep::End);
    }

    let chunk: WireStreamChunk = serde_json::from_str(data).map_err(|e| {
        DomainError::stream(format!("Invalid {} stream event: {}", provider, e))
    })?;

    if let Some(error) = chunk.error {
        return Err(DomainError::upstream(provider, error.message));
    }

    let Some(choice) = chunk.choices.into_iter().next() else {
        // Azure sends a leading chunk carrying only content-filter results
        return match chunk.usage {
            Some(usage) => Ok(SseStep::Chunk(
                StreamChunk::new(chunk.id, chunk.model.unwrap_or_default())
                    .with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens)),
            )),
            None => Ok(SseStep::Skip),
        };
    };

    let mut stream_chunk = StreamChunk::new(chunk.id, chunk.model.unwrap_or_default());

    if let Some(role) = choice.delta.role.as_deref() {
        if role == "assistant" {
            stream_chunk = stream_chunk.with_role(MessageRole::Assistant);
        }
    }

    if let Some(delta) = choice.delta.content {
        stream_chunk = stream_chunk.with_delta(delta);
    }

    if let Some(reason) = choice.finish_reason {
        stream_chunk = stream_chunk.with_finish_reason(FinishReason::from_openai(&reason));
    }

    if let Some(usage) = chunk.usage {
        stream_chunk =
            stream_chunk.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
    }

    Ok(SseStep::Chunk(stream_chunk))
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

impl WireMessage {
    fn from_domain(message: &Message) -> Self {
        Self {
            role: message.role.as_str(),
            content: message.content_text().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    id: String,
    #[serde(default)]
    created: Option<i64>,
    #[serde(default)]
    model: String,
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct WireStreamChunk {
    #[serde(default)]
    id: String,
    model: Option<String>,
    #[serde(default)]
    choices: Vec<WireStreamChoice>,
    usage: Option<WireUsage>,
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct WireStreamChoice {
    delta: WireDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDelta {
    role: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CanonicalModel;

    fn event(data: &str) -> Event {
        Event {
            event: "message".to_string(),
            data: data.to_string(),
            id: String::new(),
            retry: None,
        }
    }

    #[test]
    fn test_build_body_optional_fields() {
        let request = ChatRequest::builder(CanonicalModel::Base)
            .system("Be brief")
            .user("Hi")
            .temperature(0.2)
            .max_tokens(10)
            .build();

        let body = build_body(&request, Some("gpt-4o-mini"), false);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hi");
        assert_eq!(body["max_tokens"], 10);
        assert_eq!(body["stream"], false);
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn test_build_body_without_model() {
        let request = ChatRequest::builder(CanonicalModel::Large).user("Hi").build();
        let body = build_body(&request, None, true);

        assert!(body.get("model").is_none());
        assert_eq!(body["stream"], true);
    }

    #[test]
    fn test_parse_response() {
        let json = serde_json::json!({
            "id": "chatcmpl-123",
            "created": 1700000000,
            "model": "gpt-4o",
            "choices": [{
                "message": {"role": "assistant", "content": "Hello"},
                "finish_reason": "length"
            }],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        });

        let response = parse_response(json, "openai").unwrap();

        assert_eq!(response.id, "chatcmpl-123");
        assert_eq!(response.created, 1700000000);
        assert_eq!(response.content(), "Hello");
        assert_eq!(response.finish_reason, Some(FinishReason::Length));
        assert_eq!(response.usage.unwrap().total_tokens, 4);
    }

    #[test]
    fn test_parse_response_without_choices() {
        let json = serde_json::json!({"id": "x", "model": "m", "choices": []});
        assert!(matches!(
            parse_response(json, "openai"),
            Err(DomainError::Upstream { .. })
        ));
    }

    #[test]
    fn test_decode_content_event() {
        let step = decode_event(
            &event(r#"{"id":"c1","model":"gpt-4o","choices":[{"delta":{"content":"Hi"},"finish_reason":null}]}"#),
            "openai",
        )
        .unwrap();

        let SseStep::Chunk(chunk) = step else {
            panic!("expected chunk");
        };
        assert_eq!(chunk.delta.as_deref(), Some("Hi"));
        assert_eq!(chunk.id, "c1");
    }

    #[test]
    fn test_decode_done_and_filter_only_events() {
        assert!(matches!(decode_event(&event("[DONE]"), "openai"), Ok(SseStep::End)));
        assert!(matches!(
            decode_event(&event(r#"{"id":"","choices":[],"prompt_filter_results":[]}"#), "azure"),
            Ok(SseStep::Skip)
        ));
    }

    #[test]
    fn test_decode_error_event() {
        let err = decode_event(&event(r#"{"error":{"message":"overloaded"}}"#), "openai")
            .unwrap_err();

        assert_eq!(err.public_message(), "overloaded");
    }

    #[test]
    fn test_decode_garbage_is_stream_error() {
        assert!(matches!(
            decode_event(&event("{not json"), "openai"),
            Err(DomainError::Stream { .. })
        ));
    }
}
