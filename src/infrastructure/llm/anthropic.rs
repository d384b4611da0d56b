use async_trait::async_trait;
use chrono::Utc;
use eventsource_stream::Event;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::http_client::HttpClientTrait;
use super::sse::{decode_sse, SseStep};
use crate::domain::{
    CanonicalModel, ChatRequest, ChatResponse, DomainError, FinishReason, LlmProvider, LlmStream,
    Message, MessageRole, ModelMapping, ProviderKind, StreamChunk, Usage,
};

const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER: &str = "anthropic";

/// Token budget sent when the caller supplies none; the messages API requires one
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic messages API provider
#[derive(Debug)]
pub struct AnthropicProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
    models: ModelMapping,
}

impl<C: HttpClientTrait> AnthropicProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, models: ModelMapping) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_ANTHROPIC_BASE_URL, models)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        models: ModelMapping,
    ) -> Self {
        let base_url = base_url.into();
        let base_url = if base_url.trim().is_empty() {
            DEFAULT_ANTHROPIC_BASE_URL.to_string()
        } else {
            base_url.trim_end_matches('/').to_string()
        };

        Self {
            client,
            api_key: api_key.into(),
            base_url,
            models,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn build_request(
        &self,
        model: &str,
        request: &ChatRequest,
        stream: bool,
    ) -> Result<serde_json::Value, DomainError> {
        let (system, messages) = translate_messages(&request.messages)?;

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "stream": stream,
        });

        if let Some(system_content) = system {
            body["system"] = serde_json::json!(system_content);
        }

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(top_p) = request.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }

        if let Some(ref stop) = request.stop {
            body["stop_sequences"] = serde_json::json!(stop);
        }

        if let Some(ref user) = request.user {
            body["metadata"] = serde_json::json!({ "user_id": user });
        }

        Ok(body)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-api-key", self.api_key.as_str()),
            ("anthropic-version", ANTHROPIC_VERSION),
            ("Content-Type", "application/json"),
        ]
    }
}

/// Reshape canonical messages for the messages API.
///
/// The conversation must end on a user turn, so a trailing non-user message
/// is re-labelled as user. Leading system messages become the top-level
/// `system` prompt, earlier assistant turns are dropped and any later system
/// message is sent as a user turn.
fn translate_messages(
    messages: &[Message],
) -> Result<(Option<String>, Vec<AnthropicMessage>), DomainError> {
    let Some((last, history)) = messages.split_last() else {
        return Err(DomainError::bad_request("At least one message is required"));
    };

    let leading_system = history
        .iter()
        .take_while(|m| m.role == MessageRole::System)
        .count();

    let system = (leading_system > 0).then(|| {
        history[..leading_system]
            .iter()
            .map(Message::content_text)
            .collect::<Vec<_>>()
            .join("\n")
    });

    let mut turns: Vec<AnthropicMessage> = history[leading_system..]
        .iter()
        .filter(|m| m.role != MessageRole::Assistant)
        .map(|m| AnthropicMessage::user(m.content_text()))
        .collect();

    turns.push(AnthropicMessage::user(last.content_text()));

    Ok((system, turns))
}

/// Translate a messages API response; `created` is the receipt time
fn parse_response(json: serde_json::Value, created: i64) -> Result<ChatResponse, DomainError> {
    let response: AnthropicResponse = serde_json::from_value(json).map_err(|e| {
        DomainError::upstream(PROVIDER, format!("Failed to parse response: {}", e))
    })?;

    let content = response
        .content
        .into_iter()
        .filter(|block| block.content_type == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");

    let chat_response = ChatResponse::new(
        format!("chatcmpl-{}", response.id),
        created,
        response.model,
        Message::assistant(content),
    )
    .with_finish_reason(parse_stop_reason(response.stop_reason.as_deref()))
    .with_usage(Usage::new(
        response.usage.input_tokens,
        response.usage.output_tokens,
    ));

    Ok(chat_response)
}

fn parse_stop_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("max_tokens") => FinishReason::Length,
        Some("tool_use") => FinishReason::ToolCalls,
        _ => FinishReason::Stop,
    }
}

/// Stateful decoder: the message id only arrives in `message_start`
#[derive(Debug)]
struct StreamDecoder {
    id: String,
    model: String,
    input_tokens: u32,
}

impl StreamDecoder {
    fn new(model: &str) -> Self {
        Self {
            id: String::new(),
            model: model.to_string(),
            input_tokens: 0,
        }
    }

    fn chunk(&self) -> StreamChunk {
        StreamChunk::new(format!("chatcmpl-{}", self.id), self.model.clone())
    }

    fn decode(&mut self, event: &Event) -> Result<SseStep, DomainError> {
        if event.data.trim().is_empty() {
            return Ok(SseStep::Skip);
        }

        let parsed: AnthropicStreamEvent = serde_json::from_str(&event.data).map_err(|e| {
            DomainError::stream(format!("Invalid anthropic stream event: {}", e))
        })?;

        match parsed.event_type.as_str() {
            "message_start" => {
                if let Some(message) = parsed.message {
                    self.id = message.id;
                    if !message.model.is_empty() {
                        self.model = message.model;
                    }
                    self.input_tokens = message.usage.map(|u| u.input_tokens).unwrap_or(0);
                }

                Ok(SseStep::Chunk(self.chunk().with_role(MessageRole::Assistant)))
            }
            "content_block_delta" => match parsed.delta.and_then(|d| d.text) {
                Some(text) => Ok(SseStep::Chunk(self.chunk().with_delta(text))),
                None => Ok(SseStep::Skip),
            },
            "message_delta" => {
                let Some(reason) = parsed.delta.and_then(|d| d.stop_reason) else {
                    return Ok(SseStep::Skip);
                };

                let mut chunk = self
                    .chunk()
                    .with_finish_reason(parse_stop_reason(Some(&reason)));

                if let Some(usage) = parsed.usage {
                    chunk = chunk.with_usage(Usage::new(self.input_tokens, usage.output_tokens));
                }

                Ok(SseStep::Chunk(chunk))
            }
            "message_stop" => Ok(SseStep::End),
            "error" => {
                let message = parsed
                    .error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "Unknown stream error".to_string());
                Err(DomainError::upstream(PROVIDER, message))
            }
            _ => Ok(SseStep::Skip),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait + 'static> LlmProvider for AnthropicProvider<C> {
    async fn list_models(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<CanonicalModel>, DomainError> {
        if cancel.is_cancelled() {
            return Err(DomainError::Cancelled);
        }

        Ok(CanonicalModel::ALL
            .into_iter()
            .filter(|model| self.models.resolve(*model).is_ok())
            .collect())
    }

    async fn chat(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse, DomainError> {
        let model = self.models.resolve(request.model)?;
        debug!(model = %request.model, concrete = %model, "Sending Anthropic messages request");

        let body = self.build_request(model, &request, false)?;
        let response = self
            .client
            .post_json(&self.messages_url(), self.headers(), &body, cancel)
            .await
            .map_err(|e| e.for_provider(PROVIDER))?;

        parse_response(response, Utc::now().timestamp())
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<LlmStream, DomainError> {
        let model = self.models.resolve(request.model)?;
        debug!(model = %request.model, concrete = %model, "Opening Anthropic messages stream");

        let body = self.build_request(model, &request, true)?;
        let bytes = self
            .client
            .post_json_stream(&self.messages_url(), self.headers(), &body, cancel)
            .await
            .map_err(|e| e.for_provider(PROVIDER))?;

        let mut decoder = StreamDecoder::new(model);
        Ok(decode_sse(bytes, move |event| decoder.decode(event)))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::SecondVendor
    }
}

// Anthropic API types

#[derive(Debug, Serialize, PartialEq)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

impl AnthropicMessage {
    fn user(content: &str) -> Self {
        Self {
            role: "user",
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    id: String,
    #[serde(default)]
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicStreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    message: Option<StreamMessage>,
    delta: Option<StreamDelta>,
    usage: Option<AnthropicUsage>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamMessage {
    id: String,
    #[serde(default)]
    model: String,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    text: Option<String>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}
