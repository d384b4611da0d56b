//! LLM provider implementations

mod anthropic;
mod azure_openai;
mod factory;
mod gateway;
mod http_client;
mod openai;
mod openai_compat;
mod sse;
mod test_double;

pub use anthropic::{AnthropicProvider, DEFAULT_MAX_TOKENS};
pub use azure_openai::{AzureOpenAiProvider, DEFAULT_AZURE_API_VERSION};
pub use factory::LlmProviderFactory;
pub use gateway::GatewayProvider;
pub use http_client::{ByteStream, HttpClient, HttpClientTrait};
pub use openai::OpenAiProvider;
pub use sse::{decode_sse, SseStep};
pub use test_double::TestProvider;
