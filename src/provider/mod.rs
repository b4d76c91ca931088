//! Model provider trait and implementations.

pub mod format;
pub mod http;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "google")]
pub mod google;

use async_trait::async_trait;

use crate::config::{credential_env_var, credential_hint, ParleyConfig};
use crate::error::ParleyError;
use crate::models::LanguageModel;
use crate::types::{message::AgentToolCall, Fragment, FinishReason, GenerationSettings, ModelMessage, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub text: String,
    /// Typed parts of the answer, for providers that return structured content.
    /// Empty when the provider answers with a plain string.
    pub fragments: Vec<Fragment>,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by all model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai", "google").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate one model turn (non-streaming).
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, ParleyError>;
}

/// Create a provider for the given model, using the provided config.
pub fn create_provider(
    model: &LanguageModel,
    config: &ParleyConfig,
) -> Result<Box<dyn ModelProvider>, ParleyError> {
    match model {
        #[cfg(feature = "openai")]
        LanguageModel::OpenAi(m) => {
            let api_key = config.get_api_key("openai").ok_or_else(|| {
                ParleyError::missing_credential(
                    credential_env_var("openai"),
                    credential_hint("openai"),
                )
            })?;
            Ok(Box::new(openai::OpenAiProvider::new(
                m.clone(),
                api_key,
                config.get_base_url("openai"),
            )))
        }
        #[cfg(feature = "google")]
        LanguageModel::Google(m) => {
            let api_key = config.get_api_key("google").ok_or_else(|| {
                ParleyError::missing_credential(
                    credential_env_var("google"),
                    credential_hint("google"),
                )
            })?;
            Ok(Box::new(google::GoogleProvider::new(
                m.clone(),
                api_key,
                config.get_base_url("google"),
            )))
        }
    }
}
