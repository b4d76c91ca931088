//! The reasoning loop behind a trait, and its provider-backed implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ParleyConfig;
use crate::error::ParleyError;
use crate::generation::generate_text;
use crate::models::LanguageModel;
use crate::prompt::PromptTemplate;
use crate::provider::{create_provider, ModelProvider};
use crate::tools::ToolRegistry;
use crate::types::{AgentOutput, GenerationSettings, ModelMessage};

/// Decides which tools to call and when to answer.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    async fn run(
        &self,
        input: &str,
        tools: &ToolRegistry,
        history: &[ModelMessage],
    ) -> Result<AgentOutput, ParleyError>;
}

/// Builds an executor for one turn from that turn's configuration.
pub trait ExecutorFactory: Send + Sync {
    fn create(&self, config: &ParleyConfig) -> Result<Arc<dyn AgentExecutor>, ParleyError>;
}

/// Renders the prompt, then runs the provider's native tool-calling loop.
pub struct ToolCallingExecutor {
    provider: Box<dyn ModelProvider>,
    template: PromptTemplate,
    settings: GenerationSettings,
}

impl ToolCallingExecutor {
    pub fn new(
        provider: Box<dyn ModelProvider>,
        template: PromptTemplate,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            provider,
            template,
            settings,
        }
    }
}

#[async_trait]
impl AgentExecutor for ToolCallingExecutor {
    async fn run(
        &self,
        input: &str,
        tools: &ToolRegistry,
        history: &[ModelMessage],
    ) -> Result<AgentOutput, ParleyError> {
        let messages = self.template.render(history, input, &[]);
        let result = generate_text(
            self.provider.as_ref(),
            messages,
            self.settings.clone(),
            tools,
        )
        .await?;

        debug!(
            steps = result.steps.len(),
            input_tokens = result.usage.input_tokens,
            output_tokens = result.usage.output_tokens,
            "agent run finished"
        );

        if result.fragments.is_empty() {
            Ok(AgentOutput::Text(result.text))
        } else {
            Ok(AgentOutput::Fragments(result.fragments))
        }
    }
}

/// Creates a [`ToolCallingExecutor`] for a fixed model.
#[derive(Debug, Clone)]
pub struct ProviderExecutorFactory {
    model: LanguageModel,
    template: PromptTemplate,
    settings: GenerationSettings,
}

impl ProviderExecutorFactory {
    pub fn new(model: LanguageModel, template: PromptTemplate, settings: GenerationSettings) -> Self {
        Self {
            model,
            template,
            settings,
        }
    }
}

impl ExecutorFactory for ProviderExecutorFactory {
    fn create(&self, config: &ParleyConfig) -> Result<Arc<dyn AgentExecutor>, ParleyError> {
        let provider = create_provider(&self.model, config)?;
        Ok(Arc::new(ToolCallingExecutor::new(
            provider,
            self.template.clone(),
            self.settings.clone(),
        )))
    }
}
