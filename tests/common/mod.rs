//! Shared test helpers: a scripted mock provider and executor factories.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use parley::agent::{AgentExecutor, ChatService, ExecutorFactory, ToolCallingExecutor};
use parley::config::{ParleyConfig, Profile, Settings};
use parley::error::ParleyError;
use parley::models::LanguageModel;
use parley::prompt::PromptTemplate;
use parley::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use parley::tools::ToolRegistry;
use parley::types::*;

enum Scripted {
    Response(ProviderResponse),
    /// Answer with `prefix` followed by the most recent tool result.
    EchoToolResult(String),
    Fail(u16),
}

#[derive(Default)]
struct Inner {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

/// A mock provider that plays back queued responses and records requests.
/// Clones share the same script.
#[derive(Clone, Default)]
pub struct MockProvider {
    inner: Arc<Inner>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, item: Scripted) {
        self.inner.script.lock().unwrap().push_back(item);
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.push(Scripted::Response(ProviderResponse {
            text: text.to_string(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            },
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }));
    }

    /// Queue a structured (Gemini-style) response.
    pub fn queue_fragments(&self, fragments: Vec<Fragment>) {
        let text = fragments
            .iter()
            .filter(|f| f.is_text())
            .map(|f| f.text.as_str())
            .collect();
        self.push(Scripted::Response(ProviderResponse {
            text,
            fragments,
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }));
    }

    /// Queue a tool call response.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        self.push(Scripted::Response(ProviderResponse {
            tool_calls: vec![AgentToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args,
            }],
            finish_reason: Some(FinishReason::ToolCalls),
            ..Default::default()
        }));
    }

    pub fn queue_echo_tool_result(&self, prefix: &str) {
        self.push(Scripted::EchoToolResult(prefix.to_string()));
    }

    pub fn queue_failure(&self, status: u16) {
        self.push(Scripted::Fail(status));
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.inner.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, ParleyError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        let next = self.inner.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::EchoToolResult(prefix)) => {
                let result = request
                    .messages
                    .iter()
                    .rev()
                    .flat_map(|m| m.content.iter())
                    .find_map(|part| match part {
                        ContentPart::ToolResult(r) => Some(r.result.clone()),
                        _ => None,
                    })
                    .unwrap_or_default();
                Ok(ProviderResponse {
                    text: format!("{prefix}{result}"),
                    finish_reason: Some(FinishReason::Stop),
                    ..Default::default()
                })
            }
            Some(Scripted::Fail(status)) => Err(ParleyError::api(status, "scripted failure")),
            None => Ok(ProviderResponse {
                text: "Mock response".to_string(),
                finish_reason: Some(FinishReason::Stop),
                ..Default::default()
            }),
        }
    }
}

/// Builds tool-calling executors over a shared [`MockProvider`].
pub struct MockFactory {
    pub provider: MockProvider,
    template: PromptTemplate,
    created: AtomicUsize,
}

impl MockFactory {
    pub fn new(provider: MockProvider) -> Self {
        Self {
            provider,
            template: PromptTemplate::for_profile(Profile::Basic, None),
            created: AtomicUsize::new(0),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ExecutorFactory for MockFactory {
    fn create(&self, _config: &ParleyConfig) -> Result<Arc<dyn AgentExecutor>, ParleyError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ToolCallingExecutor::new(
            Box::new(self.provider.clone()),
            self.template.clone(),
            GenerationSettings::default(),
        )))
    }
}

/// Executor that returns a fixed output and counts its runs.
pub struct FixedExecutor {
    pub output: Result<AgentOutput, u16>,
    pub runs: AtomicUsize,
}

#[async_trait]
impl AgentExecutor for FixedExecutor {
    async fn run(
        &self,
        _input: &str,
        _tools: &ToolRegistry,
        _history: &[ModelMessage],
    ) -> Result<AgentOutput, ParleyError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.output
            .clone()
            .map_err(|status| ParleyError::api(status, "executor failed"))
    }
}

/// Factory handing out one shared [`FixedExecutor`].
pub struct FixedFactory(pub Arc<FixedExecutor>);

impl FixedFactory {
    pub fn new(output: Result<AgentOutput, u16>) -> Self {
        Self(Arc::new(FixedExecutor {
            output,
            runs: AtomicUsize::new(0),
        }))
    }

    pub fn runs(&self) -> usize {
        self.0.runs.load(Ordering::SeqCst)
    }
}

impl ExecutorFactory for FixedFactory {
    fn create(&self, _config: &ParleyConfig) -> Result<Arc<dyn AgentExecutor>, ParleyError> {
        Ok(self.0.clone())
    }
}

/// Config holding an OpenAI key and nothing else.
pub fn openai_config() -> ParleyConfig {
    let config = ParleyConfig::new();
    config.set_api_key("openai", "sk-test".into());
    config
}

pub fn settings(profile: Profile) -> Settings {
    Settings {
        profile,
        ..Settings::default()
    }
}

pub fn service(
    config: ParleyConfig,
    settings: &Settings,
    factory: Arc<dyn ExecutorFactory>,
) -> ChatService {
    let model: LanguageModel = settings.model.parse().unwrap();
    ChatService::with_factory(config, settings, model, factory)
}
