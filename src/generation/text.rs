//! Text generation with tool loop.

use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::ParleyError;
use crate::provider::{ModelProvider, ProviderRequest};
use crate::tools::{ToolArguments, ToolRegistry};
use crate::types::*;

/// Maximum tool loop iterations to prevent infinite loops.
pub const MAX_TOOL_ITERATIONS: usize = 20;

/// One provider round-trip and the tools it triggered.
#[derive(Debug, Clone)]
pub struct GenerationStep {
    pub text: String,
    pub tool_calls: Vec<AgentToolCall>,
    pub tool_results: Vec<AgentToolResult>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Outcome of [`generate_text`].
#[derive(Debug, Clone)]
pub struct GenerateTextResult {
    pub text: String,
    /// Typed parts of the final answer; empty for plain-text providers.
    pub fragments: Vec<Fragment>,
    pub steps: Vec<GenerationStep>,
    pub messages: Vec<ModelMessage>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Generate text with an optional tool loop.
///
/// If the model returns tool calls, they are executed and fed back until the
/// model produces a final answer or the iteration limit is hit, in which case
/// the last text seen is returned.
pub async fn generate_text(
    provider: &dyn ModelProvider,
    mut messages: Vec<ModelMessage>,
    settings: GenerationSettings,
    tools: &ToolRegistry,
) -> Result<GenerateTextResult, ParleyError> {
    let tool_defs = (!tools.is_empty()).then(|| tools.definitions());

    let mut steps: Vec<GenerationStep> = Vec::new();
    let mut last_fragments = Vec::new();
    let mut total_usage = Usage::default();

    for iteration in 0..MAX_TOOL_ITERATIONS {
        let request = ProviderRequest {
            messages: messages.clone(),
            settings: settings.clone(),
            tools: tool_defs.clone(),
        };

        debug!(iteration, provider = provider.provider_name(), "generate_text: calling provider");
        let response = provider.generate_text(&request).await?;
        total_usage.merge(&response.usage);

        let mut step = GenerationStep {
            text: response.text.clone(),
            tool_calls: response.tool_calls.clone(),
            tool_results: Vec::new(),
            usage: response.usage,
            finish_reason: response.finish_reason,
        };

        if response.tool_calls.is_empty() {
            steps.push(step);
            return Ok(GenerateTextResult {
                text: response.text,
                fragments: response.fragments,
                steps,
                messages,
                usage: total_usage,
                finish_reason: response.finish_reason,
            });
        }

        last_fragments = response.fragments;
        messages.push(ModelMessage::assistant_tool_calls(
            &response.text,
            &response.tool_calls,
        ));

        for tc in &response.tool_calls {
            info!(tool = tc.name.as_str(), "Calling tool");
            let result = match tools.get(&tc.name) {
                Some(tool) => match tool.execute(&ToolArguments::new(tc.arguments.clone())).await {
                    Ok(value) => AgentToolResult {
                        tool_call_id: tc.id.clone(),
                        result: value,
                        is_error: false,
                    },
                    Err(e) => {
                        warn!(tool = tc.name.as_str(), error = %e, "Tool execution failed");
                        AgentToolResult {
                            tool_call_id: tc.id.clone(),
                            result: json!({"error": e.to_string()}),
                            is_error: true,
                        }
                    }
                },
                None => {
                    warn!(tool = tc.name.as_str(), "Tool not found");
                    AgentToolResult {
                        tool_call_id: tc.id.clone(),
                        result: json!({"error": format!("Tool '{}' not found", tc.name)}),
                        is_error: true,
                    }
                }
            };
            messages.push(ModelMessage::tool_result(
                result.tool_call_id.clone(),
                tc.name.clone(),
                result.result.clone(),
                result.is_error,
            ));
            step.tool_results.push(result);
        }

        steps.push(step);
    }

    warn!(limit = MAX_TOOL_ITERATIONS, "Tool loop hit the iteration limit");
    let last_text = steps.last().map(|s| s.text.clone()).unwrap_or_default();
    Ok(GenerateTextResult {
        text: last_text,
        fragments: last_fragments,
        steps,
        messages,
        usage: total_usage,
        finish_reason: Some(FinishReason::Length),
    })
}
