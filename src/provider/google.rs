//! Google Gemini API provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::ParleyError;
use crate::models::google::GoogleModel;
use crate::types::*;

use super::format::tool_result_to_object;
use super::http::{google_headers, json_or_error, shared_client};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleProvider {
    model: GoogleModel,
    api_key: String,
    base_url: String,
}

impl GoogleProvider {
    pub fn new(model: GoogleModel, api_key: String, base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model,
            api_key,
        }
    }

    fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let mut system_instruction = None;
        let mut contents: Vec<serde_json::Value> = Vec::new();

        for msg in &request.messages {
            match msg.role {
                Role::System => {
                    system_instruction = Some(serde_json::json!({
                        "parts": [{"text": msg.text()}]
                    }));
                }
                Role::User => {
                    contents.push(serde_json::json!({
                        "role": "user",
                        "parts": [{"text": msg.text()}],
                    }));
                }
                Role::Assistant => {
                    let mut parts = Vec::new();
                    let text = msg.text();
                    if !text.is_empty() {
                        parts.push(serde_json::json!({"text": text}));
                    }
                    for tc in msg.tool_calls() {
                        parts.push(serde_json::json!({
                            "functionCall": {"name": tc.name, "args": tc.arguments}
                        }));
                    }
                    contents.push(serde_json::json!({"role": "model", "parts": parts}));
                }
                Role::Tool => {
                    let parts: Vec<serde_json::Value> = msg
                        .content
                        .iter()
                        .filter_map(|part| match part {
                            ContentPart::ToolResult(tr) => Some(serde_json::json!({
                                "functionResponse": {
                                    "name": msg.name.as_deref().unwrap_or(&tr.tool_call_id),
                                    "response": tool_result_to_object(&tr.result),
                                }
                            })),
                            _ => None,
                        })
                        .collect();
                    // Responses to one model turn travel together in a single content.
                    match contents.last_mut() {
                        Some(last) if is_function_response_turn(last) => {
                            if let Some(existing) = last["parts"].as_array_mut() {
                                existing.extend(parts);
                            }
                        }
                        _ => contents.push(serde_json::json!({"role": "user", "parts": parts})),
                    }
                }
            }
        }

        let mut obj = serde_json::Map::new();
        obj.insert("contents".into(), contents.into());

        if let Some(sys) = system_instruction {
            obj.insert("systemInstruction".into(), sys);
        }

        let mut gen_config = serde_json::Map::new();
        if let Some(max) = request.settings.max_tokens {
            gen_config.insert("maxOutputTokens".into(), max.into());
        }
        if let Some(temp) = request.settings.temperature {
            gen_config.insert("temperature".into(), temp.into());
        }
        if !gen_config.is_empty() {
            obj.insert("generationConfig".into(), serde_json::Value::Object(gen_config));
        }

        if let Some(ref tools) = request.tools {
            if !tools.is_empty() {
                let fn_decls: Vec<serde_json::Value> = tools
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        })
                    })
                    .collect();
                obj.insert(
                    "tools".into(),
                    serde_json::json!([{"functionDeclarations": fn_decls}]),
                );
            }
        }

        serde_json::Value::Object(obj)
    }
}

fn is_function_response_turn(content: &serde_json::Value) -> bool {
    content["role"] == "user"
        && content["parts"]
            .as_array()
            .is_some_and(|parts| parts.iter().all(|p| p.get("functionResponse").is_some()))
}

#[async_trait]
impl ModelProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse, ParleyError> {
        let body = self.build_request_body(request);
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.model.as_str()
        );

        debug!(model = self.model.as_str(), messages = request.messages.len(), "Google generate_text");

        let resp = shared_client()
            .post(&url)
            .headers(google_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let data: GeminiResponse = json_or_error(resp).await?;

        let candidate = data
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ParleyError::api(200, "No candidates in Gemini response"))?;

        let mut text = String::new();
        let mut fragments = Vec::new();
        let mut tool_calls = Vec::new();

        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(t) = part.text {
                if part.thought {
                    fragments.push(Fragment::other("thinking", t));
                } else {
                    text.push_str(&t);
                    fragments.push(Fragment::text(t));
                }
            }
            if let Some(fc) = part.function_call {
                tool_calls.push(AgentToolCall {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: fc.name,
                    arguments: fc.args.unwrap_or(serde_json::Value::Object(Default::default())),
                });
            }
        }

        let finish_reason = if !tool_calls.is_empty() {
            Some(FinishReason::ToolCalls)
        } else {
            match candidate.finish_reason.as_deref() {
                Some("STOP") => Some(FinishReason::Stop),
                Some("MAX_TOKENS") => Some(FinishReason::Length),
                Some("SAFETY") | Some("RECITATION") => Some(FinishReason::ContentFilter),
                _ => None,
            }
        };

        let usage = data
            .usage_metadata
            .map(|u| Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        Ok(ProviderResponse {
            text,
            fragments,
            usage,
            tool_calls,
            finish_reason,
        })
    }
}

// Internal Gemini response types

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Deserialize)]
struct GeminiFunctionCall {
    name: String,
    args: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> GoogleProvider {
        GoogleProvider::new(GoogleModel::Gemini20Flash, "key".into(), None)
    }

    #[test]
    fn system_message_becomes_system_instruction() {
        let request = ProviderRequest {
            messages: vec![ModelMessage::system("be brief"), ModelMessage::user("hi")],
            settings: GenerationSettings::default(),
            tools: None,
        };
        let body = provider().build_request_body(&request);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn generation_settings_map_to_generation_config() {
        let request = ProviderRequest {
            messages: vec![ModelMessage::user("hi")],
            settings: GenerationSettings::builder()
                .temperature(0.2)
                .max_tokens(128)
                .build(),
            tools: None,
        };
        let body = provider().build_request_body(&request);
        assert_eq!(
            body["generationConfig"],
            json!({"temperature": 0.2, "maxOutputTokens": 128})
        );
    }

    #[test]
    fn consecutive_tool_results_share_one_turn() {
        let calls = vec![
            AgentToolCall { id: "a".into(), name: "web_search".into(), arguments: json!({"query": "x"}) },
            AgentToolCall { id: "b".into(), name: "wikipedia".into(), arguments: json!({"query": "x"}) },
        ];
        let request = ProviderRequest {
            messages: vec![
                ModelMessage::user("q"),
                ModelMessage::assistant_tool_calls("", &calls),
                ModelMessage::tool_result("a", "web_search", json!("found"), false),
                ModelMessage::tool_result("b", "wikipedia", json!({"page": "X"}), false),
            ],
            settings: GenerationSettings::default(),
            tools: None,
        };
        let body = provider().build_request_body(&request);
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][1]["functionCall"]["name"], "wikipedia");
        let responses = contents[2]["parts"].as_array().unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["functionResponse"]["name"], "web_search");
        assert_eq!(responses[0]["functionResponse"]["response"], json!({"result": "found"}));
        assert_eq!(responses[1]["functionResponse"]["response"], json!({"page": "X"}));
    }
}
