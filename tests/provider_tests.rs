//! Provider HTTP round-trips against mock endpoints.

use parley::agent::{ChatService, Session};
use parley::config::{ParleyConfig, Settings};
use parley::error::ParleyError;
use parley::models::LanguageModel;
use parley::provider::{create_provider, ProviderRequest, ToolDefinition};
use parley::types::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(text: &str) -> ProviderRequest {
    ProviderRequest {
        messages: vec![ModelMessage::system("Be brief."), ModelMessage::user(text)],
        settings: GenerationSettings::builder().temperature(0.0).build(),
        tools: Some(vec![ToolDefinition {
            name: "convert_currency".into(),
            description: "USD to Conchita".into(),
            parameters: json!({"type": "object", "properties": {"amount": {"type": "number"}}}),
        }]),
    }
}

fn config(service: &str, key: &str, base_url: String) -> ParleyConfig {
    let config = ParleyConfig::new();
    config.set_api_key(service, key.into());
    config.set_base_url(service, base_url);
    config
}

#[tokio::test]
async fn openai_returns_tool_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "gpt-3.5-turbo", "temperature": 0.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "convert_currency", "arguments": "{\"amount\": 10}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        })))
        .mount(&server)
        .await;

    let model: LanguageModel = "openai:gpt-3.5-turbo".parse().unwrap();
    let provider = create_provider(&model, &config("openai", "sk-test", server.uri())).unwrap();
    let response = provider.generate_text(&request("10 USD?")).await.unwrap();

    assert_eq!(response.text, "");
    assert!(response.fragments.is_empty());
    assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].arguments, json!({"amount": 10}));
    assert_eq!(response.usage.total_tokens, 15);
}

#[tokio::test]
async fn openai_rate_limit_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string(r#"{"error":{"message":"slow down"}}"#))
        .mount(&server)
        .await;

    let model: LanguageModel = "openai:gpt-4o".parse().unwrap();
    let provider = create_provider(&model, &config("openai", "sk-test", server.uri())).unwrap();
    let err = provider.generate_text(&request("hi")).await.unwrap_err();
    assert!(matches!(err, ParleyError::RateLimited { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn gemini_returns_fragments() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "g-test"))
        .and(body_partial_json(json!({"systemInstruction": {"parts": [{"text": "Be brief."}]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "Considering the rate.", "thought": true},
                    {"text": "10 USD is 13 Conchita coins."}
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 8, "candidatesTokenCount": 9, "totalTokenCount": 17}
        })))
        .mount(&server)
        .await;

    let model: LanguageModel = "google:gemini-2.0-flash".parse().unwrap();
    let provider = create_provider(&model, &config("google", "g-test", server.uri())).unwrap();
    let response = provider.generate_text(&request("10 USD?")).await.unwrap();

    assert_eq!(response.text, "10 USD is 13 Conchita coins.");
    assert_eq!(
        response.fragments,
        vec![
            Fragment::other("thinking", "Considering the rate."),
            Fragment::text("10 USD is 13 Conchita coins."),
        ]
    );
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    assert_eq!(AgentOutput::Fragments(response.fragments).into_text(), "10 USD is 13 Conchita coins.");
}

#[tokio::test]
async fn gemini_function_call_gets_an_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"functionCall": {"name": "convert_currency", "args": {"amount": 10}}}]},
                "finishReason": "STOP"
            }]
        })))
        .mount(&server)
        .await;

    let model: LanguageModel = "gemini:gemini-1.5-pro".parse().unwrap();
    let provider = create_provider(&model, &config("google", "g-test", server.uri())).unwrap();
    let response = provider.generate_text(&request("10 USD?")).await.unwrap();

    assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
    assert_eq!(response.tool_calls[0].name, "convert_currency");
    assert!(!response.tool_calls[0].id.is_empty());
}

#[test]
fn missing_key_is_reported_per_provider() {
    let model: LanguageModel = "google:gemini-2.0-flash".parse().unwrap();
    let err = create_provider(&model, &ParleyConfig::new()).err().unwrap();
    assert!(matches!(err, ParleyError::MissingCredential { ref name, .. } if name == "GOOGLE_API_KEY"));
}

#[tokio::test]
async fn settings_reach_the_provider_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"temperature": 0.4, "max_tokens": 64})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "short"}, "finish_reason": "stop"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = Settings {
        temperature: 0.4,
        max_tokens: Some(64),
        ..Settings::default()
    };
    let service =
        ChatService::new(config("openai", "sk-test", server.uri()), &settings).unwrap();
    let mut session = Session::new("s");
    let reply = service.respond(&mut session, "hi", None).await.unwrap();
    assert_eq!(reply, "short");
}
