//! Terminal loop behavior over in-memory input and output.

mod common;

use std::sync::Arc;

use common::{openai_config, service, settings, FixedFactory, MockFactory, MockProvider};
use parley::agent::Session;
use parley::config::{ParleyConfig, Profile};
use parley::presentation::repl::Repl;
use parley::presentation::{greeting, LoopState};
use parley::types::AgentOutput;
use serde_json::json;

async fn run(service: &parley::agent::ChatService, input: &str) -> (String, Session) {
    let mut session = Session::new("repl");
    let mut output = Vec::new();
    let mut repl = Repl::new(service, greeting(Profile::Basic));
    repl.run(&mut session, input.as_bytes(), &mut output).await.unwrap();
    assert_eq!(repl.state(), LoopState::Idle);
    (String::from_utf8(output).unwrap(), session)
}

#[tokio::test]
async fn greets_answers_and_exits() {
    let provider = MockProvider::new();
    provider.queue_tool_call("call_1", "convert_currency", json!({"amount": 10}));
    provider.queue_echo_tool_result("That is ");
    let service = service(
        openai_config(),
        &settings(Profile::Basic),
        Arc::new(MockFactory::new(provider)),
    );

    let (output, session) = run(&service, "What is 10 USD in Conchita coins?\nexit\nignored\n").await;

    assert!(output.starts_with(&format!("assistant: {}\n", greeting(Profile::Basic))));
    assert!(output.contains("assistant: That is 13"));
    assert_eq!(session.len(), 2);
}

#[tokio::test]
async fn blank_lines_are_skipped() {
    let factory = Arc::new(FixedFactory::new(Ok(AgentOutput::Text("hi".into()))));
    let service = service(openai_config(), &settings(Profile::Basic), factory.clone());

    let (_, session) = run(&service, "\n   \nhello\nquit\n").await;
    assert_eq!(factory.runs(), 1);
    assert_eq!(session.len(), 2);
}

#[tokio::test]
async fn missing_key_prints_prompt_and_keeps_going() {
    let factory = Arc::new(FixedFactory::new(Ok(AgentOutput::Text("hi".into()))));
    let service = service(ParleyConfig::new(), &settings(Profile::Basic), factory.clone());

    let (output, session) = run(&service, "hello\nstill there?\n").await;

    assert_eq!(output.matches("Please add your OpenAI API key").count(), 2);
    assert_eq!(factory.runs(), 0);
    assert!(session.is_empty());
}

#[tokio::test]
async fn failed_turn_is_reported_and_loop_continues() {
    let factory = Arc::new(FixedFactory::new(Err(500)));
    let service = service(openai_config(), &settings(Profile::Basic), factory.clone());

    let (output, session) = run(&service, "one\ntwo\n").await;

    assert_eq!(output.matches("error: API error (status 500)").count(), 2);
    assert_eq!(factory.runs(), 2);
    assert_eq!(session.len(), 2);
}
