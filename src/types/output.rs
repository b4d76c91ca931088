//! Agent output shapes and their normalization to display text.
//!
//! An executor may answer with plain text or with a list of typed fragments
//! (Gemini returns its candidate as parts, some of which are reasoning rather
//! than answer text). The shape is decided once, where the result enters the
//! crate, and [`AgentOutput::into_text`] is the only place it is flattened.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind tag of a response fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    Text,
    /// Any non-text fragment (thinking, tool use, images...), keyed by its tag.
    Other(String),
}

/// One typed piece of a structured response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub text: String,
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: FragmentKind::Text,
            text: text.into(),
        }
    }

    pub fn other(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: FragmentKind::Other(kind.into()),
            text: text.into(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == FragmentKind::Text
    }
}

/// Result of one agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AgentOutput {
    Text(String),
    Fragments(Vec<Fragment>),
}

impl AgentOutput {
    /// Decode an untyped executor result of the form `{"output": ...}`.
    ///
    /// Strings become [`AgentOutput::Text`], arrays become
    /// [`AgentOutput::Fragments`], anything else is coerced to its JSON text.
    /// A result without an `output` field is coerced as a whole.
    pub fn from_result(result: &Value) -> Self {
        match result.get("output") {
            Some(output) => Self::from_value(output),
            None => Self::from_value(result),
        }
    }

    /// Decode a bare output value.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::Fragments(items.iter().map(fragment_from_value).collect()),
            other => Self::Text(other.to_string()),
        }
    }

    /// Flatten to display text. Fragments keep only their text pieces, in order.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Fragments(fragments) => fragments
                .into_iter()
                .filter(Fragment::is_text)
                .map(|f| f.text)
                .collect(),
        }
    }
}

fn fragment_from_value(value: &Value) -> Fragment {
    match value {
        Value::String(s) => Fragment::text(s.clone()),
        Value::Object(map) => {
            let kind = map.get("type").and_then(Value::as_str).unwrap_or("unknown");
            let text = map
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if kind == "text" {
                Fragment::text(text)
            } else {
                Fragment::other(kind, text)
            }
        }
        other => Fragment::other("unknown", other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn text_fragments_are_concatenated() {
        let result = json!({"output": [{"type": "text", "text": "a"}, {"type": "text", "text": "b"}]});
        assert_eq!(AgentOutput::from_result(&result).into_text(), "ab");
    }

    #[test]
    fn non_text_fragments_are_dropped() {
        let result = json!({"output": [
            {"type": "thinking", "text": "let me think"},
            {"type": "text", "text": "answer"},
            {"type": "tool_use", "id": "call_1"}
        ]});
        let output = AgentOutput::from_result(&result);
        match &output {
            AgentOutput::Fragments(fragments) => assert_eq!(fragments.len(), 3),
            other => panic!("expected fragments, got {other:?}"),
        }
        assert_eq!(output.into_text(), "answer");
    }

    #[test]
    fn number_output_is_coerced_to_text() {
        assert_eq!(AgentOutput::from_result(&json!({"output": 42})).into_text(), "42");
    }

    #[test]
    fn string_output_is_unchanged() {
        let output = AgentOutput::from_result(&json!({"output": "hello"}));
        assert_eq!(output, AgentOutput::Text("hello".into()));
        assert_eq!(output.into_text(), "hello");
    }

    #[test]
    fn plain_strings_inside_a_list_count_as_text() {
        let output = AgentOutput::from_value(&json!(["x", {"type": "text", "text": "y"}]));
        assert_eq!(output.into_text(), "xy");
    }

    #[test]
    fn missing_output_field_coerces_whole_result() {
        let output = AgentOutput::from_result(&json!({"answer": true}));
        assert_eq!(output.into_text(), r#"{"answer":true}"#);
    }
}
