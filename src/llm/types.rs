use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::llm::tool_def::ToolDef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Arguments of a tool call as the model sent them.
///
/// Ollama normally sends a JSON object, but some models emit the arguments
/// as a JSON-encoded string instead. Both shapes are kept as-is on the wire
/// and only normalized when the call is executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "JsonValue")]
pub enum ToolArguments {
    Raw(String),
    Structured(JsonMap<String, JsonValue>),
}

impl Default for ToolArguments {
    fn default() -> Self {
        ToolArguments::Structured(JsonMap::new())
    }
}

impl From<JsonValue> for ToolArguments {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => ToolArguments::default(),
            JsonValue::Object(map) => ToolArguments::Structured(map),
            JsonValue::String(s) => ToolArguments::Raw(s),
            other => ToolArguments::Raw(other.to_string()),
        }
    }
}

impl From<ToolArguments> for JsonValue {
    fn from(args: ToolArguments) -> Self {
        match args {
            ToolArguments::Raw(s) => JsonValue::String(s),
            ToolArguments::Structured(map) => JsonValue::Object(map),
        }
    }
}

impl ToolArguments {
    /// Resolve the arguments into named parameters.
    ///
    /// A raw blob that does not parse into a JSON object yields `None`, which
    /// means the tool is invoked without parameters.
    pub fn normalize(&self) -> Option<JsonMap<String, JsonValue>> {
        match self {
            ToolArguments::Structured(map) => Some(map.clone()),
            ToolArguments::Raw(raw) => match serde_json::from_str::<JsonValue>(raw) {
                Ok(JsonValue::Object(map)) => Some(map),
                _ => None,
            },
        }
    }
}

impl std::fmt::Display for ToolArguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolArguments::Raw(s) => write!(f, "{s}"),
            ToolArguments::Structured(map) => {
                write!(f, "{}", JsonValue::Object(map.clone()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: ToolArguments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub function: ToolCallFunction,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: ToolArguments) -> Self {
        Self {
            id: None,
            function: ToolCallFunction {
                name: name.into(),
                arguments,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: vec![],
            tool_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    pub tools: &'a [ToolDef],
}

// One NDJSON line of an Ollama /api/chat streaming response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub message: Option<StreamMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arguments_keep_their_wire_shape() {
        let structured: ToolArguments = serde_json::from_value(json!({"command": "ls"})).unwrap();
        assert!(matches!(structured, ToolArguments::Structured(_)));
        assert_eq!(serde_json::to_value(&structured).unwrap(), json!({"command": "ls"}));

        let raw: ToolArguments = serde_json::from_value(json!("{\"command\":\"ls\"}")).unwrap();
        assert_eq!(raw, ToolArguments::Raw("{\"command\":\"ls\"}".into()));
        assert_eq!(
            serde_json::to_value(&raw).unwrap(),
            json!("{\"command\":\"ls\"}")
        );
    }

    #[test]
    fn normalize_parses_raw_objects_only() {
        let raw = ToolArguments::Raw("{\"command\":\"pwd\"}".into());
        let map = raw.normalize().unwrap();
        assert_eq!(map.get("command"), Some(&json!("pwd")));

        assert!(ToolArguments::Raw("not json".into()).normalize().is_none());
        assert!(ToolArguments::Raw("[1,2]".into()).normalize().is_none());
        assert_eq!(ToolArguments::default().normalize(), Some(JsonMap::new()));
    }

    #[test]
    fn missing_or_null_arguments_default_to_empty_mapping() {
        let call: ToolCall =
            serde_json::from_value(json!({"function": {"name": "get_current_date"}})).unwrap();
        assert_eq!(call.function.arguments, ToolArguments::default());

        let call: ToolCall = serde_json::from_value(
            json!({"function": {"name": "get_current_date", "arguments": null}}),
        )
        .unwrap();
        assert_eq!(call.function.arguments, ToolArguments::default());
    }

    #[test]
    fn stream_chunk_tolerates_extra_fields() {
        let chunk: StreamChunk = serde_json::from_str(
            r#"{"model":"m","created_at":"2024-01-01T00:00:00Z","message":{"role":"assistant","content":"Hi"},"done":false}"#,
        )
        .unwrap();
        assert_eq!(chunk.message.unwrap().content, "Hi");
        assert!(!chunk.done);
    }

    #[test]
    fn tool_message_serializes_without_empty_fields() {
        let msg = ChatMessage::new(Role::User, "hello");
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v, json!({"role": "user", "content": "hello"}));
    }
}
