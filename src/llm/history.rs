use crate::llm::types::{ChatMessage, Role, ToolCall};

/// Append-only conversation for one session.
///
/// Always starts with one system message and one user message. Tool results
/// can only be added together with the assistant message that requested
/// them, so a tool message never appears without its tool calls.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new(system_prompt: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![
                ChatMessage::new(Role::System, system_prompt),
                ChatMessage::new(Role::User, prompt),
            ],
        }
    }

    /// Record an assistant turn that asked for tools, followed by one tool
    /// message per call, in call order.
    pub fn append_tool_round(&mut self, content: String, calls: Vec<(ToolCall, String)>) {
        if calls.is_empty() {
            self.append_assistant(content);
            return;
        }
        let (tool_calls, results): (Vec<ToolCall>, Vec<String>) = calls.into_iter().unzip();
        let names: Vec<String> = tool_calls
            .iter()
            .map(|tc| tc.function.name.clone())
            .collect();
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_name: None,
        });
        for (name, result) in names.into_iter().zip(results) {
            self.messages.push(ChatMessage {
                role: Role::Tool,
                content: result,
                tool_calls: vec![],
                tool_name: Some(name),
            });
        }
    }

    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(Role::Assistant, content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}
