use anyhow::Result;
use tracing::{debug, info, warn};

use crate::llm::client_core::OllamaClient;
use crate::llm::history::ChatHistory;
use crate::llm::tool_execution::dispatch::dispatch_tool_call;
use crate::llm::tool_execution::streaming::consume_turn_stream;
use crate::llm::tool_runtime::ToolRuntime;
use crate::llm::types::ChatMessage;
use crate::render::ResponseSink;

#[derive(Debug)]
pub struct SessionOutcome {
    /// Content of the first turn that asked for no tools. `None` when the
    /// turn budget ran out first.
    pub final_answer: Option<String>,
    pub turns: usize,
    pub messages: Vec<ChatMessage>,
}

/// Drive the conversation until the model answers without tool calls or the
/// turn budget is spent.
///
/// Each turn streams one request, renders its content through `sink`, runs
/// any requested tools sequentially in request order, and appends the
/// exchange to the history before the next request. Transport failures end
/// the session with an error; tool failures never do.
pub async fn run_agent_loop(
    client: &OllamaClient,
    model: &str,
    mut history: ChatHistory,
    runtime: &ToolRuntime,
    sink: &mut dyn ResponseSink,
) -> Result<SessionOutcome> {
    for turn in 1..=runtime.max_turns {
        debug!(turn, messages = history.messages().len(), "awaiting response");
        let stream = client
            .chat_stream(model, history.messages(), &runtime.tools)
            .await?;

        debug!(turn, "streaming");
        let output = consume_turn_stream(stream, sink).await?;

        if output.tool_calls.is_empty() {
            debug!(turn, chars = output.content.len(), "done");
            history.append_assistant(output.content.clone());
            return Ok(SessionOutcome {
                final_answer: Some(output.content),
                turns: turn,
                messages: history.into_messages(),
            });
        }

        debug!(turn, count = output.tool_calls.len(), "executing tools");
        let mut results = Vec::with_capacity(output.tool_calls.len());
        for call in output.tool_calls {
            info!(tool = %call.function.name, "running tool");
            sink.tool_notice(&call.function.name, &call.function.arguments)?;
            let result = dispatch_tool_call(runtime, &call).await;
            results.push((call, result));
        }
        history.append_tool_round(output.content, results);
    }

    warn!(max_turns = runtime.max_turns, "turn budget exhausted without a final answer");
    Ok(SessionOutcome {
        final_answer: None,
        turns: runtime.max_turns,
        messages: history.into_messages(),
    })
}
