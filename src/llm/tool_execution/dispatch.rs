use crate::llm::tool_runtime::ToolRuntime;
use crate::llm::types::ToolCall;
use tracing::{debug, error, warn};

mod tools;

/// Execute one tool call and return the text fed back to the model.
///
/// Unknown tools, bad arguments and tool failures all become `Error: ...`
/// results; nothing here aborts the session.
pub async fn dispatch_tool_call(runtime: &ToolRuntime, call: &ToolCall) -> String {
    let name = call.function.name.as_str();
    debug!(tool = name, args = %call.function.arguments, "dispatching tool call");

    let params = call.function.arguments.normalize();
    let res = match name {
        "get_current_date" => tools::get_current_date(runtime, params),
        "run_command" => tools::run_command(runtime, params).await,
        other => {
            warn!(tool = other, "unknown tool");
            return format!("Error: Tool {other} not found");
        }
    };

    match res {
        Ok(output) => {
            debug!(tool = name, result = %output, "tool succeeded");
            output
        }
        Err(e) => {
            error!(tool = name, error = %e, "tool execution failed");
            format!("Error: {e}")
        }
    }
}
