use crate::llm::tool_runtime::ToolRuntime;
use anyhow::{Result, anyhow};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map as JsonMap, Value as JsonValue};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunCommandArgs {
    command: String,
}

// Bind named parameters; no parameters at all binds as an empty mapping.
fn bind<T: DeserializeOwned>(tool: &str, params: Option<JsonMap<String, JsonValue>>) -> Result<T> {
    serde_json::from_value(JsonValue::Object(params.unwrap_or_default()))
        .map_err(|e| anyhow!("invalid arguments for {tool}: {e}"))
}

pub fn get_current_date(
    _runtime: &ToolRuntime,
    params: Option<JsonMap<String, JsonValue>>,
) -> Result<String> {
    let NoArgs {} = bind("get_current_date", params)?;
    Ok(crate::tools::get_current_date())
}

pub async fn run_command(
    runtime: &ToolRuntime,
    params: Option<JsonMap<String, JsonValue>>,
) -> Result<String> {
    let args: RunCommandArgs = bind("run_command", params)?;
    Ok(runtime.local.run_command(&args.command).await)
}
