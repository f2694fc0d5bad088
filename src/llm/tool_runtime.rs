use crate::llm::tool_def::{ToolDef, default_tools_def};
use crate::tools::LocalTools;

/// Turn budget: bounds runaway tool-calling loops.
pub const MAX_TURNS: usize = 10;

pub struct ToolRuntime {
    pub tools: Vec<ToolDef>,
    pub local: LocalTools,
    pub max_turns: usize,
}

impl ToolRuntime {
    pub fn new(local: LocalTools) -> Self {
        Self {
            tools: default_tools_def(),
            local,
            max_turns: MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }
}
