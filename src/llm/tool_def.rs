use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolFunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value, // JSON Schema object
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    #[serde(rename = "type")]
    pub kind: String, // "function"
    pub function: ToolFunctionDef,
}

pub fn default_tools_def() -> Vec<ToolDef> {
    vec![
        ToolDef {
            kind: "function".into(),
            function: ToolFunctionDef {
                name: "get_current_date".into(),
                description: "Get the current date and time".into(),
                parameters: json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            },
        },
        ToolDef {
            kind: "function".into(),
            function: ToolFunctionDef {
                name: "run_command".into(),
                description: "Run a shell command (pwsh on Windows, bash on Linux). Use this for calculations, checking files, or system tasks.".into(),
                parameters: json!({
                    "type": "object",
                    "required": ["command"],
                    "properties": {
                        "command": {
                            "type": "string",
                            "description": "The command line to execute"
                        }
                    }
                }),
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_both_tools_as_functions() {
        let defs = default_tools_def();
        let names: Vec<_> = defs.iter().map(|d| d.function.name.as_str()).collect();
        assert_eq!(names, vec!["get_current_date", "run_command"]);
        assert!(defs.iter().all(|d| d.kind == "function"));

        let v = serde_json::to_value(&defs[1]).unwrap();
        assert_eq!(v["type"], "function");
        assert_eq!(v["function"]["parameters"]["required"][0], "command");
    }
}
