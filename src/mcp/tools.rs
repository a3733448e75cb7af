//! MCP Tool Definitions

use crate::mcp::protocol::Tool;
use serde_json::json;

/// Tool: send a raw command to PyMOL.
pub fn tool_send_command() -> Tool {
    Tool {
        name: "send_command".to_string(),
        description: "Send a command to PyMOL".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "PyMOL command to execute"
                }
            },
            "required": ["command"],
            "additionalProperties": false
        }),
    }
}

/// All tools exposed by this bridge.
pub fn get_all_tools() -> Vec<Tool> {
    vec![tool_send_command()]
}
