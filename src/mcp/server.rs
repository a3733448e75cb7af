//! MCP Server Handler Implementation

use crate::mcp::protocol::*;
use crate::mcp::tools::get_all_tools;
use crate::pymol::relay::CommandRelay;
use crate::pymol::types::BridgeConfig;
use anyhow::Result;
use serde_json::json;
use tracing::{debug, info};

/// Protocol revision this bridge speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// PyMOL MCP Server
pub struct PymolMcpServer {
    relay: CommandRelay,
}

impl PymolMcpServer {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            relay: CommandRelay::new(config),
        }
    }

    /// Get server info
    pub fn get_info(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
            },
            server_info: Implementation {
                name: "pymol-mcp-bridge".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Handle initialize request. Answered unconditionally; no engine
    /// connection is verified at this point.
    pub async fn handle_initialize(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.get_info())?)
    }

    /// Handle tools/list request
    pub async fn handle_tools_list(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(ListToolsResult {
            tools: get_all_tools(),
        })?)
    }

    /// Handle tools/call (and its tools/execute alias).
    ///
    /// The relay outcome is reported as a JSON-RPC *result* either way: the
    /// bridge only knows whether the send completed, never whether PyMOL
    /// accepted the command.
    pub async fn handle_tools_call(
        &self,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, JsonRpcError> {
        let params = params.unwrap_or_else(|| json!({}));
        let request: CallToolRequest = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::invalid_params(&format!("Invalid params: {}", e)))?;

        debug!("calling tool: {}", request.name);

        if request.name != "send_command" {
            return Err(JsonRpcError::tool_not_found(&request.name));
        }

        let command = request
            .arguments
            .as_ref()
            .and_then(|a| a.get("command"))
            .and_then(|v| v.as_str())
            .unwrap_or("");

        if command.is_empty() {
            return Err(JsonRpcError::invalid_params(
                "Invalid params: command is required",
            ));
        }

        let outcome = match self.relay.send(command) {
            Ok(()) => {
                info!(command, "command sent to PyMOL");
                json!({
                    "status": "success",
                    "message": format!("Command sent to PyMOL: {}", command),
                    "output": "Command executed successfully"
                })
            }
            Err(e) => json!({
                "status": "error",
                "message": format!("Error sending command to PyMOL: {}", e),
                "output": format!("Error: {}", e)
            }),
        };

        Ok(outcome)
    }
}
