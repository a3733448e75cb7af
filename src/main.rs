//! PyMOL MCP Bridge
//!
//! A Model Context Protocol (MCP) server that relays tool calls from an AI
//! assistant to a running PyMOL session over TCP.
//!
//! Usage:
//!   Add to Claude Desktop config:
//!   ```json
//!   {
//!     "mcpServers": {
//!       "pymol": {
//!         "command": "/path/to/pymol-mcp-bridge"
//!       }
//!     }
//!   }
//!   ```

use anyhow::Result;
use pymol_mcp_bridge::mcp::protocol::{JsonRpcError, JsonRpcReply, JsonRpcRequest};
use pymol_mcp_bridge::mcp::PymolMcpServer;
use pymol_mcp_bridge::pymol::types::BridgeConfig;
use std::io::{BufRead, BufReader, Write};
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// MCP Server state
struct ServerState {
    server: PymolMcpServer,
    initialized: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging goes to stderr; stdout carries protocol frames.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BridgeConfig::from_env();
    info!(
        host = %config.host,
        port = config.port,
        "starting PyMOL MCP bridge v{}",
        env!("CARGO_PKG_VERSION")
    );

    let state = RwLock::new(ServerState {
        server: PymolMcpServer::new(config),
        initialized: false,
    });

    // Read from stdin, write to stdout
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    let reader = BufReader::new(stdin);

    info!("bridge ready, listening on stdin");

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("error reading from stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        debug!("received: {}", line);

        // Malformed input is logged and skipped; the loop keeps going.
        let request: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                error!("invalid JSON received: {}", e);
                continue;
            }
        };

        if let Some(reply) = handle_request(&state, request).await {
            let reply_str = serde_json::to_string(&reply)?;
            debug!("sending: {}", reply_str);
            writeln!(stdout, "{}", reply_str)?;
            stdout.flush()?;
        }
    }

    info!("bridge shutting down");
    Ok(())
}

/// Handle one JSON-RPC message; `None` means no reply is emitted
/// (notifications are fire-and-forget).
async fn handle_request(
    state: &RwLock<ServerState>,
    request: JsonRpcRequest,
) -> Option<JsonRpcReply> {
    let id = request.id.clone();
    let method = request.method.as_str();
    debug!("handling method: {}", method);

    let reply = match method {
        "initialize" => {
            let mut state = state.write().await;
            state.initialized = true;
            match state.server.handle_initialize().await {
                Ok(result) => JsonRpcReply::success(id, result),
                Err(e) => JsonRpcReply::error(id, JsonRpcError::internal_error(&e.to_string())),
            }
        }
        "notifications/initialized" => return None,
        "tools/list" => {
            let state = state.read().await;
            match state.server.handle_tools_list().await {
                Ok(result) => JsonRpcReply::success(id, result),
                Err(e) => JsonRpcReply::error(id, JsonRpcError::internal_error(&e.to_string())),
            }
        }
        "tools/call" | "tools/execute" => {
            let state = state.read().await;
            match state.server.handle_tools_call(request.params).await {
                Ok(result) => JsonRpcReply::success(id, result),
                Err(e) => JsonRpcReply::error(id, e),
            }
        }
        _ => JsonRpcReply::error(id, JsonRpcError::method_not_found(method)),
    };

    Some(reply)
}
