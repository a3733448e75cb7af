//! Bridge-Side TCP Client
//!
//! One fresh connection per command, in the wire format the command server
//! reads: a JSON `execute_command` object terminated by a double newline.

use crate::pymol::types::BridgeConfig;
use anyhow::{Context, Result};
use serde_json::json;
use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

/// One-shot sender for engine commands.
pub struct CommandRelay {
    config: BridgeConfig,
}

impl CommandRelay {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// Send a command to the command server.
    ///
    /// The server's reply is not read: the connection is closed as soon as
    /// the payload is written, so success means only that the send
    /// completed without a network error.
    pub fn send(&self, command: &str) -> Result<()> {
        let addr = (self.config.host.as_str(), self.config.port)
            .to_socket_addrs()
            .with_context(|| {
                format!("cannot resolve {}:{}", self.config.host, self.config.port)
            })?
            .next()
            .with_context(|| {
                format!("no address for {}:{}", self.config.host, self.config.port)
            })?;

        let payload = json!({ "type": "execute_command", "command": command });
        let mut frame = serde_json::to_string(&payload)?;
        frame.push_str("\n\n");

        let mut stream = TcpStream::connect_timeout(&addr, self.config.connect_timeout)?;
        stream.write_all(frame.as_bytes())?;
        debug!(command, "command sent to PyMOL");
        Ok(())
    }
}
