//! Bridge between AI assistants and a live PyMOL session.
//!
//! Two cooperating pieces:
//! - [`pymol::CommandServer`]: a TCP listener embedded in the PyMOL host
//!   process that executes requests against the session.
//! - the `pymol-mcp-bridge` binary: a stdio MCP server that translates
//!   tool calls into TCP requests against the command server.

pub mod mcp;
pub mod pymol;
