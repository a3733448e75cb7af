//! Engine Capability Interface
//!
//! The molecular-modeling session itself lives in the host process; the
//! command server only sees it through this trait.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Error raised by the hosting engine while servicing a capability call.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

/// Result of a single engine command: the command's return value (if any)
/// plus whatever text the engine printed while running it.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput {
    pub result: Option<Value>,
    pub output: String,
}

/// Capabilities the command server consumes from the live PyMOL session.
///
/// Implementations must be callable from the accept-loop thread.
pub trait PymolEngine: Send + Sync {
    /// Run a command string in the session, capturing printed output.
    fn execute_command(&self, command: &str) -> Result<CommandOutput, EngineError>;

    /// Names of the objects currently loaded in the session.
    fn loaded_objects(&self) -> Result<Vec<String>, EngineError>;

    /// The current camera/view transform, as the engine reports it.
    fn current_view(&self) -> Result<Value, EngineError>;

    /// Names of the active named selections.
    fn selection_names(&self) -> Result<Vec<String>, EngineError>;

    /// Engine version string.
    fn version(&self) -> Result<String, EngineError>;

    /// (Re)load a structure file into the session under the given object name.
    fn load_file(&self, path: &Path, name: &str, format: &str, state: u32)
        -> Result<(), EngineError>;
}
