//! Command-Server Wire Types and Configuration

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Default endpoint the command server listens on.
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8090;

/// A decoded command-server request.
///
/// The wire shape is loose (a JSON object, or a bare command string), so
/// decoding is explicit rather than derived: legacy aliases are mapped here
/// and nowhere else. `direct_input` with a `text` field is the historical
/// spelling of `execute_command` and decodes to the same variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    ExecuteCommand { command: String },
    GetState,
    Ping,
    EditPdb { file: String, content: String },
    GetPdbContent { file: String },
    ListPdbFiles { directory: Option<String> },
}

/// Why a payload could not be decoded into a [`Request`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("Unknown request type: {0}")]
    UnknownType(String),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid JSON request")]
    InvalidShape,
}

impl Request {
    /// Decode a raw TCP payload.
    ///
    /// Input that is not valid JSON is treated as a bare command string; a
    /// JSON object without a `type` field defaults to `execute_command`.
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        match serde_json::from_str::<Value>(raw) {
            Err(_) => Ok(Request::ExecuteCommand {
                command: raw.to_string(),
            }),
            Ok(Value::Object(map)) => Self::from_object(&map),
            Ok(_) => Err(RequestError::InvalidShape),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Result<Self, RequestError> {
        let req_type = match map.get("type") {
            None => "execute_command".to_string(),
            Some(Value::String(s)) => s.clone(),
            // Non-string discriminators are reported through their JSON form.
            Some(other) => other.to_string(),
        };

        match req_type.as_str() {
            "execute_command" | "direct_input" => {
                match string_field(map, "command").or_else(|| string_field(map, "text")) {
                    Some(command) => Ok(Request::ExecuteCommand { command }),
                    None => Err(RequestError::MissingField("command")),
                }
            }
            "get_state" => Ok(Request::GetState),
            "ping" => Ok(Request::Ping),
            "edit_pdb" => {
                let file = string_field(map, "file").ok_or(RequestError::MissingField("file"))?;
                let content =
                    string_field(map, "content").ok_or(RequestError::MissingField("content"))?;
                Ok(Request::EditPdb { file, content })
            }
            "get_pdb_content" => {
                let file = string_field(map, "file").ok_or(RequestError::MissingField("file"))?;
                Ok(Request::GetPdbContent { file })
            }
            "list_pdb_files" => Ok(Request::ListPdbFiles {
                directory: string_field(map, "directory"),
            }),
            _ => Err(RequestError::UnknownType(req_type)),
        }
    }
}

/// Non-empty string field, `None` when absent, empty, or not a string.
fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Request outcome, serialized once per accepted connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    pub message: String,
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl Response {
    pub fn success(message: impl Into<String>, data: Value) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: None,
        }
    }
}

/// Command-server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How long the accept loop waits before re-checking the running flag.
    /// Also bounds how long a stop request can go unobserved.
    pub accept_timeout: Duration,
    /// Plugin version reported by `ping`.
    pub version: String,
    /// Author string reported by `ping`.
    pub author: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            accept_timeout: Duration::from_secs(1),
            version: env!("CARGO_PKG_VERSION").to_string(),
            author: "@nanogenomic".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `PYMOL_MCP_HOST` | `127.0.0.1` |
    /// | `PYMOL_MCP_PORT` | `8090` |
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            host: std::env::var("PYMOL_MCP_HOST").unwrap_or(default.host),
            port: std::env::var("PYMOL_MCP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),
            accept_timeout: default.accept_timeout,
            version: default.version,
            author: default.author,
        }
    }
}

/// Bridge-side configuration: where the command server lives.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub host: String,
    pub port: u16,
    /// Connect timeout for each outbound send.
    pub connect_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from the same variables the server reads, so both
    /// ends agree on the endpoint.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            host: std::env::var("PYMOL_MCP_HOST").unwrap_or(default.host),
            port: std::env::var("PYMOL_MCP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),
            connect_timeout: default.connect_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_raw_string_is_a_command() {
        let req = Request::parse("load 1abc.pdb").unwrap();
        assert_eq!(
            req,
            Request::ExecuteCommand {
                command: "load 1abc.pdb".to_string()
            }
        );
    }

    #[test]
    fn test_parse_execute_command() {
        let req = Request::parse(r#"{"type": "execute_command", "command": "zoom"}"#).unwrap();
        assert_eq!(
            req,
            Request::ExecuteCommand {
                command: "zoom".to_string()
            }
        );
    }

    #[test]
    fn test_parse_direct_input_alias() {
        let req = Request::parse(r#"{"type": "direct_input", "text": "zoom"}"#).unwrap();
        assert_eq!(
            req,
            Request::ExecuteCommand {
                command: "zoom".to_string()
            }
        );
    }

    #[test]
    fn test_parse_command_and_text_are_interchangeable() {
        let req = Request::parse(r#"{"type": "execute_command", "text": "zoom"}"#).unwrap();
        assert_eq!(
            req,
            Request::ExecuteCommand {
                command: "zoom".to_string()
            }
        );
    }

    #[test]
    fn test_parse_missing_type_defaults_to_execute_command() {
        let req = Request::parse(r#"{"command": "zoom"}"#).unwrap();
        assert_eq!(
            req,
            Request::ExecuteCommand {
                command: "zoom".to_string()
            }
        );
    }

    #[test]
    fn test_parse_unknown_type_reports_offender() {
        let err = Request::parse(r#"{"type": "teleport"}"#).unwrap_err();
        assert_eq!(err, RequestError::UnknownType("teleport".to_string()));
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn test_parse_non_string_type_reports_json_form() {
        let err = Request::parse(r#"{"type": 5}"#).unwrap_err();
        assert_eq!(err.to_string(), "Unknown request type: 5");
    }

    #[test]
    fn test_parse_empty_command_is_missing() {
        let err = Request::parse(r#"{"type": "execute_command", "command": ""}"#).unwrap_err();
        assert_eq!(err, RequestError::MissingField("command"));
    }

    #[test]
    fn test_parse_edit_pdb_requires_content() {
        let err = Request::parse(r#"{"type": "edit_pdb", "file": "a.pdb"}"#).unwrap_err();
        assert_eq!(err, RequestError::MissingField("content"));
    }

    #[test]
    fn test_parse_list_pdb_files_empty_directory_is_none() {
        let req = Request::parse(r#"{"type": "list_pdb_files", "directory": ""}"#).unwrap();
        assert_eq!(req, Request::ListPdbFiles { directory: None });
    }

    #[test]
    fn test_parse_non_object_json_is_invalid() {
        assert_eq!(Request::parse("42").unwrap_err(), RequestError::InvalidShape);
        assert_eq!(
            Request::parse(r#"["ping"]"#).unwrap_err(),
            RequestError::InvalidShape
        );
    }

    #[test]
    fn test_response_serialization_includes_null_data() {
        let v = serde_json::to_value(Response::error("nope")).unwrap();
        assert_eq!(v, json!({"status": "error", "message": "nope", "data": null}));
    }

    #[test]
    fn test_default_configs_agree_on_endpoint() {
        let server = ServerConfig::default();
        let bridge = BridgeConfig::default();
        assert_eq!(server.host, bridge.host);
        assert_eq!(server.port, bridge.port);
        assert_eq!(server.accept_timeout, Duration::from_secs(1));
        assert_eq!(bridge.connect_timeout, Duration::from_secs(5));
    }
}
