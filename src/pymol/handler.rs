//! Request Dispatch
//!
//! Routes decoded requests to the engine and the filesystem. Each handler
//! folds its own failures into the response payload so one bad request
//! cannot take down the accept loop.

use crate::pymol::engine::{EngineError, PymolEngine};
use crate::pymol::pdb;
use crate::pymol::types::{Request, Response, ServerConfig};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Decode a raw payload and dispatch it against the engine.
pub fn dispatch(raw: &str, engine: &dyn PymolEngine, config: &ServerConfig) -> Response {
    match Request::parse(raw) {
        Ok(req) => handle_request(req, engine, config),
        Err(e) => {
            warn!(error = %e, "rejected request");
            Response::error(e.to_string())
        }
    }
}

/// Dispatch a decoded request.
pub fn handle_request(req: Request, engine: &dyn PymolEngine, config: &ServerConfig) -> Response {
    match req {
        Request::ExecuteCommand { command } => handle_execute(&command, engine),
        Request::GetState => handle_get_state(engine),
        Request::Ping => handle_ping(engine, config),
        Request::EditPdb { file, content } => handle_edit_pdb(&file, &content, engine),
        Request::GetPdbContent { file } => handle_get_pdb_content(&file),
        Request::ListPdbFiles { directory } => handle_list_pdb_files(directory.as_deref()),
    }
}

fn handle_execute(command: &str, engine: &dyn PymolEngine) -> Response {
    debug!(command, "executing engine command");
    let data = match engine.execute_command(command) {
        Ok(out) => json!({ "result": out.result, "output": out.output }),
        // An engine failure still counts as a handled command; the error
        // text travels in the captured output.
        Err(e) => json!({ "result": null, "output": format!("Error: {}", e) }),
    };
    Response::success("Command executed", data)
}

fn handle_get_state(engine: &dyn PymolEngine) -> Response {
    let data = match state_info(engine) {
        Ok(v) => v,
        Err(e) => json!({ "error": format!("Error getting PyMOL state: {}", e) }),
    };
    Response::success("State retrieved", data)
}

fn state_info(engine: &dyn PymolEngine) -> Result<Value, EngineError> {
    Ok(json!({
        "loaded_objects": engine.loaded_objects()?,
        "current_view": engine.current_view()?,
        "selections": engine.selection_names()?,
    }))
}

fn handle_ping(engine: &dyn PymolEngine, config: &ServerConfig) -> Response {
    // The liveness probe must answer even when the engine cannot report its
    // version.
    let pymol_version = engine
        .version()
        .unwrap_or_else(|_| "unknown".to_string());
    Response::success(
        "PyMOL MCP server is connected",
        json!({
            "version": config.version,
            "pymol_version": pymol_version,
            "author": config.author,
        }),
    )
}

fn handle_edit_pdb(file: &str, content: &str, engine: &dyn PymolEngine) -> Response {
    let data = match edit_structure(file, content, engine) {
        Ok(v) => v,
        Err(e) => json!({ "error": format!("Error editing PDB file: {}", e) }),
    };
    Response::success("PDB file edited", data)
}

fn edit_structure(
    file: &str,
    content: &str,
    engine: &dyn PymolEngine,
) -> anyhow::Result<Value> {
    let loaded = engine.loaded_objects()?;
    let name = pdb::object_name(file);
    let path = pdb::resolve_path(file);
    pdb::write_structure(&path, content)?;

    let message = if loaded.contains(&name) {
        engine.load_file(&path, &name, "pdb", 1)?;
        format!("Reloaded PDB file '{}'", name)
    } else {
        "File edited but not reloaded (not currently loaded in PyMOL)".to_string()
    };

    Ok(json!({ "path": path.to_string_lossy(), "message": message }))
}

fn handle_get_pdb_content(file: &str) -> Response {
    let path = pdb::resolve_path(file);
    let data = match pdb::read_structure(&path) {
        Ok(content) => json!({ "path": path.to_string_lossy(), "content": content }),
        Err(e) => json!({ "error": format!("Error reading PDB file: {}", e) }),
    };
    Response::success("PDB content retrieved", data)
}

fn handle_list_pdb_files(directory: Option<&str>) -> Response {
    let dir = match directory {
        Some(d) => pdb::resolve_path(d),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    let data = match pdb::list_structures(&dir) {
        Ok(files) => json!({ "directory": dir.to_string_lossy(), "files": files }),
        Err(e) => json!({ "error": format!("Error listing PDB files: {}", e) }),
    };
    Response::success("PDB files listed", data)
}
