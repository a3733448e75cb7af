//! TCP Command Server
//!
//! Listens inside the PyMOL host process and exposes the engine to local
//! callers. The accept loop runs on a background thread; connections are
//! handled one at a time and receive exactly one JSON response each.

use crate::pymol::engine::PymolEngine;
use crate::pymol::handler;
use crate::pymol::types::{Response, ServerConfig};
use anyhow::Result;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

const BUFFER_SIZE: usize = 4096;

/// TCP front of the engine, with explicit start/stop lifecycle.
pub struct CommandServer {
    config: ServerConfig,
    engine: Arc<dyn PymolEngine>,
    running: Arc<AtomicBool>,
    // Thread handle and bound address live behind one mutex so start/stop
    // transitions are serialized.
    state: Mutex<LoopState>,
}

#[derive(Default)]
struct LoopState {
    handle: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl CommandServer {
    pub fn new(config: ServerConfig, engine: Arc<dyn PymolEngine>) -> Self {
        Self {
            config,
            engine,
            running: Arc::new(AtomicBool::new(false)),
            state: Mutex::new(LoopState::default()),
        }
    }

    /// Address the listener is bound to, once running. With a configured
    /// port of 0 this is the only way to learn the real port.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.state.lock().unwrap().local_addr
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start the accept loop. A no-op if the server is already running.
    ///
    /// The listener is bound here, in the caller, so a bind failure aborts
    /// startup instead of dying silently on the loop thread.
    pub fn start(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if self.running.load(Ordering::SeqCst) {
            info!(
                host = %self.config.host,
                port = self.config.port,
                "command server already running"
            );
            return Ok(());
        }

        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port))?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let engine = Arc::clone(&self.engine);
        let config = self.config.clone();
        state.local_addr = Some(addr);
        state.handle = Some(thread::spawn(move || {
            accept_loop(listener, running, engine, config)
        }));

        info!(%addr, "command server listening");
        Ok(())
    }

    /// Stop the accept loop and wait for it to exit. A no-op if not running.
    ///
    /// An already-accepted connection runs to completion first; the
    /// listening socket is closed by the time this returns.
    pub fn stop(&self) {
        let mut state = self.state.lock().unwrap();
        if !self.running.swap(false, Ordering::SeqCst) {
            info!("command server is not running");
            return;
        }
        if let Some(handle) = state.handle.take() {
            if handle.join().is_err() {
                warn!("accept loop panicked");
            }
        }
        state.local_addr = None;
        info!("command server stopped");
    }
}

fn accept_loop(
    listener: TcpListener,
    running: Arc<AtomicBool>,
    engine: Arc<dyn PymolEngine>,
    config: ServerConfig,
) {
    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, addr)) => {
                debug!(%addr, "accepted connection");
                if let Err(e) = handle_client(stream, engine.as_ref(), &config) {
                    warn!(error = %e, "error handling client connection");
                }
            }
            // Bounded wait so the loop observes the running flag going false.
            Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(config.accept_timeout),
            Err(e) => {
                if running.load(Ordering::SeqCst) {
                    warn!(error = %e, "error accepting connection");
                }
            }
        }
    }
    debug!("accept loop exited");
}

/// Read one double-newline-terminated request, answer it, close.
fn handle_client(
    mut stream: TcpStream,
    engine: &dyn PymolEngine,
    config: &ServerConfig,
) -> Result<()> {
    // Accepted sockets can inherit non-blocking mode from the listener.
    stream.set_nonblocking(false)?;

    let mut data = Vec::new();
    let mut chunk = [0u8; BUFFER_SIZE];
    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
        // End-of-message marker
        if data.windows(2).any(|w| w == b"\n\n") {
            break;
        }
    }

    if data.is_empty() {
        return Ok(());
    }

    let response = match std::str::from_utf8(&data) {
        Ok(text) => handler::dispatch(text.trim(), engine, config),
        Err(_) => Response::error("Invalid JSON request"),
    };

    stream.write_all(serde_json::to_string(&response)?.as_bytes())?;
    Ok(())
}
