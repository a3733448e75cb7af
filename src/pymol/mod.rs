//! PyMOL-Side Plumbing: Command Server, Request Dispatch, TCP Relay

pub mod engine;
pub mod handler;
pub mod pdb;
pub mod relay;
pub mod server;
pub mod types;

pub use engine::PymolEngine;
pub use server::CommandServer;
pub use types::*;
