//! Server side of the protocol
//!
//! The accept loop, the per-connection session state and the state
//! machine that drives it.

pub mod commands;
pub mod core;
pub mod handler;
pub mod session;

pub use self::core::Server;
pub use handler::run_session;
pub use session::{Session, SessionState};
