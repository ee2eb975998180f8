//! Client side of the protocol
//!
//! A control-channel session that logs in and retrieves files over
//! active-mode data connections, plus the interactive loop around it.

pub mod handler;
pub mod session;

pub use handler::run_interactive;
pub use session::{ClientSession, ClientState, Download};
