//! FTP Protocol implementation
//!
//! Handles command and reply parsing, the PORT address encoding, and
//! bounded line reading for the control channel.

pub mod commands;
pub mod parser;
pub mod port;
pub mod responses;

pub use commands::{Command, Operation, parse_command};
pub use parser::read_line;
pub use port::DataChannelAddress;
pub use responses::{ReplyCode, Response, format_response, parse_response};
