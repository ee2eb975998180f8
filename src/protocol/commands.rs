//! Module `command`
//!
//! Defines the control-channel command grammar: an operation token of at
//! least four characters, optionally followed by a single parameter.

use std::fmt;

use crate::error::CodecError;

/// Minimum length of an operation token.
pub const COMMAND_WORD_LEN: usize = 4;

/// The operation part of a command.
///
/// Tokens this protocol does not act on are kept as `Other` so the session
/// can log them and carry on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    User,
    Pass,
    Retr,
    Port,
    Quit,
    Other(String),
}

impl Operation {
    fn from_token(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "USER" => Operation::User,
            "PASS" => Operation::Pass,
            "RETR" => Operation::Retr,
            "PORT" => Operation::Port,
            "QUIT" => Operation::Quit,
            other => Operation::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operation::User => "USER",
            Operation::Pass => "PASS",
            Operation::Retr => "RETR",
            Operation::Port => "PORT",
            Operation::Quit => "QUIT",
            Operation::Other(token) => token,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed control-channel command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub operation: Operation,
    pub parameter: Option<String>,
}

impl Command {
    pub fn new(operation: Operation, parameter: Option<String>) -> Self {
        Self {
            operation,
            parameter,
        }
    }

    pub fn user(name: &str) -> Self {
        Self::new(Operation::User, Some(name.to_string()))
    }

    pub fn pass(secret: &str) -> Self {
        Self::new(Operation::Pass, Some(secret.to_string()))
    }

    pub fn retr(path: &str) -> Self {
        Self::new(Operation::Retr, Some(path.to_string()))
    }

    pub fn port(encoded: &str) -> Self {
        Self::new(Operation::Port, Some(encoded.to_string()))
    }

    pub fn quit() -> Self {
        Self::new(Operation::Quit, None)
    }

    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// Serialized form including the CRLF terminator.
    pub fn to_wire(&self) -> String {
        format!("{}\r\n", self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parameter {
            Some(parameter) => write!(f, "{} {}", self.operation, parameter),
            None => write!(f, "{}", self.operation),
        }
    }
}

/// Parses a raw command line received from a client into a [`Command`].
///
/// The parameter is everything after the first run of whitespace, trimmed.
/// Fails when the operation token is missing or shorter than
/// [`COMMAND_WORD_LEN`].
pub fn parse_command(raw: &str) -> Result<Command, CodecError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CodecError::Empty);
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let token = parts.next().unwrap_or("");
    let arg = parts.next().unwrap_or("").trim();

    if token.len() < COMMAND_WORD_LEN || !token.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CodecError::InvalidCommand(trimmed.to_string()));
    }

    Ok(Command {
        operation: Operation::from_token(token),
        parameter: (!arg.is_empty()).then(|| arg.to_string()),
    })
}
