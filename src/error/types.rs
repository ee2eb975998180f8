//! Error types
//!
//! Defines domain-specific error types for each layer of the protocol engine.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Wire codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("empty line")]
    Empty,
    #[error("not a valid command: {0:?}")]
    InvalidCommand(String),
    #[error("not a valid response: {0:?}")]
    InvalidResponse(String),
    #[error("unknown reply code {0}")]
    UnknownReplyCode(u16),
    #[error("line exceeds {0} bytes")]
    LineTooLong(usize),
    #[error("invalid PORT parameter: {0:?}")]
    InvalidPortParameter(String),
    #[error("invalid transfer descriptor: {0:?}")]
    InvalidDescriptor(String),
}

/// Data channel and file transfer errors
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("no data channel negotiated, send PORT first")]
    NoDataChannel,
    #[error("failed to bind data listener on {0}: {1}")]
    Bind(SocketAddr, #[source] io::Error),
    #[error("failed to connect data channel to {0}: {1}")]
    Connect(SocketAddr, #[source] io::Error),
    #[error("failed to accept data connection: {0}")]
    Accept(#[source] io::Error),
    #[error("control connection is not IPv4 ({0}), active mode needs an IPv4 address")]
    NotIpv4(SocketAddr),
    #[error("size mismatch: declared {declared} bytes, transferred {actual}")]
    SizeMismatch { declared: u64, actual: u64 },
    #[error("transfer I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Session-level errors, the taxonomy both state machines report
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    #[error("transport failure: {0}")]
    TransportFailure(#[from] io::Error),
    #[error("authentication denied for user {0:?}")]
    AuthenticationDenied(String),
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl From<CodecError> for SessionError {
    fn from(error: CodecError) -> Self {
        SessionError::ProtocolViolation(error.to_string())
    }
}

impl SessionError {
    /// Transport failure for a peer that hung up while we were waiting on it.
    pub fn connection_closed(context: &str) -> Self {
        SessionError::TransportFailure(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("connection closed {context}"),
        ))
    }

    /// Whether this error ended the session because the peer went away.
    pub fn is_disconnect(&self) -> bool {
        match self {
            SessionError::TransportFailure(e) => matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        }
    }
}
