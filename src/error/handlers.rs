//! Error handlers
//!
//! Translates errors into reply codes and log records.

use log::{error, info, warn};

use crate::error::types::{SessionError, TransferError};
use crate::protocol::{ReplyCode, Response};

/// Reply code a server sends when a transfer fails with `err`.
pub fn reply_code_for(err: &TransferError) -> ReplyCode {
    match err {
        TransferError::NoDataChannel
        | TransferError::Bind(..)
        | TransferError::Connect(..)
        | TransferError::Accept(_)
        | TransferError::NotIpv4(_) => ReplyCode::CantOpenDataConnection,
        TransferError::SizeMismatch { .. } | TransferError::Io(_) => ReplyCode::TransferAborted,
    }
}

/// Full reply a server sends when a transfer fails with `err`.
pub fn reply_for(err: &TransferError) -> Response {
    let code = reply_code_for(err);
    let message = match code {
        ReplyCode::CantOpenDataConnection => "Can't open data connection",
        _ => "Connection closed; transfer aborted",
    };
    Response::new(code, message)
}

/// Logs the error that ended a session, at a level matching how unusual it is.
pub fn log_session_end(peer: &str, err: &SessionError) {
    match err {
        e if e.is_disconnect() => info!("Client {} disconnected: {}", peer, e),
        SessionError::AuthenticationDenied(_) => info!("Client {}: {}", peer, err),
        SessionError::ProtocolViolation(_) => warn!("Client {}: {}", peer, err),
        _ => error!("Session with {} failed: {}", peer, err),
    }
}
