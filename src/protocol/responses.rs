//! FTP Response handling
//!
//! Defines the reply codes both peers agree on, and the parsing and
//! formatting of `CODE MESSAGE` reply lines.

use std::fmt;

use crate::error::CodecError;

/// Reply codes understood by this protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyCode {
    ServiceReady,
    Goodbye,
    TransferComplete,
    LoggedIn,
    FileStatus,
    PasswordRequired,
    CantOpenDataConnection,
    TransferAborted,
    SyntaxError,
    NotLoggedIn,
    FileNotFound,
}

impl ReplyCode {
    pub fn as_u16(self) -> u16 {
        match self {
            ReplyCode::ServiceReady => 220,
            ReplyCode::Goodbye => 221,
            ReplyCode::TransferComplete => 226,
            ReplyCode::LoggedIn => 230,
            ReplyCode::FileStatus => 299,
            ReplyCode::PasswordRequired => 331,
            ReplyCode::CantOpenDataConnection => 425,
            ReplyCode::TransferAborted => 426,
            ReplyCode::SyntaxError => 501,
            ReplyCode::NotLoggedIn => 530,
            ReplyCode::FileNotFound => 550,
        }
    }
}

impl TryFrom<u16> for ReplyCode {
    type Error = CodecError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Ok(match code {
            220 => ReplyCode::ServiceReady,
            221 => ReplyCode::Goodbye,
            226 => ReplyCode::TransferComplete,
            230 => ReplyCode::LoggedIn,
            299 => ReplyCode::FileStatus,
            331 => ReplyCode::PasswordRequired,
            425 => ReplyCode::CantOpenDataConnection,
            426 => ReplyCode::TransferAborted,
            501 => ReplyCode::SyntaxError,
            530 => ReplyCode::NotLoggedIn,
            550 => ReplyCode::FileNotFound,
            other => return Err(CodecError::UnknownReplyCode(other)),
        })
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// A single reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub code: ReplyCode,
    pub message: String,
}

impl Response {
    pub fn new(code: ReplyCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Serialized form including the CRLF terminator.
    pub fn to_wire(&self) -> String {
        format_response(self.code, &self.message)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

/// Format an FTP response message
pub fn format_response(code: ReplyCode, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

/// Parses a reply line (terminator already removed, or not) into a [`Response`].
///
/// The code is the leading run of ASCII digits and must be three digits long;
/// everything after the single separating space is the message.
pub fn parse_response(line: &str) -> Result<Response, CodecError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(CodecError::Empty);
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits != 3 {
        return Err(CodecError::InvalidResponse(line.to_string()));
    }

    let (code, rest) = line.split_at(digits);
    if !(rest.is_empty() || rest.starts_with(' ')) {
        return Err(CodecError::InvalidResponse(line.to_string()));
    }

    let code: u16 = code
        .parse()
        .map_err(|_| CodecError::InvalidResponse(line.to_string()))?;

    Ok(Response {
        code: ReplyCode::try_from(code)?,
        message: rest.strip_prefix(' ').unwrap_or(rest).to_string(),
    })
}
