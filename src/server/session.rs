//! Module `session`
//!
//! Defines the server-side `Session`: the state of one control connection,
//! including authentication progress and the data-channel address recorded
//! by the most recent PORT command.

use log::debug;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::{CodecError, SessionError};
use crate::protocol::{
    Command, DataChannelAddress, Operation, ReplyCode, format_response, parse_command, read_line,
};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Greeting,
    Authenticating,
    Ready,
    Closed,
}

/// Server-side state for one control connection.
///
/// Owned by exactly one task; nothing in here is shared with other
/// connections.
pub struct Session<S> {
    control: BufReader<S>,
    peer: String,
    state: SessionState,
    username: Option<String>,
    data_channel: Option<DataChannelAddress>,
    max_command_length: usize,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: impl Into<String>, max_command_length: usize) -> Self {
        Self {
            control: BufReader::new(stream),
            peer: peer.into(),
            state: SessionState::Greeting,
            username: None,
            data_channel: None,
            max_command_length,
        }
    }

    /// Writes one reply line and flushes it immediately.
    pub async fn reply(&mut self, code: ReplyCode, message: &str) -> Result<(), SessionError> {
        debug!("Sending to {}: {} {}", self.peer, code, message);
        let line = format_response(code, message);
        let stream = self.control.get_mut();
        stream.write_all(line.as_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Reads and parses the next command line.
    pub async fn next_command(&mut self) -> Result<Command, SessionError> {
        let line = read_line(&mut self.control, self.max_command_length)
            .await?
            .ok_or_else(|| SessionError::connection_closed("by client"))?;
        let command = parse_command(&line)?;
        debug!("Received from {}: {:?}", self.peer, command.operation);
        Ok(command)
    }

    /// Reads the next command and requires it to be `operation` with a parameter.
    pub async fn expect_command(&mut self, operation: Operation) -> Result<String, SessionError> {
        let command = self.next_command().await?;

        if command.operation != operation {
            return Err(SessionError::ProtocolViolation(format!(
                "abnormal client flow: expected {}, got {}",
                operation, command.operation
            )));
        }

        command.parameter.ok_or_else(|| {
            SessionError::ProtocolViolation(format!("{} requires a parameter", operation))
        })
    }

    /// Decodes a PORT parameter and stores it, replacing any earlier address.
    ///
    /// An undecodable parameter clears the stored address.
    pub fn record_active_channel(
        &mut self,
        param: &str,
    ) -> Result<DataChannelAddress, CodecError> {
        let decoded = param.parse::<DataChannelAddress>();
        self.data_channel = decoded.as_ref().ok().copied();
        decoded
    }

    /// Removes the recorded data-channel address; each one serves one transfer.
    pub fn take_data_channel(&mut self) -> Option<DataChannelAddress> {
        self.data_channel.take()
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Ready)
    }

    pub fn data_channel(&self) -> Option<&DataChannelAddress> {
        self.data_channel.as_ref()
    }

    // --------------------
    // Setter methods
    // --------------------

    pub fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    /// Marks the session closed and shuts down the write side.
    pub async fn close(&mut self) {
        debug!("Closing session with {} in state {:?}", self.peer, self.state());
        self.state = SessionState::Closed;
        self.data_channel = None;
        let _ = self.control.get_mut().shutdown().await;
    }
}
