//! Client session
//!
//! The client end of a control connection. Every reply received is echoed
//! to the trace sink as `<code> <message>` before it is checked, so an
//! operator sees the whole exchange.

use log::{debug, info};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::config::ClientConfig;
use crate::error::{SessionError, TransferError};
use crate::protocol::{Command, ReplyCode, Response, parse_response, read_line};
use crate::storage::validation::file_name_of;
use crate::transfer::{
    TransferDescriptor, accept_data_connection, bind_active_listener, check_size, receive_file,
};

/// Where the client is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Greeting,
    Authenticating,
    Ready,
    Closed,
}

/// What a completed `get` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub descriptor: TransferDescriptor,
    pub path: PathBuf,
    pub received: u64,
}

/// What showed up first after a 299.
enum Arrival {
    Data(TcpStream),
    Reply,
}

pub struct ClientSession<S, O> {
    control: BufReader<S>,
    local_ip: Ipv4Addr,
    trace: O,
    config: ClientConfig,
    state: ClientState,
}

impl<O> ClientSession<TcpStream, O>
where
    O: AsyncWrite + Unpin,
{
    /// Opens the control connection to `server`.
    ///
    /// The connection's local address is kept: it is where data listeners
    /// are bound, so the server can reach them.
    pub async fn connect(
        server: SocketAddr,
        config: ClientConfig,
        trace: O,
    ) -> Result<Self, SessionError> {
        let stream = TcpStream::connect(server).await?;
        let local_ip = match stream.local_addr()? {
            SocketAddr::V4(addr) => *addr.ip(),
            other => return Err(TransferError::NotIpv4(other).into()),
        };
        info!("Connected to {} from {}", server, local_ip);
        Ok(Self::new(stream, local_ip, config, trace))
    }
}

impl<S, O> ClientSession<S, O>
where
    S: AsyncRead + AsyncWrite + Unpin,
    O: AsyncWrite + Unpin,
{
    pub fn new(stream: S, local_ip: Ipv4Addr, config: ClientConfig, trace: O) -> Self {
        Self {
            control: BufReader::new(stream),
            local_ip,
            trace,
            config,
            state: ClientState::Greeting,
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn trace(&self) -> &O {
        &self.trace
    }

    /// Writes operator-facing text to the trace sink.
    pub async fn note(&mut self, text: &str) -> Result<(), SessionError> {
        self.trace.write_all(text.as_bytes()).await?;
        self.trace.flush().await?;
        Ok(())
    }

    async fn send(&mut self, command: &Command) -> Result<(), SessionError> {
        debug!("Sending {}", command.operation);
        let stream = self.control.get_mut();
        stream.write_all(command.to_wire().as_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Reads one reply and echoes it to the trace.
    async fn receive(&mut self) -> Result<Response, SessionError> {
        let line = read_line(&mut self.control, self.config.max_response_length)
            .await?
            .ok_or_else(|| SessionError::connection_closed("by host"))?;

        match parse_response(&line) {
            Ok(response) => {
                self.note(&format!("{}\n", response)).await?;
                Ok(response)
            }
            Err(e) => {
                self.note(&format!("{}\n", line)).await?;
                Err(e.into())
            }
        }
    }

    async fn expect(&mut self, code: ReplyCode) -> Result<Response, SessionError> {
        let response = self.receive().await?;
        if response.code != code {
            return Err(SessionError::ProtocolViolation(format!(
                "expected {}, got {}",
                code, response
            )));
        }
        Ok(response)
    }

    /// Waits for the 220 the server sends on accept.
    pub async fn await_greeting(&mut self) -> Result<Response, SessionError> {
        let greeting = self.expect(ReplyCode::ServiceReady).await?;
        self.state = ClientState::Authenticating;
        Ok(greeting)
    }

    /// Sends USER and requires the password prompt.
    pub async fn send_user(&mut self, username: &str) -> Result<(), SessionError> {
        self.send(&Command::user(username)).await?;
        self.expect(ReplyCode::PasswordRequired).await?;
        Ok(())
    }

    /// Sends PASS; a 530 is reported as a denied login.
    pub async fn send_pass(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        self.send(&Command::pass(password)).await?;
        let response = self.receive().await?;
        match response.code {
            ReplyCode::LoggedIn => {
                self.state = ClientState::Ready;
                Ok(())
            }
            ReplyCode::NotLoggedIn => Err(SessionError::AuthenticationDenied(username.to_string())),
            _ => Err(SessionError::ProtocolViolation(format!(
                "unexpected reply to PASS: {}",
                response
            ))),
        }
    }

    /// USER and PASS in one go.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        self.send_user(username).await?;
        self.send_pass(username, password).await
    }

    /// Binds a data listener and announces it with PORT.
    ///
    /// PORT has no reply; the listener is returned ready to accept the
    /// server's connection.
    pub async fn prepare_active_channel(&mut self) -> Result<TcpListener, SessionError> {
        let (listener, address) = bind_active_listener(self.local_ip).await?;
        self.send(&Command::port(&address.to_string())).await?;
        Ok(listener)
    }

    /// Retrieves `remote` into the download directory.
    pub async fn get(&mut self, remote: &str) -> Result<Download, SessionError> {
        let local_name = file_name_of(remote).ok_or_else(|| {
            SessionError::ResourceUnavailable(format!("{remote}: not a file name"))
        })?;
        let destination = self.config.download_dir.join(local_name);

        let listener = self.prepare_active_channel().await?;
        self.send(&Command::retr(remote)).await?;

        let announced = self.receive().await?;
        match announced.code {
            ReplyCode::FileStatus => {}
            ReplyCode::FileNotFound => {
                return Err(SessionError::ResourceUnavailable(announced.message));
            }
            _ => {
                return Err(SessionError::ProtocolViolation(format!(
                    "Failed to retrieve file: {}",
                    announced
                )));
            }
        }
        let descriptor = TransferDescriptor::parse(&announced.message)?;

        // The server connects back after the 299. A reply can also get here
        // first: a 425 when it could not connect, or the 226 of a transfer
        // that finished before we polled accept. Only peek at the control
        // channel here so no partial reply is lost.
        let arrival = tokio::select! {
            biased;
            accepted = accept_data_connection(&listener) => Arrival::Data(accepted?),
            ready = self.control.fill_buf() => {
                ready?;
                Arrival::Reply
            }
        };

        let (mut data, completed) = match arrival {
            Arrival::Data(stream) => (stream, None),
            Arrival::Reply => {
                let reply = self.receive().await?;
                match reply.code {
                    ReplyCode::TransferComplete => {
                        (accept_data_connection(&listener).await?, Some(reply))
                    }
                    ReplyCode::CantOpenDataConnection | ReplyCode::TransferAborted => {
                        return Err(SessionError::ResourceUnavailable(format!(
                            "data connection not opened: {}",
                            reply
                        )));
                    }
                    _ => {
                        return Err(SessionError::ProtocolViolation(format!(
                            "unexpected reply during transfer: {}",
                            reply
                        )));
                    }
                }
            }
        };
        drop(listener);

        let mut output = File::create(&destination).await?;
        let received = receive_file(&mut data, &mut output, self.config.buffer_size).await?;
        drop(data);
        drop(output);

        let done = match completed {
            Some(done) => done,
            None => self.receive().await?,
        };
        if done.code != ReplyCode::TransferComplete {
            return Err(SessionError::ProtocolViolation(format!(
                "File transfer not completed successfully: {}",
                done
            )));
        }
        check_size(descriptor.size, received)?;

        info!(
            "Retrieved {} ({} bytes) into {}",
            descriptor.name,
            received,
            destination.display()
        );
        Ok(Download {
            descriptor,
            path: destination,
            received,
        })
    }

    /// Sends QUIT and waits for the goodbye.
    pub async fn quit(&mut self) -> Result<(), SessionError> {
        self.send(&Command::quit()).await?;
        self.expect(ReplyCode::Goodbye).await?;
        self.state = ClientState::Closed;
        let _ = self.control.get_mut().shutdown().await;
        Ok(())
    }
}
