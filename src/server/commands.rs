//! Ready-state command handlers
//!
//! Each handler answers on the control channel itself. Only failures of the
//! control channel are returned as errors; everything that goes wrong with
//! a single command is reported to the client as a reply.

use log::{info, warn};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::ServerConfig;
use crate::error::handlers::reply_for;
use crate::error::{SessionError, TransferError};
use crate::protocol::{DataChannelAddress, ReplyCode};
use crate::server::session::Session;
use crate::storage::resolve_file_path;
use crate::transfer::{
    TransferDescriptor, check_size, open_data_channel, open_for_transfer, send_file,
};

/// Handles RETR: announce the file, connect back to the client, stream, confirm.
pub async fn handle_retr<S>(
    session: &mut Session<S>,
    param: Option<&str>,
    config: &ServerConfig,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // Any RETR uses up the recorded address, successful or not.
    let data_channel = session.take_data_channel();

    let Some(requested) = param else {
        return session
            .reply(ReplyCode::SyntaxError, "RETR requires a file name")
            .await;
    };

    let opened = match resolve_file_path(&config.server_root, requested) {
        Some(path) => open_for_transfer(&path).await,
        None => None,
    };

    let Some((mut file, size)) = opened else {
        info!("Client {} asked for missing file {:?}", session.peer(), requested);
        return session
            .reply(
                ReplyCode::FileNotFound,
                &format!("{}: no such file or directory", requested),
            )
            .await;
    };

    if data_channel.is_none() {
        let err = TransferError::NoDataChannel;
        warn!("Client {}: {}", session.peer(), err);
        let reply = reply_for(&err);
        return session.reply(reply.code, &reply.message).await;
    }

    let descriptor = TransferDescriptor::new(requested, size);
    session
        .reply(ReplyCode::FileStatus, &descriptor.to_string())
        .await?;

    match stream_file(data_channel, &mut file, size, config.buffer_size).await {
        Ok(()) => {
            info!(
                "Sent {} ({} bytes) to {} ({})",
                descriptor.name,
                descriptor.size,
                session.username().unwrap_or("anonymous"),
                session.peer()
            );
            session
                .reply(ReplyCode::TransferComplete, "Transfer complete")
                .await
        }
        Err(e) => {
            warn!("Transfer of {} to {} failed: {}", requested, session.peer(), e);
            let reply = reply_for(&e);
            session.reply(reply.code, &reply.message).await
        }
    }
}

/// Opens the data channel, sends the whole file and checks the count.
async fn stream_file(
    data_channel: Option<DataChannelAddress>,
    file: &mut File,
    size: u64,
    buffer_size: usize,
) -> Result<(), TransferError> {
    let mut data = open_data_channel(data_channel).await?;
    let sent = send_file(file, &mut data, buffer_size).await?;
    check_size(size, sent)
}

/// Handles PORT: remember where to connect for the next RETR.
///
/// A valid PORT gets no reply; the client goes straight on to RETR.
pub async fn handle_port<S>(
    session: &mut Session<S>,
    param: Option<&str>,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match session.record_active_channel(param.unwrap_or("")) {
        Ok(address) => {
            info!(
                "Client {} data channel set to {}",
                session.peer(),
                address.socket_addr()
            );
            Ok(())
        }
        Err(e) => {
            warn!("Client {}: {}", session.peer(), e);
            session
                .reply(ReplyCode::SyntaxError, "Invalid PORT parameter")
                .await
        }
    }
}
