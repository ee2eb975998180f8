//! Module `data_channel`
//!
//! Active-mode data connections: the client listens on an ephemeral port
//! and announces it with PORT, the server connects back to that address
//! once it is ready to stream.

use log::{debug, info};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::net::{TcpListener, TcpStream};

use crate::error::TransferError;
use crate::protocol::DataChannelAddress;

/// Binds a listener on `local_ip` with a kernel-assigned port.
///
/// The listener is ready to accept as soon as this returns, so the peer may
/// connect before we call accept.
pub async fn bind_active_listener(
    local_ip: Ipv4Addr,
) -> Result<(TcpListener, DataChannelAddress), TransferError> {
    let requested = SocketAddr::V4(SocketAddrV4::new(local_ip, 0));
    let listener = TcpListener::bind(requested)
        .await
        .map_err(|e| TransferError::Bind(requested, e))?;

    let address = match listener
        .local_addr()
        .map_err(|e| TransferError::Bind(requested, e))?
    {
        SocketAddr::V4(addr) => DataChannelAddress::from(addr),
        other => return Err(TransferError::NotIpv4(other)),
    };

    debug!("Data listener bound to {}", address.socket_addr());
    Ok((listener, address))
}

/// Accepts exactly one inbound data connection.
pub async fn accept_data_connection(listener: &TcpListener) -> Result<TcpStream, TransferError> {
    let (stream, peer) = listener.accept().await.map_err(TransferError::Accept)?;
    info!("Data connection accepted from {}", peer);
    Ok(stream)
}

/// Connects to the address recorded by a PORT command.
pub async fn open_data_channel(
    address: Option<DataChannelAddress>,
) -> Result<TcpStream, TransferError> {
    let address = address.ok_or(TransferError::NoDataChannel)?;
    let target = address.socket_addr();

    let stream = TcpStream::connect(target)
        .await
        .map_err(|e| TransferError::Connect(target, e))?;
    info!("Data connection opened to {}", target);
    Ok(stream)
}
