use log::{error, info};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

use crate::auth::CredentialVerifier;
use crate::config::ServerConfig;
use crate::error::handlers::log_session_end;
use crate::server::handler::run_session;

/// Accepts control connections and runs each session in its own task.
pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl Server {
    /// Binds the control listener described by `config`.
    pub async fn bind(
        config: ServerConfig,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> io::Result<Self> {
        let addr = config
            .control_socket()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind to {}: {}", addr, e);
            e
        })?;
        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self {
            listener,
            config: Arc::new(config),
            verifier,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop. Runs until the process is stopped.
    pub async fn run(self) {
        info!(
            "Waiting connections on {} (serving {})",
            self.local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "?".into()),
            self.config.server_root.display()
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let config = Arc::clone(&self.config);
                    let verifier = Arc::clone(&self.verifier);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        handle_connection(stream, addr, config, verifier).await;
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    config: Arc<ServerConfig>,
    verifier: Arc<dyn CredentialVerifier>,
) {
    info!("Client connected: {}", addr);
    let peer = addr.to_string();

    match run_session(stream, peer.as_str(), &config, verifier.as_ref()).await {
        Ok(()) => info!("Client {} disconnected", addr),
        Err(e) => log_session_end(&peer, &e),
    }
}
