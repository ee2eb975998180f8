//! tinyftpd - Entry Point
//!
//! Serves files from a directory over the tinyftp control/data protocol.

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tinyftp::Server;
use tinyftp::auth::CredentialFile;
use tinyftp::config::ServerConfig;

#[derive(Debug, Parser)]
#[command(version, about = "Minimal active-mode FTP server")]
struct Cli {
    /// Control port to listen on
    port: Option<u16>,

    /// Configuration file (defaults to ./tinyftp.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind the control listener
    #[arg(long)]
    bind: Option<String>,

    /// Directory files are served from
    #[arg(long)]
    root: Option<PathBuf>,

    /// Credential list, one `username:password` per line
    #[arg(long)]
    users: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.control_port = port;
        }
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(root) = self.root {
            config.server_root = root;
        }
        if let Some(users) = self.users {
            config.credentials_file = users;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match ServerConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Launching FTP server...");

    let verifier = Arc::new(CredentialFile::new(config.credentials_file.clone()));
    let server = match Server::bind(config, verifier).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    server.run().await;
    ExitCode::SUCCESS
}
