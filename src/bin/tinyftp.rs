//! tinyftp - interactive client
//!
//! Connects to a tinyftpd server, asks for credentials, then accepts
//! `get <file>` and `quit` at the `Operation:` prompt.

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::BufReader;

use tinyftp::client::{ClientSession, run_interactive};
use tinyftp::config::ClientConfig;

#[derive(Debug, Parser)]
#[command(version, about = "Minimal active-mode FTP client")]
struct Cli {
    /// Server IP address
    server_ip: IpAddr,

    /// Server control port
    server_port: u16,

    /// Configuration file (defaults to ./tinyftp.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory retrieved files are written to
    #[arg(long)]
    download_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut config = match ClientConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("tinyftp: failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = cli.download_dir {
        config.download_dir = dir;
    }

    let server = SocketAddr::new(cli.server_ip, cli.server_port);
    let mut session = match ClientSession::connect(server, config, tokio::io::stdout()).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("tinyftp: connection to {server} failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut input = BufReader::new(tokio::io::stdin());
    match run_interactive(&mut session, &mut input).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tinyftp: {e}");
            ExitCode::FAILURE
        }
    }
}
