use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use tinyftp::auth::CredentialFile;
use tinyftp::client::{ClientSession, ClientState};
use tinyftp::config::{ClientConfig, ServerConfig};
use tinyftp::error::SessionError;
use tinyftp::protocol::{DataChannelAddress, ReplyCode, Response, parse_response, read_line};
use tinyftp::Server;

const REPORT: &[u8] = b"hello world\n";

// Helper to setup a served directory with a credential list and one file
fn setup_test_env() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("root")).unwrap();
    fs::create_dir_all(dir.path().join("downloads")).unwrap();
    fs::write(dir.path().join("ftpusers"), "alice:secret\nbob:hunter2\n").unwrap();
    fs::write(dir.path().join("root/report.txt"), REPORT).unwrap();
    dir
}

// Start server in a separate task on an ephemeral port
async fn start_test_server(env: &Path) -> SocketAddr {
    let config = ServerConfig {
        bind_address: "127.0.0.1".into(),
        control_port: 0,
        server_root: env.join("root"),
        credentials_file: env.join("ftpusers"),
        ..ServerConfig::default()
    };
    let verifier = Arc::new(CredentialFile::new(env.join("ftpusers")));
    let server = Server::bind(config, verifier).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

async fn connect(addr: SocketAddr, env: &Path) -> ClientSession<TcpStream, Vec<u8>> {
    let config = ClientConfig {
        download_dir: env.join("downloads"),
        ..ClientConfig::default()
    };
    let mut session = ClientSession::connect(addr, config, Vec::new()).await.unwrap();
    session.await_greeting().await.unwrap();
    session
}

fn trace_of(session: &ClientSession<TcpStream, Vec<u8>>) -> String {
    String::from_utf8(session.trace().clone()).unwrap()
}

#[tokio::test]
async fn test_end_to_end_retrieval() {
    let env = setup_test_env();
    let addr = start_test_server(env.path()).await;

    let mut session = connect(addr, env.path()).await;
    session.login("alice", "secret").await.unwrap();
    assert_eq!(session.state(), ClientState::Ready);

    let download = session.get("report.txt").await.unwrap();
    assert_eq!(download.descriptor.size, 12);
    assert_eq!(download.received, 12);
    assert_eq!(fs::read(&download.path).unwrap(), REPORT);
    assert_eq!(download.path, env.path().join("downloads/report.txt"));

    session.quit().await.unwrap();
    assert_eq!(session.state(), ClientState::Closed);

    let trace = trace_of(&session);
    let codes: Vec<&str> = trace.lines().map(|l| &l[..3]).collect();
    assert_eq!(codes, ["220", "331", "230", "299", "226", "221"]);
    assert!(trace.contains("299 File report.txt size 12 bytes\n"));
    assert!(trace.contains("230 User alice logged in\n"));
}

#[tokio::test]
async fn test_missing_file_yields_550_and_session_continues() {
    let env = setup_test_env();
    let addr = start_test_server(env.path()).await;

    let mut session = connect(addr, env.path()).await;
    session.login("alice", "secret").await.unwrap();

    let err = session.get("nonexistent.txt").await.unwrap_err();
    assert!(matches!(err, SessionError::ResourceUnavailable(_)));
    assert!(trace_of(&session).ends_with("550 nonexistent.txt: no such file or directory\n"));
    assert!(!env.path().join("downloads/nonexistent.txt").exists());

    // the control channel is still usable after a failed RETR
    let download = session.get("report.txt").await.unwrap();
    assert_eq!(download.received, 12);
    session.quit().await.unwrap();
}

#[tokio::test]
async fn test_repeated_retr_is_idempotent() {
    let env = setup_test_env();
    let addr = start_test_server(env.path()).await;

    let mut session = connect(addr, env.path()).await;
    session.login("bob", "hunter2").await.unwrap();

    let first = session.get("report.txt").await.unwrap();
    let first_bytes = fs::read(&first.path).unwrap();
    let second = session.get("report.txt").await.unwrap();
    let second_bytes = fs::read(&second.path).unwrap();

    assert_eq!(first.descriptor, second.descriptor);
    assert_eq!(first_bytes, second_bytes);
    session.quit().await.unwrap();
}

#[tokio::test]
async fn test_large_file_spans_many_chunks() {
    let env = setup_test_env();
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(env.path().join("root/big.bin"), &payload).unwrap();
    let addr = start_test_server(env.path()).await;

    let mut session = connect(addr, env.path()).await;
    session.login("alice", "secret").await.unwrap();
    let download = session.get("big.bin").await.unwrap();

    assert_eq!(download.received, payload.len() as u64);
    assert_eq!(fs::read(&download.path).unwrap(), payload);
    session.quit().await.unwrap();
}

#[tokio::test]
async fn test_invalid_credentials_are_denied() {
    let env = setup_test_env();
    let addr = start_test_server(env.path()).await;

    for (user, pass) in [("alice", "hunter2"), ("carol", "secret"), ("ALICE", "secret")] {
        let mut session = connect(addr, env.path()).await;
        let err = session.login(user, pass).await.unwrap_err();
        assert!(matches!(err, SessionError::AuthenticationDenied(_)));
        assert_ne!(session.state(), ClientState::Ready);
        assert!(trace_of(&session).ends_with("530 Login incorrect\n"));
    }
}

#[tokio::test]
async fn test_concurrent_sessions_are_isolated() {
    let env = setup_test_env();
    fs::write(env.path().join("root/other.txt"), b"another file").unwrap();
    let addr = start_test_server(env.path()).await;

    let mut first = connect(addr, env.path()).await;
    let mut second = connect(addr, env.path()).await;
    first.login("alice", "secret").await.unwrap();
    second.login("bob", "hunter2").await.unwrap();

    let (a, b) = tokio::join!(first.get("report.txt"), second.get("other.txt"));
    assert_eq!(a.unwrap().received, 12);
    assert_eq!(b.unwrap().received, 12);

    first.quit().await.unwrap();
    second.quit().await.unwrap();
}

// Raw protocol driver, to check the exact bytes on both channels.
struct RawClient {
    control: BufReader<TcpStream>,
}

impl RawClient {
    async fn connect(addr: SocketAddr) -> Self {
        let mut client = Self {
            control: BufReader::new(TcpStream::connect(addr).await.unwrap()),
        };
        assert_eq!(client.recv().await.unwrap().code, ReplyCode::ServiceReady);
        client
    }

    async fn send(&mut self, line: &str) {
        self.control
            .get_mut()
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .unwrap();
    }

    async fn recv(&mut self) -> Option<Response> {
        read_line(&mut self.control, 512)
            .await
            .unwrap()
            .map(|line| parse_response(&line).unwrap())
    }

    async fn login(&mut self) {
        self.send("USER alice").await;
        assert_eq!(self.recv().await.unwrap().code, ReplyCode::PasswordRequired);
        self.send("PASS secret").await;
        assert_eq!(self.recv().await.unwrap().code, ReplyCode::LoggedIn);
    }
}

#[tokio::test]
async fn test_wire_level_transfer() {
    let env = setup_test_env();
    let addr = start_test_server(env.path()).await;
    let mut raw = RawClient::connect(addr).await;
    raw.login().await;

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let encoded = DataChannelAddress::new(Ipv4Addr::LOCALHOST, port).to_string();
    raw.send(&format!("PORT {encoded}")).await;
    raw.send("RETR report.txt").await;

    assert_eq!(
        raw.recv().await.unwrap(),
        Response::new(ReplyCode::FileStatus, "File report.txt size 12 bytes")
    );

    let (mut data, _) = listener.accept().await.unwrap();
    let mut received = Vec::new();
    data.read_to_end(&mut received).await.unwrap();
    assert_eq!(received, REPORT);

    assert_eq!(
        raw.recv().await.unwrap(),
        Response::new(ReplyCode::TransferComplete, "Transfer complete")
    );

    // the address was consumed by the first transfer
    raw.send("RETR report.txt").await;
    assert_eq!(
        raw.recv().await.unwrap().code,
        ReplyCode::CantOpenDataConnection
    );

    raw.send("QUIT").await;
    assert_eq!(raw.recv().await.unwrap().code, ReplyCode::Goodbye);
    assert!(raw.recv().await.is_none());
}

#[tokio::test]
async fn test_unreachable_data_address_reports_425() {
    let env = setup_test_env();
    let addr = start_test_server(env.path()).await;
    let mut raw = RawClient::connect(addr).await;
    raw.login().await;

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    raw.send(&format!(
        "PORT {}",
        DataChannelAddress::new(Ipv4Addr::LOCALHOST, port)
    ))
    .await;
    raw.send("RETR report.txt").await;
    assert_eq!(raw.recv().await.unwrap().code, ReplyCode::FileStatus);
    assert_eq!(
        raw.recv().await.unwrap().code,
        ReplyCode::CantOpenDataConnection
    );

    raw.send("QUIT").await;
    assert_eq!(raw.recv().await.unwrap().code, ReplyCode::Goodbye);
}

#[tokio::test]
async fn test_command_ordering_is_enforced() {
    let env = setup_test_env();
    let addr = start_test_server(env.path()).await;

    let mut raw = RawClient::connect(addr).await;
    raw.send("PASS secret").await;
    let reply = raw.recv().await.unwrap();
    assert_ne!(reply.code, ReplyCode::LoggedIn);
    assert!(raw.recv().await.is_none());

    let mut raw = RawClient::connect(addr).await;
    raw.send("RETR report.txt").await;
    let reply = raw.recv().await.unwrap();
    assert_ne!(reply.code, ReplyCode::FileStatus);
    assert!(raw.recv().await.is_none());
}

#[tokio::test]
async fn test_path_traversal_is_refused() {
    let env = setup_test_env();
    let addr = start_test_server(env.path()).await;
    let mut raw = RawClient::connect(addr).await;
    raw.login().await;

    raw.send("PORT 127,0,0,1,200,0").await;
    raw.send("RETR ../ftpusers").await;
    assert_eq!(raw.recv().await.unwrap().code, ReplyCode::FileNotFound);
}

#[tokio::test]
async fn test_long_missing_name_still_gets_550() {
    let env = setup_test_env();
    let addr = start_test_server(env.path()).await;

    let mut session = connect(addr, env.path()).await;
    session.login("alice", "secret").await.unwrap();

    // RETR line fits the server's command bound; the 550 echoing it is longer
    let name = "n".repeat(490);
    let err = session.get(&name).await.unwrap_err();
    assert!(matches!(err, SessionError::ResourceUnavailable(_)));
    assert!(trace_of(&session).ends_with(&format!("550 {name}: no such file or directory\n")));

    session.quit().await.unwrap();
}

#[tokio::test]
async fn test_dropped_data_connection_reports_426() {
    let env = setup_test_env();
    let payload = vec![7u8; 16 * 1024 * 1024];
    fs::write(env.path().join("root/huge.bin"), &payload).unwrap();
    let addr = start_test_server(env.path()).await;
    let mut raw = RawClient::connect(addr).await;
    raw.login().await;

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    raw.send(&format!(
        "PORT {}",
        DataChannelAddress::new(Ipv4Addr::LOCALHOST, port)
    ))
    .await;
    raw.send("RETR huge.bin").await;
    assert_eq!(raw.recv().await.unwrap().code, ReplyCode::FileStatus);

    // accept and hang up without reading: the server's writes start failing
    let (data, _) = listener.accept().await.unwrap();
    drop(data);

    assert_eq!(
        raw.recv().await.unwrap(),
        Response::new(ReplyCode::TransferAborted, "Connection closed; transfer aborted")
    );

    // the session survives an aborted transfer
    raw.send("QUIT").await;
    assert_eq!(raw.recv().await.unwrap().code, ReplyCode::Goodbye);
}
