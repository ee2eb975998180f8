//! Server session state machine
//!
//! Drives one control connection through greeting, USER/PASS
//! authentication and the command loop until QUIT or a fatal error.

use log::{info, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::auth::CredentialVerifier;
use crate::config::ServerConfig;
use crate::error::SessionError;
use crate::protocol::{Operation, ReplyCode};
use crate::server::commands::{handle_port, handle_retr};
use crate::server::session::{Session, SessionState};

const GREETING: &str = "tinyftp version 1.0";

/// Runs a complete session on `stream`.
///
/// Returns `Ok(())` after a QUIT. Any error means the session was aborted;
/// the connection has been shut down either way.
pub async fn run_session<S>(
    stream: S,
    peer: impl Into<String>,
    config: &ServerConfig,
    verifier: &dyn CredentialVerifier,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut session = Session::new(stream, peer, config.max_command_length);
    let result = drive(&mut session, config, verifier).await;
    session.close().await;
    result
}

async fn drive<S>(
    session: &mut Session<S>,
    config: &ServerConfig,
    verifier: &dyn CredentialVerifier,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    session.reply(ReplyCode::ServiceReady, GREETING).await?;
    authenticate(session, verifier).await?;
    operate(session, config).await
}

/// USER then PASS, in that order, and nothing else.
pub async fn authenticate<S>(
    session: &mut Session<S>,
    verifier: &dyn CredentialVerifier,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    session.set_state(SessionState::Authenticating);

    let username = expect_login_step(session, Operation::User).await?;
    session.set_username(Some(username.clone()));
    session
        .reply(
            ReplyCode::PasswordRequired,
            &format!("Password required for {}", username),
        )
        .await?;

    let password = expect_login_step(session, Operation::Pass).await?;
    if !verifier.verify(&username, &password) {
        session
            .reply(ReplyCode::NotLoggedIn, "Login incorrect")
            .await?;
        return Err(SessionError::AuthenticationDenied(username));
    }

    session
        .reply(ReplyCode::LoggedIn, &format!("User {} logged in", username))
        .await?;
    session.set_state(SessionState::Ready);
    info!("User {} logged in from {}", username, session.peer());
    Ok(())
}

async fn expect_login_step<S>(
    session: &mut Session<S>,
    operation: Operation,
) -> Result<String, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match session.expect_command(operation).await {
        Err(e @ SessionError::ProtocolViolation(_)) => {
            let _ = session
                .reply(ReplyCode::NotLoggedIn, "Please login with USER and PASS")
                .await;
            Err(e)
        }
        other => other,
    }
}

/// The Ready-state command loop.
pub async fn operate<S>(session: &mut Session<S>, config: &ServerConfig) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if !session.is_authenticated() {
        return Err(SessionError::ProtocolViolation(
            "command loop entered before login".into(),
        ));
    }

    loop {
        let command = session.next_command().await?;

        match command.operation {
            Operation::Retr => handle_retr(session, command.parameter(), config).await?,
            Operation::Port => handle_port(session, command.parameter()).await?,
            Operation::Quit => {
                session.reply(ReplyCode::Goodbye, "Goodbye").await?;
                session.set_state(SessionState::Closed);
                info!("Client {} quit", session.peer());
                return Ok(());
            }
            other => warn!("unexpected command from {}: {}", session.peer(), other),
        }
    }
}
