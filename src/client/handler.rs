//! Interactive client loop
//!
//! Prompts for credentials and then for one operation per line: `get
//! <file>` or `quit`. The input source is any buffered reader, stdin in
//! the binary.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite};

use crate::client::session::ClientSession;
use crate::error::SessionError;

/// Runs a full interactive session: greeting, login, operations.
pub async fn run_interactive<S, O, I>(
    session: &mut ClientSession<S, O>,
    input: &mut I,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    O: AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
{
    session.await_greeting().await?;

    session.note("Username: ").await?;
    let username = read_input(input)
        .await?
        .ok_or_else(|| SessionError::connection_closed("on input before a username was given"))?;
    session.send_user(&username).await?;

    session.note("Password: ").await?;
    let password = read_input(input)
        .await?
        .ok_or_else(|| SessionError::connection_closed("on input before a password was given"))?;
    session.send_pass(&username, &password).await?;

    operate(session, input).await
}

/// The operation loop. End of input behaves like `quit`.
pub async fn operate<S, O, I>(
    session: &mut ClientSession<S, O>,
    input: &mut I,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    O: AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
{
    loop {
        session.note("Operation: ").await?;
        let Some(line) = read_input(input).await? else {
            return session.quit().await;
        };

        let line = line.trim();
        let (operation, argument) = match line.split_once(char::is_whitespace) {
            Some((operation, argument)) => (operation, argument.trim()),
            None => (line, ""),
        };

        match operation {
            "" => continue,
            "get" if argument.is_empty() => session.note("usage: get <file>\n").await?,
            "get" => {
                let download = session.get(argument).await?;
                session
                    .note(&format!(
                        "File transfer successfully: {} bytes written to {}\n",
                        download.received,
                        download.path.display()
                    ))
                    .await?;
            }
            "quit" => return session.quit().await,
            other => {
                session
                    .note(&format!("unrecognized command: {}\n", other))
                    .await?
            }
        }
    }
}

/// One line of input without its line ending, or `None` at end of input.
async fn read_input<I>(input: &mut I) -> Result<Option<String>, SessionError>
where
    I: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
