//! Control-channel line reading
//!
//! Reads exactly one terminated line from a buffered stream, with an upper
//! bound on its length, so a peer cannot make us buffer without limit.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::{CodecError, SessionError};

/// Reads one line, returning it without its `\r\n` (or bare `\n`).
///
/// `Ok(None)` means the peer closed the connection cleanly between lines.
/// A line longer than `max_len` bytes is a protocol violation, and EOF in
/// the middle of a line is a transport failure.
pub async fn read_line<R>(reader: &mut R, max_len: usize) -> Result<Option<String>, SessionError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let n = (&mut *reader)
        .take(max_len as u64 + 1)
        .read_line(&mut line)
        .await?;

    if n == 0 {
        return Ok(None);
    }

    if n > max_len {
        return Err(CodecError::LineTooLong(max_len).into());
    }
    if !line.ends_with('\n') {
        return Err(SessionError::connection_closed("in the middle of a line"));
    }

    line.pop();
    if line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}
