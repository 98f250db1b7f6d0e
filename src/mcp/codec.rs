//! Line codec for the MCP stdio transport.
//!
//! Frame format: one UTF-8 JSON-RPC message per line, terminated by `\n`
//! (a trailing `\r` is tolerated). Messages never contain raw newlines.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// One inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Line contents without the terminator.
    Message(Vec<u8>),
    /// Line exceeded the size cap; its bytes were discarded. Carries the size.
    Oversized(usize),
}

/// Read one line from the stream.
///
/// Returns `None` on clean EOF. An unterminated final line is still returned.
/// Lines longer than `max_bytes` are drained and reported as
/// [`Frame::Oversized`] so the caller can answer and keep reading.
pub async fn read_frame<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max_bytes: usize,
) -> std::io::Result<Option<Frame>> {
    let mut line = Vec::new();
    let mut total = 0usize;
    let mut saw_any = false;

    loop {
        let (consumed, done) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                if !saw_any {
                    return Ok(None);
                }
                break;
            }
            saw_any = true;

            let (chunk, consumed, done) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (&available[..i], i + 1, true),
                None => (available, available.len(), false),
            };
            total += chunk.len();
            if total <= max_bytes {
                line.extend_from_slice(chunk);
            }
            (consumed, done)
        };
        reader.consume(consumed);
        if done {
            break;
        }
    }

    if total > max_bytes {
        return Ok(Some(Frame::Oversized(total)));
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(Some(Frame::Message(line)))
}

/// Write one message as a single line.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &Value,
) -> std::io::Result<()> {
    let mut payload = serde_json::to_vec(message)?;
    payload.push(b'\n');
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_reads_lines_then_eof() {
        let mut reader = BufReader::new(&b"{\"a\":1}\r\n\n{\"b\":2}"[..]);
        assert_eq!(
            read_frame(&mut reader, 1024).await.unwrap(),
            Some(Frame::Message(b"{\"a\":1}".to_vec()))
        );
        assert_eq!(
            read_frame(&mut reader, 1024).await.unwrap(),
            Some(Frame::Message(Vec::new()))
        );
        assert_eq!(
            read_frame(&mut reader, 1024).await.unwrap(),
            Some(Frame::Message(b"{\"b\":2}".to_vec()))
        );
        assert_eq!(read_frame(&mut reader, 1024).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_oversized_line_is_drained() {
        // Small buffer so the long line spans several fill_buf calls.
        let input = format!("{}\n{{\"ok\":true}}\n", "x".repeat(100));
        let mut reader = BufReader::with_capacity(8, input.as_bytes());

        assert_eq!(
            read_frame(&mut reader, 16).await.unwrap(),
            Some(Frame::Oversized(100))
        );
        assert_eq!(
            read_frame(&mut reader, 16).await.unwrap(),
            Some(Frame::Message(b"{\"ok\":true}".to_vec()))
        );
    }

    #[tokio::test]
    async fn test_write_frame_is_single_line() {
        let mut out = Vec::new();
        write_frame(&mut out, &json!({"text": "line1\nline2"})).await.unwrap();
        assert_eq!(out.iter().filter(|&&b| b == b'\n').count(), 1);
        assert!(out.ends_with(b"\n"));
    }
}
