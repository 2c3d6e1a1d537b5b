//! Line-oriented protocol reading for client connections
//!
//! Clients speak a plain-text protocol: one logical message per
//! newline-terminated line. A line may arrive split across any number of
//! reads, and a single read may carry several lines; the reader below
//! reassembles both cases. Accumulation is bounded so a client that never
//! sends a terminator cannot grow the buffer without limit.

use shared::NPITS;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Byte budget for a single read from a client socket.
const READ_CHUNK: usize = 256;

/// One unit of client input.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    /// A complete line with its terminator stripped.
    Line(String),
    /// The accumulation budget was exceeded before a terminator arrived.
    Overflow,
    /// The peer closed its end of the stream.
    Eof,
}

/// Accumulates raw reads into newline-terminated lines. Input past the first
/// terminator is kept buffered for the next call.
pub struct LineReader<R> {
    inner: R,
    buffered: Vec<u8>,
    limit: usize,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R, limit: usize) -> Self {
        Self {
            inner,
            buffered: Vec::new(),
            limit,
        }
    }

    /// Yield the next frame, reading as many times as needed. Accepts both
    /// `\n` and `\r\n` terminators. An unterminated fragment followed by
    /// end-of-stream is discarded with the connection.
    pub async fn next_frame(&mut self) -> io::Result<Frame> {
        loop {
            if let Some(pos) = self.buffered.iter().position(|&byte| byte == b'\n') {
                let mut line: Vec<u8> = self.buffered.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(Frame::Line(String::from_utf8_lossy(&line).into_owned()));
            }
            if self.buffered.len() > self.limit {
                return Ok(Frame::Overflow);
            }

            let mut chunk = [0u8; READ_CHUNK];
            let count = self.inner.read(&mut chunk).await?;
            if count == 0 {
                return Ok(Frame::Eof);
            }
            self.buffered.extend_from_slice(&chunk[..count]);
        }
    }
}

/// Parse a move line into a pit index. Negative, unparsable, and empty
/// values all map to NPITS, which no board has, so they funnel into the
/// standard invalid-move handling rather than a separate parse error.
pub fn parse_move(line: &str) -> usize {
    match line.trim().parse::<i64>() {
        Ok(value) if (0..NPITS as i64).contains(&value) => value as usize,
        _ => NPITS,
    }
}
