//! A prompt-driven CLI channel over a telnet byte stream.
//!
//! Output is accumulated until a pattern matches at the tail of the buffer. Only
//! the tail is considered so that prompt-like text inside command output does not
//! end a read early.

use std::time::Duration;

use fleetcheck_common::error::SessionError;
use regex::Regex;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::telnet::Negotiator;

const READ_CHUNK: usize = 4096;

pub struct CliChannel<S> {
    stream: S,
    negotiator: Negotiator,
    /// Bytes of a UTF-8 sequence still waiting for the rest of it.
    pending: Vec<u8>,
    buffer: String,
    read_timeout: Duration,
}

impl<S> CliChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, read_timeout: Duration) -> Self {
        Self {
            stream,
            negotiator: Negotiator::new(),
            pending: Vec::new(),
            buffer: String::new(),
            read_timeout,
        }
    }

    pub fn set_read_timeout(&mut self, read_timeout: Duration) {
        self.read_timeout = read_timeout;
    }

    /// Sends `line` terminated by CR LF.
    pub async fn send_line(&mut self, line: &str) -> Result<(), SessionError> {
        self.stream.write_all(line.as_bytes()).await?;
        self.stream.write_all(b"\r\n").await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads until one of `patterns` matches; returns its index and the text up to
    /// and including the match. Anything after the match stays buffered.
    pub async fn read_until_any(
        &mut self,
        patterns: &[&Regex],
        waiting_for: &str,
    ) -> Result<(usize, String), SessionError> {
        loop {
            if let Some((idx, end)) = first_match(&self.buffer, patterns) {
                let rest = self.buffer.split_off(end);
                let text = std::mem::replace(&mut self.buffer, rest);
                return Ok((idx, text));
            }
            self.fill(waiting_for).await?;
        }
    }

    pub async fn read_until(&mut self, pattern: &Regex, waiting_for: &str) -> Result<String, SessionError> {
        let (_, text) = self.read_until_any(&[pattern], waiting_for).await?;
        Ok(text)
    }

    pub async fn shutdown(&mut self) -> Result<(), SessionError> {
        self.stream.shutdown().await?;
        Ok(())
    }

    async fn fill(&mut self, waiting_for: &str) -> Result<(), SessionError> {
        let mut chunk = [0u8; READ_CHUNK];
        let read = match timeout(self.read_timeout, self.stream.read(&mut chunk)).await {
            Ok(read) => read?,
            Err(_elapsed) => {
                return Err(SessionError::Timeout {
                    command: waiting_for.to_string(),
                    limit: self.read_timeout,
                });
            }
        };
        if read == 0 {
            return Err(SessionError::Closed);
        }

        let decoded = self.negotiator.feed(&chunk[..read]);
        if !decoded.replies.is_empty() {
            self.stream.write_all(&decoded.replies).await?;
            self.stream.flush().await?;
        }

        self.pending.extend_from_slice(&decoded.data);
        let text = take_complete_utf8(&mut self.pending);
        self.buffer.extend(text.chars().filter(|c| *c != '\r'));
        Ok(())
    }
}

/// Decodes the complete UTF-8 prefix of `pending`, leaving an unfinished trailing
/// sequence in place. Invalid bytes become U+FFFD.
fn take_complete_utf8(pending: &mut Vec<u8>) -> String {
    let mut text = String::new();
    let mut rest: &[u8] = pending;

    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                text.push_str(valid);
                rest = &[];
                break;
            }
            Err(err) => {
                let (valid, after) = rest.split_at(err.valid_up_to());
                // Checked by from_utf8 above.
                text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match err.error_len() {
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        rest = &after[len..];
                    }
                    None => {
                        rest = after;
                        break;
                    }
                }
            }
        }
    }

    let consumed = pending.len() - rest.len();
    pending.drain(..consumed);
    text
}

fn first_match(buffer: &str, patterns: &[&Regex]) -> Option<(usize, usize)> {
    patterns
        .iter()
        .enumerate()
        .find_map(|(idx, re)| re.find(buffer).map(|m| (idx, m.end())))
}
