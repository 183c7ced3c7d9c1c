//! PTY channel for interactive device sessions.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tokio::time::Instant;

use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Result};

/// An open shell channel with prompt-aware reads.
pub struct PtyChannel {
    channel: Channel<Msg>,
    buffer: PatternBuffer,
}

impl PtyChannel {
    /// Wrap a channel that already has a PTY and shell.
    pub fn new(channel: Channel<Msg>, search_depth: usize) -> Self {
        Self {
            channel,
            buffer: PatternBuffer::new(search_depth),
        }
    }

    /// Write a line to the device, terminated with a newline.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        trace!("> {line}");
        let payload = format!("{line}\n");
        self.channel
            .data(payload.as_bytes())
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Write a line without tracing it.
    pub async fn send_secret(&mut self, secret: &str) -> Result<()> {
        let payload = format!("{secret}\n");
        self.channel
            .data(payload.as_bytes())
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until `pattern` matches the tail of the output.
    ///
    /// Returns everything read since the previous call, prompt included.
    pub async fn read_until_pattern(
        &mut self,
        pattern: &Regex,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        self.read_until(timeout, |buffer| buffer.tail_contains(pattern))
            .await
    }

    async fn read_until(
        &mut self,
        timeout: Duration,
        done: impl Fn(&PatternBuffer) -> bool,
    ) -> Result<Vec<u8>> {
        let deadline = Instant::now() + timeout;

        while !done(&self.buffer) {
            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| ChannelError::PatternTimeout(timeout))?;

            match msg {
                Some(ChannelMsg::Data { data }) => self.buffer.extend(&data),
                Some(ChannelMsg::ExtendedData { data, .. }) => self.buffer.extend(&data),
                Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                    return Err(ChannelError::Closed.into());
                }
                Some(_) => {}
            }
        }

        Ok(self.buffer.take())
    }

    /// Send a line and read until `pattern` follows its echo.
    pub async fn exchange(
        &mut self,
        line: &str,
        pattern: &Regex,
        timeout: Duration,
    ) -> Result<String> {
        self.send_line(line).await?;
        let data = self
            .read_until(timeout, |buffer| buffer.tail_contains_after_echo(pattern))
            .await?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Send EOF and close the channel.
    pub async fn close(self) -> Result<()> {
        self.channel.eof().await.map_err(ChannelError::Ssh)?;
        self.channel.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}
