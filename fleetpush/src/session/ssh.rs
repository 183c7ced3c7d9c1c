//! SSH-backed session implementation.

use std::path::PathBuf;
use std::time::Duration;

use log::{debug, warn};
use secrecy::{ExposeSecret, SecretString};

use super::{ConnectionParameters, RemoteSession, SessionConnector};
use crate::channel::PtyChannel;
use crate::error::{Result, SessionError};
use crate::platform::{self, PlatformDefinition};
use crate::transport::{HostKeyVerification, SshConfig, SshTransport};

/// Opens [`SshSession`]s with shared transport settings.
#[derive(Debug, Clone)]
pub struct SshConnector {
    /// Connect and per-operation timeout.
    pub timeout: Duration,
    pub host_key_verification: HostKeyVerification,
    pub known_hosts_path: Option<PathBuf>,
}

impl Default for SshConnector {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }
}

impl SessionConnector for SshConnector {
    type Session = SshSession;

    async fn connect(&self, params: ConnectionParameters) -> Result<SshSession> {
        SshSession::open(self, params).await
    }
}

/// An interactive SSH CLI session to one device.
pub struct SshSession {
    transport: SshTransport,
    channel: PtyChannel,
    platform: PlatformDefinition,
    timeout: Duration,
    /// Used to answer the enable password prompt.
    password: SecretString,
    host: String,
}

impl SshSession {
    /// Connect, authenticate, reach privileged mode and disable paging.
    ///
    /// The connection is torn down again if any of the preparation steps
    /// fails.
    pub async fn open(connector: &SshConnector, params: ConnectionParameters) -> Result<Self> {
        let platform = platform::lookup(&params.device_type)?;

        let config = SshConfig {
            host: params.host.clone(),
            port: params.port,
            username: params.username,
            password: params.password.clone(),
            timeout: connector.timeout,
            terminal_width: platform.terminal_width,
            terminal_height: platform.terminal_height,
            host_key_verification: connector.host_key_verification,
            known_hosts_path: connector.known_hosts_path.clone(),
        };

        let transport = SshTransport::connect(config).await?;

        let channel = match transport.open_shell().await {
            Ok(channel) => channel,
            Err(e) => {
                let _ = transport.close().await;
                return Err(e);
            }
        };

        let mut session = Self {
            transport,
            channel,
            platform,
            timeout: connector.timeout,
            password: params.password,
            host: params.host,
        };

        if let Err(e) = session.prepare().await {
            let host = session.host.clone();
            if let Err(close_err) = session.close().await {
                debug!("{host}: close after failed open: {close_err}");
            }
            return Err(e);
        }

        Ok(session)
    }

    /// Wait for the first prompt, escalate if needed, run on-open commands.
    async fn prepare(&mut self) -> Result<()> {
        let banner = self
            .channel
            .read_until_pattern(&self.platform.prompt, self.timeout)
            .await?;

        if self.platform.needs_escalation(&banner) {
            self.escalate().await?;
        }

        for command in self.platform.on_open_commands.clone() {
            self.exchange(&command).await?;
        }

        debug!("{}: session ready ({})", self.host, self.platform.name);
        Ok(())
    }

    async fn escalate(&mut self) -> Result<()> {
        let (Some(command), Some(reply), Some(auth)) = (
            self.platform.escalate_command.clone(),
            self.platform.escalate_reply.clone(),
            self.platform.escalate_auth_prompt.clone(),
        ) else {
            return Ok(());
        };

        self.channel.send_line(&command).await?;
        let mut data = self.channel.read_until_pattern(&reply, self.timeout).await?;

        if auth.is_match(&data) {
            self.channel
                .send_secret(self.password.expose_secret())
                .await?;
            data = self
                .channel
                .read_until_pattern(&self.platform.prompt, self.timeout)
                .await?;
        }

        if self.platform.needs_escalation(&data) || auth.is_match(&data) {
            return Err(SessionError::PrivilegeAcquisitionFailed {
                target: "privileged exec".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Send one line and read up to the next prompt.
    async fn exchange(&mut self, line: &str) -> Result<String> {
        let raw = self
            .channel
            .exchange(line, &self.platform.prompt, self.timeout)
            .await?;
        Ok(raw.replace("\r\n", "\n"))
    }
}

impl RemoteSession for SshSession {
    async fn send_command(&mut self, command: &str) -> Result<String> {
        let raw = self.exchange(command).await?;
        Ok(self.platform.normalize_output(&raw, command))
    }

    async fn send_config_set(&mut self, commands: &[&str]) -> Result<String> {
        let mut transcript = String::new();

        let enter = self.platform.config_enter.clone();
        let exit = self.platform.config_exit.clone();

        let lines = enter
            .iter()
            .map(String::as_str)
            .chain(commands.iter().copied())
            .chain(exit.iter().map(String::as_str));

        for line in lines {
            transcript.push_str(&self.exchange(line).await?);
        }

        Ok(transcript)
    }

    async fn close(self) -> Result<()> {
        if let Err(e) = self.channel.close().await {
            warn!("{}: closing channel: {}", self.host, e);
        }
        self.transport.close().await
    }
}
