//! Remote CLI sessions.
//!
//! A [`SessionConnector`] turns [`ConnectionParameters`] into an open
//! [`RemoteSession`]. Deployment code only talks to these traits, so the SSH
//! implementation in [`SshConnector`] can be swapped for a scripted one in
//! tests.

mod ssh;

pub use ssh::{SshConnector, SshSession};

use std::future::Future;
use std::path::Path;

use secrecy::SecretString;

use crate::error::{Result, SessionError};

/// Everything needed to open a session to one device.
///
/// Built per task from the shared [`DeviceTemplate`](crate::config::DeviceTemplate).
#[derive(Debug, Clone)]
pub struct ConnectionParameters {
    /// Platform name (e.g., "cisco_ios").
    pub device_type: String,
    pub username: String,
    pub password: SecretString,
    /// Device address from the inventory.
    pub host: String,
    pub port: u16,
}

/// An open, authenticated CLI session.
///
/// Sessions are released with [`close`](RemoteSession::close), which
/// consumes the session.
pub trait RemoteSession: Send {
    /// Send a command and return its output.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<String>> + Send;

    /// Enter configuration mode, send `commands`, then apply and leave.
    ///
    /// Returns the full transcript of the exchange.
    fn send_config_set(&mut self, commands: &[&str]) -> impl Future<Output = Result<String>> + Send;

    /// Push the lines of a file as configuration commands.
    ///
    /// Blank lines are skipped; everything else is sent verbatim.
    fn send_config_from_file(
        &mut self,
        path: &Path,
    ) -> impl Future<Output = Result<String>> + Send {
        async move {
            let contents = tokio::fs::read_to_string(path).await.map_err(|source| {
                SessionError::ConfigFile {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

            let commands: Vec<&str> = contents
                .lines()
                .map(str::trim_end)
                .filter(|line| !line.is_empty())
                .collect();

            self.send_config_set(&commands).await
        }
    }

    /// Close the session.
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}

/// Opens sessions to devices.
pub trait SessionConnector: Send + Sync {
    type Session: RemoteSession;

    /// Connect, authenticate and prepare the CLI.
    fn connect(
        &self,
        params: ConnectionParameters,
    ) -> impl Future<Output = Result<Self::Session>> + Send;
}
