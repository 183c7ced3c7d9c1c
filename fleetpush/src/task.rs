//! Deployment to a single device.
//!
//! A [`DeviceTask`] opens a session, identifies the device, pushes its
//! config file and closes the session again. Whatever goes wrong is folded
//! into a [`TaskResult`], so every address yields exactly one result.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::time::Instant;

use crate::config::{DeviceTemplate, RunConfig};
use crate::error::DeployError;
use crate::identify::{IDENTIFY_COMMAND, identify};
use crate::session::{RemoteSession, SessionConnector};

/// Width of the `=` rule that ends every transcript.
pub const SEPARATOR_WIDTH: usize = 80;

/// Extension of per-device config files.
pub const CONFIG_EXTENSION: &str = "conf";

/// Upper bound on closing a session once the work is done.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// The outcome of one device's deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    /// Inventory address the task was started for.
    pub address: String,

    /// Extracted hostname on success, the address on failure.
    pub label: String,

    /// Human-readable record written to the device log.
    pub transcript: String,

    pub deployed: bool,
}

impl TaskResult {
    /// Result for a device whose config was pushed.
    pub fn deployed(address: impl Into<String>, hostname: &str, push_output: &str) -> Self {
        let transcript = [
            format!("Configs deployed to {hostname}"),
            push_output.to_string(),
            format!("\n{}\n", separator()),
        ]
        .join("\n");

        Self {
            address: address.into(),
            label: hostname.to_string(),
            transcript,
            deployed: true,
        }
    }

    /// Result for a device that could not be deployed, for any reason.
    pub fn failed(address: impl Into<String>) -> Self {
        let address = address.into();
        let transcript = format!("Unable to login to device {address}\n\n{}\n", separator());

        Self {
            label: address.clone(),
            address,
            transcript,
            deployed: false,
        }
    }

    /// Fold a deployment outcome into a result, logging failures.
    pub fn from_outcome(address: &str, outcome: Result<TaskResult, DeployError>) -> Self {
        match outcome {
            Ok(result) => result,
            Err(e) => {
                error!("Unable to login to device {address}: {e}");
                Self::failed(address)
            }
        }
    }
}

/// The transcript separator line.
pub fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

/// Config file name for a hostname: lowercased, with the `.conf` extension.
pub fn config_file_name(hostname: &str) -> String {
    format!("{}.{CONFIG_EXTENSION}", hostname.to_lowercase())
}

/// Deploys config to one device at a time using a session connector.
pub struct DeviceTask<C> {
    connector: C,
    template: Arc<DeviceTemplate>,
    config_dir: PathBuf,
    timeout: Duration,
}

impl<C: SessionConnector> DeviceTask<C> {
    pub fn new(connector: C, template: DeviceTemplate) -> Self {
        Self {
            connector,
            template: Arc::new(template),
            config_dir: PathBuf::from("."),
            timeout: RunConfig::DEFAULT_TASK_TIMEOUT,
        }
    }

    /// Build a task from the run configuration.
    pub fn from_config(connector: C, config: &RunConfig) -> Self {
        Self::new(connector, config.template.clone())
            .with_config_dir(&config.config_dir)
            .with_timeout(config.task_timeout)
    }

    /// Directory the `<hostname>.conf` files are read from.
    pub fn with_config_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Deadline for connecting, identifying and pushing.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Deploy to `address`. Never fails; failures become a failed result.
    pub async fn run(&self, address: &str) -> TaskResult {
        let outcome = self.deploy(address).await;
        TaskResult::from_outcome(address, outcome)
    }

    async fn deploy(&self, address: &str) -> Result<TaskResult, DeployError> {
        let deadline = Instant::now() + self.timeout;
        let params = self.template.for_host(address);

        let mut session = tokio::time::timeout_at(deadline, self.connector.connect(params))
            .await
            .map_err(|_| DeployError::Timeout(self.timeout))?
            .map_err(DeployError::Session)?;

        debug!("{address}: session open");

        let outcome = tokio::time::timeout_at(deadline, self.configure(&mut session, address))
            .await
            .unwrap_or(Err(DeployError::Timeout(self.timeout)));

        // Dropping the session on timeout still tears the connection down.
        match tokio::time::timeout(CLOSE_TIMEOUT, session.close()).await {
            Ok(Ok(())) => debug!("{address}: session closed"),
            Ok(Err(e)) => warn!("{address}: error closing session: {e}"),
            Err(_) => warn!("{address}: session close timed out"),
        }

        outcome
    }

    async fn configure(
        &self,
        session: &mut C::Session,
        address: &str,
    ) -> Result<TaskResult, DeployError> {
        let version = session
            .send_command(IDENTIFY_COMMAND)
            .await
            .map_err(DeployError::Session)?;

        let fields = identify(&version)?;
        let hostname = fields.hostname();
        info!("Deploying configs on {hostname}");
        debug!("{address}: identified as {} ({})", hostname, fields.family());

        let path = self.config_dir.join(config_file_name(hostname));
        let output = session
            .send_config_from_file(&path)
            .await
            .map_err(DeployError::ConfigPush)?;

        Ok(TaskResult::deployed(address, hostname, &output))
    }
}
