//! Run configuration shared by every device task.

use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use secrecy::SecretString;

use crate::session::ConnectionParameters;

/// Credentials and device type shared by the whole fleet.
///
/// Read-only once built; each task derives its own
/// [`ConnectionParameters`] with [`for_host`](DeviceTemplate::for_host).
#[derive(Debug, Clone)]
pub struct DeviceTemplate {
    pub device_type: String,
    pub username: String,
    pub password: SecretString,
    pub port: u16,
}

impl DeviceTemplate {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            device_type: "cisco_ios".to_string(),
            username: username.into(),
            password: SecretString::from(password.into()),
            port: 22,
        }
    }

    pub fn with_device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = device_type.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Connection parameters for one device.
    pub fn for_host(&self, host: impl Into<String>) -> ConnectionParameters {
        ConnectionParameters {
            device_type: self.device_type.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            host: host.into(),
            port: self.port,
        }
    }
}

/// Settings for one deployment run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub template: DeviceTemplate,

    /// Directory holding `<hostname>.conf` files.
    pub config_dir: PathBuf,

    /// Directory the transcripts are written to.
    pub log_dir: PathBuf,

    /// Upper bound on devices worked on at once.
    pub max_concurrency: usize,

    /// Overall deadline for one device, connect to config push.
    pub task_timeout: Duration,

    /// Offset used for log file timestamps.
    pub utc_offset: FixedOffset,
}

impl RunConfig {
    pub const DEFAULT_MAX_CONCURRENCY: usize = 100;
    pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(300);

    pub fn new(template: DeviceTemplate) -> Self {
        Self {
            template,
            config_dir: PathBuf::from("."),
            log_dir: PathBuf::from("."),
            max_concurrency: Self::DEFAULT_MAX_CONCURRENCY,
            task_timeout: Self::DEFAULT_TASK_TIMEOUT,
            utc_offset: est(),
        }
    }
}

/// Fixed UTC-05:00, the zone the log timestamps have always used.
pub fn est() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).expect("UTC-05:00 is in range")
}
