//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use clap::Parser;
use clap::builder::{PossibleValue, PossibleValuesParser};

use fleetpush::platform::{DEVICE_TYPE_ALIASES, DEVICE_TYPES};
use fleetpush::{DeviceTemplate, HostKeyVerification, RunConfig, SshConnector};

/// Push <hostname>.conf to every device in the inventory.
#[derive(Debug, Parser)]
#[command(name = "fleetpush", version, about)]
pub struct Cli {
    /// YAML inventory with a top-level `devices` list
    #[arg(short, long, default_value = "devices.yml")]
    pub inventory: PathBuf,

    /// Directory holding the per-device .conf files
    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,

    /// Directory the transcript logs are written to
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,

    /// Login username
    #[arg(short, long, env = "USER_NAME")]
    pub username: String,

    /// Login (and enable) password
    #[arg(short, long, env = "PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Device type of the fleet
    #[arg(long, default_value = "cisco_ios", value_parser = device_type_parser())]
    pub device_type: String,

    /// SSH port
    #[arg(long, default_value_t = 22)]
    pub port: u16,

    /// Devices worked on at once
    #[arg(long, default_value_t = RunConfig::DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    /// Connect and per-command timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Overall deadline per device, in seconds
    #[arg(long, default_value_t = RunConfig::DEFAULT_TASK_TIMEOUT.as_secs())]
    pub task_timeout_secs: u64,

    /// UTC offset of log file timestamps, in hours
    #[arg(long, default_value_t = -5, allow_hyphen_values = true,
          value_parser = clap::value_parser!(i32).range(-23..=23))]
    pub utc_offset_hours: i32,

    /// Host key checking mode
    #[arg(long, value_enum, default_value_t = HostKeyVerification::AcceptNew)]
    pub host_key_checking: HostKeyVerification,

    /// known_hosts file, ~/.ssh/known_hosts when omitted
    #[arg(long)]
    pub known_hosts: Option<PathBuf>,
}

/// Known device types, with their aliases accepted but not listed in help.
fn device_type_parser() -> PossibleValuesParser {
    DEVICE_TYPES
        .iter()
        .map(|&name| {
            DEVICE_TYPE_ALIASES
                .iter()
                .filter(|(_, target)| *target == name)
                .fold(PossibleValue::new(name), |value, (alias, _)| value.alias(*alias))
        })
        .into()
}

impl Cli {
    pub fn run_config(&self) -> RunConfig {
        let template = DeviceTemplate::new(&self.username, &self.password)
            .with_device_type(&self.device_type)
            .with_port(self.port);

        let mut config = RunConfig::new(template);
        config.config_dir = self.config_dir.clone();
        config.log_dir = self.log_dir.clone();
        config.max_concurrency = self.max_concurrency;
        config.task_timeout = Duration::from_secs(self.task_timeout_secs);
        if let Some(offset) = FixedOffset::east_opt(self.utc_offset_hours * 3600) {
            config.utc_offset = offset;
        }
        config
    }

    pub fn connector(&self) -> SshConnector {
        SshConnector {
            timeout: Duration::from_secs(self.timeout_secs),
            host_key_verification: self.host_key_checking,
            known_hosts_path: self.known_hosts.clone(),
        }
    }
}
