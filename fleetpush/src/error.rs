//! Error types for fleetpush.
//!
//! Session plumbing uses the layered [`Error`] enum. Failures inside a single
//! device deployment are classified as a [`DeployError`] before being folded
//! into a [`TaskResult`](crate::task::TaskResult).

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for session, inventory and log file operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Session-level errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Platform/vendor errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Inventory loading errors
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Transcript log errors
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// The server presented a key that differs from known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Strict checking is on and the host is not in known_hosts
    #[error("Host key for {host}:{port} is unknown")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel layer errors (prompt matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Prompt pattern not seen before the deadline
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),
}

/// Session layer errors (command execution, config push).
#[derive(Error, Debug)]
pub enum SessionError {
    /// Failed to reach privileged exec mode
    #[error("Failed to acquire privilege level '{target}'")]
    PrivilegeAcquisitionFailed { target: String },

    /// Configuration file could not be read
    #[error("Cannot read config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Platform/vendor definition errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// No platform is registered for the device type
    #[error("Unknown device type '{name}'")]
    UnknownPlatform { name: String },

    /// Invalid platform definition
    #[error("Invalid platform definition: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Inventory file errors.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// The inventory file could not be read
    #[error("Cannot read inventory {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The inventory document is not valid YAML or lacks `devices`
    #[error("Malformed inventory: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// A transcript could not be written to its log file.
#[derive(Error, Debug)]
#[error("Cannot write {path}: {source}")]
pub struct OutputError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Device identification errors raised by [`identify`](crate::identify::identify).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifyError {
    /// None of the known family markers appear in the version text
    #[error("Unrecognized device family")]
    UnrecognizedDeviceFamily,

    /// The family was recognized but its hostname pattern did not match
    #[error("Hostname pattern for {family} did not match")]
    HostnamePatternMismatch { family: crate::identify::DeviceFamily },
}

/// Everything that can go wrong while deploying to one device.
#[derive(Error, Debug)]
pub enum DeployError {
    /// Device output did not match any known banner shape
    #[error("Identification failed: {0}")]
    Identify(#[from] IdentifyError),

    /// Connection, authentication or transport failure
    #[error("Session failed: {0}")]
    Session(#[source] Error),

    /// Config file missing/unreadable or the push itself failed
    #[error("Config push failed: {0}")]
    ConfigPush(#[source] Error),

    /// The device did not finish within the task deadline
    #[error("Deployment timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type alias using fleetpush's Error.
pub type Result<T> = std::result::Result<T, Error>;
