//! # fleetpush
//!
//! Push per-device configuration files to a fleet of network devices over
//! SSH, in parallel, and keep a transcript of every device.
//!
//! For each inventory address a task logs in, runs `show version`,
//! identifies the hostname from the banner, pushes `<hostname>.conf` in
//! configuration mode and logs out. Failures never stop the batch: every
//! address produces exactly one [`TaskResult`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fleetpush::{DeviceTask, DeviceTemplate, Orchestrator, OutputWriter, SshConnector};
//! use fleetpush::config::est;
//!
//! # async fn example() -> Result<(), fleetpush::Error> {
//! let template = DeviceTemplate::new("admin", "secret");
//! let task = DeviceTask::new(SshConnector::default(), template);
//! let orchestrator = Orchestrator::new(task).with_max_concurrency(20);
//!
//! let devices = vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()];
//! let writer = OutputWriter::new(".", est());
//! let results = orchestrator.deploy(&devices, &writer).await?;
//! assert_eq!(results.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod identify;
pub mod inventory;
pub mod orchestrator;
pub mod output;
pub mod platform;
pub mod session;
pub mod task;
pub mod transport;

pub use config::{DeviceTemplate, RunConfig};
pub use error::{DeployError, Error, IdentifyError};
pub use identify::{DeviceFamily, HostnameFields, identify};
pub use inventory::Inventory;
pub use orchestrator::Orchestrator;
pub use output::OutputWriter;
pub use platform::PlatformDefinition;
pub use session::{ConnectionParameters, RemoteSession, SessionConnector, SshConnector, SshSession};
pub use task::{DeviceTask, TaskResult};
pub use transport::{HostKeyVerification, SshConfig};
