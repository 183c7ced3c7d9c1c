//! SSH transport layer wrapping russh.
//!
//! Connection setup, password authentication, host key checks and
//! PTY shell channel creation.

pub mod config;
mod ssh;

pub use config::{HostKeyVerification, SshConfig};
pub use ssh::SshTransport;
