//! Platform definitions for multi-vendor support.
//!
//! Each platform describes prompt patterns, privilege escalation, paging
//! commands and how to enter and leave configuration mode.

mod definition;
mod registry;
pub mod vendors;

pub use definition::PlatformDefinition;
pub use registry::{DEVICE_TYPE_ALIASES, DEVICE_TYPES, lookup};
