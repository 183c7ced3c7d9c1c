//! Lookup of built-in platforms by device type name.

use super::definition::PlatformDefinition;
use super::vendors::{cisco, juniper};
use crate::error::PlatformError;

/// Device type names accepted by [`lookup`].
pub const DEVICE_TYPES: &[&str] = &["cisco_ios", "cisco_ios_xe", "cisco_nxos", "juniper_junos"];

/// Alternate names, as `(alias, device type)`.
pub const DEVICE_TYPE_ALIASES: &[(&str, &str)] =
    &[("cisco_xe", "cisco_ios_xe"), ("juniper", "juniper_junos")];

/// Build the platform definition for a device type or one of its aliases.
pub fn lookup(device_type: &str) -> Result<PlatformDefinition, PlatformError> {
    let canonical = DEVICE_TYPE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == device_type)
        .map_or(device_type, |(_, name)| *name);

    match canonical {
        "cisco_ios" => cisco::ios(),
        "cisco_ios_xe" => cisco::ios_xe(),
        "cisco_nxos" => cisco::nxos(),
        "juniper_junos" => juniper::platform(),
        other => Err(PlatformError::UnknownPlatform {
            name: other.to_string(),
        }),
    }
}
