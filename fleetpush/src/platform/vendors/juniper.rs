//! Juniper Junos platform definition.
//!
//! # Prompt Examples
//!
//! ```text
//! user@router>              # operational mode
//! [edit]
//! user@router#              # configuration mode
//! {master:0}
//! user@router>              # with routing-engine banner
//! ```

use crate::error::PlatformError;
use crate::platform::PlatformDefinition;

/// Create the Juniper Junos platform definition.
///
/// Config pushes are committed on the way out of configuration mode.
pub fn platform() -> Result<PlatformDefinition, PlatformError> {
    Ok(PlatformDefinition::new(
        "juniper_junos",
        &[r"^(?:\{[^}]+\}\s*)?[\w.\-@]+[>#%]"],
    )?
    .with_config_enter("configure")
    .with_config_exit("commit and-quit")
    .with_on_open_command("set cli screen-length 0")
    .with_on_open_command("set cli screen-width 511"))
}
