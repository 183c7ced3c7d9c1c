//! Cisco IOS, IOS XE and NX-OS platform definitions.
//!
//! Prompt patterns are adapted from scrapli's Cisco drivers.
//!
//! # Prompt Examples
//!
//! ```text
//! R1>                      # user exec
//! R1#                      # privileged exec
//! R1(config)#              # configuration
//! R1(config-if)#           # configuration sub-mode
//! ```

use crate::error::PlatformError;
use crate::platform::PlatformDefinition;

const EXEC_PROMPT: &str = r"^[\w.\-@()/: ]{1,63}>";
const PRIVILEGED_PROMPT: &str = r"^[\w.\-@()/: ]{1,63}#";
const PASSWORD_PROMPT: &str = r"(?i)^password:";

/// Cisco IOS (classic and IOSv).
pub fn ios() -> Result<PlatformDefinition, PlatformError> {
    ios_family("cisco_ios")
}

/// Cisco IOS XE. The CLI is identical to IOS for our purposes.
pub fn ios_xe() -> Result<PlatformDefinition, PlatformError> {
    ios_family("cisco_ios_xe")
}

fn ios_family(name: &str) -> Result<PlatformDefinition, PlatformError> {
    Ok(PlatformDefinition::new(name, &[EXEC_PROMPT, PRIVILEGED_PROMPT])?
        .with_escalation(EXEC_PROMPT, "enable", PASSWORD_PROMPT)?
        .with_config_enter("configure terminal")
        .with_config_exit("end")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511"))
}

/// Cisco NX-OS. Users land in privileged mode, so there is no escalation.
pub fn nxos() -> Result<PlatformDefinition, PlatformError> {
    Ok(
        PlatformDefinition::new("cisco_nxos", &[EXEC_PROMPT, PRIVILEGED_PROMPT])?
            .with_config_enter("configure terminal")
            .with_config_exit("end")
            .with_on_open_command("terminal length 0")
            .with_on_open_command("terminal width 511"),
    )
}
