//! Device identification from `show version` output.
//!
//! Vendors format the version banner differently, so the device family is
//! sniffed first and then a family-specific pattern pulls out the hostname.
//!
//! ```
//! use fleetpush::identify::identify;
//!
//! let text = "Cisco IOS Software, IOSv Software (VIOS-ADVENTERPRISEK9-M)\n\
//!             core-rtr1 uptime is 2 weeks, 3 days\n";
//! let fields = identify(text).unwrap();
//! assert_eq!(fields.hostname(), "core-rtr1");
//! ```

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use memchr::memmem;
use regex::Regex;

use crate::error::IdentifyError;

/// Command whose output identifies the device.
pub const IDENTIFY_COMMAND: &str = "show version";

/// Field name of the extracted hostname.
pub const HOSTNAME: &str = "hostname";

/// Firmware/platform classification that selects the hostname pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceFamily {
    IosXe,
    NxOs,
    C2960x,
    ViosL2,
    Vios,
    Junos,
    GenericIos,
}

/// Family markers in match order. Specific platforms come before generic
/// markers that their banners also contain.
///
/// The generic IOS marker skips the leading "Cisco " because normalized
/// output starts with the banner, and a marker at offset zero never counts.
const FAMILY_MARKERS: &[(&str, DeviceFamily)] = &[
    ("IOS XE", DeviceFamily::IosXe),
    ("NX-OS", DeviceFamily::NxOs),
    ("C2960X-UNIVERSALK9-M", DeviceFamily::C2960x),
    ("vios_l2-ADVENTERPRISEK9-M", DeviceFamily::ViosL2),
    ("VIOS-ADVENTERPRISEK9-M", DeviceFamily::Vios),
    ("Junos", DeviceFamily::Junos),
    ("IOS Software", DeviceFamily::GenericIos),
];

static NXOS_HOSTNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Device name:\s+(?P<hostname>\S+)").unwrap());

static JUNOS_HOSTNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Hostname:\s+(?P<hostname>\S+)").unwrap());

static IOS_HOSTNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?P<hostname>\S+)\s+uptime").unwrap());

impl DeviceFamily {
    /// Classify version text by the first marker it contains.
    ///
    /// A marker at offset zero does not count: real banners never start
    /// with the platform string.
    pub fn detect(text: &str) -> Option<Self> {
        FAMILY_MARKERS
            .iter()
            .find(|(marker, _)| {
                memmem::find(text.as_bytes(), marker.as_bytes()).is_some_and(|pos| pos > 0)
            })
            .map(|&(_, family)| family)
    }

    /// The pattern that captures `hostname` for this family.
    pub fn hostname_pattern(self) -> &'static Regex {
        match self {
            DeviceFamily::NxOs => &*NXOS_HOSTNAME,
            DeviceFamily::Junos => &*JUNOS_HOSTNAME,
            _ => &*IOS_HOSTNAME,
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceFamily::IosXe => "IOS-XE",
            DeviceFamily::NxOs => "NX-OS",
            DeviceFamily::C2960x => "C2960X",
            DeviceFamily::ViosL2 => "vIOS-L2",
            DeviceFamily::Vios => "vIOS",
            DeviceFamily::Junos => "Junos",
            DeviceFamily::GenericIos => "IOS",
        };
        f.write_str(name)
    }
}

/// Fields parsed out of the version text, keyed by capture group name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostnameFields {
    family: DeviceFamily,
    fields: IndexMap<String, String>,
}

impl HostnameFields {
    /// The family the text was classified as.
    pub fn family(&self) -> DeviceFamily {
        self.family
    }

    /// The extracted hostname. Always present on a successful parse.
    pub fn hostname(&self) -> &str {
        self.get(HOSTNAME).unwrap_or_default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Classify `text` and extract its named fields.
///
/// A hostname containing a path separator is treated as a mismatch, since it
/// names both the config file and the log file.
pub fn identify(text: &str) -> Result<HostnameFields, IdentifyError> {
    let family = DeviceFamily::detect(text).ok_or(IdentifyError::UnrecognizedDeviceFamily)?;
    let pattern = family.hostname_pattern();

    let captures = pattern
        .captures(text)
        .ok_or(IdentifyError::HostnamePatternMismatch { family })?;

    let fields = pattern
        .capture_names()
        .flatten()
        .filter_map(|name| {
            captures
                .name(name)
                .map(|m| (name.to_string(), m.as_str().to_string()))
        })
        .collect();

    let fields = HostnameFields { family, fields };
    if fields.hostname().contains(['/', '\\']) {
        return Err(IdentifyError::HostnamePatternMismatch { family });
    }

    Ok(fields)
}
