//! Device inventory loading.
//!
//! The inventory is a YAML document with an ordered `devices` list:
//!
//! ```yaml
//! devices:
//!   - 10.0.0.1
//!   - core-sw1.lab
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{InventoryError, Result};

/// Ordered list of device addresses to deploy to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Inventory {
    pub devices: Vec<String>,
}

impl Inventory {
    /// Read and parse an inventory file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Parse an inventory document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let inventory = serde_yaml::from_str(text).map_err(InventoryError::Parse)?;
        Ok(inventory)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
