//! Builder options

use serde::{Deserialize, Serialize};

/// Defaults used for every generated VM resource.
///
/// Resource types and action methods are part of the engine contract and are
/// not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderOptions {
    /// Network every instance's single interface is bound to.
    pub network: String,
    /// Device name of the boot disk.
    pub boot_disk_device_name: String,
    /// Name of the ephemeral external address config.
    pub external_access_config_name: String,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            network: "global/networks/default".to_string(),
            boot_disk_device_name: "boot".to_string(),
            external_access_config_name: "External NAT".to_string(),
        }
    }
}
