//! Placement request files.
//!
//! A request captures one job's placement inputs in TOML so a plan can be
//! computed offline:
//!
//! ```toml
//! [job]
//! name = "web"
//! deployment = "prod"
//! instances = 3
//!
//! [[zones]]
//! name = "z1"
//!
//! [[existing]]
//! id = "web-0"
//! index = 0
//! zone = "z1"
//! disks = [{ cid = "disk-0", active = true }]
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::types::{InstanceState, PersistentDisk};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub job: JobConfig,
    /// Ordered zone list. Empty or absent means unzoned placement.
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
    #[serde(default)]
    pub existing: Vec<ExistingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    #[serde(default)]
    pub deployment: String,
    /// Desired instance count.
    pub instances: u32,
    #[serde(default)]
    pub state: InstanceState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub name: String,
    #[serde(default)]
    pub cloud_properties: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingConfig {
    pub id: String,
    pub index: u32,
    pub zone: Option<String>,
    #[serde(default)]
    pub disks: Vec<PersistentDisk>,
}

impl PlacementRequest {
    pub fn from_file(path: &Path) -> PlanResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> PlanResult<Self> {
        let request: PlacementRequest = toml::from_str(content)?;
        request.validate()?;
        Ok(request)
    }

    /// Reject zone names and instance ids that appear twice.
    pub fn validate(&self) -> PlanResult<()> {
        let mut zones = HashSet::new();
        for zone in &self.zones {
            if !zones.insert(zone.name.as_str()) {
                return Err(PlanError::DuplicateZone(zone.name.clone()));
            }
        }

        let mut ids = HashSet::new();
        for instance in &self.existing {
            if !ids.insert(instance.id.as_str()) {
                return Err(PlanError::DuplicateInstance(instance.id.clone()));
            }
        }

        Ok(())
    }
}
