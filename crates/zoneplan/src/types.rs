//! Domain types for zone placement.
//!
//! These types describe the inputs to [`place`](crate::place) (zones,
//! desired slots, existing instances) and its decision. All types are
//! serializable so a plan can be printed or handed to another process.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of an availability zone, unique within a deployment.
pub type ZoneName = String;

/// Identifier of an existing instance record.
pub type InstanceId = String;

// ── Zones ──────────────────────────────────────────────────────────

/// A named placement domain instances can be confined to.
///
/// Equality is by name only; `cloud_properties` are carried for the
/// caller and play no part in placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityZone {
    pub name: ZoneName,
    #[serde(default)]
    pub cloud_properties: BTreeMap<String, serde_json::Value>,
}

impl AvailabilityZone {
    pub fn new(name: impl Into<ZoneName>) -> Self {
        Self {
            name: name.into(),
            cloud_properties: BTreeMap::new(),
        }
    }

    /// The [`ZoneRef`] instances placed in this zone carry.
    pub fn zone_ref(&self) -> ZoneRef {
        ZoneRef::Zone(self.name.clone())
    }
}

impl PartialEq for AvailabilityZone {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for AvailabilityZone {}

/// Where an instance lives: nowhere in particular, or a named zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneRef {
    Unzoned,
    Zone(ZoneName),
}

impl ZoneRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            ZoneRef::Unzoned => None,
            ZoneRef::Zone(name) => Some(name),
        }
    }

    pub fn is_in(&self, zone: &AvailabilityZone) -> bool {
        self.name() == Some(zone.name.as_str())
    }
}

impl From<Option<ZoneName>> for ZoneRef {
    fn from(name: Option<ZoneName>) -> Self {
        name.map_or(ZoneRef::Unzoned, ZoneRef::Zone)
    }
}

impl fmt::Display for ZoneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneRef::Unzoned => f.write_str("<unzoned>"),
            ZoneRef::Zone(name) => f.write_str(name),
        }
    }
}

// ── Instances ──────────────────────────────────────────────────────

/// Lifecycle state the caller wants applied to an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    #[default]
    Started,
    Stopped,
}

/// One unit of "this job needs one more running instance".
///
/// Slots are fungible: any slot may pair with any kept instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredInstance {
    pub job: String,
    pub deployment: String,
    pub state: InstanceState,
}

impl DesiredInstance {
    pub fn new(job: impl Into<String>, deployment: impl Into<String>, state: InstanceState) -> Self {
        Self {
            job: job.into(),
            deployment: deployment.into(),
            state,
        }
    }
}

/// A persistent disk attached to an existing instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentDisk {
    /// Cloud identifier of the disk.
    pub cid: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// A running instance already under management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingInstance {
    pub id: InstanceId,
    /// Stable numeric identity within the job. Legacy data may repeat it.
    pub index: u32,
    pub zone: ZoneRef,
    #[serde(default)]
    pub disks: Vec<PersistentDisk>,
}

impl ExistingInstance {
    pub fn new(id: impl Into<InstanceId>, index: u32, zone: ZoneRef) -> Self {
        Self {
            id: id.into(),
            index,
            zone,
            disks: Vec::new(),
        }
    }

    pub fn with_disk(mut self, cid: impl Into<String>, active: bool) -> Self {
        self.disks.push(PersistentDisk {
            cid: cid.into(),
            active,
        });
        self
    }

    /// Pinned instances carry persistent storage and are never relocated.
    pub fn is_pinned(&self) -> bool {
        !self.disks.is_empty()
    }

    pub fn has_active_disk(&self) -> bool {
        self.disks.iter().any(|d| d.active)
    }
}

// ── Result ─────────────────────────────────────────────────────────

/// An existing instance kept to satisfy a desired slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReusedInstance {
    pub existing: ExistingInstance,
    pub desired: DesiredInstance,
    /// Set when unzoned renumbering changed the instance's index. The
    /// caller must persist it.
    pub new_index: Option<u32>,
}

impl ReusedInstance {
    /// Index the instance carries after this placement.
    pub fn index(&self) -> u32 {
        self.new_index.unwrap_or(self.existing.index)
    }
}

/// A desired slot that needs a freshly provisioned instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInstance {
    pub desired: DesiredInstance,
    pub zone: ZoneRef,
    pub index: u32,
}

/// Conditions the caller should know about; placement still completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementWarning {
    /// More pinned instances live in `zone` than its target allows, and no
    /// other zone could give up capacity. Surplus pinned instances (and
    /// their disks) are retired.
    OverPinned {
        zone: ZoneRef,
        pinned: usize,
        target: usize,
    },
}

impl fmt::Display for PlacementWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementWarning::OverPinned {
                zone,
                pinned,
                target,
            } => write!(
                f,
                "zone {zone} holds {pinned} instances with persistent disks but its target is {target}"
            ),
        }
    }
}

/// The decision for one job.
///
/// Every desired slot appears once across `reused` and `to_create`; every
/// existing instance appears once across `reused` and `to_retire`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementResult {
    pub reused: Vec<ReusedInstance>,
    pub to_create: Vec<NewInstance>,
    pub to_retire: Vec<ExistingInstance>,
    pub warnings: Vec<PlacementWarning>,
}

impl PlacementResult {
    /// Reused instances whose index must be rewritten by the caller.
    pub fn reindexed(&self) -> impl Iterator<Item = (&ExistingInstance, u32)> {
        self.reused
            .iter()
            .filter_map(|r| r.new_index.map(|idx| (&r.existing, idx)))
    }

    /// True when nothing needs provisioning, retiring, or renumbering.
    pub fn is_converged(&self) -> bool {
        self.to_create.is_empty() && self.to_retire.is_empty() && self.reindexed().next().is_none()
    }

    pub fn is_over_pinned(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, PlacementWarning::OverPinned { .. }))
    }
}
