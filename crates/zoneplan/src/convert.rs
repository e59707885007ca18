//! Type conversions between request file types and placement types.
//!
//! Bridges `config::{ZoneConfig, JobConfig, ExistingConfig}` to the
//! placement inputs `AvailabilityZone`, `DesiredInstance` and
//! `ExistingInstance`.

use crate::config::{ExistingConfig, JobConfig, PlacementRequest, ZoneConfig};
use crate::types::{AvailabilityZone, DesiredInstance, ExistingInstance, ZoneRef};

/// Everything [`place`](crate::place) needs for one job.
#[derive(Debug, Clone)]
pub struct PlacementInputs {
    pub zones: Vec<AvailabilityZone>,
    pub desired: Vec<DesiredInstance>,
    pub existing: Vec<ExistingInstance>,
}

/// Convert a [`ZoneConfig`] to an [`AvailabilityZone`].
pub fn zone_config_to_zone(zone: &ZoneConfig) -> AvailabilityZone {
    AvailabilityZone {
        name: zone.name.clone(),
        cloud_properties: zone.cloud_properties.clone(),
    }
}

/// Expand a [`JobConfig`] into its desired slots, one per instance.
pub fn job_to_desired(job: &JobConfig) -> Vec<DesiredInstance> {
    (0..job.instances)
        .map(|_| DesiredInstance::new(job.name.clone(), job.deployment.clone(), job.state))
        .collect()
}

/// Convert an [`ExistingConfig`] to an [`ExistingInstance`].
///
/// A missing zone maps to [`ZoneRef::Unzoned`].
pub fn existing_config_to_instance(existing: &ExistingConfig) -> ExistingInstance {
    ExistingInstance {
        id: existing.id.clone(),
        index: existing.index,
        zone: ZoneRef::from(existing.zone.clone()),
        disks: existing.disks.clone(),
    }
}

/// Convert a whole [`PlacementRequest`].
pub fn request_to_inputs(request: &PlacementRequest) -> PlacementInputs {
    PlacementInputs {
        zones: request.zones.iter().map(zone_config_to_zone).collect(),
        desired: job_to_desired(&request.job),
        existing: request
            .existing
            .iter()
            .map(existing_config_to_instance)
            .collect(),
    }
}
