//! Placement entry point — runs balancer, matcher and indexer for a job.
//!
//! Given the job's zones, its desired slots and its existing instances,
//! [`place`] decides:
//! 1. How many instances each zone should run (balancer)
//! 2. Which existing instances each zone keeps or retires (matcher)
//! 3. Which indices new instances receive (indexer)

use std::collections::BTreeSet;
use std::vec;

use tracing::{debug, info, warn};

use crate::balancer::{self, ZoneLoad};
use crate::indexer;
use crate::matcher;
use crate::types::{
    AvailabilityZone, DesiredInstance, ExistingInstance, NewInstance, PlacementResult,
    PlacementWarning, ReusedInstance, ZoneRef,
};

/// Compute the placement for one job.
///
/// An empty `zones` list selects unzoned placement. Existing instances
/// outside every bucket (a zone not in `zones`, or unzoned instances when
/// zones are given) are always retired. Never fails; surplus pinned
/// instances are reported through [`PlacementResult::warnings`].
pub fn place(
    zones: &[AvailabilityZone],
    desired: Vec<DesiredInstance>,
    existing: Vec<ExistingInstance>,
) -> PlacementResult {
    let total = desired.len();
    let job = desired.first().map(|d| d.job.clone());
    let used: BTreeSet<u32> = existing.iter().map(|i| i.index).collect();

    let mut plan = PlanBuilder::new(desired);
    if zones.is_empty() {
        place_unzoned(&mut plan, total, existing);
    } else {
        place_zoned(&mut plan, zones, total, used, existing);
    }
    let result = plan.finish();

    info!(
        job = ?job,
        zones = zones.len(),
        desired = total,
        reused = result.reused.len(),
        create = result.to_create.len(),
        retire = result.to_retire.len(),
        "computed placement"
    );

    result
}

fn place_zoned(
    plan: &mut PlanBuilder,
    zones: &[AvailabilityZone],
    total: usize,
    used: BTreeSet<u32>,
    existing: Vec<ExistingInstance>,
) {
    let mut buckets: Vec<Vec<ExistingInstance>> = vec![Vec::new(); zones.len()];
    for instance in existing {
        match zones.iter().position(|z| instance.zone.is_in(z)) {
            Some(pos) => buckets[pos].push(instance),
            None => {
                debug!(
                    instance = %instance.id,
                    zone = %instance.zone,
                    "instance outside deployment zones"
                );
                plan.retire(instance);
            }
        }
    }

    let loads: Vec<ZoneLoad> = buckets
        .iter()
        .map(|bucket| ZoneLoad {
            existing: bucket.len(),
            pinned: bucket.iter().filter(|i| i.is_pinned()).count(),
        })
        .collect();
    let balanced = balancer::balance(total, &loads);

    for &pos in &balanced.over_pinned {
        plan.warn(PlacementWarning::OverPinned {
            zone: zones[pos].zone_ref(),
            pinned: loads[pos].pinned,
            target: balanced.targets[pos],
        });
    }

    let mut shortfalls = Vec::with_capacity(zones.len());
    for ((zone, bucket), &target) in zones.iter().zip(buckets).zip(&balanced.targets) {
        let matched = matcher::match_zone(target, bucket);
        debug!(
            zone = %zone.name,
            zone_target = target,
            kept = matched.kept.len(),
            retired = matched.retired.len(),
            shortfall = matched.shortfall,
            "matched zone"
        );

        for instance in matched.kept {
            plan.reuse(instance, None);
        }
        for instance in matched.retired {
            plan.retire(instance);
        }
        shortfalls.push((zone.zone_ref(), matched.shortfall));
    }

    for (zone, index) in indexer::allocate(indexer::free_indices(used), &shortfalls) {
        plan.create(zone, index);
    }
}

fn place_unzoned(plan: &mut PlanBuilder, total: usize, existing: Vec<ExistingInstance>) {
    let (candidates, zoned): (Vec<_>, Vec<_>) = existing
        .into_iter()
        .partition(|i| i.zone == ZoneRef::Unzoned);

    for instance in zoned {
        debug!(
            instance = %instance.id,
            zone = %instance.zone,
            "zoned instance in unzoned placement"
        );
        plan.retire(instance);
    }

    let pinned = candidates.iter().filter(|i| i.is_pinned()).count();
    if pinned > total {
        warn!(pinned, zone_target = total, "pinned instances exceed desired count");
        plan.warn(PlacementWarning::OverPinned {
            zone: ZoneRef::Unzoned,
            pinned,
            target: total,
        });
    }

    let matched = matcher::match_zone(total, candidates);
    debug!(
        zone_target = total,
        kept = matched.kept.len(),
        retired = matched.retired.len(),
        shortfall = matched.shortfall,
        "matched unzoned instances"
    );

    for instance in matched.retired {
        plan.retire(instance);
    }

    let renumbered = indexer::renumber(matched.kept);
    let next_free = u32::try_from(renumbered.len()).unwrap_or(u32::MAX);
    for (instance, new_index) in renumbered {
        if let Some(index) = new_index {
            debug!(instance = %instance.id, from = instance.index, to = index, "renumbered instance");
        }
        plan.reuse(instance, new_index);
    }

    let shortfall = [(ZoneRef::Unzoned, matched.shortfall)];
    for (zone, index) in indexer::allocate(next_free..=u32::MAX, &shortfall) {
        plan.create(zone, index);
    }
}

/// Accumulates decisions, handing out desired slots in input order.
struct PlanBuilder {
    slots: vec::IntoIter<DesiredInstance>,
    result: PlacementResult,
}

impl PlanBuilder {
    fn new(desired: Vec<DesiredInstance>) -> Self {
        Self {
            slots: desired.into_iter(),
            result: PlacementResult::default(),
        }
    }

    fn reuse(&mut self, existing: ExistingInstance, new_index: Option<u32>) {
        match self.slots.next() {
            Some(desired) => self.result.reused.push(ReusedInstance {
                existing,
                desired,
                new_index,
            }),
            None => {
                warn!(instance = %existing.id, "no desired slot left for kept instance, retiring");
                self.retire(existing);
            }
        }
    }

    fn create(&mut self, zone: ZoneRef, index: u32) {
        match self.slots.next() {
            Some(desired) => self.result.to_create.push(NewInstance {
                desired,
                zone,
                index,
            }),
            None => warn!(%zone, index, "no desired slot left for new instance, skipping"),
        }
    }

    fn retire(&mut self, existing: ExistingInstance) {
        self.result.to_retire.push(existing);
    }

    fn warn(&mut self, warning: PlacementWarning) {
        self.result.warnings.push(warning);
    }

    fn finish(self) -> PlacementResult {
        debug_assert_eq!(self.slots.len(), 0, "every desired slot is placed");
        self.result
    }
}
