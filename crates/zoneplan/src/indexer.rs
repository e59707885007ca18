//! Index allocation — stable numeric identities for instances.
//!
//! New instances continue after the highest index seen among the job's
//! existing instances. Zones short of instances take turns, in zone order,
//! one index per turn.
//!
//! Unzoned placements also renumber the kept instances to `0..kept`,
//! which repairs legacy data where several instances share an index.

use std::collections::BTreeSet;

use crate::types::{ExistingInstance, ZoneRef};

/// Indices free for new instances, in the order they are handed out.
///
/// Everything above the highest used index comes first. Only once that
/// runs out at `u32::MAX` are unused indices below it reused, lowest first.
pub fn free_indices(used: BTreeSet<u32>) -> impl Iterator<Item = u32> {
    let max = used.last().copied();
    let above = match max {
        None => Some(0..=u32::MAX),
        Some(max) => max.checked_add(1).map(|start| start..=u32::MAX),
    };
    let below = (0..max.unwrap_or(0)).filter(move |index| !used.contains(index));

    above.into_iter().flatten().chain(below)
}

/// Assign indices from `free` to new instances.
///
/// `shortfalls` lists, in zone order, how many new instances each zone
/// needs. Each pass hands one index to every zone still short.
pub fn allocate(
    free: impl Iterator<Item = u32>,
    shortfalls: &[(ZoneRef, usize)],
) -> Vec<(ZoneRef, u32)> {
    let passes = shortfalls.iter().map(|(_, n)| *n).max().unwrap_or(0);

    (0..passes)
        .flat_map(|pass| {
            shortfalls
                .iter()
                .filter(move |(_, needed)| *needed > pass)
                .map(|(zone, _)| zone)
        })
        .zip(free)
        .map(|(zone, index)| (zone.clone(), index))
        .collect()
}

/// Renumber `kept` to `0..kept.len()` in ascending order of current index.
///
/// Ties keep their input order. Each instance is paired with its new
/// index when that differs from the current one.
pub fn renumber(mut kept: Vec<ExistingInstance>) -> Vec<(ExistingInstance, Option<u32>)> {
    kept.sort_by_key(|i| i.index);
    kept.into_iter()
        .zip(0u32..=u32::MAX)
        .map(|(instance, index)| {
            let changed = (instance.index != index).then_some(index);
            (instance, changed)
        })
        .collect()
}
