//! Zone balancing — how many instances each zone should run.
//!
//! Without persistent disks in play this is an even split of the desired
//! count, with remainder slots going to the zones that already hold the
//! most instances, so fewer instances have to move.
//!
//! Pinned instances put a floor under their zone's target. The remaining
//! zones share a common level, raised while everything still fits, and the
//! leftover slots go to the most populated of them. Because targets only
//! depend on the pinned floors and the ranking of existing counts,
//! balancing the placement it produced yields the same targets again.
//!
//! When pinned instances outnumber the desired count, targets are capped
//! at each zone's pinned count instead and spread as evenly as possible.
//! Targets always sum to the desired count.

use std::cmp::Ordering;

use tracing::warn;

/// Existing population of one zone, counted before matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneLoad {
    /// Existing instances currently in the zone.
    pub existing: usize,
    /// Of those, instances with persistent disks attached.
    pub pinned: usize,
}

/// Per-zone targets, positionally aligned with the zone list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneTargets {
    pub targets: Vec<usize>,
    /// Positions of zones whose pinned population exceeds their target.
    pub over_pinned: Vec<usize>,
}

/// Order in which zones receive leftover slots: most existing instances
/// first, earlier zone on ties.
pub fn remainder_priority(a: (usize, &ZoneLoad), b: (usize, &ZoneLoad)) -> Ordering {
    b.1.existing.cmp(&a.1.existing).then(a.0.cmp(&b.0))
}

/// Compute per-zone targets for `total` instances.
pub fn balance(total: usize, loads: &[ZoneLoad]) -> ZoneTargets {
    if loads.is_empty() {
        return ZoneTargets::default();
    }

    let pinned_total: usize = loads.iter().map(|l| l.pinned).sum();
    let targets = if pinned_total <= total {
        fill(total, loads, |load, level| load.pinned.max(level))
    } else {
        fill(total, loads, |load, level| load.pinned.min(level))
    };

    let over_pinned: Vec<usize> = loads
        .iter()
        .zip(&targets)
        .enumerate()
        .filter(|(_, (load, target))| load.pinned > **target)
        .map(|(pos, _)| pos)
        .collect();

    for &pos in &over_pinned {
        warn!(
            zone = pos,
            pinned = loads[pos].pinned,
            zone_target = targets[pos],
            "pinned instances exceed what the zone target can hold"
        );
    }

    ZoneTargets {
        targets,
        over_pinned,
    }
}

/// Raise a common level across zones while the total still fits.
///
/// `at_level` gives a zone's target at a level and grows by at most one
/// per level. Slots left over below the next level go to the zones that
/// would grow at it, by [`remainder_priority`].
fn fill(total: usize, loads: &[ZoneLoad], at_level: impl Fn(&ZoneLoad, usize) -> usize) -> Vec<usize> {
    let sum_at = |level: usize| loads.iter().map(|l| at_level(l, level)).sum::<usize>();

    let mut level = 0;
    while sum_at(level + 1) <= total {
        level += 1;
    }

    let mut targets: Vec<usize> = loads.iter().map(|l| at_level(l, level)).collect();
    let leftover = total - targets.iter().sum::<usize>();

    let mut growable: Vec<(usize, &ZoneLoad)> = loads
        .iter()
        .enumerate()
        .filter(|(_, l)| at_level(*l, level + 1) > at_level(*l, level))
        .collect();
    growable.sort_by(|a, b| remainder_priority(*a, *b));
    for (pos, _) in growable.into_iter().take(leftover) {
        targets[pos] += 1;
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(existing: usize, pinned: usize) -> ZoneLoad {
        ZoneLoad { existing, pinned }
    }

    fn targets(total: usize, loads: &[ZoneLoad]) -> Vec<usize> {
        balance(total, loads).targets
    }

    #[test]
    fn no_zones_no_targets() {
        let result = balance(3, &[]);
        assert!(result.targets.is_empty());
        assert!(result.over_pinned.is_empty());
    }

    #[test]
    fn even_split() {
        assert_eq!(targets(6, &[load(0, 0), load(0, 0), load(0, 0)]), vec![2, 2, 2]);
    }

    #[test]
    fn remainder_goes_to_earlier_zones_when_empty() {
        assert_eq!(targets(5, &[load(0, 0), load(0, 0), load(0, 0)]), vec![2, 2, 1]);
    }

    #[test]
    fn remainder_goes_to_most_populated_zone() {
        // z2 already holds two instances: it keeps the extra slot.
        assert_eq!(targets(4, &[load(1, 0), load(2, 0), load(0, 0)]), vec![1, 2, 1]);
    }

    #[test]
    fn remainder_ties_break_by_position() {
        assert_eq!(targets(5, &[load(1, 0), load(3, 0), load(3, 0)]), vec![1, 2, 2]);
        assert_eq!(targets(4, &[load(2, 0), load(0, 0), load(2, 0)]), vec![2, 1, 1]);
    }

    #[test]
    fn fewer_instances_than_zones() {
        assert_eq!(targets(1, &[load(0, 0), load(1, 0)]), vec![0, 1]);
    }

    #[test]
    fn pinned_zone_takes_from_empty_zone() {
        let result = balance(2, &[load(2, 2), load(0, 0)]);
        assert_eq!(result.targets, vec![2, 0]);
        assert!(result.over_pinned.is_empty());
    }

    #[test]
    fn pinning_lowers_least_populated_zone() {
        // z1 holds two of three slots; the last goes to z2, the most populated.
        assert_eq!(targets(3, &[load(2, 2), load(5, 0), load(1, 0)]), vec![2, 1, 0]);
    }

    #[test]
    fn lowered_zones_tie_break_by_position() {
        assert_eq!(targets(4, &[load(3, 3), load(0, 0), load(0, 0)]), vec![3, 1, 0]);
    }

    #[test]
    fn pinned_floor_holds_in_every_zone() {
        let result = balance(4, &[load(3, 3), load(1, 1), load(0, 0), load(0, 0)]);
        assert_eq!(result.targets, vec![3, 1, 0, 0]);
        assert!(result.over_pinned.is_empty());
    }

    #[test]
    fn several_pinned_zones_share_the_rest() {
        let result = balance(6, &[load(3, 3), load(3, 3), load(0, 0)]);
        assert_eq!(result.targets, vec![3, 3, 0]);
        assert!(result.over_pinned.is_empty());
    }

    #[test]
    fn pinned_zone_consumes_the_remainder_slot() {
        // z2 would get the extra slot by count alone; z1's disks claim it.
        let loads = [load(2, 2), load(3, 0), load(0, 0)];
        assert_eq!(targets(4, &loads), vec![2, 1, 1]);
    }

    #[test]
    fn balancing_the_result_is_stable() {
        let cases: [(usize, Vec<ZoneLoad>); 4] = [
            (4, vec![load(2, 2), load(3, 0), load(0, 0)]),
            (4, vec![load(3, 3), load(2, 0), load(0, 0)]),
            (7, vec![load(4, 1), load(0, 0), load(6, 3), load(1, 1)]),
            (5, vec![load(0, 0), load(2, 2), load(9, 0)]),
        ];

        for (total, loads) in cases {
            let first = targets(total, &loads);
            let applied: Vec<ZoneLoad> = loads
                .iter()
                .zip(&first)
                .map(|(l, &t)| load(t, l.pinned))
                .collect();
            assert_eq!(targets(total, &applied), first, "loads {loads:?}");
        }
    }

    #[test]
    fn over_pinned_keeps_total() {
        let result = balance(2, &[load(2, 2), load(2, 2)]);
        assert_eq!(result.targets, vec![1, 1]);
        assert_eq!(result.over_pinned, vec![0, 1]);
    }

    #[test]
    fn over_pinned_leaves_unpinned_zones_empty() {
        let result = balance(3, &[load(2, 2), load(2, 2), load(1, 0)]);
        assert_eq!(result.targets, vec![2, 1, 0]);
        assert_eq!(result.over_pinned, vec![1]);
    }

    #[test]
    fn single_zone_over_pinned() {
        let result = balance(1, &[load(2, 2)]);
        assert_eq!(result.targets, vec![1]);
        assert_eq!(result.over_pinned, vec![0]);
    }

    #[test]
    fn targets_sum_to_total() {
        for total in 0..12 {
            let loads = [load(3, 1), load(0, 0), load(5, 2), load(1, 1)];
            let result = balance(total, &loads);
            assert_eq!(result.targets.iter().sum::<usize>(), total, "total {total}");
        }
    }
}
