//! Zone matching — which of a zone's existing instances to keep.
//!
//! Instances without persistent disks (floating) are retired first,
//! highest index first. Pinned instances are only retired when the zone
//! still holds more than its target afterwards; those with an active disk
//! outrank those with only inactive disks, then lower index wins.

use std::cmp::Ordering;

use crate::types::ExistingInstance;

/// Keep/retire split for one zone bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneMatch {
    /// Kept instances, ascending by index.
    pub kept: Vec<ExistingInstance>,
    pub retired: Vec<ExistingInstance>,
    /// New instances the zone needs on top of `kept`.
    pub shortfall: usize,
}

/// Retirement order among floating instances: highest index first.
pub fn floating_retirement_order(a: &ExistingInstance, b: &ExistingInstance) -> Ordering {
    b.index.cmp(&a.index)
}

/// Keep order among pinned instances: active disk first, then lowest index.
pub fn pinned_keep_order(a: &ExistingInstance, b: &ExistingInstance) -> Ordering {
    b.has_active_disk()
        .cmp(&a.has_active_disk())
        .then(a.index.cmp(&b.index))
}

/// Split a zone's `candidates` against its `target` count.
///
/// Kept instances come out ascending by index; equal indices keep their
/// input order.
pub fn match_zone(target: usize, candidates: Vec<ExistingInstance>) -> ZoneMatch {
    let shortfall = target.saturating_sub(candidates.len());
    let mut excess = candidates.len().saturating_sub(target);

    let (mut pinned, mut floating): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .enumerate()
        .partition(|(_, i)| i.is_pinned());

    let mut retired = Vec::with_capacity(excess);

    if excess > 0 {
        floating.sort_by(|a, b| floating_retirement_order(&a.1, &b.1));
        let count = excess.min(floating.len());
        retired.extend(floating.drain(..count).map(|(_, i)| i));
        excess -= count;
    }

    if excess > 0 {
        pinned.sort_by(|a, b| pinned_keep_order(&a.1, &b.1));
        let keep = pinned.len().saturating_sub(excess);
        retired.extend(pinned.drain(keep..).map(|(_, i)| i));
    }

    let mut kept = pinned;
    kept.append(&mut floating);
    kept.sort_by_key(|(position, i)| (i.index, *position));

    ZoneMatch {
        kept: kept.into_iter().map(|(_, i)| i).collect(),
        retired,
        shortfall,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ZoneRef;

    fn inst(index: u32) -> ExistingInstance {
        ExistingInstance::new(format!("i-{index}"), index, ZoneRef::Zone("z1".to_string()))
    }

    fn indices(list: &[ExistingInstance]) -> Vec<u32> {
        list.iter().map(|i| i.index).collect()
    }

    #[test]
    fn exact_target_keeps_everything() {
        let m = match_zone(2, vec![inst(1), inst(0)]);
        assert_eq!(indices(&m.kept), vec![0, 1]);
        assert!(m.retired.is_empty());
        assert_eq!(m.shortfall, 0);
    }

    #[test]
    fn shortfall_keeps_everything() {
        let m = match_zone(5, vec![inst(0), inst(3).with_disk("d", false)]);
        assert_eq!(indices(&m.kept), vec![0, 3]);
        assert!(m.retired.is_empty());
        assert_eq!(m.shortfall, 3);
    }

    #[test]
    fn empty_zone_with_target() {
        let m = match_zone(2, Vec::new());
        assert!(m.kept.is_empty());
        assert_eq!(m.shortfall, 2);
    }

    #[test]
    fn floating_highest_index_retired_first() {
        let m = match_zone(1, vec![inst(1), inst(0), inst(2)]);
        assert_eq!(indices(&m.kept), vec![0]);
        assert_eq!(indices(&m.retired), vec![2, 1]);
    }

    #[test]
    fn floating_retired_before_pinned() {
        let m = match_zone(1, vec![inst(0), inst(1).with_disk("d1", false)]);
        assert_eq!(indices(&m.kept), vec![1]);
        assert_eq!(indices(&m.retired), vec![0]);
    }

    #[test]
    fn active_disk_outranks_inactive() {
        let m = match_zone(
            1,
            vec![inst(0).with_disk("d0", true), inst(1).with_disk("d1", false)],
        );
        assert_eq!(indices(&m.kept), vec![0]);
        assert_eq!(indices(&m.retired), vec![1]);

        // Activity wins even against a lower index.
        let m = match_zone(
            1,
            vec![inst(0).with_disk("d0", false), inst(1).with_disk("d1", true)],
        );
        assert_eq!(indices(&m.kept), vec![1]);
    }

    #[test]
    fn pinned_ties_keep_lower_index() {
        let m = match_zone(
            1,
            vec![inst(4).with_disk("d4", true), inst(2).with_disk("d2", true)],
        );
        assert_eq!(indices(&m.kept), vec![2]);
        assert_eq!(indices(&m.retired), vec![4]);
    }

    #[test]
    fn equal_indices_keep_input_order() {
        let m = match_zone(
            2,
            vec![
                inst(1).with_disk("d", false),
                ExistingInstance::new("floating-dup", 1, ZoneRef::Unzoned),
                inst(0),
            ],
        );
        let ids: Vec<_> = m.kept.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["i-0", "i-1"]);

        let m = match_zone(
            2,
            vec![
                ExistingInstance::new("x", 1, ZoneRef::Unzoned),
                ExistingInstance::new("y", 1, ZoneRef::Unzoned).with_disk("d", true),
            ],
        );
        let ids: Vec<_> = m.kept.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
    }

    #[test]
    fn zero_target_retires_all() {
        let m = match_zone(0, vec![inst(0), inst(1).with_disk("d", true)]);
        assert!(m.kept.is_empty());
        assert_eq!(m.retired.len(), 2);
        assert_eq!(m.shortfall, 0);
    }
}
