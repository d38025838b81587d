//! Target-set selection for each game mode.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;

use crate::catalog::{self, PREFECTURE_COUNT, PrefectureId, Region};
use crate::mode::GameMode;

/// Prefecture ids in play for one session.
pub type TargetSet = BTreeSet<PrefectureId>;

/// Every prefecture in the catalog.
#[must_use]
pub fn full_targets() -> TargetSet {
    catalog::all_ids().collect()
}

/// Computes the target set for `mode`.
///
/// Region mode draws `n` distinct regions uniformly without replacement. A
/// single-region draw never picks Hokkaido, which would leave one question.
/// Counts outside `1..=7` take the full catalog.
pub fn select_targets<R: Rng + ?Sized>(mode: GameMode, rng: &mut R) -> TargetSet {
    let Some(count) = mode.region_count() else {
        return full_targets();
    };

    let candidates: Vec<Region> = Region::ALL
        .into_iter()
        .filter(|region| count > 1 || region.member_count() > 1)
        .collect();

    candidates
        .choose_multiple(rng, usize::from(count))
        .flat_map(|region| region.members())
        .collect()
}

/// Regions that have at least one member in `targets`, in catalog order.
#[must_use]
pub fn regions_of(targets: &TargetSet) -> Vec<Region> {
    Region::ALL
        .into_iter()
        .filter(|region| region.members().any(|id| targets.contains(&id)))
        .collect()
}

/// Whether a persisted target set belongs to the session shape `mode` asks for.
///
/// Full and expert modes match only the complete catalog. Region mode matches a
/// strict subset that is a union of exactly `n` whole regions, and never
/// Hokkaido on its own.
#[must_use]
pub fn matches_mode(targets: &TargetSet, mode: GameMode) -> bool {
    match mode.region_count() {
        None => targets.len() == PREFECTURE_COUNT,
        Some(count) => {
            if targets.len() >= PREFECTURE_COUNT {
                return false;
            }
            let regions = regions_of(targets);
            let whole = regions
                .iter()
                .all(|region| region.members().all(|id| targets.contains(&id)));
            whole
                && regions.len() == usize::from(count)
                && regions != [Region::Hokkaido]
        }
    }
}
