//! Picks the next question from the unanswered part of the target set.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;

use crate::catalog::PrefectureId;

/// Uniformly picks one id from `targets - answered`.
///
/// Returns `None` once every target is answered; callers treat that as
/// completion, not a failure.
pub fn pick_next<R: Rng + ?Sized>(
    targets: &BTreeSet<PrefectureId>,
    answered: &BTreeSet<PrefectureId>,
    rng: &mut R,
) -> Option<PrefectureId> {
    let remaining: Vec<PrefectureId> = targets.difference(answered).copied().collect();
    remaining.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::full_targets;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn ids(raw: &[u8]) -> BTreeSet<PrefectureId> {
        raw.iter().filter_map(|&r| PrefectureId::new(r)).collect()
    }

    #[test]
    fn never_returns_an_answered_id() {
        let targets = full_targets();
        let answered = ids(&(1..=46).collect::<Vec<_>>());
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        for _ in 0..20 {
            assert_eq!(pick_next(&targets, &answered, &mut rng), PrefectureId::new(47));
        }
    }

    #[test]
    fn exhausted_pool_returns_none() {
        let targets = ids(&[8, 9, 10]);
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        assert_eq!(pick_next(&targets, &targets.clone(), &mut rng), None);
        assert_eq!(pick_next(&BTreeSet::new(), &BTreeSet::new(), &mut rng), None);
    }

    #[test]
    fn draining_visits_every_target_once() {
        let targets = ids(&[24, 25, 26, 27, 28, 29, 30]);
        let mut answered = BTreeSet::new();
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        while let Some(next) = pick_next(&targets, &answered, &mut rng) {
            assert!(targets.contains(&next));
            assert!(answered.insert(next), "{next} picked twice");
        }
        assert_eq!(answered, targets);
    }
}
