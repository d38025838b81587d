//! Points awarded for a correct answer.

/// Highest hint level; later hints score the same as this one.
pub const MAX_HINT_LEVEL: u8 = 3;

const POINTS_BY_HINT: [u32; 4] = [10, 8, 6, 4];

/// Points for a correct answer given after `hint_level` hints were revealed.
///
/// Hints reduce the reward but never to zero.
#[must_use]
pub const fn score_for(hint_level: u8) -> u32 {
    let idx = if hint_level > MAX_HINT_LEVEL {
        MAX_HINT_LEVEL
    } else {
        hint_level
    };
    POINTS_BY_HINT[idx as usize]
}

/// Best possible score for a target set of `target_count` prefectures.
#[must_use]
pub const fn perfect_score(target_count: usize) -> u64 {
    target_count as u64 * score_for(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_table() {
        assert_eq!(score_for(0), 10);
        assert_eq!(score_for(1), 8);
        assert_eq!(score_for(2), 6);
        assert_eq!(score_for(3), 4);
        assert_eq!(score_for(99), 4);
        assert_eq!(score_for(u8::MAX), 4);
    }

    #[test]
    fn perfect_full_run_is_470() {
        assert_eq!(perfect_score(47), 470);
    }
}
