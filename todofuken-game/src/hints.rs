//! Progressive hints for the current question.
//!
//! Level 1 names the region, level 2 describes the area rank, and level 3
//! gives the character count of the short name. The level a player reached
//! is what the scoring policy discounts.

use crate::answer::short_name;
use crate::catalog::Prefecture;
use crate::scoring::MAX_HINT_LEVEL;

/// Text of the hint revealed at `level`, or `None` outside `1..=3`.
#[must_use]
pub fn hint_text(prefecture: &Prefecture, level: u8) -> Option<String> {
    match level {
        1 => Some(format!("{}地方の都道府県です", prefecture.region.label())),
        2 => Some(area_rank_message(prefecture.area_rank)),
        3 => Some(format!(
            "漢字{}文字の都道府県です",
            short_name(prefecture.name).chars().count()
        )),
        _ => None,
    }
}

/// Every hint shown once `level` hints have been revealed, oldest first.
#[must_use]
pub fn hints_up_to(prefecture: &Prefecture, level: u8) -> Vec<String> {
    (1..=level.min(MAX_HINT_LEVEL))
        .filter_map(|lvl| hint_text(prefecture, lvl))
        .collect()
}

fn area_rank_message(rank: u8) -> String {
    let description = match rank {
        0..=3 => "日本で最も大きな都道府県の一つです",
        4..=5 => "面積が非常に大きい都道府県です",
        6..=10 => "面積が大きい都道府県です",
        11..=20 => "面積は中程度の都道府県です",
        21..=35 => "面積は小さめの都道府県です",
        45..=u8::MAX => "日本で最も小さな都道府県の一つです",
        _ => "面積が小さい都道府県です",
    };
    format!("{description}（全国{rank}位）")
}
