//! Game mode descriptor supplied by the caller (routing/UI layer).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest region count offered by region mode.
pub const MIN_REGION_COUNT: u8 = 1;
/// Largest region count offered by region mode.
pub const MAX_REGION_COUNT: u8 = 7;

/// Which prefectures a session covers.
///
/// `Expert` is a presentation variant (silhouette map) and shares the full
/// mode's target selection and completion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "regions", rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Full,
    Regions(u8),
    Expert,
}

impl GameMode {
    /// Region count when this is a region mode with a count in `1..=7`.
    ///
    /// Out-of-range counts return `None`; they select the full catalog.
    #[must_use]
    pub const fn region_count(self) -> Option<u8> {
        match self {
            Self::Regions(n) if n >= MIN_REGION_COUNT && n <= MAX_REGION_COUNT => Some(n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_region_mode(self) -> bool {
        self.region_count().is_some()
    }

    #[must_use]
    pub const fn is_expert(self) -> bool {
        matches!(self, Self::Expert)
    }

    /// Label stored on completed records.
    #[must_use]
    pub fn label(self) -> String {
        match (self, self.region_count()) {
            (Self::Expert, _) => "expert".to_string(),
            (_, Some(n)) => format!("regions-{n}"),
            _ => "full".to_string(),
        }
    }

    /// Parses a region-count route parameter. Anything that is not an integer
    /// in `1..=7` yields `Full`.
    #[must_use]
    pub fn from_region_param(param: &str) -> Self {
        param
            .trim()
            .parse::<u8>()
            .ok()
            .map(Self::Regions)
            .filter(|mode| mode.is_region_mode())
            .unwrap_or(Self::Full)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_count_is_bounded() {
        assert_eq!(GameMode::Regions(1).region_count(), Some(1));
        assert_eq!(GameMode::Regions(7).region_count(), Some(7));
        assert_eq!(GameMode::Regions(0).region_count(), None);
        assert_eq!(GameMode::Regions(8).region_count(), None);
        assert_eq!(GameMode::Full.region_count(), None);
        assert_eq!(GameMode::Expert.region_count(), None);
    }

    #[test]
    fn labels_match_record_format() {
        assert_eq!(GameMode::Full.label(), "full");
        assert_eq!(GameMode::Expert.label(), "expert");
        assert_eq!(GameMode::Regions(3).label(), "regions-3");
        assert_eq!(GameMode::Regions(9).label(), "full");
    }

    #[test]
    fn route_param_falls_back_to_full() {
        assert_eq!(GameMode::from_region_param("3"), GameMode::Regions(3));
        assert_eq!(GameMode::from_region_param(" 7 "), GameMode::Regions(7));
        assert_eq!(GameMode::from_region_param("0"), GameMode::Full);
        assert_eq!(GameMode::from_region_param("8"), GameMode::Full);
        assert_eq!(GameMode::from_region_param("abc"), GameMode::Full);
        assert_eq!(GameMode::from_region_param(""), GameMode::Full);
    }

    #[test]
    fn serde_shape_is_tagged() {
        let json = serde_json::to_string(&GameMode::Regions(2)).unwrap();
        assert_eq!(json, r#"{"kind":"regions","regions":2}"#);
        let full: GameMode = serde_json::from_str(r#"{"kind":"full"}"#).unwrap();
        assert_eq!(full, GameMode::Full);
    }
}
