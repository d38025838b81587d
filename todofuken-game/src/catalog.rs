//! Static prefecture reference data.
//!
//! The catalog is fixed at compile time: 47 prefectures grouped into 8 regions.
//! Ids are stable and contiguous (`1..=47`), and every region owns a contiguous
//! id range, which keeps membership checks to a range comparison.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Number of prefectures in the catalog.
pub const PREFECTURE_COUNT: usize = 47;

/// Stable prefecture identifier in `1..=47`.
///
/// Deserialization validates the range, so a persisted id that does not name a
/// catalog entry is rejected instead of silently carried along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PrefectureId(u8);

impl PrefectureId {
    /// Lowest id (Hokkaido).
    pub const FIRST: Self = Self(1);

    /// Returns the id when `raw` names a catalog entry.
    #[must_use]
    pub const fn new(raw: u8) -> Option<Self> {
        if raw >= 1 && raw as usize <= PREFECTURE_COUNT {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Converts an arbitrary integer coming from outside the crate (UI, JS).
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        u8::try_from(raw).ok().and_then(Self::new)
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Catalog entry for this id.
    #[must_use]
    pub fn prefecture(self) -> &'static Prefecture {
        &PREFECTURES[self.0 as usize - 1]
    }
}

impl TryFrom<u8> for PrefectureId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("prefecture id {value} is outside 1..=47"))
    }
}

impl From<PrefectureId> for u8 {
    fn from(value: PrefectureId) -> Self {
        value.0
    }
}

impl fmt::Display for PrefectureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The eight geographic groupings used by region mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Hokkaido,
    Tohoku,
    Kanto,
    Chubu,
    Kinki,
    Chugoku,
    Shikoku,
    Kyushu,
}

impl Region {
    /// All regions in catalog order.
    pub const ALL: [Self; 8] = [
        Self::Hokkaido,
        Self::Tohoku,
        Self::Kanto,
        Self::Chubu,
        Self::Kinki,
        Self::Chugoku,
        Self::Shikoku,
        Self::Kyushu,
    ];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hokkaido => "北海道",
            Self::Tohoku => "東北",
            Self::Kanto => "関東",
            Self::Chubu => "中部",
            Self::Kinki => "近畿",
            Self::Chugoku => "中国",
            Self::Shikoku => "四国",
            Self::Kyushu => "九州",
        }
    }

    const fn id_range(self) -> RangeInclusive<u8> {
        match self {
            Self::Hokkaido => 1..=1,
            Self::Tohoku => 2..=7,
            Self::Kanto => 8..=14,
            Self::Chubu => 15..=23,
            Self::Kinki => 24..=30,
            Self::Chugoku => 31..=35,
            Self::Shikoku => 36..=39,
            Self::Kyushu => 40..=47,
        }
    }

    /// Member prefecture ids, ascending.
    pub fn members(self) -> impl Iterator<Item = PrefectureId> {
        self.id_range().filter_map(PrefectureId::new)
    }

    #[must_use]
    pub fn member_count(self) -> usize {
        self.id_range().count()
    }

    #[must_use]
    pub fn contains(self, id: PrefectureId) -> bool {
        self.id_range().contains(&id.get())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prefecture {
    pub id: PrefectureId,
    pub name: &'static str,
    pub kana: &'static str,
    pub region: Region,
    /// Area in km².
    pub area: f64,
    /// National rank by area, 1 = largest.
    pub area_rank: u8,
}

const fn pref(
    id: u8,
    name: &'static str,
    kana: &'static str,
    region: Region,
    area: f64,
    area_rank: u8,
) -> Prefecture {
    Prefecture {
        id: PrefectureId(id),
        name,
        kana,
        region,
        area,
        area_rank,
    }
}

/// Every prefecture, indexed by `id - 1`.
pub static PREFECTURES: [Prefecture; PREFECTURE_COUNT] = [
    pref(1, "北海道", "ほっかいどう", Region::Hokkaido, 83_424.31, 1),
    pref(2, "青森県", "あおもりけん", Region::Tohoku, 9_645.64, 8),
    pref(3, "岩手県", "いわてけん", Region::Tohoku, 15_275.01, 2),
    pref(4, "宮城県", "みやぎけん", Region::Tohoku, 7_282.22, 16),
    pref(5, "秋田県", "あきたけん", Region::Tohoku, 11_637.54, 6),
    pref(6, "山形県", "やまがたけん", Region::Tohoku, 9_323.15, 9),
    pref(7, "福島県", "ふくしまけん", Region::Tohoku, 13_784.14, 3),
    pref(8, "茨城県", "いばらきけん", Region::Kanto, 6_097.39, 24),
    pref(9, "栃木県", "とちぎけん", Region::Kanto, 6_408.09, 20),
    pref(10, "群馬県", "ぐんまけん", Region::Kanto, 6_362.28, 21),
    pref(11, "埼玉県", "さいたまけん", Region::Kanto, 3_797.75, 39),
    pref(12, "千葉県", "ちばけん", Region::Kanto, 5_157.61, 28),
    pref(13, "東京都", "とうきょうと", Region::Kanto, 2_194.07, 45),
    pref(14, "神奈川県", "かながわけん", Region::Kanto, 2_416.17, 43),
    pref(15, "新潟県", "にいがたけん", Region::Chubu, 12_584.10, 5),
    pref(16, "富山県", "とやまけん", Region::Chubu, 4_247.61, 33),
    pref(17, "石川県", "いしかわけん", Region::Chubu, 4_186.09, 35),
    pref(18, "福井県", "ふくいけん", Region::Chubu, 4_190.52, 34),
    pref(19, "山梨県", "やまなしけん", Region::Chubu, 4_465.27, 32),
    pref(20, "長野県", "ながのけん", Region::Chubu, 13_561.56, 4),
    pref(21, "岐阜県", "ぎふけん", Region::Chubu, 10_621.29, 7),
    pref(22, "静岡県", "しずおかけん", Region::Chubu, 7_777.42, 13),
    pref(23, "愛知県", "あいちけん", Region::Chubu, 5_173.26, 27),
    pref(24, "三重県", "みえけん", Region::Kinki, 5_774.40, 25),
    pref(25, "滋賀県", "しがけん", Region::Kinki, 4_017.38, 38),
    pref(26, "京都府", "きょうとふ", Region::Kinki, 4_612.19, 31),
    pref(27, "大阪府", "おおさかふ", Region::Kinki, 1_905.14, 46),
    pref(28, "兵庫県", "ひょうごけん", Region::Kinki, 8_401.02, 12),
    pref(29, "奈良県", "ならけん", Region::Kinki, 3_691.09, 40),
    pref(30, "和歌山県", "わかやまけん", Region::Kinki, 4_724.68, 30),
    pref(31, "鳥取県", "とっとりけん", Region::Chugoku, 3_507.13, 41),
    pref(32, "島根県", "しまねけん", Region::Chugoku, 6_708.26, 19),
    pref(33, "岡山県", "おかやまけん", Region::Chugoku, 7_114.50, 17),
    pref(34, "広島県", "ひろしまけん", Region::Chugoku, 8_479.38, 11),
    pref(35, "山口県", "やまぐちけん", Region::Chugoku, 6_112.30, 23),
    pref(36, "徳島県", "とくしまけん", Region::Shikoku, 4_146.93, 36),
    pref(37, "香川県", "かがわけん", Region::Shikoku, 1_876.77, 47),
    pref(38, "愛媛県", "えひめけん", Region::Shikoku, 5_676.11, 26),
    pref(39, "高知県", "こうちけん", Region::Shikoku, 7_103.93, 18),
    pref(40, "福岡県", "ふくおかけん", Region::Kyushu, 4_986.40, 29),
    pref(41, "佐賀県", "さがけん", Region::Kyushu, 2_440.69, 42),
    pref(42, "長崎県", "ながさきけん", Region::Kyushu, 4_130.98, 37),
    pref(43, "熊本県", "くまもとけん", Region::Kyushu, 7_409.35, 15),
    pref(44, "大分県", "おおいたけん", Region::Kyushu, 6_340.76, 22),
    pref(45, "宮崎県", "みやざきけん", Region::Kyushu, 7_735.31, 14),
    pref(46, "鹿児島県", "かごしまけん", Region::Kyushu, 9_187.06, 10),
    pref(47, "沖縄県", "おきなわけん", Region::Kyushu, 2_281.00, 44),
];

/// Looks up a prefecture by raw id.
#[must_use]
pub fn prefecture(raw: u8) -> Option<&'static Prefecture> {
    PrefectureId::new(raw).map(PrefectureId::prefecture)
}

/// All ids in ascending order.
pub fn all_ids() -> impl Iterator<Item = PrefectureId> {
    PREFECTURES.iter().map(|p| p.id)
}
