//! Static weight tables for demographic sampling
//!
//! Weights are relative and need not sum to anything in particular. Table order
//! matters: ties resolve to the earlier entry and the last entry is the
//! fallback for rounding at the top of the range.

use super::{Biome, Ethnicity, Religion};

pub type WeightTable<T> = &'static [(T, f64)];

pub fn religion_weights(biome: Biome) -> WeightTable<Religion> {
    use Religion::*;
    match biome {
        Biome::Market => &[
            (SunniIslam, 70.0),
            (ShiaIslam, 8.0),
            (EasternOrthodox, 8.0),
            (Jewish, 5.0),
            (ArmenianApostolic, 3.0),
            (SyriacOrthodox, 3.0),
            (LatinChristian, 2.0),
            (Druze, 1.0),
        ],
        Biome::Wealthy => &[
            (SunniIslam, 80.0),
            (ShiaIslam, 6.0),
            (EasternOrthodox, 6.0),
            (Jewish, 4.0),
            (ArmenianApostolic, 2.0),
            (LatinChristian, 2.0),
        ],
        Biome::Hovels => &[
            (SunniIslam, 65.0),
            (ShiaIslam, 12.0),
            (EasternOrthodox, 10.0),
            (SyriacOrthodox, 5.0),
            (Jewish, 4.0),
            (Druze, 4.0),
        ],
        Biome::Desert => &[
            (SunniIslam, 85.0),
            (Druze, 6.0),
            (ShiaIslam, 5.0),
            (EasternOrthodox, 4.0),
        ],
        Biome::Civic => &[
            (SunniIslam, 88.0),
            (ShiaIslam, 4.0),
            (EasternOrthodox, 4.0),
            (Jewish, 2.0),
            (ArmenianApostolic, 2.0),
        ],
        Biome::ChristianQuarter => &[
            (EasternOrthodox, 45.0),
            (SyriacOrthodox, 15.0),
            (ArmenianApostolic, 12.0),
            (Jewish, 12.0),
            (SunniIslam, 10.0),
            (LatinChristian, 6.0),
        ],
    }
}

pub fn biome_ethnicity_weights(biome: Biome) -> WeightTable<Ethnicity> {
    use Ethnicity::*;
    match biome {
        Biome::Market => &[
            (Arab, 70.0),
            (Kurdish, 8.0),
            (Turkic, 8.0),
            (Persian, 6.0),
            (Circassian, 3.0),
            (Armenian, 2.0),
            (Greek, 2.0),
            (Frankish, 1.0),
        ],
        Biome::Wealthy => &[
            (Arab, 60.0),
            (Turkic, 18.0),
            (Circassian, 10.0),
            (Kurdish, 8.0),
            (Persian, 4.0),
        ],
        Biome::Hovels => &[(Arab, 80.0), (Kurdish, 12.0), (Turkic, 4.0), (Persian, 4.0)],
        Biome::Desert => &[(Arab, 88.0), (Kurdish, 7.0), (Turkic, 5.0)],
        Biome::Civic => &[
            (Arab, 55.0),
            (Turkic, 25.0),
            (Circassian, 12.0),
            (Kurdish, 8.0),
        ],
        Biome::ChristianQuarter => &[
            (Arab, 70.0),
            (Kurdish, 10.0),
            (Turkic, 10.0),
            (Persian, 10.0),
        ],
    }
}

/// Dedicated ethnicity table for a religion, if it has one
pub fn religion_ethnicity_weights(religion: Religion) -> Option<WeightTable<Ethnicity>> {
    use Ethnicity::*;
    let table: WeightTable<Ethnicity> = match religion {
        Religion::SunniIslam => return None,
        Religion::ShiaIslam => &[(Arab, 60.0), (Persian, 35.0), (Turkic, 5.0)],
        Religion::EasternOrthodox => &[(Arab, 60.0), (Greek, 30.0), (Syriac, 10.0)],
        Religion::ArmenianApostolic => &[(Armenian, 95.0), (Syriac, 5.0)],
        Religion::SyriacOrthodox => &[(Syriac, 85.0), (Arab, 15.0)],
        Religion::Jewish => &[(Jewish, 85.0), (Arab, 10.0), (Persian, 5.0)],
        Religion::LatinChristian => &[(Frankish, 80.0), (Armenian, 10.0), (Greek, 10.0)],
        Religion::Druze => &[(Arab, 100.0)],
    };
    Some(table)
}

/// Military slave-soldier households
pub const MAMLUK_ETHNICITY: WeightTable<Ethnicity> = &[
    (Ethnicity::Turkic, 55.0),
    (Ethnicity::Circassian, 35.0),
    (Ethnicity::Kurdish, 10.0),
];

/// Profession keywords that force a religion, in priority order
pub const RELIGION_OVERRIDES: &[(&[&str], Religion)] = &[
    (
        &["imam", "qadi", "muezzin", "mufti", "khatib"],
        Religion::SunniIslam,
    ),
    (&["rabbi"], Religion::Jewish),
    (
        &["priest", "monk", "bishop", "deacon", "patriarch"],
        Religion::EasternOrthodox,
    ),
];

/// Profession keywords that select the Mamluk ethnicity table
pub const MAMLUK_KEYWORDS: &[&str] = &["mamluk", "amir", "emir", "soldier", "guard", "cavalry"];

/// Districts by biome; anything not listed is a market district
pub const DISTRICT_BIOMES: &[(&str, Biome)] = &[
    ("market", Biome::Market),
    ("souq", Biome::Market),
    ("straight_street", Biome::Market),
    ("caravanserai", Biome::Market),
    ("wealthy", Biome::Wealthy),
    ("salhiyya", Biome::Wealthy),
    ("hovels", Biome::Hovels),
    ("alleys", Biome::Hovels),
    ("midan", Biome::Hovels),
    ("desert", Biome::Desert),
    ("outskirts_desert", Biome::Desert),
    ("southern_road", Biome::Desert),
    ("hauran", Biome::Desert),
    ("civic", Biome::Civic),
    ("citadel", Biome::Civic),
    ("umayyad_mosque", Biome::Civic),
    ("christian_quarter", Biome::ChristianQuarter),
    ("bab_sharqi", Biome::ChristianQuarter),
    ("bab_touma", Biome::ChristianQuarter),
    ("jewish_quarter", Biome::ChristianQuarter),
];
