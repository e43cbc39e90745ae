//! Demographic assignment
//!
//! Turns a random stream plus household context into an
//! `(ethnicity, religion, language)` tuple. Every call consumes exactly three
//! draws, in order: religion, ethnicity, language split. Overrides and table
//! choice never change the draw count, so the stream position after an
//! assignment is independent of the outcome.

pub mod tables;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::rng::RandomSource;
use crate::entity::npc::{Gender, SocialClass};
use tables::WeightTable;

/// Coarse cultural category used only to choose weight tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    Market,
    Wealthy,
    Hovels,
    Desert,
    Civic,
    ChristianQuarter,
}

impl Biome {
    /// Static lookup; unknown or empty district names fall back to `Market`
    pub fn from_district(district: &str) -> Biome {
        let key = district.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        tables::DISTRICT_BIOMES
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, biome)| *biome)
            .unwrap_or(Biome::Market)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Religion {
    SunniIslam,
    ShiaIslam,
    EasternOrthodox,
    ArmenianApostolic,
    SyriacOrthodox,
    Jewish,
    LatinChristian,
    Druze,
}

impl Religion {
    pub fn label(&self) -> &'static str {
        match self {
            Religion::SunniIslam => "Sunni Islam",
            Religion::ShiaIslam => "Shia Islam",
            Religion::EasternOrthodox => "Eastern Orthodox",
            Religion::ArmenianApostolic => "Armenian Apostolic",
            Religion::SyriacOrthodox => "Syriac Orthodox",
            Religion::Jewish => "Jewish",
            Religion::LatinChristian => "Latin Christian",
            Religion::Druze => "Druze",
        }
    }

    pub fn is_muslim(&self) -> bool {
        matches!(self, Religion::SunniIslam | Religion::ShiaIslam)
    }

    pub fn is_christian(&self) -> bool {
        matches!(
            self,
            Religion::EasternOrthodox
                | Religion::ArmenianApostolic
                | Religion::SyriacOrthodox
                | Religion::LatinChristian
        )
    }
}

impl fmt::Display for Religion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ethnicity {
    Arab,
    Kurdish,
    Turkic,
    Circassian,
    Armenian,
    Greek,
    Syriac,
    Persian,
    Frankish,
    Jewish,
}

impl Ethnicity {
    pub fn label(&self) -> &'static str {
        match self {
            Ethnicity::Arab => "Arab",
            Ethnicity::Kurdish => "Kurdish",
            Ethnicity::Turkic => "Turkic",
            Ethnicity::Circassian => "Circassian",
            Ethnicity::Armenian => "Armenian",
            Ethnicity::Greek => "Greek",
            Ethnicity::Syriac => "Syriac",
            Ethnicity::Persian => "Persian",
            Ethnicity::Frankish => "Frankish",
            Ethnicity::Jewish => "Jewish",
        }
    }
}

impl fmt::Display for Ethnicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Arabic,
    JudeoArabic,
    Kurdish,
    Turkic,
    Circassian,
    Armenian,
    Greek,
    Syriac,
    Persian,
    Italian,
}

impl Language {
    pub fn label(&self) -> &'static str {
        match self {
            Language::Arabic => "Arabic",
            Language::JudeoArabic => "Judeo-Arabic",
            Language::Kurdish => "Kurdish",
            Language::Turkic => "Turkic",
            Language::Circassian => "Circassian",
            Language::Armenian => "Armenian",
            Language::Greek => "Greek",
            Language::Syriac => "Syriac",
            Language::Persian => "Persian",
            Language::Italian => "Italian",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable per-NPC demographic tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Demographics {
    pub ethnicity: Ethnicity,
    pub religion: Religion,
    pub language: Language,
}

/// Household context for one assignment
#[derive(Debug, Clone, Copy, Default)]
pub struct DemographicContext<'a> {
    pub district: &'a str,
    pub profession: Option<&'a str>,
    /// Class and gender travel with the household but do not change the tuple
    pub social_class: Option<SocialClass>,
    pub gender: Option<Gender>,
}

impl<'a> DemographicContext<'a> {
    pub fn new(district: &'a str) -> Self {
        Self {
            district,
            ..Default::default()
        }
    }

    pub fn with_profession(mut self, profession: &'a str) -> Self {
        self.profession = Some(profession);
        self
    }

    pub fn with_social_class(mut self, class: SocialClass) -> Self {
        self.social_class = Some(class);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }
}

/// Cumulative-weight walk over a small table.
///
/// Draws `rand() * total` and returns the first entry whose running sum exceeds
/// it. The last entry absorbs floating-point edge cases. Always consumes one
/// draw; returns `None` only for an empty table.
pub fn pick_weighted<T: Copy, R: RandomSource + ?Sized>(rng: &mut R, table: &[(T, f64)]) -> Option<T> {
    let roll = rng.next_f64();
    let last = table.last()?;
    let total: f64 = table.iter().map(|(_, w)| w.max(0.0)).sum();
    let target = roll * total;

    let mut cumulative = 0.0;
    for (item, weight) in table {
        cumulative += weight.max(0.0);
        if target < cumulative {
            return Some(*item);
        }
    }
    Some(last.0)
}

fn profession_matches(profession: &str, keywords: &[&str]) -> bool {
    let lower = profession.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// First matching override wins
pub fn religion_override(profession: &str) -> Option<Religion> {
    tables::RELIGION_OVERRIDES
        .iter()
        .find(|(keywords, _)| profession_matches(profession, keywords))
        .map(|(_, religion)| *religion)
}

pub fn is_mamluk_profession(profession: &str) -> bool {
    profession_matches(profession, tables::MAMLUK_KEYWORDS)
}

fn ethnicity_table(biome: Biome, religion: Religion, profession: Option<&str>) -> WeightTable<Ethnicity> {
    if profession.is_some_and(is_mamluk_profession) {
        return tables::MAMLUK_ETHNICITY;
    }
    if let Some(table) = tables::religion_ethnicity_weights(religion) {
        return table;
    }
    tables::biome_ethnicity_weights(biome)
}

/// Language from ethnicity (and religion for Arabic-speaking Jews), one draw
fn language_for(ethnicity: Ethnicity, religion: Religion, roll: f64) -> Language {
    let split = |p: f64, primary: Language| if roll < p { primary } else { Language::Arabic };
    match ethnicity {
        Ethnicity::Arab if religion == Religion::Jewish => split(0.3, Language::JudeoArabic),
        Ethnicity::Arab => Language::Arabic,
        Ethnicity::Jewish => split(0.6, Language::JudeoArabic),
        Ethnicity::Kurdish => split(0.6, Language::Kurdish),
        Ethnicity::Turkic => split(0.7, Language::Turkic),
        Ethnicity::Circassian => {
            if roll < 0.4 {
                Language::Circassian
            } else if roll < 0.8 {
                Language::Turkic
            } else {
                Language::Arabic
            }
        }
        Ethnicity::Armenian => split(0.75, Language::Armenian),
        Ethnicity::Greek => split(0.6, Language::Greek),
        Ethnicity::Syriac => split(0.5, Language::Syriac),
        Ethnicity::Persian => split(0.7, Language::Persian),
        Ethnicity::Frankish => split(0.8, Language::Italian),
    }
}

/// Assign a demographic tuple. Exactly three draws.
pub fn assign<R: RandomSource + ?Sized>(rng: &mut R, ctx: &DemographicContext<'_>) -> Demographics {
    let biome = Biome::from_district(ctx.district);

    let base = pick_weighted(rng, tables::religion_weights(biome)).unwrap_or(Religion::SunniIslam);
    let religion = ctx.profession.and_then(religion_override).unwrap_or(base);

    let table = ethnicity_table(biome, religion, ctx.profession);
    let ethnicity = pick_weighted(rng, table).unwrap_or(Ethnicity::Arab);

    let language = language_for(ethnicity, religion, rng.next_f64());

    Demographics {
        ethnicity,
        religion,
        language,
    }
}
