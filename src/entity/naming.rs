//! Seeded names, ages and professions for generated NPCs

use crate::core::rng::RandomSource;
use crate::demographics::Religion;
use crate::entity::npc::Gender;

const MUSLIM_MALE: &[&str] = &[
    "Muhammad", "Ahmad", "Ali", "Umar", "Yusuf", "Ibrahim", "Hasan", "Husayn", "Khalil", "Mahmud",
    "Ismail", "Salih",
];
const MUSLIM_FEMALE: &[&str] = &[
    "Fatima", "Aisha", "Khadija", "Zaynab", "Maryam", "Amina", "Layla", "Ruqayya", "Sitt al-Sham",
];
const CHRISTIAN_MALE: &[&str] = &[
    "Yuhanna", "Butrus", "Jirjis", "Ilyas", "Tuma", "Mikhail", "Yaqub", "Istifan",
];
const CHRISTIAN_FEMALE: &[&str] = &["Maryam", "Hanna", "Martha", "Thecla", "Helena", "Shamuni"];
const JEWISH_MALE: &[&str] = &["Musa", "Ishaq", "Harun", "Yaqub", "Shlomo", "Dawud", "Yosef"];
const JEWISH_FEMALE: &[&str] = &["Sara", "Rivka", "Esther", "Miriam", "Hanna", "Dina"];

/// Professions for unaffiliated people found in the streets
pub const STREET_PROFESSIONS: &[&str] = &[
    "Porter",
    "Water Carrier",
    "Peddler",
    "Day Laborer",
    "Beggar",
    "Pilgrim",
    "Sweet Seller",
    "Mamluk Guard",
    "Scribe",
    "Herbalist",
];

/// Second members of a household
pub const GUEST_PROFESSIONS: &[&str] = &["Servant", "Cook", "Apprentice", "Lodger", "Relative", "Nursemaid"];

pub const WORSHIPPER_PROFESSION: &str = "Worshipper";

fn pools(religion: Religion) -> (&'static [&'static str], &'static [&'static str]) {
    match religion {
        Religion::Jewish => (JEWISH_MALE, JEWISH_FEMALE),
        r if r.is_christian() => (CHRISTIAN_MALE, CHRISTIAN_FEMALE),
        _ => (MUSLIM_MALE, MUSLIM_FEMALE),
    }
}

/// Given name plus patronymic, two draws
pub fn generate_name<R: RandomSource>(rng: &mut R, religion: Religion, gender: Gender) -> String {
    let (male, female) = pools(religion);
    let given_pool = match gender {
        Gender::Male => male,
        Gender::Female => female,
    };
    let given = rng.pick(given_pool).copied().unwrap_or("Anonymous");
    let father = rng.pick(male).copied().unwrap_or("Abdallah");
    let link = match gender {
        Gender::Male => "ibn",
        Gender::Female => "bint",
    };
    format!("{} {} {}", given, link, father)
}

/// One draw
pub fn roll_gender<R: RandomSource>(rng: &mut R) -> Gender {
    if rng.chance(0.5) {
        Gender::Male
    } else {
        Gender::Female
    }
}

/// Age in years within an inclusive range, one draw
pub fn roll_age<R: RandomSource>(rng: &mut R, min: u8, max: u8) -> u8 {
    rng.range_int(min as i64, max as i64) as u8
}
