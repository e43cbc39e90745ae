//! Population creation for a freshly generated tile
//!
//! Households are seeded per building from the building id, street people from
//! the tile seed, so regenerating a tile reproduces the same people.

use crate::city::building::BuildingMetadata;
use crate::core::config::SimulationConfig;
use crate::core::rng::{hash_string, DeterministicRng, RandomSource};
use crate::core::types::{NpcId, Vec2, Vec3};
use crate::demographics::{self, DemographicContext};
use crate::entity::naming::{
    generate_name, roll_age, roll_gender, GUEST_PROFESSIONS, STREET_PROFESSIONS,
    WORSHIPPER_PROFESSION,
};
use crate::entity::npc::{Gender, Mood, NpcLocation, NpcRecord, NpcRole, NpcStats, SocialClass};

/// Centroid of the tile's buildings; the world origin for an empty tile
pub fn tile_origin(buildings: &[BuildingMetadata]) -> Vec2 {
    if buildings.is_empty() {
        return Vec2::default();
    }
    let n = buildings.len() as f32;
    let (sx, sz) = buildings
        .iter()
        .fold((0.0f32, 0.0f32), |(sx, sz), b| (sx + b.position.x, sz + b.position.z));
    Vec2::new(sx / n, sz / n)
}

struct Newcomer<'a> {
    id: NpcId,
    role: NpcRole,
    name: Option<&'a str>,
    profession: &'a str,
    /// Profession the demographic overrides read; differs for worshippers
    faith_profession: &'a str,
    gender: Gender,
    age: u8,
    social_class: SocialClass,
}

fn make_record<R: RandomSource>(
    rng: &mut R,
    district: &str,
    who: Newcomer<'_>,
    position: Vec3,
) -> NpcRecord {
    let ctx = DemographicContext::new(district)
        .with_profession(who.faith_profession)
        .with_social_class(who.social_class)
        .with_gender(who.gender);
    let demographics = demographics::assign(rng, &ctx);

    let name = match who.name {
        Some(name) => name.to_string(),
        None => generate_name(rng, demographics.religion, who.gender),
    };

    let stats = NpcStats {
        name,
        age: who.age,
        profession: who.profession.to_string(),
        gender: who.gender,
        social_class: who.social_class,
        demographics,
        mood: Mood::Content,
        panic_level: rng.range(0.0, 20.0) as f32,
        awareness_level: rng.range(0.0, 10.0) as f32,
    };

    let schedule_seed = hash_string(who.id.as_str());
    NpcRecord::new(who.id, who.role, stats, position, schedule_seed)
}

/// Small seeded offset so household members do not stack on one point
fn scatter<R: RandomSource>(rng: &mut R, around: Vec3, spread: f32) -> Vec3 {
    let dx = rng.range(-1.0, 1.0) as f32 * spread;
    let dz = rng.range(-1.0, 1.0) as f32 * spread;
    Vec3::new(around.x + dx, around.y, around.z + dz)
}

/// Owner plus either an optional guest or, for religious buildings, worshippers
pub fn spawn_household(
    building: &BuildingMetadata,
    district: &str,
    config: &SimulationConfig,
) -> Vec<NpcRecord> {
    let mut rng = DeterministicRng::new(hash_string(building.id.as_str()));
    let class = building.building_type.owner_class();
    let spread = building.size_scale.max(0.5) * 2.0;
    let bid = building.id.as_str();
    let mut household = Vec::new();

    let age = roll_age(&mut rng, 25, 70);
    household.push(make_record(
        &mut rng,
        district,
        Newcomer {
            id: NpcId::new(format!("{}:owner", bid)),
            role: NpcRole::Owner,
            name: Some(building.owner_name.as_str()),
            profession: &building.owner_profession,
            faith_profession: &building.owner_profession,
            gender: building.owner_gender,
            age,
            social_class: class,
        },
        building.position,
    ));

    if building.building_type.is_religious() {
        let count = rng.range_int(config.worshippers.0 as i64, config.worshippers.1 as i64);
        for i in 0..count {
            let gender = roll_gender(&mut rng);
            let age = roll_age(&mut rng, 14, 75);
            let position = scatter(&mut rng, building.position, spread);
            household.push(make_record(
                &mut rng,
                district,
                Newcomer {
                    id: NpcId::new(format!("{}:worshipper:{}", bid, i)),
                    role: NpcRole::Worshipper,
                    name: None,
                    profession: WORSHIPPER_PROFESSION,
                    faith_profession: &building.owner_profession,
                    gender,
                    age,
                    social_class: SocialClass::Peasant,
                },
                position,
            ));
        }
    } else if rng.chance(config.guest_chance) {
        let gender = roll_gender(&mut rng);
        let profession = rng.pick(GUEST_PROFESSIONS).copied().unwrap_or("Servant");
        let age = roll_age(&mut rng, 12, 60);
        let position = scatter(&mut rng, building.position, spread);
        household.push(make_record(
            &mut rng,
            district,
            Newcomer {
                id: NpcId::new(format!("{}:guest", bid)),
                role: NpcRole::Guest,
                name: None,
                profession,
                faith_profession: profession,
                gender,
                age,
                social_class: SocialClass::Peasant,
            },
            position,
        ));
    }

    for record in household.iter_mut() {
        record.home_building_id = Some(building.id.clone());
        record.location = NpcLocation::Interior;
    }
    household
}

/// Unaffiliated people scattered around the tile
pub fn spawn_street_population(
    origin: Vec2,
    district: &str,
    tile_seed: u32,
    count: u32,
    config: &SimulationConfig,
) -> Vec<NpcRecord> {
    let mut rng = DeterministicRng::new(tile_seed);
    let half = config.tile_half_extent as f64;

    (0..count)
        .map(|i| {
            let gender = roll_gender(&mut rng);
            let profession = rng.pick(STREET_PROFESSIONS).copied().unwrap_or("Porter");
            let age = roll_age(&mut rng, 10, 70);
            let x = origin.x + rng.range(-half, half) as f32;
            let z = origin.y + rng.range(-half, half) as f32;
            make_record(
                &mut rng,
                district,
                Newcomer {
                    id: NpcId::new(format!("street:{}:{}", tile_seed, i)),
                    role: NpcRole::Street,
                    name: None,
                    profession,
                    faith_profession: profession,
                    gender,
                    age,
                    social_class: SocialClass::Peasant,
                },
                Vec3::new(x, 0.0, z),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::building::BuildingType;
    use crate::core::types::BuildingId;
    use crate::demographics::Religion;

    fn building(id: &str, kind: BuildingType, profession: &str) -> BuildingMetadata {
        BuildingMetadata {
            id: BuildingId::new(id),
            position: Vec3::new(10.0, 0.0, -10.0),
            building_type: kind,
            owner_name: "Shaykh Umar".into(),
            owner_profession: profession.into(),
            owner_gender: Gender::Male,
            story_count: 1,
            size_scale: 1.2,
        }
    }

    #[test]
    fn test_owner_keeps_building_identity() {
        let b = building("b-9", BuildingType::Commercial, "Spice Merchant");
        let household = spawn_household(&b, "market", &SimulationConfig::default());
        let owner = &household[0];
        assert_eq!(owner.id.as_str(), "b-9:owner");
        assert_eq!(owner.stats.name, "Shaykh Umar");
        assert_eq!(owner.stats.social_class, SocialClass::Merchant);
        assert_eq!(owner.home_building_id.as_ref(), Some(&b.id));
        assert!(household.len() <= 2);
    }

    #[test]
    fn test_religious_building_spawns_worshippers_of_its_faith() {
        let config = SimulationConfig::default();
        for i in 0..40 {
            let b = building(&format!("mosque-{}", i), BuildingType::Religious, "Imam");
            let household = spawn_household(&b, "christian_quarter", &config);
            let worshippers: Vec<_> = household
                .iter()
                .filter(|r| r.role == NpcRole::Worshipper)
                .collect();
            assert!((3..=6).contains(&worshippers.len()));
            assert!(household.iter().all(|r| r.role != NpcRole::Guest));
            for w in worshippers {
                assert_eq!(w.stats.demographics.religion, Religion::SunniIslam);
                assert_eq!(w.location, NpcLocation::Interior);
            }
        }
    }

    #[test]
    fn test_household_is_reproducible() {
        let b = building("b-3", BuildingType::Residential, "Tanner");
        let config = SimulationConfig::default();
        assert_eq!(
            spawn_household(&b, "hovels", &config),
            spawn_household(&b, "hovels", &config)
        );
    }

    #[test]
    fn test_street_population_count_and_bounds() {
        let config = SimulationConfig::default();
        let origin = Vec2::new(100.0, 100.0);
        let street = spawn_street_population(origin, "market", 77, 25, &config);
        assert_eq!(street.len(), 25);
        for npc in &street {
            assert!(npc.is_street());
            assert!((npc.position.x - origin.x).abs() <= config.tile_half_extent);
            assert!((npc.position.z - origin.y).abs() <= config.tile_half_extent);
        }
    }

    #[test]
    fn test_tile_origin_is_centroid() {
        let mut a = building("a", BuildingType::Residential, "Baker");
        let mut b = building("b", BuildingType::Residential, "Baker");
        a.position = Vec3::new(0.0, 0.0, 0.0);
        b.position = Vec3::new(10.0, 3.0, 20.0);
        assert_eq!(tile_origin(&[a, b]), Vec2::new(5.0, 10.0));
        assert_eq!(tile_origin(&[]), Vec2::default());
    }
}
