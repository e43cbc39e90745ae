//! Integration tests for player action broadcast
//!
//! - Radius inclusion at the exact boundary
//! - Cooldown gating reported in whole seconds
//! - Single-roll encouragement and stat gates
//! - Population changes are visible to the very next action

use plague_city::actions::{ActionId, PlayerStats};
use plague_city::core::types::{NpcId, Vec3};
use plague_city::core::SimulationConfig;
use plague_city::demographics::{Demographics, Ethnicity, Language, Religion};
use plague_city::entity::npc::{Gender, Mood, NpcRecord, NpcRole, NpcStats, SocialClass};
use plague_city::simulation::Simulation;

fn empty_tile() -> Simulation {
    let config = SimulationConfig {
        street_npc_count: 0,
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::new(config).unwrap();
    sim.load_tile(&[], "market", 7).unwrap();
    sim
}

fn bystander(id: &str, x: f32, z: f32) -> NpcRecord {
    let stats = NpcStats {
        name: format!("Bystander {}", id),
        age: 40,
        profession: "Water Carrier".into(),
        gender: Gender::Female,
        social_class: SocialClass::Peasant,
        demographics: Demographics {
            ethnicity: Ethnicity::Armenian,
            religion: Religion::ArmenianApostolic,
            language: Language::Armenian,
        },
        mood: Mood::Content,
        panic_level: 40.0,
        awareness_level: 0.0,
    };
    NpcRecord::new(NpcId::new(id), NpcRole::Street, stats, Vec3::new(x, 0.0, z), 0)
}

fn place_ring(sim: &mut Simulation) {
    for (i, d) in [2.0, 4.9, 5.0, 5.1, 10.0].into_iter().enumerate() {
        sim.registry_mut().insert(bystander(&format!("n{}", i), d, 0.0));
    }
}

#[test]
fn test_warn_reaches_exactly_those_within_radius() {
    let mut sim = empty_tile();
    place_ring(&mut sim);

    let outcome = sim.perform_action("warn", Vec3::new(0.0, 0.0, 0.0), &PlayerStats::default());
    assert!(outcome.success);

    let mut affected: Vec<String> = outcome.affected_ids.iter().map(|id| id.to_string()).collect();
    affected.sort();
    assert_eq!(affected, vec!["n0", "n1", "n2"]);

    let far = sim.registry().get(&NpcId::new("n4")).unwrap();
    assert_eq!(far.stats.awareness_level, 0.0);
    let near = sim.registry().get(&NpcId::new("n0")).unwrap();
    assert!(near.stats.awareness_level > 0.0);
    assert!(near.stats.panic_level > 40.0);
}

#[test]
fn test_radius_is_measured_on_the_ground_plane() {
    let mut sim = empty_tile();
    // Height does not count toward distance
    let mut high = bystander("roof", 3.0, 0.0);
    high.position.y = 30.0;
    sim.registry_mut().insert(high);

    let outcome = sim.perform_action("warn", Vec3::new(0.0, 0.0, 0.0), &PlayerStats::default());
    assert_eq!(outcome.affected_ids.len(), 1);
}

#[test]
fn test_cooldown_reports_remaining_seconds() {
    let mut sim = empty_tile();
    place_ring(&mut sim);

    assert!(sim.perform_action("warn", Vec3::default(), &PlayerStats::default()).success);

    // Warn cooldown is 30s; 25s later five remain
    sim.tick(25.0);
    let blocked = sim.perform_action("warn", Vec3::default(), &PlayerStats::default());
    assert!(!blocked.success);
    assert!(blocked.affected_ids.is_empty());
    assert!(blocked.message.contains("5 more seconds"), "{}", blocked.message);

    let gate = sim.can_execute(ActionId::Warn, &PlayerStats::default());
    assert!(!gate.available);

    sim.tick(5.0);
    assert!(sim.can_execute(ActionId::Warn, &PlayerStats::default()).available);
}

#[test]
fn test_blocked_action_queues_no_event() {
    let mut sim = empty_tile();
    place_ring(&mut sim);
    sim.perform_action("warn", Vec3::default(), &PlayerStats::default());
    sim.perform_action("warn", Vec3::default(), &PlayerStats::default());
    let events = sim.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].radius, 5.0);
}

#[test]
fn test_encourage_requires_charisma() {
    let mut sim = empty_tile();
    place_ring(&mut sim);

    let timid = PlayerStats { charisma: 1, ..Default::default() };
    let outcome = sim.perform_action("encourage", Vec3::default(), &timid);
    assert!(!outcome.success);
    assert!(outcome.message.contains("charisma"));
    assert!(sim.drain_events().is_empty());
}

#[test]
fn test_certain_encouragement_calms_everyone_in_range() {
    let mut sim = empty_tile();
    place_ring(&mut sim);

    // 0.5 + 5 * 0.1 caps the chance at 1
    let orator = PlayerStats { charisma: 5, ..Default::default() };
    let outcome = sim.perform_action("encourage", Vec3::default(), &orator);
    assert!(outcome.success);
    // Encourage reaches 4 units: only the bystander at 2.0
    assert_eq!(outcome.affected_ids, vec![NpcId::new("n0")]);
    for id in &outcome.affected_ids {
        let npc = sim.registry().get(id).unwrap();
        assert_eq!(npc.stats.mood, Mood::Calm);
        assert!(npc.stats.panic_level < 40.0);
    }
}

#[test]
fn test_observe_touches_nobody() {
    let mut sim = empty_tile();
    place_ring(&mut sim);
    let before: Vec<_> = sim.registry().records().to_vec();

    let outcome = sim.perform_action("observe", Vec3::default(), &PlayerStats::default());
    assert!(outcome.success);
    assert!(outcome.affected_ids.is_empty());
    assert_eq!(sim.registry().records(), before.as_slice());
}

#[test]
fn test_unknown_action_fails_gracefully() {
    let mut sim = empty_tile();
    let outcome = sim.perform_action("quarantine", Vec3::default(), &PlayerStats::default());
    assert!(!outcome.success);
    assert!(outcome.message.contains("not implemented"));
}

#[test]
fn test_empty_tile_warn_finds_nobody() {
    let mut sim = empty_tile();
    let outcome = sim.perform_action("warn", Vec3::default(), &PlayerStats::default());
    assert!(!outcome.success);
    assert!(outcome.affected_ids.is_empty());
}

#[test]
fn test_new_npc_is_visible_to_the_next_action() {
    let mut sim = empty_tile();
    sim.tick(0.1);
    sim.registry_mut().insert(bystander("late", 1.0, 1.0));

    let outcome = sim.perform_action("warn", Vec3::default(), &PlayerStats::default());
    assert_eq!(outcome.affected_ids, vec![NpcId::new("late")]);
}
