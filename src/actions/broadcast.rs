//! Action broadcast: gate, query the agent index, apply the effect
//!
//! The radius query is shared plumbing; each action only supplies its effect
//! through the exhaustive match in [`apply_effect`].

use serde::Serialize;

use crate::actions::catalog::{
    ActionAvailability, ActionId, Cooldowns, EffectTag, PlayerStats,
};
use crate::core::rng::RandomSource;
use crate::core::types::{NpcId, SimSeconds, Vec3};
use crate::entity::npc::Mood;
use crate::simulation::registry::{AgentEntry, NpcRegistry};
use crate::spatial::SpatialHash;

const WARN_AWARENESS: f32 = 20.0;
const WARN_PANIC: f32 = 10.0;
const ENCOURAGE_CALM: f32 = 20.0;

/// Transient notification for visual and audio effects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerActionEvent {
    pub action: ActionId,
    pub position: Vec3,
    pub timestamp: SimSeconds,
    pub effect: EffectTag,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub affected_ids: Vec<NpcId>,
    pub message: String,
}

impl ActionOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            affected_ids: Vec::new(),
            message: message.into(),
        }
    }

    /// Identifier with no definition behind it
    pub fn not_implemented(action: &str) -> Self {
        Self::failure(format!("Action '{}' is not implemented", action))
    }
}

/// Chance that an encouragement lands
pub fn encourage_chance(stats: &PlayerStats) -> f64 {
    (0.5 + stats.charisma as f64 * 0.1).clamp(0.0, 1.0)
}

/// Cooldown first, then the stat gate
pub fn can_execute(
    action: ActionId,
    stats: &PlayerStats,
    cooldowns: &Cooldowns,
    now: SimSeconds,
) -> ActionAvailability {
    let def = action.definition();

    if let Some(remaining) = cooldowns.remaining(action, now) {
        let secs = remaining.ceil() as u64;
        return ActionAvailability::no(format!(
            "{} is on cooldown for {} more second{}",
            action.label(),
            secs,
            if secs == 1 { "" } else { "s" }
        ));
    }

    if let Some(req) = def.requirement {
        let have = stats.get(req.stat);
        if have < req.minimum {
            return ActionAvailability::no(format!(
                "{} requires {} {} (you have {})",
                action.label(),
                req.stat.label(),
                req.minimum,
                have
            ));
        }
    }

    ActionAvailability::yes()
}

/// Run an action against everyone in range. Gating is the caller's job.
pub fn execute<R: RandomSource + ?Sized>(
    action: ActionId,
    player_pos: Vec3,
    stats: &PlayerStats,
    index: &SpatialHash<AgentEntry>,
    registry: &mut NpcRegistry,
    rng: &mut R,
) -> ActionOutcome {
    let def = action.definition();

    // Entries may be stale by up to one rebuild interval; skip anyone who has died since
    let in_range: Vec<NpcId> = index
        .query_radius(player_pos.ground(), def.radius)
        .into_iter()
        .filter(|entry| registry.get(&entry.id).is_some_and(|r| r.is_alive()))
        .map(|entry| entry.id.clone())
        .collect();

    let outcome = apply_effect(action, in_range, stats, registry, rng);
    tracing::debug!(
        "{} at ({:.1}, {:.1}): success={} affected={}",
        action,
        player_pos.x,
        player_pos.z,
        outcome.success,
        outcome.affected_ids.len()
    );
    outcome
}

fn apply_effect<R: RandomSource + ?Sized>(
    action: ActionId,
    in_range: Vec<NpcId>,
    stats: &PlayerStats,
    registry: &mut NpcRegistry,
    rng: &mut R,
) -> ActionOutcome {
    match action {
        ActionId::Warn => {
            if in_range.is_empty() {
                return ActionOutcome::failure("No one is close enough to hear your warning.");
            }
            for id in &in_range {
                registry.raise_awareness(id, WARN_AWARENESS);
                registry.raise_panic(id, WARN_PANIC);
            }
            let count = in_range.len();
            ActionOutcome {
                success: true,
                message: format!(
                    "You warn {} {} about the pestilence.",
                    count,
                    if count == 1 { "person" } else { "people" }
                ),
                affected_ids: in_range,
            }
        }
        ActionId::Encourage => {
            // One roll for the whole broadcast, drawn even when nobody is near
            let landed = rng.next_f64() < encourage_chance(stats);
            if in_range.is_empty() {
                return ActionOutcome::failure("No one is nearby to encourage.");
            }
            if !landed {
                return ActionOutcome {
                    success: false,
                    message: "Your words fall flat; no one seems comforted.".to_string(),
                    affected_ids: in_range,
                };
            }
            for id in &in_range {
                registry.raise_panic(id, -ENCOURAGE_CALM);
                let grieving = registry.get(id).is_some_and(|r| r.stats.mood == Mood::Grieving);
                if !grieving {
                    registry.set_mood(id, Mood::Calm);
                }
            }
            ActionOutcome {
                success: true,
                message: format!("You steady the nerves of {} nearby.", in_range.len()),
                affected_ids: in_range,
            }
        }
        ActionId::Observe => ActionOutcome {
            success: true,
            affected_ids: Vec::new(),
            message: format!(
                "You take in the scene. {} {} within sight.",
                in_range.len(),
                if in_range.len() == 1 { "person is" } else { "people are" }
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PlagueConfig;
    use crate::core::rng::DeterministicRng;
    use crate::demographics::{Demographics, Ethnicity, Language, Religion};
    use crate::entity::npc::{Gender, NpcRecord, NpcRole, NpcStats, SocialClass};

    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn next_f64(&mut self) -> f64 {
            self.0
        }
    }

    fn npc(id: &str, x: f32) -> NpcRecord {
        let stats = NpcStats {
            name: id.to_string(),
            age: 30,
            profession: "Porter".into(),
            gender: Gender::Male,
            social_class: SocialClass::Peasant,
            demographics: Demographics {
                ethnicity: Ethnicity::Arab,
                religion: Religion::SunniIslam,
                language: Language::Arabic,
            },
            mood: Mood::Content,
            panic_level: 50.0,
            awareness_level: 0.0,
        };
        NpcRecord::new(NpcId::new(id), NpcRole::Street, stats, Vec3::new(x, 0.0, 0.0), 0)
    }

    fn setup(distances: &[f32]) -> (NpcRegistry, SpatialHash<AgentEntry>) {
        let mut registry = NpcRegistry::new(1, PlagueConfig::default());
        for (i, d) in distances.iter().enumerate() {
            registry.insert(npc(&format!("n{}", i), *d));
        }
        let index = SpatialHash::build(4.0, registry.agent_entries());
        (registry, index)
    }

    #[test]
    fn test_warn_radius_scenario() {
        let (mut registry, index) = setup(&[2.0, 4.9, 5.0, 5.1, 10.0]);
        let mut rng = DeterministicRng::new(0u32);
        let outcome = execute(
            ActionId::Warn,
            Vec3::new(0.0, 0.0, 0.0),
            &PlayerStats::default(),
            &index,
            &mut registry,
            &mut rng,
        );
        assert!(outcome.success);
        assert_eq!(outcome.affected_ids.len(), 3);
        assert!(outcome.message.contains('3'));
        let warned = registry.get(&NpcId::new("n0")).unwrap();
        assert_eq!(warned.stats.awareness_level, WARN_AWARENESS);
        let missed = registry.get(&NpcId::new("n3")).unwrap();
        assert_eq!(missed.stats.awareness_level, 0.0);
    }

    #[test]
    fn test_warn_with_nobody_in_range_fails() {
        let (mut registry, index) = setup(&[50.0]);
        let outcome = execute(
            ActionId::Warn,
            Vec3::default(),
            &PlayerStats::default(),
            &index,
            &mut registry,
            &mut Fixed(0.0),
        );
        assert!(!outcome.success);
        assert!(outcome.affected_ids.is_empty());
    }

    #[test]
    fn test_encourage_single_roll_decides_everyone() {
        let stats = PlayerStats { charisma: 2, ..Default::default() };
        assert!((encourage_chance(&stats) - 0.7).abs() < 1e-12);

        let (mut registry, index) = setup(&[1.0, 2.0, 3.0]);
        let outcome = execute(ActionId::Encourage, Vec3::default(), &stats, &index, &mut registry, &mut Fixed(0.69));
        assert!(outcome.success);
        assert_eq!(outcome.affected_ids.len(), 3);
        for r in registry.records() {
            assert_eq!(r.stats.panic_level, 30.0);
            assert_eq!(r.stats.mood, Mood::Calm);
        }

        let (mut registry, index) = setup(&[1.0, 2.0, 3.0]);
        let outcome = execute(ActionId::Encourage, Vec3::default(), &stats, &index, &mut registry, &mut Fixed(0.7));
        assert!(!outcome.success);
        // Still reports who was in range, but nobody was calmed
        assert_eq!(outcome.affected_ids.len(), 3);
        assert!(registry.records().iter().all(|r| r.stats.panic_level == 50.0));
    }

    #[test]
    fn test_broadcasts_touch_only_mood_panic_and_awareness() {
        let (mut registry, index) = setup(&[1.0, 2.0]);
        let before: Vec<NpcStats> = registry.records().iter().map(|r| r.stats.clone()).collect();
        let stats = PlayerStats { charisma: 3, ..Default::default() };
        execute(ActionId::Warn, Vec3::default(), &stats, &index, &mut registry, &mut Fixed(0.0));
        execute(ActionId::Encourage, Vec3::default(), &stats, &index, &mut registry, &mut Fixed(0.0));

        for (old, new) in before.iter().zip(registry.records()) {
            assert_eq!(new.stats.name, old.name);
            assert_eq!(new.stats.profession, old.profession);
            assert_eq!(new.stats.age, old.age);
            assert_eq!(new.stats.demographics, old.demographics);
            assert_eq!(new.stats.awareness_level, WARN_AWARENESS);
        }
    }

    #[test]
    fn test_encourage_leaves_the_grieving_grieving() {
        let mut registry = NpcRegistry::new(1, PlagueConfig::default());
        let mut mourner = npc("mourner", 1.0);
        mourner.stats.mood = Mood::Grieving;
        registry.insert(mourner);
        let index = SpatialHash::build(4.0, registry.agent_entries());
        let stats = PlayerStats { charisma: 3, ..Default::default() };

        let outcome = execute(ActionId::Encourage, Vec3::default(), &stats, &index, &mut registry, &mut Fixed(0.0));
        assert!(outcome.success);
        let after = registry.get(&NpcId::new("mourner")).unwrap();
        assert_eq!(after.stats.mood, Mood::Grieving);
        assert_eq!(after.stats.panic_level, 50.0 - ENCOURAGE_CALM);
    }

    #[test]
    fn test_observe_affects_nobody() {
        let (mut registry, index) = setup(&[1.0, 2.0]);
        let outcome = execute(
            ActionId::Observe,
            Vec3::default(),
            &PlayerStats::default(),
            &index,
            &mut registry,
            &mut Fixed(0.0),
        );
        assert!(outcome.success);
        assert!(outcome.affected_ids.is_empty());
        assert!(outcome.message.contains("2 people"));
    }

    #[test]
    fn test_cooldown_gate_reports_seconds_rounded_up() {
        let mut cooldowns = Cooldowns::new();
        cooldowns.set_end(ActionId::Warn, 100.0);
        let gate = can_execute(ActionId::Warn, &PlayerStats::default(), &cooldowns, 95.0);
        assert!(!gate.available);
        assert!(gate.reason.unwrap().contains("5 more seconds"));

        let gate = can_execute(ActionId::Warn, &PlayerStats::default(), &cooldowns, 95.5);
        assert!(gate.reason.unwrap().contains("5 more seconds"));

        let gate = can_execute(ActionId::Warn, &PlayerStats::default(), &cooldowns, 99.2);
        assert!(gate.reason.unwrap().contains("1 more second"));
    }

    #[test]
    fn test_stat_gate() {
        let cooldowns = Cooldowns::new();
        let weak = PlayerStats { charisma: 1, ..Default::default() };
        let gate = can_execute(ActionId::Encourage, &weak, &cooldowns, 0.0);
        assert!(!gate.available);
        assert!(gate.reason.unwrap().contains("charisma"));

        let strong = PlayerStats { charisma: 3, ..Default::default() };
        assert!(can_execute(ActionId::Encourage, &strong, &cooldowns, 0.0).available);
    }

    #[test]
    fn test_not_implemented_outcome() {
        let outcome = ActionOutcome::not_implemented("pray");
        assert!(!outcome.success);
        assert!(outcome.message.contains("not implemented"));
    }
}
