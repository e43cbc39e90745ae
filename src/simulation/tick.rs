//! Simulation context and throttled per-frame update
//!
//! Ordering within one update:
//! 1. Plague transitions resolve for every NPC
//! 2. Building infection is recomputed from the resolved states
//! 3. The agent index is rebuilt if due or if the population changed
//!
//! `perform_action` rebuilds a stale index before querying it.

use serde::Serialize;

use crate::actions::broadcast::{self, ActionOutcome, PlayerActionEvent};
use crate::actions::catalog::{ActionAvailability, ActionId, Cooldowns, PlayerStats};
use crate::city::building::{BuildingEntry, BuildingInfectionState, BuildingMetadata};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::rng::DeterministicRng;
use crate::core::types::{BuildingId, NpcId, SimClock, SimHours, SimSeconds, Vec3};
use crate::entity::npc::NpcRecord;
use crate::entity::plague::{PlagueStage, Transition};
use crate::simulation::registry::{AgentEntry, NpcRegistry, NpcSnapshot};
use crate::spatial::SpatialHash;

/// Stream offset for action rolls
const ACTION_STREAM_OFFSET: u32 = 101;

/// Fires at most once per interval of clock seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throttle {
    interval: SimSeconds,
    last: Option<SimSeconds>,
}

impl Throttle {
    pub fn new(interval: SimSeconds) -> Self {
        Self {
            interval: interval.max(0.0),
            last: None,
        }
    }

    /// True when due; records `now` as the last firing
    pub fn ready(&mut self, now: SimSeconds) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now - last >= self.interval,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    /// Make the next `ready` call fire
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// What one update did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub transitions: Vec<(NpcId, Transition)>,
    pub aggregates_refreshed: bool,
    pub index_rebuilt: bool,
}

impl TickReport {
    pub fn deaths(&self) -> usize {
        self.transitions
            .iter()
            .filter(|(_, t)| t.to == PlagueStage::Deceased)
            .count()
    }
}

#[derive(Serialize)]
struct WorldSnapshot<'a> {
    sim_hours: SimHours,
    tile_seed: u32,
    district: &'a str,
    npcs: Vec<NpcSnapshot<'a>>,
    buildings: Vec<(&'a BuildingId, BuildingInfectionState)>,
}

/// Owns everything the plague layer needs for one active tile
pub struct Simulation {
    config: SimulationConfig,
    clock: SimClock,
    tile_seed: u32,
    district: String,
    registry: NpcRegistry,
    agents: SpatialHash<AgentEntry>,
    buildings: SpatialHash<BuildingEntry>,
    /// Registry generation the agent index was built from
    indexed_generation: Option<u64>,
    index_throttle: Throttle,
    aggregate_throttle: Throttle,
    cooldowns: Cooldowns,
    action_rng: DeterministicRng,
    events: Vec<PlayerActionEvent>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            clock: SimClock::new(config.seconds_per_sim_hour),
            tile_seed: 0,
            district: String::new(),
            registry: NpcRegistry::new(0, config.plague.clone()),
            agents: SpatialHash::new(config.agent_cell_size),
            buildings: SpatialHash::new(config.building_cell_size),
            indexed_generation: None,
            index_throttle: Throttle::new(config.index_rebuild_interval_secs),
            aggregate_throttle: Throttle::new(config.aggregate_interval_secs),
            cooldowns: Cooldowns::new(),
            action_rng: DeterministicRng::new(0u32).fork(ACTION_STREAM_OFFSET),
            events: Vec::new(),
            config,
        })
    }

    /// Replace the active tile. Persistent NPCs from the previous tile come along.
    pub fn load_tile(
        &mut self,
        buildings: &[BuildingMetadata],
        district: &str,
        tile_seed: u32,
    ) -> Result<()> {
        let mut registry = NpcRegistry::create_for_tile(
            buildings,
            district,
            self.clock.hours(),
            tile_seed,
            self.config.street_npc_count,
            &self.config,
        )?;

        let carried = self.unload_tile();
        registry.adopt_persistent(carried);
        registry.refresh_infection();

        self.registry = registry;
        self.tile_seed = tile_seed;
        self.district = district.to_string();
        self.action_rng = DeterministicRng::new(tile_seed).fork(ACTION_STREAM_OFFSET);
        self.buildings = SpatialHash::build(
            self.config.building_cell_size,
            buildings.iter().map(BuildingEntry::from),
        );
        self.rebuild_agent_index();
        self.aggregate_throttle.reset();
        Ok(())
    }

    /// Drop the active tile, returning its persistent NPCs
    pub fn unload_tile(&mut self) -> Vec<NpcRecord> {
        let registry = std::mem::replace(
            &mut self.registry,
            NpcRegistry::new(self.tile_seed, self.config.plague.clone()),
        );
        self.agents.clear();
        self.buildings.clear();
        self.indexed_generation = None;
        let carried = registry.unload();
        if !carried.is_empty() {
            tracing::debug!("Unloaded tile {}, carrying {} NPCs", self.tile_seed, carried.len());
        }
        carried
    }

    /// Advance the clock by `dt` seconds and run whatever is due
    pub fn tick(&mut self, dt: SimSeconds) -> TickReport {
        self.clock.advance(dt);
        let now = self.clock.seconds();
        let mut report = TickReport::default();

        if self.aggregate_throttle.ready(now) {
            report.transitions = self.registry.advance(self.clock.hours());
            self.registry.refresh_infection();
            report.aggregates_refreshed = true;
        }

        let index_due = self.index_throttle.ready(now);
        if index_due || self.index_is_stale() || report.deaths() > 0 {
            self.rebuild_agent_index();
            report.index_rebuilt = true;
        }

        report
    }

    fn index_is_stale(&self) -> bool {
        self.indexed_generation != Some(self.registry.generation())
    }

    fn rebuild_agent_index(&mut self) {
        self.agents.rebuild(self.registry.agent_entries());
        self.indexed_generation = Some(self.registry.generation());
        tracing::debug!(
            "Rebuilt agent index: {} entries in {} cells",
            self.agents.len(),
            self.agents.occupied_cells()
        );
    }

    /// Gate check only; nothing changes
    pub fn can_execute(&self, action: ActionId, stats: &PlayerStats) -> ActionAvailability {
        broadcast::can_execute(action, stats, &self.cooldowns, self.clock.seconds())
    }

    /// Parse, gate, query and apply a player action
    pub fn perform_action(
        &mut self,
        action: &str,
        player_pos: Vec3,
        stats: &PlayerStats,
    ) -> ActionOutcome {
        let Ok(id) = action.parse::<ActionId>() else {
            tracing::warn!("Unknown action requested: {}", action);
            return ActionOutcome::not_implemented(action);
        };

        let gate = self.can_execute(id, stats);
        if !gate.available {
            return ActionOutcome::failure(gate.reason.unwrap_or_default());
        }

        if self.index_is_stale() {
            self.rebuild_agent_index();
        }

        let now = self.clock.seconds();
        let outcome = broadcast::execute(
            id,
            player_pos,
            stats,
            &self.agents,
            &mut self.registry,
            &mut self.action_rng,
        );

        let def = id.definition();
        self.cooldowns.start(id, now);
        self.events.push(PlayerActionEvent {
            action: id,
            position: player_pos,
            timestamp: now,
            effect: def.effect,
            radius: def.radius,
        });
        tracing::info!("{}: {}", id.label(), outcome.message);
        outcome
    }

    /// Hand queued action events to the render layer
    pub fn drain_events(&mut self) -> Vec<PlayerActionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn npcs_near(&self, center: Vec3, radius: f32) -> Vec<&AgentEntry> {
        self.agents.query_radius(center.ground(), radius)
    }

    pub fn buildings_near(&self, center: Vec3, radius: f32) -> Vec<&BuildingEntry> {
        self.buildings.query_radius(center.ground(), radius)
    }

    pub fn nearest_building(&self, center: Vec3, radius: f32) -> Option<&BuildingEntry> {
        self.buildings.nearest(center.ground(), radius)
    }

    /// Movement layer hook. Takes effect in queries after the next index rebuild.
    pub fn move_npc(&mut self, id: &NpcId, position: Vec3) -> bool {
        self.registry.set_position(id, position)
    }

    pub fn snapshot_json(&self) -> Result<String> {
        let mut buildings: Vec<_> = self
            .registry
            .infection_states()
            .iter()
            .map(|(id, state)| (id, *state))
            .collect();
        buildings.sort_by(|a, b| a.0.cmp(b.0));

        let snapshot = WorldSnapshot {
            sim_hours: self.clock.hours(),
            tile_seed: self.tile_seed,
            district: &self.district,
            npcs: self.registry.snapshots().collect(),
            buildings,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn tile_seed(&self) -> u32 {
        self.tile_seed
    }

    pub fn registry(&self) -> &NpcRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut NpcRegistry {
        &mut self.registry
    }

    pub fn agent_index(&self) -> &SpatialHash<AgentEntry> {
        &self.agents
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    pub fn building_infection(&self, id: &BuildingId) -> BuildingInfectionState {
        self.registry.building_infection(id)
    }
}
