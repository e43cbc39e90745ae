//! NPC registry for the active tile
//!
//! Records live in a dense arena; the id map stores arena slots. Building
//! infection is a fold over residents, cached and invalidated whenever a
//! resident's state or location changes.

use ahash::{AHashMap, AHashSet};
use serde::Serialize;

use crate::city::building::{BuildingInfectionState, BuildingMetadata};
use crate::core::config::{PlagueConfig, SimulationConfig};
use crate::core::error::{PlagueError, Result};
use crate::core::rng::DeterministicRng;
use crate::core::types::{BuildingId, NpcId, SimHours, Vec2, Vec3};
use crate::entity::npc::{Mood, NpcLocation, NpcRecord, NpcStats};
use crate::entity::plague::{HealthState, PlagueStage, PlagueType, Transition};
use crate::simulation::{outbreak, population};
use crate::spatial::Positioned;

/// Stream offset for contact exposures after creation
const EXPOSURE_STREAM_OFFSET: u32 = 31;

/// Position of a living NPC, as stored in the agent index
#[derive(Debug, Clone, PartialEq)]
pub struct AgentEntry {
    pub id: NpcId,
    pub slot: usize,
    pub position: Vec2,
}

impl Positioned for AgentEntry {
    fn ground_position(&self) -> Vec2 {
        self.position
    }
}

/// Read-only view handed to the rendering and UI layers
#[derive(Debug, Clone, Serialize)]
pub struct NpcSnapshot<'a> {
    pub id: &'a NpcId,
    pub name: &'a str,
    pub profession: &'a str,
    pub state: HealthState,
    pub stage: PlagueStage,
    pub location: NpcLocation,
    pub position: Vec3,
    pub home_building_id: Option<&'a BuildingId>,
    pub panic_level: f32,
    pub awareness_level: f32,
}

#[derive(Debug, Clone)]
pub struct NpcRegistry {
    records: Vec<NpcRecord>,
    slots: AHashMap<NpcId, usize>,
    building_ids: Vec<BuildingId>,
    /// Lookup for `building_ids`; homes outside it are dangling
    known_buildings: AHashSet<BuildingId>,
    infection: AHashMap<BuildingId, BuildingInfectionState>,
    infection_dirty: bool,
    /// Bumped whenever records are added or removed
    generation: u64,
    plague_config: PlagueConfig,
    exposure_rng: DeterministicRng,
}

impl NpcRegistry {
    pub fn new(tile_seed: u32, plague_config: PlagueConfig) -> Self {
        Self {
            records: Vec::new(),
            slots: AHashMap::new(),
            building_ids: Vec::new(),
            known_buildings: AHashSet::new(),
            infection: AHashMap::new(),
            infection_dirty: true,
            generation: 0,
            plague_config,
            exposure_rng: DeterministicRng::new(tile_seed).fork(EXPOSURE_STREAM_OFFSET),
        }
    }

    /// Populate a freshly generated tile.
    ///
    /// Buildings are validated here, at the boundary; nothing downstream fails.
    /// Outbreak seeding only happens at session start.
    pub fn create_for_tile(
        buildings: &[BuildingMetadata],
        district: &str,
        sim_hours: SimHours,
        tile_seed: u32,
        street_count: u32,
        config: &SimulationConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut seen = AHashSet::new();
        for building in buildings {
            building.validate()?;
            if !seen.insert(&building.id) {
                return Err(PlagueError::DuplicateBuildingId(building.id.clone()));
            }
        }

        let mut registry = Self::new(tile_seed, config.plague.clone());
        registry.set_buildings(buildings.iter().map(|b| b.id.clone()).collect());

        for building in buildings {
            for record in population::spawn_household(building, district, config) {
                registry.insert(record);
            }
        }

        let origin = population::tile_origin(buildings);
        for record in population::spawn_street_population(origin, district, tile_seed, street_count, config) {
            registry.insert(record);
        }

        if sim_hours <= config.session_start_hours && !registry.is_empty() {
            outbreak::seed_outbreak(&mut registry, sim_hours, tile_seed);
        }

        registry.refresh_infection();

        tracing::info!(
            "Loaded tile {} ({}): {} buildings, {} NPCs, {} infected",
            tile_seed,
            district,
            buildings.len(),
            registry.len(),
            registry.count_in_state(HealthState::Infected)
        );

        Ok(registry)
    }

    fn set_buildings(&mut self, ids: Vec<BuildingId>) {
        self.known_buildings = ids.iter().cloned().collect();
        self.building_ids = ids;
        self.infection_dirty = true;
    }

    /// Insert or replace by id. Returns the arena slot, or `None` when the
    /// id belongs to a deceased NPC: death is final and is never overwritten.
    pub fn insert(&mut self, record: NpcRecord) -> Option<usize> {
        if let Some(&slot) = self.slots.get(&record.id) {
            if self.records[slot].state() == HealthState::Deceased {
                tracing::warn!("Refusing to replace deceased NPC {}", record.id);
                return None;
            }
            self.records[slot] = record;
            self.touch();
            return Some(slot);
        }
        let slot = self.records.len();
        self.slots.insert(record.id.clone(), slot);
        self.records.push(record);
        self.touch();
        Some(slot)
    }

    fn touch(&mut self) {
        self.infection_dirty = true;
        self.generation += 1;
    }

    /// Re-insert persistent NPCs carried over from a previous tile.
    /// A carried record wins over a living generated one with the same id.
    pub fn adopt_persistent(&mut self, carried: Vec<NpcRecord>) {
        for record in carried {
            tracing::debug!("Carrying persistent NPC {} into tile", record.id);
            self.insert(record);
        }
    }

    /// Tear down the tile, keeping only non-ephemeral records
    pub fn unload(self) -> Vec<NpcRecord> {
        self.records.into_iter().filter(|r| !r.is_ephemeral).collect()
    }

    pub fn mark_persistent(&mut self, id: &NpcId) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                record.is_ephemeral = false;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn records(&self) -> &[NpcRecord] {
        &self.records
    }

    pub fn get(&self, id: &NpcId) -> Option<&NpcRecord> {
        self.slots.get(id).map(|&slot| &self.records[slot])
    }

    pub fn slot_of(&self, id: &NpcId) -> Option<usize> {
        self.slots.get(id).copied()
    }

    pub(crate) fn get_mut(&mut self, id: &NpcId) -> Option<&mut NpcRecord> {
        let slot = *self.slots.get(id)?;
        self.records.get_mut(slot)
    }

    pub(crate) fn record_at_mut(&mut self, slot: usize) -> Option<&mut NpcRecord> {
        self.records.get_mut(slot)
    }

    /// Whether `building` is part of the loaded tile
    pub fn knows_building(&self, building: &BuildingId) -> bool {
        self.known_buildings.contains(building)
    }

    // Mood, panic and awareness are the only attributes gameplay may change

    pub fn raise_panic(&mut self, id: &NpcId, amount: f32) -> bool {
        self.with_living_stats(id, |stats| stats.raise_panic(amount))
    }

    pub fn raise_awareness(&mut self, id: &NpcId, amount: f32) -> bool {
        self.with_living_stats(id, |stats| stats.raise_awareness(amount))
    }

    pub fn set_mood(&mut self, id: &NpcId, mood: Mood) -> bool {
        self.with_living_stats(id, |stats| stats.mood = mood)
    }

    fn with_living_stats(&mut self, id: &NpcId, f: impl FnOnce(&mut NpcStats)) -> bool {
        match self.get_mut(id) {
            Some(record) if record.is_alive() => {
                f(&mut record.stats);
                true
            }
            _ => false,
        }
    }

    pub fn plague_config(&self) -> &PlagueConfig {
        &self.plague_config
    }

    pub fn count_in_state(&self, state: HealthState) -> usize {
        self.records.iter().filter(|r| r.state() == state).count()
    }

    pub fn count_alive(&self) -> usize {
        self.records.iter().filter(|r| r.is_alive()).count()
    }

    pub fn residents_of<'a>(&'a self, building: &'a BuildingId) -> impl Iterator<Item = &'a NpcRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.home_building_id.as_ref() == Some(building))
    }

    /// Positions of living NPCs for the agent index
    pub fn agent_entries(&self) -> impl Iterator<Item = AgentEntry> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_alive())
            .map(|(slot, r)| AgentEntry {
                id: r.id.clone(),
                slot,
                position: r.position.ground(),
            })
    }

    pub fn snapshots(&self) -> impl Iterator<Item = NpcSnapshot<'_>> + '_ {
        self.records.iter().map(|r| NpcSnapshot {
            id: &r.id,
            name: &r.stats.name,
            profession: &r.stats.profession,
            state: r.state(),
            stage: r.plague().stage,
            location: r.location,
            position: r.position,
            home_building_id: r.home_building_id.as_ref(),
            panic_level: r.stats.panic_level,
            awareness_level: r.stats.awareness_level,
        })
    }

    /// Movement layer reports a new position. Deceased NPCs stay where they fell.
    pub fn set_position(&mut self, id: &NpcId, position: Vec3) -> bool {
        match self.get_mut(id) {
            Some(record) if record.is_alive() && position.is_finite() => {
                record.position = position;
                true
            }
            _ => false,
        }
    }

    pub fn set_location(&mut self, id: &NpcId, location: NpcLocation) -> bool {
        let Some(record) = self.get_mut(id) else {
            return false;
        };
        if !record.is_alive() || record.location == location {
            return false;
        }
        record.location = location;
        self.infection_dirty = true;
        true
    }

    /// Contact exposure from the excluded contagion layer
    pub fn expose(&mut self, id: &NpcId, now: SimHours, plague_type: PlagueType) -> bool {
        let Some(&slot) = self.slots.get(id) else {
            return false;
        };
        let record = &mut self.records[slot];
        let exposed = record
            .plague_mut()
            .expose(now, plague_type, &mut self.exposure_rng, &self.plague_config);
        if exposed {
            tracing::debug!("{} exposed to {:?} plague at {:.2}h", id, plague_type, now);
        }
        exposed
    }

    /// Remove a body from gameplay; the home building stops reporting the death
    pub fn clear_body(&mut self, id: &NpcId) -> bool {
        let Some(record) = self.get_mut(id) else {
            return false;
        };
        if record.state() != HealthState::Deceased || record.body_cleared {
            return false;
        }
        record.body_cleared = true;
        self.infection_dirty = true;
        true
    }

    /// Resolve all plague transitions due at `now`
    pub fn advance(&mut self, now: SimHours) -> Vec<(NpcId, Transition)> {
        let mut transitions = Vec::new();
        for record in self.records.iter_mut() {
            if let Some(t) = record.advance_plague(now) {
                if t.to == PlagueStage::Deceased {
                    let home_known = record
                        .home_building_id
                        .as_ref()
                        .is_some_and(|home| self.known_buildings.contains(home));
                    record.died_at_home &= home_known;
                    tracing::debug!("{} ({}) died of plague at {:.2}h", record.id, record.stats.name, now);
                }
                transitions.push((record.id.clone(), t));
            }
        }
        if transitions
            .iter()
            .any(|(_, t)| t.from.health() != t.to.health())
        {
            self.infection_dirty = true;
        }
        transitions
    }

    /// Pure fold over the residents of one building
    pub fn compute_building_infection(&self, building: &BuildingId) -> BuildingInfectionState {
        if !self.knows_building(building) {
            return BuildingInfectionState::Clear;
        }
        let mut status = BuildingInfectionState::Clear;
        for record in self.residents_of(building) {
            match resident_contribution(record) {
                BuildingInfectionState::Infected => return BuildingInfectionState::Infected,
                BuildingInfectionState::Deceased => status = BuildingInfectionState::Deceased,
                BuildingInfectionState::Clear => {}
            }
        }
        status
    }

    /// Rebuild the per-building cache if anything relevant changed
    pub fn refresh_infection(&mut self) -> bool {
        if !self.infection_dirty {
            return false;
        }
        let mut states: AHashMap<BuildingId, BuildingInfectionState> = self
            .building_ids
            .iter()
            .map(|id| (id.clone(), BuildingInfectionState::Clear))
            .collect();

        for record in &self.records {
            // Dangling homes are no data, not a building to report on
            let Some(entry) = record.home_building_id.as_ref().and_then(|home| states.get_mut(home)) else {
                continue;
            };
            *entry = merge(*entry, resident_contribution(record));
        }

        self.infection = states;
        self.infection_dirty = false;
        true
    }

    /// Cached status; unknown ids read as `Clear`
    pub fn building_infection(&self, building: &BuildingId) -> BuildingInfectionState {
        if self.infection_dirty {
            return self.compute_building_infection(building);
        }
        self.infection.get(building).copied().unwrap_or_default()
    }

    /// All cached statuses, for the infected-building markers
    pub fn infection_states(&self) -> &AHashMap<BuildingId, BuildingInfectionState> {
        &self.infection
    }

    pub fn infected_buildings(&self) -> Vec<BuildingId> {
        let mut ids: Vec<BuildingId> = self
            .building_ids
            .iter()
            .filter(|id| self.building_infection(id) == BuildingInfectionState::Infected)
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

fn resident_contribution(record: &NpcRecord) -> BuildingInfectionState {
    match record.state() {
        HealthState::Infected if record.location == NpcLocation::Interior => {
            BuildingInfectionState::Infected
        }
        HealthState::Deceased if record.died_at_home && !record.body_cleared => {
            BuildingInfectionState::Deceased
        }
        _ => BuildingInfectionState::Clear,
    }
}

/// Infected outranks deceased outranks clear
fn merge(a: BuildingInfectionState, b: BuildingInfectionState) -> BuildingInfectionState {
    use BuildingInfectionState::*;
    match (a, b) {
        (Infected, _) | (_, Infected) => Infected,
        (Deceased, _) | (_, Deceased) => Deceased,
        _ => Clear,
    }
}
