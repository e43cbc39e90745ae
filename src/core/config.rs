//! Simulation configuration with documented constants
//!
//! Plague rates here are authored values chosen for pacing, not calibrated
//! epidemiology. Everything is tunable and loaded from TOML when present.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{PlagueError, Result};

/// Timing and mortality for one contagion type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContagionProfile {
    /// Incubation length range in simulated hours
    pub incubation_hours: (f64, f64),
    /// Symptomatic illness length range in simulated hours (onset to outcome)
    pub illness_hours: (f64, f64),
    /// Probability that a case ends in death
    pub mortality: f64,
}

/// Plague rates and initial outbreak seeding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlagueConfig {
    pub bubonic: ContagionProfile,
    pub pneumonic: ContagionProfile,

    /// Chance a seeded case is pneumonic rather than bubonic
    pub pneumonic_share: f64,

    /// Hours of illness left for the guaranteed near-death case
    pub near_death_remaining_hours: (f64, f64),

    /// Extra infected cases beyond the guaranteed one, inclusive range
    pub extra_infected: (u32, u32),

    /// Incubating cases at session start, inclusive range
    pub incubating: (u32, u32),

    /// Stream offset for outbreak seeding, keeps it uncorrelated with creation
    pub seeding_stream_offset: u32,
}

impl Default for PlagueConfig {
    fn default() -> Self {
        Self {
            bubonic: ContagionProfile {
                incubation_hours: (48.0, 144.0),
                illness_hours: (72.0, 168.0),
                mortality: 0.6,
            },
            pneumonic: ContagionProfile {
                incubation_hours: (24.0, 72.0),
                illness_hours: (24.0, 72.0),
                mortality: 0.95,
            },
            pneumonic_share: 0.2,
            near_death_remaining_hours: (2.0, 12.0),
            extra_infected: (0, 1),
            incubating: (1, 4),
            seeding_stream_offset: 7919,
        }
    }
}

/// Configuration for the simulation core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === SPATIAL ===
    /// Cell size for the agent index (world units).
    ///
    /// Action radii of 4-8 units span one to three cells.
    pub agent_cell_size: f32,

    /// Cell size for the building index (world units)
    pub building_cell_size: f32,

    // === THROTTLES ===
    /// Minimum clock seconds between agent index rebuilds
    pub index_rebuild_interval_secs: f64,

    /// Minimum clock seconds between plague advance + building aggregate recompute
    pub aggregate_interval_secs: f64,

    // === POPULATION ===
    /// Unaffiliated street NPCs created per tile
    pub street_npc_count: u32,

    /// Chance that a non-religious building also houses a guest or servant
    pub guest_chance: f64,

    /// Worshippers spawned per religious building, inclusive range
    pub worshippers: (u32, u32),

    /// Street NPCs are scattered within this half-extent around the tile origin
    pub tile_half_extent: f32,

    // === TIME ===
    /// Clock seconds per simulated hour
    pub seconds_per_sim_hour: f64,

    /// Outbreak seeding only runs at or before this simulated hour
    pub session_start_hours: f64,

    // === PLAGUE ===
    pub plague: PlagueConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            agent_cell_size: 4.0,
            building_cell_size: 16.0,

            index_rebuild_interval_secs: 0.5,
            aggregate_interval_secs: 1.0,

            street_npc_count: 12,
            guest_chance: 0.5,
            worshippers: (3, 6),
            tile_half_extent: 60.0,

            seconds_per_sim_hour: 60.0,
            session_start_hours: 0.1,

            plague: PlagueConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.agent_cell_size > 0.0) || !(self.building_cell_size > 0.0) {
            return Err(PlagueError::InvalidConfig(
                "cell sizes must be positive".into(),
            ));
        }

        if !(self.seconds_per_sim_hour > 0.0) {
            return Err(PlagueError::InvalidConfig(
                "seconds_per_sim_hour must be positive".into(),
            ));
        }

        if self.index_rebuild_interval_secs < 0.0 || self.aggregate_interval_secs < 0.0 {
            return Err(PlagueError::InvalidConfig(
                "throttle intervals must not be negative".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.guest_chance) {
            return Err(PlagueError::InvalidConfig(format!(
                "guest_chance ({}) must be within [0, 1]",
                self.guest_chance
            )));
        }

        if self.worshippers.0 > self.worshippers.1 {
            return Err(PlagueError::InvalidConfig(format!(
                "worshippers range {:?} is inverted",
                self.worshippers
            )));
        }

        let plague = &self.plague;
        for (name, profile) in [("bubonic", &plague.bubonic), ("pneumonic", &plague.pneumonic)] {
            let (inc_lo, inc_hi) = profile.incubation_hours;
            let (ill_lo, ill_hi) = profile.illness_hours;
            if inc_lo <= 0.0 || inc_lo > inc_hi || ill_lo <= 0.0 || ill_lo > ill_hi {
                return Err(PlagueError::InvalidConfig(format!(
                    "{} hour ranges must be positive and ordered",
                    name
                )));
            }
            if !(0.0..=1.0).contains(&profile.mortality) {
                return Err(PlagueError::InvalidConfig(format!(
                    "{} mortality must be within [0, 1]",
                    name
                )));
            }
        }

        if plague.extra_infected.0 > plague.extra_infected.1
            || plague.incubating.0 > plague.incubating.1
        {
            return Err(PlagueError::InvalidConfig(
                "outbreak seeding ranges are inverted".into(),
            ));
        }

        let (nd_lo, nd_hi) = plague.near_death_remaining_hours;
        if nd_lo <= 0.0 || nd_lo > nd_hi {
            return Err(PlagueError::InvalidConfig(
                "near_death_remaining_hours must be positive and ordered".into(),
            ));
        }

        Ok(())
    }
}
