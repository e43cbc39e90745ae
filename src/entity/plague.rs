//! Per-NPC plague state machine
//!
//! none -> exposed -> incubating -> infected -> {deceased | recovered}
//!
//! Transitions are driven purely by elapsed simulated hours. Exposure comes from
//! outside the core; everything after it is resolved by [`PlagueMeta::advance`].

use serde::{Deserialize, Serialize};

use crate::core::config::{ContagionProfile, PlagueConfig};
use crate::core::rng::RandomSource;
use crate::core::types::SimHours;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlagueType {
    #[default]
    None,
    Bubonic,
    Pneumonic,
}

/// Coarse health category shown to the rest of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    #[default]
    Healthy,
    Infected,
    Deceased,
    Recovered,
}

/// Fine-grained plague stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlagueStage {
    #[default]
    None,
    Exposed,
    Incubating,
    Infected,
    Deceased,
    Recovered,
}

impl PlagueStage {
    pub fn health(&self) -> HealthState {
        match self {
            PlagueStage::None | PlagueStage::Exposed | PlagueStage::Incubating => {
                HealthState::Healthy
            }
            PlagueStage::Infected => HealthState::Infected,
            PlagueStage::Deceased => HealthState::Deceased,
            PlagueStage::Recovered => HealthState::Recovered,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PlagueStage::Deceased | PlagueStage::Recovered)
    }
}

/// Plague timing for one NPC. All times are simulated hours.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlagueMeta {
    pub plague_type: PlagueType,
    pub stage: PlagueStage,
    pub exposure_time: Option<SimHours>,
    pub incubation_hours: Option<f64>,
    /// Scheduled symptom onset; exposure_time + incubation_hours
    pub onset_time: Option<SimHours>,
    /// Hours from onset until the case resolves
    pub illness_hours: Option<f64>,
    /// Whether the case resolves in death
    pub fatal: bool,
    /// Only set once the NPC has died
    pub death_time: Option<SimHours>,
    /// Only set once the NPC has recovered
    pub recovery_time: Option<SimHours>,
}

/// A state change produced by [`PlagueMeta::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PlagueStage,
    pub to: PlagueStage,
}

fn profile(config: &PlagueConfig, plague_type: PlagueType) -> &ContagionProfile {
    match plague_type {
        PlagueType::Pneumonic => &config.pneumonic,
        PlagueType::Bubonic | PlagueType::None => &config.bubonic,
    }
}

impl PlagueMeta {
    /// Pick a contagion type, one draw
    pub fn roll_type<R: RandomSource + ?Sized>(rng: &mut R, config: &PlagueConfig) -> PlagueType {
        if rng.chance(config.pneumonic_share) {
            PlagueType::Pneumonic
        } else {
            PlagueType::Bubonic
        }
    }

    /// Contact exposure. Pre-rolls the course of the disease (three draws).
    /// Returns false if the NPC was already exposed or beyond.
    pub fn expose<R: RandomSource + ?Sized>(
        &mut self,
        now: SimHours,
        plague_type: PlagueType,
        rng: &mut R,
        config: &PlagueConfig,
    ) -> bool {
        if self.stage != PlagueStage::None || plague_type == PlagueType::None {
            return false;
        }
        let p = profile(config, plague_type);
        let incubation = rng.range(p.incubation_hours.0, p.incubation_hours.1);
        let illness = rng.range(p.illness_hours.0, p.illness_hours.1);
        let fatal = rng.chance(p.mortality);

        *self = PlagueMeta {
            plague_type,
            stage: PlagueStage::Exposed,
            exposure_time: Some(now),
            incubation_hours: Some(incubation),
            onset_time: Some(now + incubation),
            illness_hours: Some(illness),
            fatal,
            death_time: None,
            recovery_time: None,
        };
        true
    }

    /// World-seeding entry point: symptomatic, fatal, with only a few hours left.
    pub fn seed_near_death<R: RandomSource + ?Sized>(
        now: SimHours,
        plague_type: PlagueType,
        rng: &mut R,
        config: &PlagueConfig,
    ) -> Self {
        let p = profile(config, plague_type);
        let incubation = rng.range(p.incubation_hours.0, p.incubation_hours.1);
        let illness = rng.range(p.illness_hours.0, p.illness_hours.1);
        let remaining = rng
            .range(config.near_death_remaining_hours.0, config.near_death_remaining_hours.1)
            .min(illness);
        let onset = now - (illness - remaining);
        PlagueMeta {
            plague_type,
            stage: PlagueStage::Infected,
            exposure_time: Some(onset - incubation),
            incubation_hours: Some(incubation),
            onset_time: Some(onset),
            illness_hours: Some(illness),
            fatal: true,
            death_time: None,
            recovery_time: None,
        }
    }

    /// World-seeding entry point: symptomatic somewhere inside the illness window.
    pub fn seed_infected<R: RandomSource + ?Sized>(
        now: SimHours,
        plague_type: PlagueType,
        rng: &mut R,
        config: &PlagueConfig,
    ) -> Self {
        let p = profile(config, plague_type);
        let incubation = rng.range(p.incubation_hours.0, p.incubation_hours.1);
        let illness = rng.range(p.illness_hours.0, p.illness_hours.1);
        let elapsed = rng.range(0.0, 0.5) * illness;
        let fatal = rng.chance(p.mortality);
        let onset = now - elapsed;
        PlagueMeta {
            plague_type,
            stage: PlagueStage::Infected,
            exposure_time: Some(onset - incubation),
            incubation_hours: Some(incubation),
            onset_time: Some(onset),
            illness_hours: Some(illness),
            fatal,
            death_time: None,
            recovery_time: None,
        }
    }

    /// World-seeding entry point: exposed some hours ago, onset still ahead.
    pub fn seed_incubating<R: RandomSource + ?Sized>(
        now: SimHours,
        plague_type: PlagueType,
        rng: &mut R,
        config: &PlagueConfig,
    ) -> Self {
        let p = profile(config, plague_type);
        let incubation = rng.range(p.incubation_hours.0, p.incubation_hours.1);
        let illness = rng.range(p.illness_hours.0, p.illness_hours.1);
        let elapsed = rng.range(0.1, 0.9) * incubation;
        let fatal = rng.chance(p.mortality);
        let exposure = now - elapsed;
        PlagueMeta {
            plague_type,
            stage: PlagueStage::Incubating,
            exposure_time: Some(exposure),
            incubation_hours: Some(incubation),
            onset_time: Some(exposure + incubation),
            illness_hours: Some(illness),
            fatal,
            death_time: None,
            recovery_time: None,
        }
    }

    pub fn health(&self) -> HealthState {
        self.stage.health()
    }

    /// Resolve every transition due at `now`, in order. Terminal stages never move.
    pub fn advance(&mut self, now: SimHours) -> Option<Transition> {
        let from = self.stage;
        loop {
            let next = match self.stage {
                PlagueStage::None | PlagueStage::Deceased | PlagueStage::Recovered => None,
                PlagueStage::Exposed => match self.exposure_time {
                    Some(t) if now >= t => Some(PlagueStage::Incubating),
                    _ => None,
                },
                PlagueStage::Incubating => match self.onset_time {
                    Some(t) if now >= t => Some(PlagueStage::Infected),
                    _ => None,
                },
                PlagueStage::Infected => match (self.onset_time, self.illness_hours) {
                    (Some(onset), Some(illness)) if now >= onset + illness => {
                        let at = onset + illness;
                        if self.fatal {
                            self.death_time = Some(at);
                            Some(PlagueStage::Deceased)
                        } else {
                            self.recovery_time = Some(at);
                            Some(PlagueStage::Recovered)
                        }
                    }
                    _ => None,
                },
            };
            match next {
                Some(stage) => self.stage = stage,
                None => break,
            }
        }
        (self.stage != from).then_some(Transition {
            from,
            to: self.stage,
        })
    }

    /// Timestamps agree with the stage
    pub fn is_consistent(&self) -> bool {
        if let (Some(exposure), Some(onset)) = (self.exposure_time, self.onset_time) {
            if onset < exposure {
                return false;
            }
        }
        if self.death_time.is_some() != (self.stage == PlagueStage::Deceased) {
            return false;
        }
        if self.recovery_time.is_some() != (self.stage == PlagueStage::Recovered) {
            return false;
        }
        match self.stage {
            PlagueStage::None => self.exposure_time.is_none(),
            _ => self.exposure_time.is_some() && self.plague_type != PlagueType::None,
        }
    }
}
