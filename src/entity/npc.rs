//! NPC records

use serde::{Deserialize, Serialize};

use crate::core::types::{BuildingId, NpcId, SimHours, Vec3};
use crate::demographics::Demographics;
use crate::entity::plague::{HealthState, PlagueMeta, PlagueStage, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialClass {
    Peasant,
    Merchant,
    Clergy,
    Nobility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Content,
    Calm,
    Anxious,
    Fearful,
    Grieving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcLocation {
    #[default]
    Outdoor,
    Interior,
}

/// Household role the NPC was created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcRole {
    Owner,
    Guest,
    Worshipper,
    Street,
}

/// Demographic and personal attributes.
///
/// Only `mood`, `panic_level` and `awareness_level` change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcStats {
    pub name: String,
    pub age: u8,
    pub profession: String,
    pub gender: Gender,
    pub social_class: SocialClass,
    pub demographics: Demographics,
    pub mood: Mood,
    /// 0..=100
    pub panic_level: f32,
    /// 0..=100, how much the NPC knows about the plague
    pub awareness_level: f32,
}

impl NpcStats {
    pub fn raise_panic(&mut self, amount: f32) {
        self.panic_level = (self.panic_level + amount).clamp(0.0, 100.0);
        self.refresh_mood();
    }

    pub fn raise_awareness(&mut self, amount: f32) {
        self.awareness_level = (self.awareness_level + amount).clamp(0.0, 100.0);
    }

    fn refresh_mood(&mut self) {
        if self.mood == Mood::Grieving {
            return;
        }
        self.mood = match self.panic_level {
            p if p >= 70.0 => Mood::Fearful,
            p if p >= 35.0 => Mood::Anxious,
            _ => self.mood,
        };
    }
}

/// One simulated inhabitant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcRecord {
    pub id: NpcId,
    pub role: NpcRole,
    pub stats: NpcStats,
    state: HealthState,
    plague: PlagueMeta,
    pub location: NpcLocation,
    /// Last known world position, written by the movement layer
    pub position: Vec3,
    /// Weak back-reference; `None` marks a street NPC
    pub home_building_id: Option<BuildingId>,
    /// Drives the daily schedule owned by the movement layer
    pub schedule_seed: u32,
    /// Discarded on tile unload when true
    pub is_ephemeral: bool,
    /// Whether the NPC was indoors at home when they died
    pub died_at_home: bool,
    /// Body removed by gameplay; the building stops reporting a death
    pub body_cleared: bool,
}

impl NpcRecord {
    pub fn new(id: NpcId, role: NpcRole, stats: NpcStats, position: Vec3, schedule_seed: u32) -> Self {
        Self {
            id,
            role,
            stats,
            state: HealthState::Healthy,
            plague: PlagueMeta::default(),
            location: NpcLocation::Outdoor,
            position,
            home_building_id: None,
            schedule_seed,
            is_ephemeral: true,
            died_at_home: false,
            body_cleared: false,
        }
    }

    pub fn state(&self) -> HealthState {
        self.state
    }

    pub fn plague(&self) -> &PlagueMeta {
        &self.plague
    }

    pub fn is_alive(&self) -> bool {
        self.state != HealthState::Deceased
    }

    pub fn is_street(&self) -> bool {
        self.home_building_id.is_none()
    }

    pub fn is_home(&self) -> bool {
        self.home_building_id.is_some() && self.location == NpcLocation::Interior
    }

    /// Replace plague timing wholesale (world seeding). Refused once deceased.
    pub fn set_plague(&mut self, meta: PlagueMeta) -> bool {
        if self.state == HealthState::Deceased {
            return false;
        }
        self.plague = meta;
        self.state = self.plague.health();
        true
    }

    /// Mutable plague access for the registry; state is resynced by `advance_plague`
    pub(crate) fn plague_mut(&mut self) -> &mut PlagueMeta {
        &mut self.plague
    }

    /// Move the plague clock forward and keep `state` in lockstep with it
    pub fn advance_plague(&mut self, now: SimHours) -> Option<Transition> {
        let transition = self.plague.advance(now)?;
        self.state = self.plague.health();
        if transition.to == PlagueStage::Deceased {
            self.died_at_home = self.is_home();
        }
        Some(transition)
    }

    /// `state` agrees with the plague stage and the stage's own timestamps
    pub fn is_consistent(&self) -> bool {
        self.state == self.plague.health() && self.plague.is_consistent()
    }
}
