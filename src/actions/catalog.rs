//! Player action definitions and catalog

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::types::SimSeconds;

/// Player-initiated broadcast actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionId {
    Warn,
    Encourage,
    Observe,
}

impl ActionId {
    pub const ALL: [ActionId; 3] = [ActionId::Warn, ActionId::Encourage, ActionId::Observe];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionId::Warn => "warn",
            ActionId::Encourage => "encourage",
            ActionId::Observe => "observe",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionId::Warn => "Warn",
            ActionId::Encourage => "Encourage",
            ActionId::Observe => "Observe",
        }
    }

    pub fn definition(&self) -> ActionDefinition {
        match self {
            ActionId::Warn => ActionDefinition {
                id: *self,
                radius: 5.0,
                cooldown_secs: 30.0,
                requirement: None,
                effect: EffectTag::WarningRipple,
            },
            ActionId::Encourage => ActionDefinition {
                id: *self,
                radius: 4.0,
                cooldown_secs: 45.0,
                requirement: Some(StatRequirement {
                    stat: PlayerStat::Charisma,
                    minimum: 2,
                }),
                effect: EffectTag::CalmingGlow,
            },
            ActionId::Observe => ActionDefinition {
                id: *self,
                radius: 8.0,
                cooldown_secs: 10.0,
                requirement: None,
                effect: EffectTag::ObserveFocus,
            },
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier with no matching definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl FromStr for ActionId {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        ActionId::ALL
            .into_iter()
            .find(|id| id.as_str() == key)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Visual effect the rendering layer plays for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTag {
    WarningRipple,
    CalmingGlow,
    ObserveFocus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStat {
    Charisma,
    Piety,
    Perception,
}

impl PlayerStat {
    pub fn label(&self) -> &'static str {
        match self {
            PlayerStat::Charisma => "charisma",
            PlayerStat::Piety => "piety",
            PlayerStat::Perception => "perception",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRequirement {
    pub stat: PlayerStat,
    pub minimum: u8,
}

/// Static definition of one action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub id: ActionId,
    pub radius: f32,
    pub cooldown_secs: SimSeconds,
    pub requirement: Option<StatRequirement>,
    pub effect: EffectTag,
}

/// The player's character sheet, as far as actions care
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub charisma: u8,
    pub piety: u8,
    pub perception: u8,
}

impl PlayerStats {
    pub fn get(&self, stat: PlayerStat) -> u8 {
        match stat {
            PlayerStat::Charisma => self.charisma,
            PlayerStat::Piety => self.piety,
            PlayerStat::Perception => self.perception,
        }
    }
}

/// Per-action cooldown end timestamps, in clock seconds
#[derive(Debug, Clone, Default)]
pub struct Cooldowns {
    ends: AHashMap<ActionId, SimSeconds>,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, action: ActionId, now: SimSeconds) {
        let cooldown = action.definition().cooldown_secs;
        self.set_end(action, now + cooldown);
    }

    pub fn set_end(&mut self, action: ActionId, end: SimSeconds) {
        self.ends.insert(action, end);
    }

    pub fn end_of(&self, action: ActionId) -> Option<SimSeconds> {
        self.ends.get(&action).copied()
    }

    /// Seconds left, or `None` when the action is ready
    pub fn remaining(&self, action: ActionId, now: SimSeconds) -> Option<SimSeconds> {
        self.end_of(action)
            .filter(|&end| now < end)
            .map(|end| end - now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionAvailability {
    pub available: bool,
    pub reason: Option<String>,
}

impl ActionAvailability {
    pub fn yes() -> Self {
        Self { available: true, reason: None }
    }

    pub fn no(reason: impl Into<String>) -> Self {
        Self { available: false, reason: Some(reason.into()) }
    }
}
