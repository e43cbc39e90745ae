//! Building metadata as produced by world generation

use crate::core::error::{PlagueError, Result};
use crate::core::types::{BuildingId, Vec2, Vec3};
use crate::entity::npc::{Gender, SocialClass};
use crate::spatial::Positioned;
use serde::{Deserialize, Serialize};

/// Type of building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    Residential,
    Commercial,
    Religious,
    Civic,
    School,
    Medical,
}

impl BuildingType {
    /// Social class of the household that owns this kind of building
    pub fn owner_class(&self) -> SocialClass {
        match self {
            BuildingType::Religious => SocialClass::Clergy,
            BuildingType::Civic | BuildingType::Commercial => SocialClass::Merchant,
            _ => SocialClass::Peasant,
        }
    }

    pub fn is_religious(&self) -> bool {
        matches!(self, BuildingType::Religious)
    }
}

/// One generated building, consumed read-only by the NPC registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingMetadata {
    pub id: BuildingId,
    pub position: Vec3,
    pub building_type: BuildingType,
    pub owner_name: String,
    pub owner_profession: String,
    pub owner_gender: Gender,
    pub story_count: u8,
    pub size_scale: f32,
}

impl BuildingMetadata {
    /// Boundary check run at tile load
    pub fn validate(&self) -> Result<()> {
        if !self.position.is_finite() {
            return Err(PlagueError::InvalidBuilding {
                id: self.id.clone(),
                reason: "position is not finite".into(),
            });
        }
        if !(self.size_scale.is_finite() && self.size_scale > 0.0) {
            return Err(PlagueError::InvalidBuilding {
                id: self.id.clone(),
                reason: format!("size_scale {} must be positive", self.size_scale),
            });
        }
        Ok(())
    }
}

/// Building footprint as stored in the building index
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingEntry {
    pub id: BuildingId,
    pub position: Vec2,
    pub building_type: BuildingType,
}

impl From<&BuildingMetadata> for BuildingEntry {
    fn from(building: &BuildingMetadata) -> Self {
        Self {
            id: building.id.clone(),
            position: building.position.ground(),
            building_type: building.building_type,
        }
    }
}

impl Positioned for BuildingEntry {
    fn ground_position(&self) -> Vec2 {
        self.position
    }
}

/// Derived infection marker for a building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingInfectionState {
    #[default]
    Clear,
    Infected,
    Deceased,
}
