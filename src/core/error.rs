use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlagueError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Duplicate building id in tile: {0}")]
    DuplicateBuildingId(crate::core::types::BuildingId),

    #[error("Invalid building {id}: {reason}")]
    InvalidBuilding {
        id: crate::core::types::BuildingId,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlagueError>;
