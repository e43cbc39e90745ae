//! City layer - building metadata from world generation

pub mod building;

pub use building::{BuildingEntry, BuildingInfectionState, BuildingMetadata, BuildingType};
