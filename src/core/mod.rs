pub mod config;
pub mod error;
pub mod rng;
pub mod types;

pub use config::SimulationConfig;
pub use rng::{DeterministicRng, RandomSource, SineRng};
