//! Tile population, plague progression and the per-frame update

pub mod outbreak;
pub mod population;
pub mod registry;
pub mod tick;

pub use registry::{AgentEntry, NpcRegistry, NpcSnapshot};
pub use tick::{Simulation, Throttle, TickReport};
