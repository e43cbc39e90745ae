//! Player actions broadcast to nearby NPCs

pub mod broadcast;
pub mod catalog;

pub use broadcast::{ActionOutcome, PlayerActionEvent};
pub use catalog::{ActionAvailability, ActionId, Cooldowns, PlayerStats};
