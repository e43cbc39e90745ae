pub mod naming;
pub mod npc;
pub mod plague;
