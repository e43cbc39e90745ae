//! Plague City - agent simulation core for a plague-stricken medieval city

pub mod actions;
pub mod city;
pub mod core;
pub mod demographics;
pub mod entity;
pub mod simulation;
pub mod spatial;
