pub mod draw;
pub mod interactions;
pub mod plugin;
pub mod pop_effects;
pub mod setup;
pub mod simulation;
