//! Per-tick systems, invoked in a fixed order by the engine.

pub mod abilities;
pub mod area_effects;
pub mod boss_ai;
pub mod cleanup;
pub mod combat;
pub mod enemy_ai;
pub mod event_manager;
pub mod player;
pub mod pooled_update;
pub mod snapshot;
pub mod wave_scheduler;
