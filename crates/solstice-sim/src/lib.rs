//! Headless simulation engine for SOLSTICE.
//!
//! Owns the ECS world, the spatial index, the object pools, and all
//! per-tick systems. Completely framework-free, enabling deterministic
//! testing: construct a [`engine::SimulationEngine`], queue commands,
//! call `tick()`.

pub mod engine;
pub mod pool;
pub mod pooled;
pub mod quadtree;
pub mod systems;
pub mod world_setup;

#[cfg(test)]
mod tests;
