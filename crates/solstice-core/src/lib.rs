//! Core types and definitions for the SOLSTICE simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, state snapshots, events, constants, and the
//! authored content tables (skills, characters, upgrades, achievements).
//! It has no dependency on any runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod events;
pub mod progression;
pub mod skills;
pub mod state;
pub mod types;
