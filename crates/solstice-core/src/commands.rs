//! Player commands sent from the frontend to the simulation.
//!
//! Commands are validated and queued for processing at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Match control ---
    /// Start a new match with the chosen character.
    StartMatch { character: CharacterId },
    /// Pause the simulation.
    Pause,
    /// Resume from pause.
    Resume,
    /// Return to the menu, discarding the match.
    ReturnToMenu,

    // --- Input (normalized, once per tick) ---
    /// Movement vector with components in [-1, 1].
    SetMoveInput { x: f32, y: f32 },
    /// Jump press edge.
    Jump,
    /// Dash press edge.
    Dash,

    // --- Level-up choices (valid only in the LevelUp phase) ---
    /// Take or level the offered skill.
    ChooseSkill { skill: SkillId },
    /// Take the offered evolution.
    ChooseEvolution { evolution: EvolutionId },
    /// Take the offered fusion.
    ChooseFusion { fusion: FusionId },
}
