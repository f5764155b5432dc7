//! Events emitted by the simulation for audio feedback and persistence
//! checkpoints. Both are drained into each tick's snapshot.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Audio events for the frontend sound system (fire-and-forget).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AudioEvent {
    PlayerHit,
    PlayerDied,
    EnemyDied { kind: EnemyKind },
    BossSpawned,
    BossDied,
    BossPhaseTwo,
    LevelUp,
    SkillFired { skill: SkillId },
    Evolved { evolution: EvolutionId },
    Fused { fusion: FusionId },
    Explosion,
    XpCollected,
    PowerUpCollected { kind: PowerUpKind },
    WaveStarted { wave: u32 },
    EventStarted { event: EventKind },
    EventEnded { event: EventKind },
    ShieldBroken,
    Dash,
}

/// Persistence checkpoints. The persistence collaborator folds these into
/// the permanent player profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProfileEvent {
    CurrencyEarned { amount: u64 },
    AchievementUnlocked { id: AchievementId },
    MatchEnded {
        kills: u32,
        wave: u32,
        survived_secs: f64,
    },
}
