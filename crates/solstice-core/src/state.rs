//! Game state snapshot — the complete visible state sent to the frontend
//! each tick. Read-only for the renderer; nothing here mutates the sim.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{AudioEvent, ProfileEvent};
use crate::types::SimTime;

/// Complete game state broadcast to the frontend after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub player: PlayerView,
    pub camera: CameraView,
    pub enemies: Vec<EnemyView>,
    pub boss: Option<BossView>,
    pub projectiles: Vec<ProjectileView>,
    pub enemy_projectiles: Vec<ProjectileView>,
    pub xp_orbs: Vec<XpOrbView>,
    pub power_ups: Vec<PowerUpView>,
    pub floating_texts: Vec<FloatingTextView>,
    pub particles: Vec<ParticleView>,
    pub area_effects: Vec<AreaEffectView>,
    pub orbitals: Vec<OrbitalView>,
    pub wave: WaveView,
    pub event: EventView,
    pub level_up: Option<LevelUpOffer>,
    pub score: ScoreView,
    pub audio_events: Vec<AudioEvent>,
    pub profile_events: Vec<ProfileEvent>,
}

/// Player state for HUD and rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: Vec2,
    pub radius: f32,
    pub facing: f32,
    pub health: f32,
    pub max_health: f32,
    pub xp: f32,
    pub xp_to_next: f32,
    pub level: u32,
    /// 0.0 = ready, 1.0 = just used.
    pub dash_cooldown_frac: f32,
    pub dashing: bool,
    pub invincible: bool,
    pub shield_ready: bool,
    pub skills: Vec<SkillView>,
}

/// Per-skill HUD entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillView {
    pub id: SkillId,
    pub level: u32,
    pub evolved: bool,
    /// 0.0 = ready, 1.0 = just fired. Always 0.0 for ungated kinds.
    pub cooldown_frac: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraView {
    pub position: Vec2,
    pub shake: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub position: Vec2,
    pub radius: f32,
    pub kind: EnemyKind,
    pub elite: bool,
    pub health_frac: f32,
    /// Charger telegraph for the renderer.
    pub charging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossView {
    pub position: Vec2,
    pub radius: f32,
    pub phase: u8,
    pub health_frac: f32,
    pub attack: BossAttack,
}

/// A pooled projectile (player or enemy owned).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub position: Vec2,
    pub radius: f32,
    /// Present for beam-shaped projectiles.
    pub beam: Option<BeamView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamView {
    pub angle: f32,
    pub length: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpOrbView {
    pub position: Vec2,
    pub value: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpView {
    pub position: Vec2,
    pub kind: PowerUpKind,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingTextView {
    pub position: Vec2,
    pub value: f32,
    pub kind: FloatingTextKind,
    /// Remaining life fraction for fade-out.
    pub life_frac: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleView {
    pub position: Vec2,
    pub size: f32,
    pub life_frac: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaEffectView {
    pub position: Vec2,
    pub kind: AreaEffectKind,
    pub radius: f32,
    pub remaining_frac: f32,
    pub evolved: bool,
}

/// One orbital orb's world position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitalView {
    pub skill: SkillId,
    pub position: Vec2,
    pub angle: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveView {
    pub number: u32,
    pub phase: WavePhase,
    pub is_boss_wave: bool,
    /// Spawned-but-alive plus not-yet-spawned count.
    pub remaining: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventView {
    pub active: Option<EventKind>,
    pub remaining_secs: f32,
}

/// The published level-up offer while in the LevelUp phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelUpOffer {
    pub choices: Vec<LevelUpChoice>,
}

/// One selectable card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LevelUpChoice {
    /// Acquire the skill or raise its level by one.
    Skill { skill: SkillId, next_level: u32 },
    Evolution { evolution: EvolutionId },
    Fusion { fusion: FusionId },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreView {
    pub kills: u32,
    pub gems_earned: u64,
}
