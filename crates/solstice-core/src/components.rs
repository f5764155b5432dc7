//! Component types attached to registry-owned entities.
//!
//! These are plain data; systems in the sim crate provide all behavior.
//! Entity identities are stored as `u64` bit-patterns so this crate stays
//! free of any ECS dependency.

use std::collections::{BTreeMap, HashSet};

use glam::Vec2;

use crate::enums::{
    AreaEffectKind, BossAttack, ChargePhase, CharacterId, EnemyKind, PowerUpKind, SkillId,
};

/// Cached stat modifiers derived from permanent upgrades, the character,
/// and held passives. Recomputed on acquisition/level-change, not per tick.
#[derive(Debug, Clone)]
pub struct StatModifiers {
    pub damage_mult: f32,
    pub xp_mult: f32,
    pub pickup_radius_mult: f32,
    pub max_health_mult: f32,
    pub speed_mult: f32,
    pub regen_per_sec: f32,
    /// Applied once at wave-composition generation, not per spawn.
    pub enemy_count_mult: f32,
    /// Shield recharge ticks; 0 means no shield passive held.
    pub shield_recharge: u32,
}

impl Default for StatModifiers {
    fn default() -> Self {
        Self {
            damage_mult: 1.0,
            xp_mult: 1.0,
            pickup_radius_mult: 1.0,
            max_health_mult: 1.0,
            speed_mult: 1.0,
            regen_per_sec: 0.0,
            enemy_count_mult: 1.0,
            shield_recharge: 0,
        }
    }
}

/// One orb of an orbital skill.
#[derive(Debug, Clone, Default)]
pub struct OrbitalOrb {
    /// Current angle around the player (radians).
    pub angle: f32,
    /// Unwrapped angle since the last hit-set reset; the set clears when
    /// this passes a full turn.
    pub swept: f32,
    /// Enemies hit during the current revolution (entity bit-patterns).
    pub hit: HashSet<u64>,
}

/// Per-skill runtime state.
#[derive(Debug, Clone, Default)]
pub struct SkillState {
    /// 1-based level, never above the authored max.
    pub level: u32,
    /// Ticks until the next execution (cooldown-gated kinds only).
    pub cooldown: u32,
    pub evolved: bool,
    /// Orbital proxies (orbital kind only).
    pub orbs: Vec<OrbitalOrb>,
}

/// The player.
#[derive(Debug, Clone)]
pub struct Player {
    pub character: CharacterId,
    pub health: f32,
    pub max_health: f32,
    pub radius: f32,
    pub velocity: Vec2,
    pub grounded: bool,
    /// Facing sign for aimless skills (+1 right, -1 left).
    pub facing: f32,
    pub coyote: u32,
    pub jump_buffer: u32,
    /// Remaining dash ticks; damage is ignored while nonzero.
    pub dash_timer: u32,
    pub dash_cooldown: u32,
    /// Locked dash direction.
    pub dash_dir: f32,
    /// Invincibility ticks after a hit.
    pub iframes: u32,
    /// Aegis shield: absorbs exactly one hit when ready.
    pub shield_ready: bool,
    pub shield_timer: u32,
    /// Knockback applied to the player (boss slams).
    pub knockback: Vec2,
    pub xp: f32,
    pub level: u32,
    pub xp_to_next: f32,
    /// Level-ups earned but not yet spent on a choice.
    pub pending_level_ups: u32,
    /// Deterministic iteration order matters wherever the RNG is involved.
    pub skills: BTreeMap<SkillId, SkillState>,
    pub modifiers: StatModifiers,
    /// Fractional regen carried between ticks.
    pub regen_accum: f32,
}

/// An enemy. Stats are computed at spawn from elapsed time, wave number,
/// and the elite multiplier.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub elite: bool,
    pub radius: f32,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub xp_value: f32,
    pub dead: bool,
    /// Strongest overlapping slow this tick (0.0 = none).
    pub slow: f32,
    pub knockback: Vec2,
    /// One-shot area effects that already damaged this enemy (effect ids).
    /// Entries are removed when the owning effect dies.
    pub hit_by: HashSet<u64>,
    /// Shooter/healer/summoner action countdown; charger phase timer.
    pub action_timer: u32,
    pub charge_phase: ChargePhase,
    /// Locked charge direction.
    pub charge_dir: Vec2,
}

/// Boss-only state, attached alongside [`Enemy`].
#[derive(Debug, Clone)]
pub struct Boss {
    /// 1 or 2; phase 2 starts below half health.
    pub phase: u8,
    pub attack: BossAttack,
    /// Ticks until the next pattern re-selection.
    pub pattern_timer: u32,
    /// Ticks until the current attack acts again.
    pub attack_timer: u32,
}

/// A floating area effect (vortex, field, zone, explosion, meteor mark).
#[derive(Debug, Clone)]
pub struct AreaEffect {
    pub kind: AreaEffectKind,
    /// Stable id used in enemy `hit_by` registries.
    pub id: u64,
    pub radius: f32,
    /// Target radius for expanding effects.
    pub max_radius: f32,
    /// Remaining lifetime in ticks.
    pub duration: u32,
    /// Ticks lived so far (periodic damage cadence).
    pub age: u32,
    pub damage: f32,
    pub slow: f32,
    pub pull: f32,
    pub regen_per_sec: f32,
    pub evolved: bool,
    pub dead: bool,
}

/// A rare pickup dropped by enemies.
#[derive(Debug, Clone)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub radius: f32,
    /// Remaining ticks before despawn.
    pub ttl: u32,
    pub dead: bool,
}
