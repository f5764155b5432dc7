//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Game phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Menu,
    Playing,
    Paused,
    /// The player leveled up; the simulation is frozen until a choice
    /// from the published offer arrives.
    LevelUp,
    GameOver,
}

/// Enemy behavior archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Walks straight at the player.
    Chaser,
    /// Fast and frail.
    Swift,
    /// Slow, heavily armored.
    Tank,
    /// Keeps its distance and fires projectiles.
    Shooter,
    /// Stalks, winds up, then charges in a straight line.
    Charger,
    /// Hangs back and pulses healing to nearby enemies.
    Healer,
    /// Keeps its distance and summons chasers.
    Summoner,
    /// Chases and detonates on death or contact.
    Exploder,
}

/// Charger attack state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargePhase {
    /// Approaching until within charge range.
    #[default]
    Stalk,
    /// Telegraphing the charge (stationary).
    Windup,
    /// Dashing along the locked direction.
    Charge,
    /// Post-charge vulnerability window.
    Recover,
}

/// Boss attack pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossAttack {
    #[default]
    Chase,
    /// Ring of projectiles in all directions (phase 1).
    ShootRing,
    /// Aimed spread toward the player (phase 2).
    Barrage,
    /// Summons a pack of chasers (phase 2).
    Summon,
}

/// Skill identifier. Content lives in [`crate::skills`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillId {
    DivineLance,
    SpectralBlades,
    CelestialRay,
    ChainLightning,
    OrbitalShield,
    Vortex,
    StaticField,
    Sanctuary,
    Heal,
    Magnet,
    HealthRegen,
    CelestialPact,
    AegisShield,
    /// Fusion result of DivineLance + Vortex.
    VortexLances,
}

/// Skill execution category. One handler exists per kind, not per id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillKind {
    /// Fires pooled projectiles on a cooldown.
    Projectile,
    /// Fires a sampled beam toward the nearest enemy on a cooldown.
    Beam,
    /// Strikes the nearest enemy and arcs to further targets.
    Chain,
    /// Proxies revolving around the player; no cooldown gate.
    Orbital,
    /// Spawns an area effect on a cooldown.
    Area,
    /// Stat modifier recomputed on acquisition; no per-tick execution.
    Passive,
    /// One-shot effect applied at acquisition.
    Utility,
}

/// Evolution identifier (see `skills::EVOLUTIONS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionId {
    /// DivineLance + CelestialPact: lances steal life.
    LanceOfDawn,
    /// Vortex + Magnet: doubled pull, damage twice as often.
    Maelstrom,
    /// Sanctuary + HealthRegen: the zone also burns enemies.
    BlessedGround,
    /// OrbitalShield + AegisShield: heavier orbs.
    Bulwark,
}

/// Fusion identifier (see `skills::FUSIONS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FusionId {
    VortexLances,
}

/// Area effect variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaEffectKind {
    /// Pulls enemies inward and damages them periodically.
    Vortex,
    /// Slows enemies inside; light periodic damage.
    StaticField,
    /// Heals the player inside, slows enemies; burns when evolved.
    Sanctuary,
    /// One-shot expanding blast; damages each enemy inside exactly once.
    Explosion,
    /// Telegraphed impact point; converts to an Explosion after its delay.
    MeteorWarning,
}

/// Global event variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Meteors rain on random points for the duration.
    MeteorShower,
    /// XP pickups are worth double.
    GoldenFrenzy,
    /// World gravity is halved; restored exactly on expiry.
    GravityDistortion,
}

/// Power-up drop variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Damages every alive enemy on pickup.
    Nuke,
    /// Restores a fraction of max health on pickup.
    HealOrb,
}

/// Playable character (starting loadout).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterId {
    /// Balanced; starts with DivineLance.
    #[default]
    Seraph,
    /// Durable; starts with OrbitalShield.
    Cherub,
    /// Glass cannon; starts with CelestialRay.
    Archangel,
}

/// Permanent (between-match) upgrade identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UpgradeId {
    /// Max health bonus.
    Vitality,
    /// Damage bonus.
    Might,
    /// Currency bonus.
    Greed,
    /// Pickup radius bonus.
    Reach,
}

/// Achievement identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AchievementId {
    /// Defeat a boss.
    Herald,
    /// Reach wave 10 in one match.
    Decimation,
    /// 300 kills in one match.
    Reaper,
}

/// Wave scheduler state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Emitting enemies per the wave's composition.
    #[default]
    Spawning,
    /// All counts emitted and all spawned enemies dead.
    Cleared,
    /// Fixed-length cooldown before the next wave.
    Intermission,
}

/// Floating combat text variant (render hint only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloatingTextKind {
    #[default]
    Damage,
    Heal,
    Xp,
}
