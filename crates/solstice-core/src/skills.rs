//! Authored skill content: per-level parameter tables, evolutions,
//! fusions, and character loadouts.
//!
//! The simulation consumes these tables as opaque configuration; behavior
//! is dispatched per [`SkillKind`], never per skill id.

use serde::{Deserialize, Serialize};

use crate::enums::{AreaEffectKind, CharacterId, EvolutionId, FusionId, SkillId, SkillKind};

/// Numeric parameters for one skill level. Unused fields stay at the
/// `NONE` defaults; which fields matter depends on the skill's kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SkillLevel {
    pub damage: f32,
    /// Projectiles per volley / orbital orb count.
    pub count: u32,
    /// Enemies a projectile may pass through beyond its first hit.
    pub pierce: u32,
    /// Projectile speed (px/tick).
    pub speed: f32,
    /// Area / orbital radius.
    pub radius: f32,
    /// Area effect lifetime (ticks).
    pub duration: u32,
    /// Beam length.
    pub length: f32,
    /// Beam width.
    pub width: f32,
    /// Chain jumps beyond the initial strike.
    pub chains: u32,
    /// Max distance of a chain jump.
    pub chain_radius: f32,
    /// Slow factor applied inside the area (0.0 = none, 1.0 = frozen).
    pub slow: f32,
    /// Inward pull acceleration (vortex).
    pub pull: f32,
    /// Healing inside a sanctuary / passive regen (hp per second).
    pub regen_per_sec: f32,
    /// Passive damage multiplier bonus (+0.15 = +15%).
    pub damage_bonus: f32,
    /// Passive XP gain multiplier bonus.
    pub xp_bonus: f32,
    /// Passive pickup radius multiplier.
    pub pickup_mult: f32,
    /// Passive enemy-count scaling (celestial pact tradeoff).
    pub enemy_count_bonus: f32,
    /// Shield recharge time (ticks); 0 = no shield.
    pub shield_recharge: u32,
    /// Instant heal fraction of max health (utility).
    pub heal_fraction: f32,
    /// Fused lances also drop a vortex on the nearest enemy.
    pub spawns_vortex: bool,
    /// Volley is distributed over a full circle instead of a forward fan.
    pub ring: bool,
}

impl SkillLevel {
    pub const NONE: SkillLevel = SkillLevel {
        damage: 0.0,
        count: 0,
        pierce: 0,
        speed: 0.0,
        radius: 0.0,
        duration: 0,
        length: 0.0,
        width: 0.0,
        chains: 0,
        chain_radius: 0.0,
        slow: 0.0,
        pull: 0.0,
        regen_per_sec: 0.0,
        damage_bonus: 0.0,
        xp_bonus: 0.0,
        pickup_mult: 1.0,
        enemy_count_bonus: 0.0,
        shield_recharge: 0,
        heal_fraction: 0.0,
        spawns_vortex: false,
        ring: false,
    };
}

/// Static definition of one skill.
#[derive(Debug, Clone, Copy)]
pub struct SkillDef {
    pub id: SkillId,
    pub kind: SkillKind,
    pub name: &'static str,
    /// Ticks between executions. Ignored for orbital/passive kinds.
    pub cooldown: u32,
    /// Which area effect an Area-kind skill spawns.
    pub area_kind: Option<AreaEffectKind>,
    pub levels: &'static [SkillLevel],
}

impl SkillDef {
    pub fn max_level(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Level row for a 1-based level, clamped to the authored range.
    pub fn level(&self, level: u32) -> &SkillLevel {
        let idx = (level.max(1) as usize - 1).min(self.levels.len() - 1);
        &self.levels[idx]
    }
}

const N: SkillLevel = SkillLevel::NONE;

static DIVINE_LANCE: SkillDef = SkillDef {
    id: SkillId::DivineLance,
    kind: SkillKind::Projectile,
    name: "Divine Lance",
    cooldown: 50,
    area_kind: None,
    levels: &[
        SkillLevel { damage: 12.0, count: 1, pierce: 1, speed: 9.0, ..N },
        SkillLevel { damage: 16.0, count: 1, pierce: 1, speed: 9.0, ..N },
        SkillLevel { damage: 20.0, count: 2, pierce: 2, speed: 9.5, ..N },
        SkillLevel { damage: 26.0, count: 2, pierce: 2, speed: 10.0, ..N },
        SkillLevel { damage: 34.0, count: 3, pierce: 3, speed: 10.5, ..N },
    ],
};

static SPECTRAL_BLADES: SkillDef = SkillDef {
    id: SkillId::SpectralBlades,
    kind: SkillKind::Projectile,
    name: "Spectral Blades",
    cooldown: 80,
    area_kind: None,
    levels: &[
        SkillLevel { damage: 8.0, count: 4, speed: 7.0, ring: true, ..N },
        SkillLevel { damage: 10.0, count: 6, speed: 7.0, ring: true, ..N },
        SkillLevel { damage: 12.0, count: 8, speed: 7.5, ring: true, ..N },
        SkillLevel { damage: 15.0, count: 10, pierce: 1, speed: 8.0, ring: true, ..N },
    ],
};

static CELESTIAL_RAY: SkillDef = SkillDef {
    id: SkillId::CelestialRay,
    kind: SkillKind::Beam,
    name: "Celestial Ray",
    cooldown: 120,
    area_kind: None,
    levels: &[
        SkillLevel { damage: 18.0, length: 420.0, width: 18.0, pierce: 12, ..N },
        SkillLevel { damage: 24.0, length: 480.0, width: 20.0, pierce: 12, ..N },
        SkillLevel { damage: 32.0, length: 560.0, width: 24.0, pierce: 12, ..N },
    ],
};

static CHAIN_LIGHTNING: SkillDef = SkillDef {
    id: SkillId::ChainLightning,
    kind: SkillKind::Chain,
    name: "Chain Lightning",
    cooldown: 90,
    area_kind: None,
    levels: &[
        SkillLevel { damage: 10.0, chains: 2, chain_radius: 260.0, ..N },
        SkillLevel { damage: 14.0, chains: 3, chain_radius: 260.0, ..N },
        SkillLevel { damage: 18.0, chains: 4, chain_radius: 280.0, ..N },
        SkillLevel { damage: 24.0, chains: 5, chain_radius: 300.0, ..N },
        SkillLevel { damage: 30.0, chains: 6, chain_radius: 320.0, ..N },
    ],
};

static ORBITAL_SHIELD: SkillDef = SkillDef {
    id: SkillId::OrbitalShield,
    kind: SkillKind::Orbital,
    name: "Orbital Shield",
    cooldown: 0,
    area_kind: None,
    levels: &[
        SkillLevel { damage: 10.0, count: 2, radius: 80.0, ..N },
        SkillLevel { damage: 12.0, count: 3, radius: 85.0, ..N },
        SkillLevel { damage: 15.0, count: 4, radius: 90.0, ..N },
        SkillLevel { damage: 18.0, count: 5, radius: 100.0, ..N },
        SkillLevel { damage: 22.0, count: 6, radius: 110.0, ..N },
    ],
};

static VORTEX: SkillDef = SkillDef {
    id: SkillId::Vortex,
    kind: SkillKind::Area,
    name: "Vortex",
    cooldown: 240,
    area_kind: Some(AreaEffectKind::Vortex),
    levels: &[
        SkillLevel { damage: 6.0, radius: 140.0, duration: 300, pull: 0.6, ..N },
        SkillLevel { damage: 8.0, radius: 160.0, duration: 300, pull: 0.7, ..N },
        SkillLevel { damage: 10.0, radius: 190.0, duration: 360, pull: 0.8, ..N },
    ],
};

static STATIC_FIELD: SkillDef = SkillDef {
    id: SkillId::StaticField,
    kind: SkillKind::Area,
    name: "Static Field",
    cooldown: 300,
    area_kind: Some(AreaEffectKind::StaticField),
    levels: &[
        SkillLevel { damage: 2.0, radius: 150.0, duration: 360, slow: 0.5, ..N },
        SkillLevel { damage: 3.0, radius: 170.0, duration: 360, slow: 0.6, ..N },
        SkillLevel { damage: 4.0, radius: 200.0, duration: 420, slow: 0.7, ..N },
    ],
};

static SANCTUARY: SkillDef = SkillDef {
    id: SkillId::Sanctuary,
    kind: SkillKind::Area,
    name: "Sanctuary",
    cooldown: 420,
    area_kind: Some(AreaEffectKind::Sanctuary),
    levels: &[
        SkillLevel { radius: 130.0, duration: 420, slow: 0.3, regen_per_sec: 4.0, damage: 6.0, ..N },
        SkillLevel { radius: 150.0, duration: 420, slow: 0.3, regen_per_sec: 6.0, damage: 8.0, ..N },
        SkillLevel { radius: 180.0, duration: 480, slow: 0.35, regen_per_sec: 8.0, damage: 10.0, ..N },
    ],
};

static HEAL: SkillDef = SkillDef {
    id: SkillId::Heal,
    kind: SkillKind::Utility,
    name: "Heal",
    cooldown: 0,
    area_kind: None,
    levels: &[SkillLevel { heal_fraction: 0.35, ..N }],
};

static MAGNET: SkillDef = SkillDef {
    id: SkillId::Magnet,
    kind: SkillKind::Passive,
    name: "Magnet",
    cooldown: 0,
    area_kind: None,
    levels: &[
        SkillLevel { pickup_mult: 1.5, ..N },
        SkillLevel { pickup_mult: 2.0, ..N },
        SkillLevel { pickup_mult: 2.5, ..N },
    ],
};

static HEALTH_REGEN: SkillDef = SkillDef {
    id: SkillId::HealthRegen,
    kind: SkillKind::Passive,
    name: "Health Regen",
    cooldown: 0,
    area_kind: None,
    levels: &[
        SkillLevel { regen_per_sec: 1.0, ..N },
        SkillLevel { regen_per_sec: 2.0, ..N },
        SkillLevel { regen_per_sec: 3.0, ..N },
    ],
};

static CELESTIAL_PACT: SkillDef = SkillDef {
    id: SkillId::CelestialPact,
    kind: SkillKind::Passive,
    name: "Celestial Pact",
    cooldown: 0,
    area_kind: None,
    levels: &[
        SkillLevel { damage_bonus: 0.15, xp_bonus: 0.10, enemy_count_bonus: 0.10, ..N },
        SkillLevel { damage_bonus: 0.25, xp_bonus: 0.20, enemy_count_bonus: 0.20, ..N },
        SkillLevel { damage_bonus: 0.40, xp_bonus: 0.30, enemy_count_bonus: 0.30, ..N },
    ],
};

static AEGIS_SHIELD: SkillDef = SkillDef {
    id: SkillId::AegisShield,
    kind: SkillKind::Passive,
    name: "Aegis Shield",
    cooldown: 0,
    area_kind: None,
    levels: &[
        SkillLevel { shield_recharge: 600, ..N },
        SkillLevel { shield_recharge: 420, ..N },
    ],
};

static VORTEX_LANCES: SkillDef = SkillDef {
    id: SkillId::VortexLances,
    kind: SkillKind::Projectile,
    name: "Vortex Lances",
    cooldown: 200,
    area_kind: None,
    levels: &[SkillLevel {
        damage: 30.0,
        count: 6,
        pierce: 3,
        speed: 10.0,
        spawns_vortex: true,
        ..N
    }],
};

/// Look up the static definition for a skill id.
pub fn skill_def(id: SkillId) -> &'static SkillDef {
    match id {
        SkillId::DivineLance => &DIVINE_LANCE,
        SkillId::SpectralBlades => &SPECTRAL_BLADES,
        SkillId::CelestialRay => &CELESTIAL_RAY,
        SkillId::ChainLightning => &CHAIN_LIGHTNING,
        SkillId::OrbitalShield => &ORBITAL_SHIELD,
        SkillId::Vortex => &VORTEX,
        SkillId::StaticField => &STATIC_FIELD,
        SkillId::Sanctuary => &SANCTUARY,
        SkillId::Heal => &HEAL,
        SkillId::Magnet => &MAGNET,
        SkillId::HealthRegen => &HEALTH_REGEN,
        SkillId::CelestialPact => &CELESTIAL_PACT,
        SkillId::AegisShield => &AEGIS_SHIELD,
        SkillId::VortexLances => &VORTEX_LANCES,
    }
}

/// All skill ids that may appear in a random level-up offer.
/// Utility skills are excluded (the heal fallback is added explicitly).
pub const OFFERABLE_SKILLS: &[SkillId] = &[
    SkillId::DivineLance,
    SkillId::SpectralBlades,
    SkillId::CelestialRay,
    SkillId::ChainLightning,
    SkillId::OrbitalShield,
    SkillId::Vortex,
    SkillId::StaticField,
    SkillId::Sanctuary,
    SkillId::Magnet,
    SkillId::HealthRegen,
    SkillId::CelestialPact,
    SkillId::AegisShield,
];

/// Evolution: a max-level skill plus a held prerequisite passive unlocks a
/// one-time permanent behavior change on the base skill.
#[derive(Debug, Clone, Copy)]
pub struct EvolutionDef {
    pub id: EvolutionId,
    pub name: &'static str,
    pub base_skill: SkillId,
    pub passive_req: SkillId,
}

pub const EVOLUTIONS: &[EvolutionDef] = &[
    EvolutionDef {
        id: EvolutionId::LanceOfDawn,
        name: "Lance of Dawn",
        base_skill: SkillId::DivineLance,
        passive_req: SkillId::CelestialPact,
    },
    EvolutionDef {
        id: EvolutionId::Maelstrom,
        name: "Maelstrom",
        base_skill: SkillId::Vortex,
        passive_req: SkillId::Magnet,
    },
    EvolutionDef {
        id: EvolutionId::BlessedGround,
        name: "Blessed Ground",
        base_skill: SkillId::Sanctuary,
        passive_req: SkillId::HealthRegen,
    },
    EvolutionDef {
        id: EvolutionId::Bulwark,
        name: "Bulwark",
        base_skill: SkillId::OrbitalShield,
        passive_req: SkillId::AegisShield,
    },
];

/// Fraction of damage dealt returned as health by an evolved Divine Lance.
pub const LANCE_OF_DAWN_LIFESTEAL: f32 = 0.10;

/// Damage multiplier of evolved orbital shield orbs.
pub const BULWARK_DAMAGE_MULT: f32 = 1.5;

/// Fusion: two max-level skills are consumed and replaced by a compound
/// skill granted at level 1.
#[derive(Debug, Clone, Copy)]
pub struct FusionDef {
    pub id: FusionId,
    pub name: &'static str,
    pub skill_a: SkillId,
    pub skill_b: SkillId,
    pub result: SkillId,
}

pub const FUSIONS: &[FusionDef] = &[FusionDef {
    id: FusionId::VortexLances,
    name: "Vortex Lances",
    skill_a: SkillId::DivineLance,
    skill_b: SkillId::Vortex,
    result: SkillId::VortexLances,
}];

/// Character starting loadout and stat scaling.
#[derive(Debug, Clone, Copy)]
pub struct CharacterDef {
    pub id: CharacterId,
    pub name: &'static str,
    pub starting_skill: SkillId,
    pub max_health_mult: f32,
    pub speed_mult: f32,
    pub damage_mult: f32,
}

pub fn character_def(id: CharacterId) -> &'static CharacterDef {
    match id {
        CharacterId::Seraph => &CharacterDef {
            id: CharacterId::Seraph,
            name: "Seraph",
            starting_skill: SkillId::DivineLance,
            max_health_mult: 1.0,
            speed_mult: 1.0,
            damage_mult: 1.0,
        },
        CharacterId::Cherub => &CharacterDef {
            id: CharacterId::Cherub,
            name: "Cherub",
            starting_skill: SkillId::OrbitalShield,
            max_health_mult: 1.2,
            speed_mult: 0.9,
            damage_mult: 1.0,
        },
        CharacterId::Archangel => &CharacterDef {
            id: CharacterId::Archangel,
            name: "Archangel",
            starting_skill: SkillId::CelestialRay,
            max_health_mult: 0.9,
            speed_mult: 1.0,
            damage_mult: 1.15,
        },
    }
}
