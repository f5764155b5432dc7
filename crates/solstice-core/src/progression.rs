//! Permanent progression content: between-match upgrades, achievements,
//! and the XP curve.

use crate::constants::{XP_LEVEL_MULTIPLIER, XP_TO_NEXT_LEVEL_BASE};
use crate::enums::{AchievementId, UpgradeId};

/// Static definition of one permanent upgrade track.
#[derive(Debug, Clone, Copy)]
pub struct UpgradeDef {
    pub id: UpgradeId,
    pub name: &'static str,
    pub max_level: u32,
    /// Bonus per level (fractional, +0.10 = +10% per level).
    pub per_level: f32,
    /// Gem cost of the first level; doubles per level.
    pub base_cost: u64,
}

pub const UPGRADES: &[UpgradeDef] = &[
    UpgradeDef {
        id: UpgradeId::Vitality,
        name: "Vitality",
        max_level: 5,
        per_level: 0.10,
        base_cost: 20,
    },
    UpgradeDef {
        id: UpgradeId::Might,
        name: "Might",
        max_level: 5,
        per_level: 0.05,
        base_cost: 25,
    },
    UpgradeDef {
        id: UpgradeId::Greed,
        name: "Greed",
        max_level: 5,
        per_level: 0.10,
        base_cost: 15,
    },
    UpgradeDef {
        id: UpgradeId::Reach,
        name: "Reach",
        max_level: 5,
        per_level: 0.10,
        base_cost: 15,
    },
];

pub fn upgrade_def(id: UpgradeId) -> &'static UpgradeDef {
    UPGRADES
        .iter()
        .find(|u| u.id == id)
        .unwrap_or(&UPGRADES[0])
}

/// Gem cost of buying `level` (1-based) of an upgrade.
pub fn upgrade_cost(def: &UpgradeDef, level: u32) -> u64 {
    def.base_cost << level.saturating_sub(1).min(16)
}

/// Achievement definition. Unlock conditions are checked by the engine.
#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
}

pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: AchievementId::Herald,
        name: "Herald",
        description: "Defeat a boss.",
    },
    AchievementDef {
        id: AchievementId::Decimation,
        name: "Decimation",
        description: "Reach wave 10.",
    },
    AchievementDef {
        id: AchievementId::Reaper,
        name: "Reaper",
        description: "300 kills in a single match.",
    },
];

/// XP required to go from `level` to `level + 1` (levels are 1-based).
pub fn xp_threshold(level: u32) -> f32 {
    XP_TO_NEXT_LEVEL_BASE * XP_LEVEL_MULTIPLIER.powi(level.saturating_sub(1) as i32)
}
