//! Player profile persistence: permanent currency, upgrade levels,
//! achievements, and lifetime stats, stored as JSON on disk.
//!
//! Loading is forgiving: a missing or malformed file yields the default
//! profile, and out-of-range values are clamped rather than rejected, so
//! a bad save never bricks the game.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use solstice_core::enums::{AchievementId, UpgradeId};
use solstice_core::events::ProfileEvent;
use solstice_core::progression::{upgrade_cost, upgrade_def};

/// Lifetime statistics across matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileStats {
    #[serde(default)]
    pub total_kills: u64,
    #[serde(default)]
    pub best_wave: u32,
    #[serde(default)]
    pub matches_played: u32,
    #[serde(default)]
    pub total_time_secs: f64,
}

/// The permanent player profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(default)]
    pub gems: u64,
    #[serde(default)]
    pub upgrades: BTreeMap<UpgradeId, u32>,
    #[serde(default)]
    pub achievements: BTreeSet<AchievementId>,
    #[serde(default)]
    pub stats: ProfileStats,
}

impl PlayerProfile {
    /// Clamp loaded values into legal ranges. An upgrade level above its
    /// authored max is reset to 0, not truncated: a corrupt value earns
    /// nothing.
    pub fn validate(&mut self) {
        for (&id, level) in self.upgrades.iter_mut() {
            if *level > upgrade_def(id).max_level {
                *level = 0;
            }
        }
        self.upgrades.retain(|_, level| *level > 0);
    }

    /// Fold one match's profile events into the profile.
    pub fn apply_events(&mut self, events: &[ProfileEvent]) {
        for event in events {
            match *event {
                ProfileEvent::CurrencyEarned { amount } => {
                    self.gems = self.gems.saturating_add(amount);
                }
                ProfileEvent::AchievementUnlocked { id } => {
                    self.achievements.insert(id);
                }
                ProfileEvent::MatchEnded {
                    kills,
                    wave,
                    survived_secs,
                } => {
                    self.stats.total_kills += u64::from(kills);
                    self.stats.best_wave = self.stats.best_wave.max(wave);
                    self.stats.matches_played += 1;
                    self.stats.total_time_secs += survived_secs;
                }
            }
        }
    }

    /// Spend gems on the next level of an upgrade. Returns false when the
    /// track is maxed or the gems are short.
    pub fn buy_upgrade(&mut self, id: UpgradeId) -> bool {
        let def = upgrade_def(id);
        let current = self.upgrades.get(&id).copied().unwrap_or(0);
        if current >= def.max_level {
            return false;
        }
        let cost = upgrade_cost(def, current + 1);
        if self.gems < cost {
            return false;
        }
        self.gems -= cost;
        self.upgrades.insert(id, current + 1);
        true
    }
}

/// Load a profile, falling back to the default when the file is missing
/// or unreadable. The result is always validated.
pub fn load_or_default(path: &Path) -> PlayerProfile {
    let mut profile = load(path).unwrap_or_default();
    profile.validate();
    profile
}

/// Load a profile from disk.
pub fn load(path: &Path) -> Result<PlayerProfile, String> {
    let data =
        fs::read_to_string(path).map_err(|e| format!("Failed to read profile file: {e}"))?;
    serde_json::from_str(&data).map_err(|e| format!("Failed to parse profile: {e}"))
}

/// Save a profile to disk, creating parent directories as needed.
pub fn save(path: &Path, profile: &PlayerProfile) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create profile dir: {e}"))?;
    }
    let json = serde_json::to_string_pretty(profile)
        .map_err(|e| format!("Failed to serialize profile: {e}"))?;
    fs::write(path, json).map_err(|e| format!("Failed to write profile file: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("solstice-test-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn save_and_load_roundtrip() {
        let path = temp_path("roundtrip");
        let mut profile = PlayerProfile::default();
        profile.gems = 120;
        profile.upgrades.insert(UpgradeId::Might, 3);
        profile.achievements.insert(AchievementId::Herald);
        profile.stats.best_wave = 9;

        save(&path, &profile).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.gems, 120);
        assert_eq!(loaded.upgrades.get(&UpgradeId::Might), Some(&3));
        assert!(loaded.achievements.contains(&AchievementId::Herald));
        assert_eq!(loaded.stats.best_wave, 9);
    }

    #[test]
    fn malformed_file_falls_back_to_default() {
        let path = temp_path("malformed");
        std::fs::write(&path, "{ not json !!!").unwrap();
        let profile = load_or_default(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(profile.gems, 0);
        assert!(profile.upgrades.is_empty());
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let profile = load_or_default(Path::new("/nonexistent/solstice/profile.json"));
        assert_eq!(profile.stats.matches_played, 0);
    }

    #[test]
    fn validate_resets_out_of_range_upgrade_levels() {
        let mut profile = PlayerProfile::default();
        profile.upgrades.insert(UpgradeId::Vitality, 99);
        profile.upgrades.insert(UpgradeId::Greed, 2);
        profile.validate();
        assert_eq!(profile.upgrades.get(&UpgradeId::Vitality), None);
        assert_eq!(profile.upgrades.get(&UpgradeId::Greed), Some(&2));
    }

    #[test]
    fn partial_json_fills_missing_fields() {
        let profile: PlayerProfile = serde_json::from_str(r#"{"gems": 50}"#).unwrap();
        assert_eq!(profile.gems, 50);
        assert!(profile.achievements.is_empty());
        assert_eq!(profile.stats.total_kills, 0);
    }

    #[test]
    fn apply_events_folds_match_results() {
        let mut profile = PlayerProfile::default();
        profile.stats.best_wave = 12;
        profile.apply_events(&[
            ProfileEvent::CurrencyEarned { amount: 40 },
            ProfileEvent::AchievementUnlocked {
                id: AchievementId::Decimation,
            },
            ProfileEvent::MatchEnded {
                kills: 210,
                wave: 10,
                survived_secs: 600.0,
            },
        ]);
        assert_eq!(profile.gems, 40);
        assert!(profile.achievements.contains(&AchievementId::Decimation));
        assert_eq!(profile.stats.total_kills, 210);
        // A worse run never lowers the best wave.
        assert_eq!(profile.stats.best_wave, 12);
        assert_eq!(profile.stats.matches_played, 1);
    }

    #[test]
    fn buy_upgrade_spends_gems_and_respects_caps() {
        let mut profile = PlayerProfile::default();
        profile.gems = 1000;
        let def = upgrade_def(UpgradeId::Greed);

        assert!(profile.buy_upgrade(UpgradeId::Greed));
        assert_eq!(profile.upgrades.get(&UpgradeId::Greed), Some(&1));
        assert_eq!(profile.gems, 1000 - upgrade_cost(def, 1));

        // Buy to the cap, then refuse.
        while profile.buy_upgrade(UpgradeId::Greed) {}
        assert_eq!(
            profile.upgrades.get(&UpgradeId::Greed),
            Some(&def.max_level)
        );
        assert!(!profile.buy_upgrade(UpgradeId::Greed));
    }

    #[test]
    fn buy_upgrade_refuses_when_broke() {
        let mut profile = PlayerProfile::default();
        profile.gems = 0;
        assert!(!profile.buy_upgrade(UpgradeId::Might));
        assert!(profile.upgrades.is_empty());
    }
}
