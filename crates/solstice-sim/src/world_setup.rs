//! World construction: platforms, the player, enemy and boss spawning.

use std::collections::BTreeMap;

use glam::Vec2;
use hecs::{Entity, World};

use solstice_core::components::{Boss, Enemy, Player, StatModifiers};
use solstice_core::constants::*;
use solstice_core::enums::{BossAttack, ChargePhase, CharacterId, EnemyKind, UpgradeId};
use solstice_core::skills::character_def;
use solstice_core::types::{Position, Rect};

/// Static level geometry: a full-width floor plus floating platforms.
pub fn platforms() -> Vec<Rect> {
    vec![
        Rect::new(0.0, WORLD_HEIGHT - 40.0, WORLD_WIDTH, 40.0),
        Rect::new(260.0, WORLD_HEIGHT - 320.0, 360.0, 24.0),
        Rect::new(900.0, WORLD_HEIGHT - 480.0, 420.0, 24.0),
        Rect::new(1560.0, WORLD_HEIGHT - 300.0, 380.0, 24.0),
        Rect::new(1980.0, WORLD_HEIGHT - 560.0, 300.0, 24.0),
        Rect::new(560.0, WORLD_HEIGHT - 700.0, 320.0, 24.0),
    ]
}

/// Spawn the player at the world center floor. The starting skill is
/// granted by the engine afterwards (which also recomputes modifiers).
pub fn spawn_player(
    world: &mut World,
    character: CharacterId,
    upgrades: &BTreeMap<UpgradeId, u32>,
) -> Entity {
    let def = character_def(character);
    let mut player = Player {
        character,
        health: 0.0,
        max_health: PLAYER_MAX_HEALTH * def.max_health_mult,
        radius: PLAYER_RADIUS,
        velocity: Vec2::ZERO,
        grounded: false,
        facing: 1.0,
        coyote: 0,
        jump_buffer: 0,
        dash_timer: 0,
        dash_cooldown: 0,
        dash_dir: 1.0,
        iframes: 0,
        shield_ready: false,
        shield_timer: 0,
        knockback: Vec2::ZERO,
        xp: 0.0,
        level: 1,
        xp_to_next: solstice_core::progression::xp_threshold(1),
        pending_level_ups: 0,
        skills: BTreeMap::new(),
        modifiers: StatModifiers::default(),
        regen_accum: 0.0,
    };
    // Permanent upgrades apply before the first health fill.
    crate::systems::abilities::recompute_modifiers(&mut player, upgrades);
    player.max_health = PLAYER_MAX_HEALTH * player.modifiers.max_health_mult;
    player.health = player.max_health;

    let pos = Position::new(WORLD_WIDTH * 0.5, WORLD_HEIGHT - 40.0 - PLAYER_RADIUS);
    world.spawn((pos, player))
}

/// Scaled enemy stats. Difficulty grows with elapsed match time and the
/// wave number; elites multiply on top.
pub fn enemy_stats(kind: EnemyKind, elapsed_secs: f32, wave: u32, elite: bool) -> Enemy {
    let t = elapsed_secs;
    let w = wave as f32;
    let (speed, health, damage, xp, radius, action_timer) = match kind {
        EnemyKind::Chaser => (
            (2.2 + t / 150.0 + w * 0.008).min(4.0),
            25.0 + (t / 10.0).floor() * 3.0 + w * 1.5,
            8.0,
            20.0,
            14.0,
            0,
        ),
        EnemyKind::Swift => (
            (3.2 + t / 130.0 + w * 0.01).min(5.4),
            12.0 + (t / 12.0).floor() * 2.0 + w,
            5.0,
            15.0,
            10.0,
            0,
        ),
        EnemyKind::Tank => (
            (1.2 + w * 0.004).min(1.8),
            90.0 + (t / 8.0).floor() * 5.0 + w * 4.0,
            14.0,
            40.0,
            22.0,
            0,
        ),
        EnemyKind::Shooter => (
            1.8,
            20.0 + (t / 10.0).floor() * 2.5 + w,
            10.0,
            30.0,
            13.0,
            SHOOTER_FIRE_INTERVAL,
        ),
        EnemyKind::Charger => (
            2.0,
            35.0 + (t / 10.0).floor() * 3.0 + w * 2.0,
            12.0,
            35.0,
            15.0,
            0,
        ),
        EnemyKind::Healer => (
            1.6,
            30.0 + (t / 10.0).floor() * 2.0 + w,
            4.0,
            35.0,
            14.0,
            HEALER_PULSE_INTERVAL,
        ),
        EnemyKind::Summoner => (
            1.5,
            40.0 + (t / 10.0).floor() * 3.0 + w * 2.0,
            4.0,
            45.0,
            16.0,
            SUMMONER_INTERVAL,
        ),
        EnemyKind::Exploder => (
            2.6,
            15.0 + (t / 12.0).floor() * 2.0 + w,
            18.0,
            25.0,
            12.0,
            0,
        ),
    };

    let (radius, health, damage, xp) = if elite {
        (
            radius * ELITE_RADIUS_MULT,
            health * ELITE_HEALTH_MULT,
            damage * ELITE_DAMAGE_MULT,
            xp * ELITE_XP_MULT,
        )
    } else {
        (radius, health, damage, xp)
    };

    Enemy {
        kind,
        elite,
        radius,
        speed,
        health,
        max_health: health,
        damage,
        xp_value: xp,
        dead: false,
        slow: 0.0,
        knockback: Vec2::ZERO,
        hit_by: Default::default(),
        action_timer,
        charge_phase: ChargePhase::Stalk,
        charge_dir: Vec2::ZERO,
    }
}

/// Ticks between shooter volleys.
pub const SHOOTER_FIRE_INTERVAL: u32 = 120;
/// Ticks between healer pulses.
pub const HEALER_PULSE_INTERVAL: u32 = 90;
/// Ticks between summoner casts.
pub const SUMMONER_INTERVAL: u32 = 240;

pub fn spawn_enemy(
    world: &mut World,
    kind: EnemyKind,
    pos: Vec2,
    elapsed_secs: f32,
    wave: u32,
    elite: bool,
) -> Entity {
    let enemy = enemy_stats(kind, elapsed_secs, wave, elite);
    world.spawn((Position(pos), enemy))
}

/// Spawn the boss for a boss wave. `max_health = 1000 + wave * 150`.
pub fn spawn_boss(world: &mut World, wave: u32, pos: Vec2) -> Entity {
    let health = BOSS_BASE_HEALTH + wave as f32 * BOSS_HEALTH_PER_WAVE;
    let enemy = Enemy {
        kind: EnemyKind::Chaser,
        elite: false,
        radius: BOSS_RADIUS,
        speed: BOSS_SPEED,
        health,
        max_health: health,
        damage: BOSS_CONTACT_DAMAGE,
        xp_value: BOSS_XP,
        dead: false,
        slow: 0.0,
        knockback: Vec2::ZERO,
        hit_by: Default::default(),
        action_timer: 0,
        charge_phase: ChargePhase::Stalk,
        charge_dir: Vec2::ZERO,
    };
    let boss = Boss {
        phase: 1,
        attack: BossAttack::Chase,
        pattern_timer: BOSS_PATTERN_TICKS,
        attack_timer: 0,
    };
    world.spawn((Position(pos), enemy, boss))
}
