//! Boss behavior: phase transition and rotating attack patterns.

use std::f32::consts::TAU;

use glam::Vec2;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use solstice_core::components::{Boss, Enemy};
use solstice_core::constants::*;
use solstice_core::enums::{BossAttack, EnemyKind};
use solstice_core::events::AudioEvent;
use solstice_core::types::Position;

use crate::pooled::Pools;
use crate::world_setup;

/// Phase-two speed multiplier.
const PHASE_TWO_SPEED_MULT: f32 = 1.5;

const RING_INTERVAL: u32 = 50;
const RING_COUNT: u32 = 12;
const BARRAGE_INTERVAL: u32 = 15;
const BARRAGE_COUNT: u32 = 3;
const SUMMON_INTERVAL: u32 = 90;
const SUMMON_BROOD: u32 = 3;
const BOSS_PROJECTILE_SPEED: f32 = 4.0;
const BOSS_PROJECTILE_TTL: u32 = 300;
const BOSS_PROJECTILE_RADIUS: f32 = 9.0;
const BOSS_PROJECTILE_DAMAGE: f32 = 14.0;

/// Advance the boss one tick, if one is alive.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    player_pos: Vec2,
    pools: &mut Pools,
    rng: &mut ChaCha8Rng,
    audio: &mut Vec<AudioEvent>,
    elapsed_secs: f32,
    wave: u32,
) {
    let mut summon_at: Option<Vec2> = None;

    for (_, (pos, enemy, boss)) in world.query_mut::<(&mut Position, &mut Enemy, &mut Boss)>() {
        if enemy.dead {
            continue;
        }

        if boss.phase == 1 && enemy.health < enemy.max_health * 0.5 {
            boss.phase = 2;
            audio.push(AudioEvent::BossPhaseTwo);
        }

        // Pattern rotation on a fixed cadence.
        if boss.pattern_timer > 0 {
            boss.pattern_timer -= 1;
        }
        if boss.pattern_timer == 0 {
            boss.pattern_timer = BOSS_PATTERN_TICKS;
            boss.attack_timer = 0;
            boss.attack = match rng.gen_range(0u32..4) {
                0 => BossAttack::Chase,
                1 => BossAttack::ShootRing,
                2 => BossAttack::Barrage,
                _ => BossAttack::Summon,
            };
        }

        let mut speed = enemy.speed * (1.0 - enemy.slow).max(0.0);
        if boss.phase == 2 {
            speed *= PHASE_TWO_SPEED_MULT;
        }
        let to_player = player_pos - pos.0;
        let dir = if to_player.length_squared() > 1e-6 {
            to_player.normalize()
        } else {
            Vec2::X
        };

        if boss.attack_timer > 0 {
            boss.attack_timer -= 1;
        }
        match boss.attack {
            BossAttack::Chase => {
                pos.0 += dir * speed;
            }
            BossAttack::ShootRing => {
                pos.0 += dir * speed * 0.4;
                if boss.attack_timer == 0 {
                    boss.attack_timer = RING_INTERVAL;
                    let from = pos.0;
                    for i in 0..RING_COUNT {
                        let angle = i as f32 * TAU / RING_COUNT as f32;
                        pools.enemy_projectiles.acquire(|p| {
                            p.pos = from;
                            p.vel = Vec2::from_angle(angle) * BOSS_PROJECTILE_SPEED;
                            p.radius = BOSS_PROJECTILE_RADIUS;
                            p.damage = BOSS_PROJECTILE_DAMAGE;
                            p.ttl = BOSS_PROJECTILE_TTL;
                        });
                    }
                }
            }
            BossAttack::Barrage => {
                pos.0 += dir * speed * 0.4;
                if boss.attack_timer == 0 {
                    boss.attack_timer = BARRAGE_INTERVAL;
                    let from = pos.0;
                    let base = dir.y.atan2(dir.x);
                    for i in 0..BARRAGE_COUNT {
                        let angle =
                            base + (i as f32 - (BARRAGE_COUNT as f32 - 1.0) * 0.5) * VOLLEY_SPREAD;
                        pools.enemy_projectiles.acquire(|p| {
                            p.pos = from;
                            p.vel = Vec2::from_angle(angle) * BOSS_PROJECTILE_SPEED * 1.4;
                            p.radius = BOSS_PROJECTILE_RADIUS * 0.8;
                            p.damage = BOSS_PROJECTILE_DAMAGE;
                            p.ttl = BOSS_PROJECTILE_TTL;
                        });
                    }
                }
            }
            BossAttack::Summon => {
                pos.0 += dir * speed * 0.3;
                if boss.attack_timer == 0 {
                    boss.attack_timer = SUMMON_INTERVAL;
                    summon_at = Some(pos.0);
                }
            }
        }

        // The boss shrugs off impulses; residual knockback decays faster.
        pos.0 += enemy.knockback;
        enemy.knockback *= BOSS_KNOCKBACK_DECAY;
        if enemy.knockback.length_squared() < KNOCKBACK_EPSILON * KNOCKBACK_EPSILON {
            enemy.knockback = Vec2::ZERO;
        }
        pos.0.x = pos.0.x.clamp(enemy.radius, WORLD_WIDTH - enemy.radius);
        pos.0.y = pos.0.y.clamp(enemy.radius, WORLD_HEIGHT - enemy.radius);
    }

    if let Some(center) = summon_at {
        for _ in 0..SUMMON_BROOD {
            let offset = Vec2::new(rng.gen_range(-80.0f32..80.0), rng.gen_range(-80.0f32..80.0));
            world_setup::spawn_enemy(
                world,
                EnemyKind::Chaser,
                center + offset,
                elapsed_secs,
                wave,
                false,
            );
        }
    }
}
