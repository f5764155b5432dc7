//! Per-kind enemy behavior and movement.
//!
//! Cross-entity effects (summons, heal pulses) are collected during the
//! iteration pass and applied afterwards, so no query borrow overlaps a
//! spawn or a second mutable pass.

use glam::Vec2;
use hecs::{Without, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use solstice_core::components::{Boss, Enemy};
use solstice_core::constants::*;
use solstice_core::enums::{ChargePhase, EnemyKind, FloatingTextKind};
use solstice_core::types::Position;

use crate::pooled::Pools;
use crate::world_setup::{self, HEALER_PULSE_INTERVAL, SHOOTER_FIRE_INTERVAL, SUMMONER_INTERVAL};

/// Distance a shooter tries to hold from the player.
const SHOOTER_STANDOFF: f32 = 300.0;
/// Below this distance the shooter backs away.
const SHOOTER_RETREAT: f32 = 220.0;
const ENEMY_PROJECTILE_SPEED: f32 = 4.5;
const ENEMY_PROJECTILE_TTL: u32 = 240;
const ENEMY_PROJECTILE_RADIUS: f32 = 7.0;

/// Charger phase lengths.
const CHARGER_STALK_TICKS: u32 = 90;
const CHARGER_WINDUP_TICKS: u32 = 40;
const CHARGER_CHARGE_TICKS: u32 = 28;
const CHARGER_RECOVER_TICKS: u32 = 45;
const CHARGER_CHARGE_MULT: f32 = 4.0;

const HEALER_PULSE_RADIUS: f32 = 220.0;
const HEALER_PULSE_FRACTION: f32 = 0.12;
const SUMMONER_BROOD: u32 = 2;

struct Summon {
    pos: Vec2,
    wave: u32,
}

struct HealPulse {
    pos: Vec2,
}

/// Advance every non-boss enemy one tick.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    player_pos: Vec2,
    pools: &mut Pools,
    rng: &mut ChaCha8Rng,
    elapsed_secs: f32,
    wave: u32,
) {
    let mut summons: Vec<Summon> = Vec::new();
    let mut pulses: Vec<HealPulse> = Vec::new();

    for (_, (pos, enemy)) in world
        .query_mut::<Without<(&mut Position, &mut Enemy), &Boss>>()
        .into_iter()
    {
        if enemy.dead {
            continue;
        }
        let speed = enemy.speed * (1.0 - enemy.slow).max(0.0);
        let to_player = player_pos - pos.0;
        let dist = to_player.length();
        let dir = if dist > 1e-3 { to_player / dist } else { Vec2::X };

        let mut step = Vec2::ZERO;
        match enemy.kind {
            EnemyKind::Chaser | EnemyKind::Swift | EnemyKind::Tank | EnemyKind::Exploder => {
                step = dir * speed;
            }
            EnemyKind::Shooter => {
                if dist > SHOOTER_STANDOFF {
                    step = dir * speed;
                } else if dist < SHOOTER_RETREAT {
                    step = -dir * speed;
                }
                if enemy.action_timer > 0 {
                    enemy.action_timer -= 1;
                }
                if enemy.action_timer == 0 {
                    enemy.action_timer = SHOOTER_FIRE_INTERVAL;
                    let damage = enemy.damage;
                    let from = pos.0;
                    pools.enemy_projectiles.acquire(|p| {
                        p.pos = from;
                        p.vel = dir * ENEMY_PROJECTILE_SPEED;
                        p.radius = ENEMY_PROJECTILE_RADIUS;
                        p.damage = damage;
                        p.ttl = ENEMY_PROJECTILE_TTL;
                    });
                }
            }
            EnemyKind::Charger => match enemy.charge_phase {
                ChargePhase::Stalk => {
                    step = dir * speed * 0.6;
                    enemy.action_timer += 1;
                    if enemy.action_timer >= CHARGER_STALK_TICKS && dist < 500.0 {
                        enemy.charge_phase = ChargePhase::Windup;
                        enemy.action_timer = 0;
                    }
                }
                ChargePhase::Windup => {
                    // Telegraph: stand still, track the player until launch.
                    enemy.charge_dir = dir;
                    enemy.action_timer += 1;
                    if enemy.action_timer >= CHARGER_WINDUP_TICKS {
                        enemy.charge_phase = ChargePhase::Charge;
                        enemy.action_timer = 0;
                    }
                }
                ChargePhase::Charge => {
                    step = enemy.charge_dir * speed * CHARGER_CHARGE_MULT;
                    enemy.action_timer += 1;
                    if enemy.action_timer >= CHARGER_CHARGE_TICKS {
                        enemy.charge_phase = ChargePhase::Recover;
                        enemy.action_timer = 0;
                    }
                }
                ChargePhase::Recover => {
                    enemy.action_timer += 1;
                    if enemy.action_timer >= CHARGER_RECOVER_TICKS {
                        enemy.charge_phase = ChargePhase::Stalk;
                        enemy.action_timer = 0;
                    }
                }
            },
            EnemyKind::Healer => {
                // Hang back from the player, pulse on a fixed cadence.
                if dist > SHOOTER_STANDOFF {
                    step = dir * speed;
                } else if dist < SHOOTER_RETREAT {
                    step = -dir * speed;
                }
                if enemy.action_timer > 0 {
                    enemy.action_timer -= 1;
                }
                if enemy.action_timer == 0 {
                    enemy.action_timer = HEALER_PULSE_INTERVAL;
                    pulses.push(HealPulse { pos: pos.0 });
                }
            }
            EnemyKind::Summoner => {
                if dist > SHOOTER_STANDOFF {
                    step = dir * speed;
                } else if dist < SHOOTER_RETREAT {
                    step = -dir * speed;
                }
                if enemy.action_timer > 0 {
                    enemy.action_timer -= 1;
                }
                if enemy.action_timer == 0 {
                    enemy.action_timer = SUMMONER_INTERVAL;
                    summons.push(Summon { pos: pos.0, wave });
                }
            }
        }

        pos.0 += step + enemy.knockback;
        enemy.knockback *= KNOCKBACK_DECAY;
        if enemy.knockback.length_squared() < KNOCKBACK_EPSILON * KNOCKBACK_EPSILON {
            enemy.knockback = Vec2::ZERO;
        }
        pos.0.x = pos.0.x.clamp(enemy.radius, WORLD_WIDTH - enemy.radius);
        pos.0.y = pos.0.y.clamp(enemy.radius, WORLD_HEIGHT - enemy.radius);
    }

    for pulse in &pulses {
        apply_heal_pulse(world, pools, pulse.pos);
    }
    for summon in summons {
        for _ in 0..SUMMONER_BROOD {
            let offset = Vec2::new(rng.gen_range(-60.0f32..60.0), rng.gen_range(-60.0f32..60.0));
            world_setup::spawn_enemy(
                world,
                EnemyKind::Chaser,
                summon.pos + offset,
                elapsed_secs,
                summon.wave,
                false,
            );
        }
    }
}

/// Heal every living enemy inside the pulse radius by a fraction of its
/// max health (the healer included).
fn apply_heal_pulse(world: &mut World, pools: &mut Pools, center: Vec2) {
    let radius_sq = HEALER_PULSE_RADIUS * HEALER_PULSE_RADIUS;
    for (_, (pos, enemy)) in world.query_mut::<(&Position, &mut Enemy)>() {
        if enemy.dead || pos.0.distance_squared(center) > radius_sq {
            continue;
        }
        let amount = enemy.max_health * HEALER_PULSE_FRACTION;
        if enemy.health < enemy.max_health && amount >= 1.0 {
            enemy.health = (enemy.health + amount).min(enemy.max_health);
            pools.spawn_text(pos.0, amount, FloatingTextKind::Heal);
        }
    }
}
