//! End-of-tick cleanup: enemy deaths and their drops, power-up pickup and
//! expiry, dead area effects, expired pool slots, and despawns.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use solstice_core::components::{AreaEffect, Boss, Enemy, Player, PowerUp};
use solstice_core::constants::*;
use solstice_core::enums::{AreaEffectKind, EnemyKind, FloatingTextKind, PowerUpKind, SkillId};
use solstice_core::events::AudioEvent;
use solstice_core::skills::skill_def;
use solstice_core::types::Position;

use crate::pooled::Pools;
use crate::systems::area_effects;

const POWERUP_RADIUS: f32 = 12.0;
/// Explosion left behind by a dying exploder.
const EXPLODER_BLAST_RADIUS: f32 = 90.0;

/// Tallies the engine folds into the match score.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupReport {
    pub kills: u32,
    pub gems: u64,
    pub boss_died: bool,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    player_entity: Entity,
    pools: &mut Pools,
    rng: &mut ChaCha8Rng,
    next_effect_id: &mut u64,
    despawn_buffer: &mut Vec<Entity>,
    audio: &mut Vec<AudioEvent>,
) -> CleanupReport {
    let mut report = CleanupReport::default();

    let player_pos = world
        .get::<&Position>(player_entity)
        .map(|p| p.0)
        .unwrap_or(Vec2::ZERO);

    // Power-ups: expiry and pickup.
    let mut collected: Vec<PowerUpKind> = Vec::new();
    {
        let Ok(player_radius) = world.get::<&Player>(player_entity).map(|p| p.radius) else {
            return report;
        };
        for (entity, (pos, power_up)) in world.query::<(&Position, &mut PowerUp)>().iter() {
            if power_up.dead {
                continue;
            }
            power_up.ttl = power_up.ttl.saturating_sub(1);
            if power_up.ttl == 0 {
                power_up.dead = true;
                despawn_buffer.push(entity);
                continue;
            }
            let r = power_up.radius + player_radius;
            if pos.0.distance_squared(player_pos) <= r * r {
                power_up.dead = true;
                despawn_buffer.push(entity);
                collected.push(power_up.kind);
                audio.push(AudioEvent::PowerUpCollected {
                    kind: power_up.kind,
                });
            }
        }
    }
    for kind in collected {
        match kind {
            PowerUpKind::Nuke => {
                for (_, (pos, enemy)) in world.query_mut::<(&Position, &mut Enemy)>() {
                    if enemy.dead {
                        continue;
                    }
                    enemy.health -= NUKE_DAMAGE;
                    if enemy.health <= 0.0 {
                        enemy.dead = true;
                    }
                    pools.spawn_text(pos.0, NUKE_DAMAGE, FloatingTextKind::Damage);
                }
            }
            PowerUpKind::HealOrb => {
                if let Ok(player) = world.query_one_mut::<&mut Player>(player_entity) {
                    let amount = player.max_health * HEAL_ORB_FRACTION;
                    player.health = (player.health + amount).min(player.max_health);
                    pools.spawn_text(player_pos, amount, FloatingTextKind::Heal);
                }
            }
        }
    }

    // Dead enemies: drops, blasts, score, despawn.
    struct Drop {
        pos: Vec2,
        kind: PowerUpKind,
    }
    let mut drops: Vec<Drop> = Vec::new();
    let mut blasts: Vec<(Vec2, f32)> = Vec::new();
    for (entity, (pos, enemy, boss)) in world
        .query::<(&Position, &Enemy, Option<&Boss>)>()
        .iter()
    {
        if !enemy.dead {
            continue;
        }
        despawn_buffer.push(entity);
        report.kills += 1;
        pools.xp_orbs.acquire(|orb| {
            orb.pos = pos.0;
            orb.value = enemy.xp_value;
        });
        pools.spawn_burst(rng, pos.0, 6, 2.0);
        if boss.is_some() {
            report.boss_died = true;
            report.gems += GEMS_PER_BOSS;
            audio.push(AudioEvent::BossDied);
        } else {
            report.gems += GEMS_PER_KILL;
            audio.push(AudioEvent::EnemyDied { kind: enemy.kind });
            if enemy.kind == EnemyKind::Exploder {
                blasts.push((pos.0, enemy.damage));
            }
            if rng.gen_bool(POWERUP_DROP_CHANCE) {
                let kind = if rng.gen_bool(0.5) {
                    PowerUpKind::Nuke
                } else {
                    PowerUpKind::HealOrb
                };
                drops.push(Drop { pos: pos.0, kind });
            }
        }
    }
    for (pos, damage) in blasts {
        area_effects::spawn_explosion(world, next_effect_id, pos, EXPLODER_BLAST_RADIUS, damage);
        audio.push(AudioEvent::Explosion);
    }
    for drop in drops {
        world.spawn((
            Position(drop.pos),
            PowerUp {
                kind: drop.kind,
                radius: POWERUP_RADIUS,
                ttl: POWERUP_LIFETIME_TICKS,
                dead: false,
            },
        ));
    }

    // Dead area effects: despawn, then forget their ids so enemy hit
    // registries never pin a reused id.
    let mut dead_effect_ids: Vec<u64> = Vec::new();
    for (entity, effect) in world.query::<&AreaEffect>().iter() {
        if effect.dead {
            dead_effect_ids.push(effect.id);
            despawn_buffer.push(entity);
        }
    }
    if !dead_effect_ids.is_empty() {
        for (_, enemy) in world.query_mut::<&mut Enemy>() {
            for id in &dead_effect_ids {
                enemy.hit_by.remove(id);
            }
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }

    // Expired pool slots go back to the free list. Fused lances leave a
    // vortex where they die.
    let mut vortexes: Vec<Vec2> = Vec::new();
    for idx in pools.projectiles.active_indices() {
        let Some(p) = pools.projectiles.get(idx) else { continue };
        if p.expired {
            if p.spawns_vortex {
                vortexes.push(p.pos);
            }
            pools.projectiles.release(idx);
        }
    }
    for pos in vortexes {
        spawn_lance_vortex(world, next_effect_id, pos);
    }
    for idx in pools.enemy_projectiles.active_indices() {
        if pools.enemy_projectiles.get(idx).is_some_and(|p| p.expired) {
            pools.enemy_projectiles.release(idx);
        }
    }
    for idx in pools.xp_orbs.active_indices() {
        if pools.xp_orbs.get(idx).is_some_and(|o| o.expired) {
            pools.xp_orbs.release(idx);
        }
    }
    for idx in pools.floating_texts.active_indices() {
        if pools.floating_texts.get(idx).is_some_and(|t| t.expired) {
            pools.floating_texts.release(idx);
        }
    }
    for idx in pools.particles.active_indices() {
        if pools.particles.get(idx).is_some_and(|p| p.expired) {
            pools.particles.release(idx);
        }
    }

    report
}

/// The vortex dropped by a dying fused lance: the base vortex at level 1.
fn spawn_lance_vortex(world: &mut World, next_effect_id: &mut u64, pos: Vec2) {
    let row = skill_def(SkillId::Vortex).level(1);
    let id = *next_effect_id;
    *next_effect_id += 1;
    world.spawn((
        Position(pos),
        AreaEffect {
            kind: AreaEffectKind::Vortex,
            id,
            radius: row.radius,
            max_radius: row.radius,
            duration: row.duration,
            age: 0,
            damage: row.damage,
            slow: row.slow,
            pull: row.pull,
            regen_per_sec: 0.0,
            evolved: false,
            dead: false,
        },
    ));
}
