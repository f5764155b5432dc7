//! Combat resolution: projectiles vs enemies, orbital orbs, enemy contact
//! and enemy projectiles vs the player.

use glam::Vec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use solstice_core::components::{Boss, Enemy, Player};
use solstice_core::constants::*;
use solstice_core::enums::{FloatingTextKind, SkillKind};
use solstice_core::events::AudioEvent;
use solstice_core::skills::{skill_def, BULWARK_DAMAGE_MULT};
use solstice_core::types::{Position, Rect};

use crate::pooled::Pools;
use crate::quadtree::Quadtree;

/// Contact radius of an orbital orb.
const ORB_RADIUS: f32 = 12.0;

/// What combat reported back to the engine this tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatReport {
    /// The player took a contact hit; the engine applies hit-stop.
    pub player_contact_hit: bool,
}

/// Resolve one tick of combat. The quadtree is the broad phase for every
/// projectile and orb test; exact circle overlap is the narrow phase.
pub fn run(
    world: &mut World,
    player_entity: Entity,
    qt: &Quadtree,
    pools: &mut Pools,
    rng: &mut ChaCha8Rng,
    audio: &mut Vec<AudioEvent>,
) -> CombatReport {
    let mut report = CombatReport::default();
    let mut lifesteal_heal = 0.0f32;

    let (player_pos, player_radius, dashing) = {
        let Ok((pos, player)) = world.query_one_mut::<(&Position, &Player)>(player_entity) else {
            return report;
        };
        (pos.0, player.radius, player.dash_timer > 0)
    };

    // 1. Player projectiles vs enemies.
    for idx in pools.projectiles.active_indices() {
        let Some(p) = pools.projectiles.get_mut(idx) else { continue };
        if p.expired {
            continue;
        }
        let damage = p.damage;
        let pierce = p.pierce;
        let lifesteal = p.lifesteal;
        let mut hit = std::mem::take(&mut p.hit);
        let mut expired = false;

        if let Some(beam) = p.beam {
            let dir = Vec2::from_angle(beam.angle);
            let half_w = beam.width * 0.5;
            let origin = p.pos;
            let mut candidates = Vec::new();
            // Sample fixed points along the ray; each sample is a circle test.
            for i in 0..BEAM_SAMPLES {
                let t = (i as f32 + 0.5) / BEAM_SAMPLES as f32;
                let sample = origin + dir * beam.length * t;
                let range = Rect::centered(
                    sample,
                    half_w + COLLISION_QUERY_MARGIN,
                    half_w + COLLISION_QUERY_MARGIN,
                );
                candidates.clear();
                qt.query(&range, &mut candidates);
                for &(epos, entity) in &candidates {
                    if hit.contains(&entity) {
                        continue;
                    }
                    let Ok(enemy) = world.query_one_mut::<&mut Enemy>(entity) else {
                        continue;
                    };
                    let r = enemy.radius + half_w;
                    if enemy.dead || epos.distance_squared(sample) > r * r {
                        continue;
                    }
                    hit.insert(entity);
                    enemy.health -= damage;
                    lifesteal_heal += damage * lifesteal;
                    if enemy.health <= 0.0 {
                        enemy.dead = true;
                    }
                    pools.spawn_text(epos, damage, FloatingTextKind::Damage);
                }
            }
            // Beams carry a wide pierce budget but the rule is the same.
            if hit.len() as u32 >= pierce + 1 {
                expired = true;
            }
        } else {
            let pos = p.pos;
            let radius = p.radius;
            let range = Rect::centered(
                pos,
                radius + COLLISION_QUERY_MARGIN,
                radius + COLLISION_QUERY_MARGIN,
            );
            for (epos, entity) in qt.query_collect(&range) {
                if hit.contains(&entity) {
                    continue;
                }
                let Ok((enemy, boss)) =
                    world.query_one_mut::<(&mut Enemy, Option<&Boss>)>(entity)
                else {
                    continue;
                };
                let r = enemy.radius + radius;
                if enemy.dead || epos.distance_squared(pos) > r * r {
                    continue;
                }
                hit.insert(entity);
                enemy.health -= damage;
                lifesteal_heal += damage * lifesteal;
                // Bosses shrug off impulses.
                if boss.is_none() {
                    let dir = if (epos - pos).length_squared() > 1e-6 {
                        (epos - pos).normalize()
                    } else {
                        Vec2::X
                    };
                    enemy.knockback += dir * KNOCKBACK_FORCE * 0.1;
                }
                if enemy.health <= 0.0 {
                    enemy.dead = true;
                }
                pools.spawn_text(epos, damage, FloatingTextKind::Damage);
                pools.spawn_burst(rng, epos, 3, 1.5);
                // Pierce budget: the shot dies on its (pierce + 1)th victim.
                if hit.len() as u32 >= pierce + 1 {
                    expired = true;
                    break;
                }
            }
        }

        if let Some(p) = pools.projectiles.get_mut(idx) {
            p.hit = hit;
            if expired {
                p.expired = true;
            }
        }
    }

    // 2. Orbital orbs vs enemies.
    resolve_orbitals(world, player_entity, qt, pools, player_pos);

    // 3. Enemy contact vs the player. Dashing passes through.
    let mut contact: Option<(f32, Vec2)> = None;
    if !dashing {
        for (_, (pos, enemy)) in world.query::<(&Position, &Enemy)>().iter() {
            if enemy.dead {
                continue;
            }
            let r = enemy.radius + player_radius;
            if pos.0.distance_squared(player_pos) <= r * r {
                contact = Some((enemy.damage, pos.0));
                break;
            }
        }
    }
    if let Some((damage, from)) = contact {
        if let Ok(player) = world.query_one_mut::<&mut Player>(player_entity) {
            if damage_player(player, player_pos, damage, Some(from), pools, audio) {
                report.player_contact_hit = true;
            }
        }
    }

    // 4. Enemy projectiles vs the player.
    for idx in pools.enemy_projectiles.active_indices() {
        let (damage, from) = {
            let Some(p) = pools.enemy_projectiles.get_mut(idx) else { continue };
            if p.expired {
                continue;
            }
            let r = p.radius + player_radius;
            if p.pos.distance_squared(player_pos) > r * r {
                continue;
            }
            // A dashing player phases through; the shot flies on unspent.
            if dashing {
                continue;
            }
            p.expired = true;
            (p.damage, p.pos)
        };
        if let Ok(player) = world.query_one_mut::<&mut Player>(player_entity) {
            damage_player(player, player_pos, damage, Some(from), pools, audio);
        }
    }

    if lifesteal_heal > 0.0 {
        if let Ok(player) = world.query_one_mut::<&mut Player>(player_entity) {
            if player.health > 0.0 {
                player.health = (player.health + lifesteal_heal).min(player.max_health);
            }
        }
    }

    report
}

/// Apply damage to the player, honoring the dash window, i-frames, and
/// the aegis shield. Returns true when damage actually landed.
pub fn damage_player(
    player: &mut Player,
    player_pos: Vec2,
    damage: f32,
    source: Option<Vec2>,
    pools: &mut Pools,
    audio: &mut Vec<AudioEvent>,
) -> bool {
    if player.dash_timer > 0 || player.iframes > 0 || player.health <= 0.0 {
        return false;
    }
    if player.shield_ready {
        player.shield_ready = false;
        player.shield_timer = player.modifiers.shield_recharge;
        player.iframes = PLAYER_IFRAME_TICKS;
        audio.push(AudioEvent::ShieldBroken);
        return false;
    }
    player.health -= damage;
    player.iframes = PLAYER_IFRAME_TICKS;
    if let Some(from) = source {
        let away = player_pos - from;
        if away.length_squared() > 1e-6 {
            player.knockback += away.normalize() * KNOCKBACK_FORCE * 0.4;
        }
    }
    pools.spawn_text(player_pos, damage, FloatingTextKind::Damage);
    audio.push(AudioEvent::PlayerHit);
    true
}

/// Orbital orbs sweep around the player; each orb damages an enemy at
/// most once per revolution.
fn resolve_orbitals(
    world: &mut World,
    player_entity: Entity,
    qt: &Quadtree,
    pools: &mut Pools,
    player_pos: Vec2,
) {
    struct OrbHit {
        skill_idx: usize,
        orb_idx: usize,
        entity: Entity,
        orb_pos: Vec2,
        damage: f32,
    }
    // Orb positions derive from player skill state, so candidates are
    // collected under the shared borrow and damaged afterwards.
    let mut hits: Vec<OrbHit> = Vec::new();
    {
        let Ok(player) = world.query_one_mut::<&Player>(player_entity) else {
            return;
        };
        for (skill_idx, (id, state)) in player.skills.iter().enumerate() {
            let def = skill_def(*id);
            if def.kind != SkillKind::Orbital {
                continue;
            }
            let row = def.level(state.level);
            let mut damage = row.damage;
            if state.evolved {
                damage *= BULWARK_DAMAGE_MULT;
            }
            for (orb_idx, orb) in state.orbs.iter().enumerate() {
                let orb_pos = player_pos + Vec2::from_angle(orb.angle) * row.radius;
                let range =
                    Rect::centered(orb_pos, COLLISION_QUERY_MARGIN, COLLISION_QUERY_MARGIN);
                for (_, entity) in qt.query_collect(&range) {
                    if orb.hit.contains(&entity.to_bits().get()) {
                        continue;
                    }
                    hits.push(OrbHit {
                        skill_idx,
                        orb_idx,
                        entity,
                        orb_pos,
                        damage,
                    });
                }
            }
        }
    }

    let mut landed: Vec<(usize, usize, u64)> = Vec::new();
    for hit in &hits {
        let Ok((epos, enemy)) =
            world.query_one_mut::<(&Position, &mut Enemy)>(hit.entity)
        else {
            continue;
        };
        let r = enemy.radius + ORB_RADIUS;
        if enemy.dead || epos.0.distance_squared(hit.orb_pos) > r * r {
            continue;
        }
        let pos = epos.0;
        enemy.health -= hit.damage;
        if enemy.health <= 0.0 {
            enemy.dead = true;
        }
        pools.spawn_text(pos, hit.damage, FloatingTextKind::Damage);
        landed.push((hit.skill_idx, hit.orb_idx, hit.entity.to_bits().get()));
    }

    if !landed.is_empty() {
        if let Ok(player) = world.query_one_mut::<&mut Player>(player_entity) {
            for (skill_idx, orb_idx, bits) in landed {
                if let Some((_, state)) = player.skills.iter_mut().nth(skill_idx) {
                    if let Some(orb) = state.orbs.get_mut(orb_idx) {
                        orb.hit.insert(bits);
                    }
                }
            }
        }
    }
}
