//! Ability system: skill acquisition, leveling, evolution, fusion,
//! cooldown-gated execution, orbital state, and level-up offers.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use glam::Vec2;
use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use solstice_core::components::{AreaEffect, Enemy, OrbitalOrb, Player, SkillState};
use solstice_core::constants::*;
use solstice_core::enums::*;
use solstice_core::events::AudioEvent;
use solstice_core::progression::{upgrade_def, xp_threshold};
use solstice_core::skills::{
    character_def, skill_def, EVOLUTIONS, FUSIONS, LANCE_OF_DAWN_LIFESTEAL, OFFERABLE_SKILLS,
};
use solstice_core::state::{LevelUpChoice, LevelUpOffer};
use solstice_core::types::Position;

use crate::pooled::{Beam, Pools};
use crate::quadtree::Quadtree;

/// A skill execution decided during the timer pass, run once the player
/// borrow is released.
struct Execution {
    id: SkillId,
    level: u32,
    evolved: bool,
}

/// Advance cooldowns and orbital state, then execute every skill whose
/// gate opened this tick. Orbital and passive skills have no cooldown
/// gate; their effects are continuous.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut World,
    player_entity: Entity,
    qt: &Quadtree,
    pools: &mut Pools,
    rng: &mut ChaCha8Rng,
    next_effect_id: &mut u64,
    audio: &mut Vec<AudioEvent>,
) {
    let mut executions: Vec<Execution> = Vec::new();
    let player_pos;
    let damage_mult;
    let facing;
    {
        let Ok((pos, player)) = world.query_one_mut::<(&Position, &mut Player)>(player_entity)
        else {
            return;
        };
        player_pos = pos.0;
        damage_mult = player.modifiers.damage_mult;
        facing = player.facing;

        for (id, state) in player.skills.iter_mut() {
            let def = skill_def(*id);
            match def.kind {
                SkillKind::Projectile | SkillKind::Beam | SkillKind::Chain | SkillKind::Area => {
                    if state.cooldown > 0 {
                        state.cooldown -= 1;
                    }
                    if state.cooldown == 0 {
                        state.cooldown = def.cooldown;
                        executions.push(Execution {
                            id: *id,
                            level: state.level,
                            evolved: state.evolved,
                        });
                    }
                }
                SkillKind::Orbital => advance_orbitals(state, def.level(state.level).count),
                SkillKind::Passive | SkillKind::Utility => {}
            }
        }
    }

    for exec in executions {
        let def = skill_def(exec.id);
        let row = *def.level(exec.level);
        match def.kind {
            SkillKind::Projectile => {
                let aim = qt
                    .nearest(player_pos, NEAREST_ENEMY_SEARCH_RADIUS)
                    .map(|(_, p)| p);
                let base_dir = match aim {
                    Some(target) if target != player_pos => (target - player_pos).normalize(),
                    _ => Vec2::new(facing, 0.0),
                };
                let base_angle = base_dir.y.atan2(base_dir.x);
                let count = row.count.max(1);
                for i in 0..count {
                    let angle = if row.ring {
                        base_angle + i as f32 * TAU / count as f32
                    } else {
                        base_angle + (i as f32 - (count as f32 - 1.0) * 0.5) * VOLLEY_SPREAD
                    };
                    let lifesteal = if exec.evolved { LANCE_OF_DAWN_LIFESTEAL } else { 0.0 };
                    pools.projectiles.acquire(|p| {
                        p.pos = player_pos;
                        p.vel = Vec2::from_angle(angle) * row.speed;
                        p.radius = PROJECTILE_RADIUS;
                        p.damage = row.damage * damage_mult;
                        p.pierce = row.pierce;
                        p.ttl = PROJECTILE_TTL;
                        p.lifesteal = lifesteal;
                        p.spawns_vortex = row.spawns_vortex;
                    });
                }
                audio.push(AudioEvent::SkillFired { skill: exec.id });
            }
            SkillKind::Beam => {
                let aim = qt
                    .nearest(player_pos, NEAREST_ENEMY_SEARCH_RADIUS)
                    .map(|(_, p)| p);
                let dir = match aim {
                    Some(target) if target != player_pos => (target - player_pos).normalize(),
                    _ => Vec2::new(facing, 0.0),
                };
                pools.projectiles.acquire(|p| {
                    p.pos = player_pos;
                    p.radius = row.width * 0.5;
                    p.damage = row.damage * damage_mult;
                    p.pierce = row.pierce;
                    p.ttl = BEAM_TTL;
                    p.beam = Some(Beam {
                        angle: dir.y.atan2(dir.x),
                        length: row.length,
                        width: row.width,
                    });
                });
                audio.push(AudioEvent::SkillFired { skill: exec.id });
            }
            SkillKind::Chain => {
                chain_strike(
                    world,
                    qt,
                    pools,
                    rng,
                    player_pos,
                    row.damage * damage_mult,
                    row.chains,
                    row.chain_radius,
                );
                audio.push(AudioEvent::SkillFired { skill: exec.id });
            }
            SkillKind::Area => {
                let Some(kind) = def.area_kind else { continue };
                // Vortexes drop on the nearest enemy; zones center on the player.
                let pos = match kind {
                    AreaEffectKind::Vortex => qt
                        .nearest(player_pos, NEAREST_ENEMY_SEARCH_RADIUS)
                        .map(|(_, p)| p)
                        .unwrap_or(player_pos),
                    _ => player_pos,
                };
                let id = *next_effect_id;
                *next_effect_id += 1;
                let evolved = exec.evolved;
                world.spawn((
                    Position(pos),
                    AreaEffect {
                        kind,
                        id,
                        radius: row.radius,
                        max_radius: row.radius,
                        duration: row.duration,
                        age: 0,
                        damage: row.damage * damage_mult,
                        slow: row.slow,
                        pull: if evolved { row.pull * 2.0 } else { row.pull },
                        regen_per_sec: row.regen_per_sec,
                        evolved,
                        dead: false,
                    },
                ));
                audio.push(AudioEvent::SkillFired { skill: exec.id });
            }
            SkillKind::Orbital | SkillKind::Passive | SkillKind::Utility => {}
        }
    }
}

/// Advance orb angles; a wrap past a full turn clears that orb's
/// per-revolution hit-set. Orb count follows the level row.
fn advance_orbitals(state: &mut SkillState, count: u32) {
    let count = count.max(1) as usize;
    if state.orbs.len() != count {
        let base = state.orbs.first().map(|o| o.angle).unwrap_or(0.0);
        state.orbs.resize_with(count, OrbitalOrb::default);
        for (i, orb) in state.orbs.iter_mut().enumerate() {
            orb.angle = base + i as f32 * TAU / count as f32;
        }
    }
    for orb in &mut state.orbs {
        orb.angle = (orb.angle + ORBITAL_ANGULAR_SPEED).rem_euclid(TAU);
        orb.swept += ORBITAL_ANGULAR_SPEED;
        if orb.swept >= TAU {
            orb.swept -= TAU;
            orb.hit.clear();
        }
    }
}

/// Strike the nearest enemy, then arc to the nearest unhit enemy within
/// the chain radius, up to `chains` jumps.
#[allow(clippy::too_many_arguments)]
fn chain_strike(
    world: &mut World,
    qt: &Quadtree,
    pools: &mut Pools,
    rng: &mut ChaCha8Rng,
    from: Vec2,
    damage: f32,
    chains: u32,
    chain_radius: f32,
) {
    let Some((first, first_pos)) = qt.nearest(from, NEAREST_ENEMY_SEARCH_RADIUS) else {
        return;
    };
    let mut struck = vec![first];
    let mut cursor = first_pos;
    apply_chain_damage(world, pools, rng, first, cursor, damage);

    for _ in 0..chains {
        let candidates = qt.query_collect(&solstice_core::types::Rect::centered(
            cursor,
            chain_radius,
            chain_radius,
        ));
        let mut best: Option<(Entity, Vec2)> = None;
        let mut best_d = chain_radius * chain_radius;
        for (p, e) in candidates {
            if struck.contains(&e) {
                continue;
            }
            let d = cursor.distance_squared(p);
            if d < best_d {
                best_d = d;
                best = Some((e, p));
            }
        }
        let Some((next, next_pos)) = best else { break };
        struck.push(next);
        cursor = next_pos;
        apply_chain_damage(world, pools, rng, next, cursor, damage);
    }
}

fn apply_chain_damage(
    world: &mut World,
    pools: &mut Pools,
    rng: &mut ChaCha8Rng,
    entity: Entity,
    pos: Vec2,
    damage: f32,
) {
    if let Ok(enemy) = world.query_one_mut::<&mut Enemy>(entity) {
        if enemy.dead {
            return;
        }
        enemy.health -= damage;
        if enemy.health <= 0.0 {
            enemy.dead = true;
        }
        pools.spawn_text(pos, damage, FloatingTextKind::Damage);
        pools.spawn_burst(rng, pos, 4, 2.0);
    }
}

/// Acquire a new skill at level 1 or raise a held skill by one level,
/// clamped to the authored max. Utility skills apply immediately and are
/// not retained. Recomputes the cached stat modifiers.
pub fn grant_skill(
    world: &mut World,
    player_entity: Entity,
    skill: SkillId,
    upgrades: &BTreeMap<UpgradeId, u32>,
    pools: &mut Pools,
) {
    let Ok((pos, player)) = world.query_one_mut::<(&Position, &mut Player)>(player_entity) else {
        return;
    };
    let def = skill_def(skill);

    if def.kind == SkillKind::Utility {
        let row = def.level(1);
        if row.heal_fraction > 0.0 {
            let amount = player.max_health * row.heal_fraction;
            player.health = (player.health + amount).min(player.max_health);
            pools.spawn_text(pos.0, amount, FloatingTextKind::Heal);
        }
        return;
    }

    let state = player.skills.entry(skill).or_insert_with(|| SkillState {
        level: 0,
        cooldown: def.cooldown,
        evolved: false,
        orbs: Vec::new(),
    });
    state.level = (state.level + 1).min(def.max_level());

    if def.kind == SkillKind::Orbital {
        let count = def.level(state.level).count.max(1) as usize;
        state.orbs.resize_with(count, OrbitalOrb::default);
        for (i, orb) in state.orbs.iter_mut().enumerate() {
            orb.angle = i as f32 * TAU / count as f32;
        }
    }

    recompute_modifiers(player, upgrades);
}

/// Recompute the cached stat modifiers from the character, permanent
/// upgrades, and held passives. Called on acquisition/level-change only.
pub fn recompute_modifiers(player: &mut Player, upgrades: &BTreeMap<UpgradeId, u32>) {
    let character = character_def(player.character);
    let mut m = solstice_core::components::StatModifiers {
        damage_mult: character.damage_mult,
        max_health_mult: character.max_health_mult,
        speed_mult: character.speed_mult,
        ..Default::default()
    };

    for (&id, &level) in upgrades {
        let def = upgrade_def(id);
        let level = level.min(def.max_level);
        let bonus = def.per_level * level as f32;
        match id {
            UpgradeId::Vitality => m.max_health_mult *= 1.0 + bonus,
            UpgradeId::Might => m.damage_mult *= 1.0 + bonus,
            UpgradeId::Reach => m.pickup_radius_mult *= 1.0 + bonus,
            UpgradeId::Greed => {} // applied to currency at award time
        }
    }

    for (id, state) in &player.skills {
        let def = skill_def(*id);
        if def.kind != SkillKind::Passive {
            continue;
        }
        let row = def.level(state.level);
        m.damage_mult *= 1.0 + row.damage_bonus;
        m.xp_mult *= 1.0 + row.xp_bonus;
        m.pickup_radius_mult *= row.pickup_mult;
        m.regen_per_sec += row.regen_per_sec;
        m.enemy_count_mult *= 1.0 + row.enemy_count_bonus;
        if row.shield_recharge > 0 {
            m.shield_recharge = if m.shield_recharge == 0 {
                row.shield_recharge
            } else {
                m.shield_recharge.min(row.shield_recharge)
            };
        }
    }

    // Gaining the shield passive arms the shield immediately.
    if m.shield_recharge > 0 && player.modifiers.shield_recharge == 0 {
        player.shield_ready = true;
    }

    let old_max = player.max_health;
    player.max_health = PLAYER_MAX_HEALTH * m.max_health_mult;
    if player.max_health > old_max {
        player.health += player.max_health - old_max;
    }
    player.modifiers = m;
}

/// Whether an evolution's gate is open: base skill at max level, the
/// prerequisite passive held, and not yet evolved.
pub fn evolution_eligible(player: &Player, evolution: EvolutionId) -> bool {
    let Some(def) = EVOLUTIONS.iter().find(|e| e.id == evolution) else {
        return false;
    };
    let Some(base) = player.skills.get(&def.base_skill) else {
        return false;
    };
    base.level == skill_def(def.base_skill).max_level()
        && !base.evolved
        && player.skills.contains_key(&def.passive_req)
}

/// Whether a fusion's gate is open: both inputs at max level and the
/// result not yet held.
pub fn fusion_eligible(player: &Player, fusion: FusionId) -> bool {
    let Some(def) = FUSIONS.iter().find(|f| f.id == fusion) else {
        return false;
    };
    let at_max = |id: SkillId| {
        player
            .skills
            .get(&id)
            .is_some_and(|s| s.level == skill_def(id).max_level())
    };
    at_max(def.skill_a) && at_max(def.skill_b) && !player.skills.contains_key(&def.result)
}

/// Apply a chosen evolution: a one-time, permanent behavior change.
pub fn apply_evolution(
    world: &mut World,
    player_entity: Entity,
    evolution: EvolutionId,
    audio: &mut Vec<AudioEvent>,
) -> bool {
    let Ok(player) = world.query_one_mut::<&mut Player>(player_entity) else {
        return false;
    };
    if !evolution_eligible(player, evolution) {
        return false;
    }
    let Some(def) = EVOLUTIONS.iter().find(|e| e.id == evolution) else {
        return false;
    };
    if let Some(state) = player.skills.get_mut(&def.base_skill) {
        state.evolved = true;
    }
    audio.push(AudioEvent::Evolved { evolution });
    true
}

/// Apply a chosen fusion: both inputs are consumed and the compound skill
/// is granted at level 1.
pub fn apply_fusion(
    world: &mut World,
    player_entity: Entity,
    fusion: FusionId,
    upgrades: &BTreeMap<UpgradeId, u32>,
    audio: &mut Vec<AudioEvent>,
) -> bool {
    {
        let Ok(player) = world.query_one_mut::<&mut Player>(player_entity) else {
            return false;
        };
        if !fusion_eligible(player, fusion) {
            return false;
        }
        let Some(def) = FUSIONS.iter().find(|f| f.id == fusion) else {
            return false;
        };
        player.skills.remove(&def.skill_a);
        player.skills.remove(&def.skill_b);
        let result_def = skill_def(def.result);
        player.skills.insert(
            def.result,
            SkillState {
                level: 1,
                cooldown: result_def.cooldown,
                evolved: false,
                orbs: Vec::new(),
            },
        );
        recompute_modifiers(player, upgrades);
    }
    audio.push(AudioEvent::Fused { fusion });
    true
}

/// Consume banked XP into levels. Returns how many level-ups occurred.
pub fn check_level_ups(player: &mut Player) -> u32 {
    let mut gained = 0;
    while player.xp >= player.xp_to_next {
        player.xp -= player.xp_to_next;
        player.level += 1;
        player.xp_to_next = xp_threshold(player.level);
        player.pending_level_ups += 1;
        gained += 1;
    }
    gained
}

/// Build a level-up offer: eligible evolutions and fusions first, then
/// random skill picks. A heal pads the offer when candidates run short.
pub fn build_offer(world: &World, player_entity: Entity, rng: &mut ChaCha8Rng) -> LevelUpOffer {
    let mut choices: Vec<LevelUpChoice> = Vec::new();
    let Ok(player) = world.get::<&Player>(player_entity) else {
        return LevelUpOffer::default();
    };

    for evo in EVOLUTIONS {
        if evolution_eligible(&player, evo.id) {
            choices.push(LevelUpChoice::Evolution { evolution: evo.id });
        }
    }
    for fusion in FUSIONS {
        if fusion_eligible(&player, fusion.id) {
            choices.push(LevelUpChoice::Fusion { fusion: fusion.id });
        }
    }

    let slots = LEVEL_UP_CHOICES.saturating_sub(choices.len());
    if slots > 0 {
        let mut candidates: Vec<SkillId> = Vec::new();
        for (id, state) in &player.skills {
            if state.level < skill_def(*id).max_level() {
                candidates.push(*id);
            }
        }
        for &id in OFFERABLE_SKILLS {
            if !player.skills.contains_key(&id) {
                candidates.push(id);
            }
        }
        candidates.shuffle(rng);
        candidates.truncate(slots);
        if candidates.len() < slots {
            candidates.push(SkillId::Heal);
        }
        for id in candidates {
            let next_level = player.skills.get(&id).map(|s| s.level + 1).unwrap_or(1);
            choices.push(LevelUpChoice::Skill {
                skill: id,
                next_level,
            });
        }
    }

    LevelUpOffer { choices }
}
