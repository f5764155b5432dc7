//! Area effects: vortexes, static fields, sanctuaries, explosions, and
//! meteor warnings.
//!
//! Enemy `slow` is a resolved quantity: it is reset to zero here every
//! tick and set to the strongest overlapping factor, so stacked fields
//! never compound.

use glam::Vec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use solstice_core::components::{AreaEffect, Enemy, Player};
use solstice_core::constants::*;
use solstice_core::enums::{AreaEffectKind, FloatingTextKind};
use solstice_core::events::AudioEvent;
use solstice_core::types::Position;

use crate::pooled::Pools;
use crate::systems::combat;

/// Ticks an explosion lingers at full radius after growing.
const EXPLOSION_LINGER_TICKS: u32 = 12;

struct EffectInfo {
    id: u64,
    kind: AreaEffectKind,
    pos: Vec2,
    radius: f32,
    damage: f32,
    slow: f32,
    pull: f32,
    regen_per_sec: f32,
    /// Periodic damage fires this tick.
    pulse: bool,
}

/// Advance every area effect one tick and apply its field to enemies and
/// the player. Expired meteor warnings convert into explosions.
pub fn run(
    world: &mut World,
    player_entity: Entity,
    pools: &mut Pools,
    rng: &mut ChaCha8Rng,
    next_effect_id: &mut u64,
    audio: &mut Vec<AudioEvent>,
) {
    let mut effects: Vec<EffectInfo> = Vec::new();
    let mut impacts: Vec<Vec2> = Vec::new();

    // Age pass: lifetimes, explosion growth, warning conversion.
    for (_, (pos, effect)) in world.query_mut::<(&Position, &mut AreaEffect)>() {
        if effect.dead {
            continue;
        }
        effect.age += 1;
        effect.duration = effect.duration.saturating_sub(1);
        if effect.duration == 0 {
            effect.dead = true;
            if effect.kind == AreaEffectKind::MeteorWarning {
                impacts.push(pos.0);
            }
            continue;
        }
        if effect.kind == AreaEffectKind::Explosion {
            let t = (effect.age as f32 / EXPLOSION_GROWTH_TICKS as f32).min(1.0);
            effect.radius = effect.max_radius * t;
        }
        // An evolved vortex pulses twice as often.
        let period = if effect.evolved && effect.kind == AreaEffectKind::Vortex {
            AREA_DAMAGE_PERIOD / 2
        } else {
            AREA_DAMAGE_PERIOD
        };
        let pulse = effect.damage > 0.0
            && match effect.kind {
                AreaEffectKind::Explosion => true,
                AreaEffectKind::MeteorWarning => false,
                AreaEffectKind::Sanctuary => effect.evolved && effect.age % period == 0,
                _ => effect.age % period == 0,
            };
        effects.push(EffectInfo {
            id: effect.id,
            kind: effect.kind,
            pos: pos.0,
            radius: effect.radius,
            damage: effect.damage,
            slow: effect.slow,
            pull: effect.pull,
            regen_per_sec: effect.regen_per_sec,
            pulse,
        });
    }

    for pos in impacts {
        spawn_explosion(
            world,
            next_effect_id,
            pos,
            METEOR_EXPLOSION_RADIUS,
            METEOR_EXPLOSION_DAMAGE,
        );
        pools.spawn_burst(rng, pos, 16, 3.5);
        audio.push(AudioEvent::Explosion);
    }

    // Field pass over enemies: strongest slow wins, pulls accumulate,
    // pulses damage, explosions damage each enemy at most once.
    for (_, enemy) in world.query_mut::<&mut Enemy>() {
        enemy.slow = 0.0;
    }
    for info in &effects {
        let radius_sq = info.radius * info.radius;
        for (_, (pos, enemy)) in world.query_mut::<(&mut Position, &mut Enemy)>() {
            if enemy.dead || pos.0.distance_squared(info.pos) > radius_sq {
                continue;
            }
            if info.slow > enemy.slow {
                enemy.slow = info.slow;
            }
            if info.pull > 0.0 {
                let to_center = info.pos - pos.0;
                if to_center.length_squared() > 1.0 {
                    pos.0 += to_center.normalize() * info.pull;
                }
            }
            if info.pulse {
                let once = info.kind == AreaEffectKind::Explosion;
                if once && !enemy.hit_by.insert(info.id) {
                    continue;
                }
                enemy.health -= info.damage;
                if enemy.health <= 0.0 {
                    enemy.dead = true;
                }
                pools.spawn_text(pos.0, info.damage, FloatingTextKind::Damage);
            }
        }
    }

    // Player pass: sanctuary healing and hostile explosions.
    let Ok((ppos, player)) = world.query_one_mut::<(&Position, &mut Player)>(player_entity)
    else {
        return;
    };
    let player_pos = ppos.0;
    for info in &effects {
        let r = info.radius + player.radius;
        if player_pos.distance_squared(info.pos) > r * r {
            continue;
        }
        match info.kind {
            AreaEffectKind::Sanctuary => {
                if info.regen_per_sec > 0.0 && player.health > 0.0 {
                    player.health =
                        (player.health + info.regen_per_sec * DT as f32).min(player.max_health);
                }
            }
            AreaEffectKind::Explosion => {
                combat::damage_player(player, player_pos, info.damage, Some(info.pos), pools, audio);
            }
            _ => {}
        }
    }
}

/// Spawn an explosion that grows from zero to `radius`, damaging each
/// enemy it touches exactly once.
pub fn spawn_explosion(
    world: &mut World,
    next_effect_id: &mut u64,
    pos: Vec2,
    radius: f32,
    damage: f32,
) {
    let id = *next_effect_id;
    *next_effect_id += 1;
    world.spawn((
        Position(pos),
        AreaEffect {
            kind: AreaEffectKind::Explosion,
            id,
            radius: 0.0,
            max_radius: radius,
            duration: EXPLOSION_GROWTH_TICKS + EXPLOSION_LINGER_TICKS,
            age: 0,
            damage,
            slow: 0.0,
            pull: 0.0,
            regen_per_sec: 0.0,
            evolved: false,
            dead: false,
        },
    ));
}

/// Spawn a meteor warning marker that detonates when its delay elapses.
pub fn spawn_meteor_warning(world: &mut World, next_effect_id: &mut u64, pos: Vec2) {
    let id = *next_effect_id;
    *next_effect_id += 1;
    world.spawn((
        Position(pos),
        AreaEffect {
            kind: AreaEffectKind::MeteorWarning,
            id,
            radius: METEOR_EXPLOSION_RADIUS,
            max_radius: METEOR_EXPLOSION_RADIUS,
            duration: METEOR_WARNING_DELAY_TICKS,
            age: 0,
            damage: 0.0,
            slow: 0.0,
            pull: 0.0,
            regen_per_sec: 0.0,
            evolved: false,
            dead: false,
        },
    ));
}
