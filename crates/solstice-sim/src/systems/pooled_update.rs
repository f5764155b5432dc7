//! Per-tick movement and expiry of pooled entities.
//!
//! Expiry here only marks; the cleanup system performs the actual pool
//! releases so death side effects happen in one place.

use hecs::{Entity, World};

use solstice_core::components::Player;
use solstice_core::constants::*;
use solstice_core::events::AudioEvent;
use solstice_core::types::Position;

use crate::pooled::Pools;

/// Upward drift of floating combat text per tick.
const TEXT_DRIFT: f32 = 0.6;
/// Per-tick particle velocity damping.
const PARTICLE_DRAG: f32 = 0.95;

pub fn run(
    world: &mut World,
    player_entity: Entity,
    pools: &mut Pools,
    xp_event_mult: f32,
    audio: &mut Vec<AudioEvent>,
) {
    for (_, p) in pools.projectiles.iter_active_mut() {
        // Beams flash in place; only point shots travel.
        if p.beam.is_none() {
            p.pos += p.vel;
            if p.pos.x < -p.radius
                || p.pos.x > WORLD_WIDTH + p.radius
                || p.pos.y < -p.radius
                || p.pos.y > WORLD_HEIGHT + p.radius
            {
                p.expired = true;
            }
        }
        p.ttl = p.ttl.saturating_sub(1);
        if p.ttl == 0 {
            p.expired = true;
        }
    }

    for (_, p) in pools.enemy_projectiles.iter_active_mut() {
        p.pos += p.vel;
        p.ttl = p.ttl.saturating_sub(1);
        if p.ttl == 0
            || p.pos.x < -p.radius
            || p.pos.x > WORLD_WIDTH + p.radius
            || p.pos.y < -p.radius
            || p.pos.y > WORLD_HEIGHT + p.radius
        {
            p.expired = true;
        }
    }

    // XP orbs home toward the player inside the (modified) attraction
    // radius and are banked on contact.
    if let Ok((pos, player)) = world.query_one_mut::<(&Position, &mut Player)>(player_entity) {
        let attraction = PICKUP_ATTRACTION_RADIUS * player.modifiers.pickup_radius_mult;
        for (_, orb) in pools.xp_orbs.iter_active_mut() {
            let to_player = pos.0 - orb.pos;
            let dist = to_player.length();
            if dist < PICKUP_COLLECT_RADIUS {
                player.xp += orb.value * player.modifiers.xp_mult * xp_event_mult;
                orb.expired = true;
                audio.push(AudioEvent::XpCollected);
                continue;
            }
            if dist < attraction && dist > 1e-3 {
                orb.vel += (to_player / dist) * PICKUP_ATTRACTION_ACCEL;
            } else {
                orb.vel *= 0.9;
            }
            orb.pos += orb.vel;
        }
    }

    for (_, t) in pools.floating_texts.iter_active_mut() {
        t.pos.y -= TEXT_DRIFT;
        t.ttl = t.ttl.saturating_sub(1);
        if t.ttl == 0 {
            t.expired = true;
        }
    }

    for (_, p) in pools.particles.iter_active_mut() {
        p.pos += p.vel;
        p.vel *= PARTICLE_DRAG;
        p.ttl = p.ttl.saturating_sub(1);
        if p.ttl == 0 {
            p.expired = true;
        }
    }
}
