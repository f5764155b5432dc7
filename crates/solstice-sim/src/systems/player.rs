//! Player movement, physics, and per-tick timers.

use glam::Vec2;
use hecs::{Entity, World};

use solstice_core::components::Player;
use solstice_core::constants::*;
use solstice_core::events::AudioEvent;
use solstice_core::types::{Position, Rect};

/// Normalized input for one tick. Edges are consumed by the player system.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub move_x: f32,
    pub move_y: f32,
    pub jump_queued: bool,
    pub dash_queued: bool,
}

/// Advance the player one tick: horizontal movement, gravity, platform
/// landings, jump (with coyote time and buffering), dash, knockback,
/// i-frames, shield recharge, and passive regen.
pub fn run(
    world: &mut World,
    player_entity: Entity,
    input: &mut InputState,
    platforms: &[Rect],
    gravity: f32,
    audio: &mut Vec<AudioEvent>,
) {
    let Ok((pos, player)) = world.query_one_mut::<(&mut Position, &mut Player)>(player_entity)
    else {
        return;
    };

    // Timers.
    player.iframes = player.iframes.saturating_sub(1);
    player.dash_cooldown = player.dash_cooldown.saturating_sub(1);
    player.coyote = player.coyote.saturating_sub(1);
    player.jump_buffer = player.jump_buffer.saturating_sub(1);
    if !player.shield_ready && player.modifiers.shield_recharge > 0 {
        player.shield_timer = player.shield_timer.saturating_sub(1);
        if player.shield_timer == 0 {
            player.shield_ready = true;
        }
    }

    // Passive regen, fractional-accumulated so low rates still land.
    if player.modifiers.regen_per_sec > 0.0 && player.health > 0.0 {
        player.regen_accum += player.modifiers.regen_per_sec * DT as f32;
        if player.regen_accum >= 1.0 {
            let whole = player.regen_accum.floor();
            player.health = (player.health + whole).min(player.max_health);
            player.regen_accum -= whole;
        }
    }

    // Jump buffering: a press is remembered for a few ticks.
    if input.jump_queued {
        player.jump_buffer = JUMP_BUFFER_TICKS;
        input.jump_queued = false;
    }

    // Dash start.
    if input.dash_queued {
        input.dash_queued = false;
        if player.dash_cooldown == 0 && player.dash_timer == 0 {
            player.dash_timer = DASH_DURATION_TICKS;
            player.dash_cooldown = DASH_COOLDOWN_TICKS;
            player.dash_dir = if input.move_x.abs() > 0.05 {
                input.move_x.signum()
            } else {
                player.facing
            };
            audio.push(AudioEvent::Dash);
        }
    }

    // Horizontal velocity.
    if player.dash_timer > 0 {
        player.dash_timer -= 1;
        player.velocity.x = player.dash_dir * DASH_SPEED;
        player.velocity.y = 0.0;
    } else {
        player.velocity.x = input.move_x * PLAYER_SPEED * player.modifiers.speed_mult;
        if input.move_x.abs() > 0.05 {
            player.facing = input.move_x.signum();
        }
        // Gravity (the live value: events may have modified it).
        player.velocity.y = (player.velocity.y + gravity).min(PLAYER_MAX_FALL_SPEED);
    }

    // Jump: grounded or within the coyote window.
    if player.jump_buffer > 0 && (player.grounded || player.coyote > 0) && player.dash_timer == 0 {
        player.velocity.y = -PLAYER_JUMP_VELOCITY;
        player.grounded = false;
        player.coyote = 0;
        player.jump_buffer = 0;
    }

    // Knockback decays like enemy knockback.
    let step = player.velocity + player.knockback;
    player.knockback *= KNOCKBACK_DECAY;
    if player.knockback.length_squared() < KNOCKBACK_EPSILON * KNOCKBACK_EPSILON {
        player.knockback = Vec2::ZERO;
    }

    // Integrate with platform landings (land only while falling).
    let prev_bottom = pos.0.y + player.radius;
    let was_grounded = player.grounded;
    pos.0 += step;
    player.grounded = false;
    if step.y >= 0.0 {
        for plat in platforms {
            let bottom = pos.0.y + player.radius;
            let on_x = pos.0.x + player.radius > plat.x && pos.0.x - player.radius < plat.x + plat.w;
            if on_x && prev_bottom <= plat.y && bottom >= plat.y {
                pos.0.y = plat.y - player.radius;
                player.velocity.y = 0.0;
                player.grounded = true;
                break;
            }
        }
    }
    if was_grounded && !player.grounded {
        player.coyote = COYOTE_TICKS;
    }

    // Clamp into world bounds.
    pos.0.x = pos.0.x.clamp(player.radius, WORLD_WIDTH - player.radius);
    if pos.0.y > WORLD_HEIGHT - player.radius {
        pos.0.y = WORLD_HEIGHT - player.radius;
        player.velocity.y = 0.0;
        player.grounded = true;
    }
}
