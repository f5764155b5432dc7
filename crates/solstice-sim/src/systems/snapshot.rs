//! Snapshot construction: flatten the live state into the serializable
//! view structs sent to the frontend.

use glam::Vec2;
use hecs::{Entity, Without, World};

use solstice_core::components::{AreaEffect, Boss, Enemy, Player, PowerUp};
use solstice_core::constants::DASH_COOLDOWN_TICKS;
use solstice_core::enums::{ChargePhase, GamePhase, SkillKind};
use solstice_core::events::{AudioEvent, ProfileEvent};
use solstice_core::skills::skill_def;
use solstice_core::state::*;
use solstice_core::types::{Position, SimTime};

use crate::pooled::Pools;
use crate::systems::event_manager::EventManager;
use crate::systems::wave_scheduler::WaveScheduler;

#[allow(clippy::too_many_arguments)]
pub fn build(
    world: &World,
    player_entity: Entity,
    pools: &Pools,
    time: SimTime,
    phase: GamePhase,
    camera: CameraView,
    waves: &WaveScheduler,
    events: &EventManager,
    level_up: Option<LevelUpOffer>,
    score: ScoreView,
    audio_events: Vec<AudioEvent>,
    profile_events: Vec<ProfileEvent>,
) -> GameStateSnapshot {
    let mut player_view = PlayerView::default();
    let mut orbitals = Vec::new();
    if let Ok(mut q) = world.query_one::<(&Position, &Player)>(player_entity) {
        if let Some((pos, player)) = q.get() {
            let mut skills = Vec::with_capacity(player.skills.len());
            for (id, state) in &player.skills {
                let def = skill_def(*id);
                let cooldown_frac = match def.kind {
                    SkillKind::Projectile
                    | SkillKind::Beam
                    | SkillKind::Chain
                    | SkillKind::Area
                        if def.cooldown > 0 =>
                    {
                        state.cooldown as f32 / def.cooldown as f32
                    }
                    _ => 0.0,
                };
                skills.push(SkillView {
                    id: *id,
                    level: state.level,
                    evolved: state.evolved,
                    cooldown_frac,
                });
                if def.kind == SkillKind::Orbital {
                    let row = def.level(state.level);
                    for orb in &state.orbs {
                        orbitals.push(OrbitalView {
                            skill: *id,
                            position: pos.0 + Vec2::from_angle(orb.angle) * row.radius,
                            angle: orb.angle,
                        });
                    }
                }
            }
            player_view = PlayerView {
                position: pos.0,
                radius: player.radius,
                facing: player.facing,
                health: player.health.max(0.0),
                max_health: player.max_health,
                xp: player.xp,
                xp_to_next: player.xp_to_next,
                level: player.level,
                dash_cooldown_frac: player.dash_cooldown as f32 / DASH_COOLDOWN_TICKS as f32,
                dashing: player.dash_timer > 0,
                invincible: player.iframes > 0,
                shield_ready: player.shield_ready,
                skills,
            };
        }
    }

    let mut enemies = Vec::new();
    let mut alive = 0u32;
    for (_, (pos, enemy)) in world
        .query::<Without<(&Position, &Enemy), &Boss>>()
        .iter()
    {
        if enemy.dead {
            continue;
        }
        alive += 1;
        enemies.push(EnemyView {
            position: pos.0,
            radius: enemy.radius,
            kind: enemy.kind,
            elite: enemy.elite,
            health_frac: (enemy.health / enemy.max_health).clamp(0.0, 1.0),
            charging: matches!(
                enemy.charge_phase,
                ChargePhase::Windup | ChargePhase::Charge
            ),
        });
    }

    let mut boss = None;
    for (_, (pos, enemy, b)) in world.query::<(&Position, &Enemy, &Boss)>().iter() {
        if enemy.dead {
            continue;
        }
        alive += 1;
        boss = Some(BossView {
            position: pos.0,
            radius: enemy.radius,
            phase: b.phase,
            health_frac: (enemy.health / enemy.max_health).clamp(0.0, 1.0),
            attack: b.attack,
        });
    }

    let projectiles = pools
        .projectiles
        .iter_active()
        .map(|(_, p)| ProjectileView {
            position: p.pos,
            radius: p.radius,
            beam: p.beam.map(|b| BeamView {
                angle: b.angle,
                length: b.length,
                width: b.width,
            }),
        })
        .collect();
    let enemy_projectiles = pools
        .enemy_projectiles
        .iter_active()
        .map(|(_, p)| ProjectileView {
            position: p.pos,
            radius: p.radius,
            beam: None,
        })
        .collect();
    let xp_orbs = pools
        .xp_orbs
        .iter_active()
        .map(|(_, o)| XpOrbView {
            position: o.pos,
            value: o.value,
        })
        .collect();
    let floating_texts = pools
        .floating_texts
        .iter_active()
        .map(|(_, t)| FloatingTextView {
            position: t.pos,
            value: t.value,
            kind: t.kind,
            life_frac: if t.max_ttl > 0 {
                t.ttl as f32 / t.max_ttl as f32
            } else {
                0.0
            },
        })
        .collect();
    let particles = pools
        .particles
        .iter_active()
        .map(|(_, p)| ParticleView {
            position: p.pos,
            size: p.size,
            life_frac: if p.max_ttl > 0 {
                p.ttl as f32 / p.max_ttl as f32
            } else {
                0.0
            },
        })
        .collect();

    let mut power_ups = Vec::new();
    for (_, (pos, power_up)) in world.query::<(&Position, &PowerUp)>().iter() {
        if power_up.dead {
            continue;
        }
        power_ups.push(PowerUpView {
            position: pos.0,
            kind: power_up.kind,
            radius: power_up.radius,
        });
    }

    let mut area_effects = Vec::new();
    for (_, (pos, effect)) in world.query::<(&Position, &AreaEffect)>().iter() {
        if effect.dead {
            continue;
        }
        let total = effect.age + effect.duration;
        area_effects.push(AreaEffectView {
            position: pos.0,
            kind: effect.kind,
            radius: effect.radius,
            remaining_frac: if total > 0 {
                effect.duration as f32 / total as f32
            } else {
                0.0
            },
            evolved: effect.evolved,
        });
    }

    GameStateSnapshot {
        time,
        phase,
        player: player_view,
        camera,
        enemies,
        boss,
        projectiles,
        enemy_projectiles,
        xp_orbs,
        power_ups,
        floating_texts,
        particles,
        area_effects,
        orbitals,
        wave: WaveView {
            number: waves.number,
            phase: waves.phase,
            is_boss_wave: waves.boss_wave,
            remaining: waves.pending() + alive,
        },
        event: events.view(),
        level_up,
        score,
        audio_events,
        profile_events,
    }
}
