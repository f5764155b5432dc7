//! Randomized world events: one active at a time, separated by a
//! randomized idle interval.

use glam::Vec2;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use solstice_core::constants::*;
use solstice_core::enums::EventKind;
use solstice_core::events::AudioEvent;
use solstice_core::state::EventView;

use crate::systems::area_effects;

const METEOR_SHOWER_TICKS: u32 = 20 * TICK_RATE;
const GOLDEN_FRENZY_TICKS: u32 = 15 * TICK_RATE;
const GRAVITY_DISTORTION_TICKS: u32 = 12 * TICK_RATE;

/// XP multiplier while a golden frenzy is active.
const FRENZY_XP_MULT: f32 = 2.0;

enum State {
    Idle { timer: u32 },
    Active { kind: EventKind, remaining: u32 },
}

pub struct EventManager {
    state: State,
    /// Gravity as it was before a distortion, restored verbatim on end.
    saved_gravity: Option<f32>,
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EventManager {
    pub fn new() -> Self {
        Self {
            state: State::Idle {
                timer: EVENT_INITIAL_IDLE_TICKS,
            },
            saved_gravity: None,
        }
    }

    pub fn active(&self) -> Option<EventKind> {
        match self.state {
            State::Active { kind, .. } => Some(kind),
            State::Idle { .. } => None,
        }
    }

    pub fn xp_mult(&self) -> f32 {
        if self.active() == Some(EventKind::GoldenFrenzy) {
            FRENZY_XP_MULT
        } else {
            1.0
        }
    }

    pub fn view(&self) -> EventView {
        match self.state {
            State::Active { kind, remaining } => EventView {
                active: Some(kind),
                remaining_secs: remaining as f32 / TICK_RATE as f32,
            },
            State::Idle { .. } => EventView::default(),
        }
    }

    pub fn run(
        &mut self,
        world: &mut World,
        next_effect_id: &mut u64,
        rng: &mut ChaCha8Rng,
        gravity: &mut f32,
        camera_pos: Vec2,
        audio: &mut Vec<AudioEvent>,
    ) {
        match &mut self.state {
            State::Idle { timer } => {
                *timer = timer.saturating_sub(1);
                if *timer == 0 {
                    let (kind, duration) = match rng.gen_range(0u32..3) {
                        0 => (EventKind::MeteorShower, METEOR_SHOWER_TICKS),
                        1 => (EventKind::GoldenFrenzy, GOLDEN_FRENZY_TICKS),
                        _ => (EventKind::GravityDistortion, GRAVITY_DISTORTION_TICKS),
                    };
                    if kind == EventKind::GravityDistortion {
                        self.saved_gravity = Some(*gravity);
                        *gravity *= 0.5;
                    }
                    audio.push(AudioEvent::EventStarted { event: kind });
                    self.state = State::Active {
                        kind,
                        remaining: duration,
                    };
                }
            }
            State::Active { kind, remaining } => {
                let kind = *kind;
                *remaining = remaining.saturating_sub(1);
                if kind == EventKind::MeteorShower && *remaining % METEOR_WARNING_INTERVAL == 0 {
                    let pos = Vec2::new(
                        camera_pos.x + rng.gen_range(-VIEWPORT_WIDTH * 0.5..VIEWPORT_WIDTH * 0.5),
                        camera_pos.y + rng.gen_range(-VIEWPORT_HEIGHT * 0.5..VIEWPORT_HEIGHT * 0.5),
                    );
                    let pos = Vec2::new(
                        pos.x.clamp(40.0, WORLD_WIDTH - 40.0),
                        pos.y.clamp(40.0, WORLD_HEIGHT - 40.0),
                    );
                    area_effects::spawn_meteor_warning(world, next_effect_id, pos);
                }
                if *remaining == 0 {
                    if kind == EventKind::GravityDistortion {
                        if let Some(saved) = self.saved_gravity.take() {
                            *gravity = saved;
                        }
                    }
                    audio.push(AudioEvent::EventEnded { event: kind });
                    let idle_secs = rng.gen_range(EVENT_IDLE_MIN_SECS..=EVENT_IDLE_MAX_SECS);
                    self.state = State::Idle {
                        timer: idle_secs * TICK_RATE,
                    };
                }
            }
        }
    }

    /// Restore any modified world parameter mid-event (match restart).
    pub fn reset(&mut self, gravity: &mut f32) {
        if let Some(saved) = self.saved_gravity.take() {
            *gravity = saved;
        }
        self.state = State::Idle {
            timer: EVENT_INITIAL_IDLE_TICKS,
        };
    }
}
