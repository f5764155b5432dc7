//! Wave scheduling: authored early waves, procedural composition beyond
//! them, boss waves every fifth, and intermissions between waves.
//!
//! Each composition entry spawns on its own countdown, so a wave's kinds
//! trickle in concurrently instead of draining one kind at a time.

use glam::Vec2;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use solstice_core::components::Enemy;
use solstice_core::constants::*;
use solstice_core::enums::{EnemyKind, WavePhase};
use solstice_core::events::AudioEvent;

use crate::world_setup;

/// Roster procedural waves draw from, easiest first.
const PROCEDURAL_ROSTER: [EnemyKind; 5] = [
    EnemyKind::Chaser,
    EnemyKind::Swift,
    EnemyKind::Shooter,
    EnemyKind::Tank,
    EnemyKind::Charger,
];

/// One composition entry: `remaining` enemies of one kind, spawning every
/// `interval` ticks on an independent timer.
struct WaveEntry {
    kind: EnemyKind,
    remaining: u32,
    interval: u32,
    timer: u32,
}

pub struct WaveScheduler {
    pub number: u32,
    pub phase: WavePhase,
    /// Current wave composition; entries count down concurrently.
    entries: Vec<WaveEntry>,
    elite_chance: f64,
    intermission_timer: u32,
    pub boss_wave: bool,
    boss_spawned: bool,
    started: bool,
}

impl WaveScheduler {
    pub fn new(starting_wave: u32) -> Self {
        Self {
            number: starting_wave.max(1),
            phase: WavePhase::Spawning,
            entries: Vec::new(),
            elite_chance: 0.0,
            intermission_timer: 0,
            boss_wave: false,
            boss_spawned: false,
            started: false,
        }
    }

    /// Not-yet-spawned count of the current wave.
    pub fn pending(&self) -> u32 {
        self.entries.iter().map(|e| e.remaining).sum()
    }

    pub fn run(
        &mut self,
        world: &mut World,
        camera_pos: Vec2,
        rng: &mut ChaCha8Rng,
        elapsed_secs: f32,
        enemy_count_mult: f32,
        audio: &mut Vec<AudioEvent>,
    ) {
        if !self.started {
            self.started = true;
            self.start_wave(rng, enemy_count_mult, audio);
        }

        match self.phase {
            WavePhase::Spawning => {
                if self.boss_wave {
                    // A boss wave suppresses ordinary spawns entirely.
                    if !self.boss_spawned {
                        self.boss_spawned = true;
                        let pos = edge_spawn_position(camera_pos, rng);
                        world_setup::spawn_boss(world, self.number, pos);
                        audio.push(AudioEvent::BossSpawned);
                    }
                } else {
                    let wave = self.number;
                    let elite_chance = self.elite_chance;
                    for entry in &mut self.entries {
                        if entry.remaining == 0 {
                            continue;
                        }
                        if entry.timer > 0 {
                            entry.timer -= 1;
                        }
                        if entry.timer == 0 {
                            entry.timer = entry.interval;
                            entry.remaining -= 1;
                            let elite = elite_chance > 0.0 && rng.gen_bool(elite_chance);
                            let pos = edge_spawn_position(camera_pos, rng);
                            world_setup::spawn_enemy(
                                world,
                                entry.kind,
                                pos,
                                elapsed_secs,
                                wave,
                                elite,
                            );
                        }
                    }
                }
                if self.pending() == 0 && (!self.boss_wave || self.boss_spawned) {
                    let alive = world
                        .query_mut::<&Enemy>()
                        .into_iter()
                        .filter(|(_, e)| !e.dead)
                        .count();
                    if alive == 0 {
                        self.phase = WavePhase::Cleared;
                    }
                }
            }
            WavePhase::Cleared => {
                self.phase = WavePhase::Intermission;
                self.intermission_timer = WAVE_INTERMISSION_TICKS;
            }
            WavePhase::Intermission => {
                self.intermission_timer = self.intermission_timer.saturating_sub(1);
                if self.intermission_timer == 0 {
                    self.number += 1;
                    self.phase = WavePhase::Spawning;
                    self.start_wave(rng, enemy_count_mult, audio);
                }
            }
        }
    }

    fn start_wave(
        &mut self,
        rng: &mut ChaCha8Rng,
        enemy_count_mult: f32,
        audio: &mut Vec<AudioEvent>,
    ) {
        self.boss_wave = self.number % BOSS_WAVE_PERIOD == 0;
        self.boss_spawned = false;
        self.entries.clear();
        audio.push(AudioEvent::WaveStarted { wave: self.number });
        if self.boss_wave {
            return;
        }

        if self.number <= AUTHORED_WAVE_COUNT {
            self.entries = authored_wave(self.number);
            self.elite_chance = 0.0;
        } else {
            let wave = self.number;
            let kinds = ((2 + wave / 7) as usize).min(PROCEDURAL_ROSTER.len());
            let count = 5 + (wave as f32 * 0.8).floor() as u32;
            let interval = (100u32.saturating_sub(wave * 2)).max(20);
            let mut counts = [0u32; PROCEDURAL_ROSTER.len()];
            for _ in 0..count {
                counts[rng.gen_range(0..kinds)] += 1;
            }
            for (i, &kind) in PROCEDURAL_ROSTER.iter().enumerate() {
                if counts[i] > 0 {
                    self.push_entry(kind, counts[i], interval);
                }
            }
            // Support units filter in as waves grow.
            if wave >= 9 {
                self.push_entry(EnemyKind::Healer, 1, 600);
            }
            if wave >= 10 {
                self.push_entry(EnemyKind::Exploder, 2, 360);
            }
            if wave >= 12 {
                self.push_entry(EnemyKind::Summoner, 1, 900);
            }
            self.elite_chance =
                (0.05 + (wave.saturating_sub(AUTHORED_WAVE_COUNT)) as f64 * 0.01).min(0.25);
        }

        // The enemy-count tradeoff scales the whole wave once, at
        // composition time, per entry.
        if enemy_count_mult > 1.0 {
            for entry in &mut self.entries {
                entry.remaining = (entry.remaining as f32 * enemy_count_mult).round() as u32;
            }
        }
    }

    fn push_entry(&mut self, kind: EnemyKind, remaining: u32, interval: u32) {
        self.entries.push(WaveEntry {
            kind,
            remaining,
            interval,
            timer: 1,
        });
    }
}

fn authored_wave(number: u32) -> Vec<WaveEntry> {
    use EnemyKind::*;
    let table: &[(EnemyKind, u32, u32)] = match number {
        1 => &[(Chaser, 8, 90)],
        2 => &[(Chaser, 10, 80), (Swift, 3, 240)],
        3 => &[(Chaser, 8, 85), (Swift, 5, 160), (Tank, 2, 330)],
        4 => &[
            (Chaser, 8, 80),
            (Swift, 4, 170),
            (Tank, 2, 320),
            (Shooter, 2, 300),
        ],
        6 => &[
            (Chaser, 10, 70),
            (Swift, 6, 130),
            (Tank, 3, 280),
            (Shooter, 3, 260),
            (Charger, 2, 320),
        ],
        _ => &[
            (Chaser, 10, 65),
            (Swift, 6, 120),
            (Tank, 3, 260),
            (Shooter, 3, 240),
            (Charger, 2, 300),
            (Healer, 2, 420),
        ],
    };
    table
        .iter()
        .map(|&(kind, remaining, interval)| WaveEntry {
            kind,
            remaining,
            interval,
            timer: 1,
        })
        .collect()
}

/// A spawn point just outside the camera window, clamped into the world.
fn edge_spawn_position(camera_pos: Vec2, rng: &mut ChaCha8Rng) -> Vec2 {
    let half_w = VIEWPORT_WIDTH * 0.5 + SPAWN_EDGE_MARGIN;
    let half_h = VIEWPORT_HEIGHT * 0.5 + SPAWN_EDGE_MARGIN;
    let pos = match rng.gen_range(0u32..4) {
        0 => Vec2::new(
            camera_pos.x + rng.gen_range(-half_w..half_w),
            camera_pos.y - half_h,
        ),
        1 => Vec2::new(
            camera_pos.x + rng.gen_range(-half_w..half_w),
            camera_pos.y + half_h,
        ),
        2 => Vec2::new(
            camera_pos.x - half_w,
            camera_pos.y + rng.gen_range(-half_h..half_h),
        ),
        _ => Vec2::new(
            camera_pos.x + half_w,
            camera_pos.y + rng.gen_range(-half_h..half_h),
        ),
    };
    Vec2::new(
        pos.x.clamp(20.0, WORLD_WIDTH - 20.0),
        pos.y.clamp(20.0, WORLD_HEIGHT - 20.0),
    )
}
