//! Pooled entity kinds and the pool set owned by the engine.

use std::collections::HashSet;

use glam::Vec2;
use hecs::Entity;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use solstice_core::constants::PARTICLE_CAP;
use solstice_core::enums::FloatingTextKind;

use crate::pool::{BoundedPool, Pool, Poolable};

/// Beam geometry for ray-shaped projectiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct Beam {
    pub angle: f32,
    pub length: f32,
    pub width: f32,
}

/// A player-owned projectile (point shot or beam).
#[derive(Debug, Default)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Damage per hit, already scaled by the player's modifiers at fire time.
    pub damage: f32,
    /// Additional enemies this shot may pass through beyond the first.
    pub pierce: u32,
    pub ttl: u32,
    /// Beam-shaped projectiles are sampled along their length instead of
    /// circle-tested.
    pub beam: Option<Beam>,
    /// Fraction of dealt damage returned to the player as health.
    pub lifesteal: f32,
    /// Fused lances drop a vortex where they die.
    pub spawns_vortex: bool,
    /// Enemies already damaged by this shot. Its size bounds pierce
    /// consumption: at `pierce + 1` the projectile dies.
    pub hit: HashSet<Entity>,
    pub expired: bool,
}

impl Poolable for Projectile {
    fn reset(&mut self) {
        self.pos = Vec2::ZERO;
        self.vel = Vec2::ZERO;
        self.radius = 0.0;
        self.damage = 0.0;
        self.pierce = 0;
        self.ttl = 0;
        self.beam = None;
        self.lifesteal = 0.0;
        self.spawns_vortex = false;
        self.hit.clear();
        self.expired = false;
    }
}

/// An enemy-owned projectile. No pierce: dies on the first player hit.
#[derive(Debug, Default)]
pub struct EnemyProjectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub ttl: u32,
    pub expired: bool,
}

impl Poolable for EnemyProjectile {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// An XP pickup. Homes toward the player inside the attraction radius.
#[derive(Debug, Default)]
pub struct XpOrb {
    pub pos: Vec2,
    pub vel: Vec2,
    pub value: f32,
    pub expired: bool,
}

impl Poolable for XpOrb {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Floating combat text (damage numbers, heals, xp).
#[derive(Debug, Default)]
pub struct FloatingText {
    pub pos: Vec2,
    pub value: f32,
    pub kind: FloatingTextKind,
    pub ttl: u32,
    pub max_ttl: u32,
    pub expired: bool,
}

impl Poolable for FloatingText {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A cosmetic particle. Bounded pool; oldest evicted at the cap.
#[derive(Debug, Default)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub ttl: u32,
    pub max_ttl: u32,
    pub expired: bool,
}

impl Poolable for Particle {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// All pools, owned by the engine. Pool slots live for the process
/// lifetime and cycle through acquire/release.
#[derive(Debug)]
pub struct Pools {
    pub projectiles: Pool<Projectile>,
    pub enemy_projectiles: Pool<EnemyProjectile>,
    pub xp_orbs: Pool<XpOrb>,
    pub floating_texts: Pool<FloatingText>,
    pub particles: BoundedPool<Particle>,
}

impl Default for Pools {
    fn default() -> Self {
        Self::new()
    }
}

impl Pools {
    pub fn new() -> Self {
        Self {
            projectiles: Pool::with_capacity(64),
            enemy_projectiles: Pool::with_capacity(64),
            xp_orbs: Pool::with_capacity(128),
            floating_texts: Pool::with_capacity(32),
            particles: BoundedPool::new(PARTICLE_CAP),
        }
    }

    /// Release everything (match restart).
    pub fn clear(&mut self) {
        self.projectiles.clear();
        self.enemy_projectiles.clear();
        self.xp_orbs.clear();
        self.floating_texts.clear();
        self.particles.clear();
    }

    pub fn spawn_text(&mut self, pos: Vec2, value: f32, kind: FloatingTextKind) {
        self.floating_texts.acquire(|t| {
            t.pos = pos;
            t.value = value;
            t.kind = kind;
            t.ttl = 45;
            t.max_ttl = 45;
        });
    }

    /// Radial particle burst.
    pub fn spawn_burst(&mut self, rng: &mut ChaCha8Rng, pos: Vec2, count: u32, speed: f32) {
        for _ in 0..count {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let s = rng.gen_range(0.3f32..1.0) * speed;
            let ttl = rng.gen_range(18u32..40);
            self.particles.acquire(|p| {
                p.pos = pos;
                p.vel = Vec2::from_angle(angle) * s;
                p.size = rng.gen_range(1.5f32..4.0);
                p.ttl = ttl;
                p.max_ttl = ttl;
            });
        }
    }
}
