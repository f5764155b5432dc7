//! Simulation constants and tuning parameters.
//!
//! Every gameplay timer below is an integer tick count; only the elapsed
//! match clock integrates wall time.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- World ---

/// World width in pixels.
pub const WORLD_WIDTH: f32 = 2400.0;

/// World height in pixels.
pub const WORLD_HEIGHT: f32 = 1600.0;

/// Viewport width (camera window) in pixels.
pub const VIEWPORT_WIDTH: f32 = 1280.0;

/// Viewport height in pixels.
pub const VIEWPORT_HEIGHT: f32 = 720.0;

/// Downward acceleration per tick. Default value; the live parameter sits
/// on the engine so events can modify and restore it.
pub const GRAVITY: f32 = 0.5;

// --- Player ---

pub const PLAYER_MAX_HEALTH: f32 = 120.0;
pub const PLAYER_SPEED: f32 = 3.0;
pub const PLAYER_RADIUS: f32 = 16.0;
pub const PLAYER_JUMP_VELOCITY: f32 = 12.0;
pub const PLAYER_MAX_FALL_SPEED: f32 = 14.0;

/// Ticks after leaving a ledge during which a jump still registers.
pub const COYOTE_TICKS: u32 = 6;

/// Ticks a jump press is buffered while airborne.
pub const JUMP_BUFFER_TICKS: u32 = 8;

pub const DASH_SPEED: f32 = 15.0;
pub const DASH_DURATION_TICKS: u32 = 10;
pub const DASH_COOLDOWN_TICKS: u32 = 60;

/// Invincibility window after taking a hit.
pub const PLAYER_IFRAME_TICKS: u32 = 36;

// --- Combat ---

/// Knockback impulse magnitude applied on projectile hits.
pub const KNOCKBACK_FORCE: f32 = 20.0;

/// Per-tick knockback decay factor for regular enemies.
pub const KNOCKBACK_DECAY: f32 = 0.9;

/// Knockback magnitude below which the impulse is zeroed.
pub const KNOCKBACK_EPSILON: f32 = 0.1;

/// Number of sample points along a beam for collision tests.
pub const BEAM_SAMPLES: u32 = 5;

/// Margin added to the query extent in collision broad phases. Must stay
/// above the largest enemy radius (the boss, 46) plus any contact radius,
/// or overlapping large enemies fall outside the quadtree query.
pub const COLLISION_QUERY_MARGIN: f32 = 64.0;

/// Full-simulation pause length when the player takes a melee hit.
pub const HIT_STOP_TICKS: u32 = 4;

/// Period (ticks) between damage pulses of continuous area effects.
pub const AREA_DAMAGE_PERIOD: u32 = 60;

/// Orbital orb angular velocity (radians per tick).
pub const ORBITAL_ANGULAR_SPEED: f32 = 0.05;

/// Default lifetime of a point projectile.
pub const PROJECTILE_TTL: u32 = 180;

/// Default point projectile radius.
pub const PROJECTILE_RADIUS: f32 = 6.0;

/// Lifetime of a beam projectile (the beam flashes, then is released).
pub const BEAM_TTL: u32 = 12;

/// Angular spread between fanned projectiles in a volley.
pub const VOLLEY_SPREAD: f32 = 0.15;

/// Ticks an explosion takes to expand from zero to full radius.
pub const EXPLOSION_GROWTH_TICKS: u32 = 18;

// --- Leveling ---

/// XP required for the first level-up.
pub const XP_TO_NEXT_LEVEL_BASE: f32 = 80.0;

/// Growth factor applied to the XP threshold per level.
pub const XP_LEVEL_MULTIPLIER: f32 = 1.15;

/// Number of choices in a level-up offer.
pub const LEVEL_UP_CHOICES: usize = 3;

// --- Pickups ---

/// Radius inside which XP orbs home toward the player (before modifiers).
pub const PICKUP_ATTRACTION_RADIUS: f32 = 120.0;

/// Radius at which an orb is collected.
pub const PICKUP_COLLECT_RADIUS: f32 = 24.0;

/// Acceleration of a homing orb per tick.
pub const PICKUP_ATTRACTION_ACCEL: f32 = 0.9;

/// Chance an enemy drops a power-up on death.
pub const POWERUP_DROP_CHANCE: f64 = 0.02;

/// Ticks a power-up persists before despawning.
pub const POWERUP_LIFETIME_TICKS: u32 = 600;

/// Fraction of max health restored by a heal orb.
pub const HEAL_ORB_FRACTION: f32 = 0.3;

/// Damage dealt to every alive enemy by a nuke pickup.
pub const NUKE_DAMAGE: f32 = 120.0;

// --- Spatial index ---

/// Quadtree node capacity before subdivision.
pub const QUADTREE_CAPACITY: usize = 4;

/// Bounded search radius for nearest-enemy targeting.
pub const NEAREST_ENEMY_SEARCH_RADIUS: f32 = 2000.0;

// --- Pools ---

/// Hard cap on concurrently active particles.
pub const PARTICLE_CAP: usize = 500;

// --- Waves ---

/// Every Nth wave is a boss wave.
pub const BOSS_WAVE_PERIOD: u32 = 5;

pub const BOSS_BASE_HEALTH: f32 = 1000.0;
pub const BOSS_HEALTH_PER_WAVE: f32 = 150.0;
pub const BOSS_RADIUS: f32 = 46.0;
pub const BOSS_SPEED: f32 = 1.4;
pub const BOSS_CONTACT_DAMAGE: f32 = 22.0;
pub const BOSS_XP: f32 = 400.0;

/// Ticks between boss attack pattern re-selections.
pub const BOSS_PATTERN_TICKS: u32 = 180;

/// Boss knockback decays faster (effectively immune to impulses).
pub const BOSS_KNOCKBACK_DECAY: f32 = 0.95;

/// Intermission length after a wave is cleared.
pub const WAVE_INTERMISSION_TICKS: u32 = 180;

/// Number of authored waves before procedural composition takes over.
pub const AUTHORED_WAVE_COUNT: u32 = 7;

/// Distance outside the viewport edge at which enemies spawn.
pub const SPAWN_EDGE_MARGIN: f32 = 50.0;

/// Elite stat multipliers.
pub const ELITE_RADIUS_MULT: f32 = 1.5;
pub const ELITE_HEALTH_MULT: f32 = 2.5;
pub const ELITE_DAMAGE_MULT: f32 = 1.5;
pub const ELITE_XP_MULT: f32 = 2.0;

// --- Events ---

/// Idle countdown before the very first event.
pub const EVENT_INITIAL_IDLE_TICKS: u32 = 120 * TICK_RATE;

/// Bounds (seconds) of the randomized idle interval between events.
pub const EVENT_IDLE_MIN_SECS: u32 = 120;
pub const EVENT_IDLE_MAX_SECS: u32 = 180;

/// Ticks between meteor warnings during a meteor shower.
pub const METEOR_WARNING_INTERVAL: u32 = 20;

/// Delay between a meteor warning appearing and its impact.
pub const METEOR_WARNING_DELAY_TICKS: u32 = 90;

pub const METEOR_EXPLOSION_RADIUS: f32 = 100.0;
pub const METEOR_EXPLOSION_DAMAGE: f32 = 25.0;

// --- Camera ---

/// Per-tick lerp factor toward the player.
pub const CAMERA_LERP: f32 = 0.08;

/// Per-tick decay of screen shake intensity.
pub const SCREEN_SHAKE_DECAY: f32 = 0.9;

// --- Score ---

/// Currency granted per ordinary kill.
pub const GEMS_PER_KILL: u64 = 1;

/// Currency granted per boss kill.
pub const GEMS_PER_BOSS: u64 = 25;
