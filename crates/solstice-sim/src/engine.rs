//! Simulation engine — the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, the object pools, and all
//! match state. It processes player commands, runs all systems at a fixed
//! tick rate, and produces `GameStateSnapshot`s. Completely headless,
//! enabling deterministic testing.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use glam::Vec2;
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use solstice_core::commands::PlayerCommand;
use solstice_core::components::Player;
use solstice_core::constants::*;
use solstice_core::enums::{
    AchievementId, CharacterId, EvolutionId, FusionId, GamePhase, SkillId, UpgradeId,
};
use solstice_core::events::{AudioEvent, ProfileEvent};
use solstice_core::progression::{upgrade_def, ACHIEVEMENTS};
use solstice_core::skills::character_def;
use solstice_core::state::{CameraView, GameStateSnapshot, LevelUpChoice, LevelUpOffer, ScoreView};
use solstice_core::types::{Position, Rect, SimTime};

use crate::pooled::Pools;
use crate::quadtree::Quadtree;
use crate::systems;
use crate::systems::event_manager::EventManager;
use crate::systems::player::InputState;
use crate::systems::wave_scheduler::WaveScheduler;
use crate::world_setup;

/// Shake intensity applied when the player takes a contact hit.
const HIT_SHAKE: f32 = 6.0;

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Character selected when `StartMatch` carries no preference override.
    pub character: CharacterId,
    /// First wave of the match (1 for a normal run).
    pub starting_wave: u32,
    /// Permanent upgrade levels from the player profile.
    pub upgrades: BTreeMap<UpgradeId, u32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            character: CharacterId::default(),
            starting_wave: 1,
            upgrades: BTreeMap::new(),
        }
    }
}

/// The simulation engine. Owns the ECS world and all match state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    seed: u64,
    rng: ChaCha8Rng,
    starting_wave: u32,
    upgrades: BTreeMap<UpgradeId, u32>,

    player_entity: Option<Entity>,
    input: InputState,
    platforms: Vec<Rect>,
    quadtree: Quadtree,
    pools: Pools,
    waves: WaveScheduler,
    events: EventManager,
    /// Live gravity; events may modify and must restore it.
    gravity: f32,
    /// Remaining fully-frozen ticks after a contact hit.
    hit_stop: u32,
    next_effect_id: u64,
    camera_pos: Vec2,
    camera_shake: f32,
    score: ScoreView,
    greed_mult: f32,
    pending_offer: Option<LevelUpOffer>,
    unlocked: BTreeSet<AchievementId>,

    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    audio_events: Vec<AudioEvent>,
    profile_events: Vec<ProfileEvent>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        let mut greed_mult = 1.0;
        if let Some(&level) = config.upgrades.get(&UpgradeId::Greed) {
            let def = upgrade_def(UpgradeId::Greed);
            greed_mult += def.per_level * level.min(def.max_level) as f32;
        }
        Self {
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            seed: config.seed,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            starting_wave: config.starting_wave.max(1),
            upgrades: config.upgrades,
            player_entity: None,
            input: InputState::default(),
            platforms: world_setup::platforms(),
            quadtree: Quadtree::world_sized(),
            pools: Pools::new(),
            waves: WaveScheduler::new(1),
            events: EventManager::new(),
            gravity: GRAVITY,
            hit_stop: 0,
            next_effect_id: 0,
            camera_pos: Vec2::new(WORLD_WIDTH * 0.5, WORLD_HEIGHT * 0.5),
            camera_shake: 0.0,
            score: ScoreView::default(),
            greed_mult,
            pending_offer: None,
            unlocked: BTreeSet::new(),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            audio_events: Vec::new(),
            profile_events: Vec::new(),
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Playing {
            if self.hit_stop > 0 {
                // Hit-stop freezes the entire tick, time accumulators
                // included; only the counter moves.
                self.hit_stop -= 1;
            } else {
                self.run_systems();
                self.time.advance();
                self.post_tick();
            }
        }

        let audio_events = std::mem::take(&mut self.audio_events);
        let profile_events = std::mem::take(&mut self.profile_events);
        systems::snapshot::build(
            &self.world,
            self.player_entity.unwrap_or(Entity::DANGLING),
            &self.pools,
            self.time,
            self.phase,
            CameraView {
                position: self.camera_pos,
                shake: self.camera_shake,
            },
            &self.waves,
            &self.events,
            self.pending_offer.clone(),
            self.score.clone(),
            audio_events,
            profile_events,
        )
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[cfg(test)]
    pub fn pools(&self) -> &Pools {
        &self.pools
    }

    #[cfg(test)]
    pub fn pools_mut(&mut self) -> &mut Pools {
        &mut self.pools
    }

    #[cfg(test)]
    pub fn player_entity(&self) -> Option<Entity> {
        self.player_entity
    }

    #[cfg(test)]
    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    #[cfg(test)]
    pub fn hit_stop(&self) -> u32 {
        self.hit_stop
    }

    #[cfg(test)]
    pub fn set_hit_stop(&mut self, ticks: u32) {
        self.hit_stop = ticks;
    }

    #[cfg(test)]
    pub fn pending_offer(&self) -> Option<&LevelUpOffer> {
        self.pending_offer.as_ref()
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartMatch { character } => {
                if matches!(self.phase, GamePhase::Menu | GamePhase::GameOver) {
                    self.start_match(character);
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Playing {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Playing;
                }
            }
            PlayerCommand::ReturnToMenu => {
                self.end_match();
                self.world = World::new();
                self.pools.clear();
                self.player_entity = None;
                self.phase = GamePhase::Menu;
            }
            PlayerCommand::SetMoveInput { x, y } => {
                self.input.move_x = x.clamp(-1.0, 1.0);
                self.input.move_y = y.clamp(-1.0, 1.0);
            }
            PlayerCommand::Jump => {
                if self.phase == GamePhase::Playing {
                    self.input.jump_queued = true;
                }
            }
            PlayerCommand::Dash => {
                if self.phase == GamePhase::Playing {
                    self.input.dash_queued = true;
                }
            }
            PlayerCommand::ChooseSkill { skill } => {
                if self.offer_contains_skill(skill) {
                    if let Some(player_entity) = self.player_entity {
                        systems::abilities::grant_skill(
                            &mut self.world,
                            player_entity,
                            skill,
                            &self.upgrades,
                            &mut self.pools,
                        );
                        self.consume_level_up();
                    }
                }
            }
            PlayerCommand::ChooseEvolution { evolution } => {
                if self.offer_contains_evolution(evolution) {
                    if let Some(player_entity) = self.player_entity {
                        if systems::abilities::apply_evolution(
                            &mut self.world,
                            player_entity,
                            evolution,
                            &mut self.audio_events,
                        ) {
                            self.consume_level_up();
                        }
                    }
                }
            }
            PlayerCommand::ChooseFusion { fusion } => {
                if self.offer_contains_fusion(fusion) {
                    if let Some(player_entity) = self.player_entity {
                        if systems::abilities::apply_fusion(
                            &mut self.world,
                            player_entity,
                            fusion,
                            &self.upgrades,
                            &mut self.audio_events,
                        ) {
                            self.consume_level_up();
                        }
                    }
                }
            }
        }
    }

    fn start_match(&mut self, character: CharacterId) {
        self.world = World::new();
        self.pools.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.time = SimTime::default();
        self.events.reset(&mut self.gravity);
        self.gravity = GRAVITY;
        self.hit_stop = 0;
        self.next_effect_id = 0;
        self.score = ScoreView::default();
        self.pending_offer = None;
        self.unlocked.clear();
        self.input = InputState::default();
        self.despawn_buffer.clear();

        let player_entity = world_setup::spawn_player(&mut self.world, character, &self.upgrades);
        systems::abilities::grant_skill(
            &mut self.world,
            player_entity,
            character_def(character).starting_skill,
            &self.upgrades,
            &mut self.pools,
        );
        if let Ok(pos) = self.world.get::<&Position>(player_entity) {
            self.camera_pos = pos.0;
        }
        self.player_entity = Some(player_entity);
        self.waves = WaveScheduler::new(self.starting_wave);
        self.events = EventManager::new();
        self.phase = GamePhase::Playing;
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let Some(player_entity) = self.player_entity else {
            return;
        };

        // 1. Global events
        self.events.run(
            &mut self.world,
            &mut self.next_effect_id,
            &mut self.rng,
            &mut self.gravity,
            self.camera_pos,
            &mut self.audio_events,
        );
        // 2. Spatial index rebuild
        self.quadtree = Quadtree::rebuild(&self.world);
        // 3. Player movement, timers, abilities
        systems::player::run(
            &mut self.world,
            player_entity,
            &mut self.input,
            &self.platforms,
            self.gravity,
            &mut self.audio_events,
        );
        systems::abilities::run(
            &mut self.world,
            player_entity,
            &self.quadtree,
            &mut self.pools,
            &mut self.rng,
            &mut self.next_effect_id,
            &mut self.audio_events,
        );
        let player_pos = self
            .world
            .get::<&Position>(player_entity)
            .map(|p| p.0)
            .unwrap_or(self.camera_pos);
        let (enemy_count_mult, xp_mult) = self
            .world
            .get::<&Player>(player_entity)
            .map(|p| (p.modifiers.enemy_count_mult, self.events.xp_mult()))
            .unwrap_or((1.0, 1.0));

        // 4. Camera follow and shake decay
        self.camera_pos = self.camera_pos.lerp(player_pos, CAMERA_LERP);
        let half_w = VIEWPORT_WIDTH * 0.5;
        let half_h = VIEWPORT_HEIGHT * 0.5;
        self.camera_pos.x = self.camera_pos.x.clamp(half_w, WORLD_WIDTH - half_w);
        self.camera_pos.y = self.camera_pos.y.clamp(half_h, WORLD_HEIGHT - half_h);
        self.camera_shake *= SCREEN_SHAKE_DECAY;
        if self.camera_shake < 0.1 {
            self.camera_shake = 0.0;
        }

        // 5. Enemy and boss AI
        systems::enemy_ai::run(
            &mut self.world,
            player_pos,
            &mut self.pools,
            &mut self.rng,
            self.time.elapsed_secs as f32,
            self.waves.number,
        );
        systems::boss_ai::run(
            &mut self.world,
            player_pos,
            &mut self.pools,
            &mut self.rng,
            &mut self.audio_events,
            self.time.elapsed_secs as f32,
            self.waves.number,
        );
        // 6. Pooled entity movement, XP collection
        systems::pooled_update::run(
            &mut self.world,
            player_entity,
            &mut self.pools,
            xp_mult,
            &mut self.audio_events,
        );
        // 7. Area effect fields (slow/pull/pulses, warning conversion)
        systems::area_effects::run(
            &mut self.world,
            player_entity,
            &mut self.pools,
            &mut self.rng,
            &mut self.next_effect_id,
            &mut self.audio_events,
        );
        // 8. Wave scheduling
        self.waves.run(
            &mut self.world,
            self.camera_pos,
            &mut self.rng,
            self.time.elapsed_secs as f32,
            enemy_count_mult,
            &mut self.audio_events,
        );
        // 9. Combat resolution
        let report = systems::combat::run(
            &mut self.world,
            player_entity,
            &self.quadtree,
            &mut self.pools,
            &mut self.rng,
            &mut self.audio_events,
        );
        if report.player_contact_hit {
            self.hit_stop = HIT_STOP_TICKS;
            self.camera_shake = HIT_SHAKE;
        }
        // 10. Cleanup (deaths, drops, despawns, pool releases)
        let cleaned = systems::cleanup::run(
            &mut self.world,
            player_entity,
            &mut self.pools,
            &mut self.rng,
            &mut self.next_effect_id,
            &mut self.despawn_buffer,
            &mut self.audio_events,
        );
        self.score.kills += cleaned.kills;
        self.score.gems_earned += (cleaned.gems as f32 * self.greed_mult).round() as u64;
        if cleaned.boss_died {
            self.unlock(AchievementId::Herald);
        }
    }

    /// Post-system bookkeeping: achievements, level-ups, game over.
    fn post_tick(&mut self) {
        let Some(player_entity) = self.player_entity else {
            return;
        };

        if self.score.kills >= 300 {
            self.unlock(AchievementId::Reaper);
        }
        if self.waves.number >= 10 {
            self.unlock(AchievementId::Decimation);
        }

        let mut dead = false;
        let mut gained = 0;
        let mut pending = 0;
        if let Ok(player) = self.world.query_one_mut::<&mut Player>(player_entity) {
            if player.health <= 0.0 {
                dead = true;
            } else {
                gained = systems::abilities::check_level_ups(player);
                pending = player.pending_level_ups;
            }
        }
        for _ in 0..gained {
            self.audio_events.push(AudioEvent::LevelUp);
        }
        if !dead && pending > 0 {
            self.pending_offer = Some(systems::abilities::build_offer(
                &self.world,
                player_entity,
                &mut self.rng,
            ));
            self.phase = GamePhase::LevelUp;
        }
        if dead {
            self.audio_events.push(AudioEvent::PlayerDied);
            self.end_match();
            self.phase = GamePhase::GameOver;
        }
    }

    /// Emit the end-of-match profile events once.
    fn end_match(&mut self) {
        if !matches!(
            self.phase,
            GamePhase::Playing | GamePhase::Paused | GamePhase::LevelUp
        ) {
            return;
        }
        if self.score.gems_earned > 0 {
            self.profile_events.push(ProfileEvent::CurrencyEarned {
                amount: self.score.gems_earned,
            });
        }
        self.profile_events.push(ProfileEvent::MatchEnded {
            kills: self.score.kills,
            wave: self.waves.number,
            survived_secs: self.time.elapsed_secs,
        });
    }

    fn unlock(&mut self, id: AchievementId) {
        debug_assert!(ACHIEVEMENTS.iter().any(|a| a.id == id));
        if self.unlocked.insert(id) {
            self.profile_events
                .push(ProfileEvent::AchievementUnlocked { id });
        }
    }

    fn consume_level_up(&mut self) {
        let Some(player_entity) = self.player_entity else {
            return;
        };
        let pending = {
            let Ok(player) = self.world.query_one_mut::<&mut Player>(player_entity) else {
                return;
            };
            player.pending_level_ups = player.pending_level_ups.saturating_sub(1);
            player.pending_level_ups
        };
        if pending > 0 {
            self.pending_offer = Some(systems::abilities::build_offer(
                &self.world,
                player_entity,
                &mut self.rng,
            ));
        } else {
            self.pending_offer = None;
            if self.phase == GamePhase::LevelUp {
                self.phase = GamePhase::Playing;
            }
        }
    }

    fn offer_contains_skill(&self, skill: SkillId) -> bool {
        self.pending_offer.as_ref().is_some_and(|offer| {
            offer
                .choices
                .iter()
                .any(|c| matches!(c, LevelUpChoice::Skill { skill: s, .. } if *s == skill))
        })
    }

    fn offer_contains_evolution(&self, evolution: EvolutionId) -> bool {
        self.pending_offer.as_ref().is_some_and(|offer| {
            offer.choices.iter().any(
                |c| matches!(c, LevelUpChoice::Evolution { evolution: e } if *e == evolution),
            )
        })
    }

    fn offer_contains_fusion(&self, fusion: FusionId) -> bool {
        self.pending_offer.as_ref().is_some_and(|offer| {
            offer
                .choices
                .iter()
                .any(|c| matches!(c, LevelUpChoice::Fusion { fusion: f } if *f == fusion))
        })
    }
}
