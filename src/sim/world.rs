//! Everything the simulation owns between ticks

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::entities::{Enemy, PowerUp, Projectile};
use super::fx::{Background, ParticleSystem};
use super::player::Player;
use super::pool::EntityPool;
use super::spawn::{EnemySpawner, PowerUpSpawner};
use super::state::{GameEvent, GamePhase, GameState};
use crate::audio::AudioSnapshot;
use crate::settings::Settings;

/// Default particle cap when no settings are supplied
pub const MAX_PARTICLES: usize = 500;

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub state: GameState,
    pub phase: GamePhase,
    pub player: Player,
    pub enemies: EntityPool<Enemy>,
    pub projectiles: EntityPool<Projectile>,
    pub powerups: EntityPool<PowerUp>,
    pub enemy_spawner: EnemySpawner,
    pub powerup_spawner: PowerUpSpawner,
    /// Visual particles (not gameplay-affecting)
    pub particles: ParticleSystem,
    pub background: Background,
    /// Audio snapshot polled for the current tick
    pub audio: AudioSnapshot,
    /// Timestamp of the current tick (ms since start)
    pub now_ms: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
}

impl World {
    /// A world with gameplay only: no background decorations
    pub fn new(seed: u64, high_score: u64) -> Self {
        Self {
            seed,
            state: GameState::new(high_score),
            phase: GamePhase::Playing,
            player: Player::new(),
            enemies: EntityPool::new(),
            projectiles: EntityPool::new(),
            powerups: EntityPool::new(),
            enemy_spawner: EnemySpawner::default(),
            powerup_spawner: PowerUpSpawner::default(),
            particles: ParticleSystem::new(MAX_PARTICLES),
            background: Background::empty(),
            audio: AudioSnapshot::default(),
            now_ms: 0,
            time_ticks: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// A world decorated according to the quality settings
    pub fn with_settings(seed: u64, high_score: u64, settings: &Settings) -> Self {
        let mut world = Self::new(seed, high_score);
        world.particles = ParticleSystem::new(settings.max_particles());
        if settings.starfield {
            world.background = Background::new(
                settings.quality.star_counts(),
                settings.quality.nebula_count(),
                &mut world.rng,
            );
        }
        world
    }

    /// Back to a fresh run: score and health reset, every live entity cleared,
    /// player at spawn. The high score survives.
    pub fn restart(&mut self, now_ms: u64) {
        self.state.reset();
        self.enemies.clear();
        self.projectiles.clear();
        self.powerups.clear();
        self.particles.clear();
        self.player.respawn();
        self.enemy_spawner.reset(now_ms);
        self.powerup_spawner.reset(now_ms);
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Restarted);
        log::info!("Game restarted (high score {})", self.state.high_score);
    }
}
