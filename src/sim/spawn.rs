//! Timed, probabilistic spawners
//!
//! Each spawner waits out a minimum interval, then runs one Bernoulli trial
//! per tick whose odds rise with the audio tier and volume.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entities::{Enemy, EnemyKind, PowerUp, PowerUpKind};
use crate::audio::{AudioSnapshot, Intensity};
use crate::consts::*;

/// Random x for a new spawn at the top edge
fn spawn_x<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random_range(SPAWN_MARGIN..=SCREEN_WIDTH - SPAWN_MARGIN)
}

/// Bernoulli trial with the probability clamped into [0, 1]
fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.random_bool(p.clamp(0.0, 1.0))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpawner {
    pub last_spawn_ms: u64,
    pub spawn_delay_ms: u64,
}

impl Default for EnemySpawner {
    fn default() -> Self {
        Self {
            last_spawn_ms: 0,
            spawn_delay_ms: ENEMY_SPAWN_DELAY_MS,
        }
    }
}

impl EnemySpawner {
    /// Per-tick spawn probability: tier base plus the raw volume
    pub fn spawn_chance(audio: AudioSnapshot) -> f64 {
        let base = match audio.intensity {
            Intensity::Void => 0.05,
            Intensity::Ambient => 0.1,
            Intensity::Intense => 0.2,
        };
        base + audio.volume as f64
    }

    /// Uniform draw among the kinds allowed in the tier
    pub fn choose_kind<R: Rng + ?Sized>(intensity: Intensity, rng: &mut R) -> EnemyKind {
        let pool = EnemyKind::pool_for(intensity);
        pool[rng.random_range(0..pool.len())]
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        now_ms: u64,
        audio: AudioSnapshot,
        rng: &mut R,
    ) -> Option<Enemy> {
        if now_ms.saturating_sub(self.last_spawn_ms) <= self.spawn_delay_ms {
            return None;
        }
        if !chance(rng, Self::spawn_chance(audio)) {
            return None;
        }
        self.last_spawn_ms = now_ms;

        let kind = Self::choose_kind(audio.intensity, rng);
        Some(Enemy::new(kind, Vec2::new(spawn_x(rng), ENEMY_SPAWN_Y)))
    }

    pub fn reset(&mut self, now_ms: u64) {
        self.last_spawn_ms = now_ms;
    }
}

/// Relative weight of each power-up kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpWeights {
    pub double_shot: u32,
    pub triple_shot: u32,
    pub shield: u32,
    pub speed: u32,
}

impl Default for PowerUpWeights {
    fn default() -> Self {
        Self {
            double_shot: 40,
            triple_shot: 20,
            shield: 20,
            speed: 20,
        }
    }
}

impl PowerUpWeights {
    /// Table for a tier; loud rooms favor the stronger kinds
    pub fn for_intensity(intensity: Intensity) -> Self {
        let mut weights = Self::default();
        if intensity == Intensity::Intense {
            weights.triple_shot += 20;
            weights.shield += 10;
        }
        weights
    }

    pub fn weight(&self, kind: PowerUpKind) -> u32 {
        match kind {
            PowerUpKind::DoubleShot => self.double_shot,
            PowerUpKind::TripleShot => self.triple_shot,
            PowerUpKind::Shield => self.shield,
            PowerUpKind::Speed => self.speed,
        }
    }

    pub fn total(&self) -> u32 {
        PowerUpKind::ALL.iter().map(|&k| self.weight(k)).sum()
    }

    /// Kind whose cumulative weight band contains `roll` (in `0..total`)
    pub fn pick(&self, roll: u32) -> PowerUpKind {
        let mut cumulative = 0;
        for kind in PowerUpKind::ALL {
            cumulative += self.weight(kind);
            if roll < cumulative {
                return kind;
            }
        }
        PowerUpKind::ALL[PowerUpKind::ALL.len() - 1]
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PowerUpKind {
        let total = self.total().max(1);
        self.pick(rng.random_range(0..total))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpSpawner {
    pub last_spawn_ms: u64,
    pub base_delay_ms: u64,
    pub base_chance: f64,
}

impl Default for PowerUpSpawner {
    fn default() -> Self {
        Self {
            last_spawn_ms: 0,
            base_delay_ms: POWERUP_SPAWN_DELAY_MS,
            base_chance: POWERUP_BASE_CHANCE,
        }
    }
}

impl PowerUpSpawner {
    /// Per-tick spawn probability: halved in Void, doubled in Intense, plus a
    /// volume bonus
    pub fn spawn_chance(&self, audio: AudioSnapshot) -> f64 {
        let tier = match audio.intensity {
            Intensity::Void => self.base_chance * 0.5,
            Intensity::Ambient => self.base_chance,
            Intensity::Intense => self.base_chance * 2.0,
        };
        tier + audio.volume as f64 * 0.2
    }

    /// Minimum interval; halved while Intense
    pub fn spawn_delay_ms(&self, intensity: Intensity) -> u64 {
        match intensity {
            Intensity::Intense => self.base_delay_ms / 2,
            _ => self.base_delay_ms,
        }
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        now_ms: u64,
        audio: AudioSnapshot,
        rng: &mut R,
    ) -> Option<PowerUp> {
        let delay = self.spawn_delay_ms(audio.intensity);
        if now_ms.saturating_sub(self.last_spawn_ms) <= delay {
            return None;
        }
        if !chance(rng, self.spawn_chance(audio)) {
            return None;
        }
        self.last_spawn_ms = now_ms;

        let kind = PowerUpWeights::for_intensity(audio.intensity).sample(rng);
        Some(PowerUp::new(kind, Vec2::new(spawn_x(rng), POWERUP_SPAWN_Y)))
    }

    /// Drop from a destroyed enemy: any kind, equally likely
    pub fn drop_at<R: Rng + ?Sized>(pos: Vec2, rng: &mut R) -> PowerUp {
        let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
        PowerUp::new(kind, pos)
    }

    pub fn reset(&mut self, now_ms: u64) {
        self.last_spawn_ms = now_ms;
    }
}
