//! Score, health and phase
//!
//! Pure data plus the transition rules. Persistence of the high score is left
//! to the caller, which drains `take_high_score_update` after each tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::{EnemyKind, PowerUpKind};
use crate::audio::Intensity;
use crate::consts::MAX_HEALTH;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Health reached zero; waiting for restart
    GameOver,
}

/// Gameplay events emitted during a tick (for sound, logging, visuals)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemyDestroyed { kind: EnemyKind, pos: Vec2, points: u64 },
    PowerUpDropped { kind: PowerUpKind, pos: Vec2 },
    PowerUpCollected { kind: PowerUpKind },
    PowerUpExpired { kind: PowerUpKind },
    PlayerHit { damage: u32 },
    NewHighScore { score: u64 },
    GameOver { score: u64 },
    Restarted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub score: u64,
    /// Best score seen this run or loaded from storage; never decreases
    pub high_score: u64,
    /// Multiplier applied to the most recent award
    pub multiplier: f32,
    pub health: u32,
    pub max_health: u32,
    /// True exactly when health is zero
    pub game_over: bool,
    pub level: u32,
    /// High score not yet written to storage
    #[serde(skip)]
    pending_high_score: Option<u64>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GameState {
    pub fn new(high_score: u64) -> Self {
        Self {
            score: 0,
            high_score,
            multiplier: 1.0,
            health: MAX_HEALTH,
            max_health: MAX_HEALTH,
            game_over: false,
            level: 1,
            pending_high_score: None,
        }
    }

    /// Award `floor(base_points * multiplier)` for the given tier.
    /// Returns the points actually added.
    pub fn add_score(&mut self, base_points: u64, intensity: Intensity) -> u64 {
        self.multiplier = intensity.multiplier();
        let points = (base_points as f64 * self.multiplier as f64).floor() as u64;
        self.score = self.score.saturating_add(points);

        if self.score > self.high_score {
            self.high_score = self.score;
            self.pending_high_score = Some(self.high_score);
        }
        points
    }

    pub fn take_damage(&mut self, amount: u32) {
        if self.game_over {
            return;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.game_over = true;
        }
    }

    pub fn heal(&mut self, amount: u32) {
        if self.game_over {
            return;
        }
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    /// Start a fresh run; the high score is kept
    pub fn reset(&mut self) {
        self.score = 0;
        self.multiplier = 1.0;
        self.health = self.max_health;
        self.game_over = false;
        self.level = 1;
    }

    /// High score that changed since the last call, if any
    pub fn take_high_score_update(&mut self) -> Option<u64> {
        self.pending_high_score.take()
    }
}
