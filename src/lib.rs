//! Sonic Raid - a vertical arcade shooter driven by the room's noise level
//!
//! Core modules:
//! - `audio`: Microphone capture and intensity classification
//! - `sim`: Deterministic simulation (entities, spawning, collisions, game state)
//! - `game`: Fixed-rate loop tying audio, input, simulation and rendering together
//! - `render`: Per-tick frame hand-off to a drawing backend
//! - `highscores`: High score persistence
//! - `settings`: Data-driven configuration
//! - `input`: Per-tick input sources (demo autopilot, scripted)
//! - `cli`: Command-line overrides

pub mod audio;
pub mod cli;
pub mod game;
pub mod highscores;
pub mod input;
pub mod render;
pub mod settings;
pub mod sim;

pub use audio::{AudioAnalyzer, AudioSnapshot, Intensity};
pub use game::GameLoop;
pub use highscores::{JsonScoreStore, MemoryScoreStore, ScoreStore};
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Visible area
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Target tick rate
    pub const TICK_RATE_HZ: u32 = 60;
    /// Maximum ticks run per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Capture format
    pub const SAMPLE_RATE_HZ: u32 = 44_100;
    pub const BLOCK_SIZE: usize = 2048;
    /// RMS below this is Void
    pub const VOID_THRESHOLD: f32 = 0.02;
    /// RMS at or above this is Intense
    pub const INTENSE_THRESHOLD: f32 = 0.10;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 60.0;
    pub const PLAYER_HEIGHT: f32 = 80.0;
    pub const PLAYER_BASE_SPEED: f32 = 5.0;
    pub const SPEED_BOOST: f32 = 1.5;
    /// Gap between the player's bottom edge and the screen bottom at spawn
    pub const PLAYER_BOTTOM_MARGIN: f32 = 20.0;
    pub const SHOOT_DELAY_MS: u64 = 250;
    pub const MAX_HEALTH: u32 = 100;

    /// Enemy defaults
    pub const ENEMY_SIZE: f32 = 40.0;
    pub const ENEMY_WAVE_AMPLITUDE: f32 = 50.0;
    pub const ENEMY_PHASE_STEP: f32 = 0.05;
    pub const ENEMY_SPAWN_Y: f32 = -50.0;
    pub const ENEMY_SPAWN_DELAY_MS: u64 = 1000;
    /// Fixed damage per player/enemy contact
    pub const CONTACT_DAMAGE: u32 = 25;

    /// Projectile defaults
    pub const PROJECTILE_SPEED: f32 = -10.0;

    /// Power-up defaults
    pub const POWERUP_SIZE: f32 = 30.0;
    pub const POWERUP_FALL_SPEED: f32 = 2.0;
    pub const POWERUP_DRIFT_AMPLITUDE: f32 = 30.0;
    pub const POWERUP_PHASE_STEP: f32 = 0.1;
    pub const POWERUP_SPAWN_Y: f32 = -30.0;
    pub const POWERUP_SPAWN_DELAY_MS: u64 = 5000;
    pub const POWERUP_BASE_CHANCE: f64 = 0.1;
    /// Chance that a destroyed enemy drops a power-up
    pub const POWERUP_DROP_CHANCE: f64 = 0.1;

    /// Horizontal spawn margin for enemies and power-ups
    pub const SPAWN_MARGIN: f32 = 50.0;

    /// Chance per tick of emitting engine fire
    pub const ENGINE_FIRE_CHANCE: f64 = 0.3;

    /// Milliseconds per tick at the given rate
    #[inline]
    pub fn tick_interval_ms(rate_hz: u32) -> f64 {
        1000.0 / rate_hz.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::consts::*;

    #[test]
    fn test_tick_interval() {
        assert!((tick_interval_ms(TICK_RATE_HZ) - 1000.0 / 60.0).abs() < 1e-9);
        assert_eq!(tick_interval_ms(100), 10.0);
        // A zero rate is treated as 1 Hz rather than dividing by zero
        assert_eq!(tick_interval_ms(0), 1000.0);
    }
}
