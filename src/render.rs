//! Per-tick hand-off to a drawing backend
//!
//! The loop builds one `FrameState` after each tick. Backends only read it;
//! nothing here feeds back into the simulation.

use crate::audio::AudioSnapshot;
use crate::sim::{
    Background, Enemy, GamePhase, ParticleSystem, Player, PowerUp, PowerUpKind, Projectile,
    World,
};

/// Numbers shown on the heads-up display
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: u64,
    pub high_score: u64,
    pub multiplier: f32,
    pub health: u32,
    pub max_health: u32,
    pub game_over: bool,
    pub level: u32,
    /// Active effects with remaining milliseconds
    pub powerups: Vec<(PowerUpKind, u64)>,
    pub audio: AudioSnapshot,
}

impl Hud {
    pub fn from_world(world: &World) -> Self {
        let state = &world.state;
        Self {
            score: state.score,
            high_score: state.high_score,
            multiplier: state.multiplier,
            health: state.health,
            max_health: state.max_health,
            game_over: state.game_over,
            level: state.level,
            powerups: world.player.remaining_ms(world.now_ms),
            audio: world.audio,
        }
    }

    /// Multiplier text, only when it actually boosts
    pub fn multiplier_label(&self) -> Option<String> {
        (self.multiplier > 1.0).then(|| format!("x{:.1}", self.multiplier))
    }

    /// Health as a 0..=1 fraction for the bar
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }

    pub fn summary(&self) -> String {
        let mut line = format!(
            "score {} | best {} | hp {}/{} | audio {} ({:.3})",
            self.score,
            self.high_score,
            self.health,
            self.max_health,
            self.audio.intensity.as_str(),
            self.audio.volume,
        );
        if let Some(mult) = self.multiplier_label() {
            line.push_str(&format!(" | {}", mult));
        }
        for (kind, remaining) in &self.powerups {
            line.push_str(&format!(" | {} {:.1}s", kind.as_str(), *remaining as f32 / 1000.0));
        }
        line
    }
}

/// Everything drawable for one tick, borrowed from the world
pub struct FrameState<'a> {
    pub now_ms: u64,
    pub phase: GamePhase,
    pub background: &'a Background,
    pub player: &'a Player,
    pub shield_alpha: u8,
    pub enemies: Vec<&'a Enemy>,
    pub projectiles: Vec<&'a Projectile>,
    pub powerups: Vec<&'a PowerUp>,
    pub particles: &'a ParticleSystem,
    pub hud: Hud,
}

impl<'a> FrameState<'a> {
    pub fn capture(world: &'a World) -> Self {
        Self {
            now_ms: world.now_ms,
            phase: world.phase,
            background: &world.background,
            player: &world.player,
            shield_alpha: world.player.shield_alpha(world.now_ms),
            enemies: world.enemies.values().collect(),
            projectiles: world.projectiles.values().collect(),
            powerups: world.powerups.values().collect(),
            particles: &world.particles,
            hud: Hud::from_world(world),
        }
    }

    /// Overlay lines shown while the game is over
    pub fn game_over_lines(&self) -> Option<[String; 3]> {
        if self.phase != GamePhase::GameOver {
            return None;
        }
        Some([
            "GAME OVER".to_string(),
            format!("Final Score: {}", self.hud.score),
            "Press SPACE to restart".to_string(),
        ])
    }
}

/// Drawing backend
pub trait Renderer {
    fn draw(&mut self, frame: &FrameState<'_>);
}

/// Backend for terminals and tests: writes the HUD to the log
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    last_report_ms: Option<u64>,
    showing_game_over: bool,
    pub frames: u64,
}

impl HeadlessRenderer {
    /// HUD log interval
    const REPORT_EVERY_MS: u64 = 1_000;

    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for HeadlessRenderer {
    fn draw(&mut self, frame: &FrameState<'_>) {
        self.frames += 1;

        match frame.game_over_lines() {
            Some(lines) if !self.showing_game_over => {
                self.showing_game_over = true;
                for line in lines {
                    log::info!("{}", line);
                }
            }
            Some(_) => {}
            None => self.showing_game_over = false,
        }

        let due = self
            .last_report_ms
            .is_none_or(|last| frame.now_ms.saturating_sub(last) >= Self::REPORT_EVERY_MS);
        if due {
            self.last_report_ms = Some(frame.now_ms);
            log::info!(
                "{} | enemies {} shots {} pickups {} particles {}",
                frame.hud.summary(),
                frame.enemies.len(),
                frame.projectiles.len(),
                frame.powerups.len(),
                frame.particles.len(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Intensity;
    use crate::sim::{EnemyKind, PowerUpKind};
    use glam::Vec2;

    #[test]
    fn test_hud_mirrors_state() {
        let mut world = World::new(1, 300);
        world.state.add_score(50, Intensity::Intense);
        world.state.take_damage(25);
        world.player.apply_powerup(PowerUpKind::Speed, 0);
        world.now_ms = 5_000;

        let hud = Hud::from_world(&world);
        assert_eq!(hud.score, 100);
        assert_eq!(hud.high_score, 300);
        assert_eq!(hud.health, 75);
        assert_eq!(hud.multiplier_label().as_deref(), Some("x2.0"));
        assert_eq!(hud.powerups, vec![(PowerUpKind::Speed, 10_000)]);
        assert!((hud.health_fraction() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_no_multiplier_label_at_base() {
        let world = World::new(1, 0);
        assert_eq!(Hud::from_world(&world).multiplier_label(), None);
    }

    #[test]
    fn test_frame_lists_entities() {
        let mut world = World::new(2, 0);
        world
            .enemies
            .insert(Enemy::new(EnemyKind::Elite, Vec2::new(100.0, 100.0)));
        let frame = FrameState::capture(&world);
        assert_eq!(frame.enemies.len(), 1);
        assert!(frame.projectiles.is_empty());
        assert!(frame.game_over_lines().is_none());
    }

    #[test]
    fn test_game_over_overlay() {
        let mut world = World::new(3, 0);
        world.state.add_score(20, Intensity::Void);
        world.phase = GamePhase::GameOver;
        let frame = FrameState::capture(&world);
        let lines = frame.game_over_lines().unwrap();
        assert_eq!(lines[0], "GAME OVER");
        assert_eq!(lines[1], "Final Score: 20");

        let mut renderer = HeadlessRenderer::new();
        renderer.draw(&frame);
        renderer.draw(&frame);
        assert_eq!(renderer.frames, 2);
    }
}
