//! The player's ship and its timed power-up effects

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::{Aabb, PowerUpKind, Projectile};
use crate::audio::Intensity;
use crate::consts::*;

/// Firing pattern selected by the active shot power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotPattern {
    Single,
    Double,
    Triple,
}

impl ShotPattern {
    /// Horizontal muzzle offsets from the ship's center
    pub fn offsets(self) -> &'static [f32] {
        match self {
            ShotPattern::Single => &[0.0],
            ShotPattern::Double => &[-10.0, 10.0],
            ShotPattern::Triple => &[0.0, -15.0, 15.0],
        }
    }
}

/// Per-tick controls relevant to the ship
#[derive(Debug, Clone, Copy, Default)]
pub struct ShipControls {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub bounds: Aabb,
    /// Timestamp of the last volley
    pub last_shot_ms: Option<u64>,
    /// Active effects keyed by kind, valued by expiry timestamp (ms)
    pub active_powerups: BTreeMap<PowerUpKind, u64>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            bounds: Aabb::new(Self::spawn_point(), Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)),
            last_shot_ms: None,
            active_powerups: BTreeMap::new(),
        }
    }

    /// Ship center at spawn: horizontally centered, bottom edge above the margin
    pub fn spawn_point() -> Vec2 {
        Vec2::new(
            SCREEN_WIDTH / 2.0,
            SCREEN_HEIGHT - PLAYER_BOTTOM_MARGIN - PLAYER_HEIGHT / 2.0,
        )
    }

    /// Move back to spawn and drop all effects
    pub fn respawn(&mut self) {
        *self = Self::new();
    }

    /// Advance one tick: expire effects, move, then fire if the trigger is held.
    /// New projectiles are appended to `shots`.
    pub fn update(
        &mut self,
        now_ms: u64,
        controls: ShipControls,
        intensity: Intensity,
        shots: &mut Vec<Projectile>,
    ) {
        self.expire_powerups(now_ms);

        let speed = self.speed();
        if controls.left && self.bounds.left() > 0.0 {
            self.bounds.center.x -= speed;
        }
        if controls.right && self.bounds.right() < SCREEN_WIDTH {
            self.bounds.center.x += speed;
        }

        if controls.fire {
            self.try_fire(now_ms, intensity, shots);
        }
    }

    /// Fire a volley if the cadence allows it
    pub fn try_fire(&mut self, now_ms: u64, intensity: Intensity, shots: &mut Vec<Projectile>) -> bool {
        let ready = self
            .last_shot_ms
            .is_none_or(|last| now_ms.saturating_sub(last) > SHOOT_DELAY_MS);
        if !ready {
            return false;
        }

        let muzzle_y = self.bounds.top();
        for &dx in self.shot_pattern().offsets() {
            shots.push(Projectile::fire(
                Vec2::new(self.bounds.center.x + dx, muzzle_y),
                intensity,
            ));
        }
        self.last_shot_ms = Some(now_ms);
        true
    }

    /// Start (or refresh) an effect lasting its standard duration
    pub fn apply_powerup(&mut self, kind: PowerUpKind, now_ms: u64) {
        self.activate_powerup(kind, now_ms, kind.duration_ms());
    }

    /// Start (or refresh) an effect. A new shot type cancels the other shot
    /// type's timer, so only one shot pattern is ever live.
    pub fn activate_powerup(&mut self, kind: PowerUpKind, now_ms: u64, duration_ms: u64) {
        if kind.is_shot_type() {
            self.active_powerups.retain(|k, _| !k.is_shot_type());
        }
        self.active_powerups
            .insert(kind, now_ms.saturating_add(duration_ms));
    }

    /// Drop effects whose expiry has passed (`now >= expiry`)
    pub fn expire_powerups(&mut self, now_ms: u64) -> Vec<PowerUpKind> {
        let expired: Vec<PowerUpKind> = self
            .active_powerups
            .iter()
            .filter(|&(_, &expiry)| now_ms >= expiry)
            .map(|(&kind, _)| kind)
            .collect();
        for kind in &expired {
            self.active_powerups.remove(kind);
        }
        expired
    }

    pub fn has_powerup(&self, kind: PowerUpKind) -> bool {
        self.active_powerups.contains_key(&kind)
    }

    pub fn shot_pattern(&self) -> ShotPattern {
        if self.has_powerup(PowerUpKind::TripleShot) {
            ShotPattern::Triple
        } else if self.has_powerup(PowerUpKind::DoubleShot) {
            ShotPattern::Double
        } else {
            ShotPattern::Single
        }
    }

    pub fn shield_active(&self) -> bool {
        self.has_powerup(PowerUpKind::Shield)
    }

    pub fn speed(&self) -> f32 {
        if self.has_powerup(PowerUpKind::Speed) {
            PLAYER_BASE_SPEED * SPEED_BOOST
        } else {
            PLAYER_BASE_SPEED
        }
    }

    /// Shield overlay alpha (0-255), pulsing over time
    pub fn shield_alpha(&self, now_ms: u64) -> u8 {
        if !self.shield_active() {
            return 0;
        }
        (128.0 + 127.0 * (now_ms as f32 * 0.01).sin()).clamp(0.0, 255.0) as u8
    }

    /// Remaining time per active effect, for the HUD
    pub fn remaining_ms(&self, now_ms: u64) -> Vec<(PowerUpKind, u64)> {
        self.active_powerups
            .iter()
            .map(|(&kind, &expiry)| (kind, expiry.saturating_sub(now_ms)))
            .collect()
    }

    /// Engine nozzle positions (for exhaust particles)
    pub fn engine_positions(&self) -> [Vec2; 2] {
        let y = self.bounds.bottom();
        let x = self.bounds.center.x;
        [Vec2::new(x - 10.0, y), Vec2::new(x + 10.0, y)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_shot_expires_on_time() {
        let mut player = Player::new();
        let t = 50_000;
        player.activate_powerup(PowerUpKind::DoubleShot, t, 10_000);

        player.expire_powerups(t + 9_999);
        assert_eq!(player.shot_pattern(), ShotPattern::Double);

        player.expire_powerups(t + 10_001);
        assert_eq!(player.shot_pattern(), ShotPattern::Single);
        assert!(player.active_powerups.is_empty());
    }

    #[test]
    fn test_expiry_is_inclusive() {
        let mut player = Player::new();
        player.apply_powerup(PowerUpKind::Shield, 0);
        assert!(player.expire_powerups(11_999).is_empty());
        assert_eq!(player.expire_powerups(12_000), vec![PowerUpKind::Shield]);
        assert!(!player.shield_active());
    }

    #[test]
    fn test_new_shot_type_cancels_previous() {
        let mut player = Player::new();
        player.apply_powerup(PowerUpKind::DoubleShot, 0);
        player.apply_powerup(PowerUpKind::TripleShot, 1_000);
        assert_eq!(player.shot_pattern(), ShotPattern::Triple);
        assert!(!player.has_powerup(PowerUpKind::DoubleShot));

        // Triple expires at 9000; nothing from the old double timer remains
        player.expire_powerups(9_000);
        assert_eq!(player.shot_pattern(), ShotPattern::Single);
    }

    #[test]
    fn test_non_shot_effects_coexist() {
        let mut player = Player::new();
        player.apply_powerup(PowerUpKind::Speed, 0);
        player.apply_powerup(PowerUpKind::Shield, 0);
        player.apply_powerup(PowerUpKind::DoubleShot, 0);
        assert!(player.shield_active());
        assert_eq!(player.speed(), 7.5);
        assert_eq!(player.shot_pattern(), ShotPattern::Double);
    }

    #[test]
    fn test_fire_cadence_and_patterns() {
        let mut player = Player::new();
        let mut shots = Vec::new();
        assert!(player.try_fire(1_000, Intensity::Ambient, &mut shots));
        assert_eq!(shots.len(), 1);
        assert!(!player.try_fire(1_250, Intensity::Ambient, &mut shots));
        assert!(player.try_fire(1_251, Intensity::Ambient, &mut shots));
        assert_eq!(shots.len(), 2);

        player.apply_powerup(PowerUpKind::TripleShot, 1_251);
        shots.clear();
        assert!(player.try_fire(2_000, Intensity::Intense, &mut shots));
        assert_eq!(shots.len(), 3);
        assert!(shots.iter().all(|s| s.intensity == Intensity::Intense));
        assert!(shots.iter().all(|s| (s.bounds.bottom() - player.bounds.top()).abs() < 1e-4));
    }

    #[test]
    fn test_movement_bounded_to_screen() {
        let mut player = Player::new();
        let mut shots = Vec::new();
        let left = ShipControls {
            left: true,
            ..Default::default()
        };
        for t in 0..500 {
            player.update(t, left, Intensity::Void, &mut shots);
        }
        assert!(player.bounds.left() <= 0.0);
        assert!(player.bounds.left() > -PLAYER_BASE_SPEED);
        assert!(shots.is_empty());
    }

    #[test]
    fn test_speed_boost_moves_faster() {
        let mut player = Player::new();
        let mut shots = Vec::new();
        let right = ShipControls {
            right: true,
            ..Default::default()
        };
        let start = player.bounds.center.x;
        player.apply_powerup(PowerUpKind::Speed, 0);
        player.update(1, right, Intensity::Void, &mut shots);
        assert!((player.bounds.center.x - start - 7.5).abs() < 1e-5);
    }

    #[test]
    fn test_respawn_clears_effects() {
        let mut player = Player::new();
        player.apply_powerup(PowerUpKind::Shield, 0);
        player.bounds.center.x = 10.0;
        player.respawn();
        assert!(player.active_powerups.is_empty());
        assert_eq!(player.bounds.center, Player::spawn_point());
        assert!((player.bounds.bottom() - (SCREEN_HEIGHT - 20.0)).abs() < 1e-4);
    }
}
