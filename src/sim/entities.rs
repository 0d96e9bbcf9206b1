//! Enemies, projectiles and power-ups
//!
//! Each entity owns its position and movement parameters. Movement is in
//! pixels per tick; removal happens when an entity leaves the visible area.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::audio::Intensity;
use crate::consts::*;

/// Axis-aligned bounding box (center + half extents)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    pub fn top(&self) -> f32 {
        self.center.y - self.half.y
    }

    pub fn bottom(&self) -> f32 {
        self.center.y + self.half.y
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half.x
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half.x
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half + other.half;
        d.x < reach.x && d.y < reach.y
    }
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Elite,
    Boss,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Basic, EnemyKind::Elite, EnemyKind::Boss];

    /// Points before the intensity multiplier
    pub fn base_points(self) -> u64 {
        match self {
            EnemyKind::Basic => 10,
            EnemyKind::Elite => 20,
            EnemyKind::Boss => 50,
        }
    }

    /// Kinds that may spawn in a tier (drawn uniformly)
    pub fn pool_for(intensity: Intensity) -> &'static [EnemyKind] {
        match intensity {
            Intensity::Void => &Self::ALL[..1],
            Intensity::Ambient => &Self::ALL[..2],
            Intensity::Intense => &Self::ALL,
        }
    }
}

/// Downward speed for a tier
pub fn enemy_speed(intensity: Intensity) -> f32 {
    match intensity {
        Intensity::Void => 1.0,
        Intensity::Ambient => 2.0,
        Intensity::Intense => 3.0,
    }
}

/// A descending enemy weaving around its spawn column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub bounds: Aabb,
    /// Column the sine weave is centered on
    pub origin_x: f32,
    /// Accumulated weave phase (radians)
    pub phase: f32,
}

impl Enemy {
    pub fn new(kind: EnemyKind, center: Vec2) -> Self {
        Self {
            kind,
            bounds: Aabb::new(center, Vec2::splat(ENEMY_SIZE)),
            origin_x: center.x,
            phase: 0.0,
        }
    }

    pub fn update(&mut self, intensity: Intensity) {
        self.bounds.center.y += enemy_speed(intensity);
        self.phase += ENEMY_PHASE_STEP;
        self.bounds.center.x = self.origin_x + self.phase.sin() * ENEMY_WAVE_AMPLITUDE;
    }

    /// Fully below the visible area
    pub fn is_offscreen(&self) -> bool {
        self.bounds.top() > SCREEN_HEIGHT
    }
}

/// A player shot travelling straight up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub bounds: Aabb,
    pub speed: f32,
    /// Tier at the moment of firing (drives size and color)
    pub intensity: Intensity,
}

impl Projectile {
    /// Size for shots fired under each tier
    pub fn size_for(intensity: Intensity) -> Vec2 {
        match intensity {
            Intensity::Void => Vec2::new(4.0, 10.0),
            Intensity::Ambient => Vec2::new(6.0, 15.0),
            Intensity::Intense => Vec2::new(8.0, 20.0),
        }
    }

    /// Spawn with the bottom edge at `muzzle.y`, centered on `muzzle.x`
    pub fn fire(muzzle: Vec2, intensity: Intensity) -> Self {
        let size = Self::size_for(intensity);
        let center = Vec2::new(muzzle.x, muzzle.y - size.y * 0.5);
        Self {
            bounds: Aabb::new(center, size),
            speed: PROJECTILE_SPEED,
            intensity,
        }
    }

    pub fn update(&mut self) {
        self.bounds.center.y += self.speed;
    }

    /// Fully above the visible area
    pub fn is_offscreen(&self) -> bool {
        self.bounds.bottom() < 0.0
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerUpKind {
    DoubleShot,
    TripleShot,
    Shield,
    Speed,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::DoubleShot,
        PowerUpKind::TripleShot,
        PowerUpKind::Shield,
        PowerUpKind::Speed,
    ];

    /// Effect duration once collected
    pub fn duration_ms(self) -> u64 {
        match self {
            PowerUpKind::DoubleShot => 10_000,
            PowerUpKind::TripleShot => 8_000,
            PowerUpKind::Shield => 12_000,
            PowerUpKind::Speed => 15_000,
        }
    }

    /// Shot kinds replace each other
    pub fn is_shot_type(self) -> bool {
        matches!(self, PowerUpKind::DoubleShot | PowerUpKind::TripleShot)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PowerUpKind::DoubleShot => "double_shot",
            PowerUpKind::TripleShot => "triple_shot",
            PowerUpKind::Shield => "shield",
            PowerUpKind::Speed => "speed",
        }
    }
}

/// A falling power-up capsule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub bounds: Aabb,
    pub origin_x: f32,
    pub phase: f32,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, center: Vec2) -> Self {
        Self {
            kind,
            bounds: Aabb::new(center, Vec2::splat(POWERUP_SIZE)),
            origin_x: center.x,
            phase: 0.0,
        }
    }

    pub fn update(&mut self) {
        self.bounds.center.y += POWERUP_FALL_SPEED;
        self.phase += POWERUP_PHASE_STEP;
        self.bounds.center.x = self.origin_x + self.phase.sin() * POWERUP_DRIFT_AMPLITUDE;
    }

    pub fn is_offscreen(&self) -> bool {
        self.bounds.top() > SCREEN_HEIGHT
    }
}
