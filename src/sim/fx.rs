//! Visual-only state: particles and the scrolling background
//!
//! Nothing here affects gameplay, but it is advanced by the tick so every
//! renderer sees the same picture.

use std::f32::consts::{FRAC_PI_4, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entities::PowerUpKind;
use crate::audio::{AudioSnapshot, Intensity};
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Particle motion model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Normal,
    /// Shrinks and rises as it burns out
    Fire,
    /// Falls under gravity
    Spark,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: [u8; 3],
    pub kind: ParticleKind,
    /// Ticks left
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
}

impl Particle {
    /// Fade-out alpha (0-255)
    pub fn alpha(&self) -> u8 {
        if self.max_life == 0 {
            return 0;
        }
        ((self.life as f32 / self.max_life as f32) * 255.0) as u8
    }

    fn update(&mut self) {
        self.pos += self.vel;
        self.life = self.life.saturating_sub(1);
        match self.kind {
            ParticleKind::Normal => {}
            ParticleKind::Fire => {
                self.size = (self.size * 0.95).max(1.0);
                self.vel = Vec2::new(self.vel.x * 0.98, self.vel.y * 0.98 - 0.1);
            }
            ParticleKind::Spark => {
                self.vel = Vec2::new(self.vel.x * 0.98, self.vel.y + 0.2);
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticleSystem {
    pub particles: Vec<Particle>,
    /// Cap on live particles; the oldest are dropped first
    pub max_particles: usize,
}

impl ParticleSystem {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::new(),
            max_particles,
        }
    }

    fn push(&mut self, particle: Particle) {
        if self.max_particles == 0 {
            return;
        }
        if self.particles.len() >= self.max_particles {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Radial burst where an enemy died
    pub fn create_explosion<R: Rng + ?Sized>(&mut self, pos: Vec2, color: [u8; 3], rng: &mut R) {
        for _ in 0..20 {
            let angle = rng.random_range(0.0..TAU);
            let speed = rng.random_range(2.0..=5.0);
            let life = rng.random_range(20..=40);
            self.push(Particle {
                pos,
                vel: Vec2::from_angle(angle) * speed,
                color,
                kind: ParticleKind::Normal,
                life,
                max_life: life,
                size: rng.random_range(2..=4) as f32,
            });
        }
    }

    /// Upward cone of sparks at an impact
    pub fn create_hit_sparks<R: Rng + ?Sized>(&mut self, pos: Vec2, rng: &mut R) {
        for _ in 0..5 {
            let angle: f32 = rng.random_range(-FRAC_PI_4..=FRAC_PI_4);
            let speed = rng.random_range(3.0..=6.0);
            let life = rng.random_range(15..=25);
            self.push(Particle {
                pos,
                vel: Vec2::new(angle.cos() * speed, -angle.sin() * speed),
                color: [255, rng.random_range(200..=255), rng.random_range(0..=100)],
                kind: ParticleKind::Spark,
                life,
                max_life: life,
                size: rng.random_range(1..=3) as f32,
            });
        }
    }

    /// One exhaust puff below an engine
    pub fn create_engine_fire<R: Rng + ?Sized>(&mut self, pos: Vec2, rng: &mut R) {
        let life = rng.random_range(10..=20);
        self.push(Particle {
            pos,
            vel: Vec2::new(rng.random_range(-0.5..=0.5), rng.random_range(1.0..=3.0)),
            color: [255, rng.random_range(100..=200), 0],
            kind: ParticleKind::Fire,
            life,
            max_life: life,
            size: rng.random_range(2..=4) as f32,
        });
    }

    /// Expanding ring when a power-up is collected
    pub fn create_powerup_effect<R: Rng + ?Sized>(
        &mut self,
        pos: Vec2,
        kind: PowerUpKind,
        rng: &mut R,
    ) {
        let color = powerup_color(kind);
        for i in 0..12 {
            let angle = i as f32 / 12.0 * TAU + rng.random_range(-0.1..=0.1);
            self.push(Particle {
                pos,
                vel: Vec2::from_angle(angle) * 3.0,
                color,
                kind: ParticleKind::Normal,
                life: 25,
                max_life: 25,
                size: 3.0,
            });
        }
    }

    pub fn update(&mut self) {
        self.particles.retain(|p| p.life > 0);
        for particle in &mut self.particles {
            particle.update();
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Base color of each power-up
pub fn powerup_color(kind: PowerUpKind) -> [u8; 3] {
    match kind {
        PowerUpKind::DoubleShot => [255, 50, 50],
        PowerUpKind::TripleShot => [255, 100, 50],
        PowerUpKind::Shield => [50, 150, 255],
        PowerUpKind::Speed => [50, 255, 50],
    }
}

/// A background star; layer 0 is farthest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub layer: u8,
    pub size: f32,
    pub base_speed: f32,
    pub speed: f32,
    pub brightness: f32,
    /// 0 = point, 1 = fully stretched warp streak
    pub warp: f32,
    pub pulse_offset: f32,
}

impl Star {
    fn new<R: Rng + ?Sized>(layer: u8, rng: &mut R) -> Self {
        let base_speed = match layer {
            0 => rng.random_range(0.5..=1.0),
            1 => rng.random_range(2.0..=3.0),
            _ => rng.random_range(4.0..=6.0),
        };
        Self {
            pos: Vec2::new(
                rng.random_range(0.0..SCREEN_WIDTH),
                rng.random_range(0.0..SCREEN_HEIGHT),
            ),
            layer,
            size: rng.random_range(1..=1 + layer as u32) as f32,
            base_speed,
            speed: base_speed,
            brightness: 0.3 + layer as f32 * 0.2,
            warp: 0.0,
            pulse_offset: rng.random_range(0.0..TAU),
        }
    }

    fn update<R: Rng + ?Sized>(&mut self, audio: AudioSnapshot, now_ms: u64, rng: &mut R) {
        let target = if audio.intensity == Intensity::Intense {
            self.warp = (self.warp + 0.1).min(1.0);
            self.base_speed * (2.5 + self.layer as f32)
        } else {
            self.warp = (self.warp - 0.1).max(0.0);
            self.base_speed
        };
        self.speed = self.speed * 0.9 + target * 0.1;
        self.pos.y += self.speed;

        if self.pos.y > SCREEN_HEIGHT {
            self.pos = Vec2::new(rng.random_range(0.0..SCREEN_WIDTH), -10.0);
            self.size = rng.random_range(1..=1 + self.layer as u32) as f32;
        }

        let pulse = ((now_ms as f32 * 0.005 + self.pulse_offset).sin() + 1.0) * 0.5;
        self.brightness = 0.3 + self.layer as f32 * 0.2 + audio.volume * pulse;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nebula {
    pub pos: Vec2,
    pub radius: f32,
    pub color: [u8; 3],
    pub alpha: u8,
    pub pulse_speed: f32,
    pub time_offset: f32,
}

const NEBULA_COLORS: [[u8; 3]; 4] = [[147, 39, 143], [64, 84, 178], [191, 64, 191], [75, 0, 130]];

impl Nebula {
    fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            pos: Vec2::new(
                rng.random_range(0.0..SCREEN_WIDTH),
                rng.random_range(0.0..SCREEN_HEIGHT),
            ),
            radius: rng.random_range(100.0..300.0),
            color: NEBULA_COLORS[rng.random_range(0..NEBULA_COLORS.len())],
            alpha: rng.random_range(30..=50),
            pulse_speed: rng.random_range(0.001..=0.003),
            time_offset: rng.random_range(0.0..TAU),
        }
    }

    fn update<R: Rng + ?Sized>(&mut self, audio: AudioSnapshot, now_ms: u64, rng: &mut R) {
        let pulse = ((now_ms as f32 * self.pulse_speed + self.time_offset).sin() + 1.0) * 0.5;
        self.alpha = (30.0 + 20.0 * pulse + audio.volume.min(1.0) * 20.0) as u8;
        self.pos.y += 0.2;
        if self.pos.y - self.radius > SCREEN_HEIGHT {
            *self = Self::new(rng);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supernova {
    pub pos: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub growth: f32,
    pub alpha: u8,
}

impl Supernova {
    /// Returns false once fully faded
    fn update(&mut self) -> bool {
        self.radius = (self.radius + self.growth).min(self.max_radius);
        if self.radius >= self.max_radius {
            self.alpha = self.alpha.saturating_sub(10);
        }
        self.alpha > 0
    }
}

/// Audio-reactive backdrop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Background {
    pub stars: Vec<Star>,
    pub nebulas: Vec<Nebula>,
    pub supernovas: Vec<Supernova>,
    pub last_nova_ms: u64,
    pub nova_delay_ms: u64,
}

impl Background {
    /// `star_counts` gives stars per layer, far to near
    pub fn new<R: Rng + ?Sized>(star_counts: [usize; 3], nebulas: usize, rng: &mut R) -> Self {
        let mut stars = Vec::with_capacity(star_counts.iter().sum());
        for (layer, &count) in star_counts.iter().enumerate() {
            for _ in 0..count {
                stars.push(Star::new(layer as u8, rng));
            }
        }
        Self {
            stars,
            nebulas: (0..nebulas).map(|_| Nebula::new(rng)).collect(),
            supernovas: Vec::new(),
            last_nova_ms: 0,
            nova_delay_ms: 5_000,
        }
    }

    /// No decorations at all
    pub fn empty() -> Self {
        Self {
            stars: Vec::new(),
            nebulas: Vec::new(),
            supernovas: Vec::new(),
            last_nova_ms: 0,
            nova_delay_ms: 5_000,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, audio: AudioSnapshot, now_ms: u64, rng: &mut R) {
        for star in &mut self.stars {
            star.update(audio, now_ms, rng);
        }
        for nebula in &mut self.nebulas {
            nebula.update(audio, now_ms, rng);
        }
        self.supernovas.retain_mut(Supernova::update);

        if self.stars.is_empty() && self.nebulas.is_empty() {
            return;
        }
        let p = (0.01 + audio.volume as f64 * 0.1).clamp(0.0, 1.0);
        if now_ms.saturating_sub(self.last_nova_ms) > self.nova_delay_ms && rng.random_bool(p) {
            self.supernovas.push(Supernova {
                pos: Vec2::new(
                    rng.random_range(0.0..SCREEN_WIDTH),
                    rng.random_range(0.0..SCREEN_HEIGHT),
                ),
                radius: 1.0,
                max_radius: rng.random_range(100..=200) as f32,
                growth: rng.random_range(5.0..=10.0),
                alpha: 255,
            });
            self.last_nova_ms = now_ms;
        }
    }
}
