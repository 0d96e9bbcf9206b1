//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by slot index)
//! - No rendering, device or file dependencies

pub mod collision;
pub mod entities;
pub mod fx;
pub mod player;
pub mod pool;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::{CollisionReport, resolve_collisions};
pub use entities::{Aabb, Enemy, EnemyKind, PowerUp, PowerUpKind, Projectile};
pub use fx::{Background, Particle, ParticleKind, ParticleSystem};
pub use player::{Player, ShipControls, ShotPattern};
pub use pool::{EntityId, EntityPool};
pub use spawn::{EnemySpawner, PowerUpSpawner, PowerUpWeights};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use world::World;
