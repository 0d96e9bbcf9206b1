//! Collision passes between entity collections
//!
//! Three independent brute-force pairwise passes. Entity counts stay in the
//! tens, so there is no spatial partitioning. Removal goes through the pools,
//! which keeps ids taken before a pass valid while it runs.

use rand::Rng;

use super::entities::PowerUpKind;
use super::spawn::PowerUpSpawner;
use super::state::GameEvent;
use super::world::World;
use crate::consts::{CONTACT_DAMAGE, POWERUP_DROP_CHANCE};

/// Explosion color for destroyed enemies
const EXPLOSION_COLOR: [u8; 3] = [255, 200, 0];

/// Outcome of one full resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    pub enemies_shot: u32,
    pub points_awarded: u64,
    pub powerups_dropped: u32,
    pub collected: Option<PowerUpKind>,
    pub enemies_rammed: u32,
    pub damage_taken: u32,
}

/// Run all three passes in order
pub fn resolve_collisions(world: &mut World) -> CollisionReport {
    let mut report = CollisionReport::default();
    projectiles_vs_enemies(world, &mut report);
    report.collected = player_vs_powerups(world);
    player_vs_enemies(world, &mut report);
    report
}

/// Shots destroy every enemy they overlap and are consumed. Each kill scores
/// its base value times the current multiplier and may drop a power-up.
pub fn projectiles_vs_enemies(world: &mut World, report: &mut CollisionReport) {
    let intensity = world.audio.intensity;

    for shot_id in world.projectiles.ids() {
        let Some(shot) = world.projectiles.get(shot_id) else {
            continue;
        };
        let shot_bounds = shot.bounds;

        let hits: Vec<_> = world
            .enemies
            .iter()
            .filter(|(_, enemy)| enemy.bounds.overlaps(&shot_bounds))
            .map(|(id, _)| id)
            .collect();
        if hits.is_empty() {
            continue;
        }
        world.projectiles.remove(shot_id);

        for enemy_id in hits {
            let Some(enemy) = world.enemies.remove(enemy_id) else {
                continue;
            };
            let pos = enemy.bounds.center;
            let points = world.state.add_score(enemy.kind.base_points(), intensity);
            report.enemies_shot += 1;
            report.points_awarded += points;

            world
                .particles
                .create_explosion(pos, EXPLOSION_COLOR, &mut world.rng);
            world.particles.create_hit_sparks(pos, &mut world.rng);
            world.events.push(GameEvent::EnemyDestroyed {
                kind: enemy.kind,
                pos,
                points,
            });

            if world.rng.random_bool(POWERUP_DROP_CHANCE) {
                let drop = PowerUpSpawner::drop_at(pos, &mut world.rng);
                world.events.push(GameEvent::PowerUpDropped {
                    kind: drop.kind,
                    pos,
                });
                world.powerups.insert(drop);
                report.powerups_dropped += 1;
            }
        }
    }
}

/// The first overlapping power-up (in slot order) is consumed and applied.
/// Any others stay for the next tick.
pub fn player_vs_powerups(world: &mut World) -> Option<PowerUpKind> {
    let player_bounds = world.player.bounds;
    let hit = world
        .powerups
        .iter()
        .find(|(_, p)| p.bounds.overlaps(&player_bounds))
        .map(|(id, _)| id)?;

    let powerup = world.powerups.remove(hit)?;
    world.player.apply_powerup(powerup.kind, world.now_ms);
    world
        .particles
        .create_powerup_effect(player_bounds.center, powerup.kind, &mut world.rng);
    world
        .events
        .push(GameEvent::PowerUpCollected { kind: powerup.kind });
    Some(powerup.kind)
}

/// Without a shield, every overlapping enemy is destroyed and the player takes
/// one fixed hit for the tick. With a shield the pass does nothing.
pub fn player_vs_enemies(world: &mut World, report: &mut CollisionReport) {
    if world.player.shield_active() {
        return;
    }
    let player_bounds = world.player.bounds;
    let hits: Vec<_> = world
        .enemies
        .iter()
        .filter(|(_, e)| e.bounds.overlaps(&player_bounds))
        .map(|(id, _)| id)
        .collect();
    if hits.is_empty() {
        return;
    }

    for id in hits {
        world.enemies.remove(id);
        report.enemies_rammed += 1;
    }
    world.state.take_damage(CONTACT_DAMAGE);
    report.damage_taken += CONTACT_DAMAGE;
    world.events.push(GameEvent::PlayerHit {
        damage: CONTACT_DAMAGE,
    });
}
