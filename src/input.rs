//! Input sources polled once per tick
//!
//! Movement and fire are held states. Restart and quit are edge-triggered and
//! only count for the tick they are reported on.

use std::collections::VecDeque;

use crate::sim::{GamePhase, TickInput, World};

/// What the loop reads from an input source for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Commands {
    pub tick: TickInput,
    pub quit: bool,
}

pub trait InputSource {
    fn poll(&mut self, world: &World) -> Commands;
}

/// Demo player: tracks the nearest enemy, always fires, detours for pickups
/// when nothing is close, and restarts after a short pause on game over.
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Ticks to wait on the game-over screen before restarting
    pub restart_delay_ticks: u32,
    /// Enemies closer than this (vertically) make pickups unsafe
    pub danger_distance: f32,
    waited: u32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            restart_delay_ticks: 120,
            danger_distance: 200.0,
            waited: 0,
        }
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// x the ship should steer toward, if any
    fn target_x(&self, world: &World) -> Option<f32> {
        let ship = world.player.bounds.center;

        // Lowest enemy on screen is the most urgent
        let nearest_enemy = world
            .enemies
            .values()
            .filter(|e| e.bounds.bottom() > 0.0)
            .max_by(|a, b| {
                a.bounds
                    .center
                    .y
                    .partial_cmp(&b.bounds.center.y)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        let safe = nearest_enemy.is_none_or(|e| ship.y - e.bounds.center.y > self.danger_distance);

        if safe {
            let pickup = world.powerups.values().min_by(|a, b| {
                let da = a.bounds.center.distance_squared(ship);
                let db = b.bounds.center.distance_squared(ship);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });
            if let Some(pickup) = pickup {
                return Some(pickup.bounds.center.x);
            }
        }

        nearest_enemy.map(|e| {
            // Dodge anything about to ram us, otherwise line up a shot
            if ship.y - e.bounds.center.y < world.player.bounds.half.y * 2.0 {
                let away = if e.bounds.center.x < ship.x { 1.0 } else { -1.0 };
                ship.x + away * 100.0
            } else {
                e.bounds.center.x
            }
        })
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self, world: &World) -> Commands {
        if world.phase == GamePhase::GameOver {
            self.waited += 1;
            let restart = self.waited >= self.restart_delay_ticks;
            if restart {
                self.waited = 0;
            }
            return Commands {
                tick: TickInput {
                    restart,
                    ..Default::default()
                },
                quit: false,
            };
        }
        self.waited = 0;

        let ship_x = world.player.bounds.center.x;
        let deadzone = world.player.speed();
        let (left, right) = match self.target_x(world) {
            Some(x) if x < ship_x - deadzone => (true, false),
            Some(x) if x > ship_x + deadzone => (false, true),
            _ => (false, false),
        };

        Commands {
            tick: TickInput {
                left,
                right,
                fire: true,
                restart: false,
            },
            quit: false,
        }
    }
}

/// Replays a fixed list of commands, then quits
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: VecDeque<Commands>,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = Commands>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// `ticks` repetitions of the same held input
    pub fn hold(input: TickInput, ticks: usize) -> Self {
        Self::new(std::iter::repeat_n(
            Commands {
                tick: input,
                quit: false,
            },
            ticks,
        ))
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, _world: &World) -> Commands {
        self.script.pop_front().unwrap_or(Commands {
            tick: TickInput::default(),
            quit: true,
        })
    }
}
