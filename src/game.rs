//! Fixed-rate game loop
//!
//! Owns the world and every collaborator. Each tick reads input, polls the
//! analyzer once, runs the simulation, persists a new best score and hands the
//! frame to the renderer. The simulation clock is tick-based, so a run is
//! reproducible from its seed and inputs regardless of wall-clock jitter.

use std::time::{Duration, Instant};

use crate::audio::AudioAnalyzer;
use crate::consts::{MAX_SUBSTEPS, tick_interval_ms};
use crate::highscores::ScoreStore;
use crate::input::InputSource;
use crate::render::{FrameState, Renderer};
use crate::settings::Settings;
use crate::sim::{GameEvent, World, tick};

/// Longest wall-clock gap fed into the accumulator per frame
const MAX_FRAME_MS: f64 = 100.0;

pub struct GameLoop<R: Renderer, I: InputSource> {
    world: World,
    analyzer: AudioAnalyzer,
    store: Box<dyn ScoreStore>,
    renderer: R,
    input: I,
    tick_ms: f64,
    accumulator_ms: f64,
    ticks: u64,
    quit: bool,
    /// Stop once the simulation clock reaches this
    run_limit_ms: Option<u64>,
}

impl<R: Renderer, I: InputSource> GameLoop<R, I> {
    pub fn new(
        settings: &Settings,
        analyzer: AudioAnalyzer,
        store: Box<dyn ScoreStore>,
        renderer: R,
        input: I,
    ) -> Self {
        let high_score = store.load_high_score();
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Seed {} (high score {})", seed, high_score);

        Self {
            world: World::with_settings(seed, high_score, settings),
            analyzer,
            store,
            renderer,
            input,
            tick_ms: tick_interval_ms(settings.tick_rate_hz),
            accumulator_ms: 0.0,
            ticks: 0,
            quit: false,
            run_limit_ms: None,
        }
    }

    pub fn with_run_limit(mut self, limit_ms: Option<u64>) -> Self {
        self.run_limit_ms = limit_ms;
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulation time of the next tick
    fn clock_ms(&self) -> u64 {
        ((self.ticks + 1) as f64 * self.tick_ms) as u64
    }

    pub fn is_finished(&self) -> bool {
        self.quit
            || self
                .run_limit_ms
                .is_some_and(|limit| (self.ticks as f64 * self.tick_ms) as u64 >= limit)
    }

    /// Run one tick. Returns false once the loop should stop.
    pub fn step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }

        let commands = self.input.poll(&self.world);
        if commands.quit {
            log::info!("Quit requested");
            self.quit = true;
            return false;
        }

        let audio = self.analyzer.poll_state();
        let now_ms = self.clock_ms();
        tick(&mut self.world, &commands.tick, audio, now_ms);
        self.ticks += 1;

        self.handle_events();

        let frame = FrameState::capture(&self.world);
        self.renderer.draw(&frame);
        true
    }

    fn handle_events(&mut self) {
        for event in &self.world.events {
            match event {
                GameEvent::NewHighScore { score } => {
                    self.store.save_high_score(*score);
                }
                GameEvent::EnemyDestroyed { kind, points, .. } => {
                    log::debug!("{:?} destroyed (+{})", kind, points);
                }
                GameEvent::PowerUpCollected { kind } => {
                    log::debug!("Collected {}", kind.as_str());
                }
                GameEvent::PowerUpExpired { kind } => {
                    log::debug!("{} expired", kind.as_str());
                }
                GameEvent::PlayerHit { damage } => {
                    log::debug!("Hit for {} (hp {})", damage, self.world.state.health);
                }
                GameEvent::PowerUpDropped { .. }
                | GameEvent::GameOver { .. }
                | GameEvent::Restarted => {}
            }
        }
    }

    /// Feed elapsed wall-clock time and run however many ticks are due.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        self.accumulator_ms += elapsed_ms.clamp(0.0, MAX_FRAME_MS);

        let mut substeps = 0;
        while self.accumulator_ms >= self.tick_ms && substeps < MAX_SUBSTEPS {
            if !self.step() {
                break;
            }
            self.accumulator_ms -= self.tick_ms;
            substeps += 1;
        }

        // Drop backlog we could not catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator_ms = self.accumulator_ms.min(self.tick_ms);
        }
        substeps
    }

    /// Run `n` ticks back to back without pacing
    pub fn run_ticks(&mut self, n: u64) -> u64 {
        let mut ran = 0;
        while ran < n && self.step() {
            ran += 1;
        }
        ran
    }

    /// Paced loop until quit or the run limit, then shut down
    pub fn run(&mut self) {
        log::info!("Game loop started ({:.2} ms per tick)", self.tick_ms);
        let mut last = Instant::now();

        while !self.is_finished() {
            let now = Instant::now();
            let elapsed = now.duration_since(last).as_secs_f64() * 1000.0;
            last = now;
            self.advance(elapsed);

            let wait_ms = (self.tick_ms - self.accumulator_ms).max(0.0);
            std::thread::sleep(Duration::from_secs_f64(wait_ms / 1000.0));
        }

        self.shutdown();
    }

    /// Stop audio capture and log the final state. Safe to call twice.
    pub fn shutdown(&mut self) {
        self.analyzer.shutdown();
        log::info!(
            "Game loop stopped after {} ticks (score {}, high score {})",
            self.ticks,
            self.world.state.score,
            self.world.state.high_score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Intensity;
    use crate::highscores::MemoryScoreStore;
    use crate::input::{Commands, ScriptedInput};
    use crate::render::HeadlessRenderer;
    use crate::sim::{Enemy, EnemyKind, GamePhase, TickInput};
    use glam::Vec2;

    fn settings() -> Settings {
        Settings {
            seed: Some(11),
            audio_enabled: false,
            ..Settings::default()
        }
    }

    fn game(
        store: &MemoryScoreStore,
        input: ScriptedInput,
    ) -> GameLoop<HeadlessRenderer, ScriptedInput> {
        GameLoop::new(
            &settings(),
            AudioAnalyzer::disabled(),
            Box::new(store.clone()),
            HeadlessRenderer::new(),
            input,
        )
    }

    fn fire() -> TickInput {
        TickInput {
            fire: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_loads_high_score_from_store() {
        let store = MemoryScoreStore::new(777);
        let game = game(&store, ScriptedInput::default());
        assert_eq!(game.world().state.high_score, 777);
        assert_eq!(game.world().seed, 11);
    }

    #[test]
    fn test_new_best_is_saved() {
        let store = MemoryScoreStore::new(0);
        let mut game = game(&store, ScriptedInput::hold(fire(), 30));
        game.world_mut()
            .enemies
            .insert(Enemy::new(EnemyKind::Basic, Vec2::new(400.0, 400.0)));

        game.run_ticks(30);
        assert_eq!(game.world().state.score, 10);
        assert_eq!(store.load_high_score(), 10);
    }

    #[test]
    fn test_live_analyzer_drives_intensity_and_score() {
        let analyzer = AudioAnalyzer::spawn_with(|tx, _fault| {
            tx.send(vec![0.5; 256]).ok();
            Ok(())
        });
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while analyzer.poll_state().intensity != Intensity::Intense
            && std::time::Instant::now() < deadline
        {
            std::thread::sleep(Duration::from_millis(5));
        }

        let store = MemoryScoreStore::new(0);
        let mut game = GameLoop::new(
            &settings(),
            analyzer,
            Box::new(store.clone()),
            HeadlessRenderer::new(),
            ScriptedInput::hold(fire(), 30),
        );
        game.world_mut()
            .enemies
            .insert(Enemy::new(EnemyKind::Basic, Vec2::new(400.0, 400.0)));

        game.run_ticks(30);
        assert_eq!(game.world().audio.intensity, Intensity::Intense);
        assert_eq!(game.world().state.multiplier, 2.0);
        assert_eq!(game.world().state.score, 20);
        assert_eq!(store.load_high_score(), 20);
        game.shutdown();
    }

    #[test]
    fn test_every_tick_is_drawn_and_script_end_quits() {
        let store = MemoryScoreStore::new(0);
        let mut game = game(&store, ScriptedInput::hold(TickInput::default(), 10));
        assert_eq!(game.run_ticks(100), 10);
        assert!(game.is_finished());
        assert_eq!(game.renderer().frames, 10);
        assert!(!game.step());
        game.shutdown();
        game.shutdown();
    }

    #[test]
    fn test_clock_advances_per_tick() {
        let store = MemoryScoreStore::new(0);
        let mut game = game(&store, ScriptedInput::hold(TickInput::default(), 60));
        game.run_ticks(60);
        assert_eq!(game.world().now_ms, 1000);
        assert_eq!(game.world().time_ticks, 60);
    }

    #[test]
    fn test_run_limit_stops_loop() {
        let store = MemoryScoreStore::new(0);
        let mut game =
            game(&store, ScriptedInput::hold(TickInput::default(), 1_000)).with_run_limit(Some(500));
        let ran = game.run_ticks(1_000);
        assert_eq!(ran, 30);
        assert!(game.is_finished());
    }

    #[test]
    fn test_advance_caps_substeps() {
        let store = MemoryScoreStore::new(0);
        let mut game = game(&store, ScriptedInput::hold(TickInput::default(), 1_000));
        assert_eq!(game.advance(10.0), 0);
        assert_eq!(game.advance(10.0), 1);
        assert_eq!(game.advance(5_000.0), MAX_SUBSTEPS);
        assert!(game.advance(0.0) <= 1);
    }

    #[test]
    fn test_game_over_and_restart_through_loop() {
        let store = MemoryScoreStore::new(0);
        let mut script = vec![
            Commands {
                tick: TickInput::default(),
                quit: false,
            };
            4
        ];
        script.push(Commands {
            tick: TickInput {
                restart: true,
                ..Default::default()
            },
            quit: false,
        });
        let mut game = game(&store, ScriptedInput::new(script));

        for _ in 0..4 {
            let at = game.world().player.bounds.center;
            game.world_mut()
                .enemies
                .insert(Enemy::new(EnemyKind::Boss, at));
            game.step();
        }
        assert_eq!(game.world().phase, GamePhase::GameOver);

        game.step();
        assert_eq!(game.world().phase, GamePhase::Playing);
        assert_eq!(game.world().state.health, game.world().state.max_health);
        assert_eq!(game.world().audio.intensity, Intensity::Void);
    }
}
