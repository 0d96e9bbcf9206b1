//! Sonic Raid entry point
//!
//! Reads configuration, starts the microphone analyzer and runs the game loop
//! with the demo autopilot and the headless renderer.

use clap::Parser;

use sonic_raid::audio::{AudioAnalyzer, DeviceOptions};
use sonic_raid::cli::Args;
use sonic_raid::input::Autopilot;
use sonic_raid::render::HeadlessRenderer;
use sonic_raid::{GameLoop, JsonScoreStore, Settings};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut settings = Settings::load(&args.config);
    args.apply(&mut settings);
    log::info!(
        "Sonic Raid starting (quality {}, {} Hz)",
        settings.quality.as_str(),
        settings.tick_rate_hz
    );

    let analyzer = if settings.audio_enabled {
        AudioAnalyzer::start(DeviceOptions {
            device_name: settings.input_device.clone(),
        })
    } else {
        log::info!("Audio capture disabled");
        AudioAnalyzer::disabled()
    };

    let store = JsonScoreStore::new(settings.high_score_path.clone());
    log::info!("High score file: {}", store.path().display());

    let mut game = GameLoop::new(
        &settings,
        analyzer,
        Box::new(store),
        HeadlessRenderer::new(),
        Autopilot::new(),
    )
    .with_run_limit(args.run_limit_ms());
    game.run();
}
