//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::settings::{QualityPreset, Settings};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "sonic-raid")]
#[command(about = "Arcade shooter that gets harder the louder the room is", long_about = None)]
pub struct Args {
    /// Settings file (JSON); missing file means defaults
    #[arg(long, value_name = "PATH", default_value = "sonic-raid.json")]
    pub config: PathBuf,

    /// Fixed RNG seed for a reproducible run
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Skip microphone capture (game stays at minimum intensity)
    #[arg(long)]
    pub no_audio: bool,

    /// Input device name (system default otherwise)
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// Quality preset
    #[arg(long, value_enum, value_name = "PRESET", ignore_case = true)]
    pub quality: Option<QualityPreset>,

    /// Where the high score is kept
    #[arg(long, value_name = "PATH")]
    pub high_score_file: Option<PathBuf>,

    /// Stop after this many seconds (0 runs until quit)
    #[arg(long, value_name = "SECS", default_value = "0")]
    pub seconds: f64,
}

impl Args {
    /// Override file settings with whatever was given on the command line
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        if self.no_audio {
            settings.audio_enabled = false;
        }
        if let Some(device) = &self.device {
            settings.input_device = Some(device.clone());
        }
        if let Some(preset) = self.quality {
            settings.quality = preset;
        }
        if let Some(path) = &self.high_score_file {
            settings.high_score_path = path.clone();
        }
    }

    /// Run length, `None` for unlimited
    pub fn run_limit_ms(&self) -> Option<u64> {
        (self.seconds > 0.0).then(|| (self.seconds * 1000.0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let args = Args::parse_from([
            "sonic-raid",
            "--seed",
            "42",
            "--no-audio",
            "--device",
            "USB Mic",
            "--quality",
            "high",
            "--high-score-file",
            "/tmp/hs.json",
        ]);
        let mut settings = Settings::default();
        args.apply(&mut settings);
        assert_eq!(settings.seed, Some(42));
        assert!(!settings.audio_enabled);
        assert_eq!(settings.input_device.as_deref(), Some("USB Mic"));
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.high_score_path, PathBuf::from("/tmp/hs.json"));
    }

    #[test]
    fn test_no_flags_keep_file_values() {
        let args = Args::parse_from(["sonic-raid"]);
        let mut settings = Settings::from_preset(QualityPreset::Low);
        settings.seed = Some(3);
        let before = settings.clone();
        args.apply(&mut settings);
        assert_eq!(settings, before);
        assert_eq!(args.run_limit_ms(), None);
    }

    #[test]
    fn test_unknown_quality_is_rejected() {
        assert!(Args::try_parse_from(["sonic-raid", "--quality", "ultra"]).is_err());
    }

    #[test]
    fn test_quality_alias_and_case() {
        let args = Args::parse_from(["sonic-raid", "--quality", "MED", "--seconds", "2.5"]);
        let mut settings = Settings::from_preset(QualityPreset::Low);
        args.apply(&mut settings);
        assert_eq!(settings.quality, QualityPreset::Medium);
        assert_eq!(args.run_limit_ms(), Some(2_500));

        let args = Args::parse_from(["sonic-raid", "--quality", "Low"]);
        assert_eq!(args.quality, Some(QualityPreset::Low));
    }
}
