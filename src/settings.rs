//! Game settings and preferences
//!
//! Read from an optional JSON file; every field has a default so a partial
//! file is fine. Command-line flags are applied on top by `cli`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::TICK_RATE_HZ;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    #[value(alias = "med")]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 1500,
        }
    }

    /// Stars per parallax layer, far to near
    pub fn star_counts(&self) -> [usize; 3] {
        match self {
            QualityPreset::Low => [25, 15, 10],
            QualityPreset::Medium => [50, 30, 20],
            QualityPreset::High => [100, 60, 40],
        }
    }

    pub fn nebula_count(&self) -> usize {
        match self {
            QualityPreset::Low => 1,
            QualityPreset::Medium => 3,
            QualityPreset::High => 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Particle effects (explosions, sparks, engine fire)
    pub particles: bool,
    /// Star layers, nebulas and supernovas
    pub starfield: bool,

    // === Simulation ===
    pub tick_rate_hz: u32,
    /// Fixed RNG seed; random per run when absent
    pub seed: Option<u64>,

    // === Audio ===
    /// Capture from the microphone at all
    pub audio_enabled: bool,
    /// Input device name; system default when absent
    pub input_device: Option<String>,

    // === Storage ===
    pub high_score_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            particles: true,
            starfield: true,

            tick_rate_hz: TICK_RATE_HZ,
            seed: None,

            audio_enabled: true,
            input_device: None,

            high_score_path: PathBuf::from("highscore.json"),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Parse a settings file. A missing file is an error here; see `load`.
    pub fn read(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings, falling back to defaults when the file is absent or bad
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
