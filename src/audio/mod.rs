//! Microphone analysis
//!
//! A capture thread turns fixed-size mono blocks into an RMS volume and a coarse
//! intensity tier. The game loop polls the latest result once per tick.

mod analyzer;
mod device;

pub use analyzer::{AudioAnalyzer, BlockSender, DeviceFault};
pub use device::{DeviceOptions, open_input_stream};

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{BLOCK_SIZE, INTENSE_THRESHOLD, VOID_THRESHOLD};

/// Coarse loudness classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Intensity {
    #[default]
    Void,
    Ambient,
    Intense,
}

impl Intensity {
    /// Score multiplier awarded while in this tier
    pub fn multiplier(self) -> f32 {
        match self {
            Intensity::Void => 1.0,
            Intensity::Ambient => 1.5,
            Intensity::Intense => 2.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::Void => "void",
            Intensity::Ambient => "ambient",
            Intensity::Intense => "intense",
        }
    }
}

/// Classify an RMS volume. Thresholds are fixed and there is no hysteresis.
pub fn classify(volume: f32) -> Intensity {
    if volume < VOID_THRESHOLD {
        Intensity::Void
    } else if volume < INTENSE_THRESHOLD {
        Intensity::Ambient
    } else {
        Intensity::Intense
    }
}

/// Root-mean-square amplitude of a block (0 for an empty block)
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

/// Immutable result of one analysis, copied out by the game loop
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioSnapshot {
    pub volume: f32,
    pub intensity: Intensity,
}

impl AudioSnapshot {
    /// Build a snapshot from a volume; the tier is derived, never stored separately
    pub fn from_volume(volume: f32) -> Self {
        let volume = if volume.is_finite() { volume.max(0.0) } else { 0.0 };
        Self {
            volume,
            intensity: classify(volume),
        }
    }

    /// Analyze one block of mono samples
    pub fn from_block(samples: &[f32]) -> Self {
        Self::from_volume(rms(samples))
    }
}

/// Single-writer, many-reader slot holding the latest snapshot.
///
/// The snapshot is a pure function of its volume, so storing the volume's bits
/// in one atomic word publishes the whole snapshot without tearing.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSlot {
    volume_bits: Arc<AtomicU32>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, snapshot: AudioSnapshot) {
        self.volume_bits
            .store(snapshot.volume.to_bits(), Ordering::Release);
    }

    pub fn load(&self) -> AudioSnapshot {
        AudioSnapshot::from_volume(f32::from_bits(self.volume_bits.load(Ordering::Acquire)))
    }

    /// Return to the silent default
    pub fn clear(&self) {
        self.store(AudioSnapshot::default());
    }
}

/// Collects interleaved device frames into fixed-size mono blocks
#[derive(Debug)]
pub struct BlockAssembler {
    channels: usize,
    block_size: usize,
    pending: Vec<f32>,
}

impl BlockAssembler {
    pub fn new(channels: u16) -> Self {
        Self::with_block_size(channels, BLOCK_SIZE)
    }

    pub fn with_block_size(channels: u16, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            channels: channels.max(1) as usize,
            block_size,
            pending: Vec::with_capacity(block_size),
        }
    }

    /// Downmix interleaved frames and hand every completed block to `emit`.
    /// A trailing partial frame is ignored.
    pub fn push_interleaved<F: FnMut(Vec<f32>)>(&mut self, data: &[f32], mut emit: F) {
        for frame in data.chunks_exact(self.channels) {
            let mono = frame.iter().sum::<f32>() / self.channels as f32;
            self.pending.push(mono);
            if self.pending.len() == self.block_size {
                let block = std::mem::replace(&mut self.pending, Vec::with_capacity(self.block_size));
                emit(block);
            }
        }
    }

    /// Samples waiting for the current block to fill
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Failures opening or running the input device
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio input device available")]
    NoInputDevice,
    #[error("input device '{0}' not found")]
    DeviceNotFound(String),
    #[error("failed to query input config: {0}")]
    DeviceConfig(String),
    #[error("failed to build input stream: {0}")]
    BuildStream(String),
    #[error("failed to start input stream: {0}")]
    PlayStream(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0.0), Intensity::Void);
        assert_eq!(classify(0.019_999), Intensity::Void);
        assert_eq!(classify(0.02), Intensity::Ambient);
        assert_eq!(classify(0.099_999), Intensity::Ambient);
        assert_eq!(classify(0.10), Intensity::Intense);
        assert_eq!(classify(3.0), Intensity::Intense);
    }

    #[test]
    fn test_rms() {
        assert_eq!(rms(&[]), 0.0);
        assert!((rms(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
        assert!((rms(&[1.0, 0.0]) - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_snapshot_default_is_silent() {
        let snap = AudioSnapshot::default();
        assert_eq!(snap.volume, 0.0);
        assert_eq!(snap.intensity, Intensity::Void);
    }

    #[test]
    fn test_from_volume_rejects_nan() {
        let snap = AudioSnapshot::from_volume(f32::NAN);
        assert_eq!(snap, AudioSnapshot::default());
    }

    #[test]
    fn test_slot_shares_latest_value() {
        let slot = SnapshotSlot::new();
        let reader = slot.clone();
        assert_eq!(reader.load(), AudioSnapshot::default());

        slot.store(AudioSnapshot::from_volume(0.05));
        slot.store(AudioSnapshot::from_volume(0.2));
        let snap = reader.load();
        assert_eq!(snap.intensity, Intensity::Intense);
        assert!((snap.volume - 0.2).abs() < 1e-6);

        slot.clear();
        assert_eq!(reader.load().intensity, Intensity::Void);
    }

    #[test]
    fn test_assembler_downmixes_and_splits() {
        let mut asm = BlockAssembler::with_block_size(2, 3);
        let mut blocks = Vec::new();
        // 4 stereo frames -> one full block of 3, one pending
        asm.push_interleaved(&[1.0, 0.0, 0.5, 0.5, -1.0, -1.0, 0.2, 0.2], |b| blocks.push(b));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0], vec![0.5, 0.5, -1.0]);
        assert_eq!(asm.pending_len(), 1);

        asm.push_interleaved(&[0.0, 0.0, 0.0, 0.0], |b| blocks.push(b));
        assert_eq!(blocks.len(), 2);
        assert_eq!(asm.pending_len(), 0);
    }

    proptest! {
        #[test]
        fn prop_classify_matches_thresholds(v in 0.0f32..2.0) {
            let tier = classify(v);
            prop_assert_eq!(tier == Intensity::Void, v < 0.02);
            prop_assert_eq!(tier == Intensity::Ambient, (0.02..0.10).contains(&v));
            prop_assert_eq!(tier == Intensity::Intense, v >= 0.10);
        }

        #[test]
        fn prop_constant_block_rms_is_magnitude(a in -1.0f32..1.0, n in 1usize..512) {
            let block = vec![a; n];
            prop_assert!((rms(&block) - a.abs()).abs() < 1e-4);
        }
    }
}
