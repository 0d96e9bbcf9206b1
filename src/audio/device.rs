//! cpal input stream setup

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};

use super::analyzer::{BlockSender, DeviceFault};
use super::{AudioError, BlockAssembler};
use crate::consts::SAMPLE_RATE_HZ;

/// Which input device to capture from
#[derive(Debug, Clone, Default)]
pub struct DeviceOptions {
    /// Device name; `None` picks the host default
    pub device_name: Option<String>,
}

/// Open and start an input stream that feeds mono blocks into `tx`.
///
/// The returned stream must stay alive for capture to continue.
pub fn open_input_stream(
    options: &DeviceOptions,
    tx: BlockSender,
    fault: DeviceFault,
) -> Result<cpal::Stream, AudioError> {
    let host = cpal::default_host();
    let device = match &options.device_name {
        Some(name) => host
            .input_devices()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?
            .find(|d| d.name().map(|n| n == *name).unwrap_or(false))
            .ok_or_else(|| AudioError::DeviceNotFound(name.clone()))?,
        None => host
            .default_input_device()
            .ok_or(AudioError::NoInputDevice)?,
    };

    let supported = preferred_config(&device)?;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    log::info!(
        "Audio input: {} @ {}Hz, {} channel(s), {:?}",
        device.name().unwrap_or_else(|_| "Unknown".to_string()),
        config.sample_rate.0,
        config.channels,
        sample_format
    );

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, tx, fault),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, tx, fault),
        SampleFormat::I32 => build_stream::<i32>(&device, &config, tx, fault),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, tx, fault),
        other => Err(AudioError::DeviceConfig(format!(
            "unsupported sample format {:?}",
            other
        ))),
    }?;

    stream
        .play()
        .map_err(|e| AudioError::PlayStream(e.to_string()))?;

    Ok(stream)
}

/// Mono at the capture rate when the device offers it, otherwise its default
fn preferred_config(device: &cpal::Device) -> Result<cpal::SupportedStreamConfig, AudioError> {
    let target = cpal::SampleRate(SAMPLE_RATE_HZ);
    if let Ok(mut ranges) = device.supported_input_configs() {
        let mono = ranges.find(|r| {
            r.channels() == 1 && r.min_sample_rate() <= target && r.max_sample_rate() >= target
        });
        if let Some(range) = mono {
            return Ok(range.with_sample_rate(target));
        }
    }
    device
        .default_input_config()
        .map_err(|e| AudioError::DeviceConfig(e.to_string()))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    tx: BlockSender,
    fault: DeviceFault,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let mut assembler = BlockAssembler::new(config.channels);
    let mut scratch: Vec<f32> = Vec::new();

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                scratch.clear();
                scratch.extend(data.iter().map(|&s| s.to_sample::<f32>()));
                // A full queue drops the block; the analyzer only wants the latest
                assembler.push_interleaved(&scratch, |block| {
                    let _ = tx.try_send(block);
                });
            },
            move |err| fault.report(&err),
            None,
        )
        .map_err(|e| AudioError::BuildStream(e.to_string()))
}
