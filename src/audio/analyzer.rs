//! Background capture thread and the polled snapshot it maintains

use std::fmt::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering, fence};
use std::sync::mpsc::{self, RecvTimeoutError, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::device::{DeviceOptions, open_input_stream};
use super::{AudioError, AudioSnapshot, SnapshotSlot};

/// Sending half handed to the device; full blocks are offered with `try_send`
pub type BlockSender = SyncSender<Vec<f32>>;

/// Blocks buffered between the device callback and the analysis loop
const BLOCK_QUEUE_DEPTH: usize = 4;

/// How often the capture loop rechecks the stop flag while idle
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Latched device failure. The first report is logged and resets the snapshot
/// to silence; later reports are ignored.
#[derive(Debug, Clone)]
pub struct DeviceFault {
    failed: Arc<AtomicBool>,
    slot: SnapshotSlot,
}

impl DeviceFault {
    fn new(slot: SnapshotSlot) -> Self {
        Self {
            failed: Arc::new(AtomicBool::new(false)),
            slot,
        }
    }

    pub fn report(&self, err: &dyn Display) {
        if !self.failed.swap(true, Ordering::SeqCst) {
            fence(Ordering::SeqCst);
            log::warn!("Audio input unavailable, continuing silent: {}", err);
            self.slot.clear();
        }
    }

    pub fn is_set(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    /// Store a fresh snapshot unless the device has failed. Returns whether
    /// it was kept.
    ///
    /// A report landing between the first check and the store is caught by
    /// the second check, so a failed device always ends at silence.
    pub fn publish(&self, snapshot: AudioSnapshot) -> bool {
        if self.is_set() {
            return false;
        }
        self.slot.store(snapshot);
        fence(Ordering::SeqCst);
        if self.is_set() {
            self.slot.clear();
            return false;
        }
        true
    }
}

/// Polled view of the microphone.
///
/// `poll_state` never blocks: it copies whatever the capture thread last
/// published, or the silent default before the first block.
pub struct AudioAnalyzer {
    slot: SnapshotSlot,
    fault: DeviceFault,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl AudioAnalyzer {
    /// Capture from a real input device
    pub fn start(options: DeviceOptions) -> Self {
        Self::spawn_with(move |tx, fault| open_input_stream(&options, tx, fault))
    }

    /// An analyzer with no capture; always reports silence
    pub fn disabled() -> Self {
        let slot = SnapshotSlot::new();
        Self {
            fault: DeviceFault::new(slot.clone()),
            slot,
            stop: Arc::new(AtomicBool::new(true)),
            worker: None,
        }
    }

    /// Run the capture thread around a custom block source.
    ///
    /// `open` runs on the capture thread and returns a guard (e.g. a live
    /// stream) that is dropped when capture stops. It pushes blocks through the
    /// sender; dropping every sender ends capture.
    pub fn spawn_with<F, G>(open: F) -> Self
    where
        F: FnOnce(BlockSender, DeviceFault) -> Result<G, AudioError> + Send + 'static,
    {
        let slot = SnapshotSlot::new();
        let fault = DeviceFault::new(slot.clone());
        let stop = Arc::new(AtomicBool::new(false));

        let thread_fault = fault.clone();
        let thread_stop = Arc::clone(&stop);

        let spawned = thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || capture_loop(open, thread_fault, thread_stop));

        let worker = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                fault.report(&e);
                None
            }
        };

        Self {
            slot,
            fault,
            stop,
            worker,
        }
    }

    /// Latest snapshot (non-blocking)
    pub fn poll_state(&self) -> AudioSnapshot {
        self.slot.load()
    }

    /// Whether the device failed and capture degraded to silence
    pub fn is_degraded(&self) -> bool {
        self.fault.is_set()
    }

    /// Stop capture and wait for the device to be released. Safe to call twice.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("Audio capture thread panicked");
            }
            log::info!("Audio analyzer shut down");
        }
    }
}

impl Drop for AudioAnalyzer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn capture_loop<F, G>(open: F, fault: DeviceFault, stop: Arc<AtomicBool>)
where
    F: FnOnce(BlockSender, DeviceFault) -> Result<G, AudioError>,
{
    let (tx, rx) = mpsc::sync_channel::<Vec<f32>>(BLOCK_QUEUE_DEPTH);

    let guard = match open(tx, fault.clone()) {
        Ok(guard) => guard,
        Err(e) => {
            fault.report(&e);
            return;
        }
    };

    let mut blocks: u64 = 0;
    while !stop.load(Ordering::Acquire) {
        match rx.recv_timeout(STOP_POLL_INTERVAL) {
            Ok(block) => {
                // Only the newest queued block matters
                let mut latest = block;
                while let Ok(next) = rx.try_recv() {
                    latest = next;
                }
                if fault.publish(AudioSnapshot::from_block(&latest)) {
                    blocks += 1;
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    drop(guard);
    log::debug!("Audio capture loop exited after {} blocks", blocks);
}
