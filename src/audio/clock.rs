use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// The device clock: how many frames the output stream has rendered so far.
// The audio callback publishes it after every block; the control thread reads
// it back as seconds. Monotonic, never reset, and nobody but the engine
// writes to it.
//
// `now()` is quantized to block boundaries, so it can lag real output by up
// to one callback's worth of frames; the sequencer's lookahead window is
// sized well above that.
#[derive(Clone)]
pub struct DeviceClock {
    frames: Arc<AtomicU64>,
    sample_rate: f64,
}

impl DeviceClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate as f64,
        }
    }

    // Seconds of audio rendered since the stream started.
    pub fn now(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    // Absolute seconds -> absolute frame index on this clock.
    pub fn secs_to_frame(&self, secs: f64) -> u64 {
        (secs.max(0.0) * self.sample_rate).round() as u64
    }

    pub(crate) fn publish(&self, frames: u64) {
        self.frames.store(frames, Ordering::Release);
    }
}
