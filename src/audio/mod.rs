use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use crate::audio_api::AudioCommand;

mod clock;
mod engine;
mod frame;
mod pool;
mod sample_buffer;
mod sample_id;
mod voice;

pub use clock::DeviceClock;
pub use frame::StereoFrame;
pub use sample_buffer::SampleBuffer;
pub use sample_id::{SampleId, next_sample_id};

use engine::Engine;

pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    clock: DeviceClock,
    sample_rate: u32,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        let _ = self.tx.try_send(cmd);
    }

    // Read-only handle on the output clock; this is "now" for the sequencer.
    pub fn clock(&self) -> DeviceClock {
        self.clock.clone()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

pub fn start_audio(polyphony: usize) -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;
    if channels != 2 {
        // the callback views the f32 buffer as StereoFrames, so interleaved
        // stereo is a hard requirement
        anyhow::bail!("unsupported channel count {channels} (stereo output required)");
    }
    let clock = DeviceClock::new(sample_rate);

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream = build_output_stream_f32(
                &device, &config.into(), rx, polyphony, clock.clone(), channels,
            )?;
            output_stream.play().context("failed to play output stream")?;

            Ok(AudioHandle {
                tx,
                clock,
                sample_rate,
                _output_stream: output_stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
    }
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    polyphony: usize,
    clock: DeviceClock,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new(polyphony, clock);

    let err_fn = |err| eprintln!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() { // drain pending commands first
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels;
            let frames: &mut [StereoFrame] = unsafe { // casting raw floats to StereoFrames
                std::slice::from_raw_parts_mut(data.as_mut_ptr() as *mut StereoFrame, n_frames)
            };
            engine.render_block(frames);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
