use std::collections::HashMap;

use crate::audio_api::{AudioCommand, ScheduleParams};
use crate::shared::{NUM_TRACKS, Track};

use super::clock::DeviceClock;
use super::frame::StereoFrame;
use super::pool::VoicePool;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;

// Everything that runs inside the audio callback: pending commands are
// drained, then the voice pools render into the output block and the frame
// clock is published. One pool per track, so each instrument has its own
// polyphony budget.
pub struct Engine {
    registry: HashMap<SampleId, SampleBuffer>,
    pools: [VoicePool; NUM_TRACKS],
    frames_rendered: u64,
    clock: DeviceClock,
}

impl Engine {
    pub fn new(polyphony: usize, clock: DeviceClock) -> Self {
        Self {
            registry: HashMap::new(),
            pools: std::array::from_fn(|_| VoicePool::new(polyphony)),
            frames_rendered: 0,
            clock,
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                self.registry.insert(id, buffer);
            }
            AudioCommand::Schedule(params) => self.schedule(params),
        }
    }

    fn schedule(&mut self, params: ScheduleParams) {
        // nothing registered under this id: silent skip, not a failure
        if !self.registry.contains_key(&params.sample_id) {
            return;
        }
        let start_frame = self.clock.secs_to_frame(params.start);
        self.pools[params.track.index()].schedule(params.sample_id, start_frame, params.gain);
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        for pool in self.pools.iter_mut() {
            pool.render_into(&self.registry, self.frames_rendered, out);
        }
        self.frames_rendered += out.len() as u64;
        self.clock.publish(self.frames_rendered);
    }

    #[cfg(test)]
    pub fn active_voices(&self, track: Track) -> usize {
        self.pools[track.index()].active_count()
    }
}
