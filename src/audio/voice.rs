use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;

// One playback slot. A voice sits silent until the output clock reaches its
// start frame, then plays its sample through exactly once. Rescheduling a
// voice that is still sounding cuts it off on the spot: no fade, no queue.
#[derive(Clone, Copy, Debug)]
pub struct Voice {
    sample_id: Option<SampleId>,
    start_frame: u64,
    pos: usize,
    gain: f32,
    active: bool,
}

impl Voice {
    pub fn idle() -> Self {
        Self {
            sample_id: None,
            start_frame: 0,
            pos: 0,
            gain: 1.0,
            active: false,
        }
    }

    // Stop whatever is in flight and arm this voice for a new playback.
    pub fn schedule(&mut self, sample_id: SampleId, start_frame: u64, gain: f32) {
        self.sample_id = Some(sample_id);
        self.start_frame = start_frame;
        self.pos = 0;
        self.gain = gain;
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn sample_id(&self) -> Option<SampleId> {
        self.sample_id
    }

    // Mix this voice into `out`, where out[0] is absolute frame `block_start`
    // on the device clock.
    pub fn render_into(&mut self, buffer: &SampleBuffer, block_start: u64, out: &mut [StereoFrame]) {
        if !self.active {
            return;
        }
        if buffer.data.is_empty() {
            self.active = false;
            return;
        }

        // still waiting for the start frame?
        let block_end = block_start + out.len() as u64;
        if self.start_frame >= block_end {
            return;
        }
        // a start frame in the past means we were scheduled late; begin now
        let begin = self.start_frame.saturating_sub(block_start) as usize;

        for frame in out[begin..].iter_mut() {
            match buffer.data.get(self.pos) {
                Some(s) => {
                    frame.left += s.left * self.gain;
                    frame.right += s.right * self.gain;
                    self.pos += 1;
                }
                None => {
                    self.active = false;
                    break;
                }
            }
        }
        if self.pos >= buffer.data.len() {
            self.active = false;
        }
    }
}
