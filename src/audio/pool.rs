use std::collections::HashMap;

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;
use super::voice::Voice;

// Fixed pool of voices for one instrument, rotated round-robin. The cursor
// advances on every schedule, wrapping; whoever sits at the cursor gets cut
// off and reused, which bounds polyphony at the pool size with zero
// allocation in the audio callback.
pub struct VoicePool {
    voices: Vec<Voice>,
    head: usize,
}

impl VoicePool {
    pub fn new(polyphony: usize) -> Self {
        let polyphony = polyphony.max(1);
        Self {
            voices: vec![Voice::idle(); polyphony],
            head: 0,
        }
    }

    pub fn schedule(&mut self, sample_id: SampleId, start_frame: u64, gain: f32) {
        let idx = self.head;
        self.head = (self.head + 1) % self.voices.len();
        let voice = &mut self.voices[idx];
        voice.schedule(sample_id, start_frame, gain);
    }

    pub fn render_into(
        &mut self,
        registry: &HashMap<SampleId, SampleBuffer>,
        block_start: u64,
        out: &mut [StereoFrame],
    ) {
        for voice in self.voices.iter_mut() {
            if !voice.is_active() {
                continue;
            }
            let Some(id) = voice.sample_id() else { continue };
            // buffer gone from the registry: skip silently, don't crash
            if let Some(buffer) = registry.get(&id) {
                voice.render_into(buffer, block_start, out);
            }
        }
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.voices.len()
    }
}
