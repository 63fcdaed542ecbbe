pub use crate::audio::{SampleBuffer, SampleId};
use crate::shared::Track;

// One hit, committed to a track's voice pool at an absolute device-clock
// time. `start` may be at or after now; the voice waits silently until then.
#[derive(Clone, Debug)]
pub struct ScheduleParams {
    pub track: Track,
    pub sample_id: SampleId,
    pub start: f64, // seconds on the device clock
    pub gain: f32,
}

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't load files (would stall the callback), so buffers are
    // decoded on the control thread (see sample_loader.rs) and registered
    // here by id before anything references them.
    RegisterSample { id: SampleId, buffer: SampleBuffer },

    // The sequencer's output: play this sample on this track at this time.
    Schedule(ScheduleParams),
}
