// the structs middle.rs finangles: everything configurable, all serde

use serde::{Deserialize, Serialize};

use crate::audio::SampleId;
use crate::sequencer::{Sequencer, StepSound, TempoConfig, TrackSet};
use crate::shared::{LOOP_LENGTH, NUM_SOUNDS, Track};

pub const DEFAULT_POLYPHONY: usize = 12;
pub const MAX_POLYPHONY: usize = 64;

// One of 16 sound slots a pattern step can reference.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SoundSlot {
    pub sample_path: String,

    // Runtime only; ids from a previous run are garbage, never restore them.
    #[serde(skip)]
    pub sample_id: Option<SampleId>,

    pub gain: f32,
}

impl Default for SoundSlot {
    fn default() -> Self {
        Self {
            sample_path: String::new(),
            sample_id: None,
            gain: 0.8,
        }
    }
}

impl SoundSlot {
    pub fn is_loaded(&self) -> bool {
        self.sample_id.is_some()
    }

    pub fn display_name(&self) -> String {
        std::path::Path::new(&self.sample_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("----")
            .to_string()
    }
}

// The three 64-step rows. Slots reference sound-slot indices; the json may
// come back with any shape, so a wrong-length row is replaced wholesale by an
// empty one at load time (see normalize).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternData {
    pub melody: Vec<Option<u8>>,
    pub drums: Vec<Option<u8>>,
    pub bass: Vec<Option<u8>>,
}

impl Default for PatternData {
    fn default() -> Self {
        Self {
            melody: vec![None; LOOP_LENGTH],
            drums: vec![None; LOOP_LENGTH],
            bass: vec![None; LOOP_LENGTH],
        }
    }
}

impl PatternData {
    pub fn track(&self, track: Track) -> &[Option<u8>] {
        match track {
            Track::Melody => &self.melody,
            Track::Drums => &self.drums,
            Track::Bass => &self.bass,
        }
    }

    pub fn track_mut(&mut self, track: Track) -> &mut Vec<Option<u8>> {
        match track {
            Track::Melody => &mut self.melody,
            Track::Drums => &mut self.drums,
            Track::Bass => &mut self.bass,
        }
    }

    fn normalize(&mut self) {
        for track in Track::ALL {
            let row = self.track_mut(track);
            if row.len() != LOOP_LENGTH {
                *row = vec![None; LOOP_LENGTH];
                continue;
            }
            // dangling sound references are as good as empty
            for slot in row.iter_mut() {
                if slot.is_some_and(|i| i as usize >= NUM_SOUNDS) {
                    *slot = None;
                }
            }
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectState {
    pub bpm: u32,
    pub subdivisions_per_beat: u32,
    pub lookahead: f64,
    pub polyphony: usize,
    pub auto_play: bool,
    pub sounds: Vec<SoundSlot>,
    pub pattern: PatternData,
}

impl Default for ProjectState {
    fn default() -> Self {
        Self {
            bpm: 120,
            subdivisions_per_beat: 4,
            lookahead: Sequencer::DEFAULT_LOOKAHEAD,
            polyphony: DEFAULT_POLYPHONY,
            auto_play: true,
            sounds: std::iter::repeat_with(SoundSlot::default)
                .take(NUM_SOUNDS)
                .collect(),
            pattern: PatternData::default(),
        }
    }
}

impl ProjectState {
    // Load-time repair: clamp every numeric field into its valid range and
    // fix pattern shape. Idempotent, and once it has run nothing downstream
    // needs an error path for bad config.
    pub fn normalize(&mut self) {
        let tempo = TempoConfig::new(self.bpm, self.subdivisions_per_beat);
        self.bpm = tempo.bpm();
        self.subdivisions_per_beat = tempo.subdivisions_per_beat();
        self.lookahead = self
            .lookahead
            .clamp(Sequencer::MIN_LOOKAHEAD, Sequencer::MAX_LOOKAHEAD);
        self.polyphony = self.polyphony.clamp(1, MAX_POLYPHONY);
        self.sounds.resize_with(NUM_SOUNDS, SoundSlot::default);
        for slot in self.sounds.iter_mut() {
            slot.gain = slot.gain.clamp(0.0, 1.0);
        }
        self.pattern.normalize();
    }

    pub fn tempo(&self) -> TempoConfig {
        TempoConfig::new(self.bpm, self.subdivisions_per_beat)
    }

    // Resolve slot indices into what the sequencer actually walks: sample
    // ids plus gain. Slots pointing at sounds that never loaded come out
    // empty, so an absent sample is a silent skip rather than a crash.
    pub fn resolve_tracks(&self) -> TrackSet {
        let mut tracks = TrackSet::empty();
        for track in Track::ALL {
            for (step, slot) in self.pattern.track(track).iter().enumerate() {
                let sound = slot
                    .map(|i| i as usize)
                    .and_then(|i| self.sounds.get(i))
                    .and_then(|s| {
                        s.sample_id.map(|sample_id| StepSound {
                            sample_id,
                            gain: s.gain,
                        })
                    });
                tracks.set(track, step, sound);
            }
        }
        tracks
    }
}
