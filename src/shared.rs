// Shared vocabulary between the sequencer, the audio engine, and the TUI.
//
// The rendering contract: the middle layer owns all sequencer and project
// state, and the TUI just draws whatever `middle.display_state()` hands it
// each frame (track rows, playhead, cursor, tempo readout) and turns key
// presses into InputEvents for the middle layer to interpret.

pub const LOOP_LENGTH: usize = 64;
pub const NUM_TRACKS: usize = 3;
pub const NUM_SOUNDS: usize = 16;

// ye olde types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Track {
    Melody,
    Drums,
    Bass,
}

impl Track {
    // Dispatch order is fixed: events for the same step always go out
    // melody, then drums, then bass.
    pub const ALL: [Track; NUM_TRACKS] = [Track::Melody, Track::Drums, Track::Bass];

    pub fn index(self) -> usize {
        match self {
            Track::Melody => 0,
            Track::Drums => 1,
            Track::Bass => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Track::Melody => "MELODY",
            Track::Drums => "DRUMS",
            Track::Bass => "BASS",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Track::Melody => Track::Drums,
            Track::Drums => Track::Bass,
            Track::Bass => Track::Melody,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Track::Melody => Track::Bass,
            Track::Drums => Track::Melody,
            Track::Bass => Track::Drums,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    // "play/stop" button (space)
    PlayPress,

    // step cursor on the 64-step row
    StepLeft,
    StepRight,

    // which of the three tracks the cursor is on
    NextTrack,
    PrevTrack,
    SelectTrack(Track),

    // toggle the cursor slot between empty and the selected sound
    ToggleStep,

    // cycle through the 16 sound slots
    NextSound,
    PrevSound,

    // tempo edits; stored immediately, heard on the next play
    BpmDelta(i32),
    SubdivDelta(i32),

    // quit button (esc)
    Quit,
}

// One frame's worth of everything the TUI needs to draw.
#[derive(Clone, Debug)]
pub struct DisplayState {
    pub playing: bool,
    pub current_step: usize,
    pub cursor: usize,
    pub selected_track: Track,
    pub selected_sound: u8,
    pub bpm: u32,
    pub subdivisions_per_beat: u32,
    // true = slot occupied; indexed [track][step]
    pub rows: [[bool; LOOP_LENGTH]; NUM_TRACKS],
    pub sound_names: Vec<String>,
}
