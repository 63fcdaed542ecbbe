// The middle layer: owns the project state and the sequencer, interprets
// input events from the TUI, and turns both edits and poll ticks into
// commands for the audio thread. The TUI itself never touches state; it
// draws display_state() and nothing else.

use std::path::Path;

use crate::audio_api::{AudioCommand, ScheduleParams};
use crate::loader::sample_loader;
use crate::pipeline::project::ProjectState;
use crate::sequencer::{Sequencer, TempoConfig};
use crate::shared::{DisplayState, InputEvent, LOOP_LENGTH, NUM_SOUNDS, NUM_TRACKS, Track};

pub struct Middle {
    pub state: ProjectState,
    sequencer: Sequencer,
    cursor: usize,
    selected_track: Track,
    selected_sound: u8,
}

impl Middle {
    pub fn with_state(mut state: ProjectState) -> Self {
        state.normalize();
        let mut sequencer = Sequencer::new(state.tempo(), state.lookahead);
        sequencer.set_tracks(state.resolve_tracks());
        Self {
            state,
            sequencer,
            cursor: 0,
            selected_track: Track::Melody,
            selected_sound: 0,
        }
    }

    pub fn auto_play(&self) -> bool {
        self.state.auto_play
    }

    pub fn play(&mut self, now: f64) {
        self.sequencer.play(now);
    }

    // One poll of the scheduler; `now` is the device clock in seconds.
    pub fn tick(&mut self, now: f64) -> Vec<AudioCommand> {
        self.sequencer.tick(now)
    }

    pub fn handle_input(&mut self, event: InputEvent, now: f64) -> Vec<AudioCommand> {
        match event {
            InputEvent::PlayPress => {
                if self.sequencer.is_playing() {
                    self.sequencer.stop();
                } else {
                    self.sequencer.play(now);
                }
                vec![]
            }

            InputEvent::StepLeft => {
                self.cursor = (self.cursor + LOOP_LENGTH - 1) % LOOP_LENGTH;
                vec![]
            }
            InputEvent::StepRight => {
                self.cursor = (self.cursor + 1) % LOOP_LENGTH;
                vec![]
            }

            InputEvent::NextTrack => {
                self.selected_track = self.selected_track.next();
                vec![]
            }
            InputEvent::PrevTrack => {
                self.selected_track = self.selected_track.prev();
                vec![]
            }
            InputEvent::SelectTrack(track) => {
                self.selected_track = track;
                vec![]
            }

            InputEvent::ToggleStep => self.toggle_step(now),

            InputEvent::NextSound => {
                self.selected_sound = (self.selected_sound + 1) % NUM_SOUNDS as u8;
                vec![]
            }
            InputEvent::PrevSound => {
                self.selected_sound =
                    (self.selected_sound + NUM_SOUNDS as u8 - 1) % NUM_SOUNDS as u8;
                vec![]
            }

            InputEvent::BpmDelta(delta) => {
                self.set_tempo(self.state.bpm.saturating_add_signed(delta), self.state.subdivisions_per_beat);
                vec![]
            }
            InputEvent::SubdivDelta(delta) => {
                self.set_tempo(self.state.bpm, self.state.subdivisions_per_beat.saturating_add_signed(delta));
                vec![]
            }

            InputEvent::Quit => vec![], // main saves and exits
        }
    }

    // Toggle the slot under the cursor. Turning a step on also auditions the
    // sound right away so editing is audible while stopped.
    fn toggle_step(&mut self, now: f64) -> Vec<AudioCommand> {
        let track = self.selected_track;
        let cursor = self.cursor;
        let row = self.state.pattern.track_mut(track);
        let turned_on = row[cursor].is_none();
        row[cursor] = if turned_on { Some(self.selected_sound) } else { None };
        self.sequencer.set_tracks(self.state.resolve_tracks());

        if !turned_on {
            return vec![];
        }
        let slot = &self.state.sounds[self.selected_sound as usize];
        match slot.sample_id {
            Some(sample_id) => vec![AudioCommand::Schedule(ScheduleParams {
                track,
                sample_id,
                start: now,
                gain: slot.gain,
            })],
            None => vec![], // nothing loaded there yet; the step still toggles
        }
    }

    fn set_tempo(&mut self, bpm: u32, subdivisions: u32) {
        // clamp through TempoConfig so state and sequencer stay in range
        let tempo = TempoConfig::new(bpm, subdivisions);
        self.state.bpm = tempo.bpm();
        self.state.subdivisions_per_beat = tempo.subdivisions_per_beat();
        self.sequencer.set_tempo(tempo);
    }

    pub fn load_sample_into_slot(
        &mut self,
        slot: u8,
        path: &Path,
        sample_rate: u32,
    ) -> anyhow::Result<AudioCommand> {
        let (id, buffer) = sample_loader::load(path, sample_rate)?;
        let sound = &mut self.state.sounds[slot as usize];
        sound.sample_path = path.to_string_lossy().into_owned();
        sound.sample_id = Some(id);
        self.sequencer.set_tracks(self.state.resolve_tracks());
        Ok(AudioCommand::RegisterSample { id, buffer })
    }

    pub fn clear_slot(&mut self, slot: u8) {
        let sound = &mut self.state.sounds[slot as usize];
        sound.sample_path.clear();
        sound.sample_id = None;
        self.sequencer.set_tracks(self.state.resolve_tracks());
    }

    pub fn display_state(&self, now: f64) -> DisplayState {
        let mut rows = [[false; LOOP_LENGTH]; NUM_TRACKS];
        for track in Track::ALL {
            for (step, slot) in self.state.pattern.track(track).iter().enumerate() {
                rows[track.index()][step] = slot.is_some();
            }
        }
        DisplayState {
            playing: self.sequencer.is_playing(),
            current_step: self.sequencer.current_step(now),
            cursor: self.cursor,
            selected_track: self.selected_track,
            selected_sound: self.selected_sound,
            bpm: self.state.bpm,
            subdivisions_per_beat: self.state.subdivisions_per_beat,
            rows,
            sound_names: self.state.sounds.iter().map(|s| s.display_name()).collect(),
        }
    }
}
