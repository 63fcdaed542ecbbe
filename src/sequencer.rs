use crate::audio::SampleId;
use crate::audio_api::{AudioCommand, ScheduleParams};
use crate::shared::{LOOP_LENGTH, NUM_TRACKS, Track};

// Past this point f64 stops representing integers exactly, so step times
// computed from the counter would start to drift; re-base before we get there.
const REBASE_THRESHOLD: u64 = 1 << 53;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TempoConfig {
    bpm: u32,
    subdivisions_per_beat: u32,
}

impl TempoConfig {
    pub const MIN_BPM: u32 = 40;
    pub const MAX_BPM: u32 = 240;
    pub const MIN_SUBDIVISIONS: u32 = 1;
    pub const MAX_SUBDIVISIONS: u32 = 32;

    // Out-of-range values are clamped here, once; everything downstream can
    // rely on step_duration() being strictly positive.
    pub fn new(bpm: u32, subdivisions_per_beat: u32) -> Self {
        Self {
            bpm: bpm.clamp(Self::MIN_BPM, Self::MAX_BPM),
            subdivisions_per_beat: subdivisions_per_beat
                .clamp(Self::MIN_SUBDIVISIONS, Self::MAX_SUBDIVISIONS),
        }
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn subdivisions_per_beat(&self) -> u32 {
        self.subdivisions_per_beat
    }

    // seconds per step
    pub fn step_duration(&self) -> f64 {
        60.0 / (self.bpm * self.subdivisions_per_beat) as f64
    }
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self::new(120, 4)
    }
}

// One occupied pattern slot, fully resolved for the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepSound {
    pub sample_id: SampleId,
    pub gain: f32,
}

// The resolved pattern: one slot per step per track. Pure data; the
// sequencer only reads it, and edits arrive as whole replacements from the
// middle layer.
#[derive(Clone, Debug)]
pub struct TrackSet {
    slots: [[Option<StepSound>; LOOP_LENGTH]; NUM_TRACKS],
}

impl TrackSet {
    pub fn empty() -> Self {
        Self {
            slots: [[None; LOOP_LENGTH]; NUM_TRACKS],
        }
    }

    pub fn get(&self, track: Track, step: usize) -> Option<StepSound> {
        self.slots[track.index()][step]
    }

    pub fn set(&mut self, track: Track, step: usize, sound: Option<StepSound>) {
        self.slots[track.index()][step] = sound;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
}

// The lookahead step sequencer. The host polls `tick(now)` at whatever frame
// cadence it has; each tick drains every step whose absolute time falls
// inside `now + lookahead` and emits Schedule commands stamped with exact
// step times, so playback stays sample-accurate no matter how ragged the
// polling is. Step N plays at `loop_start + N * step_duration`, a pure
// linear function of an unbounded counter, so there is no drift to
// accumulate across loop wraparounds.
pub struct Sequencer {
    tempo: TempoConfig,
    tracks: TrackSet,
    lookahead: f64,
    step_duration: f64,
    loop_start: f64,
    next_step: u64,
    state: PlayState,
    started: bool,
}

impl Sequencer {
    pub const MIN_LOOKAHEAD: f64 = 0.01;
    pub const MAX_LOOKAHEAD: f64 = 0.2;
    pub const DEFAULT_LOOKAHEAD: f64 = 0.08;

    pub fn new(tempo: TempoConfig, lookahead: f64) -> Self {
        Self {
            tempo,
            tracks: TrackSet::empty(),
            lookahead: lookahead.clamp(Self::MIN_LOOKAHEAD, Self::MAX_LOOKAHEAD),
            step_duration: tempo.step_duration(),
            loop_start: 0.0,
            next_step: 0,
            state: PlayState::Stopped,
            started: false,
        }
    }

    pub fn set_tracks(&mut self, tracks: TrackSet) {
        self.tracks = tracks;
    }

    // Stored immediately, applied at the next play(); steps already committed
    // keep the timing they were scheduled with.
    pub fn set_tempo(&mut self, tempo: TempoConfig) {
        self.tempo = tempo;
    }

    pub fn tempo(&self) -> TempoConfig {
        self.tempo
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    // Anchor the loop at the next step boundary at or after `now`, so the
    // first committed step can never land in the past, and restart from
    // step 0.
    pub fn play(&mut self, now: f64) {
        self.step_duration = self.tempo.step_duration();
        self.loop_start = (now / self.step_duration).ceil() * self.step_duration;
        self.next_step = 0;
        self.state = PlayState::Playing;
        self.started = true;
    }

    // Only stops future scheduling; hits already committed to the voice
    // pools play out, which avoids an audible chop on pause.
    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
    }

    // Drain every step whose time falls inside the lookahead window. Steps
    // come out in strictly increasing time order, tracks in melody/drums/bass
    // order within a step; the only cursor is the forward-only counter, so
    // nothing is ever emitted twice.
    pub fn tick(&mut self, now: f64) -> Vec<AudioCommand> {
        let mut out = Vec::new();
        if self.state != PlayState::Playing {
            return out;
        }
        let window_end = now + self.lookahead;

        loop {
            let step = (self.next_step % LOOP_LENGTH as u64) as usize;
            let step_time = self.loop_start + self.next_step as f64 * self.step_duration;
            if step_time > window_end {
                break;
            }

            for track in Track::ALL {
                if let Some(sound) = self.tracks.get(track, step) {
                    out.push(AudioCommand::Schedule(ScheduleParams {
                        track,
                        sample_id: sound.sample_id,
                        start: step_time,
                        gain: sound.gain,
                    }));
                }
            }

            self.next_step += 1;
            if self.next_step >= REBASE_THRESHOLD {
                self.rebase(now);
            }
        }
        out
    }

    // Shift the anchor forward by the elapsed whole loops and pull the
    // counter down by the same amount. Whole-loop alignment keeps
    // `next_step % LOOP_LENGTH`, every pending step time, and
    // `current_step()` identical across the shift: the same absolute
    // timeline, expressed with smaller numbers.
    fn rebase(&mut self, now: f64) {
        let elapsed = ((now - self.loop_start) / self.step_duration).floor().max(0.0) as u64;
        let whole_loops = elapsed - elapsed % LOOP_LENGTH as u64;
        self.loop_start += whole_loops as f64 * self.step_duration;
        self.next_step = self.next_step.saturating_sub(whole_loops);
    }

    // Which of the 64 slots the playhead is on at `now`. Defined in any
    // state; 0 before the first play() and for times before the anchor.
    pub fn current_step(&self, now: f64) -> usize {
        if !self.started {
            return 0;
        }
        let t = now - self.loop_start;
        if t < 0.0 {
            return 0;
        }
        ((t / self.step_duration).floor() as u64 % LOOP_LENGTH as u64) as usize
    }

    pub fn lookahead(&self) -> f64 {
        self.lookahead
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::next_sample_id;

    // bpm=120, subs=4 -> step_duration = 0.125s, exactly representable
    fn sequencer() -> Sequencer {
        Sequencer::new(TempoConfig::new(120, 4), 0.08)
    }

    fn melody_at(steps: &[usize]) -> (TrackSet, SampleId) {
        let id = next_sample_id();
        let mut tracks = TrackSet::empty();
        for &step in steps {
            tracks.set(Track::Melody, step, Some(StepSound { sample_id: id, gain: 1.0 }));
        }
        (tracks, id)
    }

    fn starts(cmds: &[AudioCommand]) -> Vec<(Track, f64)> {
        cmds.iter()
            .map(|cmd| match cmd {
                AudioCommand::Schedule(p) => (p.track, p.start),
                other => panic!("unexpected command {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_step_duration_positive_across_valid_range() {
        for bpm in TempoConfig::MIN_BPM..=TempoConfig::MAX_BPM {
            for subs in TempoConfig::MIN_SUBDIVISIONS..=TempoConfig::MAX_SUBDIVISIONS {
                let d = TempoConfig::new(bpm, subs).step_duration();
                assert!(d > 0.0, "bpm={bpm} subs={subs}");
            }
        }
    }

    #[test]
    fn test_tempo_clamping() {
        let t = TempoConfig::new(0, 0);
        assert_eq!(t.bpm(), TempoConfig::MIN_BPM);
        assert_eq!(t.subdivisions_per_beat(), TempoConfig::MIN_SUBDIVISIONS);

        let t = TempoConfig::new(10_000, 10_000);
        assert_eq!(t.bpm(), TempoConfig::MAX_BPM);
        assert_eq!(t.subdivisions_per_beat(), TempoConfig::MAX_SUBDIVISIONS);

        assert_eq!(TempoConfig::new(120, 4).step_duration(), 0.125);
    }

    #[test]
    fn test_play_anchors_on_or_after_now() {
        let mut s = sequencer();

        // already on a boundary: anchor right there
        s.play(10.0);
        assert_eq!(s.loop_start, 10.0);

        // off the grid: anchor at the next boundary above
        s.play(10.01);
        assert_eq!(s.loop_start, 10.125);
        assert!(s.loop_start >= 10.01);
    }

    #[test]
    fn test_first_tick_dispatches_only_the_window() {
        let mut s = sequencer();
        let (tracks, _) = melody_at(&[0, 1]);
        s.set_tracks(tracks);

        s.play(10.0);
        let cmds = s.tick(10.0);
        // step 0 at 10.0 is inside 10.08; step 1 at 10.125 is not
        let got = starts(&cmds);
        assert_eq!(got, vec![(Track::Melody, 10.0)]);
    }

    #[test]
    fn test_tick_is_idempotent_at_unchanged_now() {
        let mut s = sequencer();
        let (tracks, _) = melody_at(&[0, 1, 2, 3]);
        s.set_tracks(tracks);

        s.play(10.0);
        assert_eq!(s.tick(10.0).len(), 1);
        assert!(s.tick(10.0).is_empty());
        assert!(s.tick(10.0).is_empty());
    }

    #[test]
    fn test_tick_before_play_and_after_stop_is_silent() {
        let mut s = sequencer();
        let (tracks, _) = melody_at(&[0, 1, 2, 3]);
        s.set_tracks(tracks);

        assert!(s.tick(0.0).is_empty());

        s.play(0.0);
        s.tick(0.0);
        s.stop();
        assert!(!s.is_playing());
        assert!(s.tick(5.0).is_empty());
    }

    #[test]
    fn test_each_step_dispatched_exactly_once_in_order() {
        let mut s = sequencer();
        // melody on every step so every boundary produces a command
        let (tracks, _) = melody_at(&(0..LOOP_LENGTH).collect::<Vec<_>>());
        s.set_tracks(tracks);
        s.play(0.0);

        // ragged polling cadence, deliberately not a divisor of the step
        let mut times = Vec::new();
        let mut now = 0.0;
        let jitter = [0.011, 0.016, 0.047, 0.002, 0.033];
        let mut i = 0;
        while now < 9.0 {
            for (_, t) in starts(&s.tick(now)) {
                times.push(t);
            }
            now += jitter[i % jitter.len()];
            i += 1;
        }

        assert!(!times.is_empty());
        // strictly increasing, on the exact grid, no gaps and no repeats
        for (k, &t) in times.iter().enumerate() {
            assert_eq!(t, k as f64 * 0.125, "step {k} off the grid");
        }
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_long_stall_drains_missed_steps_once() {
        let mut s = sequencer();
        let (tracks, _) = melody_at(&(0..LOOP_LENGTH).collect::<Vec<_>>());
        s.set_tracks(tracks);
        s.play(0.0);

        s.tick(0.0);
        // host froze for two seconds; everything in between comes out in one
        // burst, still ordered and still exactly once
        let burst = starts(&s.tick(2.0));
        assert_eq!(burst.first().map(|&(_, t)| t), Some(0.125));
        assert_eq!(burst.last().map(|&(_, t)| t), Some(2.0));
        assert_eq!(burst.len(), 16);
        assert!(s.tick(2.0).is_empty());
    }

    #[test]
    fn test_track_dispatch_order_within_a_step() {
        let mut s = sequencer();
        let id = next_sample_id();
        let mut tracks = TrackSet::empty();
        for track in Track::ALL {
            tracks.set(track, 0, Some(StepSound { sample_id: id, gain: 1.0 }));
        }
        s.set_tracks(tracks);

        s.play(4.0);
        let got = starts(&s.tick(4.0));
        assert_eq!(
            got,
            vec![(Track::Melody, 4.0), (Track::Drums, 4.0), (Track::Bass, 4.0)]
        );
    }

    #[test]
    fn test_single_event_at_step_five_reaches_melody_only() {
        let mut s = sequencer();
        let (tracks, _) = melody_at(&[5]);
        s.set_tracks(tracks);
        s.play(0.0);

        let mut all = Vec::new();
        let mut now = 0.0;
        while now < 0.7 {
            all.extend(starts(&s.tick(now)));
            now += 0.016;
        }

        // exactly one hit, on melody, at 5 * 0.125
        assert_eq!(all, vec![(Track::Melody, 0.625)]);
    }

    #[test]
    fn test_loop_wraps_at_64_steps() {
        let mut s = sequencer();
        let (tracks, _) = melody_at(&[3]);
        s.set_tracks(tracks);
        s.play(0.0);

        // run through a bit over two full loops (64 * 0.125 = 8s each)
        let mut hits = Vec::new();
        let mut now = 0.0;
        while now < 17.0 {
            hits.extend(starts(&s.tick(now)));
            now += 0.02;
        }

        let expected: Vec<f64> = vec![0.375, 8.375, 16.375];
        assert_eq!(hits.iter().map(|&(_, t)| t).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_tempo_change_waits_for_next_play() {
        let mut s = sequencer();
        let (tracks, _) = melody_at(&(0..LOOP_LENGTH).collect::<Vec<_>>());
        s.set_tracks(tracks);

        s.play(0.0);
        s.set_tempo(TempoConfig::new(60, 4)); // 0.25s steps, but not yet
        // window end 0.38 still drains on the old 0.125 grid
        let t = starts(&s.tick(0.3));
        assert_eq!(
            t.iter().map(|&(_, t)| t).collect::<Vec<_>>(),
            vec![0.0, 0.125, 0.25, 0.375]
        );

        s.play(10.0);
        let t2 = starts(&s.tick(10.0));
        assert_eq!(t2, vec![(Track::Melody, 10.0)]);
        let t3 = starts(&s.tick(10.2));
        assert_eq!(t3, vec![(Track::Melody, 10.25)]);
    }

    #[test]
    fn test_current_step_before_first_play_is_zero() {
        let s = sequencer();
        assert_eq!(s.current_step(123.4), 0);
    }

    #[test]
    fn test_current_step_never_negative_and_wraps() {
        let mut s = sequencer();
        s.play(10.0);

        assert_eq!(s.current_step(9.0), 0); // before the anchor
        assert_eq!(s.current_step(10.0), 0);
        assert_eq!(s.current_step(10.124), 0);
        assert_eq!(s.current_step(10.125), 1);
        // one full loop is 8s; 65 steps in lands back on step 1
        assert_eq!(s.current_step(10.0 + 65.0 * 0.125), 1);
    }

    #[test]
    fn test_current_step_keeps_running_after_stop() {
        let mut s = sequencer();
        s.play(0.0);
        s.stop();
        assert_eq!(s.current_step(0.25), 2);
    }

    #[test]
    fn test_rebase_is_phase_preserving() {
        let mut s = sequencer();
        s.play(0.0);

        // drop the sequencer deep into a session, self-consistently: the
        // counter is at the ceiling and the clock is a few steps behind it
        s.next_step = REBASE_THRESHOLD;
        let now = (REBASE_THRESHOLD - 10) as f64 * s.step_duration;

        let step_before = s.current_step(now);
        let pattern_phase_before = s.next_step % LOOP_LENGTH as u64;
        let pending_time_before = s.loop_start + s.next_step as f64 * s.step_duration;

        s.rebase(now);

        assert!(s.next_step < REBASE_THRESHOLD);
        assert_eq!(s.current_step(now), step_before);
        assert_eq!(s.next_step % LOOP_LENGTH as u64, pattern_phase_before);
        let pending_time_after = s.loop_start + s.next_step as f64 * s.step_duration;
        assert_eq!(pending_time_after, pending_time_before);
    }

    #[test]
    fn test_rebase_noop_when_clock_behind_anchor() {
        let mut s = sequencer();
        s.play(10.0);
        let anchor = s.loop_start;
        s.rebase(9.0); // negative elapsed must not move anything
        assert_eq!(s.loop_start, anchor);
        assert_eq!(s.next_step, 0);
    }

    #[test]
    fn test_lookahead_is_clamped() {
        let s = Sequencer::new(TempoConfig::default(), 5.0);
        assert_eq!(s.lookahead(), Sequencer::MAX_LOOKAHEAD);
        let s = Sequencer::new(TempoConfig::default(), 0.0);
        assert_eq!(s.lookahead(), Sequencer::MIN_LOOKAHEAD);
    }
}
