// Seed state for a fresh project dir, and the fixture the unit tests drive:
// a basic beat that references the first three sound slots (whatever WAVs
// happen to be indexed into them).

use crate::pipeline::project::ProjectState;

pub fn starter_project() -> ProjectState {
    let mut state = ProjectState::default();

    // drums on every beat
    for step in (0..64).step_by(4) {
        state.pattern.drums[step] = Some(0);
    }
    // bass on the 1 of each bar
    for step in (0..64).step_by(16) {
        state.pattern.bass[step] = Some(1);
    }
    // a sparse melody on the off-beats of the first half
    for step in [2, 6, 10, 14, 18, 26].iter() {
        state.pattern.melody[*step] = Some(2);
    }

    state
}
