// Key map:
//   Space           play / stop
//   Left / Right    move the step cursor
//   Up / Down       previous / next track
//   m d b           jump straight to melody / drums / bass
//   Enter or x      toggle the step under the cursor
//   [ ]             previous / next sound slot
//   - =             bpm -1 / +1        _ +   bpm -10 / +10
//   , .             subdivisions -1 / +1
//   Esc             quit (saves first)
//
// Every key resolves to an InputEvent on its own; no hold state to track,
// so the middle layer sees plain semantic events.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::shared::{InputEvent, Track};

pub fn poll_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code));
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc => vec![InputEvent::Quit],
        KeyCode::Char(' ') => vec![InputEvent::PlayPress],

        KeyCode::Left => vec![InputEvent::StepLeft],
        KeyCode::Right => vec![InputEvent::StepRight],
        KeyCode::Up => vec![InputEvent::PrevTrack],
        KeyCode::Down => vec![InputEvent::NextTrack],

        KeyCode::Enter | KeyCode::Char('x') => vec![InputEvent::ToggleStep],

        KeyCode::Char('m') => vec![InputEvent::SelectTrack(Track::Melody)],
        KeyCode::Char('d') => vec![InputEvent::SelectTrack(Track::Drums)],
        KeyCode::Char('b') => vec![InputEvent::SelectTrack(Track::Bass)],

        KeyCode::Char('[') => vec![InputEvent::PrevSound],
        KeyCode::Char(']') => vec![InputEvent::NextSound],

        KeyCode::Char('-') => vec![InputEvent::BpmDelta(-1)],
        KeyCode::Char('=') => vec![InputEvent::BpmDelta(1)],
        KeyCode::Char('_') => vec![InputEvent::BpmDelta(-10)],
        KeyCode::Char('+') => vec![InputEvent::BpmDelta(10)],

        KeyCode::Char(',') => vec![InputEvent::SubdivDelta(-1)],
        KeyCode::Char('.') => vec![InputEvent::SubdivDelta(1)],

        _ => vec![],
    }
}
