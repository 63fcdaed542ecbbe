mod audio;
mod audio_api;
mod loader;
mod middle;
mod pipeline;
mod sequencer;
mod shared;
mod tui;

use std::path::PathBuf;
use std::time::Instant;

use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use middle::Middle;
use pipeline::{demo, persistence};
use shared::InputEvent;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope

    let project_dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let state = persistence::load_project(&project_dir)
        .unwrap_or_else(demo::starter_project);
    // remember slot assignments from the previous run
    let saved_paths: Vec<String> = state.sounds.iter()
        .map(|s| s.sample_path.clone())
        .collect();
    let mut middle = Middle::with_state(state);

    let audio = audio::start_audio(middle.state.polyphony)?;
    let clock = audio.clock();
    let sample_rate = audio.sample_rate();

    // always refresh slots from the wavs sitting in the project dir
    let wav_paths = loader::sample_loader::index_wav_in_dir(&project_dir)
        .unwrap_or_default();
    let num_indexed = wav_paths.len().min(shared::NUM_SOUNDS);
    for (slot, path) in wav_paths.into_iter().take(shared::NUM_SOUNDS).enumerate() {
        if let Ok(cmd) = middle.load_sample_into_slot(slot as u8, &path, sample_rate) {
            audio.send(cmd);
        }
    }

    // slots beyond the indexed wavs: restore saved assignments that still
    // point at real files, clear the ones that don't
    for slot in num_indexed..shared::NUM_SOUNDS {
        let sample_path = &saved_paths[slot];
        if sample_path.is_empty() {
            continue;
        }
        let path = std::path::Path::new(sample_path);
        if path.exists() {
            if let Ok(cmd) = middle.load_sample_into_slot(slot as u8, path, sample_rate) {
                audio.send(cmd);
            }
        } else {
            middle.clear_slot(slot as u8);
        }
    }

    if middle.auto_play() {
        middle.play(clock.now());
    }

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = std::time::Duration::from_millis(16); // ~60fps
    let blink_start = Instant::now();

    loop {
        let blink_on = (blink_start.elapsed().as_millis() / 250) % 2 == 0;
        let ds = middle.display_state(clock.now());

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, blink_on);
        })?;

        let events = tui::input::poll_input(tick_rate)?;
        for event in events {
            if event == InputEvent::Quit {
                // save before quitting
                let _ = persistence::save_project(&project_dir, &middle.state);
                drop(term);
                drop(audio);
                return Ok(());
            }
            for cmd in middle.handle_input(event, clock.now()) {
                audio.send(cmd);
            }
        }

        // the poll tick: everything due inside the lookahead window goes out
        for cmd in middle.tick(clock.now()) {
            audio.send(cmd);
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
