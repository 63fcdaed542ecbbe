use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::shared::{DisplayState, Track};

use super::grid;

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, blink_on: bool) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // transport + tempo readout
            Constraint::Length(4), // the three track rows
            Constraint::Min(3),    // sound slots + key help
        ])
        .split(area);

    draw_header(frame, sections[0], state, blink_on);
    draw_tracks(frame, sections[1], state);
    draw_sounds(frame, sections[2], state);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState, blink_on: bool) {
    let transport = if state.playing {
        Span::styled("▶ PLAY", Style::default().fg(Color::Green))
    } else if blink_on {
        Span::styled("■ STOP", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw("      ")
    };

    let line = Line::from(vec![
        Span::styled("lickbox  ", Style::default().fg(Color::Magenta)),
        transport,
        Span::raw(format!(
            "   {} bpm x{}   step {:02}",
            state.bpm, state.subdivisions_per_beat, state.current_step
        )),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_tracks(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let playhead = state.playing.then_some(state.current_step);
    let mut lines = Vec::with_capacity(Track::ALL.len());
    for track in Track::ALL {
        let selected = track == state.selected_track;
        let marker = if selected { ">" } else { " " };
        let cursor = selected.then_some(state.cursor);

        let mut spans = vec![Span::styled(
            format!("{marker} {:<7}", track.label()),
            if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            },
        )];
        spans.extend(grid::track_row(&state.rows[track.index()], playhead, cursor).spans);
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_sounds(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let mut spans = vec![Span::styled("sounds: ", Style::default().fg(Color::Gray))];
    for (i, name) in state.sound_names.iter().enumerate() {
        let style = if i as u8 == state.selected_sound {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("{i:X}:{name}"), style));
        spans.push(Span::raw(" "));
    }

    let help = Line::from(Span::styled(
        "space play  arrows move  enter toggle  [ ] sound  - = bpm  , . subdiv  esc quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(vec![Line::from(spans), Line::raw(""), help]), area);
}
