use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::shared::LOOP_LENGTH;

// One 64-cell track row, split into four bars of 16 for readability.
// The playhead paints its column; the cursor (only drawn on the selected
// track) wins over everything.
pub fn track_row(
    cells: &[bool; LOOP_LENGTH],
    playhead: Option<usize>,
    cursor: Option<usize>,
) -> Line<'static> {
    let mut spans = Vec::with_capacity(LOOP_LENGTH + 3);
    for (step, &on) in cells.iter().enumerate() {
        if step > 0 && step % 16 == 0 {
            spans.push(Span::raw(" "));
        }

        let glyph = if on { "■" } else { "·" };
        let mut style = if on {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if playhead == Some(step) {
            style = Style::default().fg(Color::Black).bg(Color::LightMagenta);
        }
        if cursor == Some(step) {
            style = Style::default().fg(Color::Black).bg(Color::Yellow);
        }
        spans.push(Span::styled(glyph.to_string(), style));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_has_bar_separators() {
        let cells = [false; LOOP_LENGTH];
        let line = track_row(&cells, None, None);
        // 64 cells + 3 separators
        assert_eq!(line.spans.len(), LOOP_LENGTH + 3);
    }
}
