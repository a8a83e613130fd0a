use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Padding, Paragraph};
use ratatui::Frame;

use crate::types::PrState;
use crate::view::{Accent, PaneView};

pub fn render(frame: &mut Frame, view: PaneView, padding: Padding, area: Rect) {
    let border_style = if view.focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title_style = if view.focused {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .padding(padding)
        .title(Span::styled(view.title, title_style));

    if view.placeholder {
        // vertically center the message
        let inner = block.inner(area);
        let top = (inner.height as usize).saturating_sub(view.lines.len()) / 2;
        let mut lines = vec![Line::from(""); top];
        lines.extend(view.lines.into_iter().map(Line::from));
        let message = Paragraph::new(lines)
            .block(block)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        frame.render_widget(message, area);
        return;
    }

    let highlight = view.highlight;
    let accents = view.accents;
    let lines: Vec<Line> = view
        .lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            if Some(i) == highlight {
                let style = if view.focused {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().bg(Color::DarkGray)
                };
                Line::from(Span::styled(text, style))
            } else if let Some(accent) = accents.iter().find(|a| a.line == i) {
                accented(text, accent)
            } else {
                Line::from(text)
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn state_color(state: PrState) -> Color {
    match state {
        PrState::Open => Color::Green,
        PrState::Merged => Color::Magenta,
        PrState::Declined => Color::Red,
        PrState::Other => Color::Gray,
    }
}

/// Split `text` around the accent and colour the middle. Ranges that do not
/// fall on character boundaries leave the line plain.
fn accented(text: String, accent: &Accent) -> Line<'static> {
    let range = accent.range.clone();
    match (
        text.get(..range.start),
        text.get(range.clone()),
        text.get(range.end..),
    ) {
        (Some(before), Some(state), Some(after)) => Line::from(vec![
            Span::raw(before.to_string()),
            Span::styled(
                state.to_string(),
                Style::default().fg(state_color(accent.state)),
            ),
            Span::raw(after.to_string()),
        ]),
        _ => Line::from(text),
    }
}
