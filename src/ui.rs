use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::time::Duration;

use crate::config::{INDICATOR_NAME, POLL_INTERVAL};
use crate::display::{LabelClass, PanelState};

pub struct Panel {
    pub should_quit: bool,
}

impl Panel {
    pub fn new() -> Self {
        Self { should_quit: false }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn render(&self, frame: &mut Frame, state: &PanelState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // gas label
                Constraint::Length(3), // freshness
                Constraint::Min(0),
                Constraint::Length(4), // help
            ])
            .split(frame.area());

        self.render_label(frame, chunks[0], state);
        self.render_updated(frame, chunks[1], state);
        self.render_help(frame, chunks[3]);
    }

    fn render_label(&self, frame: &mut Frame, area: Rect, state: &PanelState) {
        let style = class_style(state.class);
        let content = vec![Line::from(vec![Span::styled(state.text.as_str(), style)])];

        let paragraph = Paragraph::new(content).block(
            Block::default()
                .title(format!("Gas Price ({})", INDICATOR_NAME))
                .borders(Borders::ALL),
        );

        frame.render_widget(paragraph, area);
    }

    fn render_updated(&self, frame: &mut Frame, area: Rect, state: &PanelState) {
        let updated_text = match state.age() {
            Some(age) if age < Duration::from_secs(1) => "< 1s ago".to_string(),
            Some(age) => format!("{}s ago", age.as_secs()),
            None => "--".to_string(),
        };

        let content = vec![Line::from(vec![
            Span::styled("Updated: ", Style::default()),
            Span::styled(updated_text, Style::default().fg(Color::Yellow)),
        ])];

        let paragraph = Paragraph::new(content)
            .block(Block::default().title("Status").borders(Borders::ALL));

        frame.render_widget(paragraph, area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help_text = vec![
            Line::from(vec![
                Span::styled("Press ", Style::default()),
                Span::styled("'q'", Style::default().fg(Color::Yellow)),
                Span::styled(" to quit", Style::default()),
            ]),
            Line::from(vec![
                Span::styled("Updates every ", Style::default()),
                Span::styled(
                    format!("{} seconds", POLL_INTERVAL.as_secs()),
                    Style::default().fg(Color::Cyan),
                ),
            ]),
        ];

        let paragraph =
            Paragraph::new(help_text).block(Block::default().title("Help").borders(Borders::ALL));

        frame.render_widget(paragraph, area);
    }
}

fn class_style(class: LabelClass) -> Style {
    match class {
        LabelClass::Ok => Style::default().fg(Color::Green),
        LabelClass::Loading => Style::default().fg(Color::Gray),
        LabelClass::Error => Style::default().fg(Color::Red),
    }
}
