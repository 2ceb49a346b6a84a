use chat_usage_report::report::{format_cost, format_number};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::AppState;

pub struct HeaderWidget;

impl HeaderWidget {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let header_text = vec![Line::from(vec![
            Span::styled(
                "Monthly and Cumulative Token Usage with Cost",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} tokens", format_number(state.report.total_tokens())),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(
                format!("  ${}", format_cost(state.report.total_cost())),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ])];

        let header = Paragraph::new(header_text)
            .block(Block::bordered().title(format!("{} ({})", state.source, state.model)))
            .alignment(Alignment::Center);

        frame.render_widget(header, area);
    }
}
