use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub struct ShortcutsWidget;

impl ShortcutsWidget {
    pub fn render(frame: &mut Frame, area: Rect) {
        let key_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);

        let shortcuts_text = vec![Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled("q", key_style),
            Span::styled(" or ", Style::default().fg(Color::Gray)),
            Span::styled("Esc", key_style),
            Span::styled(" to close, ", Style::default().fg(Color::Gray)),
            Span::styled("←/→", key_style),
            Span::styled(" to scroll months", Style::default().fg(Color::Gray)),
        ])];

        let shortcuts = Paragraph::new(shortcuts_text).alignment(Alignment::Center);

        frame.render_widget(shortcuts, area);
    }
}
