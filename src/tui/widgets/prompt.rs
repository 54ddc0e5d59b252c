use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::config::Theme;
use crate::tui::app::Prompt;
use crate::tui::widgets::color::parse_color;

/// Text input box; shows the last rejection below the text
pub fn render_prompt(f: &mut Frame, area: Rect, prompt: &Prompt, theme: &Theme) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);

    let height = if prompt.error.is_some() { 4 } else { 3 };
    let area = centered(area, 60, height);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", prompt.title))
        .style(Style::default().fg(fg_color).bg(bg_color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Scroll so the cursor stays visible
    let width = inner.width.max(1) as usize;
    let cursor = prompt.editor.cursor();
    let skip = cursor.saturating_sub(width - 1);
    let visible: String = prompt.editor.text().chars().skip(skip).take(width).collect();

    let mut lines = vec![Line::from(visible)];
    if let Some(error) = &prompt.error {
        lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red)));
    }
    f.render_widget(Paragraph::new(lines), inner);

    f.set_cursor_position(Position::new(inner.x + (cursor - skip) as u16, inner.y));
}

fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}
