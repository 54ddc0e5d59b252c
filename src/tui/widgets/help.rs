use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::config::Theme;
use crate::input::{Action, KeyCombination};
use crate::tui::widgets::color::parse_color;

/// Overlay listing every action with its current keys
pub fn render_help(f: &mut Frame, area: Rect, bindings: &[(Action, Option<KeyCombination>)], theme: &Theme) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);

    let area = popup_area(area, 60, 70);
    f.render_widget(Clear, area);

    let paragraph = Paragraph::new(build_help_text(bindings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

/// Centered rect taking the given percentages of `area`
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

fn build_help_text(bindings: &[(Action, Option<KeyCombination>)]) -> String {
    let width = bindings
        .iter()
        .filter_map(|(_, keys)| keys.as_ref())
        .map(|keys| keys.to_string().chars().count())
        .max()
        .unwrap_or(0);

    let mut text = String::new();
    for (action, keys) in bindings {
        let keys = keys.as_ref().map(ToString::to_string).unwrap_or_default();
        text.push_str(&format!("  {:<width$}  {}\n", keys, action.description(), width = width));
    }
    text
}
