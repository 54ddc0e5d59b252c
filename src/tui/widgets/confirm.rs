use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::config::Theme;
use crate::tui::app::Confirm;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::help::popup_area;

/// Yes/no question; `answers` is the key hint line, e.g. "y: Yes • n: No"
pub fn render_confirm(f: &mut Frame, area: Rect, confirm: &Confirm, answers: &str, theme: &Theme) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let highlight_bg = parse_color(&theme.highlight_bg);

    let area = popup_area(area, 50, 30);
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(confirm.message.as_str()),
        Line::from(""),
        Line::from(Span::styled(
            answers.to_string(),
            Style::default()
                .fg(get_contrast_text_color(highlight_bg))
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm")
                .title_alignment(Alignment::Center),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}
