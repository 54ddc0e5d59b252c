use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs;

use crate::config::Theme;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

/// One tab per entry type; `titles` is empty until a type is created
pub fn render_tabs(f: &mut Frame, area: Rect, titles: &[String], selected: usize, theme: &Theme) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let tab_bg = parse_color(&theme.tab_bg);
    let tab_fg = get_contrast_text_color(tab_bg);

    if titles.is_empty() {
        let hint = Line::from(Span::styled(
            "  no entry types yet  ",
            Style::default().fg(tab_fg).bg(tab_bg),
        ));
        f.render_widget(hint, area);
        return;
    }

    // Padding spans make each tab look like a box
    let lines: Vec<Line> = titles
        .iter()
        .map(|title| {
            Line::from(vec![
                Span::styled("  ", Style::default().bg(tab_bg)),
                Span::styled(title.clone(), Style::default().fg(tab_fg).bg(tab_bg)),
                Span::styled("  ", Style::default().bg(tab_bg)),
            ])
        })
        .collect();

    let tabs = Tabs::new(lines)
        .select(selected)
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(
            Style::default()
                .fg(get_contrast_text_color(highlight_bg))
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .divider("  ")
        .padding("", "");

    f.render_widget(tabs, area);
}
