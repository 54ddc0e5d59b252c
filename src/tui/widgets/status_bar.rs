use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Paragraph;

use crate::config::Theme;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

const SEPARATOR: &str = " • ";
const ELLIPSIS: &str = "...";

/// What the status bar shows on the current frame
pub struct StatusLine<'a> {
    pub message: Option<&'a str>,
    pub key_hints: &'a [String],
    pub recent_keys: &'a str,
    pub modified: bool,
}

pub fn render_status_bar(f: &mut Frame, area: Rect, status: &StatusLine, theme: &Theme) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let highlight_bg = parse_color(&theme.highlight_bg);

    let right = right_side(status);
    let [left_area, right_area] = Layout::horizontal([
        Constraint::Min(1),
        Constraint::Length(right.chars().count() as u16),
    ])
    .areas(area);

    let (content, style) = match status.message {
        Some(msg) => (
            truncate(msg, left_area.width as usize),
            Style::default()
                .fg(get_contrast_text_color(highlight_bg))
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        ),
        None => (
            fit_hints(status.key_hints, left_area.width as usize),
            Style::default().fg(fg_color).bg(bg_color),
        ),
    };

    f.render_widget(Paragraph::new(content).style(style), left_area);
    f.render_widget(
        Paragraph::new(right).style(Style::default().fg(fg_color).bg(bg_color)),
        right_area,
    );
}

/// Pending keys and the unsaved-changes marker, e.g. " g g [+]"
fn right_side(status: &StatusLine) -> String {
    let mut right = String::new();
    if !status.recent_keys.is_empty() {
        right.push(' ');
        right.push_str(status.recent_keys);
    }
    if status.modified {
        right.push_str(" [+]");
    }
    right
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_width.saturating_sub(ELLIPSIS.len())).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Join as many hints as fit, ending in "..." when some were dropped
fn fit_hints(hints: &[String], max_width: usize) -> String {
    let mut text = String::new();
    for hint in hints {
        let extra = if text.is_empty() { 0 } else { SEPARATOR.chars().count() };
        if text.chars().count() + extra + hint.chars().count() > max_width {
            if text.is_empty() {
                return truncate(hint, max_width);
            }
            if text.chars().count() + ELLIPSIS.len() <= max_width {
                text.push_str(ELLIPSIS);
            }
            return text;
        }
        if !text.is_empty() {
            text.push_str(SEPARATOR);
        }
        text.push_str(hint);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_are_cut_at_the_width() {
        let hints = vec!["q: Quit".to_string(), "?: Help".to_string()];
        assert_eq!(fit_hints(&hints, 40), "q: Quit • ?: Help");
        assert_eq!(fit_hints(&hints, 12), "q: Quit...");
        assert_eq!(fit_hints(&hints, 5), "q:...");
    }

    #[test]
    fn right_side_shows_pending_keys_and_marker() {
        let status = StatusLine {
            message: None,
            key_hints: &[],
            recent_keys: "t",
            modified: true,
        };
        assert_eq!(right_side(&status), " t [+]");
    }
}
