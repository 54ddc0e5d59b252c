use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};

use crate::config::Theme;
use crate::models::{Entry, EntryField};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

/// Column widths, id column first
fn widths() -> Vec<Constraint> {
    let mut widths = vec![Constraint::Length(4)];
    widths.extend(EntryField::ALL.iter().map(|field| match field {
        EntryField::Status => Constraint::Length(10),
        EntryField::Title => Constraint::Min(16),
        EntryField::Completed | EntryField::Total | EntryField::Score => Constraint::Length(6),
        EntryField::MediaType => Constraint::Length(8),
        EntryField::Link | EntryField::Tags => Constraint::Length(12),
        EntryField::Description | EntryField::Comment => Constraint::Min(10),
    }));
    widths
}

fn progress_cell(entry: &Entry) -> Cell<'static> {
    let style = if entry.total > 0 && entry.completed >= entry.total {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    Cell::from(entry.completed.to_string()).style(style)
}

/// Entries of the selected type, with the selected row and column highlighted
pub fn render_entry_table(
    f: &mut Frame,
    area: Rect,
    title: &str,
    entries: &[Entry],
    state: &mut TableState,
    theme: &Theme,
) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = parse_color(&theme.highlight_fg);

    let header = Row::new(
        std::iter::once(Cell::from("#"))
            .chain(EntryField::ALL.iter().map(|field| Cell::from(field.title()))),
    )
    .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));

    let rows = entries.iter().map(|entry| {
        let cells = EntryField::ALL.iter().map(|field| match field {
            EntryField::Completed => progress_cell(entry),
            _ => Cell::from(Text::from(first_line(&field.value(entry)))),
        });
        Row::new(std::iter::once(Cell::from(entry.id.to_string())).chain(cells))
    });

    let table = Table::new(rows, widths())
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ({}) ", title, entries.len())),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .row_highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg))
        .cell_highlight_style(
            Style::default()
                .fg(get_contrast_text_color(highlight_fg))
                .bg(highlight_fg)
                .add_modifier(Modifier::BOLD),
        )
        .column_spacing(1);

    f.render_stateful_widget(table, area, state);
}

/// Multi-line text collapses to its first line in a cell
fn first_line(value: &str) -> String {
    match value.split_once('\n') {
        Some((first, _)) => format!("{}…", first),
        None => value.to_string(),
    }
}
