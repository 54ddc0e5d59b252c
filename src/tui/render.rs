use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::input::{Action, Caller};
use crate::tui::app::Modal;
use crate::tui::widgets::{
    color::parse_color,
    confirm::render_confirm,
    entry_table::render_entry_table,
    help::render_help,
    prompt::render_prompt,
    status_bar::{StatusLine, render_status_bar},
    tabs::render_tabs,
};
use crate::tui::{App, Layout};

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let theme = app.state.config.theme.clone();
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("mediatrack")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    let type_names = app.state.entries.type_names();
    render_tabs(f, layout.tabs_area, &type_names, app.state.ui.tab, &theme);

    match type_names.get(app.state.ui.tab) {
        Some(name) => {
            let state = &mut app.state;
            let entries = state.entries.entries(name).unwrap_or(&[]);
            render_entry_table(f, layout.main_area, name, entries, &mut state.ui.table_state, &theme);
        }
        None => {
            let hint = app
                .key_hint(Action::NewType)
                .unwrap_or_else(|| Action::NewType.description().to_string());
            let paragraph = Paragraph::new(format!("Nothing tracked yet. {}", hint))
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center)
                .style(Style::default().fg(fg_color));
            f.render_widget(paragraph, layout.main_area);
        }
    }

    let key_hints = key_hints(app);
    let status = StatusLine {
        message: app.state.status.message.as_deref(),
        key_hints: &key_hints,
        recent_keys: &app.state.recent_keys,
        modified: app.state.entries.is_dirty(),
    };
    render_status_bar(f, layout.status_area, &status, &theme);

    // Overlays go last so they cover the table
    match &app.state.modal {
        Some(Modal::Prompt(prompt)) => render_prompt(f, f.area(), prompt, &theme),
        Some(Modal::Confirm(confirm)) => {
            let answers = hints_for(app, &[Action::Yes, Action::No]).join(" • ");
            render_confirm(f, f.area(), confirm, &answers, &theme);
        }
        Some(Modal::Help) => {
            let bindings: Vec<_> = Action::ALL
                .iter()
                .map(|action| (*action, app.dispatcher.keys_for(action)))
                .collect();
            render_help(f, f.area(), &bindings, &theme);
        }
        None => {}
    }
}

fn hints_for(app: &App, actions: &[Action]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|action| app.key_hint(*action))
        .collect()
}

fn key_hints(app: &App) -> Vec<String> {
    let actions: &[Action] = match app.state.active_caller() {
        Caller::Table => &[
            Action::Quit,
            Action::Help,
            Action::NewEntry,
            Action::EditCell,
            Action::Increment,
            Action::Decrement,
            Action::DeleteEntry,
            Action::NewType,
            Action::Save,
        ],
        Caller::Prompt => &[Action::Confirm, Action::Cancel, Action::ClearInput],
        Caller::Confirm => &[Action::Yes, Action::No],
        Caller::Help => &[Action::Help, Action::Cancel],
    };
    hints_for(app, actions)
}
