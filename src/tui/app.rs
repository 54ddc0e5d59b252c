use crossterm::event::KeyEvent;
use ratatui::widgets::TableState;
use std::time::Instant;
use tracing::{error, info};

use crate::config::Config;
use crate::entries::EntriesContainer;
use crate::input::{Action, Caller, Dispatcher, Key, KeyCombination, keymap};
use crate::models::{Entry, EntryField, EntryType};
use crate::tui::error::TuiError;
use crate::tui::widgets::editor::Editor;

/// What a prompt's text is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPurpose {
    NewType,
    RenameType(String),
    EditField {
        entry_type: String,
        id: u64,
        field: EntryField,
    },
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub title: String,
    pub purpose: PromptPurpose,
    pub editor: Editor,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPurpose {
    DeleteType(String),
    DeleteEntry { entry_type: String, id: u64 },
}

#[derive(Debug, Clone)]
pub struct Confirm {
    pub message: String,
    pub purpose: ConfirmPurpose,
}

#[derive(Debug, Clone)]
pub enum Modal {
    Prompt(Prompt),
    Confirm(Confirm),
    Help,
}

#[derive(Debug, Default)]
pub struct UiState {
    pub tab: usize,
    pub row: usize,
    pub column: usize,
    pub table_state: TableState,
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

/// Everything key callbacks can touch
pub struct AppState {
    pub config: Config,
    pub entries: EntriesContainer,
    pub ui: UiState,
    pub modal: Option<Modal>,
    pub status: StatusState,
    /// Pending key combination, for display
    pub recent_keys: String,
    pub should_quit: bool,
}

pub struct App {
    pub dispatcher: Dispatcher<Caller, Action, AppState>,
    pub state: AppState,
}

impl App {
    pub fn new(config: Config, entries: EntriesContainer) -> Result<Self, TuiError> {
        let mut dispatcher = Dispatcher::new();
        keymap::apply(&config.key_bindings, &mut dispatcher)
            .map_err(|e| TuiError::KeyBindingError(e.to_string()))?;
        register_callbacks(&mut dispatcher);
        dispatcher.set_observer(|state: &mut AppState, keys: &KeyCombination| {
            state.recent_keys = keys.to_string();
        });

        let mut state = AppState {
            config,
            entries,
            ui: UiState::default(),
            modal: None,
            status: StatusState::default(),
            recent_keys: String::new(),
            should_quit: false,
        };
        state.clamp_selection();

        Ok(Self { dispatcher, state })
    }

    /// Route a key press to whichever widget has focus
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        let caller = self.state.active_caller();
        self.dispatcher.set_mode(caller.input_mode());

        let fired = self
            .dispatcher
            .press(&caller, Key::from(key_event), &mut self.state);

        // Unclaimed keys in a prompt are text
        if !fired {
            if let Some(Modal::Prompt(prompt)) = self.state.modal.as_mut() {
                if prompt.editor.handle_key(key_event) {
                    prompt.error = None;
                }
            }
        }
    }

    /// "key: description" for the status bar and help
    pub fn key_hint(&self, action: Action) -> Option<String> {
        self.dispatcher
            .keys_for(&action)
            .map(|keys| format!("{}: {}", keys, action.description()))
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit
    }
}

fn register_callbacks(dispatcher: &mut Dispatcher<Caller, Action, AppState>) {
    let table: [(Action, fn(&mut AppState)); 19] = [
        (Action::Quit, AppState::quit),
        (Action::Save, AppState::save),
        (Action::Help, AppState::open_help),
        (Action::RowUp, AppState::row_up),
        (Action::RowDown, AppState::row_down),
        (Action::ColumnLeft, AppState::column_left),
        (Action::ColumnRight, AppState::column_right),
        (Action::FirstRow, AppState::first_row),
        (Action::LastRow, AppState::last_row),
        (Action::NextTab, AppState::next_tab),
        (Action::PrevTab, AppState::prev_tab),
        (Action::NewEntry, AppState::new_entry),
        (Action::DeleteEntry, AppState::request_delete_entry),
        (Action::EditCell, AppState::edit_cell),
        (Action::Increment, AppState::increment),
        (Action::Decrement, AppState::decrement),
        (Action::NewType, AppState::prompt_new_type),
        (Action::RenameType, AppState::prompt_rename_type),
        (Action::DeleteType, AppState::request_delete_type),
    ];
    for (action, callback) in table {
        dispatcher.bind(Caller::Table, action, callback);
    }

    dispatcher.bind(Caller::Prompt, Action::Confirm, AppState::submit_prompt);
    dispatcher.bind(Caller::Prompt, Action::Cancel, AppState::close_modal);
    dispatcher.bind(Caller::Prompt, Action::ClearInput, AppState::clear_input);

    dispatcher.bind(Caller::Confirm, Action::Yes, AppState::confirm_yes);
    dispatcher.bind(Caller::Confirm, Action::Confirm, AppState::confirm_yes);
    dispatcher.bind(Caller::Confirm, Action::No, AppState::close_modal);
    dispatcher.bind(Caller::Confirm, Action::Cancel, AppState::close_modal);

    dispatcher.bind(Caller::Help, Action::Help, AppState::close_modal);
    dispatcher.bind(Caller::Help, Action::Cancel, AppState::close_modal);
    dispatcher.bind(Caller::Help, Action::Quit, AppState::close_modal);
}

impl AppState {
    pub fn active_caller(&self) -> Caller {
        match self.modal {
            Some(Modal::Prompt(_)) => Caller::Prompt,
            Some(Modal::Confirm(_)) => Caller::Confirm,
            Some(Modal::Help) => Caller::Help,
            None => Caller::Table,
        }
    }

    pub fn current_type_name(&self) -> Option<String> {
        self.entries.type_names().get(self.ui.tab).cloned()
    }

    pub fn current_entries(&self) -> &[Entry] {
        self.current_type_name()
            .and_then(|name| self.entries.entries(&name))
            .unwrap_or(&[])
    }

    pub fn current_entry(&self) -> Option<&Entry> {
        self.current_entries().get(self.ui.row)
    }

    pub fn current_field(&self) -> EntryField {
        EntryField::ALL[self.ui.column.min(EntryField::ALL.len() - 1)]
    }

    /// Keep tab/row/column inside what currently exists
    pub fn clamp_selection(&mut self) {
        let types = self.entries.len();
        self.ui.tab = self.ui.tab.min(types.saturating_sub(1));
        let rows = self.current_entries().len();
        self.ui.row = self.ui.row.min(rows.saturating_sub(1));
        self.ui.column = self.ui.column.min(EntryField::ALL.len() - 1);

        self.ui
            .table_state
            .select(if rows == 0 { None } else { Some(self.ui.row) });
        // first table column is the id
        self.ui.table_state.select_column(Some(self.ui.column + 1));
    }

    fn select_type(&mut self, name: &str) {
        if let Some(index) = self.entries.type_names().iter().position(|n| n == name) {
            self.ui.tab = index;
            self.ui.row = 0;
        }
        self.clamp_selection();
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared (after 3 seconds)
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }

    fn quit(&mut self) {
        if self.entries.is_dirty() {
            info!("quitting with unsaved changes");
        }
        self.should_quit = true;
    }

    fn save(&mut self) {
        match self.entries.save() {
            Ok(()) => self.set_status_message("Changes saved".to_string()),
            Err(e) => {
                error!(error = %e, "save failed");
                self.set_status_message(format!("Save failed: {}", e));
            }
        }
    }

    fn open_help(&mut self) {
        self.modal = Some(Modal::Help);
    }

    fn close_modal(&mut self) {
        self.modal = None;
    }

    fn row_up(&mut self) {
        self.ui.row = self.ui.row.saturating_sub(1);
        self.clamp_selection();
    }

    fn row_down(&mut self) {
        self.ui.row += 1;
        self.clamp_selection();
    }

    fn first_row(&mut self) {
        self.ui.row = 0;
        self.clamp_selection();
    }

    fn last_row(&mut self) {
        self.ui.row = usize::MAX;
        self.clamp_selection();
    }

    fn column_left(&mut self) {
        self.ui.column = self.ui.column.saturating_sub(1);
        self.clamp_selection();
    }

    fn column_right(&mut self) {
        self.ui.column += 1;
        self.clamp_selection();
    }

    fn next_tab(&mut self) {
        let types = self.entries.len();
        if types > 0 {
            self.ui.tab = (self.ui.tab + 1) % types;
            self.ui.row = 0;
        }
        self.clamp_selection();
    }

    fn prev_tab(&mut self) {
        let types = self.entries.len();
        if types > 0 {
            self.ui.tab = (self.ui.tab + types - 1) % types;
            self.ui.row = 0;
        }
        self.clamp_selection();
    }

    fn new_entry(&mut self) {
        let Some(name) = self.current_type_name() else {
            self.set_status_message("Create an entry type first".to_string());
            return;
        };
        let result = self
            .entries
            .next_entry_id(&name)
            .and_then(|id| self.entries.add_entry(&name, Entry::new(id, String::new())).map(|_| id));
        match result {
            Ok(id) => {
                self.ui.row = self.current_entries().len().saturating_sub(1);
                self.ui.column = 1; // title
                self.clamp_selection();
                self.open_field_prompt(name, id, EntryField::Title, String::new());
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    fn request_delete_entry(&mut self) {
        let (Some(name), Some(entry)) = (self.current_type_name(), self.current_entry()) else {
            return;
        };
        let message = format!("Delete '{}' from {}?", entry.title, name);
        let id = entry.id;
        self.modal = Some(Modal::Confirm(Confirm {
            message,
            purpose: ConfirmPurpose::DeleteEntry {
                entry_type: name,
                id,
            },
        }));
    }

    fn edit_cell(&mut self) {
        let (Some(name), Some(entry)) = (self.current_type_name(), self.current_entry()) else {
            return;
        };
        let field = self.current_field();
        let value = field.value(entry);
        let id = entry.id;
        self.open_field_prompt(name, id, field, value);
    }

    fn open_field_prompt(&mut self, entry_type: String, id: u64, field: EntryField, value: String) {
        self.modal = Some(Modal::Prompt(Prompt {
            title: field.title().to_string(),
            purpose: PromptPurpose::EditField {
                entry_type,
                id,
                field,
            },
            editor: Editor::from_string(value),
            error: None,
        }));
    }

    fn increment(&mut self) {
        self.adjust_progress(true);
    }

    fn decrement(&mut self) {
        self.adjust_progress(false);
    }

    fn adjust_progress(&mut self, up: bool) {
        let (Some(name), Some(id)) = (self.current_type_name(), self.current_entry().map(|e| e.id))
        else {
            return;
        };
        let result = if up {
            self.entries.increment_progress(&name, id)
        } else {
            self.entries.decrement_progress(&name, id)
        };
        if let Err(e) = result {
            self.set_status_message(e.to_string());
        }
    }

    fn prompt_new_type(&mut self) {
        self.modal = Some(Modal::Prompt(Prompt {
            title: "New entry type".to_string(),
            purpose: PromptPurpose::NewType,
            editor: Editor::new(),
            error: None,
        }));
    }

    fn prompt_rename_type(&mut self) {
        let Some(name) = self.current_type_name() else {
            return;
        };
        self.modal = Some(Modal::Prompt(Prompt {
            title: format!("Rename '{}'", name),
            purpose: PromptPurpose::RenameType(name.clone()),
            editor: Editor::from_string(name),
            error: None,
        }));
    }

    fn request_delete_type(&mut self) {
        let Some(name) = self.current_type_name() else {
            return;
        };
        let count = self.current_entries().len();
        self.modal = Some(Modal::Confirm(Confirm {
            message: format!("Delete entry type '{}' and its {} entries?", name, count),
            purpose: ConfirmPurpose::DeleteType(name),
        }));
    }

    fn clear_input(&mut self) {
        if let Some(Modal::Prompt(prompt)) = self.modal.as_mut() {
            prompt.editor.clear();
        }
    }

    fn submit_prompt(&mut self) {
        let Some(Modal::Prompt(prompt)) = self.modal.as_ref() else {
            return;
        };
        let input = prompt.editor.text().to_string();
        let purpose = prompt.purpose.clone();

        let result = match &purpose {
            PromptPurpose::NewType => self.entries.add_type(EntryType::new(input.trim())),
            PromptPurpose::RenameType(old) => self.entries.rename_type(old, &input),
            PromptPurpose::EditField {
                entry_type,
                id,
                field,
            } => self.entries.set_field(entry_type, *id, *field, &input),
        };

        match result {
            Ok(()) => {
                self.modal = None;
                match purpose {
                    PromptPurpose::NewType | PromptPurpose::RenameType(_) => {
                        self.select_type(input.trim());
                    }
                    PromptPurpose::EditField { .. } => self.clamp_selection(),
                }
            }
            Err(e) => {
                // keep the prompt open with the reason
                if let Some(Modal::Prompt(prompt)) = self.modal.as_mut() {
                    prompt.error = Some(e.to_string());
                }
            }
        }
    }

    fn confirm_yes(&mut self) {
        let Some(Modal::Confirm(confirm)) = self.modal.take() else {
            return;
        };
        let result = match confirm.purpose {
            ConfirmPurpose::DeleteType(name) => self
                .entries
                .delete_type(&name)
                .map(|_| format!("Deleted entry type '{}'", name)),
            ConfirmPurpose::DeleteEntry { entry_type, id } => self
                .entries
                .delete_entry(&entry_type, id)
                .map(|entry| format!("Deleted '{}'", entry.title)),
        };
        match result {
            Ok(message) => self.set_status_message(message),
            Err(e) => self.set_status_message(e.to_string()),
        }
        self.clamp_selection();
    }
}
