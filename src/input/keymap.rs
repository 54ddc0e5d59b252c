use std::fmt::Debug;
use std::hash::Hash;

use super::combination::KeyCombination;
use super::dispatcher::{Dispatcher, InputMode};
use super::key::KeyParseError;
use crate::config::KeyBindings;

/// Logical actions a key combination can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    Save,
    Help,
    RowUp,
    RowDown,
    ColumnLeft,
    ColumnRight,
    FirstRow,
    LastRow,
    NextTab,
    PrevTab,
    NewEntry,
    DeleteEntry,
    EditCell,
    Increment,
    Decrement,
    NewType,
    RenameType,
    DeleteType,
    Confirm,
    Cancel,
    ClearInput,
    Yes,
    No,
}

/// Who a key press is dispatched for: the widget that currently has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Caller {
    Table,
    Prompt,
    Confirm,
    Help,
}

impl Caller {
    /// Text prompts type freely, so they read keys as a rolling window
    pub fn input_mode(self) -> InputMode {
        match self {
            Caller::Prompt => InputMode::Input,
            Caller::Table | Caller::Confirm | Caller::Help => InputMode::Normal,
        }
    }
}

impl Action {
    pub const ALL: [Action; 24] = [
        Action::Quit,
        Action::Save,
        Action::Help,
        Action::RowUp,
        Action::RowDown,
        Action::ColumnLeft,
        Action::ColumnRight,
        Action::FirstRow,
        Action::LastRow,
        Action::NextTab,
        Action::PrevTab,
        Action::NewEntry,
        Action::DeleteEntry,
        Action::EditCell,
        Action::Increment,
        Action::Decrement,
        Action::NewType,
        Action::RenameType,
        Action::DeleteType,
        Action::Confirm,
        Action::Cancel,
        Action::ClearInput,
        Action::Yes,
        Action::No,
    ];

    /// Name of the action in the `[key_bindings]` config table
    pub fn config_name(self) -> &'static str {
        match self {
            Action::Quit => "quit",
            Action::Save => "save",
            Action::Help => "help",
            Action::RowUp => "row_up",
            Action::RowDown => "row_down",
            Action::ColumnLeft => "column_left",
            Action::ColumnRight => "column_right",
            Action::FirstRow => "first_row",
            Action::LastRow => "last_row",
            Action::NextTab => "next_tab",
            Action::PrevTab => "prev_tab",
            Action::NewEntry => "new_entry",
            Action::DeleteEntry => "delete_entry",
            Action::EditCell => "edit_cell",
            Action::Increment => "increment",
            Action::Decrement => "decrement",
            Action::NewType => "new_type",
            Action::RenameType => "rename_type",
            Action::DeleteType => "delete_type",
            Action::Confirm => "confirm",
            Action::Cancel => "cancel",
            Action::ClearInput => "clear_input",
            Action::Yes => "yes",
            Action::No => "no",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Action::Quit => "Quit (unsaved changes are lost)",
            Action::Save => "Save all changes",
            Action::Help => "Show/hide help",
            Action::RowUp => "Previous row",
            Action::RowDown => "Next row",
            Action::ColumnLeft => "Previous column",
            Action::ColumnRight => "Next column",
            Action::FirstRow => "First row",
            Action::LastRow => "Last row",
            Action::NextTab => "Next entry type",
            Action::PrevTab => "Previous entry type",
            Action::NewEntry => "New entry",
            Action::DeleteEntry => "Delete entry",
            Action::EditCell => "Edit selected cell",
            Action::Increment => "Increase progress",
            Action::Decrement => "Decrease progress",
            Action::NewType => "New entry type",
            Action::RenameType => "Rename entry type",
            Action::DeleteType => "Delete entry type",
            Action::Confirm => "Confirm dialog",
            Action::Cancel => "Close dialog",
            Action::ClearInput => "Clear input",
            Action::Yes => "Answer yes",
            Action::No => "Answer no",
        }
    }

    /// Configured key combination string for this action
    pub fn binding(self, keys: &KeyBindings) -> &str {
        match self {
            Action::Quit => &keys.quit,
            Action::Save => &keys.save,
            Action::Help => &keys.help,
            Action::RowUp => &keys.row_up,
            Action::RowDown => &keys.row_down,
            Action::ColumnLeft => &keys.column_left,
            Action::ColumnRight => &keys.column_right,
            Action::FirstRow => &keys.first_row,
            Action::LastRow => &keys.last_row,
            Action::NextTab => &keys.next_tab,
            Action::PrevTab => &keys.prev_tab,
            Action::NewEntry => &keys.new_entry,
            Action::DeleteEntry => &keys.delete_entry,
            Action::EditCell => &keys.edit_cell,
            Action::Increment => &keys.increment,
            Action::Decrement => &keys.decrement,
            Action::NewType => &keys.new_type,
            Action::RenameType => &keys.rename_type,
            Action::DeleteType => &keys.delete_type,
            Action::Confirm => &keys.confirm,
            Action::Cancel => &keys.cancel,
            Action::ClearInput => &keys.clear_input,
            Action::Yes => &keys.yes,
            Action::No => &keys.no,
        }
    }
}

/// Parse every configured binding
pub fn parse(keys: &KeyBindings) -> Result<Vec<(Action, KeyCombination)>, KeyParseError> {
    Action::ALL
        .iter()
        .map(|action| {
            action
                .binding(keys)
                .parse::<KeyCombination>()
                .map(|combination| (*action, combination))
                .map_err(|source| KeyParseError::Binding {
                    action: action.config_name().to_string(),
                    source: Box::new(source),
                })
        })
        .collect()
}

/// Install the configured bindings into `dispatcher`.
/// Nothing is installed if any binding fails to parse.
pub fn apply<C, T>(
    keys: &KeyBindings,
    dispatcher: &mut Dispatcher<C, Action, T>,
) -> Result<(), KeyParseError>
where
    C: Eq + Hash + Clone + Debug,
{
    for (action, combination) in parse(keys)? {
        dispatcher.bind_keys(action, combination);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;

    #[test]
    fn default_bindings_all_parse() {
        let parsed = parse(&KeyBindings::default()).unwrap();
        assert_eq!(parsed.len(), Action::ALL.len());
    }

    #[test]
    fn invalid_binding_names_the_action() {
        let keys = KeyBindings {
            save: "Hyper+s".to_string(),
            ..KeyBindings::default()
        };
        let err = parse(&keys).unwrap_err();
        assert!(err.to_string().contains("save"));
    }

    #[test]
    fn apply_installs_configured_keys() {
        let keys = KeyBindings {
            quit: "Ctrl+q".to_string(),
            ..KeyBindings::default()
        };
        let mut dispatcher: Dispatcher<Caller, Action, u32> = Dispatcher::new();
        apply(&keys, &mut dispatcher).unwrap();
        dispatcher.bind(Caller::Table, Action::Quit, |count: &mut u32| *count += 1);

        let mut count = 0;
        assert!(!dispatcher.press(&Caller::Table, Key::char('q'), &mut count));
        dispatcher.reset();
        assert!(dispatcher.press(&Caller::Table, Key::ctrl('q'), &mut count));
        assert_eq!(count, 1);
        assert_eq!(
            dispatcher.keys_for(&Action::FirstRow),
            Some("g g".parse().unwrap())
        );
    }

    #[test]
    fn only_prompts_use_input_mode() {
        assert_eq!(Caller::Prompt.input_mode(), InputMode::Input);
        assert_eq!(Caller::Table.input_mode(), InputMode::Normal);
    }
}
