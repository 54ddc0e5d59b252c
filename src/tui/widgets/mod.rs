pub mod color;
pub mod confirm;
pub mod editor;
pub mod entry_table;
pub mod help;
pub mod prompt;
pub mod status_bar;
pub mod tabs;
