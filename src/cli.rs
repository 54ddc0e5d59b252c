use clap::{Parser, Subcommand};
use std::io::{self, Write};
use thiserror::Error;

use crate::entries::{EntriesContainer, EntriesError, ValidationError};
use crate::models::{Entry, EntryType};

#[derive(Parser)]
#[command(name = "mtrack")]
#[command(about = "Track comics, music, videos and anything else you collect")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Create a new entry type
    AddType {
        /// Type name, e.g. "comics"
        name: String,
        /// Search phrase for cover images (defaults to the name)
        #[arg(long)]
        image_query: Option<String>,
    },
    /// Change the image search phrase of a type
    SetImageQuery {
        entry_type: String,
        image_query: String,
    },
    /// Quickly add an entry to an existing type
    AddEntry {
        entry_type: String,
        title: String,
        #[arg(long)]
        status: Option<String>,
        /// Number of episodes/issues/tracks
        #[arg(long)]
        total: Option<u32>,
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        media_type: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List entry types, or the entries of one type
    List { entry_type: Option<String> },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Entries(#[from] EntriesError),
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::Entries(err.into())
    }
}

/// Handle the add-type command
pub fn handle_add_type(
    name: String,
    image_query: Option<String>,
    entries: &mut EntriesContainer,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let name = name.trim();
    let entry_type = match image_query {
        Some(query) => EntryType::with_image_query(name, query),
        None => EntryType::new(name),
    };
    entries.add_type(entry_type)?;
    entries.save()?;
    writeln!(out, "Entry type created successfully")?;
    Ok(())
}

pub fn handle_set_image_query(
    entry_type: &str,
    image_query: &str,
    entries: &mut EntriesContainer,
    out: &mut impl Write,
) -> Result<(), CliError> {
    entries.set_image_query(entry_type, image_query)?;
    entries.save()?;
    writeln!(out, "Image query for '{}' set to '{}'", entry_type, image_query)?;
    Ok(())
}

/// Optional fields for add-entry
#[derive(Debug, Default)]
pub struct NewEntry {
    pub status: Option<String>,
    pub total: Option<u32>,
    pub link: Option<String>,
    pub media_type: Option<String>,
    pub tags: Option<String>,
}

/// Handle the add-entry command
pub fn handle_add_entry(
    entry_type: &str,
    title: String,
    fields: NewEntry,
    entries: &mut EntriesContainer,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let id = entries.next_entry_id(entry_type)?;
    let mut entry = Entry::new(id, title);
    if let Some(status) = fields.status {
        entry.status = status;
    }
    entry.total = fields.total.unwrap_or(0);
    entry.link = fields.link.unwrap_or_default();
    entry.media_type = fields.media_type.unwrap_or_default();
    entry.tags = fields.tags.unwrap_or_default();

    entries.add_entry(entry_type, entry)?;
    entries.save()?;
    writeln!(out, "Entry created successfully (ID: {})", id)?;
    Ok(())
}

/// Handle the list command
pub fn handle_list(
    entry_type: Option<&str>,
    entries: &EntriesContainer,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let Some(name) = entry_type else {
        for name in entries.type_names() {
            let count = entries.entries(&name).map_or(0, <[Entry]>::len);
            writeln!(out, "{} ({})", name, count)?;
        }
        return Ok(());
    };

    let list = entries
        .entries(name)
        .ok_or_else(|| ValidationError::UnknownType(name.to_string()))?;
    for entry in list {
        let progress = if entry.total > 0 {
            format!("{}/{}", entry.completed, entry.total)
        } else {
            entry.completed.to_string()
        };
        writeln!(
            out,
            "{:>4}  {:<10}  {:>7}  {}",
            entry.id, entry.status, progress, entry.title
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use tempfile::TempDir;

    fn container(dir: &TempDir) -> EntriesContainer {
        let db = Database::new(dir.path().join("media.db")).unwrap();
        EntriesContainer::open(db).unwrap()
    }

    fn output(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn commands_persist_between_runs() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();

        let mut entries = container(&dir);
        handle_add_type("comics".to_string(), Some("manga covers".to_string()), &mut entries, &mut out).unwrap();
        let fields = NewEntry {
            total: Some(41),
            tags: Some("seinen".to_string()),
            ..NewEntry::default()
        };
        handle_add_entry("comics", "Berserk".to_string(), fields, &mut entries, &mut out).unwrap();

        // a second process sees the saved state
        let entries = container(&dir);
        let entry = entries.entry("comics", 1).unwrap();
        assert_eq!(entry.title, "Berserk");
        assert_eq!(entry.total, 41);
        assert_eq!(entry.status, "planned");
        assert_eq!(entries.get("comics").unwrap().entry_type.image_query, "manga covers");

        let mut out = Vec::new();
        handle_list(Some("comics"), &entries, &mut out).unwrap();
        assert_eq!(output(out), "   1  planned        0/41  Berserk\n");

        let mut out = Vec::new();
        handle_list(None, &entries, &mut out).unwrap();
        assert_eq!(output(out), "comics (1)\n");
    }

    #[test]
    fn unknown_type_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut entries = container(&dir);
        let mut out = Vec::new();

        let err = handle_add_entry("books", "Dune".to_string(), NewEntry::default(), &mut entries, &mut out)
            .unwrap_err();
        assert_eq!(err.to_string(), "Entry type 'books' does not exist");
        assert!(handle_list(Some("books"), &entries, &mut out).is_err());
        assert!(handle_set_image_query("books", "covers", &mut entries, &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn set_image_query_is_saved() {
        let dir = TempDir::new().unwrap();
        let mut entries = container(&dir);
        let mut out = Vec::new();
        handle_add_type("music".to_string(), None, &mut entries, &mut out).unwrap();
        handle_set_image_query("music", "album art", &mut entries, &mut out).unwrap();

        let entries = container(&dir);
        assert_eq!(entries.get("music").unwrap().entry_type.image_query, "album art");
    }

    #[test]
    fn padded_type_name_is_trimmed_everywhere() {
        let dir = TempDir::new().unwrap();
        let mut entries = container(&dir);
        let mut out = Vec::new();
        handle_add_type("  comics ".to_string(), None, &mut entries, &mut out).unwrap();

        let typed = entries.get("comics").unwrap();
        assert_eq!(typed.entry_type.name, "comics");
        assert_eq!(typed.entry_type.image_query, "comics");
    }
}
