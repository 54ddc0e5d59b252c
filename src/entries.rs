use thiserror::Error;
use tracing::{info, warn};

use crate::database::{Database, DatabaseError, EntryMap, TypedEntries};
use crate::models::{Entry, EntryField, EntryType};

/// Rejected mutations. The message is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Entry type name cannot be empty")]
    EmptyTypeName,
    #[error("Entry type '{0}' already exists")]
    DuplicateType(String),
    #[error("Entry type '{0}' does not exist")]
    UnknownType(String),
    #[error("Entry {id} already exists in '{entry_type}'")]
    DuplicateEntry { entry_type: String, id: u64 },
    #[error("Entry {id} does not exist in '{entry_type}'")]
    UnknownEntry { entry_type: String, id: u64 },
    #[error("{0}")]
    InvalidField(String),
}

#[derive(Debug, Error)]
pub enum EntriesError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// In-memory copy of every entry type and its entries.
///
/// Mutations only touch memory; nothing reaches the database until
/// [`save`](Self::save). Dropping the container discards unsaved changes.
pub struct EntriesContainer {
    database: Database,
    types: EntryMap,
    dirty: bool,
}

impl EntriesContainer {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            types: EntryMap::new(),
            dirty: false,
        }
    }

    /// Create a container and fill it from `database`
    pub fn open(database: Database) -> Result<Self, EntriesError> {
        let mut container = Self::new(database);
        container.load()?;
        Ok(container)
    }

    /// Replace the in-memory state with what is stored
    pub fn load(&mut self) -> Result<(), EntriesError> {
        self.types = self.database.load()?;
        self.dirty = false;
        Ok(())
    }

    /// Write the full in-memory state to storage
    pub fn save(&mut self) -> Result<(), EntriesError> {
        self.database.save(&self.types)?;
        self.dirty = false;
        info!(types = self.types.len(), entries = self.total_entries(), "changes saved");
        Ok(())
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of entry types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn total_entries(&self) -> usize {
        self.types.values().map(|typed| typed.entries.len()).sum()
    }

    /// Entry type names in display order
    pub fn type_names(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&TypedEntries> {
        self.types.get(name)
    }

    pub fn entries(&self, name: &str) -> Option<&[Entry]> {
        self.types.get(name).map(|typed| typed.entries.as_slice())
    }

    pub fn entry(&self, name: &str, id: u64) -> Option<&Entry> {
        self.entries(name)?.iter().find(|entry| entry.id == id)
    }

    pub fn as_map(&self) -> &EntryMap {
        &self.types
    }

    pub fn add_type(&mut self, mut entry_type: EntryType) -> Result<(), ValidationError> {
        entry_type.name = self.check_new_name(&entry_type.name)?;
        info!(entry_type = %entry_type.name, "adding entry type");
        self.types.insert(
            entry_type.name.clone(),
            TypedEntries {
                entry_type,
                entries: Vec::new(),
            },
        );
        self.dirty = true;
        Ok(())
    }

    /// Rename a type, keeping its entries. Renaming to the current name is a no-op.
    pub fn rename_type(&mut self, old: &str, new: &str) -> Result<(), ValidationError> {
        if !self.types.contains_key(old) {
            return Err(ValidationError::UnknownType(old.to_string()));
        }
        if new.trim() == old {
            return Ok(());
        }
        let new = self.check_new_name(new)?;
        let Some(mut typed) = self.types.remove(old) else {
            return Err(ValidationError::UnknownType(old.to_string()));
        };
        info!(from = %old, to = %new, "renaming entry type");
        typed.entry_type.name = new.clone();
        self.types.insert(new, typed);
        self.dirty = true;
        Ok(())
    }

    pub fn delete_type(&mut self, name: &str) -> Result<TypedEntries, ValidationError> {
        let removed = self
            .types
            .remove(name)
            .ok_or_else(|| ValidationError::UnknownType(name.to_string()))?;
        info!(entry_type = %name, entries = removed.entries.len(), "deleted entry type");
        self.dirty = true;
        Ok(removed)
    }

    pub fn set_image_query(&mut self, name: &str, image_query: &str) -> Result<(), ValidationError> {
        let typed = self.typed_mut(name)?;
        typed.entry_type.image_query = image_query.to_string();
        self.dirty = true;
        Ok(())
    }

    /// Next free entry id within `name` (ids start at 1)
    pub fn next_entry_id(&self, name: &str) -> Result<u64, ValidationError> {
        let entries = self
            .entries(name)
            .ok_or_else(|| ValidationError::UnknownType(name.to_string()))?;
        Ok(entries.iter().map(|entry| entry.id).max().unwrap_or(0) + 1)
    }

    pub fn add_entry(&mut self, name: &str, entry: Entry) -> Result<(), ValidationError> {
        let typed = self.typed_mut(name)?;
        if typed.entries.iter().any(|existing| existing.id == entry.id) {
            warn!(entry_type = %name, id = entry.id, "rejected duplicate entry id");
            return Err(ValidationError::DuplicateEntry {
                entry_type: name.to_string(),
                id: entry.id,
            });
        }
        typed.entries.push(entry);
        self.dirty = true;
        Ok(())
    }

    /// Replace the entry with the same id
    pub fn update_entry(&mut self, name: &str, entry: Entry) -> Result<(), ValidationError> {
        let slot = self.entry_mut(name, entry.id)?;
        *slot = entry;
        self.dirty = true;
        Ok(())
    }

    pub fn delete_entry(&mut self, name: &str, id: u64) -> Result<Entry, ValidationError> {
        let typed = self.typed_mut(name)?;
        let index = typed
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| ValidationError::UnknownEntry {
                entry_type: name.to_string(),
                id,
            })?;
        let removed = typed.entries.remove(index);
        self.dirty = true;
        Ok(removed)
    }

    /// Parse `input` into one field of an entry
    pub fn set_field(
        &mut self,
        name: &str,
        id: u64,
        field: EntryField,
        input: &str,
    ) -> Result<(), ValidationError> {
        let entry = self.entry_mut(name, id)?;
        field
            .apply(entry, input)
            .map_err(ValidationError::InvalidField)?;
        self.dirty = true;
        Ok(())
    }

    /// Bump the completion counter; stops at the total when one is set
    pub fn increment_progress(&mut self, name: &str, id: u64) -> Result<u32, ValidationError> {
        let entry = self.entry_mut(name, id)?;
        let total = entry.total;
        let next = entry
            .completed
            .checked_add(1)
            .filter(|next| total == 0 || *next <= total);
        let changed = next.is_some();
        if let Some(next) = next {
            entry.completed = next;
            entry.touch();
        }
        let completed = entry.completed;
        self.dirty |= changed;
        Ok(completed)
    }

    pub fn decrement_progress(&mut self, name: &str, id: u64) -> Result<u32, ValidationError> {
        let entry = self.entry_mut(name, id)?;
        let changed = entry.completed > 0;
        if changed {
            entry.completed -= 1;
            entry.touch();
        }
        let completed = entry.completed;
        self.dirty |= changed;
        Ok(completed)
    }

    fn check_new_name(&self, name: &str) -> Result<String, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            warn!("rejected empty entry type name");
            return Err(ValidationError::EmptyTypeName);
        }
        if self.types.contains_key(name) {
            warn!(entry_type = %name, "rejected duplicate entry type name");
            return Err(ValidationError::DuplicateType(name.to_string()));
        }
        Ok(name.to_string())
    }

    fn typed_mut(&mut self, name: &str) -> Result<&mut TypedEntries, ValidationError> {
        self.types
            .get_mut(name)
            .ok_or_else(|| ValidationError::UnknownType(name.to_string()))
    }

    fn entry_mut(&mut self, name: &str, id: u64) -> Result<&mut Entry, ValidationError> {
        self.typed_mut(name)?
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| ValidationError::UnknownEntry {
                entry_type: name.to_string(),
                id,
            })
    }
}
