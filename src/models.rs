use serde::{Deserialize, Serialize};

/// Timestamp format used for `created_at` / `updated_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// One tracked media item (a comic, an album, a series...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: u64,
    pub status: String,       // planned, watching, completed, dropped...
    pub title: String,
    pub completed: u32,
    pub total: u32,
    pub score: u8,
    pub link: String,
    pub description: String,
    pub comment: String,
    pub tags: String,
    pub media_type: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A user-defined category of entries ("comics", "music"...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryType {
    pub name: String,
    pub image_query: String,
}

impl Entry {
    pub fn new(id: u64, title: String) -> Self {
        let now = now_timestamp();
        Self {
            id,
            status: "planned".to_string(),
            title,
            completed: 0,
            total: 0,
            score: 0,
            link: String::new(),
            description: String::new(),
            comment: String::new(),
            tags: String::new(),
            media_type: String::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }
}

impl EntryType {
    /// New type whose image query defaults to its name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            image_query: name.clone(),
            name,
        }
    }

    pub fn with_image_query(name: impl Into<String>, image_query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_query: image_query.into(),
        }
    }
}

/// Editable columns of an entry, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryField {
    Status,
    Title,
    Completed,
    Total,
    Score,
    MediaType,
    Link,
    Tags,
    Description,
    Comment,
}

impl EntryField {
    pub const ALL: [EntryField; 10] = [
        EntryField::Status,
        EntryField::Title,
        EntryField::Completed,
        EntryField::Total,
        EntryField::Score,
        EntryField::MediaType,
        EntryField::Link,
        EntryField::Tags,
        EntryField::Description,
        EntryField::Comment,
    ];

    pub fn title(self) -> &'static str {
        match self {
            EntryField::Status => "Status",
            EntryField::Title => "Title",
            EntryField::Completed => "Done",
            EntryField::Total => "Total",
            EntryField::Score => "Score",
            EntryField::MediaType => "Media",
            EntryField::Link => "Link",
            EntryField::Tags => "Tags",
            EntryField::Description => "Description",
            EntryField::Comment => "Comment",
        }
    }

    pub fn value(self, entry: &Entry) -> String {
        match self {
            EntryField::Status => entry.status.clone(),
            EntryField::Title => entry.title.clone(),
            EntryField::Completed => entry.completed.to_string(),
            EntryField::Total => entry.total.to_string(),
            EntryField::Score => entry.score.to_string(),
            EntryField::MediaType => entry.media_type.clone(),
            EntryField::Link => entry.link.clone(),
            EntryField::Tags => entry.tags.clone(),
            EntryField::Description => entry.description.clone(),
            EntryField::Comment => entry.comment.clone(),
        }
    }

    /// Parse `input` into this field of `entry`.
    ///
    /// Numeric fields reject non-numbers, and the completion counter may not
    /// run past a non-zero total. The entry is left untouched on error.
    pub fn apply(self, entry: &mut Entry, input: &str) -> Result<(), String> {
        let input = input.trim();
        match self {
            EntryField::Status => entry.status = input.to_string(),
            EntryField::Title => entry.title = input.to_string(),
            EntryField::Completed => {
                let completed = parse_number::<u32>(self, input)?;
                if entry.total > 0 && completed > entry.total {
                    return Err(format!(
                        "Done ({}) cannot exceed Total ({})",
                        completed, entry.total
                    ));
                }
                entry.completed = completed;
            }
            EntryField::Total => {
                let total = parse_number::<u32>(self, input)?;
                if total > 0 && entry.completed > total {
                    return Err(format!(
                        "Total ({}) cannot be below Done ({})",
                        total, entry.completed
                    ));
                }
                entry.total = total;
            }
            EntryField::Score => entry.score = parse_number::<u8>(self, input)?,
            EntryField::MediaType => entry.media_type = input.to_string(),
            EntryField::Link => entry.link = input.to_string(),
            EntryField::Tags => entry.tags = input.to_string(),
            EntryField::Description => entry.description = input.to_string(),
            EntryField::Comment => entry.comment = input.to_string(),
        }
        entry.touch();
        Ok(())
    }
}

fn parse_number<N: std::str::FromStr>(field: EntryField, input: &str) -> Result<N, String> {
    let input = if input.is_empty() { "0" } else { input };
    input
        .parse::<N>()
        .map_err(|_| format!("{} must be a non-negative number, got '{}'", field.title(), input))
}
