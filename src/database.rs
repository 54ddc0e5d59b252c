use rusqlite::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Entry, EntryType};

/// Reserved bucket listing every known entry type, keyed by type name
pub const ENTRY_TYPES_BUCKET: &str = "entries_types";

/// Name of the bucket holding the entries of `type_name`
pub fn entries_bucket(type_name: &str) -> String {
    format!("{}_entries", type_name)
}

/// An entry type together with its entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedEntries {
    pub entry_type: EntryType,
    pub entries: Vec<Entry>,
}

/// Everything the store holds, keyed by entry type name
pub type EntryMap = BTreeMap<String, TypedEntries>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to {action} in {path}: {source}")]
    Transaction {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Failed to {action} bucket '{bucket}': {source}")]
    Bucket {
        action: &'static str,
        bucket: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Failed to encode record '{key}' for bucket '{bucket}': {source}")]
    Encode {
        bucket: String,
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to decode record '{key}' in bucket '{bucket}': {source}")]
    Decode {
        bucket: String,
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Entry type '{entry_type}' is listed but bucket '{bucket}' does not exist")]
    MissingBucket { entry_type: String, bucket: String },
}

/// File-backed bucket store.
///
/// The file is opened for every `save`/`load` and closed again before the
/// call returns, so nothing is held open between operations.
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Point a store at `path`, creating the parent directory if needed.
    /// The file itself is created lazily by the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        Ok(Database { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tx_error(&self, action: &'static str, source: rusqlite::Error) -> DatabaseError {
        DatabaseError::Transaction {
            action,
            path: self.path.clone(),
            source,
        }
    }

    /// Open the file and make sure the bucket tables exist
    fn open(&self) -> Result<Connection, DatabaseError> {
        let conn = Connection::open(&self.path).map_err(|source| DatabaseError::Open {
            path: self.path.clone(),
            source,
        })?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS buckets (
                name    TEXT PRIMARY KEY NOT NULL
            );
            CREATE TABLE IF NOT EXISTS records (
                bucket  TEXT NOT NULL,
                key     TEXT NOT NULL,
                value   TEXT NOT NULL,
                PRIMARY KEY (bucket, key)
            );",
        )
        .map_err(|source| self.tx_error("create tables", source))?;

        Ok(conn)
    }

    /// Overwrite the stored state with `entries`.
    ///
    /// The type list and every type's bucket are deleted and rewritten. All
    /// rewrites share one transaction, so a failure leaves the previous state
    /// in place. Buckets of types that are no longer listed are dropped.
    pub fn save(&self, entries: &EntryMap) -> Result<(), DatabaseError> {
        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .map_err(|source| self.tx_error("begin save", source))?;

        let previous_types: Vec<String> = if bucket_exists(&tx, ENTRY_TYPES_BUCKET)? {
            scan(&tx, ENTRY_TYPES_BUCKET)?
                .into_iter()
                .map(|(key, _)| key)
                .collect()
        } else {
            Vec::new()
        };

        replace_bucket(
            &tx,
            ENTRY_TYPES_BUCKET,
            entries
                .values()
                .map(|typed| (typed.entry_type.name.clone(), &typed.entry_type)),
        )?;

        for typed in entries.values() {
            // An empty bucket is still created so the type survives a reload
            replace_bucket(
                &tx,
                &entries_bucket(&typed.entry_type.name),
                typed.entries.iter().map(|entry| (entry.id.to_string(), entry)),
            )?;
        }

        for name in previous_types.iter().filter(|name| !entries.contains_key(*name)) {
            info!(entry_type = %name, "dropping bucket of removed entry type");
            delete_bucket(&tx, &entries_bucket(name))?;
        }

        tx.commit()
            .map_err(|source| self.tx_error("commit save", source))?;

        debug!(
            path = %self.path.display(),
            types = entries.len(),
            entries = entries.values().map(|t| t.entries.len()).sum::<usize>(),
            "saved entries"
        );
        Ok(())
    }

    /// Read the whole stored state back.
    ///
    /// A store that has never been saved to loads as an empty map. A type
    /// without its entries bucket, or any record that fails to decode, fails
    /// the whole load.
    pub fn load(&self) -> Result<EntryMap, DatabaseError> {
        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .map_err(|source| self.tx_error("begin load", source))?;

        let mut map = EntryMap::new();
        if !bucket_exists(&tx, ENTRY_TYPES_BUCKET)? {
            debug!(path = %self.path.display(), "no entry types stored yet");
            return Ok(map);
        }

        for (key, value) in scan(&tx, ENTRY_TYPES_BUCKET)? {
            let entry_type: EntryType = decode(ENTRY_TYPES_BUCKET, &key, &value)?;
            let bucket = entries_bucket(&entry_type.name);
            if !bucket_exists(&tx, &bucket)? {
                return Err(DatabaseError::MissingBucket {
                    entry_type: entry_type.name,
                    bucket,
                });
            }

            let mut entries = scan(&tx, &bucket)?
                .iter()
                .map(|(key, value)| decode::<Entry>(&bucket, key, value))
                .collect::<Result<Vec<_>, _>>()?;
            entries.sort_by_key(|entry| entry.id);

            map.insert(
                entry_type.name.clone(),
                TypedEntries {
                    entry_type,
                    entries,
                },
            );
        }

        debug!(path = %self.path.display(), types = map.len(), "loaded entries");
        Ok(map)
    }
}

fn bucket_exists(conn: &Connection, bucket: &str) -> Result<bool, DatabaseError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM buckets WHERE name = ?1",
            params![bucket],
            |row| row.get(0),
        )
        .map_err(|source| DatabaseError::Bucket {
            action: "look up",
            bucket: bucket.to_string(),
            source,
        })?;
    Ok(count > 0)
}

fn create_bucket(conn: &Connection, bucket: &str) -> Result<(), DatabaseError> {
    conn.execute("INSERT INTO buckets (name) VALUES (?1)", params![bucket])
        .map_err(|source| DatabaseError::Bucket {
            action: "create",
            bucket: bucket.to_string(),
            source,
        })?;
    Ok(())
}

/// Delete a bucket and its records; absent buckets are ignored
fn delete_bucket(conn: &Connection, bucket: &str) -> Result<(), DatabaseError> {
    let map_err = |source: rusqlite::Error| DatabaseError::Bucket {
        action: "delete",
        bucket: bucket.to_string(),
        source,
    };
    conn.execute("DELETE FROM records WHERE bucket = ?1", params![bucket])
        .map_err(map_err)?;
    conn.execute("DELETE FROM buckets WHERE name = ?1", params![bucket])
        .map_err(map_err)?;
    Ok(())
}

fn put(conn: &Connection, bucket: &str, key: &str, value: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR REPLACE INTO records (bucket, key, value) VALUES (?1, ?2, ?3)",
        params![bucket, key, value],
    )
    .map_err(|source| DatabaseError::Bucket {
        action: "write to",
        bucket: bucket.to_string(),
        source,
    })?;
    Ok(())
}

fn scan(conn: &Connection, bucket: &str) -> Result<Vec<(String, String)>, DatabaseError> {
    let map_err = |source: rusqlite::Error| DatabaseError::Bucket {
        action: "read",
        bucket: bucket.to_string(),
        source,
    };
    let mut stmt = conn
        .prepare("SELECT key, value FROM records WHERE bucket = ?1 ORDER BY key")
        .map_err(map_err)?;
    let rows = stmt
        .query_map(params![bucket], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(map_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(map_err)?;
    Ok(rows)
}

/// Delete and recreate `bucket`, then write every record into it
fn replace_bucket<'r, R>(
    conn: &Connection,
    bucket: &str,
    records: impl IntoIterator<Item = (String, &'r R)>,
) -> Result<(), DatabaseError>
where
    R: Serialize + 'r,
{
    delete_bucket(conn, bucket)?;
    create_bucket(conn, bucket)?;
    for (key, record) in records {
        let value = serde_json::to_string(record).map_err(|source| DatabaseError::Encode {
            bucket: bucket.to_string(),
            key: key.clone(),
            source,
        })?;
        put(conn, bucket, &key, &value)?;
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(bucket: &str, key: &str, value: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(value).map_err(|source| DatabaseError::Decode {
        bucket: bucket.to_string(),
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn typed(name: &str, ids: &[u64]) -> TypedEntries {
        TypedEntries {
            entry_type: EntryType::new(name),
            entries: ids
                .iter()
                .map(|id| Entry::new(*id, format!("{} #{}", name, id)))
                .collect(),
        }
    }

    fn map_of(types: Vec<TypedEntries>) -> EntryMap {
        types
            .into_iter()
            .map(|t| (t.entry_type.name.clone(), t))
            .collect()
    }

    fn temp_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::new(dir.path().join("data").join("app.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn never_written_store_loads_empty() {
        let (_dir, db) = temp_db();
        assert!(db.load().unwrap().is_empty());
    }

    #[test]
    fn empty_map_round_trips() {
        let (_dir, db) = temp_db();
        db.save(&EntryMap::new()).unwrap();
        assert!(db.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips_types_and_entries() {
        let (_dir, db) = temp_db();
        let map = map_of(vec![
            typed("comics", &[1, 2]),
            typed("music", &[10, 3, 7]),
            typed("games", &[]),
        ]);
        db.save(&map).unwrap();

        let loaded = db.load().unwrap();
        assert_eq!(loaded.len(), 3);
        assert!(loaded["games"].entries.is_empty());

        let mut music_ids: Vec<u64> = loaded["music"].entries.iter().map(|e| e.id).collect();
        music_ids.sort();
        assert_eq!(music_ids, vec![3, 7, 10]);

        for (name, typed) in &map {
            let mut expected = typed.entries.clone();
            expected.sort_by_key(|e| e.id);
            assert_eq!(loaded[name].entries, expected);
            assert_eq!(loaded[name].entry_type, typed.entry_type);
        }
    }

    #[test]
    fn save_overwrites_whole_buckets() {
        let (_dir, db) = temp_db();
        db.save(&map_of(vec![typed("videos", &[1, 2, 3])])).unwrap();
        db.save(&map_of(vec![typed("videos", &[2])])).unwrap();

        let loaded = db.load().unwrap();
        let ids: Vec<u64> = loaded["videos"].entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn removed_type_loses_its_bucket() {
        let (_dir, db) = temp_db();
        db.save(&map_of(vec![typed("comics", &[1]), typed("music", &[1])]))
            .unwrap();
        db.save(&map_of(vec![typed("comics", &[1])])).unwrap();

        let conn = db.open().unwrap();
        assert!(!bucket_exists(&conn, &entries_bucket("music")).unwrap());
        assert!(bucket_exists(&conn, &entries_bucket("comics")).unwrap());
    }

    #[test]
    fn missing_entries_bucket_is_an_error() {
        let (_dir, db) = temp_db();
        db.save(&map_of(vec![typed("comics", &[1]), typed("music", &[2])]))
            .unwrap();

        let conn = db.open().unwrap();
        delete_bucket(&conn, &entries_bucket("music")).unwrap();
        drop(conn);

        match db.load() {
            Err(DatabaseError::MissingBucket { entry_type, bucket }) => {
                assert_eq!(entry_type, "music");
                assert_eq!(bucket, "music_entries");
            }
            other => panic!("expected MissingBucket, got {:?}", other),
        }
    }

    #[test]
    fn corrupt_record_aborts_load() {
        let (_dir, db) = temp_db();
        db.save(&map_of(vec![typed("comics", &[1, 2])])).unwrap();

        let conn = db.open().unwrap();
        put(&conn, "comics_entries", "2", "{not json").unwrap();
        drop(conn);

        let err = db.load().unwrap_err();
        assert!(matches!(err, DatabaseError::Decode { ref key, .. } if key == "2"));
        assert!(err.to_string().contains("comics_entries"));
    }

    #[test]
    fn entries_are_keyed_by_decimal_id() {
        let (_dir, db) = temp_db();
        db.save(&map_of(vec![typed("music", &[42])])).unwrap();

        let conn = db.open().unwrap();
        let records = scan(&conn, "music_entries").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, "42");
        let types = scan(&conn, ENTRY_TYPES_BUCKET).unwrap();
        assert_eq!(types[0].0, "music");
    }

    #[test]
    fn type_names_with_quotes_and_spaces_are_fine() {
        let (_dir, db) = temp_db();
        let map = map_of(vec![typed("light \"novels\"", &[5])]);
        db.save(&map).unwrap();
        assert_eq!(db.load().unwrap(), map);
    }

    #[test]
    fn failed_save_keeps_previous_state() {
        let (_dir, db) = temp_db();
        let before = map_of(vec![typed("comics", &[1, 2])]);
        db.save(&before).unwrap();

        // writes into the music bucket abort after comics was already rewritten
        db.open()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_music BEFORE INSERT ON records
                 WHEN NEW.bucket = 'music_entries'
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();

        let err = db
            .save(&map_of(vec![typed("comics", &[3]), typed("music", &[1])]))
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Bucket { action: "write to", .. }));
        assert_eq!(db.load().unwrap(), before);
    }

    #[test]
    fn transaction_errors_name_the_operation() {
        let err = DatabaseError::Transaction {
            action: "commit save",
            path: PathBuf::from("media.db"),
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.to_string().starts_with("Failed to commit save in media.db"));
    }
}
