//! Persistence of learned value tables.
//!
//! A table is stored as its list of rows, keyed by a caller-chosen name.

use crate::error::StorageError;
use crate::learner::QTable;
use log::info;
use std::collections::HashMap;
use std::path::PathBuf;

/// Somewhere value tables can be saved to and loaded from.
pub trait TableStore {
    /// Saves `table` under `name`, replacing any previous table.
    fn save(&mut self, name: &str, table: &QTable) -> Result<(), StorageError>;

    /// Loads the table saved under `name`.
    ///
    /// Fails if there is no such table or it is malformed; no default is made up.
    fn load(&self, name: &str) -> Result<QTable, StorageError>;

    /// Zeroes `table` and immediately saves it under `name`.
    fn reset(&mut self, name: &str, table: &mut QTable) -> Result<(), StorageError> {
        table.clear();
        self.save(name, table)
    }
}

/// Stores each table as a JSON file in a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store in `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The path of the file holding the table called `name`.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl TableStore for FileStore {
    fn save(&mut self, name: &str, table: &QTable) -> Result<(), StorageError> {
        let rows: Vec<&[f64]> = table.rows().collect();
        let json = serde_json::to_vec(&rows)?;
        let path = self.path(name);
        std::fs::write(&path, json)?;
        info!("saved table {:?} to {}", name, path.display());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<QTable, StorageError> {
        let path = self.path(name);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::Missing(name.to_owned()))
            }
            Err(err) => return Err(err.into()),
        };
        let rows: Vec<Vec<f64>> = serde_json::from_slice(&bytes)?;
        let table = checked_table(rows)?;
        info!("loaded table {:?} from {}", name, path.display());
        Ok(table)
    }
}

/// Keeps tables in memory, in their serialised form.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored bytes of `name`, e.g. to simulate corruption.
    pub fn insert_raw(&mut self, name: &str, bytes: Vec<u8>) {
        self.blobs.insert(name.to_owned(), bytes);
    }
}

impl TableStore for MemoryStore {
    fn save(&mut self, name: &str, table: &QTable) -> Result<(), StorageError> {
        let rows: Vec<&[f64]> = table.rows().collect();
        self.blobs.insert(name.to_owned(), serde_json::to_vec(&rows)?);
        Ok(())
    }

    fn load(&self, name: &str) -> Result<QTable, StorageError> {
        let bytes = self
            .blobs
            .get(name)
            .ok_or_else(|| StorageError::Missing(name.to_owned()))?;
        checked_table(serde_json::from_slice(bytes)?)
    }
}

/// Checks that `rows` form a table with one row per action over every state.
fn checked_table(rows: Vec<Vec<f64>>) -> Result<QTable, StorageError> {
    let expected = QTable::new().shape();
    let found = (rows.len(), rows.first().map_or(0, Vec::len));
    if found != expected {
        return Err(StorageError::Shape { expected, found });
    }
    QTable::from_rows(rows).ok_or(StorageError::Shape { expected, found })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learner::{Turn, STATE_COUNT};

    fn sample_table() -> QTable {
        let mut table = QTable::new();
        table.set(Turn::Left, 0, -100.0);
        table.set(Turn::Straight, 12345, 0.1 + 0.2);
        table.set(Turn::Right, STATE_COUNT - 1, 1.0 / 3.0);
        table.set(Turn::Right, 42, f64::MIN_POSITIVE);
        table
    }

    #[test]
    fn memory_round_trip_is_exact() {
        let mut store = MemoryStore::new();
        let table = sample_table();
        store.save("q", &table).unwrap();
        let loaded = store.load("q").unwrap();
        assert_eq!(loaded, table);
        assert_eq!(
            loaded.get(Turn::Straight, 12345).to_bits(),
            (0.1f64 + 0.2).to_bits()
        );
    }

    #[test]
    fn missing_and_malformed_tables_fail() {
        let mut store = MemoryStore::new();
        assert!(matches!(store.load("q"), Err(StorageError::Missing(_))));
        store.insert_raw("q", b"not json".to_vec());
        assert!(matches!(store.load("q"), Err(StorageError::Format(_))));
        store.insert_raw("q", b"[[1.0, 2.0]]".to_vec());
        assert!(matches!(
            store.load("q"),
            Err(StorageError::Shape { found: (1, 2), .. })
        ));
    }

    #[test]
    fn reset_zeroes_and_saves() {
        let mut store = MemoryStore::new();
        let mut table = sample_table();
        store.reset("q", &mut table).unwrap();
        assert_eq!(table, QTable::new());
        assert_eq!(store.load("q").unwrap(), QTable::new());
    }

    #[test]
    fn file_round_trip() {
        let dir = std::env::temp_dir().join(format!("lane-sim-store-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut store = FileStore::new(&dir);
        let table = sample_table();
        store.save("round_trip", &table).unwrap();
        assert_eq!(store.load("round_trip").unwrap(), table);
        assert!(matches!(store.load("absent"), Err(StorageError::Missing(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
