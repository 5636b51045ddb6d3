//! SQLite persistence backend using rusqlite.
//!
//! Each notebook is one row holding its JSON document. WAL mode is the
//! default so readers are not blocked by the writer.
//!
//! [`NotebookRepository::modify`] runs in a `BEGIN IMMEDIATE` transaction,
//! so separate processes opening the same file serialize their
//! read-merge-write cycles on SQLite's write lock.
//!
//! # Example
//!
//! ```no_run
//! use solvent::Notebook;
//! use solvent_store::{NotebookRepository, SqliteRepository};
//!
//! let repo = SqliteRepository::open("notebooks.db").unwrap();
//! let notebook = Notebook::new().unwrap();
//! repo.store(&notebook).unwrap();
//!
//! assert_eq!(repo.fetch(notebook.id()).unwrap(), notebook);
//! ```

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use solvent::dto::NotebookDto;
use solvent::Notebook;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::traits::NotebookRepository;

/// SQLite configuration options.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// SQLite journal mode. Defaults to WAL.
    pub journal_mode: JournalMode,
    /// Busy timeout in milliseconds. Defaults to 5000.
    pub busy_timeout_ms: u32,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            journal_mode: JournalMode::Wal,
            busy_timeout_ms: 5000,
        }
    }
}

/// SQLite journal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    /// Write-ahead logging; readers proceed during writes.
    Wal,
    /// Traditional rollback journal.
    Delete,
    /// In-memory journal, no crash recovery.
    Memory,
}

impl JournalMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Wal => "WAL",
            Self::Delete => "DELETE",
            Self::Memory => "MEMORY",
        }
    }
}

/// SQLite notebook repository.
///
/// Wraps a `rusqlite::Connection` behind a `Mutex`. The schema is created on
/// first open.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open (or create) a database at `path` with the default config.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, SqliteConfig::default())
    }

    /// Open with custom configuration.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: SqliteConfig) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        Self::init_connection(&conn, &config)?;
        Self::create_schema(&conn)?;
        tracing::debug!(path = %path.display(), ?config, "opened sqlite repository");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(&conn, &SqliteConfig::default())?;
        Self::create_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// The journal mode SQLite actually applied.
    pub fn journal_mode(&self) -> Result<String> {
        let conn = self.lock()?;
        let mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
        Ok(mode)
    }

    fn init_connection(conn: &Connection, config: &SqliteConfig) -> Result<()> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = {};
             PRAGMA busy_timeout = {};
             PRAGMA synchronous = NORMAL;",
            config.journal_mode.as_str(),
            config.busy_timeout_ms,
        ))?;
        Ok(())
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS notebooks (
                id    TEXT PRIMARY KEY NOT NULL,
                data  TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn encode(notebook: &Notebook) -> Result<String> {
        Ok(serde_json::to_string(&NotebookDto::from(notebook))?)
    }

    fn decode(data: &str) -> Result<Notebook> {
        let dto: NotebookDto = serde_json::from_str(data)?;
        Ok(Notebook::try_from(dto)?)
    }

    fn read_row(conn: &Connection, id: Uuid) -> Result<Option<Notebook>> {
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM notebooks WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        data.as_deref().map(Self::decode).transpose()
    }

    fn write_row(conn: &Connection, notebook: &Notebook) -> Result<()> {
        let data = Self::encode(notebook)?;
        conn.execute(
            "INSERT INTO notebooks (id, data)
             VALUES (?1, ?2)
             ON CONFLICT(id)
             DO UPDATE SET data = excluded.data",
            params![notebook.id().to_string(), data],
        )?;
        Ok(())
    }
}

impl NotebookRepository for SqliteRepository {
    fn store(&self, notebook: &Notebook) -> Result<()> {
        let conn = self.lock()?;
        Self::write_row(&conn, notebook)
    }

    fn update(&self, notebook: &Notebook) -> Result<()> {
        let data = Self::encode(notebook)?;
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE notebooks SET data = ?2 WHERE id = ?1",
            params![notebook.id().to_string(), data],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { id: notebook.id() });
        }
        Ok(())
    }

    fn fetch(&self, id: Uuid) -> Result<Notebook> {
        let conn = self.lock()?;
        Self::read_row(&conn, id)?.ok_or(StoreError::NotFound { id })
    }

    fn modify<F>(&self, id: Uuid, f: F) -> Result<Notebook>
    where
        F: FnOnce(Option<Notebook>) -> Result<Notebook>,
    {
        let mut conn = self.lock()?;
        // Dropping the transaction without commit rolls it back.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let next = f(Self::read_row(&tx, id)?)?;
        Self::write_row(&tx, &next)?;
        tx.commit()?;
        Ok(next)
    }

    fn remove(&self, id: Uuid) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM notebooks WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(())
    }

    fn ids(&self) -> Result<Vec<Uuid>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id FROM notebooks ORDER BY id")?;
        let raw = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let ids = raw
            .iter()
            .filter_map(|s| match Uuid::parse_str(s) {
                Ok(id) => Some(id),
                Err(err) => {
                    tracing::warn!(row = %s, error = %err, "skipping row with malformed id");
                    None
                }
            })
            .collect();
        Ok(ids)
    }

    fn exists(&self, id: Uuid) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM notebooks WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_repo() -> SqliteRepository {
        SqliteRepository::open_in_memory().unwrap()
    }

    fn sample() -> Notebook {
        let mut notebook = Notebook::new().unwrap();
        let list = notebook.add_list("Groceries").unwrap();
        let milk = list.add_item("Milk").unwrap();
        let eggs = list.add_item("Eggs").unwrap();
        list.check_item(milk).unwrap();
        list.remove_item(eggs);
        notebook
    }

    #[test]
    fn store_fetch_remove() {
        let repo = test_repo();
        let notebook = sample();

        repo.store(&notebook).unwrap();
        assert_eq!(repo.fetch(notebook.id()).unwrap(), notebook);
        assert!(repo.exists(notebook.id()).unwrap());

        repo.remove(notebook.id()).unwrap();
        assert!(repo.fetch(notebook.id()).unwrap_err().is_not_found());
        assert!(!repo.exists(notebook.id()).unwrap());
    }

    #[test]
    fn store_overwrites() {
        let repo = test_repo();
        let mut notebook = sample();
        repo.store(&notebook).unwrap();

        notebook.add_list("Chores").unwrap();
        repo.store(&notebook).unwrap();

        assert_eq!(repo.fetch(notebook.id()).unwrap().get_lists().len(), 2);
        assert_eq!(repo.ids().unwrap().len(), 1);
    }

    #[test]
    fn update_missing_is_not_found() {
        let repo = test_repo();
        let notebook = sample();

        let err = repo.update(&notebook).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id } if id == notebook.id()));
    }

    #[test]
    fn tombstones_survive_storage() {
        let repo = test_repo();
        let notebook = sample();
        repo.store(&notebook).unwrap();

        let restored = repo.fetch(notebook.id()).unwrap();
        let list = restored.get_lists()[0];
        assert_eq!(list.get_items().len(), 1);
        assert_eq!(list.items().tombstone_set().len(), 1);
    }

    #[test]
    fn ids_are_sorted() {
        let repo = test_repo();
        for _ in 0..4 {
            repo.store(&Notebook::new().unwrap()).unwrap();
        }
        let ids = repo.ids().unwrap();
        assert_eq!(ids.len(), 4);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn open_file_based() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notebooks.db");
        let notebook = sample();

        {
            let repo = SqliteRepository::open(&path).unwrap();
            repo.store(&notebook).unwrap();
        }

        let repo = SqliteRepository::open(&path).unwrap();
        assert_eq!(repo.fetch(notebook.id()).unwrap(), notebook);
    }

    #[test]
    fn modify_holds_the_write_lock_against_other_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.db");
        let repo = SqliteRepository::open(&path).unwrap();
        let impatient = SqliteConfig {
            busy_timeout_ms: 0,
            ..SqliteConfig::default()
        };
        let other = SqliteRepository::open_with_config(&path, impatient).unwrap();

        let notebook = sample();
        repo.store(&notebook).unwrap();
        let mut competing = notebook.clone();
        competing.add_list("Chores").unwrap();

        repo.modify(notebook.id(), |stored| {
            let mut stored = stored.unwrap();
            assert!(matches!(
                other.update(&competing),
                Err(StoreError::Sqlite(_))
            ));
            stored.add_list("Errands")?;
            Ok(stored)
        })
        .unwrap();

        let stored = other.fetch(notebook.id()).unwrap();
        let mut titles: Vec<_> = stored
            .get_lists()
            .iter()
            .map(|list| list.title().value.clone())
            .collect();
        titles.sort();
        assert_eq!(titles, ["Errands", "Groceries"]);
    }

    #[test]
    fn failed_modify_rolls_back() {
        let repo = test_repo();
        let err = repo
            .modify(Uuid::from_u128(9), |stored| {
                assert!(stored.is_none());
                Err(StoreError::NotFound { id: Uuid::from_u128(9) })
            })
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(repo.ids().unwrap().is_empty());
    }

    #[test]
    fn rows_hold_only_id_and_document() {
        let repo = test_repo();
        let conn = repo.lock().unwrap();
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('notebooks')").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(columns, ["id", "data"]);
    }

    #[test]
    fn wal_mode_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepository::open(dir.path().join("wal.db")).unwrap();
        assert_eq!(repo.journal_mode().unwrap().to_lowercase(), "wal");
    }

    #[test]
    fn custom_journal_mode() {
        let dir = tempfile::tempdir().unwrap();
        let config = SqliteConfig {
            journal_mode: JournalMode::Delete,
            ..SqliteConfig::default()
        };
        let repo = SqliteRepository::open_with_config(dir.path().join("delete.db"), config).unwrap();
        assert_eq!(repo.journal_mode().unwrap().to_lowercase(), "delete");
    }
}
