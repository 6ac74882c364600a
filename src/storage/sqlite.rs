//! SQLite storage implementation

use std::path::Path;
use std::time::Duration;

use rusqlite::{params_from_iter, Connection, OptionalExtension, TransactionBehavior};

use super::record::{ClassRecord, Record};
use super::schema::{SchemaManager, SyncReport};
use crate::models::{
    CrossReference, SourceEntry, SourceEntryNote, SourceWordClass, TargetEntry, TargetWordClass,
    Translation,
};
use crate::{Error, Result};

/// How long a writer waits on another connection's lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed storage for the dictionary
pub struct DictionaryStore {
    conn: Connection,
}

impl DictionaryStore {
    /// Open a database file (creates if doesn't exist) and reconcile its schema
    pub fn open(path: &Path) -> Result<Self> {
        let (store, _) = Self::open_and_sync(path)?;
        Ok(store)
    }

    /// Like [`DictionaryStore::open`], also returning what the schema sync did
    ///
    /// Missing parent directories of `path` are created first.
    pub fn open_and_sync(path: &Path) -> Result<(Self, SyncReport)> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let store = Self::connect(path)?;
        let report = store.sync_schema()?;
        Ok((store, report))
    }

    /// Open a database file without touching its schema
    pub fn connect(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::configure(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let store = Self::configure(Connection::open_in_memory()?)?;
        store.sync_schema()?;
        Ok(store)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Reconcile the declared tables against this database
    pub fn sync_schema(&self) -> Result<SyncReport> {
        SchemaManager::new(&self.conn).sync()
    }

    #[cfg(test)]
    pub(crate) fn conn_for_tests(&self) -> &Connection {
        &self.conn
    }

    // ========== Generic Record Operations ==========

    /// Full scan in storage order
    pub fn get_all<E: Record>(&self) -> Result<Vec<E>> {
        let sql = format!("SELECT {} FROM {}", E::COLUMNS.join(", "), E::TABLE);
        let mut stmt = self.conn.prepare(&sql)?;

        let rows = stmt
            .query_map([], |row| E::from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Point lookup by primary key
    pub fn get<E: Record>(&self, key: &E::Key) -> Result<E> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {}",
            E::COLUMNS.join(", "),
            E::TABLE,
            key_predicate(E::KEY_COLUMNS)
        );

        self.conn
            .query_row(&sql, params_from_iter(E::key_values(key)), |row| E::from_row(row))
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("{} with key {:?}", E::TABLE, key)))
    }

    /// Count rows
    pub fn count<E: Record>(&self) -> Result<usize> {
        count_rows(&self.conn, E::TABLE)
    }

    /// Insert a new row
    ///
    /// Duplicate keys and dangling references fail with
    /// [`Error::ConstraintViolation`].
    pub fn insert<E: Record>(&mut self, record: &E) -> Result<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        record.check_references(&tx)?;
        tx.execute(&insert_sql::<E>(), params_from_iter(record.to_values()))?;

        tx.commit()?;
        Ok(())
    }

    /// Append a word class whose id is the current row count
    ///
    /// The count and the insert share one write transaction, so two callers
    /// can never be handed the same id.
    pub fn add_class<C: ClassRecord>(&mut self, name: &str) -> Result<C> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let id = count_rows(&tx, C::TABLE)? as i64;
        let class = C::new(id, name.to_string());
        tx.execute(&insert_sql::<C>(), params_from_iter(class.to_values()))?;

        tx.commit()?;
        tracing::debug!("Added {} {} = {:?}", C::TABLE, id, name);
        Ok(class)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            naj_classes: self.count::<SourceWordClass>()?,
            eng_classes: self.count::<TargetWordClass>()?,
            naj: self.count::<SourceEntry>()?,
            naj_notes: self.count::<SourceEntryNote>()?,
            eng: self.count::<TargetEntry>()?,
            translations: self.count::<Translation>()?,
            cross_references: self.count::<CrossReference>()?,
        })
    }
}

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count as usize)
}

fn key_predicate(columns: &[&str]) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", c, i + 1))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn insert_sql<E: Record>() -> String {
    let placeholders = (1..=E::COLUMNS.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        E::TABLE,
        E::COLUMNS.join(", "),
        placeholders
    )
}

/// Row counts per table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbStats {
    pub naj_classes: usize,
    pub eng_classes: usize,
    pub naj: usize,
    pub naj_notes: usize,
    pub eng: usize,
    pub translations: usize,
    pub cross_references: usize,
}

impl DbStats {
    /// (label, count) pairs in display order
    pub fn rows(&self) -> [(&'static str, usize); 7] {
        [
            ("Naj classes", self.naj_classes),
            ("English classes", self.eng_classes),
            ("Naj entries", self.naj),
            ("Naj notes", self.naj_notes),
            ("English entries", self.eng),
            ("Translations", self.translations),
            ("Cross-references", self.cross_references),
        ]
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        for (label, count) in self.rows() {
            writeln!(f, "  {}: {}", label, count)?;
        }
        Ok(())
    }
}
