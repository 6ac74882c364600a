//! Database schema definitions and startup reconciliation
//!
//! Tables (all WITHOUT ROWID):
//! - naj_classes(id, name)
//! - eng_classes(id, name)
//! - naj(lemma, class -> naj_classes.id, def)
//! - naj_notes(naj -> naj.lemma, note)
//! - eng(lemma, class -> eng_classes.id), keyed on (lemma, class)
//! - trans(naj -> naj.lemma, eng, note), keyed on (naj, eng)
//! - cf(naj1 -> naj.lemma, naj2 -> naj.lemma)
//!
//! `trans.eng` cannot be a declared foreign key because `eng.lemma` is not
//! unique on its own; the repository checks it on insert instead. An existing
//! database that declares it anyway is rejected by [`SchemaManager::sync`],
//! since SQLite would fail every write to `trans` with a foreign key mismatch.

use rusqlite::Connection;

use crate::{Error, Result};

use self::ColumnType::{Integer, Text};

/// SQLite storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
        }
    }

    fn default_literal(&self) -> &'static str {
        match self {
            ColumnType::Integer => "0",
            ColumnType::Text => "''",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub key: bool,
}

const fn key(name: &'static str, ty: ColumnType) -> ColumnDef {
    ColumnDef { name, ty, key: true }
}

const fn col(name: &'static str, ty: ColumnType) -> ColumnDef {
    ColumnDef { name, ty, key: false }
}

/// `from` references `table(to)`
#[derive(Debug, Clone, Copy)]
pub struct ForeignKeyDef {
    pub from: &'static str,
    pub table: &'static str,
    pub to: &'static str,
}

const fn fk(from: &'static str, table: &'static str, to: &'static str) -> ForeignKeyDef {
    ForeignKeyDef { from, table, to }
}

/// Declared shape of one table
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub foreign_keys: &'static [ForeignKeyDef],
    pub create_sql: &'static str,
}

pub const NAJ_CLASSES: TableDef = TableDef {
    name: "naj_classes",
    columns: &[key("id", Integer), col("name", Text)],
    foreign_keys: &[],
    create_sql: r#"
CREATE TABLE IF NOT EXISTS naj_classes (
    id INTEGER NOT NULL PRIMARY KEY,
    name TEXT NOT NULL
) WITHOUT ROWID
"#,
};

pub const ENG_CLASSES: TableDef = TableDef {
    name: "eng_classes",
    columns: &[key("id", Integer), col("name", Text)],
    foreign_keys: &[],
    create_sql: r#"
CREATE TABLE IF NOT EXISTS eng_classes (
    id INTEGER NOT NULL PRIMARY KEY,
    name TEXT NOT NULL
) WITHOUT ROWID
"#,
};

pub const NAJ: TableDef = TableDef {
    name: "naj",
    columns: &[key("lemma", Text), col("class", Integer), col("def", Text)],
    foreign_keys: &[fk("class", "naj_classes", "id")],
    create_sql: r#"
CREATE TABLE IF NOT EXISTS naj (
    lemma TEXT NOT NULL PRIMARY KEY,
    class INTEGER NOT NULL,
    def TEXT NOT NULL,
    FOREIGN KEY (class) REFERENCES naj_classes(id)
) WITHOUT ROWID
"#,
};

pub const NAJ_NOTES: TableDef = TableDef {
    name: "naj_notes",
    columns: &[key("naj", Text), col("note", Text)],
    foreign_keys: &[fk("naj", "naj", "lemma")],
    create_sql: r#"
CREATE TABLE IF NOT EXISTS naj_notes (
    naj TEXT NOT NULL PRIMARY KEY,
    note TEXT NOT NULL,
    FOREIGN KEY (naj) REFERENCES naj(lemma)
) WITHOUT ROWID
"#,
};

pub const ENG: TableDef = TableDef {
    name: "eng",
    columns: &[key("lemma", Text), key("class", Integer)],
    foreign_keys: &[fk("class", "eng_classes", "id")],
    create_sql: r#"
CREATE TABLE IF NOT EXISTS eng (
    lemma TEXT NOT NULL,
    class INTEGER NOT NULL,
    PRIMARY KEY (lemma, class),
    FOREIGN KEY (class) REFERENCES eng_classes(id)
) WITHOUT ROWID
"#,
};

pub const TRANS: TableDef = TableDef {
    name: "trans",
    columns: &[key("naj", Text), key("eng", Text), col("note", Text)],
    foreign_keys: &[fk("naj", "naj", "lemma")],
    create_sql: r#"
CREATE TABLE IF NOT EXISTS trans (
    naj TEXT NOT NULL,
    eng TEXT NOT NULL,
    note TEXT NOT NULL,
    PRIMARY KEY (naj, eng),
    FOREIGN KEY (naj) REFERENCES naj(lemma)
) WITHOUT ROWID
"#,
};

pub const CF: TableDef = TableDef {
    name: "cf",
    columns: &[key("naj1", Text), key("naj2", Text)],
    foreign_keys: &[fk("naj1", "naj", "lemma"), fk("naj2", "naj", "lemma")],
    create_sql: r#"
CREATE TABLE IF NOT EXISTS cf (
    naj1 TEXT NOT NULL,
    naj2 TEXT NOT NULL,
    PRIMARY KEY (naj1, naj2),
    FOREIGN KEY (naj1) REFERENCES naj(lemma),
    FOREIGN KEY (naj2) REFERENCES naj(lemma)
) WITHOUT ROWID
"#,
};

/// Every table, parents before children
pub const ALL_TABLES: &[TableDef] = &[NAJ_CLASSES, ENG_CLASSES, NAJ, NAJ_NOTES, ENG, TRANS, CF];

/// What `sync` did to each table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: Vec<&'static str>,
    pub altered: Vec<&'static str>,
    pub unchanged: Vec<&'static str>,
}

/// Reconciles the declared tables against an open connection
pub struct SchemaManager<'a> {
    conn: &'a Connection,
}

impl<'a> SchemaManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Bring the database in line with [`ALL_TABLES`]
    ///
    /// Missing tables are created and missing non-key columns are added.
    /// A table lacking one of its key columns, or carrying a foreign key
    /// that is not declared here, cannot be fixed without rebuilding it, so
    /// that is reported as [`Error::Schema`].
    pub fn sync(&self) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for table in ALL_TABLES {
            let existing = self.existing_columns(table.name)?;

            if existing.is_empty() {
                self.conn.execute(table.create_sql, [])?;
                tracing::info!("Created table {}", table.name);
                report.created.push(table.name);
                continue;
            }

            self.check_foreign_keys(table)?;

            let missing: Vec<&ColumnDef> = table
                .columns
                .iter()
                .filter(|c| !existing.iter().any(|e| e.eq_ignore_ascii_case(c.name)))
                .collect();

            if missing.is_empty() {
                tracing::debug!("Table {} is up to date", table.name);
                report.unchanged.push(table.name);
                continue;
            }

            if let Some(column) = missing.iter().find(|c| c.key) {
                return Err(Error::Schema(format!(
                    "table `{}` exists without key column `{}`",
                    table.name, column.name
                )));
            }

            for column in missing {
                let sql = format!(
                    "ALTER TABLE {} ADD COLUMN {} {} NOT NULL DEFAULT {}",
                    table.name,
                    column.name,
                    column.ty.as_sql(),
                    column.ty.default_literal()
                );
                self.conn.execute(&sql, [])?;
                tracing::warn!("Added missing column {}.{}", table.name, column.name);
            }
            report.altered.push(table.name);
        }

        Ok(report)
    }

    fn check_foreign_keys(&self, table: &TableDef) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare(r#"SELECT "from", "table", "to" FROM pragma_foreign_key_list(?1)"#)?;
        let existing = stmt
            .query_map([table.name], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for (from, parent, to) in existing {
            // `to` is NULL when the parent's primary key is referenced implicitly
            let declared = table.foreign_keys.iter().any(|fk| {
                fk.from.eq_ignore_ascii_case(&from)
                    && fk.table.eq_ignore_ascii_case(&parent)
                    && to.as_deref().is_none_or(|to| fk.to.eq_ignore_ascii_case(to))
            });
            if !declared {
                return Err(Error::Schema(format!(
                    "table `{}` has undeclared foreign key {} -> {}({})",
                    table.name,
                    from,
                    parent,
                    to.as_deref().unwrap_or("PRIMARY KEY")
                )));
            }
        }
        Ok(())
    }

    fn existing_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        let report = SchemaManager::new(&conn).sync().unwrap();

        assert_eq!(report.created.len(), ALL_TABLES.len());
        assert!(report.altered.is_empty());

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count as usize, ALL_TABLES.len());
    }

    #[test]
    fn test_sync_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        SchemaManager::new(&conn).sync().unwrap();
        conn.execute("INSERT INTO naj_classes (id, name) VALUES (0, 'Noun')", [])
            .unwrap();

        let report = SchemaManager::new(&conn).sync().unwrap();
        assert!(report.created.is_empty());
        assert_eq!(report.unchanged.len(), ALL_TABLES.len());

        let name: String = conn
            .query_row("SELECT name FROM naj_classes WHERE id = 0", [], |row| row.get(0))
            .unwrap();
        assert_eq!(name, "Noun");
    }

    #[test]
    fn test_missing_plain_column_is_added() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE naj (lemma TEXT NOT NULL PRIMARY KEY, class INTEGER NOT NULL) WITHOUT ROWID",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO naj (lemma, class) VALUES ('cat', 0)", [])
            .unwrap();

        let report = SchemaManager::new(&conn).sync().unwrap();
        assert_eq!(report.altered, vec!["naj"]);

        let def: String = conn
            .query_row("SELECT def FROM naj WHERE lemma = 'cat'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(def, "");
    }

    #[test]
    fn test_missing_key_column_is_fatal() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE cf (naj1 TEXT NOT NULL)", []).unwrap();

        let err = SchemaManager::new(&conn).sync().unwrap_err();
        assert!(matches!(err, Error::Schema(_)), "got {err:?}");
    }

    #[test]
    fn test_undeclared_foreign_key_is_fatal() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
CREATE TABLE eng (
    lemma TEXT NOT NULL,
    class INTEGER NOT NULL,
    PRIMARY KEY (lemma, class)
) WITHOUT ROWID;
CREATE TABLE trans (
    naj TEXT NOT NULL,
    eng TEXT NOT NULL,
    note TEXT NOT NULL,
    PRIMARY KEY (naj, eng),
    FOREIGN KEY (eng) REFERENCES eng(lemma)
) WITHOUT ROWID;
"#,
        )
        .unwrap();

        let err = SchemaManager::new(&conn).sync().unwrap_err();
        match err {
            Error::Schema(msg) => assert!(msg.contains("trans"), "{msg}"),
            other => panic!("got {other:?}"),
        }
    }

    #[test]
    fn test_declared_foreign_keys_pass() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE naj_classes (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             CREATE TABLE naj (
                 lemma TEXT NOT NULL PRIMARY KEY,
                 class INTEGER NOT NULL,
                 def TEXT NOT NULL,
                 FOREIGN KEY (class) REFERENCES naj_classes
             ) WITHOUT ROWID;",
        )
        .unwrap();

        let report = SchemaManager::new(&conn).sync().unwrap();
        assert!(report.unchanged.contains(&"naj"));
        assert!(report.unchanged.contains(&"naj_classes"));
    }
}
