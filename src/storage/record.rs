//! Row mapping for the dictionary entities
//!
//! Each entity names its table, its columns (key columns first) and how to
//! move between a row and the struct. The store builds its SQL from these.

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::{
    CrossReference, SourceEntry, SourceEntryNote, SourceWordClass, TargetEntry, TargetWordClass,
    Translation,
};
use crate::{Error, Result};

/// A struct stored as one row of one table
pub trait Record: Sized {
    /// Primary key value(s)
    type Key: std::fmt::Debug;

    const TABLE: &'static str;
    /// All columns, key columns first, in `to_values` order
    const COLUMNS: &'static [&'static str];
    const KEY_COLUMNS: &'static [&'static str];

    fn from_row(row: &Row) -> rusqlite::Result<Self>;

    fn to_values(&self) -> Vec<Value>;

    fn key_values(key: &Self::Key) -> Vec<Value>;

    /// References SQLite cannot enforce by itself, checked before insert
    fn check_references(&self, _conn: &Connection) -> Result<()> {
        Ok(())
    }
}

/// A word-class table whose ids are handed out in insertion order
pub trait ClassRecord: Record<Key = i64> {
    fn new(id: i64, name: String) -> Self;
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

impl Record for SourceWordClass {
    type Key = i64;
    const TABLE: &'static str = "naj_classes";
    const COLUMNS: &'static [&'static str] = &["id", "name"];
    const KEY_COLUMNS: &'static [&'static str] = &["id"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![Value::Integer(self.id), text(&self.name)]
    }

    fn key_values(key: &i64) -> Vec<Value> {
        vec![Value::Integer(*key)]
    }
}

impl ClassRecord for SourceWordClass {
    fn new(id: i64, name: String) -> Self {
        Self { id, name }
    }
}

impl Record for TargetWordClass {
    type Key = i64;
    const TABLE: &'static str = "eng_classes";
    const COLUMNS: &'static [&'static str] = &["id", "name"];
    const KEY_COLUMNS: &'static [&'static str] = &["id"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![Value::Integer(self.id), text(&self.name)]
    }

    fn key_values(key: &i64) -> Vec<Value> {
        vec![Value::Integer(*key)]
    }
}

impl ClassRecord for TargetWordClass {
    fn new(id: i64, name: String) -> Self {
        Self { id, name }
    }
}

impl Record for SourceEntry {
    type Key = String;
    const TABLE: &'static str = "naj";
    const COLUMNS: &'static [&'static str] = &["lemma", "class", "def"];
    const KEY_COLUMNS: &'static [&'static str] = &["lemma"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            lemma: row.get(0)?,
            class_id: row.get(1)?,
            definition: row.get(2)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.lemma),
            Value::Integer(self.class_id),
            text(&self.definition),
        ]
    }

    fn key_values(key: &String) -> Vec<Value> {
        vec![text(key)]
    }
}

impl Record for SourceEntryNote {
    type Key = String;
    const TABLE: &'static str = "naj_notes";
    const COLUMNS: &'static [&'static str] = &["naj", "note"];
    const KEY_COLUMNS: &'static [&'static str] = &["naj"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            lemma: row.get(0)?,
            note: row.get(1)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.lemma), text(&self.note)]
    }

    fn key_values(key: &String) -> Vec<Value> {
        vec![text(key)]
    }
}

impl Record for TargetEntry {
    type Key = (String, i64);
    const TABLE: &'static str = "eng";
    const COLUMNS: &'static [&'static str] = &["lemma", "class"];
    const KEY_COLUMNS: &'static [&'static str] = &["lemma", "class"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            lemma: row.get(0)?,
            class_id: row.get(1)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.lemma), Value::Integer(self.class_id)]
    }

    fn key_values((lemma, class_id): &(String, i64)) -> Vec<Value> {
        vec![text(lemma), Value::Integer(*class_id)]
    }
}

impl Record for Translation {
    type Key = (String, String);
    const TABLE: &'static str = "trans";
    const COLUMNS: &'static [&'static str] = &["naj", "eng", "note"];
    const KEY_COLUMNS: &'static [&'static str] = &["naj", "eng"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            source_lemma: row.get(0)?,
            target_lemma: row.get(1)?,
            note: row.get(2)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            text(&self.source_lemma),
            text(&self.target_lemma),
            text(&self.note),
        ]
    }

    fn key_values((naj, eng): &(String, String)) -> Vec<Value> {
        vec![text(naj), text(eng)]
    }

    // eng.lemma is only unique together with its class
    fn check_references(&self, conn: &Connection) -> Result<()> {
        let found = conn
            .query_row(
                "SELECT 1 FROM eng WHERE lemma = ?1 LIMIT 1",
                [&self.target_lemma],
                |_| Ok(()),
            )
            .optional()?;

        match found {
            Some(()) => Ok(()),
            None => Err(Error::ConstraintViolation(format!(
                "FOREIGN KEY constraint failed: no eng entry `{}`",
                self.target_lemma
            ))),
        }
    }
}

impl Record for CrossReference {
    type Key = (String, String);
    const TABLE: &'static str = "cf";
    const COLUMNS: &'static [&'static str] = &["naj1", "naj2"];
    const KEY_COLUMNS: &'static [&'static str] = &["naj1", "naj2"];

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            lemma1: row.get(0)?,
            lemma2: row.get(1)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![text(&self.lemma1), text(&self.lemma2)]
    }

    fn key_values((naj1, naj2): &(String, String)) -> Vec<Value> {
        vec![text(naj1), text(naj2)]
    }
}
