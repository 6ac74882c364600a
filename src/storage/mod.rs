//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite file with tables:
//! - naj_classes / eng_classes (word classes per language)
//! - naj, naj_notes (naj headwords and their notes)
//! - eng (English headwords)
//! - trans (naj -> English translations)
//! - cf (cross-references between naj headwords)

pub mod record;
pub mod schema;
pub mod sqlite;

pub use record::{ClassRecord, Record};
pub use schema::{SchemaManager, SyncReport};
pub use sqlite::{DbStats, DictionaryStore};
