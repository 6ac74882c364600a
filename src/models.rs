//! Dictionary entities
//!
//! One struct per table. Naj is the source language, English the target.

use serde::{Deserialize, Serialize};

/// Grammatical class of a naj headword (noun, verb, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceWordClass {
    pub id: i64,
    pub name: String,
}

/// Grammatical class of an English headword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetWordClass {
    pub id: i64,
    pub name: String,
}

/// A naj headword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub lemma: String,
    pub class_id: i64,
    pub definition: String,
}

impl SourceEntry {
    pub fn new(lemma: impl Into<String>, class_id: i64, definition: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            class_id,
            definition: definition.into(),
        }
    }
}

/// Free-text annotation, at most one per naj entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntryNote {
    pub lemma: String,
    pub note: String,
}

/// An English headword. The same lemma may appear under several classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    pub lemma: String,
    pub class_id: i64,
}

impl TargetEntry {
    pub fn new(lemma: impl Into<String>, class_id: i64) -> Self {
        Self {
            lemma: lemma.into(),
            class_id,
        }
    }
}

/// Directed naj -> English link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub source_lemma: String,
    pub target_lemma: String,
    pub note: String,
}

impl Translation {
    pub fn new(
        source_lemma: impl Into<String>,
        target_lemma: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            source_lemma: source_lemma.into(),
            target_lemma: target_lemma.into(),
            note: note.into(),
        }
    }
}

/// "See also" between two naj entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    pub lemma1: String,
    pub lemma2: String,
}
