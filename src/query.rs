//! Dictionary lookups
//!
//! Provides the operations behind the HTTP API:
//! - Regex search over naj lemmas
//! - Listing naj word classes
//! - Appending a naj word class

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{SourceEntry, SourceWordClass};
use crate::pattern::LemmaPattern;
use crate::storage::DictionaryStore;
use crate::Result;

/// One search result as sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub lemma: String,
    pub word_class: String,
    pub def: String,
}

/// Lookup operations over a store
pub struct Lookup<'a> {
    store: &'a mut DictionaryStore,
}

impl<'a> Lookup<'a> {
    pub fn new(store: &'a mut DictionaryStore) -> Self {
        Self { store }
    }

    /// Naj entries whose lemma contains a match for `pattern`
    ///
    /// Results keep the table's scan order. A pattern that does not compile
    /// matches every entry.
    pub fn search(&self, pattern: &str) -> Result<Vec<SearchHit>> {
        let pattern = LemmaPattern::compile(pattern);

        let mut hits = Vec::new();
        for entry in self.store.get_all::<SourceEntry>()? {
            if !pattern.is_match(&entry.lemma) {
                continue;
            }
            let class: SourceWordClass = self.store.get(&entry.class_id)?;
            hits.push(SearchHit {
                lemma: entry.lemma,
                word_class: class.name,
                def: entry.definition,
            });
        }

        Ok(hits)
    }

    /// All naj word classes, keyed by the decimal id
    pub fn word_classes(&self) -> Result<BTreeMap<String, String>> {
        Ok(self
            .store
            .get_all::<SourceWordClass>()?
            .into_iter()
            .map(|c| (c.id.to_string(), c.name))
            .collect())
    }

    /// Append a naj word class, returning it with its assigned id
    pub fn add_word_class(&mut self, name: &str) -> Result<SourceWordClass> {
        self.store.add_class(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn seeded_store() -> DictionaryStore {
        let mut store = DictionaryStore::open_in_memory().unwrap();
        store.add_class::<SourceWordClass>("Noun").unwrap();
        store.add_class::<SourceWordClass>("Verb").unwrap();
        store.insert(&SourceEntry::new("cat", 0, "a feline")).unwrap();
        store.insert(&SourceEntry::new("run", 1, "to move fast")).unwrap();
        store
    }

    fn hit(lemma: &str, word_class: &str, def: &str) -> SearchHit {
        SearchHit {
            lemma: lemma.to_string(),
            word_class: word_class.to_string(),
            def: def.to_string(),
        }
    }

    #[test]
    fn test_search_anchored_pattern() {
        let mut store = seeded_store();
        let hits = Lookup::new(&mut store).search("^c").unwrap();
        assert_eq!(hits, vec![hit("cat", "Noun", "a feline")]);
    }

    #[test]
    fn test_search_json_shape() {
        let mut store = seeded_store();
        let hits = Lookup::new(&mut store).search("^c").unwrap();
        assert_eq!(
            serde_json::to_string(&hits).unwrap(),
            r#"[{"lemma":"cat","word_class":"Noun","def":"a feline"}]"#
        );
    }

    #[test]
    fn test_invalid_pattern_returns_everything() {
        let mut store = seeded_store();
        let lookup = Lookup::new(&mut store);

        let all = lookup.search("").unwrap();
        assert_eq!(
            all,
            vec![hit("cat", "Noun", "a feline"), hit("run", "Verb", "to move fast")]
        );
        assert_eq!(lookup.search("[").unwrap(), all);
        assert_eq!(lookup.search("(unclosed").unwrap(), all);
    }

    #[test]
    fn test_search_matches_substrings() {
        let mut store = seeded_store();
        store.insert(&SourceEntry::new("scatter", 1, "to spread")).unwrap();

        let lemmas: Vec<String> = Lookup::new(&mut store)
            .search("cat")
            .unwrap()
            .into_iter()
            .map(|h| h.lemma)
            .collect();
        assert_eq!(lemmas, vec!["cat", "scatter"]);
    }

    #[test]
    fn test_search_with_no_matches() {
        let mut store = seeded_store();
        assert!(Lookup::new(&mut store).search("^z").unwrap().is_empty());
    }

    #[test]
    fn test_word_classes_mapping() {
        let mut store = seeded_store();
        let classes = Lookup::new(&mut store).word_classes().unwrap();

        assert_eq!(classes.len(), 2);
        assert_eq!(classes["0"], "Noun");
        assert_eq!(classes["1"], "Verb");
    }

    #[test]
    fn test_add_then_list() {
        let mut store = DictionaryStore::open_in_memory().unwrap();
        let mut lookup = Lookup::new(&mut store);

        assert_eq!(lookup.add_word_class("Noun").unwrap().id, 0);
        assert_eq!(lookup.add_word_class("Verb").unwrap().id, 1);

        let classes = lookup.word_classes().unwrap();
        assert_eq!(classes.get("0").map(String::as_str), Some("Noun"));
        assert_eq!(classes.get("1").map(String::as_str), Some("Verb"));
    }

    #[test]
    fn test_dangling_class_fails_search() {
        let mut store = seeded_store();
        store.conn_for_tests().pragma_update(None, "foreign_keys", "OFF").unwrap();
        store.insert(&SourceEntry::new("ghost", 7, "no class")).unwrap();

        let err = Lookup::new(&mut store).search("gh").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "got {err:?}");
    }
}
