//! In-process full-text index.
//!
//! A small term-frequency index standing in for an external search
//! cluster. Documents live in a per-table map; scoring is the summed
//! frequency of the query terms across a document's fields. Ties rank the
//! newer (higher) id first, matching the newest-first bias of the feeds.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use pagination::PageRequest;

use crate::domain::ports::{RankedIds, SearchIndex, SearchIndexError};

type Document = Vec<(String, String)>;

/// In-memory implementation of the `SearchIndex` port.
#[derive(Debug, Default)]
pub struct InMemorySearchIndex {
    tables: Mutex<HashMap<String, BTreeMap<i32, Document>>>,
    offline: AtomicBool,
}

impl InMemorySearchIndex {
    /// An empty index with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backend being unreachable; every call fails until the
    /// index is brought back online.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of documents indexed for a table.
    pub fn document_count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .map(|tables| tables.get(table).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    fn check_online(&self) -> Result<(), SearchIndexError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SearchIndexError::backend("search backend is offline"));
        }
        Ok(())
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, BTreeMap<i32, Document>>>, SearchIndexError>
    {
        self.tables
            .lock()
            .map_err(|_| SearchIndexError::backend("search index lock poisoned"))
    }
}

fn tokenise(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_owned)
        .collect()
}

fn score(document: &Document, terms: &[String]) -> usize {
    document
        .iter()
        .map(|(_, value)| {
            let tokens = tokenise(value);
            terms
                .iter()
                .map(|term| tokens.iter().filter(|token| *token == term).count())
                .sum::<usize>()
        })
        .sum()
}

impl SearchIndex for InMemorySearchIndex {
    fn upsert(
        &self,
        table: &str,
        id: i32,
        fields: &[(String, String)],
    ) -> Result<(), SearchIndexError> {
        self.check_online()?;
        let mut tables = self.lock()?;
        tables
            .entry(table.to_owned())
            .or_default()
            .insert(id, fields.to_vec());
        Ok(())
    }

    fn remove(&self, table: &str, id: i32) -> Result<(), SearchIndexError> {
        self.check_online()?;
        let mut tables = self.lock()?;
        if let Some(documents) = tables.get_mut(table) {
            documents.remove(&id);
        }
        Ok(())
    }

    fn query(
        &self,
        table: &str,
        text: &str,
        page: PageRequest,
    ) -> Result<RankedIds, SearchIndexError> {
        self.check_online()?;
        let tables = self.lock()?;
        let Some(documents) = tables.get(table) else {
            return Err(SearchIndexError::index_missing(table));
        };

        let terms = tokenise(text);
        let mut matches: Vec<(usize, i32)> = documents
            .iter()
            .filter_map(|(id, document)| {
                let score = score(document, &terms);
                (score > 0).then_some((score, *id))
            })
            .collect();
        matches.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

        let total = matches.len() as u64;
        let ids = matches
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|(_, id)| id)
            .collect();
        Ok(RankedIds { ids, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn doc(body: &str) -> Document {
        vec![("body".to_owned(), body.to_owned())]
    }

    #[rstest]
    fn query_against_an_unknown_table_reports_index_missing() {
        let index = InMemorySearchIndex::new();
        let err = index
            .query("posts", "hello", PageRequest::first())
            .expect_err("missing");
        assert_eq!(err, SearchIndexError::index_missing("posts"));
    }

    #[rstest]
    fn ranks_by_term_frequency_then_newest_id() {
        let index = InMemorySearchIndex::new();
        index.upsert("posts", 1, &doc("hello hello world")).expect("indexed");
        index.upsert("posts", 2, &doc("hello world")).expect("indexed");
        index.upsert("posts", 3, &doc("goodbye world")).expect("indexed");
        index.upsert("posts", 4, &doc("hello there")).expect("indexed");

        let ranked = index
            .query("posts", "hello", PageRequest::first())
            .expect("ranked");
        assert_eq!(ranked.ids, vec![1, 4, 2]);
        assert_eq!(ranked.total, 3);
    }

    #[rstest]
    fn matching_is_case_insensitive_and_punctuation_blind() {
        let index = InMemorySearchIndex::new();
        index.upsert("posts", 1, &doc("Hello, World!")).expect("indexed");

        let ranked = index
            .query("posts", "hello", PageRequest::first())
            .expect("ranked");
        assert_eq!(ranked.ids, vec![1]);
    }

    #[rstest]
    fn pagination_slices_the_ranked_ids_but_keeps_the_total() {
        let index = InMemorySearchIndex::new();
        for id in 1..=5 {
            index.upsert("posts", id, &doc("common term")).expect("indexed");
        }

        let ranked = index
            .query("posts", "common", PageRequest::new(2, 2))
            .expect("ranked");
        assert_eq!(ranked.ids, vec![3, 2]);
        assert_eq!(ranked.total, 5);
    }

    #[rstest]
    fn removal_is_idempotent() {
        let index = InMemorySearchIndex::new();
        index.upsert("posts", 1, &doc("hello")).expect("indexed");
        index.remove("posts", 1).expect("removed");
        index.remove("posts", 1).expect("still fine");
        assert_eq!(index.document_count("posts"), 0);
    }

    #[rstest]
    fn offline_index_fails_every_call() {
        let index = InMemorySearchIndex::new();
        index.set_offline(true);
        assert!(index.upsert("posts", 1, &doc("hello")).is_err());
        assert!(index.query("posts", "hello", PageRequest::first()).is_err());

        index.set_offline(false);
        index.upsert("posts", 1, &doc("hello")).expect("back online");
    }
}
