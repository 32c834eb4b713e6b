//! Search index synchronisation.
//!
//! The relational store is the source of truth; the external index mirrors
//! the declared searchable fields of selected tables. Writes stage their
//! index changes in an [`IndexBatch`] during the unit of work, and the
//! transaction-boundary code flushes the batch only after the relational
//! commit succeeds. A rolled-back transaction simply drops its batch.
//!
//! Index failures degrade search quality, never correctness: a failed
//! flush is logged and swallowed, and a missing index soft-fails queries to
//! an empty result.

use std::sync::Arc;

use tracing::warn;

use pagination::PageRequest;

use super::error::Error;
use super::ports::{RankedIds, SearchIndex, SearchIndexError};

/// Capability interface for records mirrored into the search index.
pub trait Searchable {
    /// Relational table (and index namespace) the record belongs to.
    const TABLE: &'static str;

    /// Primary key of the record.
    fn search_id(&self) -> i32;

    /// The `(field, value)` pairs mirrored into the index.
    fn search_fields(&self) -> Vec<(String, String)>;
}

#[derive(Debug, Clone)]
struct StagedUpsert {
    table: &'static str,
    id: i32,
    fields: Vec<(String, String)>,
}

/// Unit-of-work accumulator for search index changes.
///
/// A batch collects the dirty searchable records of one transaction. It is
/// inert until handed to [`SearchService::flush`]; dropping it discards the
/// staged changes, which is exactly the rollback behaviour.
#[derive(Debug, Default)]
pub struct IndexBatch {
    upserts: Vec<StagedUpsert>,
    removals: Vec<(&'static str, i32)>,
}

impl IndexBatch {
    /// An empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a record for insertion or update.
    pub fn stage_upsert<T: Searchable>(&mut self, record: &T) {
        self.upserts.push(StagedUpsert {
            table: T::TABLE,
            id: record.search_id(),
            fields: record.search_fields(),
        });
    }

    /// Stage a record for removal by primary key.
    pub fn stage_remove<T: Searchable>(&mut self, id: i32) {
        self.removals.push((T::TABLE, id));
    }

    /// Whether nothing was staged.
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.removals.is_empty()
    }
}

/// Pushes staged changes to the external index and serves ranked lookups.
#[derive(Clone)]
pub struct SearchService<I> {
    index: Arc<I>,
}

impl<I> SearchService<I>
where
    I: SearchIndex,
{
    /// Create a service over the external index adapter.
    pub fn new(index: Arc<I>) -> Self {
        Self { index }
    }

    /// Flush a committed transaction's staged changes to the index.
    ///
    /// Failures are logged and swallowed: the relational commit has already
    /// happened and must not be reported as failed because the index
    /// lagged.
    pub fn flush(&self, batch: IndexBatch) {
        for staged in &batch.upserts {
            if let Err(error) = self.index.upsert(staged.table, staged.id, &staged.fields) {
                warn!(
                    table = staged.table,
                    id = staged.id,
                    %error,
                    "search index upsert failed; index now lags the store"
                );
            }
        }
        for (table, id) in &batch.removals {
            if let Err(error) = self.index.remove(table, *id) {
                warn!(
                    table,
                    id,
                    %error,
                    "search index removal failed; index now lags the store"
                );
            }
        }
    }

    /// Ranked primary-key lookup for one table.
    ///
    /// Soft-fails to an empty result when the index does not exist yet or
    /// the backend is unreachable.
    pub fn query<T: Searchable>(&self, text: &str, page: PageRequest) -> RankedIds {
        match self.index.query(T::TABLE, text, page) {
            Ok(ranked) => ranked,
            Err(SearchIndexError::IndexMissing { table }) => {
                warn!(table, "search index missing; serving empty results");
                RankedIds::default()
            }
            Err(error) => {
                warn!(%error, "search backend failure; serving empty results");
                RankedIds::default()
            }
        }
    }

    /// Rebuild the index for one table from the authoritative rows.
    ///
    /// Used for recovery after index loss; unlike [`SearchService::flush`]
    /// a backend failure here is surfaced, because the caller asked for the
    /// rebuild explicitly.
    pub fn reindex<T: Searchable>(&self, records: &[T]) -> Result<(), Error> {
        for record in records {
            self.index
                .upsert(T::TABLE, record.search_id(), &record.search_fields())
                .map_err(|err| {
                    Error::service_unavailable(format!("search reindex failed: {err}"))
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockSearchIndex;
    use mockall::predicate::eq;
    use rstest::rstest;

    struct Doc {
        id: i32,
        body: String,
    }

    impl Searchable for Doc {
        const TABLE: &'static str = "docs";

        fn search_id(&self) -> i32 {
            self.id
        }

        fn search_fields(&self) -> Vec<(String, String)> {
            vec![("body".to_owned(), self.body.clone())]
        }
    }

    #[rstest]
    fn flush_pushes_upserts_and_removals() {
        let mut index = MockSearchIndex::new();
        index
            .expect_upsert()
            .with(eq("docs"), eq(7), mockall::predicate::always())
            .times(1)
            .returning(|_, _, _| Ok(()));
        index
            .expect_remove()
            .with(eq("docs"), eq(9))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut batch = IndexBatch::new();
        batch.stage_upsert(&Doc {
            id: 7,
            body: "hello".to_owned(),
        });
        batch.stage_remove::<Doc>(9);
        assert!(!batch.is_empty());

        SearchService::new(Arc::new(index)).flush(batch);
    }

    #[rstest]
    fn flush_swallows_index_failures() {
        let mut index = MockSearchIndex::new();
        index
            .expect_upsert()
            .times(1)
            .returning(|_, _, _| Err(SearchIndexError::backend("down")));

        let mut batch = IndexBatch::new();
        batch.stage_upsert(&Doc {
            id: 1,
            body: "hello".to_owned(),
        });

        // Must not panic or surface the failure.
        SearchService::new(Arc::new(index)).flush(batch);
    }

    #[rstest]
    fn query_soft_fails_missing_index_to_empty() {
        let mut index = MockSearchIndex::new();
        index
            .expect_query()
            .times(1)
            .returning(|_, _, _| Err(SearchIndexError::index_missing("docs")));

        let ranked =
            SearchService::new(Arc::new(index)).query::<Doc>("hello", PageRequest::first());
        assert_eq!(ranked, RankedIds::default());
    }

    #[rstest]
    fn reindex_surfaces_backend_failures() {
        let mut index = MockSearchIndex::new();
        index
            .expect_upsert()
            .times(1)
            .returning(|_, _, _| Err(SearchIndexError::backend("down")));

        let service = SearchService::new(Arc::new(index));
        let records = vec![Doc {
            id: 1,
            body: "hello".to_owned(),
        }];
        let err = service.reindex(&records).expect_err("surfaced");
        assert_eq!(err.code(), crate::domain::ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    fn dropped_batch_flushes_nothing() {
        let mut index = MockSearchIndex::new();
        index.expect_upsert().times(0);

        let mut batch = IndexBatch::new();
        batch.stage_upsert(&Doc {
            id: 1,
            body: "rolled back".to_owned(),
        });
        drop(batch);

        // The index is untouched; drop is the rollback path.
        let _service = SearchService::new(Arc::new(index));
    }
}
