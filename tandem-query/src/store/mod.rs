//! Data stores: where shaped requests are executed.

mod memory;

pub use memory::MemoryStore;

use crate::error::QueryResult;
use crate::record::Record;
use crate::request::LoadRequest;

/// Executes load requests.
///
/// One call to [`execute`](DataStore::execute) performs the root load and
/// every batch load the request's prefetches describe; the returned records
/// carry all eagerly loaded relations.
pub trait DataStore: Send + Sync {
    /// Load the records a request describes.
    fn execute(&self, request: &LoadRequest) -> QueryResult<Vec<Record>>;

    /// Load the first record a request describes, if any.
    fn first(&self, request: &LoadRequest) -> QueryResult<Option<Record>> {
        let request = request.clone().with_limit(1);
        Ok(self.execute(&request)?.into_iter().next())
    }
}

/// Counters of the work a store has done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of executed requests.
    pub loads: u64,
    /// Number of table scans: one per request plus one per prefetch level.
    pub queries: u64,
}
