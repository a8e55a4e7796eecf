use async_trait::async_trait;

use crate::firestore::api::query::QueryDefinition;
use crate::firestore::api::DocumentSnapshot;
use crate::firestore::error::FirestoreResult;
use crate::firestore::model::DocumentKey;
use crate::firestore::value::MapValue;

pub mod in_memory;

/// Executes reads, writes and queries on behalf of a
/// [`FirestoreClient`](crate::firestore::api::FirestoreClient).
///
/// `run_query` returns documents in the order the caller observes them,
/// including for `limit_to_last` queries.
#[async_trait]
pub trait Datastore: Send + Sync + 'static {
    async fn get_document(&self, key: &DocumentKey) -> FirestoreResult<DocumentSnapshot>;

    async fn set_document(&self, key: &DocumentKey, data: MapValue) -> FirestoreResult<()>;

    async fn run_query(&self, query: &QueryDefinition) -> FirestoreResult<Vec<DocumentSnapshot>>;
}

pub use in_memory::InMemoryDatastore;
