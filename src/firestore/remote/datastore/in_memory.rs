use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::firestore::api::query::QueryDefinition;
use crate::firestore::api::{DocumentSnapshot, SnapshotMetadata};
use crate::firestore::error::FirestoreResult;
use crate::firestore::model::DocumentKey;
use crate::firestore::query_evaluator::apply_query_to_documents;
use crate::firestore::value::MapValue;

use super::Datastore;

/// Keeps documents in process memory. Clones share the same store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDatastore {
    documents: Arc<Mutex<BTreeMap<DocumentKey, MapValue>>>,
}

impl InMemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, BTreeMap<DocumentKey, MapValue>> {
        self.documents.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

#[async_trait]
impl Datastore for InMemoryDatastore {
    async fn get_document(&self, key: &DocumentKey) -> FirestoreResult<DocumentSnapshot> {
        let data = self.store().get(key).cloned();
        Ok(DocumentSnapshot::new(
            key.clone(),
            data,
            SnapshotMetadata::new(true, false),
        ))
    }

    async fn set_document(&self, key: &DocumentKey, data: MapValue) -> FirestoreResult<()> {
        self.store().insert(key.clone(), data);
        Ok(())
    }

    async fn run_query(&self, query: &QueryDefinition) -> FirestoreResult<Vec<DocumentSnapshot>> {
        let candidates: Vec<DocumentSnapshot> = {
            let store = self.store();
            store
                .iter()
                .filter(|(key, _)| query.matches_collection(key))
                .map(|(key, data)| {
                    DocumentSnapshot::new(
                        key.clone(),
                        Some(data.clone()),
                        SnapshotMetadata::new(true, false),
                    )
                })
                .collect()
        };
        let scanned = candidates.len();
        let documents = apply_query_to_documents(candidates, query);
        log::debug!(
            "in-memory query on {} scanned {scanned} documents, returned {}",
            query.collection_path(),
            documents.len()
        );
        Ok(documents)
    }
}
