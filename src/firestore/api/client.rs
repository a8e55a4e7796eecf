use std::collections::BTreeMap;
use std::sync::Arc;

use crate::firestore::error::{invalid_argument, FirestoreResult};
use crate::firestore::model::DocumentKey;
use crate::firestore::remote::datastore::{Datastore, InMemoryDatastore};
use crate::firestore::value::{FirestoreValue, MapValue};

use super::query::{Query, QuerySnapshot};
use super::snapshot::DocumentSnapshot;
use super::Firestore;

/// Runs document reads, writes and queries for one [`Firestore`] handle.
#[derive(Clone)]
pub struct FirestoreClient {
    firestore: Firestore,
    datastore: Arc<dyn Datastore>,
}

impl FirestoreClient {
    pub fn new(firestore: Firestore, datastore: Arc<dyn Datastore>) -> Self {
        Self { firestore, datastore }
    }

    /// Returns a client that stores documents in memory only.
    pub fn with_in_memory(firestore: Firestore) -> Self {
        Self::new(firestore, Arc::new(InMemoryDatastore::new()))
    }

    pub fn firestore(&self) -> &Firestore {
        &self.firestore
    }

    /// Fetches the document at `path`; the snapshot is empty when the
    /// document does not exist.
    pub async fn get_doc(&self, path: &str) -> FirestoreResult<DocumentSnapshot> {
        let key = DocumentKey::from_string(path)?;
        self.datastore.get_document(&key).await
    }

    /// Replaces the document at `path` with `data`.
    pub async fn set_doc(&self, path: &str, data: BTreeMap<String, FirestoreValue>) -> FirestoreResult<()> {
        let key = DocumentKey::from_string(path)?;
        self.datastore.set_document(&key, MapValue::new(data)).await
    }

    /// Executes `query` and returns its results in query order.
    pub async fn get_docs(&self, query: &Query) -> FirestoreResult<QuerySnapshot> {
        self.ensure_same_instance(query.firestore())?;
        let definition = query.definition();
        definition.validate_for_execution()?;
        let documents = self.datastore.run_query(definition).await?;
        log::debug!("query {query} returned {} documents", documents.len());
        Ok(QuerySnapshot::new(query.clone(), documents))
    }

    fn ensure_same_instance(&self, firestore: &Firestore) -> FirestoreResult<()> {
        if self.firestore != *firestore {
            return Err(invalid_argument(
                "Query targets a different Firestore instance than this client",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for FirestoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreClient")
            .field("firestore", &self.firestore)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::api::OrderDirection;
    use crate::firestore::model::DatabaseId;

    fn client() -> FirestoreClient {
        FirestoreClient::with_in_memory(Firestore::new("[DEFAULT]", DatabaseId::default("project")))
    }

    #[tokio::test]
    async fn set_then_get_and_query() {
        let client = client();
        for (id, value) in [("doc1", 1), ("doc2", 2)] {
            let data = BTreeMap::from([("foo".to_string(), FirestoreValue::from_integer(value))]);
            client.set_doc(&format!("firestore/{id}"), data).await.unwrap();
        }

        let snapshot = client.get_doc("firestore/doc2").await.unwrap();
        assert_eq!(snapshot.get("foo").unwrap(), Some(&FirestoreValue::from_integer(2)));

        let query = client
            .firestore()
            .collection("firestore")
            .unwrap()
            .query()
            .order_by("foo", OrderDirection::Descending)
            .unwrap();
        let results = client.get_docs(&query).await.unwrap();
        assert_eq!(results.ids(), vec!["doc2", "doc1"]);
    }

    #[tokio::test]
    async fn rejects_queries_from_other_databases() {
        let other = Firestore::new("[DEFAULT]", DatabaseId::default("elsewhere"));
        let query = other.collection("firestore").unwrap().query();
        let err = client().get_docs(&query).await.unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
    }

    #[tokio::test]
    async fn rejects_queries_from_other_apps_on_same_database() {
        let other = Firestore::new("secondaryFromNative", DatabaseId::default("project"));
        let query = other.collection("firestore").unwrap().query();
        let err = client().get_docs(&query).await.unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
    }

    #[tokio::test]
    async fn limit_to_last_requires_order_by() {
        let client = client();
        let query = client
            .firestore()
            .collection("firestore")
            .unwrap()
            .query()
            .limit_to_last(1)
            .unwrap();
        let err = client.get_docs(&query).await.unwrap_err();
        assert!(err.message().contains("limitToLast()"));
    }
}
