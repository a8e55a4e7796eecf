use std::collections::BTreeMap;

use crate::firestore::error::FirestoreResult;
use crate::firestore::model::{DocumentKey, FieldPath, IntoFieldPath};
use crate::firestore::value::{FirestoreValue, MapValue};

use super::cursor::CursorDocument;
use super::reference::DocumentReference;
use super::Firestore;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SnapshotMetadata {
    from_cache: bool,
    has_pending_writes: bool,
}

impl SnapshotMetadata {
    pub fn new(from_cache: bool, has_pending_writes: bool) -> Self {
        Self {
            from_cache,
            has_pending_writes,
        }
    }

    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    pub fn has_pending_writes(&self) -> bool {
        self.has_pending_writes
    }
}

/// A document read at some point in time. `data` is `None` when the
/// document does not exist.
#[derive(Clone, Debug)]
pub struct DocumentSnapshot {
    key: DocumentKey,
    data: Option<MapValue>,
    metadata: SnapshotMetadata,
}

impl DocumentSnapshot {
    pub fn new(key: DocumentKey, data: Option<MapValue>, metadata: SnapshotMetadata) -> Self {
        Self {
            key,
            data,
            metadata,
        }
    }

    pub fn missing(key: DocumentKey) -> Self {
        Self::new(key, None, SnapshotMetadata::default())
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&BTreeMap<String, FirestoreValue>> {
        self.data.as_ref().map(MapValue::fields)
    }

    pub(crate) fn map_value(&self) -> Option<&MapValue> {
        self.data.as_ref()
    }

    /// Reads a possibly nested field, e.g. `"bar.value"`.
    ///
    /// Returns `Ok(None)` when the document or the field is missing, and an
    /// error only when `field` is not a valid field path.
    pub fn get(&self, field: impl IntoFieldPath) -> FirestoreResult<Option<&FirestoreValue>> {
        let path = field.into_field_path()?;
        Ok(self.data.as_ref().and_then(|data| data.get(&path)))
    }

    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    pub fn id(&self) -> &str {
        self.key.id()
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    pub fn reference(&self, firestore: Firestore) -> FirestoreResult<DocumentReference> {
        DocumentReference::new(firestore, self.key.path().clone())
    }
}

impl CursorDocument for DocumentSnapshot {
    fn exists(&self) -> bool {
        DocumentSnapshot::exists(self)
    }

    fn field(&self, path: &FieldPath) -> Option<FirestoreValue> {
        self.data.as_ref().and_then(|data| data.get(path)).cloned()
    }

    fn key(&self) -> &DocumentKey {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_nested_value() -> DocumentSnapshot {
        let mut bar = BTreeMap::new();
        bar.insert("value".to_string(), FirestoreValue::from_integer(2));
        let mut fields = BTreeMap::new();
        fields.insert("bar".to_string(), FirestoreValue::from_map(bar));
        let key = DocumentKey::from_string("firestore/doc2").unwrap();
        DocumentSnapshot::new(key, Some(MapValue::new(fields)), SnapshotMetadata::new(true, false))
    }

    #[test]
    fn metadata_flags() {
        let snapshot = snapshot_with_nested_value();
        assert!(snapshot.metadata().from_cache());
        assert!(!snapshot.metadata().has_pending_writes());
    }

    #[test]
    fn reads_nested_fields() {
        let snapshot = snapshot_with_nested_value();
        assert_eq!(snapshot.id(), "doc2");
        assert_eq!(
            snapshot.get("bar.value").unwrap(),
            Some(&FirestoreValue::from_integer(2))
        );
        assert_eq!(snapshot.get("bar.other").unwrap(), None);
        assert!(snapshot.get("bar..value").is_err());
    }

    #[test]
    fn missing_document_has_no_fields() {
        let key = DocumentKey::from_string("cities/sf").unwrap();
        let snapshot = DocumentSnapshot::missing(key);
        assert!(!snapshot.exists());
        assert!(snapshot.data().is_none());
        let path = FieldPath::from_dot_separated("name").unwrap();
        assert!(CursorDocument::field(&snapshot, &path).is_none());
    }
}
