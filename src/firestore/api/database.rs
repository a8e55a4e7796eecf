use std::fmt;
use std::sync::Arc;

use crate::firestore::config::FirestoreSettings;
use crate::firestore::error::FirestoreResult;
use crate::firestore::model::{DatabaseId, ResourcePath};

use super::reference::{CollectionReference, DocumentReference};

/// Handle to one Firestore database as seen by one app instance.
///
/// Equality compares the app name and the database id: two handles built
/// for different apps never compare equal, even when they point at the same
/// project. Queries use this as their identity token.
#[derive(Clone)]
pub struct Firestore {
    inner: Arc<FirestoreInner>,
}

#[derive(Debug, PartialEq, Eq)]
struct FirestoreInner {
    app_name: String,
    database_id: DatabaseId,
}

impl Firestore {
    pub fn new(app_name: impl Into<String>, database_id: DatabaseId) -> Self {
        let inner = FirestoreInner {
            app_name: app_name.into(),
            database_id,
        };
        Self { inner: Arc::new(inner) }
    }

    /// Builds a handle from settings, validating the project and database identifiers.
    pub fn from_settings(settings: &FirestoreSettings) -> FirestoreResult<Self> {
        let database_id = settings.database_id()?;
        log::debug!(
            "creating Firestore handle for app '{}' on projects/{}/databases/{}",
            settings.app_name(),
            database_id.project_id(),
            database_id.database()
        );
        Ok(Self::new(settings.app_name(), database_id))
    }

    /// The name of the app this handle belongs to.
    pub fn app_name(&self) -> &str {
        &self.inner.app_name
    }

    /// The fully qualified database identifier (project + database name).
    pub fn database_id(&self) -> &DatabaseId {
        &self.inner.database_id
    }

    pub fn project_id(&self) -> &str {
        self.inner.database_id.project_id()
    }

    pub fn database(&self) -> &str {
        self.inner.database_id.database()
    }

    /// Creates a `CollectionReference` pointing at `path`.
    ///
    /// The path is interpreted relative to the Firestore root using forward
    /// slashes to separate segments (e.g. `"firestore/isequal/simplechecks"`).
    pub fn collection(&self, path: &str) -> FirestoreResult<CollectionReference> {
        let resource = ResourcePath::from_string(path)?;
        CollectionReference::new(self.clone(), resource)
    }

    /// Creates a `DocumentReference` pointing at `path`.
    pub fn doc(&self, path: &str) -> FirestoreResult<DocumentReference> {
        let resource = ResourcePath::from_string(path)?;
        DocumentReference::new(self.clone(), resource)
    }
}

impl PartialEq for Firestore {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Eq for Firestore {}

impl fmt::Debug for Firestore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Firestore")
            .field("app", &self.inner.app_name)
            .field("project_id", &self.project_id())
            .field("database", &self.database())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_settings_resolves_database() {
        let settings = FirestoreSettings::new("project").with_database("projects/project/databases/custom");
        let firestore = Firestore::from_settings(&settings).unwrap();
        assert_eq!(firestore.app_name(), "[DEFAULT]");
        assert_eq!(firestore.database(), "custom");
    }

    #[test]
    fn identity_includes_app_name() {
        let primary = Firestore::new("[DEFAULT]", DatabaseId::default("project"));
        let same = Firestore::new("[DEFAULT]", DatabaseId::default("project"));
        let secondary = Firestore::new("secondaryFromNative", DatabaseId::default("project"));
        assert_eq!(primary, same);
        assert_eq!(primary, primary.clone());
        assert_ne!(primary, secondary);
    }
}
