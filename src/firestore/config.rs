use serde::Deserialize;

use crate::firestore::constants::DEFAULT_APP_NAME;
use crate::firestore::error::{invalid_argument, missing_project_id, FirestoreResult};
use crate::firestore::model::DatabaseId;

/// Options used to create a [`Firestore`](crate::firestore::api::Firestore) handle.
///
/// Field names follow the camelCase keys of a Firebase web config so a
/// `firebaseConfig` JSON blob can be deserialized directly:
///
/// ```
/// use firestore_query::firestore::FirestoreSettings;
///
/// let settings = FirestoreSettings::from_json(r#"{ "projectId": "demo", "database": "custom" }"#).unwrap();
/// assert_eq!(settings.database_id().unwrap().database(), "custom");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreSettings {
    pub project_id: Option<String>,
    /// Either a bare database name or `projects/{project}/databases/{database}`.
    pub database: Option<String>,
    pub app_name: Option<String>,
}

impl FirestoreSettings {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            ..Default::default()
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn from_json(json: &str) -> FirestoreResult<Self> {
        serde_json::from_str(json)
            .map_err(|err| invalid_argument(format!("Invalid Firestore settings: {err}")))
    }

    pub fn app_name(&self) -> &str {
        self.app_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_APP_NAME)
    }

    pub fn database_id(&self) -> FirestoreResult<DatabaseId> {
        let project_id = self
            .project_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(missing_project_id)?;
        DatabaseId::parse(project_id, self.database.as_deref().unwrap_or_default())
    }
}
