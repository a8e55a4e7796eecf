use crate::firestore::constants::DEFAULT_DATABASE_ID;
use crate::firestore::error::{invalid_argument, FirestoreResult};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DatabaseId {
    project_id: String,
    database: String,
}

impl DatabaseId {
    pub fn new(project_id: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: database.into(),
        }
    }

    pub fn default(project_id: impl Into<String>) -> Self {
        Self::new(project_id, DEFAULT_DATABASE_ID)
    }

    /// Resolves a database identifier for `project_id`.
    ///
    /// Accepts either a bare database name (`"custom"`) or a fully qualified
    /// `projects/{project}/databases/{database}` resource name.
    pub fn parse(project_id: &str, identifier: &str) -> FirestoreResult<Self> {
        if identifier.is_empty() {
            return Ok(Self::default(project_id));
        }
        if identifier.starts_with("projects/") {
            let segments: Vec<_> = identifier.split('/').collect();
            if segments.len() == 4 && segments[2] == "databases" && !segments[1].is_empty() && !segments[3].is_empty() {
                return Ok(Self::new(segments[1], segments[3]));
            }
            return Err(invalid_argument(
                "Database identifier must follow projects/{project}/databases/{database}",
            ));
        }
        Ok(Self::new(project_id, identifier))
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn is_default_database(&self) -> bool {
        self.database == DEFAULT_DATABASE_ID
    }
}
