pub(crate) const DEFAULT_DATABASE_ID: &str = "(default)";
pub(crate) const DEFAULT_APP_NAME: &str = "[DEFAULT]";
pub(crate) const DOCUMENT_KEY_NAME: &str = "__name__";
