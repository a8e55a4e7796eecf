use std::fmt::{Display, Formatter};

use crate::firestore::constants::DOCUMENT_KEY_NAME;
use crate::firestore::error::{invalid_argument, FirestoreResult};

const RESERVED_CHARACTERS: &[char] = &['~', '*', '/', '[', ']'];

/// A path to a (possibly nested) field inside a document.
///
/// The reserved single segment `__name__` addresses the document key itself
/// and is exposed through [`FieldPath::document_id`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn new<S, I>(segments: I) -> FirestoreResult<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(invalid_argument(
                "Invalid field path. Provided names must not be empty.",
            ));
        }
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(invalid_argument(
                "Invalid field path. Field names must not be empty.",
            ));
        }
        Ok(Self { segments })
    }

    /// Parses a dot separated path such as `bar.value`.
    ///
    /// Rejects empty paths, empty segments (`foo..bar`, `.foo`, `foo.`) and
    /// paths containing any of `~ * / [ ]`.
    pub fn from_dot_separated(path: &str) -> FirestoreResult<Self> {
        if path.trim().is_empty() {
            return Err(invalid_argument("Invalid field path. Field path string cannot be empty."));
        }
        if path.contains(RESERVED_CHARACTERS) {
            return Err(invalid_argument(format!(
                "Invalid field path ({path}). Paths must not contain '~', '*', '/', '[', or ']'"
            )));
        }
        if path.starts_with('.') || path.ends_with('.') || path.contains("..") {
            return Err(invalid_argument(format!(
                "Invalid field path ({path}). Paths must not be empty, begin with '.', end with '.', or contain '..'"
            )));
        }
        if path == DOCUMENT_KEY_NAME {
            return Ok(Self::document_id());
        }
        FieldPath::new(path.split('.'))
    }

    pub fn last_segment(&self) -> &str {
        self.segments
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn canonical_string(&self) -> String {
        self.segments.join(".")
    }

    pub fn document_id() -> Self {
        Self {
            segments: vec![DOCUMENT_KEY_NAME.to_string()],
        }
    }

    /// Whether this path is the document key sentinel.
    pub fn is_key_field(&self) -> bool {
        self.segments.len() == 1 && self.segments[0] == DOCUMENT_KEY_NAME
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical_string())
    }
}

/// Trait that converts common user inputs into a validated [`FieldPath`].
pub trait IntoFieldPath {
    fn into_field_path(self) -> FirestoreResult<FieldPath>;
}

impl IntoFieldPath for FieldPath {
    fn into_field_path(self) -> FirestoreResult<FieldPath> {
        Ok(self)
    }
}

impl<'a> IntoFieldPath for &'a FieldPath {
    fn into_field_path(self) -> FirestoreResult<FieldPath> {
        Ok(self.clone())
    }
}

impl IntoFieldPath for String {
    fn into_field_path(self) -> FirestoreResult<FieldPath> {
        FieldPath::from_dot_separated(&self)
    }
}

impl<'a> IntoFieldPath for &'a str {
    fn into_field_path(self) -> FirestoreResult<FieldPath> {
        FieldPath::from_dot_separated(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_dot_path() {
        let field = FieldPath::from_dot_separated("foo.bar").unwrap();
        assert_eq!(field.segments(), &["foo", "bar"]);
        assert_eq!(field.to_string(), "foo.bar");
    }

    #[test]
    fn rejects_malformed_paths() {
        for path in ["", "  ", "foo..bar", ".foo", "foo.", "foo/bar", "a[0]", "b*", "~c"] {
            let err = FieldPath::from_dot_separated(path).unwrap_err();
            assert_eq!(err.code_str(), "firestore/invalid-argument", "path {path:?}");
        }
    }

    #[test]
    fn rejects_empty_segment_lists() {
        assert!(FieldPath::new(Vec::<String>::new()).is_err());
        assert!(FieldPath::new(["foo", ""]).is_err());
    }

    #[test]
    fn recognises_document_id_sentinel() {
        let parsed = FieldPath::from_dot_separated("__name__").unwrap();
        assert!(parsed.is_key_field());
        assert_eq!(parsed, FieldPath::document_id());
        assert!(!FieldPath::from_dot_separated("foo").unwrap().is_key_field());
    }
}
