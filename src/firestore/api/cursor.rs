use std::fmt;
use std::sync::Arc;

use crate::firestore::error::{invalid_argument, FirestoreResult};
use crate::firestore::model::{DocumentKey, FieldPath};
use crate::firestore::value::{FirestoreValue, ValueKind};

use super::query::{Bound, OrderBy, QueryDefinition};
use super::snapshot::DocumentSnapshot;

/// The view of a document a cursor needs: existence, field lookup and the
/// document's own key.
///
/// Implemented by [`DocumentSnapshot`]; other snapshot types can implement
/// it to be used with `start_at` and friends.
pub trait CursorDocument: Send + Sync + fmt::Debug {
    fn exists(&self) -> bool;

    fn field(&self, path: &FieldPath) -> Option<FirestoreValue>;

    fn key(&self) -> &DocumentKey;
}

/// One argument passed to `start_at`, `start_after`, `end_at` or `end_before`.
#[derive(Clone, Debug)]
pub enum CursorArgument {
    Value(FirestoreValue),
    Snapshot(Arc<dyn CursorDocument>),
}

impl CursorArgument {
    pub fn snapshot<D>(document: D) -> Self
    where
        D: CursorDocument + 'static,
    {
        CursorArgument::Snapshot(Arc::new(document))
    }
}

impl From<FirestoreValue> for CursorArgument {
    fn from(value: FirestoreValue) -> Self {
        CursorArgument::Value(value)
    }
}

impl From<&FirestoreValue> for CursorArgument {
    fn from(value: &FirestoreValue) -> Self {
        CursorArgument::Value(value.clone())
    }
}

impl From<bool> for CursorArgument {
    fn from(value: bool) -> Self {
        CursorArgument::Value(value.into())
    }
}

impl From<i32> for CursorArgument {
    fn from(value: i32) -> Self {
        CursorArgument::Value(value.into())
    }
}

impl From<i64> for CursorArgument {
    fn from(value: i64) -> Self {
        CursorArgument::Value(value.into())
    }
}

impl From<f64> for CursorArgument {
    fn from(value: f64) -> Self {
        CursorArgument::Value(value.into())
    }
}

impl From<&str> for CursorArgument {
    fn from(value: &str) -> Self {
        CursorArgument::Value(value.into())
    }
}

impl From<String> for CursorArgument {
    fn from(value: String) -> Self {
        CursorArgument::Value(value.into())
    }
}

impl From<DocumentSnapshot> for CursorArgument {
    fn from(snapshot: DocumentSnapshot) -> Self {
        CursorArgument::snapshot(snapshot)
    }
}

impl From<&DocumentSnapshot> for CursorArgument {
    fn from(snapshot: &DocumentSnapshot) -> Self {
        CursorArgument::snapshot(snapshot.clone())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CursorMethod {
    StartAt,
    StartAfter,
    EndAt,
    EndBefore,
}

impl CursorMethod {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            CursorMethod::StartAt => "startAt",
            CursorMethod::StartAfter => "startAfter",
            CursorMethod::EndAt => "endAt",
            CursorMethod::EndBefore => "endBefore",
        }
    }

    pub(crate) fn is_start(&self) -> bool {
        matches!(self, CursorMethod::StartAt | CursorMethod::StartAfter)
    }

    fn inclusive(&self) -> bool {
        matches!(self, CursorMethod::StartAt | CursorMethod::EndAt)
    }
}

/// Cursor arguments after deciding, once, which form the caller used.
enum CursorSource {
    Document(Arc<dyn CursorDocument>),
    Values(Vec<FirestoreValue>),
}

fn resolve_arguments(arguments: Vec<CursorArgument>) -> FirestoreResult<CursorSource> {
    let count = arguments.len();
    let mut values = Vec::with_capacity(count);
    for argument in arguments {
        match argument {
            CursorArgument::Snapshot(document) if count == 1 => {
                return Ok(CursorSource::Document(document));
            }
            CursorArgument::Snapshot(_) => {
                return Err(invalid_argument(
                    "Expected DocumentSnapshot or list of field values as arguments, not both",
                ));
            }
            CursorArgument::Value(value) => values.push(value),
        }
    }
    if values.is_empty() {
        return Err(invalid_argument(
            "Expected a DocumentSnapshot or list of field values but got undefined",
        ));
    }
    Ok(CursorSource::Values(values))
}

pub(crate) fn bound_from_arguments(
    definition: &QueryDefinition,
    method: CursorMethod,
    arguments: Vec<CursorArgument>,
) -> FirestoreResult<Bound> {
    let values = match resolve_arguments(arguments)? {
        CursorSource::Document(document) => values_from_document(definition, document.as_ref())?,
        CursorSource::Values(values) => values_from_fields(definition, method, values)?,
    };
    Ok(Bound::new(values, method.inclusive()))
}

/// Reads one value per normalized ordering clause from `document`, so the
/// cursor also pins the document key as the final tie-breaker.
fn values_from_document(
    definition: &QueryDefinition,
    document: &dyn CursorDocument,
) -> FirestoreResult<Vec<FirestoreValue>> {
    if !document.exists() {
        return Err(invalid_argument(
            "Can't use a DocumentSnapshot that doesn't exist for startAt(), startAfter(), endAt() or endBefore().",
        ));
    }

    definition
        .normalized_order_by()
        .iter()
        .map(|order| {
            if order.field().is_key_field() {
                return Ok(FirestoreValue::from_reference(document.key().path().clone()));
            }
            document.field(order.field()).ok_or_else(|| {
                invalid_argument(format!(
                    "Invalid query. You are trying to start or end a query using a document for which the field '{}' (used as the orderBy) does not exist.",
                    order.field()
                ))
            })
        })
        .collect()
}

fn values_from_fields(
    definition: &QueryDefinition,
    method: CursorMethod,
    values: Vec<FirestoreValue>,
) -> FirestoreResult<Vec<FirestoreValue>> {
    let order_by = definition.explicit_order_by();
    if values.len() > order_by.len() {
        return Err(invalid_argument(format!(
            "Too many arguments provided to {}(). The number of arguments must be less than or equal to the number of orderBy() clauses",
            method.name()
        )));
    }

    values
        .into_iter()
        .zip(order_by)
        .map(|(value, order)| {
            if order.field().is_key_field() {
                document_id_value(definition, method, order, value)
            } else {
                Ok(value)
            }
        })
        .collect()
}

/// A value aligned with a `__name__` ordering must name a document of the
/// queried collection; plain ids are expanded to full references.
fn document_id_value(
    definition: &QueryDefinition,
    method: CursorMethod,
    order: &OrderBy,
    value: FirestoreValue,
) -> FirestoreResult<FirestoreValue> {
    match value.kind() {
        ValueKind::String(id) if id.is_empty() => Err(invalid_argument(format!(
            "Invalid query. When querying with {}, you must provide a valid document ID, but it was an empty string.",
            order.field()
        ))),
        ValueKind::String(id) if id.contains('/') => Err(invalid_argument(format!(
            "Invalid query. When querying a collection and ordering by {}, the value passed to {}() must be a plain document ID, but '{id}' contains a slash.",
            order.field(),
            method.name()
        ))),
        ValueKind::String(id) => Ok(FirestoreValue::from_reference(
            definition.collection_path().child([id.as_str()]),
        )),
        ValueKind::Reference(path) if path.is_document() => {
            Ok(FirestoreValue::from_reference(path.clone()))
        }
        _ => Err(invalid_argument(format!(
            "Invalid query. When querying with {}, you must provide a valid string or a DocumentReference, but it was: {:?}.",
            order.field(),
            value.kind()
        ))),
    }
}
