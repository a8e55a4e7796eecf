//! Function-style query construction: `query(collection, [where_field(..), order_by(..)])`.
//!
//! Each helper captures its arguments without validating them; `query()`
//! applies the constraints in order through the same builder methods as the
//! chained API, so both styles yield identical queries and report the same
//! errors.

use crate::firestore::error::FirestoreResult;
use crate::firestore::model::{FieldPath, IntoFieldPath};
use crate::firestore::value::FirestoreValue;

use super::cursor::{CursorArgument, CursorMethod};
use super::query::{FilterOperator, IntoFilterOperator, OrderDirection, Query};
use super::reference::{CollectionReference, DocumentReference};
use super::Firestore;

#[derive(Clone, Debug)]
pub struct QueryConstraint {
    kind: QueryConstraintKind,
}

#[derive(Clone, Debug)]
enum QueryConstraintKind {
    Where {
        field: FirestoreResult<FieldPath>,
        operator: FirestoreResult<FilterOperator>,
        value: FirestoreValue,
    },
    OrderBy {
        field: FirestoreResult<FieldPath>,
        direction: OrderDirection,
    },
    LimitFirst(u32),
    LimitLast(u32),
    Cursor {
        method: CursorMethod,
        arguments: Vec<CursorArgument>,
    },
}

impl QueryConstraint {
    fn new(kind: QueryConstraintKind) -> Self {
        Self { kind }
    }

    fn apply(self, query: Query) -> FirestoreResult<Query> {
        match self.kind {
            QueryConstraintKind::Where {
                field,
                operator,
                value,
            } => query.where_field(field?, operator?, value),
            QueryConstraintKind::OrderBy { field, direction } => query.order_by(field?, direction),
            QueryConstraintKind::LimitFirst(limit) => query.limit(limit),
            QueryConstraintKind::LimitLast(limit) => query.limit_to_last(limit),
            QueryConstraintKind::Cursor { method, arguments } => query.with_cursor(method, arguments),
        }
    }
}

impl From<CollectionReference> for Query {
    fn from(collection: CollectionReference) -> Self {
        collection.query()
    }
}

impl From<&CollectionReference> for Query {
    fn from(collection: &CollectionReference) -> Self {
        collection.query()
    }
}

impl From<&Query> for Query {
    fn from(query: &Query) -> Self {
        query.clone()
    }
}

/// Creates a new query by applying `constraints` to `base` in order.
///
/// The first failing constraint aborts construction; no partially built
/// query is returned.
pub fn query(
    base: impl Into<Query>,
    constraints: impl IntoIterator<Item = QueryConstraint>,
) -> FirestoreResult<Query> {
    let mut current = base.into();
    for constraint in constraints {
        current = constraint.apply(current)?;
    }
    Ok(current)
}

/// Modular counterpart of [`Query::where_field`].
pub fn where_field(
    field: impl IntoFieldPath,
    operator: impl IntoFilterOperator,
    value: impl Into<FirestoreValue>,
) -> QueryConstraint {
    QueryConstraint::new(QueryConstraintKind::Where {
        field: field.into_field_path(),
        operator: operator.into_filter_operator(),
        value: value.into(),
    })
}

/// Orders by `field`; `None` means ascending.
pub fn order_by(
    field: impl IntoFieldPath,
    direction: impl Into<Option<OrderDirection>>,
) -> QueryConstraint {
    QueryConstraint::new(QueryConstraintKind::OrderBy {
        field: field.into_field_path(),
        direction: direction.into().unwrap_or_default(),
    })
}

pub fn limit(limit: u32) -> QueryConstraint {
    QueryConstraint::new(QueryConstraintKind::LimitFirst(limit))
}

pub fn limit_to_last(limit: u32) -> QueryConstraint {
    QueryConstraint::new(QueryConstraintKind::LimitLast(limit))
}

fn cursor<I, A>(method: CursorMethod, arguments: I) -> QueryConstraint
where
    I: IntoIterator<Item = A>,
    A: Into<CursorArgument>,
{
    QueryConstraint::new(QueryConstraintKind::Cursor {
        method,
        arguments: arguments.into_iter().map(Into::into).collect(),
    })
}

pub fn start_at<I, A>(arguments: I) -> QueryConstraint
where
    I: IntoIterator<Item = A>,
    A: Into<CursorArgument>,
{
    cursor(CursorMethod::StartAt, arguments)
}

pub fn start_after<I, A>(arguments: I) -> QueryConstraint
where
    I: IntoIterator<Item = A>,
    A: Into<CursorArgument>,
{
    cursor(CursorMethod::StartAfter, arguments)
}

pub fn end_at<I, A>(arguments: I) -> QueryConstraint
where
    I: IntoIterator<Item = A>,
    A: Into<CursorArgument>,
{
    cursor(CursorMethod::EndAt, arguments)
}

pub fn end_before<I, A>(arguments: I) -> QueryConstraint
where
    I: IntoIterator<Item = A>,
    A: Into<CursorArgument>,
{
    cursor(CursorMethod::EndBefore, arguments)
}

/// Modular counterpart of [`Query::is_equal`].
pub fn query_equal(left: &Query, right: &Query) -> bool {
    left.is_equal(right)
}

pub fn collection(firestore: &Firestore, path: &str) -> FirestoreResult<CollectionReference> {
    firestore.collection(path)
}

pub fn doc(firestore: &Firestore, path: &str) -> FirestoreResult<DocumentReference> {
    firestore.doc(path)
}
