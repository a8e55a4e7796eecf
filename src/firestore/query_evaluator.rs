use std::cmp::Ordering;

use crate::firestore::api::query::{Bound, FieldFilter, OrderBy, QueryDefinition};
use crate::firestore::api::{DocumentSnapshot, FilterOperator, LimitType, OrderDirection};
use crate::firestore::model::FieldPath;
use crate::firestore::value::{compare_values, values_equal, FirestoreValue, ValueKind};

/// Applies `definition` to a set of candidate documents and returns the
/// filtered, ordered and bounded result set.
///
/// Results come back in the order the caller observes, so `limit_to_last`
/// queries keep the trailing documents without reversing them.
pub(crate) fn apply_query_to_documents(
    documents: Vec<DocumentSnapshot>,
    definition: &QueryDefinition,
) -> Vec<DocumentSnapshot> {
    let order_by = definition.result_order_by();

    let mut filtered: Vec<DocumentSnapshot> = documents
        .into_iter()
        .filter(|snapshot| snapshot.exists() && definition.matches_collection(snapshot.key()))
        .filter(|snapshot| document_satisfies_filters(snapshot, definition.filters()))
        .filter(|snapshot| document_has_order_fields(snapshot, &order_by))
        .collect();

    filtered.sort_by(|left, right| compare_snapshots(left, right, &order_by));

    if let Some(bound) = definition.result_start_at() {
        filtered.retain(|snapshot| !is_before_start_bound(snapshot, bound, &order_by));
    }

    if let Some(bound) = definition.result_end_at() {
        filtered.retain(|snapshot| !is_after_end_bound(snapshot, bound, &order_by));
    }

    if let Some(limit) = definition.limit() {
        let limit = limit as usize;
        if filtered.len() > limit {
            match definition.limit_type() {
                LimitType::First => filtered.truncate(limit),
                LimitType::Last => {
                    let start = filtered.len() - limit;
                    filtered.drain(0..start);
                }
            }
        }
    }

    filtered
}

fn document_satisfies_filters(snapshot: &DocumentSnapshot, filters: &[FieldFilter]) -> bool {
    filters
        .iter()
        .all(|filter| match get_field_value(snapshot, filter.field()) {
            Some(value) => evaluate_filter(filter, &value),
            None => false,
        })
}

// Documents missing an ordered field never match an ordered query.
fn document_has_order_fields(snapshot: &DocumentSnapshot, order_by: &[OrderBy]) -> bool {
    order_by
        .iter()
        .all(|order| get_field_value(snapshot, order.field()).is_some())
}

fn evaluate_filter(filter: &FieldFilter, value: &FirestoreValue) -> bool {
    let expected = filter.value();
    match filter.operator() {
        FilterOperator::Equal => values_equal(value, expected),
        FilterOperator::NotEqual => !value.is_null() && !values_equal(value, expected),
        FilterOperator::LessThan => comparable(value, expected, |ordering| ordering.is_lt()),
        FilterOperator::LessThanOrEqual => comparable(value, expected, |ordering| ordering.is_le()),
        FilterOperator::GreaterThan => comparable(value, expected, |ordering| ordering.is_gt()),
        FilterOperator::GreaterThanOrEqual => {
            comparable(value, expected, |ordering| ordering.is_ge())
        }
        FilterOperator::ArrayContains => match value.kind() {
            ValueKind::Array(array) => array.contains(expected),
            _ => false,
        },
        FilterOperator::ArrayContainsAny => match (value.kind(), expected.kind()) {
            (ValueKind::Array(array), ValueKind::Array(needles)) => {
                needles.values().iter().any(|needle| array.contains(needle))
            }
            _ => false,
        },
        FilterOperator::In => match expected.kind() {
            ValueKind::Array(candidates) => candidates.contains(value),
            _ => false,
        },
        FilterOperator::NotIn => match expected.kind() {
            ValueKind::Array(candidates) => !value.is_null() && !candidates.contains(value),
            _ => false,
        },
    }
}

/// Range filters only match values of the same type class as the operand.
fn comparable(
    value: &FirestoreValue,
    expected: &FirestoreValue,
    accept: impl Fn(Ordering) -> bool,
) -> bool {
    same_type_class(value, expected) && accept(compare_values(value, expected))
}

fn same_type_class(left: &FirestoreValue, right: &FirestoreValue) -> bool {
    let numeric = |value: &FirestoreValue| {
        matches!(value.kind(), ValueKind::Integer(_) | ValueKind::Double(_))
    };
    if numeric(left) || numeric(right) {
        return numeric(left) && numeric(right);
    }
    std::mem::discriminant(left.kind()) == std::mem::discriminant(right.kind())
}

fn get_field_value(snapshot: &DocumentSnapshot, field: &FieldPath) -> Option<FirestoreValue> {
    if field.is_key_field() {
        return Some(FirestoreValue::from_reference(snapshot.key().path().clone()));
    }
    snapshot.map_value()?.get(field).cloned()
}

fn compare_snapshots(left: &DocumentSnapshot, right: &DocumentSnapshot, order_by: &[OrderBy]) -> Ordering {
    for order in order_by {
        let left_value = get_field_value(left, order.field()).unwrap_or_else(FirestoreValue::null);
        let right_value = get_field_value(right, order.field()).unwrap_or_else(FirestoreValue::null);
        let ordering = directed(compare_values(&left_value, &right_value), order.direction());
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn directed(ordering: Ordering, direction: OrderDirection) -> Ordering {
    match direction {
        OrderDirection::Ascending => ordering,
        OrderDirection::Descending => ordering.reverse(),
    }
}

fn is_before_start_bound(snapshot: &DocumentSnapshot, bound: &Bound, order_by: &[OrderBy]) -> bool {
    let ordering = compare_snapshot_to_bound(snapshot, bound, order_by);
    if bound.inclusive() {
        ordering == Ordering::Less
    } else {
        ordering != Ordering::Greater
    }
}

fn is_after_end_bound(snapshot: &DocumentSnapshot, bound: &Bound, order_by: &[OrderBy]) -> bool {
    let ordering = compare_snapshot_to_bound(snapshot, bound, order_by);
    if bound.inclusive() {
        ordering == Ordering::Greater
    } else {
        ordering != Ordering::Less
    }
}

/// Compares the document against the bound over the bound's prefix of the
/// ordering only.
fn compare_snapshot_to_bound(snapshot: &DocumentSnapshot, bound: &Bound, order_by: &[OrderBy]) -> Ordering {
    for (order, bound_value) in order_by.iter().zip(bound.values()) {
        let snapshot_value = get_field_value(snapshot, order.field()).unwrap_or_else(FirestoreValue::null);
        let ordering = directed(compare_values(&snapshot_value, bound_value), order.direction());
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::api::{Firestore, Query, SnapshotMetadata};
    use crate::firestore::model::{DatabaseId, DocumentKey};
    use crate::firestore::value::MapValue;
    use std::collections::BTreeMap;

    fn base() -> Query {
        Firestore::new("[DEFAULT]", DatabaseId::default("project"))
            .collection("firestore")
            .unwrap()
            .query()
    }

    fn document(id: &str, foo: FirestoreValue) -> DocumentSnapshot {
        let mut fields = BTreeMap::new();
        fields.insert("foo".to_string(), foo);
        DocumentSnapshot::new(
            DocumentKey::from_string(&format!("firestore/{id}")).unwrap(),
            Some(MapValue::new(fields)),
            SnapshotMetadata::default(),
        )
    }

    fn foo_documents() -> Vec<DocumentSnapshot> {
        vec![
            document("doc1", FirestoreValue::from_integer(1)),
            document("doc2", FirestoreValue::from_integer(2)),
            document("doc3", FirestoreValue::from_integer(3)),
        ]
    }

    fn ids(documents: &[DocumentSnapshot]) -> Vec<&str> {
        documents.iter().map(DocumentSnapshot::id).collect()
    }

    #[test]
    fn descending_start_at_keeps_lower_values() {
        let query = base()
            .order_by("foo", OrderDirection::Descending)
            .unwrap()
            .start_at([2])
            .unwrap();
        let results = apply_query_to_documents(foo_documents(), query.definition());
        assert_eq!(ids(&results), vec!["doc2", "doc1"]);
    }

    #[test]
    fn exclusive_bounds() {
        let query = base()
            .order_by("foo", OrderDirection::Ascending)
            .unwrap()
            .start_after([1])
            .unwrap()
            .end_before([3])
            .unwrap();
        let results = apply_query_to_documents(foo_documents(), query.definition());
        assert_eq!(ids(&results), vec!["doc2"]);
    }

    #[test]
    fn limit_to_last_keeps_trailing_documents_in_order() {
        let query = base()
            .order_by("foo", OrderDirection::Ascending)
            .unwrap()
            .limit_to_last(2)
            .unwrap();
        let results = apply_query_to_documents(foo_documents(), query.definition());
        assert_eq!(ids(&results), vec!["doc2", "doc3"]);
    }

    #[test]
    fn range_filters_do_not_cross_types() {
        let mut documents = foo_documents();
        documents.push(document("text", FirestoreValue::from_string("zzz")));
        let query = base().where_field("foo", ">", 1).unwrap();
        let results = apply_query_to_documents(documents, query.definition());
        assert_eq!(ids(&results), vec!["doc2", "doc3"]);
    }

    #[test]
    fn equality_treats_integer_and_double_as_distinct() {
        let mut documents = foo_documents();
        documents.push(document("double", FirestoreValue::from_double(2.0)));
        let query = base().where_field("foo", "==", 2).unwrap();
        let results = apply_query_to_documents(documents, query.definition());
        assert_eq!(ids(&results), vec!["doc2"]);
    }

    #[test]
    fn membership_filters() {
        let candidates = FirestoreValue::from_array(vec![
            FirestoreValue::from_integer(1),
            FirestoreValue::from_integer(3),
        ]);
        let in_query = base().where_field("foo", "in", candidates.clone()).unwrap();
        let not_in_query = base().where_field("foo", "not-in", candidates).unwrap();
        assert_eq!(
            ids(&apply_query_to_documents(foo_documents(), in_query.definition())),
            vec!["doc1", "doc3"]
        );
        assert_eq!(
            ids(&apply_query_to_documents(foo_documents(), not_in_query.definition())),
            vec!["doc2"]
        );
    }

    #[test]
    fn unordered_query_sorts_by_key() {
        let mut documents = foo_documents();
        documents.reverse();
        let results = apply_query_to_documents(documents, base().definition());
        assert_eq!(ids(&results), vec!["doc1", "doc2", "doc3"]);
    }
}
