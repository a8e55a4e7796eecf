use serde_json::{json, Value as JsonValue};

use crate::firestore::api::query::{Bound, FieldFilter, OrderBy, QueryDefinition};
use crate::firestore::error::FirestoreResult;
use crate::firestore::remote::serializer::JsonProtoSerializer;

/// Encodes `definition` as a REST `StructuredQuery`.
///
/// `limit_to_last` queries are encoded in request form: flipped ordering and
/// swapped cursors. Callers restore the visible order from the response.
pub fn encode_structured_query(
    serializer: &JsonProtoSerializer,
    definition: &QueryDefinition,
) -> FirestoreResult<JsonValue> {
    definition.validate_for_execution()?;

    let mut structured = serde_json::Map::new();
    structured.insert(
        "from".to_string(),
        json!([{ "collectionId": definition.collection_id(), "allDescendants": false }]),
    );

    if !definition.filters().is_empty() {
        structured.insert(
            "where".to_string(),
            encode_filters(serializer, definition.filters())?,
        );
    }

    let order_by = definition.request_order_by();
    structured.insert(
        "orderBy".to_string(),
        JsonValue::Array(order_by.iter().map(encode_order).collect()),
    );

    if let Some(limit) = definition.limit() {
        structured.insert("limit".to_string(), json!(limit));
    }

    if let Some(start) = definition.request_start_at() {
        structured.insert("startAt".to_string(), encode_cursor(serializer, start, true)?);
    }

    if let Some(end) = definition.request_end_at() {
        structured.insert("endAt".to_string(), encode_cursor(serializer, end, false)?);
    }

    Ok(JsonValue::Object(structured))
}

/// The body of a `documents:runQuery` request for `definition`.
pub fn encode_run_query_request(
    serializer: &JsonProtoSerializer,
    definition: &QueryDefinition,
) -> FirestoreResult<JsonValue> {
    let parent = serializer.resource_name(&definition.collection_path().without_last());
    Ok(json!({
        "parent": parent,
        "structuredQuery": encode_structured_query(serializer, definition)?,
    }))
}

fn encode_filters(serializer: &JsonProtoSerializer, filters: &[FieldFilter]) -> FirestoreResult<JsonValue> {
    if let [filter] = filters {
        return encode_field_filter(serializer, filter);
    }

    let nested = filters
        .iter()
        .map(|filter| encode_field_filter(serializer, filter))
        .collect::<FirestoreResult<Vec<_>>>()?;

    Ok(json!({
        "compositeFilter": {
            "op": "AND",
            "filters": nested
        }
    }))
}

fn encode_field_filter(serializer: &JsonProtoSerializer, filter: &FieldFilter) -> FirestoreResult<JsonValue> {
    Ok(json!({
        "fieldFilter": {
            "field": { "fieldPath": filter.field().canonical_string() },
            "op": filter.operator().as_str(),
            "value": serializer.encode_value(filter.value())?
        }
    }))
}

fn encode_order(order: &OrderBy) -> JsonValue {
    json!({
        "field": { "fieldPath": order.field().canonical_string() },
        "direction": order.direction().as_str(),
    })
}

// `before` places the cursor ahead of the matching document: inclusive for
// starts, exclusive for ends.
fn encode_cursor(serializer: &JsonProtoSerializer, bound: &Bound, start: bool) -> FirestoreResult<JsonValue> {
    let values = bound
        .values()
        .iter()
        .map(|value| serializer.encode_value(value))
        .collect::<FirestoreResult<Vec<_>>>()?;
    Ok(json!({
        "values": values,
        "before": if start { bound.inclusive() } else { !bound.inclusive() },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::api::{Firestore, OrderDirection, Query};
    use crate::firestore::model::DatabaseId;

    fn base(path: &str) -> Query {
        Firestore::new("[DEFAULT]", DatabaseId::default("project"))
            .collection(path)
            .unwrap()
            .query()
    }

    fn serializer() -> JsonProtoSerializer {
        JsonProtoSerializer::new(DatabaseId::default("project"))
    }

    #[test]
    fn encodes_filters_order_limit_and_cursors() {
        let query = base("firestore/startAt/collection")
            .where_field("foo", "==", "bar")
            .unwrap()
            .where_field("baz", ">", 1)
            .unwrap()
            .order_by("baz", OrderDirection::Descending)
            .unwrap()
            .limit(2)
            .unwrap()
            .start_after([3])
            .unwrap()
            .end_at([0])
            .unwrap();

        let request = encode_run_query_request(&serializer(), query.definition()).unwrap();
        assert_eq!(
            request["parent"],
            json!("projects/project/databases/(default)/documents/firestore/startAt")
        );
        let structured = &request["structuredQuery"];
        assert_eq!(structured["from"][0]["collectionId"], json!("collection"));
        assert_eq!(structured["where"]["compositeFilter"]["filters"].as_array().unwrap().len(), 2);
        assert_eq!(structured["orderBy"][1]["field"]["fieldPath"], json!("__name__"));
        assert_eq!(structured["orderBy"][1]["direction"], json!("DESCENDING"));
        assert_eq!(structured["limit"], json!(2));
        assert_eq!(
            structured["startAt"],
            json!({ "values": [{ "integerValue": "3" }], "before": false })
        );
        assert_eq!(
            structured["endAt"],
            json!({ "values": [{ "integerValue": "0" }], "before": false })
        );
    }

    #[test]
    fn limit_to_last_is_encoded_reversed() {
        let query = base("firestore")
            .order_by("foo", OrderDirection::Ascending)
            .unwrap()
            .end_before([10])
            .unwrap()
            .limit_to_last(2)
            .unwrap();
        let structured = encode_structured_query(&serializer(), query.definition()).unwrap();
        assert_eq!(structured["orderBy"][0]["direction"], json!("DESCENDING"));
        assert!(structured.get("endAt").is_none());
        assert_eq!(
            structured["startAt"],
            json!({ "values": [{ "integerValue": "10" }], "before": false })
        );
    }

    #[test]
    fn limit_to_last_without_order_fails() {
        let query = base("firestore").limit_to_last(1).unwrap();
        let err = encode_structured_query(&serializer(), query.definition()).unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
    }

    #[test]
    fn root_collection_parent_is_documents_root() {
        let request = encode_run_query_request(&serializer(), base("firestore").definition()).unwrap();
        assert_eq!(
            request["parent"],
            json!("projects/project/databases/(default)/documents")
        );
        assert_eq!(request["structuredQuery"]["orderBy"][0]["field"]["fieldPath"], json!("__name__"));
    }
}
