use chrono::{SecondsFormat, TimeZone, Utc};
use serde_json::{json, Value as JsonValue};

use crate::firestore::error::{invalid_argument, FirestoreResult};
use crate::firestore::model::{DatabaseId, ResourcePath, Timestamp};
use crate::firestore::value::{FirestoreValue, MapValue, ValueKind};

/// Converts values and resource names to the REST (proto3 JSON) encoding
/// for one database.
#[derive(Clone, Debug)]
pub struct JsonProtoSerializer {
    database_id: DatabaseId,
}

impl JsonProtoSerializer {
    pub fn new(database_id: DatabaseId) -> Self {
        Self { database_id }
    }

    pub fn database_name(&self) -> String {
        format!(
            "projects/{}/databases/{}",
            self.database_id.project_id(),
            self.database_id.database()
        )
    }

    /// `projects/{p}/databases/{d}/documents/{path}`, or the bare documents
    /// root when `path` is empty.
    pub fn resource_name(&self, path: &ResourcePath) -> String {
        if path.is_empty() {
            format!("{}/documents", self.database_name())
        } else {
            format!("{}/documents/{}", self.database_name(), path.canonical_string())
        }
    }

    pub fn encode_value(&self, value: &FirestoreValue) -> FirestoreResult<JsonValue> {
        let encoded = match value.kind() {
            ValueKind::Null => json!({ "nullValue": JsonValue::Null }),
            ValueKind::Boolean(boolean) => json!({ "booleanValue": boolean }),
            ValueKind::Integer(integer) => json!({ "integerValue": integer.to_string() }),
            ValueKind::Double(double) => encode_double(*double),
            ValueKind::Timestamp(timestamp) => {
                json!({ "timestampValue": encode_timestamp(timestamp)? })
            }
            ValueKind::String(string) => json!({ "stringValue": string }),
            ValueKind::Bytes(bytes) => json!({ "bytesValue": bytes.to_base64() }),
            ValueKind::Reference(path) => json!({ "referenceValue": self.resource_name(path) }),
            ValueKind::GeoPoint(point) => json!({
                "geoPointValue": {
                    "latitude": point.latitude(),
                    "longitude": point.longitude(),
                }
            }),
            ValueKind::Array(array) => {
                let values = array
                    .values()
                    .iter()
                    .map(|value| self.encode_value(value))
                    .collect::<FirestoreResult<Vec<_>>>()?;
                json!({ "arrayValue": { "values": values } })
            }
            ValueKind::Map(map) => json!({
                "mapValue": { "fields": self.encode_map_fields(map)? }
            }),
        };
        Ok(encoded)
    }

    fn encode_map_fields(&self, map: &MapValue) -> FirestoreResult<JsonValue> {
        let mut fields = serde_json::Map::new();
        for (key, value) in map.fields() {
            fields.insert(key.clone(), self.encode_value(value)?);
        }
        Ok(JsonValue::Object(fields))
    }
}

// JSON has no NaN or infinities; proto3 JSON spells them as strings.
fn encode_double(value: f64) -> JsonValue {
    if value.is_nan() {
        json!({ "doubleValue": "NaN" })
    } else if value.is_infinite() {
        let text = if value.is_sign_positive() { "Infinity" } else { "-Infinity" };
        json!({ "doubleValue": text })
    } else {
        json!({ "doubleValue": value })
    }
}

fn encode_timestamp(timestamp: &Timestamp) -> FirestoreResult<String> {
    Utc.timestamp_opt(timestamp.seconds, timestamp.nanos as u32)
        .single()
        .map(|datetime| datetime.to_rfc3339_opts(SecondsFormat::Nanos, true))
        .ok_or_else(|| {
            invalid_argument(format!(
                "Timestamp {}s {}ns is out of range",
                timestamp.seconds, timestamp.nanos
            ))
        })
}
