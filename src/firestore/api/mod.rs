mod client;
pub mod constraint;
pub(crate) mod cursor;
mod database;
pub(crate) mod query;
mod reference;
mod snapshot;

pub use client::FirestoreClient;
pub use constraint::{query_equal, QueryConstraint};
pub use cursor::{CursorArgument, CursorDocument};
pub use database::Firestore;
pub use query::{
    Bound, FieldFilter, FilterOperator, IntoFilterOperator, LimitType, OrderBy, OrderDirection, Query,
    QueryDefinition, QuerySnapshot,
};
pub use reference::{CollectionReference, DocumentReference};
pub use snapshot::{DocumentSnapshot, SnapshotMetadata};
