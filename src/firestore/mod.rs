//! Firestore query descriptors: building, cursors and structural equality.
//!
//! Queries can be built in two equivalent styles:
//!
//! ```
//! use firestore_query::firestore::api::constraint::{order_by, query, where_field};
//! use firestore_query::firestore::{DatabaseId, Firestore, OrderDirection};
//!
//! let db = Firestore::new("[DEFAULT]", DatabaseId::default("demo"));
//! let cities = db.collection("cities").unwrap();
//!
//! let chained = cities
//!     .query()
//!     .where_field("population", ">", 100_000)
//!     .unwrap()
//!     .order_by("population", OrderDirection::Descending)
//!     .unwrap();
//! let modular = query(
//!     &cities,
//!     [
//!         where_field("population", ">", 100_000),
//!         order_by("population", OrderDirection::Descending),
//!     ],
//! )
//! .unwrap();
//! assert!(chained.is_equal(&modular));
//! ```

pub mod api;
mod config;
mod constants;
pub mod error;
pub mod model;
mod query_evaluator;
pub mod remote;
pub mod value;

pub use api::{
    query_equal, CollectionReference, CursorArgument, CursorDocument, DocumentReference, DocumentSnapshot,
    FilterOperator, Firestore, FirestoreClient, LimitType, OrderDirection, Query, QueryConstraint, QuerySnapshot,
    SnapshotMetadata,
};
pub use config::FirestoreSettings;
pub use error::{FirestoreError, FirestoreErrorCode, FirestoreResult};
pub use model::{DatabaseId, DocumentKey, FieldPath, GeoPoint, ResourcePath, Timestamp};
pub use value::{FirestoreValue, ValueKind};
