//! Client-side core for Cloud Firestore queries.
//!
//! Builds immutable query descriptors from a collection reference, validates
//! and constructs pagination cursors from field values or document
//! snapshots, and decides whether two queries are structurally equal. An
//! in-memory datastore and a REST `StructuredQuery` encoder are provided for
//! executing the resulting queries.
//!
//! See [`firestore`] for the entry points.

pub mod firestore;
