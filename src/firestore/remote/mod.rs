pub mod datastore;
pub mod serializer;
pub mod structured_query;

pub use datastore::{Datastore, InMemoryDatastore};
pub use serializer::JsonProtoSerializer;
pub use structured_query::{encode_run_query_request, encode_structured_query};
