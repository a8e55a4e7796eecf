mod array_value;
mod bytes_value;
mod compare;
mod map_value;
mod value;

pub use array_value::ArrayValue;
pub use bytes_value::BytesValue;
pub use compare::{compare_values, values_equal};
pub use map_value::MapValue;
pub use value::{FirestoreValue, ValueKind};
