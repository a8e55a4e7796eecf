use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Opaque binary blob. Ordered lexicographically by byte, which is the
/// order Firestore applies to `bytesValue` fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BytesValue(Vec<u8>);

impl BytesValue {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Padded standard base64, as the REST `bytesValue` field expects.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for BytesValue {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_padded_base64() {
        assert_eq!(BytesValue::new(vec![1, 2]).to_base64(), "AQI=");
        assert_eq!(BytesValue::new(Vec::new()).to_base64(), "");
    }

    #[test]
    fn orders_bytewise() {
        assert!(BytesValue::new(vec![0, 9]) < BytesValue::new(vec![1]));
        assert!(BytesValue::new(vec![1]) < BytesValue::new(vec![1, 0]));
    }
}
