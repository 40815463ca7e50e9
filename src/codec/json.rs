// file: src/codec/json.rs
// description: JSON document encodings, dynamic and typed
// reference: https://docs.rs/serde_json

use super::{CodecOptions, Decode, Encode};
use crate::error::{Result, StoreError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

fn json_error(source: serde_json::Error) -> StoreError {
    StoreError::Json {
        path: String::new(),
        source,
    }
}

/// Trailing NUL padding is ignored, everything else must be valid JSON.
fn document_bytes(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

impl Encode for Value {
    fn encode(&self, _options: &CodecOptions) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(json_error)
    }
}

impl Decode for Value {
    fn decode(bytes: &[u8], _options: &CodecOptions) -> Result<Self> {
        serde_json::from_slice(document_bytes(bytes)).map_err(json_error)
    }
}

/// A JSON document with a fixed byte budget. Reading into a document whose
/// file exceeds the budget fails and leaves the current value untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
    value: Value,
    capacity: usize,
}

impl JsonDocument {
    pub fn new(capacity: usize) -> Self {
        Self {
            value: Value::Null,
            capacity,
        }
    }

    pub fn with_value(value: Value, capacity: usize) -> Self {
        Self { value, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl Encode for JsonDocument {
    fn encode(&self, options: &CodecOptions) -> Result<Vec<u8>> {
        self.value.encode(options)
    }
}

impl Decode for JsonDocument {
    /// A freshly decoded document gets exactly the capacity its contents need.
    fn decode(bytes: &[u8], options: &CodecOptions) -> Result<Self> {
        let contents = document_bytes(bytes);
        Ok(Self {
            value: Value::decode(contents, options)?,
            capacity: contents.len(),
        })
    }

    fn decode_into(&mut self, bytes: &[u8], options: &CodecOptions) -> Result<()> {
        let contents = document_bytes(bytes);
        if contents.len() > self.capacity {
            return Err(StoreError::JsonCapacity {
                path: String::new(),
                needed: contents.len(),
                capacity: self.capacity,
            });
        }
        self.value = Value::decode(contents, options)?;
        Ok(())
    }
}

/// Any serde type persisted as a JSON document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize> Encode for Json<T> {
    fn encode(&self, _options: &CodecOptions) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.0).map_err(json_error)
    }
}

impl<T: DeserializeOwned> Decode for Json<T> {
    fn decode(bytes: &[u8], _options: &CodecOptions) -> Result<Self> {
        serde_json::from_slice(document_bytes(bytes))
            .map(Json)
            .map_err(json_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct WifiSettings {
        ssid: String,
        channel: u8,
        hidden: bool,
    }

    fn options() -> CodecOptions {
        CodecOptions::default()
    }

    #[test]
    fn test_value_encoding_is_compact() {
        let bytes = json!({"a": 1}).encode(&options()).unwrap();
        assert_eq!(bytes, br#"{"a":1}"#.to_vec());
        assert_eq!(Value::decode(&bytes, &options()).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_value_rejects_garbage() {
        let err = Value::decode(b"{\"a\":", &options()).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }

    #[test]
    fn test_document_capacity() {
        let mut doc = JsonDocument::with_value(json!("keep"), 8);
        let err = doc
            .decode_into(br#"{"long":"value"}"#, &options())
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::JsonCapacity {
                needed: 16,
                capacity: 8,
                ..
            }
        ));
        assert_eq!(doc.value(), &json!("keep"));

        doc.decode_into(br#"[1,2]"#, &options()).unwrap();
        assert_eq!(doc.value(), &json!([1, 2]));
        assert_eq!(doc.capacity(), 8);
    }

    #[test]
    fn test_document_keeps_value_on_parse_error() {
        let mut doc = JsonDocument::with_value(json!(1), 64);
        assert!(doc.decode_into(b"nope", &options()).is_err());
        assert_eq!(doc.into_value(), json!(1));
    }

    #[test]
    fn test_decoded_document_capacity_matches_contents() {
        let doc = JsonDocument::decode(br#"{"a":[1,2,3]}"#, &options()).unwrap();
        assert_eq!(doc.capacity(), 13);
        assert_eq!(doc.value()["a"][2], json!(3));
    }

    #[test]
    fn test_typed_json() {
        let settings = WifiSettings {
            ssid: "garage".to_string(),
            channel: 6,
            hidden: false,
        };
        let bytes = Json(&settings).encode(&options()).unwrap();
        let decoded = Json::<WifiSettings>::decode(&bytes, &options()).unwrap();
        assert_eq!(decoded.into_inner(), settings);
    }

    #[test]
    fn test_trailing_nul_padding_ignored() {
        let decoded = Value::decode(b"[true]\0\0\0", &options()).unwrap();
        assert_eq!(decoded, json!([true]));
    }
}
