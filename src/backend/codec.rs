//! Codec Module
//!
//! Turns keys and values into the byte strings kept by the key-value service.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CacheError, Result};

/// Encodes an item into bytes.
pub trait Encoder<T: ?Sized> {
    fn encode(&self, item: &T) -> Result<Vec<u8>>;
}

/// Decodes bytes produced by the matching [`Encoder`].
pub trait Decoder<T> {
    fn decode(&self, bytes: &[u8]) -> Result<T>;
}

// == JSON Codec ==
/// Default codec: compact JSON text via serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T: Serialize + ?Sized> Encoder<T> for JsonCodec {
    fn encode(&self, item: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(item)?)
    }
}

impl<T: DeserializeOwned> Decoder<T> for JsonCodec {
    fn decode(&self, bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

// == UTF-8 Codec ==
/// Stores strings as their raw UTF-8 bytes, without JSON quoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Codec;

impl<T: AsRef<str> + ?Sized> Encoder<T> for Utf8Codec {
    fn encode(&self, item: &T) -> Result<Vec<u8>> {
        Ok(item.as_ref().as_bytes().to_vec())
    }
}

impl Decoder<String> for Utf8Codec {
    fn decode(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| CacheError::Decode(e.to_string()))
    }
}

// == Bytes Codec ==
/// Binary-safe pass-through for values that already are bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl<T: AsRef<[u8]> + ?Sized> Encoder<T> for BytesCodec {
    fn encode(&self, item: &T) -> Result<Vec<u8>> {
        Ok(item.as_ref().to_vec())
    }
}

impl Decoder<Vec<u8>> for BytesCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        id: u64,
        name: String,
        tags: Vec<String>,
    }

    #[test]
    fn test_json_key_encoding_is_canonical_text() {
        assert_eq!(JsonCodec.encode("a").unwrap(), b"\"a\"".to_vec());
        assert_eq!(JsonCodec.encode(&42u32).unwrap(), b"42".to_vec());
        assert_eq!(JsonCodec.encode(&json!({"k": [1, 2]})).unwrap(), br#"{"k":[1,2]}"#.to_vec());
    }

    #[test]
    fn test_json_roundtrip_struct() {
        let user = User {
            id: 7,
            name: "ada".to_string(),
            tags: vec!["admin".to_string()],
        };
        let bytes = JsonCodec.encode(&user).unwrap();
        let decoded: User = JsonCodec.decode(&bytes).unwrap();
        assert_eq!(decoded, user);
    }

    #[test]
    fn test_json_decode_failure() {
        let result: Result<u32> = JsonCodec.decode(b"{broken");
        assert!(matches!(result, Err(CacheError::Json(_))));
    }

    #[test]
    fn test_utf8_codec() {
        assert_eq!(Utf8Codec.encode("plain").unwrap(), b"plain".to_vec());
        assert_eq!(Utf8Codec.decode(b"plain").unwrap(), "plain");
        assert!(matches!(
            Utf8Codec.decode(&[0xff, 0xfe]),
            Err(CacheError::Decode(_))
        ));
    }

    #[test]
    fn test_bytes_codec_is_binary_safe() {
        let raw = vec![0u8, 255, 10, 47];
        assert_eq!(BytesCodec.decode(&BytesCodec.encode(&raw).unwrap()).unwrap(), raw);
    }
}
