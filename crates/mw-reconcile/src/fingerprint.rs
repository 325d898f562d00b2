use std::fmt;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of a record's canonical JSON.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint of `v`: key-sorted compact JSON, SHA-256, hex.
///
/// Field order and map insertion order never affect the result. If `v`
/// cannot be serialized the `Debug` text is hashed instead, so identical
/// values still collide.
pub fn fingerprint<T: Serialize + fmt::Debug>(v: &T) -> Fingerprint {
    match canonical_json(v) {
        Ok(s) => Fingerprint(sha256_hex(s.as_bytes())),
        Err(e) => {
            tracing::warn!(error = %e, "fingerprint serialization failed; hashing debug form");
            Fingerprint(sha256_hex(format!("{v:?}").as_bytes()))
        }
    }
}

fn canonical_json<T: Serialize>(v: &T) -> serde_json::Result<String> {
    let raw = serde_json::to_value(v)?;
    serde_json::to_string(&sort_keys(&raw))
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new = serde_json::Map::new();
            for k in keys {
                new.insert(k.clone(), sort_keys(&map[&k]));
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => v.clone(),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
