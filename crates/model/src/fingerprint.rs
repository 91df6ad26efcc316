//! Configuration fingerprints
//!
//! A stable content hash of a scenario definition: SHA-256 over a
//! canonical JSON encoding (recursively key-sorted objects, compact
//! separators). External layers can cache simulation results keyed by
//! this without the core prescribing any storage.

use std::fmt::Write as _;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::def::ScenarioDef;

/// Canonical-JSON SHA-256 of a definition, as lowercase hex.
pub fn fingerprint(def: &ScenarioDef) -> String {
    let value = serde_json::to_value(def).expect("scenario definitions are plain JSON data");
    let mut canonical = String::new();
    write_canonical(&value, &mut canonical);
    let digest = Sha256::digest(canonical.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Value::to_string handles JSON escaping for the key.
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        // Leaves already render compactly and deterministically.
        leaf => out.push_str(&leaf.to_string()),
    }
}
