//! Response field-rename pass.
//!
//! The upstream's paper payloads historically carried a misspelled
//! `thumbnailUr` key alongside the corrected `thumbnailUrl`. Instead of
//! ad-hoc fallbacks at every call site, renames live in one table applied
//! to JSON success bodies of the routes that opt in.
//!
//! Rules:
//! - Keys are renamed recursively through objects and arrays
//! - Values are never touched
//! - An existing key with the target name is never overwritten

use serde_json::Value;

/// Upstream key → canonical key.
pub const FIELD_RENAMES: &[(&str, &str)] = &[("thumbnailUr", "thumbnailUrl")];

/// Apply the rename table to a parsed JSON body, in place.
pub fn apply(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (from, to) in FIELD_RENAMES {
                if map.contains_key(*from) && !map.contains_key(*to) {
                    if let Some(moved) = map.remove(*from) {
                        map.insert((*to).to_string(), moved);
                    }
                }
            }
            for (_, child) in map.iter_mut() {
                apply(child);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                apply(item);
            }
        }
        _ => {}
    }
}
