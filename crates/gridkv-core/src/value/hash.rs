use crate::value::{Value, tag};
use xxhash_rust::xxh3::Xxh3;

/// Stable 64-bit hash over a value's canonical byte encoding.
///
/// Used as the deterministic sort tie-break: page boundaries must be
/// reproducible across queries, processes, and platforms, so this hash must
/// never depend on process-local state (which rules out `DefaultHasher`).
///
/// Not cryptographic. Two values that hash equal and compare equal under the
/// primary order sort in an unspecified but locally-stable order.
#[must_use]
pub fn stable_hash(value: &Value) -> u64 {
    let mut hasher = Xxh3::new();
    feed(&mut hasher, value);
    hasher.digest()
}

// Canonical feed: variant tag byte, then a fixed-width or length-prefixed
// payload so distinct values never produce identical byte streams.
fn feed(hasher: &mut Xxh3, value: &Value) {
    hasher.update(&[tag::canonical_tag(value).to_u8()]);

    match value {
        Value::Blob(bytes) => {
            hasher.update(&(bytes.len() as u64).to_be_bytes());
            hasher.update(bytes);
        }
        Value::Bool(b) => hasher.update(&[u8::from(*b)]),
        Value::Int(i) => hasher.update(&i.to_be_bytes()),
        Value::List(items) => {
            hasher.update(&(items.len() as u64).to_be_bytes());
            for item in items {
                feed(hasher, item);
            }
        }
        Value::Null => {}
        Value::Text(s) => {
            hasher.update(&(s.len() as u64).to_be_bytes());
            hasher.update(s.as_bytes());
        }
        Value::Uint(u) => hasher.update(&u.to_be_bytes()),
    }
}

///
/// TESTS
///
