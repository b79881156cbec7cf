//! BLAKE3 content hashing for tamper evidence.

use crate::RunRecord;

/// BLAKE3 over the record's JSON with `content_hash` left out, hex encoded.
///
/// Returns an empty string, which never verifies, if the record cannot be
/// serialized.
pub fn compute_record_hash(record: &RunRecord) -> String {
    let mut value = match serde_json::to_value(record) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(record_id = %record.id, error = %e, "Run record not hashable");
            return String::new();
        }
    };
    if let Some(fields) = value.as_object_mut() {
        fields.remove("content_hash");
    }
    blake3::hash(value.to_string().as_bytes()).to_hex().to_string()
}
