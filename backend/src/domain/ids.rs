use chrono::Utc;
use uuid::Uuid;

/// Generate a record ID in the format "<kind>::<epoch_millis>::<suffix>"
///
/// The timestamp keeps IDs roughly sortable by creation time; the suffix
/// separates records created within the same millisecond.
pub fn generate_id(kind: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}::{}::{}", kind, millis, &suffix[..8])
}
