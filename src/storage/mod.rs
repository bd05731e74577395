mod images;

pub use images::{encode_data_url, ImageStore, LocalImageStore};

use chrono::Utc;
use uuid::Uuid;

/// Review ids are the submit timestamp in milliseconds plus a short random
/// suffix, so two submits in the same millisecond stay distinct.
pub fn generate_review_id() -> String {
    format!(
        "{}_{}",
        Utc::now().timestamp_millis(),
        &Uuid::new_v4().simple().to_string()[..8]
    )
}
