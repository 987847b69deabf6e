//! Time utilities.
//!
//! All timestamps exchanged over the wire are Unix milliseconds in JST.
//! HTTP DTOs render them as RFC 3339 strings.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

const JST_OFFSET_SECS: i32 = 9 * 3600;

fn jst_offset() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).unwrap()
}

/// Current Unix timestamp in JST (milliseconds).
pub fn now_jst_millis() -> i64 {
    let now_jst: DateTime<FixedOffset> = Utc::now().with_timezone(&jst_offset());
    now_jst.timestamp_millis()
}

/// Convert a Unix timestamp (milliseconds) to a JST RFC 3339 string.
pub fn to_jst_rfc3339(timestamp_millis: i64) -> String {
    let seconds = timestamp_millis / 1000;
    let nanos = ((timestamp_millis % 1000) * 1_000_000) as u32;
    let dt = jst_offset().timestamp_opt(seconds, nanos).unwrap();
    dt.to_rfc3339()
}
