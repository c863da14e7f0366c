/// Milliseconds since the Unix epoch.
pub type EpochMs = i64;

pub fn now_ms() -> EpochMs {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
