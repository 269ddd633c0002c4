use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock nanoseconds since the UNIX epoch.
pub fn unix_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
        .try_into()
        .unwrap_or(i64::MAX)
}

/// Timestamp for the next ledger entry.
///
/// The wall clock may step backwards; ledger timestamps must not, so the
/// result is never less than `previous`.
pub fn next_timestamp(previous: Option<i64>) -> i64 {
    let now = unix_nanos();
    match previous {
        Some(prev) if prev > now => prev,
        _ => now,
    }
}
