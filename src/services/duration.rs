use chrono::{DateTime, Utc};

/// Elapsed whole minutes between two instants, half rounded up.
///
/// Operates on millisecond resolution; the same computation backs stopping
/// a timer, adding a manual entry, and recomputing on update, so all three
/// agree on the stored duration.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds();
    if millis >= 0 {
        (millis + 30_000) / 60_000
    } else {
        // Inverted ranges only reach this through the permissive update
        // path; mirror the positive rounding around zero.
        -((-millis + 30_000) / 60_000)
    }
}
