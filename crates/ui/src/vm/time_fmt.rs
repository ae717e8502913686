use chrono::{DateTime, Utc};

/// Calendar date for list rows, e.g. `2024-01-31`.
#[must_use]
pub fn format_date(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}
