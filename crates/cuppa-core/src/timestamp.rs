//! Token expiry timestamp parsing.
//!
//! The backend emits expiry timestamps in two formats depending on the
//! endpoint: epoch milliseconds encoded as a decimal string, or RFC 3339.

use chrono::{DateTime, Utc};

use crate::error::{Error, InvalidInputError};

/// Parse a token expiry timestamp.
///
/// Integer input is interpreted as milliseconds since the Unix epoch;
/// anything else falls through to RFC 3339. The integer parse is strict,
/// so an RFC 3339 string never matches the first branch.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, Error> {
    if let Ok(millis) = value.trim().parse::<i64>() {
        let secs = millis.div_euclid(1000);
        let nanos = (millis.rem_euclid(1000) as u32) * 1_000_000;
        return DateTime::from_timestamp(secs, nanos).ok_or_else(|| {
            InvalidInputError::Timestamp {
                value: value.to_string(),
            }
            .into()
        });
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            InvalidInputError::Timestamp {
                value: value.to_string(),
            }
            .into()
        })
}
