use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::errors::BackendError;

const ISO_MILLIS: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

/// Formats `at` the way browsers print `Date.prototype.toISOString`:
/// UTC with millisecond precision, e.g. `2024-01-02T03:04:05.678Z`.
pub fn iso_millis(at: OffsetDateTime) -> Result<String, BackendError> {
    at.to_offset(UtcOffset::UTC)
        .format(ISO_MILLIS)
        .map_err(BackendError::Timestamp)
}

/// The current instant in the `createdAt`/`receivedAt` format.
pub fn now() -> Result<String, BackendError> {
    iso_millis(OffsetDateTime::now_utc())
}

/// Renders a stored timestamp in `hi-IN` locale style
/// (`19/10/2026, 3:04:05 pm`) at the given offset. Values that are not
/// RFC 3339 instants are returned unchanged.
pub fn display(created_at: &str, offset: UtcOffset) -> String {
    let at = match OffsetDateTime::parse(created_at, &Rfc3339) {
        Ok(at) => at.to_offset(offset),
        Err(_) => return created_at.to_owned(),
    };

    let (hour, meridiem) = match at.hour() {
        0 => (12, "am"),
        h @ 1..=11 => (h, "am"),
        12 => (12, "pm"),
        h => (h - 12, "pm"),
    };

    format!(
        "{}/{}/{}, {}:{:02}:{:02} {}",
        at.day(),
        u8::from(at.month()),
        at.year(),
        hour,
        at.minute(),
        at.second(),
        meridiem
    )
}

/// Parses offsets of the form `+05:30` or `-03:00`.
pub fn parse_offset(value: &str) -> Result<UtcOffset, String> {
    let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");

    UtcOffset::parse(value.trim(), &format).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::{datetime, offset};

    use super::*;

    #[test]
    fn iso_millis_matches_browser_output() {
        let at = datetime!(2024-01-02 03:04:05.6789 +05:30);

        assert_eq!(iso_millis(at).expect("format"), "2024-01-01T21:34:05.678Z");
        assert_eq!(
            iso_millis(datetime!(2024-01-02 03:04:05 UTC)).expect("format"),
            "2024-01-02T03:04:05.000Z"
        );
    }

    #[test]
    fn display_uses_twelve_hour_clock() {
        let india = offset!(+05:30);

        assert_eq!(
            display("2024-01-02T10:00:00.000Z", india),
            "2/1/2024, 3:30:00 pm"
        );
        assert_eq!(
            display("2024-01-01T18:30:00.000Z", india),
            "2/1/2024, 12:00:00 am"
        );
        assert_eq!(
            display("2024-01-02T06:30:09.000Z", india),
            "2/1/2024, 12:00:09 pm"
        );
    }

    #[test]
    fn display_keeps_unparsable_values() {
        assert_eq!(display("yesterday", UtcOffset::UTC), "yesterday");
        assert_eq!(display("", UtcOffset::UTC), "");
    }

    #[test]
    fn offsets_parse() {
        assert_eq!(parse_offset("+05:30"), Ok(offset!(+05:30)));
        assert_eq!(parse_offset("-03:00"), Ok(offset!(-03:00)));
        assert!(parse_offset("IST").is_err());
    }
}
