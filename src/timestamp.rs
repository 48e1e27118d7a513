//! Asset timestamp conversion from API UTC strings to display forms.

use anyhow::{Context, Result};
use chrono::{FixedOffset, NaiveDateTime, TimeZone, Utc};

/// Display timezone for the rendered site (JST, no DST).
const OFFSET_SECS: i32 = 9 * 3600;

/// Wire format of release asset timestamps.
const API_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// The three textual forms one asset timestamp is rendered as.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamp {
    /// The sortable UTC form as received, kept verbatim for `datetime` attributes.
    pub time: String,
    /// Human-readable local form, `2024-01-01 09:00:00`.
    pub display: String,
    /// RSS 2 date form, `Mon, 01 Jan 2024 09:00:00 +0900`.
    pub rss2: String,
}

pub fn display_offset() -> FixedOffset {
    FixedOffset::east_opt(OFFSET_SECS).expect("fixed display offset is in range")
}

/// Parses an API timestamp and derives the three display forms in the
/// site's timezone.
pub fn convert(utc: &str) -> Result<Timestamp> {
    let naive = NaiveDateTime::parse_from_str(utc, API_FORMAT)
        .with_context(|| format!("Failed to parse asset timestamp {:?}", utc))?;
    let local = Utc
        .from_utc_datetime(&naive)
        .with_timezone(&display_offset());

    Ok(Timestamp {
        time: utc.to_string(),
        display: local.format("%Y-%m-%d %H:%M:%S").to_string(),
        rss2: local.format("%a, %d %b %Y %H:%M:%S %z").to_string(),
    })
}
