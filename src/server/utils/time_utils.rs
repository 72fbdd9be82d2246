use std::num::ParseIntError;

use chrono::{DateTime, TimeZone, Utc};

/// xmltv timestamps, always written in utc
pub const GUIDE_TIME_FORMAT: &str = "%Y%m%d%H%M%S +0000";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TimestampError {
    #[error("invalid epoch seconds: {0}")]
    Parse(#[from] ParseIntError),
    #[error("epoch seconds out of range: {0}")]
    OutOfRange(i64),
}

/// the time we fall back to whenever the feed hands us something unparseable
pub fn zero_time() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// epoch seconds (as the feed sends them, a string) to an absolute time
pub fn epoch_to_time(s: &str) -> Result<DateTime<Utc>, TimestampError> {
    let seconds: i64 = s.parse()?;

    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or(TimestampError::OutOfRange(seconds))
}

pub fn format_guide_time(time: &DateTime<Utc>) -> String {
    time.format(GUIDE_TIME_FORMAT).to_string()
}
