use std::time::{SystemTime, UNIX_EPOCH};

use time::{Date, Duration, OffsetDateTime, Time, UtcOffset};

const NANOS_PER_MILLI: i128 = 1_000_000;
const NANOS_PER_MICRO: i128 = 1_000;

#[must_use]
pub fn unix_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| {
            u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
        })
}

#[must_use]
pub fn format_unix_ms(timestamp_unix_ms: u64) -> String {
    let nanos = i128::from(timestamp_unix_ms)
        .checked_mul(NANOS_PER_MILLI)
        .unwrap_or(i128::MAX);
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .to_offset(UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        dt.year(),
        u8::from(dt.month()),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.millisecond()
    )
}

#[must_use]
pub fn now_utc() -> String {
    format_unix_ms(unix_timestamp_millis())
}

/// Renders a store timestamp given in microseconds since the epoch.
#[must_use]
pub fn format_unix_micros(timestamp_unix_us: i64) -> Option<String> {
    let nanos = i128::from(timestamp_unix_us).checked_mul(NANOS_PER_MICRO)?;
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;
    Some(format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
        dt.year(),
        u8::from(dt.month()),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.microsecond()
    ))
}

/// Renders a store date given in days since the epoch.
#[must_use]
pub fn format_epoch_days(days: i32) -> Option<String> {
    let date = Date::from_calendar_date(1970, time::Month::January, 1)
        .ok()?
        .checked_add(Duration::days(i64::from(days)))?;
    Some(format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    ))
}

/// Renders a time of day given in microseconds since midnight. The fraction
/// is omitted when zero.
#[must_use]
pub fn format_time_micros(micros: i64) -> Option<String> {
    let micros = u64::try_from(micros).ok()?;
    let seconds = micros / 1_000_000;
    let time = Time::from_hms_micro(
        u8::try_from(seconds / 3_600).ok()?,
        u8::try_from(seconds / 60 % 60).ok()?,
        u8::try_from(seconds % 60).ok()?,
        u32::try_from(micros % 1_000_000).ok()?,
    )
    .ok()?;
    Some(clock_text(
        i64::from(time.hour()),
        time.minute(),
        time.second(),
        time.microsecond(),
    ))
}

/// Renders a store interval as `<n> years <n> months <n> days HH:MM:SS`,
/// leaving out zero parts.
#[must_use]
pub fn format_interval(months: i32, days: i32, nanos: i64) -> String {
    let mut parts = Vec::new();
    let (years, months) = (months / 12, months % 12);
    for (amount, unit) in [(years, "year"), (months, "month"), (days, "day")] {
        if amount != 0 {
            let plural = if amount.abs() == 1 { "" } else { "s" };
            parts.push(format!("{amount} {unit}{plural}"));
        }
    }

    let micros = nanos / 1_000;
    if micros != 0 || parts.is_empty() {
        let sign = if micros < 0 { "-" } else { "" };
        let micros = micros.unsigned_abs();
        let seconds = micros / 1_000_000;
        let clock = clock_text(
            i64::try_from(seconds / 3_600).unwrap_or(i64::MAX),
            u8::try_from(seconds / 60 % 60).unwrap_or_default(),
            u8::try_from(seconds % 60).unwrap_or_default(),
            u32::try_from(micros % 1_000_000).unwrap_or_default(),
        );
        parts.push(format!("{sign}{clock}"));
    }
    parts.join(" ")
}

fn clock_text(hours: i64, minutes: u8, seconds: u8, micros: u32) -> String {
    if micros == 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{micros:06}")
    }
}
