//! Free-form time expressions for the analysis window
//!
//! Accepts the handful of forms git users reach for: "now", "yesterday",
//! "<n> <unit> ago", RFC 3339, and date or date-time literals (UTC).

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Resolve an expression to a Unix timestamp, relative to `now`.
pub fn resolve(expr: &str, now: DateTime<Utc>) -> Result<i64> {
    let expr = expr.trim();
    let lower = expr.to_lowercase();

    match lower.as_str() {
        "now" => return Ok(now.timestamp()),
        "yesterday" => return Ok((now - Duration::days(1)).timestamp()),
        _ => {}
    }

    if let Some(rest) = lower.strip_suffix("ago") {
        return Ok(relative(rest.trim(), now)?.timestamp());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(expr) {
        return Ok(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(expr, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&dt).timestamp());
    }
    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)).timestamp());
    }

    bail!("unrecognized time expression '{expr}'")
}

/// Parse the "<n> <unit>" part of a relative expression.
fn relative(phrase: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let mut parts = phrase.split_whitespace();
    let (Some(count), Some(unit), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("expected '<n> <unit> ago', got '{phrase} ago'");
    };
    let n: u32 = count
        .parse()
        .with_context(|| format!("invalid count '{count}' in time expression"))?;

    let dt = match unit {
        "second" | "seconds" => now - Duration::seconds(n as i64),
        "minute" | "minutes" => now - Duration::minutes(n as i64),
        "hour" | "hours" => now - Duration::hours(n as i64),
        "day" | "days" => now - Duration::days(n as i64),
        "week" | "weeks" => now - Duration::weeks(n as i64),
        "month" | "months" => now
            .checked_sub_months(Months::new(n))
            .context("month offset out of range")?,
        "year" | "years" => now
            .checked_sub_months(Months::new(n * 12))
            .context("year offset out of range")?,
        _ => bail!("unrecognized time unit '{unit}'"),
    };
    Ok(dt)
}
