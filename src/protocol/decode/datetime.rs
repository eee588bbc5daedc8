//! Date, time and timestamp text grammars.
//!
//! Forms follow the JDBC escape syntax:
//! - Date: `YYYY-MM-DD`, with a `+`/`-` sign on years outside `0..=9999`
//! - Time: `HH:MM:SS`, with an optional `.fffffffff` fraction
//! - Timestamp: `YYYY-MM-DD HH:MM:SS.f`, where the fraction has its trailing
//!   zeros trimmed but always keeps at least one digit (`2009-05-14 00:00:00.0`)
//!
//! A leap second (nanoseconds >= 1_000_000_000 in chrono) is written as
//! second `60`.

use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Format a date as `YYYY-MM-DD`.
///
/// Years outside `0..=9999` carry an explicit sign (`+10000-03-04`,
/// `-0005-01-01`).
pub fn format_date(date: NaiveDate) -> String {
    let year = date.year();
    let year = match year {
        0..=9999 => format!("{:04}", year),
        y if y > 9999 => format!("+{}", y),
        y => format!("-{:04}", y.unsigned_abs()),
    };
    format!("{}-{:02}-{:02}", year, date.month(), date.day())
}

/// Parse a `[+-]YYYY-MM-DD` date. The year has at least four digits.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let invalid = |reason: &str| Error::protocol(format!("Invalid DATE '{}': {}", text, reason));

    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let mut parts = unsigned.split('-');
    let (year, month, day) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(year), Some(month), Some(day), None) => (year, month, day),
        _ => return Err(invalid("expected YYYY-MM-DD")),
    };
    if year.len() < 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("bad year"));
    }
    let year: i32 = year.parse().map_err(|_| invalid("year out of range"))?;
    let year = if negative { -year } else { year };
    let month = two_digits(month).ok_or_else(|| invalid("bad month"))?;
    let day = two_digits(day).ok_or_else(|| invalid("bad day"))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| invalid("no such date"))
}

fn two_digits(part: &str) -> Option<u32> {
    if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Format a time as `HH:MM:SS`, adding a fraction only when non-zero.
pub fn format_time(time: NaiveTime) -> String {
    let (second, nanos) = split_leap(time);
    let mut out = format!("{:02}:{:02}:{:02}", time.hour(), time.minute(), second);
    if nanos != 0 {
        out.push('.');
        out.push_str(&fraction_digits(nanos));
    }
    out
}

/// Parse `HH:MM:SS[.fffffffff]`.
pub fn parse_time(text: &str) -> Result<NaiveTime> {
    let (hms, nanos) = match text.split_once('.') {
        Some((hms, frac)) => (hms, parse_fraction(text, frac)?),
        None => (text, 0),
    };

    let mut parts = hms.split(':');
    let mut field = |name: &str| -> Result<u32> {
        let part = parts
            .next()
            .ok_or_else(|| Error::protocol(format!("Invalid TIME '{}': missing {}", text, name)))?;
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::protocol(format!(
                "Invalid TIME '{}': bad {} '{}'",
                text, name, part
            )));
        }
        part.parse::<u32>()
            .map_err(|e| Error::protocol(format!("Invalid TIME '{}': {}", text, e)))
    };
    let hour = field("hour")?;
    let minute = field("minute")?;
    let second = field("second")?;
    if parts.next().is_some() {
        return Err(Error::protocol(format!("Invalid TIME '{}': too many fields", text)));
    }

    // Second 60 is chrono's leap-second representation.
    let (second, nanos) = if second == 60 {
        (59, nanos + NANOS_PER_SECOND)
    } else {
        (second, nanos)
    };

    NaiveTime::from_hms_nano_opt(hour, minute, second, nanos).ok_or_else(|| {
        Error::protocol(format!(
            "Invalid TIME: hour={}, minute={}, second={}, nanos={}",
            hour, minute, second, nanos
        ))
    })
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS.f`.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    let time = ts.time();
    let (second, nanos) = split_leap(time);
    let fraction = if nanos == 0 {
        "0".to_string()
    } else {
        fraction_digits(nanos)
    };
    format!(
        "{} {:02}:{:02}:{:02}.{}",
        format_date(ts.date()),
        time.hour(),
        time.minute(),
        second,
        fraction
    )
}

/// Parse `YYYY-MM-DD HH:MM:SS[.f...]`.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let (date, time) = text.split_once(' ').ok_or_else(|| {
        Error::protocol(format!(
            "Invalid TIMESTAMP '{}': expected 'YYYY-MM-DD HH:MM:SS'",
            text
        ))
    })?;
    Ok(NaiveDateTime::new(parse_date(date)?, parse_time(time)?))
}

fn split_leap(time: NaiveTime) -> (u32, u32) {
    let nanos = time.nanosecond();
    if nanos >= NANOS_PER_SECOND {
        (time.second() + 1, nanos - NANOS_PER_SECOND)
    } else {
        (time.second(), nanos)
    }
}

/// Nine-digit fraction with trailing zeros removed.
fn fraction_digits(nanos: u32) -> String {
    let digits = format!("{:09}", nanos);
    digits.trim_end_matches('0').to_string()
}

fn parse_fraction(text: &str, frac: &str) -> Result<u32> {
    if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::protocol(format!(
            "Invalid fraction in '{}': expected 1 to 9 digits",
            text
        )));
    }
    let scale = 10u32.pow(9 - frac.len() as u32);
    frac.parse::<u32>()
        .map(|v| v * scale)
        .map_err(|e| Error::protocol(format!("Invalid fraction in '{}': {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, n: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_nano_opt(h, mi, s, n)
            .unwrap()
    }

    #[test]
    fn test_timestamp_midnight_keeps_one_digit() {
        assert_eq!(
            format_timestamp(ts(2009, 5, 14, 0, 0, 0, 0)),
            "2009-05-14 00:00:00.0"
        );
    }

    #[test]
    fn test_timestamp_fraction_trimmed() {
        assert_eq!(
            format_timestamp(ts(2024, 10, 21, 12, 36, 5, 120_000_000)),
            "2024-10-21 12:36:05.12"
        );
        assert_eq!(
            format_timestamp(ts(2024, 10, 21, 12, 36, 5, 1)),
            "2024-10-21 12:36:05.000000001"
        );
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(
            parse_timestamp("2009-05-14 00:00:00.0").unwrap(),
            ts(2009, 5, 14, 0, 0, 0, 0)
        );
        assert_eq!(
            parse_timestamp("2009-05-14 13:01:02").unwrap(),
            ts(2009, 5, 14, 13, 1, 2, 0)
        );
        assert_eq!(
            parse_timestamp("2009-05-14 13:01:02.5").unwrap(),
            ts(2009, 5, 14, 13, 1, 2, 500_000_000)
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("2009-05-14").is_err());
        assert!(parse_timestamp("2009-05-14 25:00:00").is_err());
        assert!(parse_timestamp("2009-05-14 10:00:00.").is_err());
        assert!(parse_timestamp("2009-05-14 10:00:00.1234567890").is_err());
        assert!(parse_timestamp("2009-13-14 10:00:00").is_err());
    }

    #[test]
    fn test_time() {
        let t = NaiveTime::from_hms_nano_opt(8, 5, 9, 250_000_000).unwrap();
        assert_eq!(format_time(t), "08:05:09.25");
        assert_eq!(parse_time("08:05:09.25").unwrap(), t);

        let whole = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        assert_eq!(format_time(whole), "23:59:59");
        assert_eq!(parse_time("23:59:59").unwrap(), whole);
        assert!(parse_time("23:59").is_err());
        assert!(parse_time("23:59:59:00").is_err());
    }

    #[test]
    fn test_leap_second() {
        let leap = NaiveTime::from_hms_nano_opt(23, 59, 59, 1_500_000_000).unwrap();
        assert_eq!(format_time(leap), "23:59:60.5");
        assert_eq!(parse_time("23:59:60.5").unwrap(), leap);
    }

    #[test]
    fn test_date() {
        let d = NaiveDate::from_ymd_opt(1999, 1, 2).unwrap();
        assert_eq!(format_date(d), "1999-01-02");
        assert_eq!(parse_date("1999-01-02").unwrap(), d);
        assert!(parse_date("1999-02-30").is_err());
        assert!(parse_date("99-01-02").is_err());
        assert!(parse_date("1999-1-02").is_err());
        assert!(parse_date("1999-01-02-03").is_err());
        assert!(parse_date("+-1999-01-02").is_err());
    }

    #[test]
    fn test_date_signed_years() {
        let far = NaiveDate::from_ymd_opt(10000, 3, 4).unwrap();
        assert_eq!(format_date(far), "+10000-03-04");
        assert_eq!(parse_date("+10000-03-04").unwrap(), far);

        let bce = NaiveDate::from_ymd_opt(-5, 1, 1).unwrap();
        assert_eq!(format_date(bce), "-0005-01-01");
        assert_eq!(parse_date("-0005-01-01").unwrap(), bce);

        let zero = NaiveDate::from_ymd_opt(0, 12, 31).unwrap();
        assert_eq!(format_date(zero), "0000-12-31");
        assert_eq!(parse_date("0000-12-31").unwrap(), zero);

        for date in [NaiveDate::MIN, NaiveDate::MAX] {
            assert_eq!(parse_date(&format_date(date)).unwrap(), date);
        }
        assert!(parse_date("+99999999999-01-01").is_err());
    }

    #[test]
    fn test_timestamp_signed_year() {
        let t = ts(12345, 6, 7, 8, 9, 10, 0);
        assert_eq!(format_timestamp(t), "+12345-06-07 08:09:10.0");
        assert_eq!(parse_timestamp("+12345-06-07 08:09:10.0").unwrap(), t);
    }
}
