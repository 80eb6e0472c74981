//! Calendar date/time value exchanged with the real-time clock.
//!
//! The DS3231 only stores a two-digit year, so every `DateTime` the core
//! accepts lies in 2000–2099.  [`DateTime::parse`] reads the boundary
//! format `YYYY/MM/DD HH:MM:SS` (fields need not be zero-padded) and
//! [`core::fmt::Display`] writes the same layout back.

use core::fmt;

/// Earliest year accepted from the outside world.
pub const MIN_YEAR: u16 = 2000;
/// Latest year the RTC can hold.
pub const MAX_YEAR: u16 = 2099;

/// Wall-clock time, second resolution, no timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Reasons a date/time is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeError {
    /// Input did not match `YYYY/MM/DD HH:MM:SS`.
    Malformed,
    /// Year before [`MIN_YEAR`] or after [`MAX_YEAR`].
    YearOutOfRange,
    /// A field is outside its calendar range (month 13, Feb 30, hour 24, ...).
    FieldOutOfRange,
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "expected YYYY/MM/DD HH:MM:SS"),
            Self::YearOutOfRange => write!(f, "year must be {}–{}", MIN_YEAR, MAX_YEAR),
            Self::FieldOutOfRange => write!(f, "field out of range"),
        }
    }
}

impl DateTime {
    /// 2000/01/01 00:00:00, the RTC's power-on value.
    pub const EPOCH: Self = Self {
        year: MIN_YEAR,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Build and validate a date/time.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, DateTimeError> {
        let dt = Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        dt.validate()?;
        Ok(dt)
    }

    /// Parse `YYYY/MM/DD HH:MM:SS`.
    pub fn parse(input: &str) -> Result<Self, DateTimeError> {
        let mut halves = input.split_whitespace();
        let date = halves.next().ok_or(DateTimeError::Malformed)?;
        let time = halves.next().ok_or(DateTimeError::Malformed)?;
        if halves.next().is_some() {
            return Err(DateTimeError::Malformed);
        }

        let [year, month, day] = split_fields::<3>(date, '/')?;
        let [hour, minute, second] = split_fields::<3>(time, ':')?;

        let narrow = |v: u32| u8::try_from(v).map_err(|_| DateTimeError::FieldOutOfRange);
        let year = u16::try_from(year).map_err(|_| DateTimeError::YearOutOfRange)?;

        Self::new(
            year,
            narrow(month)?,
            narrow(day)?,
            narrow(hour)?,
            narrow(minute)?,
            narrow(second)?,
        )
    }

    /// Check year window and calendar ranges.
    pub fn validate(&self) -> Result<(), DateTimeError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&self.year) {
            return Err(DateTimeError::YearOutOfRange);
        }
        if !(1..=12).contains(&self.month)
            || self.day == 0
            || self.day > days_in_month(self.year, self.month)
            || self.hour > 23
            || self.minute > 59
            || self.second > 59
        {
            return Err(DateTimeError::FieldOutOfRange);
        }
        Ok(())
    }

    /// Day of week, 1 = Monday … 7 = Sunday (DS3231 register convention).
    pub fn weekday(&self) -> u8 {
        let days = days_from_civil(self.year as i64, self.month, self.day);
        // 1970-01-01 was a Thursday (ISO 4).
        ((days + 3).rem_euclid(7) + 1) as u8
    }

    /// Seconds since 1970-01-01 00:00:00.
    pub fn to_unix(&self) -> i64 {
        days_from_civil(self.year as i64, self.month, self.day) * 86_400
            + self.hour as i64 * 3600
            + self.minute as i64 * 60
            + self.second as i64
    }

    /// Inverse of [`to_unix`](Self::to_unix).  Years outside the RTC window
    /// are clamped by the caller's validation, not here.
    pub fn from_unix(secs: i64) -> Self {
        let days = secs.div_euclid(86_400);
        let rem = secs.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(days);
        Self {
            year: year as u16,
            month,
            day,
            hour: (rem / 3600) as u8,
            minute: ((rem % 3600) / 60) as u8,
            second: (rem % 60) as u8,
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

fn split_fields<const N: usize>(s: &str, sep: char) -> Result<[u32; N], DateTimeError> {
    let mut out = [0u32; N];
    let mut parts = s.split(sep);
    for slot in &mut out {
        let part = parts.next().ok_or(DateTimeError::Malformed)?;
        if part.is_empty() || part.len() > 4 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DateTimeError::Malformed);
        }
        *slot = part.parse().map_err(|_| DateTimeError::Malformed)?;
    }
    if parts.next().is_some() {
        return Err(DateTimeError::Malformed);
    }
    Ok(out)
}

pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

// Howard Hinnant's civil-calendar algorithms, proleptic Gregorian.
fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
