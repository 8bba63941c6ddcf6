//! Signed durations with a compact, human-writable string form.
//!
//! A [`Duration`] is a signed count of nanoseconds. Its string form is an
//! optional leading sign followed by one or more decimal magnitudes with unit
//! suffixes: `"2h"`, `"1h30m"`, `"-1.5h"`, `"300ms"`. Recognized units are
//! `ns`, `us` (or `µs`), `ms`, `s`, `m`, and `h`. Whitespace is ignored
//! anywhere in the string, so `"2h 2m"` and `"2h2m"` parse alike, and the
//! bare string `"0"` is accepted as the zero duration.
//!
//! [`Display`](std::fmt::Display) renders the same grammar back (`"2h2m0s"`,
//! `"300ms"`, `"1.5µs"`), so every duration round-trips through its string
//! form.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ShiftError};

// ── Duration ────────────────────────────────────────────────────────────────

/// A signed span of time, counted in nanoseconds.
///
/// The representable range is roughly ±292 years. Arithmetic uses the
/// standard integer operators and shares their overflow behavior; parsing
/// and [`TimeDelta`] conversion check their bounds and report
/// [`ShiftError`] instead.
///
/// # Examples
///
/// ```
/// use chronoshift::Duration;
///
/// let d = Duration::parse("1h30m").unwrap();
/// assert_eq!(d, 90 * Duration::MINUTE);
/// assert_eq!(d.hours(), 1.5);
/// assert_eq!(d.to_string(), "1h30m0s");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration {
    nanos: i64,
}

impl Duration {
    /// The zero-length duration.
    pub const ZERO: Duration = Duration::from_nanos(0);
    /// One nanosecond.
    pub const NANOSECOND: Duration = Duration::from_nanos(1);
    /// One microsecond.
    pub const MICROSECOND: Duration = Duration::from_nanos(1_000);
    /// One millisecond.
    pub const MILLISECOND: Duration = Duration::from_nanos(1_000_000);
    /// One second.
    pub const SECOND: Duration = Duration::from_nanos(1_000_000_000);
    /// One minute.
    pub const MINUTE: Duration = Duration::from_nanos(60 * 1_000_000_000);
    /// One hour.
    pub const HOUR: Duration = Duration::from_nanos(3_600 * 1_000_000_000);
    /// Twenty-four hours.
    pub const DAY: Duration = Duration::from_nanos(24 * 3_600 * 1_000_000_000);
    /// Seven days.
    pub const WEEK: Duration = Duration::from_nanos(7 * 24 * 3_600 * 1_000_000_000);

    /// Build a duration from a signed nanosecond count.
    pub const fn from_nanos(nanos: i64) -> Duration {
        Duration { nanos }
    }

    /// The total number of nanoseconds.
    pub const fn nanos(&self) -> i64 {
        self.nanos
    }

    /// The duration as a floating-point number of hours.
    pub fn hours(&self) -> f64 {
        let whole = self.nanos / Self::HOUR.nanos;
        let rem = self.nanos % Self::HOUR.nanos;
        whole as f64 + rem as f64 / Self::HOUR.nanos as f64
    }

    /// The duration as a floating-point number of minutes.
    pub fn minutes(&self) -> f64 {
        let whole = self.nanos / Self::MINUTE.nanos;
        let rem = self.nanos % Self::MINUTE.nanos;
        whole as f64 + rem as f64 / Self::MINUTE.nanos as f64
    }

    /// The duration as a floating-point number of seconds.
    pub fn seconds(&self) -> f64 {
        let whole = self.nanos / Self::SECOND.nanos;
        let rem = self.nanos % Self::SECOND.nanos;
        whole as f64 + rem as f64 / Self::SECOND.nanos as f64
    }

    /// Parse a duration string like `"2h"`, `"1h30m"`, or `"-1.5h"`.
    ///
    /// Whitespace is stripped first, then an optional leading `+`/`-`
    /// (applying to the whole expression) is followed by one or more
    /// magnitude+unit legs. Magnitudes may carry a fractional part; all
    /// legs are summed. The bare string `"0"` is the zero duration.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::Parse`] for an empty string, a missing or
    /// unknown unit, a sign anywhere but the front, a magnitude with no
    /// digits, or a value outside the nanosecond range.
    ///
    /// # Examples
    ///
    /// ```
    /// use chronoshift::Duration;
    ///
    /// assert_eq!(Duration::parse("2h 2m").unwrap().minutes(), 122.0);
    /// assert_eq!(Duration::parse("-1.5h").unwrap(), -90 * Duration::MINUTE);
    /// assert!(Duration::parse("3hours").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Duration> {
        let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        let mut s = stripped.as_str();

        let negative = match s.as_bytes().first() {
            Some(b'-') => {
                s = &s[1..];
                true
            }
            Some(b'+') => {
                s = &s[1..];
                false
            }
            _ => false,
        };

        // A bare zero needs no unit.
        if s == "0" {
            return Ok(Duration::ZERO);
        }
        if s.is_empty() {
            return Err(ShiftError::Parse(format!("empty duration '{input}'")));
        }

        let mut total: u64 = 0;
        while let Some(lead) = s.chars().next() {
            if lead != '.' && !lead.is_ascii_digit() {
                return Err(ShiftError::Parse(format!(
                    "expected number before '{lead}' in '{input}'"
                )));
            }

            let before = s.len();
            let (mut value, rest) = leading_int(s, input)?;
            s = rest;
            let int_digits = s.len() != before;

            let mut frac: u64 = 0;
            let mut scale: f64 = 1.0;
            let mut frac_digits = false;
            if s.as_bytes().first() == Some(&b'.') {
                s = &s[1..];
                let before = s.len();
                let (f, sc, rest) = leading_fraction(s);
                frac = f;
                scale = sc;
                s = rest;
                frac_digits = s.len() != before;
            }
            if !int_digits && !frac_digits {
                return Err(ShiftError::Parse(format!("missing number in '{input}'")));
            }

            // The unit runs until the next digit or decimal point.
            let unit_end = s
                .find(|c: char| c == '.' || c.is_ascii_digit())
                .unwrap_or(s.len());
            if unit_end == 0 {
                return Err(ShiftError::Parse(format!("missing unit in '{input}'")));
            }
            let unit = &s[..unit_end];
            s = &s[unit_end..];
            let unit_nanos = unit_nanos(unit).ok_or_else(|| {
                ShiftError::Parse(format!("unknown unit '{unit}' in '{input}'"))
            })?;

            value = value
                .checked_mul(unit_nanos)
                .filter(|&v| v <= MAX_MAGNITUDE)
                .ok_or_else(|| overflow(input))?;
            if frac > 0 {
                // The fraction scales into the unit; f64 keeps every digit
                // people actually write.
                let scaled = (frac as f64 * (unit_nanos as f64 / scale)) as u64;
                value = value
                    .checked_add(scaled)
                    .filter(|&v| v <= MAX_MAGNITUDE)
                    .ok_or_else(|| overflow(input))?;
            }
            total = total
                .checked_add(value)
                .filter(|&t| t <= MAX_MAGNITUDE)
                .ok_or_else(|| overflow(input))?;
        }

        if negative {
            // The magnitude 1 << 63 has no positive i64 form; the wrap
            // lands it on i64::MIN.
            Ok(Duration::from_nanos((total as i64).wrapping_neg()))
        } else {
            let nanos = i64::try_from(total).map_err(|_| overflow(input))?;
            Ok(Duration::from_nanos(nanos))
        }
    }
}

/// The largest magnitude a signed nanosecond count can carry: |i64::MIN|.
const MAX_MAGNITUDE: u64 = i64::MIN.unsigned_abs();

/// Consume leading decimal digits as an unsigned magnitude, capped at
/// [`MAX_MAGNITUDE`].
fn leading_int<'a>(s: &'a str, input: &str) -> Result<(u64, &'a str)> {
    let bytes = s.as_bytes();
    let mut value: u64 = 0;
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add((bytes[i] - b'0') as u64))
            .filter(|&v| v <= MAX_MAGNITUDE)
            .ok_or_else(|| overflow(input))?;
        i += 1;
    }
    Ok((value, &s[i..]))
}

/// Consume leading decimal digits as a fraction numerator and its scale.
///
/// Digits past the representable magnitude are consumed but dropped; they
/// carry no precision a nanosecond count could hold.
fn leading_fraction(s: &str) -> (u64, f64, &str) {
    let bytes = s.as_bytes();
    let mut value: u64 = 0;
    let mut scale: f64 = 1.0;
    let mut saturated = false;
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        if !saturated {
            match value
                .checked_mul(10)
                .and_then(|v| v.checked_add((bytes[i] - b'0') as u64))
                .filter(|&v| v <= MAX_MAGNITUDE)
            {
                Some(v) => {
                    value = v;
                    scale *= 10.0;
                }
                None => saturated = true,
            }
        }
        i += 1;
    }
    (value, scale, &s[i..])
}

/// Nanoseconds per recognized unit token.
fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(Duration::NANOSECOND.nanos as u64),
        "us" | "µs" | "μs" => Some(Duration::MICROSECOND.nanos as u64),
        "ms" => Some(Duration::MILLISECOND.nanos as u64),
        "s" => Some(Duration::SECOND.nanos as u64),
        "m" => Some(Duration::MINUTE.nanos as u64),
        "h" => Some(Duration::HOUR.nanos as u64),
        _ => None,
    }
}

fn overflow(input: &str) -> ShiftError {
    ShiftError::Parse(format!("value out of range in '{input}'"))
}

impl FromStr for Duration {
    type Err = ShiftError;

    fn from_str(s: &str) -> Result<Duration> {
        Duration::parse(s)
    }
}

// ── Formatting ──────────────────────────────────────────────────────────────

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nanos == 0 {
            return f.write_str("0s");
        }
        let mut out = String::new();
        if self.nanos < 0 {
            out.push('-');
        }
        let u = self.nanos.unsigned_abs();
        if u < Duration::SECOND.nanos as u64 {
            // Sub-second: the largest unit that keeps an integer part.
            let (per_unit, width, unit) = if u < Duration::MICROSECOND.nanos as u64 {
                (1, 0, "ns")
            } else if u < Duration::MILLISECOND.nanos as u64 {
                (Duration::MICROSECOND.nanos as u64, 3, "µs")
            } else {
                (Duration::MILLISECOND.nanos as u64, 6, "ms")
            };
            out.push_str(&(u / per_unit).to_string());
            push_fraction(&mut out, u % per_unit, width);
            out.push_str(unit);
        } else {
            let secs = u / Duration::SECOND.nanos as u64;
            let hours = secs / 3_600;
            let minutes = secs % 3_600 / 60;
            if hours > 0 {
                out.push_str(&hours.to_string());
                out.push('h');
            }
            if hours > 0 || minutes > 0 {
                out.push_str(&minutes.to_string());
                out.push('m');
            }
            out.push_str(&(secs % 60).to_string());
            push_fraction(&mut out, u % Duration::SECOND.nanos as u64, 9);
            out.push('s');
        }
        f.write_str(&out)
    }
}

/// Append `.digits` with trailing zeros trimmed; nothing when `frac` is zero.
fn push_fraction(out: &mut String, frac: u64, width: usize) {
    if frac == 0 {
        return;
    }
    let digits = format!("{frac:0width$}");
    out.push('.');
    out.push_str(digits.trim_end_matches('0'));
}

// ── Operators ───────────────────────────────────────────────────────────────

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration::from_nanos(self.nanos + rhs.nanos)
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Duration {
        Duration::from_nanos(self.nanos - rhs.nanos)
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        Duration::from_nanos(-self.nanos)
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: i64) -> Duration {
        Duration::from_nanos(self.nanos * rhs)
    }
}

impl Mul<Duration> for i64 {
    type Output = Duration;

    fn mul(self, rhs: Duration) -> Duration {
        rhs * self
    }
}

// ── TimeDelta interop ───────────────────────────────────────────────────────

impl From<Duration> for TimeDelta {
    fn from(d: Duration) -> TimeDelta {
        TimeDelta::nanoseconds(d.nanos)
    }
}

impl TryFrom<TimeDelta> for Duration {
    type Error = ShiftError;

    fn try_from(delta: TimeDelta) -> Result<Duration> {
        delta
            .num_nanoseconds()
            .map(Duration::from_nanos)
            .ok_or_else(|| ShiftError::OutOfRange(format!("{delta} exceeds the nanosecond range")))
    }
}

// ── Serde ───────────────────────────────────────────────────────────────────

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ── Amount ──────────────────────────────────────────────────────────────────

/// An adjustment accepted by timestamp arithmetic: a ready [`Duration`] or
/// a duration string still to be parsed.
///
/// `From` conversions keep call sites terse — `t.add("2h")` and
/// `t.add(Duration::HOUR)` both work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Amount {
    /// A resolved duration value.
    Duration(Duration),
    /// A duration in the string grammar, parsed on use.
    Text(String),
}

impl Amount {
    /// Resolve to a concrete [`Duration`], parsing the text form.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::Parse`] if the text form is malformed.
    pub fn into_duration(self) -> Result<Duration> {
        match self {
            Amount::Duration(d) => Ok(d),
            Amount::Text(s) => Duration::parse(&s),
        }
    }
}

impl From<Duration> for Amount {
    fn from(d: Duration) -> Amount {
        Amount::Duration(d)
    }
}

impl From<&str> for Amount {
    fn from(s: &str) -> Amount {
        Amount::Text(s.to_string())
    }
}

impl From<String> for Amount {
    fn from(s: String) -> Amount {
        Amount::Text(s)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
