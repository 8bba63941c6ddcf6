//! Zone-aware timestamps with duration arithmetic and rounding.
//!
//! A [`Timestamp`] pairs an absolute instant with the [`Zone`] it is
//! rendered in. Every operation returns a new value: converting zones never
//! moves the instant, and arithmetic never changes the zone.
//!
//! # Operations
//!
//! - [`Timestamp::add`] — shift by a [`Duration`] or a duration string
//! - [`Timestamp::to`] — re-render the same instant in another zone
//! - [`Timestamp::floor`] / [`Timestamp::ceil`] — round to a time unit
//! - [`Timestamp::humanize`] — relative-time phrasing ("in an hour")
//!
//! # Examples
//!
//! ```
//! use chronoshift::Timestamp;
//! use chrono::{TimeZone, Utc};
//!
//! let t = Timestamp::from(Utc.with_ymd_and_hms(2016, 12, 3, 22, 15, 35).unwrap());
//! let shifted = t.add("2h 2m").unwrap();
//! assert_eq!(shifted.to_string(), "2016-12-04 00:17:35 +0000 UTC");
//!
//! let shanghai = t.to("Asia/Shanghai").unwrap();
//! assert_eq!(shanghai.to_string(), "2016-12-04 06:15:35 +0800 CST");
//! ```

use std::fmt;

use chrono::{DateTime, DurationRound, FixedOffset, Local, TimeDelta, Timelike, Utc};
use chrono_humanize::HumanTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::duration::{Amount, Duration};
use crate::error::{Result, ShiftError};
use crate::zone::Zone;

// ── Timestamp ───────────────────────────────────────────────────────────────

/// An absolute instant paired with the zone it is displayed in.
///
/// The instant is stored in UTC; the zone only affects rendering and the
/// wall-clock fields rounding consults. Serializes as an
/// `{ instant, zone }` pair with the instant in RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    instant: DateTime<Utc>,
    zone: Zone,
}

impl Timestamp {
    /// The current instant, displayed in the system local zone.
    pub fn now() -> Timestamp {
        Timestamp {
            instant: Utc::now(),
            zone: Zone::Local,
        }
    }

    /// The current instant, displayed in UTC.
    pub fn utc_now() -> Timestamp {
        Timestamp {
            instant: Utc::now(),
            zone: Zone::Utc,
        }
    }

    /// The absolute instant in UTC.
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// The display zone.
    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Shift by a duration, given as a [`Duration`] value or a duration
    /// string in the grammar of [`Duration::parse`]. Negative durations
    /// move backward. The display zone is inherited unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::Parse`] for a malformed duration string, or
    /// [`ShiftError::OutOfRange`] if the shifted instant leaves the
    /// supported range.
    ///
    /// # Examples
    ///
    /// ```
    /// use chronoshift::{Duration, Timestamp};
    /// use chrono::{TimeZone, Utc};
    ///
    /// let t = Timestamp::from(Utc.with_ymd_and_hms(2016, 12, 3, 22, 15, 35).unwrap());
    /// assert_eq!(t.add("-1.5h").unwrap().to_string(), "2016-12-03 20:45:35 +0000 UTC");
    /// assert_eq!(t.add(Duration::HOUR).unwrap().to_string(), "2016-12-03 23:15:35 +0000 UTC");
    /// ```
    pub fn add(&self, amount: impl Into<Amount>) -> Result<Timestamp> {
        let d = amount.into().into_duration()?;
        let instant = self
            .instant
            .checked_add_signed(TimeDelta::from(d))
            .ok_or_else(|| ShiftError::OutOfRange(format!("cannot add {d} to '{self}'")))?;
        Ok(Timestamp {
            instant,
            zone: self.zone,
        })
    }

    /// The same instant displayed in another zone, named per
    /// [`Zone::resolve`] (`""`/`"UTC"`, `"Local"`, or an IANA identifier).
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::UnknownZone`] for an unrecognized name; the
    /// receiver is untouched.
    pub fn to(&self, zone: &str) -> Result<Timestamp> {
        Ok(Timestamp {
            instant: self.instant,
            zone: Zone::resolve(zone)?,
        })
    }

    /// Milliseconds of the fractional second, `0..=999`.
    pub fn millisecond(&self) -> u32 {
        self.subsec_nanos() / 1_000_000
    }

    /// Microseconds within the current millisecond, `0..=999`.
    pub fn microsecond(&self) -> u32 {
        self.subsec_nanos() / 1_000 % 1_000
    }

    /// The full sub-second count, `0..=999_999_999`. chrono carries a leap
    /// second as a count past `10^9`; that surplus folds back into the
    /// fraction here.
    pub fn nanosecond(&self) -> u32 {
        self.subsec_nanos()
    }

    /// Round down to a multiple of `unit` (a [`Duration`] or duration
    /// string).
    ///
    /// The instant is rounded to the nearest multiple of `unit` since the
    /// Unix epoch (ties round up), then pulled back one unit if the
    /// original wall clock sat past the unit's halfway mark. The halfway
    /// test reads the display zone's clock and recognizes exactly one
    /// hour, minute, second, millisecond, and microsecond; for any other
    /// unit the nearest-multiple rounding alone decides. A zero or
    /// negative unit returns the timestamp unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::Parse`] for a malformed unit string, or
    /// [`ShiftError::OutOfRange`] if rounding cannot be represented.
    ///
    /// # Examples
    ///
    /// ```
    /// use chronoshift::Timestamp;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let t = Timestamp::from(Utc.with_ymd_and_hms(2016, 12, 3, 22, 45, 35).unwrap());
    /// assert_eq!(t.floor("1h").unwrap().to_string(), "2016-12-03 22:00:00 +0000 UTC");
    /// assert_eq!(t.ceil("1h").unwrap().to_string(), "2016-12-03 23:00:00 +0000 UTC");
    /// ```
    pub fn floor(&self, unit: impl Into<Amount>) -> Result<Timestamp> {
        let unit = unit.into().into_duration()?;
        if unit.nanos() <= 0 {
            return Ok(*self);
        }
        let mut instant = self.rounded(unit)?;
        if self.past_half(unit) {
            instant = instant
                .checked_sub_signed(TimeDelta::from(unit))
                .ok_or_else(|| ShiftError::OutOfRange(format!("cannot floor '{self}' by {unit}")))?;
        }
        Ok(Timestamp {
            instant,
            zone: self.zone,
        })
    }

    /// Round up to a multiple of `unit` (a [`Duration`] or duration
    /// string).
    ///
    /// Mirror image of [`Timestamp::floor`]: the nearest-multiple result
    /// is kept when the wall clock sat past the halfway mark and pushed
    /// forward one unit otherwise. A zero or negative unit returns the
    /// timestamp unchanged.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Timestamp::floor`].
    pub fn ceil(&self, unit: impl Into<Amount>) -> Result<Timestamp> {
        let unit = unit.into().into_duration()?;
        if unit.nanos() <= 0 {
            return Ok(*self);
        }
        let mut instant = self.rounded(unit)?;
        if !self.past_half(unit) {
            instant = instant
                .checked_add_signed(TimeDelta::from(unit))
                .ok_or_else(|| ShiftError::OutOfRange(format!("cannot ceil '{self}' by {unit}")))?;
        }
        Ok(Timestamp {
            instant,
            zone: self.zone,
        })
    }

    /// The signed duration from this timestamp to the current instant;
    /// positive for timestamps in the past. Saturates at the nanosecond
    /// range.
    pub fn elapsed(&self) -> Duration {
        let delta = Utc::now().signed_duration_since(self.instant);
        match Duration::try_from(delta) {
            Ok(d) => d,
            Err(_) if delta < TimeDelta::zero() => Duration::from_nanos(i64::MIN),
            Err(_) => Duration::from_nanos(i64::MAX),
        }
    }

    /// The display zone's name and its UTC offset in seconds at this
    /// instant.
    ///
    /// # Examples
    ///
    /// ```
    /// use chronoshift::Timestamp;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let t = Timestamp::from(Utc.with_ymd_and_hms(2016, 12, 3, 22, 15, 35).unwrap());
    /// assert_eq!(t.zone_info(), ("UTC".to_string(), 0));
    /// let (name, offset) = t.to("Asia/Shanghai").unwrap().zone_info();
    /// assert_eq!((name.as_str(), offset), ("CST", 8 * 3600));
    /// ```
    pub fn zone_info(&self) -> (String, i32) {
        (
            self.zone.name_at(self.instant),
            self.zone.offset_at(self.instant).local_minus_utc(),
        )
    }

    /// A natural-language distance from the current instant, like
    /// `"in an hour"` or `"3 days ago"`.
    pub fn humanize(&self) -> String {
        HumanTime::from(self.instant).to_string()
    }

    /// [`humanize`](Timestamp::humanize) measured against an explicit
    /// anchor instead of the clock, for deterministic output.
    pub fn humanize_at(&self, anchor: Timestamp) -> String {
        HumanTime::from(self.instant.signed_duration_since(anchor.instant)).to_string()
    }

    /// The instant on the display zone's wall clock.
    fn localized(&self) -> DateTime<FixedOffset> {
        self.instant.with_timezone(&self.zone.offset_at(self.instant))
    }

    /// Sub-second nanoseconds with chrono's leap-second surplus removed.
    fn subsec_nanos(&self) -> u32 {
        self.instant.nanosecond() % 1_000_000_000
    }

    /// The nearest multiple of `unit` since the Unix epoch, ties rounding
    /// up.
    fn rounded(&self, unit: Duration) -> Result<DateTime<Utc>> {
        self.instant
            .duration_round(TimeDelta::from(unit))
            .map_err(|e| ShiftError::OutOfRange(format!("cannot round '{self}' to {unit}: {e}")))
    }

    /// Whether the display zone's wall clock sits past the halfway mark of
    /// `unit`. Only the five canonical units have a halfway test.
    fn past_half(&self, unit: Duration) -> bool {
        if unit == Duration::HOUR {
            self.localized().minute() > 30
        } else if unit == Duration::MINUTE {
            self.localized().second() > 30
        } else if unit == Duration::SECOND {
            self.millisecond() > 500
        } else if unit == Duration::MILLISECOND {
            self.microsecond() > 500
        } else if unit == Duration::MICROSECOND {
            self.subsec_nanos() % 1_000 > 500
        } else {
            false
        }
    }
}

// ── Construction from chrono datetimes ──────────────────────────────────────

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Timestamp {
        Timestamp {
            instant: dt,
            zone: Zone::Utc,
        }
    }
}

impl From<DateTime<Local>> for Timestamp {
    fn from(dt: DateTime<Local>) -> Timestamp {
        Timestamp {
            instant: dt.with_timezone(&Utc),
            zone: Zone::Local,
        }
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Timestamp {
        Timestamp {
            instant: dt.with_timezone(&Utc),
            zone: Zone::Fixed(*dt.offset()),
        }
    }
}

impl From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Timestamp {
        Timestamp {
            instant: dt.with_timezone(&Utc),
            zone: Zone::Iana(dt.timezone()),
        }
    }
}

// ── Formatting ──────────────────────────────────────────────────────────────

/// Zone-qualified wall-clock form, e.g. `"2016-12-03 22:15:35 +0000 UTC"`.
/// Fractional seconds appear only when nonzero; fixed-offset zones omit the
/// trailing name, and the system zone prints `"Local"` for it.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WITH_NAME: &str = "%Y-%m-%d %H:%M:%S%.f %z %Z";
        const BARE: &str = "%Y-%m-%d %H:%M:%S%.f %z";
        match self.zone {
            Zone::Utc => write!(f, "{}", self.instant.format(WITH_NAME)),
            Zone::Iana(tz) => write!(f, "{}", self.instant.with_timezone(&tz).format(WITH_NAME)),
            Zone::Local => write!(f, "{} Local", self.instant.with_timezone(&Local).format(BARE)),
            Zone::Fixed(offset) => {
                write!(f, "{}", self.instant.with_timezone(&offset).format(BARE))
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
