//! Display zones: which wall clock an instant is rendered on.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use chrono_tz::Tz;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ShiftError};

// ── Zone ────────────────────────────────────────────────────────────────────

/// A timestamp's display zone.
///
/// IANA zones carry full DST rules, so the offset they apply depends on the
/// instant being rendered; fixed zones apply one offset forever. [`Zone`]
/// never stores an instant — it answers offset and name queries for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    /// Coordinated Universal Time.
    Utc,
    /// The system's configured local zone.
    Local,
    /// An IANA tzdb zone (e.g. `Asia/Shanghai`) with full DST rules.
    Iana(Tz),
    /// A fixed UTC offset with no DST rules.
    Fixed(FixedOffset),
}

impl Zone {
    /// Resolve a zone name.
    ///
    /// `""` and `"UTC"` name UTC, `"Local"` names the system zone, and
    /// anything else is looked up as an IANA identifier like
    /// `"America/New_York"`.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::UnknownZone`] if the name is not in the tzdb.
    ///
    /// # Examples
    ///
    /// ```
    /// use chronoshift::Zone;
    ///
    /// assert_eq!(Zone::resolve("").unwrap(), Zone::Utc);
    /// assert!(Zone::resolve("Asia/Shanghai").is_ok());
    /// assert!(Zone::resolve("nowhere").is_err());
    /// ```
    pub fn resolve(name: &str) -> Result<Zone> {
        match name {
            "" | "UTC" => Ok(Zone::Utc),
            "Local" => Ok(Zone::Local),
            _ => name
                .parse::<Tz>()
                .map(Zone::Iana)
                .map_err(|_| ShiftError::UnknownZone(format!("'{name}'"))),
        }
    }

    /// The UTC offset this zone applies at `instant`.
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        match self {
            Zone::Utc => Utc.fix(),
            Zone::Local => instant.with_timezone(&Local).offset().fix(),
            Zone::Iana(tz) => instant.with_timezone(tz).offset().fix(),
            Zone::Fixed(offset) => *offset,
        }
    }

    /// The zone's display name at `instant`: `"UTC"`, `"Local"`, an IANA
    /// abbreviation like `"CST"`, or a rendered offset like `"+08:00"`.
    pub fn name_at(&self, instant: DateTime<Utc>) -> String {
        match self {
            Zone::Utc => "UTC".to_string(),
            Zone::Local => "Local".to_string(),
            Zone::Iana(tz) => instant.with_timezone(tz).format("%Z").to_string(),
            Zone::Fixed(offset) => offset.to_string(),
        }
    }
}

/// The zone's stable identifier: IANA zones print their full name
/// (`"Asia/Shanghai"`), fixed offsets their `"+08:00"` form.
impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Utc => f.write_str("UTC"),
            Zone::Local => f.write_str("Local"),
            Zone::Iana(tz) => f.write_str(tz.name()),
            Zone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// Accepts everything [`Zone::resolve`] does, plus rendered fixed offsets
/// like `"+08:00"`, so identifiers round-trip through [`Display`](fmt::Display).
impl FromStr for Zone {
    type Err = ShiftError;

    fn from_str(s: &str) -> Result<Zone> {
        match Zone::resolve(s) {
            Ok(zone) => Ok(zone),
            Err(err) => s.parse::<FixedOffset>().map(Zone::Fixed).map_err(|_| err),
        }
    }
}

// ── Serde ───────────────────────────────────────────────────────────────────

impl Serialize for Zone {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Zone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        // Saturday, December 3, 2016, 22:15:35 UTC
        Utc.with_ymd_and_hms(2016, 12, 3, 22, 15, 35).unwrap()
    }

    #[test]
    fn test_resolve_sentinels() {
        assert_eq!(Zone::resolve("").unwrap(), Zone::Utc);
        assert_eq!(Zone::resolve("UTC").unwrap(), Zone::Utc);
        assert_eq!(Zone::resolve("Local").unwrap(), Zone::Local);
    }

    #[test]
    fn test_resolve_iana() {
        let zone = Zone::resolve("Asia/Shanghai").unwrap();
        assert_eq!(zone.to_string(), "Asia/Shanghai");
        assert_eq!(zone.offset_at(anchor()).local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_resolve_unknown() {
        let err = Zone::resolve("nowhere").unwrap_err().to_string();
        assert!(err.contains("Invalid timezone"), "got: {err}");
        assert!(err.contains("nowhere"), "got: {err}");
    }

    #[test]
    fn test_offset_tracks_dst() {
        let new_york = Zone::resolve("America/New_York").unwrap();
        // December 3 is EST (UTC-5); June 15 is EDT (UTC-4).
        assert_eq!(new_york.offset_at(anchor()).local_minus_utc(), -5 * 3600);
        let summer = Utc.with_ymd_and_hms(2016, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(new_york.offset_at(summer).local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn test_name_at_abbreviations() {
        assert_eq!(Zone::Utc.name_at(anchor()), "UTC");
        assert_eq!(Zone::Local.name_at(anchor()), "Local");
        assert_eq!(
            Zone::resolve("Asia/Shanghai").unwrap().name_at(anchor()),
            "CST"
        );
        assert_eq!(
            Zone::resolve("America/New_York").unwrap().name_at(anchor()),
            "EST"
        );
    }

    #[test]
    fn test_fixed_offset_forms() {
        let zone = Zone::Fixed(FixedOffset::east_opt(8 * 3600).unwrap());
        assert_eq!(zone.name_at(anchor()), "+08:00");
        assert_eq!(zone.to_string(), "+08:00");
        assert_eq!(zone.offset_at(anchor()).local_minus_utc(), 8 * 3600);
        assert_eq!("+08:00".parse::<Zone>().unwrap(), zone);
    }

    #[test]
    fn test_from_str_falls_back_to_resolve_error() {
        let err = "bogus".parse::<Zone>().unwrap_err().to_string();
        assert!(err.contains("Invalid timezone"), "got: {err}");
    }

    #[test]
    fn test_serde_name_form() {
        let zone = Zone::resolve("Asia/Shanghai").unwrap();
        let json = serde_json::to_string(&zone).unwrap();
        assert_eq!(json, "\"Asia/Shanghai\"");
        assert_eq!(serde_json::from_str::<Zone>(&json).unwrap(), zone);

        let fixed = Zone::Fixed(FixedOffset::east_opt(8 * 3600).unwrap());
        let json = serde_json::to_string(&fixed).unwrap();
        assert_eq!(json, "\"+08:00\"");
        assert_eq!(serde_json::from_str::<Zone>(&json).unwrap(), fixed);

        assert!(serde_json::from_str::<Zone>("\"nowhere\"").is_err());
    }
}
